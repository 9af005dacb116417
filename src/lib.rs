pub mod api;
pub mod cli;
pub mod core;
pub mod fcm;
pub mod messaging;
pub mod notify;
