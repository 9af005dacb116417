//! Receiving side of the push pipeline: binds to the push backend
//! for a project and maps delivered payloads to host notification
//! display requests while the hosting context is backgrounded.
pub mod adapter;
pub mod client;
pub mod config;
pub mod payload;

pub use adapter::{BackgroundMessageAdapter, NOTIFICATION_ICON, NotificationOptions, Notifier};
pub use client::{BackgroundMessageHandler, MessagingClient};
pub use config::FirebaseConfig;
pub use payload::{NotificationDescriptor, PushPayload};
