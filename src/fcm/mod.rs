//! Sending side of the push pipeline: a Firebase Cloud Messaging
//! HTTP v1 client plus the `PushSender` seam the notification
//! service and API handlers go through.
pub mod client;
pub mod errors;
pub mod models;

pub use client::{FcmClient, PushSender};
pub use errors::FcmError;
pub use models::{DeviceType, ServiceAccountKey};
