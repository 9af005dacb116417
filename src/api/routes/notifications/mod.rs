pub mod public;
mod router;
pub use router::router;
pub(crate) use router::list_notifications;
