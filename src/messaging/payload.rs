use std::collections::HashMap;

use serde::Deserialize;

/// A message delivered by the push backend. The notification section
/// is optional: data-only messages are valid in the underlying
/// protocol, so consumers must check for presence before using it.
#[derive(Clone, Debug, Deserialize)]
pub struct PushPayload {
    pub notification: Option<NotificationDescriptor>,
    #[serde(default)]
    pub data: HashMap<String, String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct NotificationDescriptor {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
}
