//! Public types for the notifications API
use std::collections::HashMap;

use serde::Deserialize;

#[derive(Deserialize)]
pub struct NotificationListQuery {
    pub user_id: String,
    #[serde(default)]
    pub unread_only: bool,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Deserialize)]
pub struct UserQuery {
    pub user_id: String,
}

#[derive(Deserialize)]
pub struct MarkReadRequest {
    pub user_id: String,
}

#[derive(Deserialize)]
pub struct SendNotificationRequest {
    pub user_id: String,
    pub title: String,
    pub message: String,
    pub kind: Option<String>,
    #[serde(default)]
    pub data: HashMap<String, String>,
}

#[derive(Deserialize)]
pub struct TestNotificationRequest {
    pub user_id: String,
    pub title: Option<String>,
    pub message: Option<String>,
}
