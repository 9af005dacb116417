use serde::Serialize;

use crate::fcm::DeviceType;

/// A device registered for push notifications.
#[derive(Clone, Debug, Serialize)]
pub struct Device {
    pub id: i64,
    pub user_id: String,
    pub device_type: DeviceType,
    pub fcm_token: String,
    pub device_id: Option<String>,
    pub device_name: Option<String>,
    pub browser_info: Option<String>,
    pub is_active: bool,
    pub created_at: String,
    pub last_seen: String,
}

/// Fields for registering or refreshing a device.
#[derive(Clone, Debug)]
pub struct NewDevice {
    pub user_id: String,
    pub device_type: DeviceType,
    pub fcm_token: String,
    pub device_id: Option<String>,
    pub device_name: Option<String>,
    pub browser_info: Option<String>,
}

/// A stored notification along with its push delivery counts.
#[derive(Clone, Debug, Serialize)]
pub struct NotificationRecord {
    pub id: i64,
    pub user_id: String,
    pub title: String,
    pub message: String,
    pub kind: String,
    pub data: Option<serde_json::Value>,
    pub is_read: bool,
    pub push_success_count: i64,
    pub push_failure_count: i64,
    pub created_at: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct NotificationStats {
    pub total_notifications: i64,
    pub unread_count: i64,
    pub recent_count: i64,
    pub active_devices: i64,
}
