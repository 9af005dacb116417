//! Public types for the devices API
use serde::Deserialize;

use crate::fcm::DeviceType;

#[derive(Deserialize)]
pub struct RegisterDeviceRequest {
    pub user_id: String,
    pub device_type: DeviceType,
    pub fcm_token: String,
    pub device_id: Option<String>,
    pub device_name: Option<String>,
    pub browser_info: Option<String>,
}

#[derive(Deserialize)]
pub struct DeviceListQuery {
    pub user_id: String,
}

#[derive(Deserialize)]
pub struct ToggleDeviceRequest {
    pub user_id: String,
    pub enable: bool,
}

#[derive(Deserialize)]
pub struct UpdateTokenRequest {
    pub user_id: String,
    pub fcm_token: String,
}

#[derive(Deserialize)]
pub struct RemoveDeviceQuery {
    pub user_id: String,
}
