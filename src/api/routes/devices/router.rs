//! Router for the devices API

use std::sync::{Arc, RwLock};

use axum::response::{IntoResponse, Response};
use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header},
    routing::{delete, get, post, put},
};
use axum_extra::extract::Query;
use serde_json::json;

use super::public;
use crate::api::state::AppState;
use crate::fcm::{DeviceType, FcmClient};
use crate::notify;
use crate::notify::models::NewDevice;

type SharedState = Arc<RwLock<AppState>>;

/// Pick a readable device name when the client did not supply one.
fn default_device_name(device_type: DeviceType, user_agent: &str) -> String {
    match device_type {
        DeviceType::Web => {
            if user_agent.contains("Chrome") {
                "Chrome Browser"
            } else if user_agent.contains("Firefox") {
                "Firefox Browser"
            } else if user_agent.contains("Safari") {
                "Safari Browser"
            } else {
                "Web Browser"
            }
        }
        DeviceType::Android => "Android Device",
        DeviceType::Ios => "iOS Device",
    }
    .to_string()
}

// Register (or refresh) a device for push notifications
async fn register_device(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(request): Json<public::RegisterDeviceRequest>,
) -> Result<Response, crate::api::public::ApiError> {
    if !FcmClient::validate_token(&request.fcm_token) {
        return Ok((StatusCode::UNPROCESSABLE_ENTITY, "Invalid FCM token").into_response());
    }

    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("Unknown")
        .chars()
        .take(500)
        .collect::<String>();

    let device_name = request
        .device_name
        .clone()
        .unwrap_or_else(|| default_device_name(request.device_type, &user_agent));

    let db = state.read().unwrap().db.clone();
    let (device_id, created) = notify::upsert_device(
        &db,
        NewDevice {
            user_id: request.user_id.clone(),
            device_type: request.device_type,
            fcm_token: request.fcm_token,
            device_id: request.device_id,
            device_name: Some(device_name.clone()),
            browser_info: request.browser_info.or(Some(user_agent)),
        },
    )
    .await?;

    let action = if created { "created" } else { "updated" };
    tracing::info!(
        "{} {:?} device {} for user {}",
        action,
        request.device_type,
        device_id,
        request.user_id
    );

    Ok(Json(json!({
        "device_id": device_id,
        "device_name": device_name,
        "action": action,
    }))
    .into_response())
}

// List all of a user's registered devices
pub(crate) async fn list_devices(
    State(state): State<SharedState>,
    Query(params): Query<public::DeviceListQuery>,
) -> Result<Json<Vec<notify::models::Device>>, crate::api::public::ApiError> {
    let db = state.read().unwrap().db.clone();
    let devices = notify::list_devices(&db, params.user_id).await?;
    Ok(Json(devices))
}

// Enable or disable notifications for a single device
async fn toggle_device(
    State(state): State<SharedState>,
    Path(device_id): Path<i64>,
    Json(request): Json<public::ToggleDeviceRequest>,
) -> Result<Response, crate::api::public::ApiError> {
    let db = state.read().unwrap().db.clone();
    let updated =
        notify::set_device_active(&db, device_id, request.user_id, request.enable).await?;

    if !updated {
        return Ok((StatusCode::NOT_FOUND, "Device not found").into_response());
    }
    Ok(Json(json!({
        "device_id": device_id,
        "is_active": request.enable,
    }))
    .into_response())
}

// Rotate the FCM token for a device
async fn update_device_token(
    State(state): State<SharedState>,
    Path(device_id): Path<i64>,
    Json(request): Json<public::UpdateTokenRequest>,
) -> Result<Response, crate::api::public::ApiError> {
    if !FcmClient::validate_token(&request.fcm_token) {
        return Ok((StatusCode::UNPROCESSABLE_ENTITY, "Invalid FCM token").into_response());
    }

    let db = state.read().unwrap().db.clone();
    let updated =
        notify::update_device_token(&db, device_id, request.user_id, request.fcm_token).await?;

    if !updated {
        return Ok((StatusCode::NOT_FOUND, "Device not found").into_response());
    }
    Ok(Json(json!({ "device_id": device_id })).into_response())
}

// Remove a device from the user's registered devices
async fn remove_device(
    State(state): State<SharedState>,
    Path(device_id): Path<i64>,
    Query(params): Query<public::RemoveDeviceQuery>,
) -> Result<Response, crate::api::public::ApiError> {
    let db = state.read().unwrap().db.clone();
    let removed = notify::remove_device(&db, device_id, params.user_id).await?;

    match removed {
        Some(device_name) => Ok(Json(json!({
            "device_id": device_id,
            "device_name": device_name,
        }))
        .into_response()),
        None => Ok((StatusCode::NOT_FOUND, "Device not found").into_response()),
    }
}

/// Create the devices router
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/register", post(register_device))
        .route("/", get(list_devices))
        .route("/{id}/toggle", put(toggle_device))
        .route("/{id}/token", put(update_device_token))
        .route("/{id}", delete(remove_device))
}
