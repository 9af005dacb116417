//! Router for the notifications API

use std::sync::{Arc, RwLock};

use axum::response::{IntoResponse, Response};
use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post, put},
};
use axum_extra::extract::Query;
use serde_json::json;

use super::public;
use crate::api::state::AppState;
use crate::notify;

type SharedState = Arc<RwLock<AppState>>;

const MAX_PAGE_SIZE: i64 = 100;

// List a user's notifications, newest first
pub(crate) async fn list_notifications(
    State(state): State<SharedState>,
    Query(params): Query<public::NotificationListQuery>,
) -> Result<Json<Vec<notify::models::NotificationRecord>>, crate::api::public::ApiError> {
    let db = state.read().unwrap().db.clone();
    // Negative values would reach SQLite as LIMIT -1 (unbounded)
    let limit = params.limit.unwrap_or(20).clamp(0, MAX_PAGE_SIZE);
    let offset = params.offset.unwrap_or(0).max(0);

    let records =
        notify::list_notifications(&db, params.user_id, params.unread_only, limit, offset).await?;
    Ok(Json(records))
}

// Mark one notification as read
async fn mark_read(
    State(state): State<SharedState>,
    Path(notification_id): Path<i64>,
    Json(request): Json<public::MarkReadRequest>,
) -> Result<Response, crate::api::public::ApiError> {
    let db = state.read().unwrap().db.clone();
    let updated = notify::mark_notification_read(&db, notification_id, request.user_id).await?;

    if !updated {
        return Ok((StatusCode::NOT_FOUND, "Notification not found").into_response());
    }
    Ok(Json(json!({ "notification_id": notification_id, "is_read": true })).into_response())
}

// Mark all of a user's notifications as read
async fn mark_all_read(
    State(state): State<SharedState>,
    Json(request): Json<public::UserQuery>,
) -> Result<Json<serde_json::Value>, crate::api::public::ApiError> {
    let db = state.read().unwrap().db.clone();
    let updated = notify::mark_all_notifications_read(&db, request.user_id).await?;
    Ok(Json(json!({ "marked_read": updated })))
}

// Count of unread notifications
async fn get_unread_count(
    State(state): State<SharedState>,
    Query(params): Query<public::UserQuery>,
) -> Result<Json<serde_json::Value>, crate::api::public::ApiError> {
    let db = state.read().unwrap().db.clone();
    let count = notify::unread_count(&db, params.user_id).await?;
    Ok(Json(json!({ "unread_count": count })))
}

// Notification statistics for the settings view
async fn get_stats(
    State(state): State<SharedState>,
    Query(params): Query<public::UserQuery>,
) -> Result<Json<notify::models::NotificationStats>, crate::api::public::ApiError> {
    let db = state.read().unwrap().db.clone();
    let stats = notify::notification_stats(&db, params.user_id).await?;
    Ok(Json(stats))
}

// Create a notification and push it to the user's active devices
async fn send_notification(
    State(state): State<SharedState>,
    Json(request): Json<public::SendNotificationRequest>,
) -> Result<Json<serde_json::Value>, crate::api::public::ApiError> {
    let (db, sender) = {
        let shared_state = state.read().unwrap();
        (shared_state.db.clone(), shared_state.sender.clone())
    };

    let kind = request.kind.unwrap_or_else(|| "general".to_string());
    let (notification_id, result) = notify::create_and_send_notification(
        &db,
        sender.as_ref(),
        &request.user_id,
        &request.title,
        &request.message,
        &kind,
        request.data,
    )
    .await?;

    Ok(Json(json!({
        "notification_id": notification_id,
        "push_success_count": result.success,
        "push_failure_count": result.failed,
    })))
}

// Delete one notification
async fn delete_notification(
    State(state): State<SharedState>,
    Path(notification_id): Path<i64>,
    Query(params): Query<public::UserQuery>,
) -> Result<Response, crate::api::public::ApiError> {
    let db = state.read().unwrap().db.clone();
    let deleted = notify::delete_notification(&db, notification_id, params.user_id).await?;

    if !deleted {
        return Ok((StatusCode::NOT_FOUND, "Notification not found").into_response());
    }
    Ok(Json(json!({ "notification_id": notification_id })).into_response())
}

// Delete all of a user's notifications
async fn clear_all_notifications(
    State(state): State<SharedState>,
    Query(params): Query<public::UserQuery>,
) -> Result<Json<serde_json::Value>, crate::api::public::ApiError> {
    let db = state.read().unwrap().db.clone();
    let deleted = notify::clear_all_notifications(&db, params.user_id).await?;
    Ok(Json(json!({ "deleted_count": deleted })))
}

// Send a canned test notification so users can verify their setup
async fn send_test(
    State(state): State<SharedState>,
    Json(request): Json<public::TestNotificationRequest>,
) -> Result<Json<serde_json::Value>, crate::api::public::ApiError> {
    let (db, sender) = {
        let shared_state = state.read().unwrap();
        (shared_state.db.clone(), shared_state.sender.clone())
    };

    let (notification_id, result) = notify::send_test_notification(
        &db,
        sender.as_ref(),
        &request.user_id,
        request.title,
        request.message,
    )
    .await?;

    Ok(Json(json!({
        "notification_id": notification_id,
        "push_success_count": result.success,
        "push_failure_count": result.failed,
    })))
}

/// Create the notifications router
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/", get(list_notifications))
        .route("/{id}/read", put(mark_read))
        .route("/read-all", put(mark_all_read))
        .route("/unread-count", get(get_unread_count))
        .route("/stats", get(get_stats))
        .route("/send", post(send_notification))
        .route("/test", post(send_test))
        .route("/{id}", delete(delete_notification))
        .route("/clear-all", delete(clear_all_notifications))
}
