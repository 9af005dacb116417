pub mod db;
pub mod models;
pub use db::*;
pub use models::*;

use std::collections::HashMap;

use anyhow::{Error, Result};
use tokio_rusqlite::Connection;

use crate::fcm::PushSender;
use crate::fcm::models::FanoutResult;

/// Create a notification record and push it to every active device
/// registered for the user. Devices whose tokens come back
/// unregistered are deactivated so they are skipped next time.
pub async fn create_and_send_notification(
    db: &Connection,
    sender: &dyn PushSender,
    user_id: &str,
    title: &str,
    message: &str,
    kind: &str,
    extra_data: HashMap<String, String>,
) -> Result<(i64, FanoutResult), Error> {
    let data_json = if extra_data.is_empty() {
        None
    } else {
        Some(serde_json::to_string(&extra_data)?)
    };

    let notification_id = insert_notification(
        db,
        user_id.to_string(),
        title.to_string(),
        message.to_string(),
        kind.to_string(),
        data_json,
    )
    .await?;
    tracing::info!("Created notification {} for user {}", notification_id, user_id);

    let devices = find_active_devices(db, user_id.to_string()).await?;
    if devices.is_empty() {
        tracing::info!("No active devices found for user {}", user_id);
        return Ok((notification_id, FanoutResult::default()));
    }

    // Standard data fields every push carries; FCM requires string
    // values.
    let mut push_data = HashMap::from([
        ("notification_kind".to_string(), kind.to_string()),
        (
            "notification_id".to_string(),
            notification_id.to_string(),
        ),
        ("user_id".to_string(), user_id.to_string()),
    ]);
    push_data.extend(extra_data);

    tracing::info!(
        "Sending push notifications to {} devices for user {}",
        devices.len(),
        user_id
    );

    let mut result = FanoutResult::default();
    for device in &devices {
        match sender
            .send(
                &device.fcm_token,
                device.device_type,
                title,
                message,
                &push_data,
            )
            .await
        {
            Ok(message_id) => {
                tracing::debug!("Delivered push {} to device {}", message_id, device.id);
                result.success += 1;
            }
            Err(error) => {
                tracing::error!("Failed to push to device {}: {}", device.id, error);
                result.failed += 1;
                if error.should_remove_token() {
                    result.tokens_to_remove.push(device.fcm_token.clone());
                }
            }
        }
    }

    if !result.tokens_to_remove.is_empty() {
        tracing::info!(
            "Deactivating {} invalid device tokens",
            result.tokens_to_remove.len()
        );
        for token in &result.tokens_to_remove {
            deactivate_device_token(db, token.clone()).await?;
        }
    }

    record_push_counts(db, notification_id, result.success, result.failed).await?;
    tracing::info!(
        "Push notification results: {} success, {} failed",
        result.success,
        result.failed
    );

    Ok((notification_id, result))
}

/// Send a canned notification so a user can verify their device
/// setup end to end.
pub async fn send_test_notification(
    db: &Connection,
    sender: &dyn PushSender,
    user_id: &str,
    title: Option<String>,
    message: Option<String>,
) -> Result<(i64, FanoutResult), Error> {
    let title = title.unwrap_or_else(|| "Test Notification".to_string());
    let message =
        message.unwrap_or_else(|| "This is a test notification from pushbridge!".to_string());
    let extra_data = HashMap::from([
        ("test".to_string(), "true".to_string()),
        (
            "timestamp".to_string(),
            chrono::Utc::now().to_rfc3339(),
        ),
    ]);

    create_and_send_notification(
        db,
        sender,
        user_id,
        &title,
        &message,
        "test_notification",
        extra_data,
    )
    .await
}
