use std::collections::HashMap;

use anyhow::Result;

use crate::core::AppConfig;
use crate::core::db::async_db;
use crate::fcm::FcmClient;
use crate::notify;

pub async fn run(user_id: &str, title: &str, message: &str) -> Result<()> {
    let config = AppConfig::default();
    let db = async_db(&config.db_path).await?;
    let sender = FcmClient::from_config(&config)?;

    let (notification_id, result) = notify::create_and_send_notification(
        &db,
        &sender,
        user_id,
        title,
        message,
        "manual",
        HashMap::new(),
    )
    .await?;

    println!(
        "Sent notification {}: {} delivered, {} failed",
        notification_id, result.success, result.failed
    );

    Ok(())
}
