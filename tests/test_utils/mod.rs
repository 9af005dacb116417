//! Test utilities for integration tests
#![allow(dead_code)]
use std::collections::HashMap;
use std::fs;
use std::sync::{Arc, Mutex, RwLock};

use async_trait::async_trait;
use axum::{Router, body::Body};

use pushbridge::api::AppState;
use pushbridge::api::app;
use pushbridge::core::AppConfig;
use pushbridge::core::db::{async_db, initialize_db};
use pushbridge::fcm::{DeviceType, FcmError, PushSender};

/// One push delivery captured by the `RecordingSender`.
#[derive(Clone, Debug)]
pub struct SentPush {
    pub device_token: String,
    pub device_type: DeviceType,
    pub title: String,
    pub body: String,
    pub data: HashMap<String, String>,
}

/// A `PushSender` that records deliveries instead of talking to FCM.
/// Tokens containing "unregistered" fail the way FCM reports stale
/// tokens, so tests can exercise the deactivation path.
#[derive(Clone, Default)]
pub struct RecordingSender {
    pub sent: Arc<Mutex<Vec<SentPush>>>,
}

#[async_trait]
impl PushSender for RecordingSender {
    async fn send(
        &self,
        device_token: &str,
        device_type: DeviceType,
        title: &str,
        body: &str,
        data: &HashMap<String, String>,
    ) -> Result<String, FcmError> {
        if device_token.contains("unregistered") {
            return Err(FcmError::Unregistered);
        }

        let mut sent = self.sent.lock().unwrap();
        sent.push(SentPush {
            device_token: device_token.to_string(),
            device_type,
            title: title.to_string(),
            body: body.to_string(),
            data: data.clone(),
        });
        Ok(format!("projects/test-project/messages/{}", sent.len()))
    }
}

/// Creates a test application router backed by a temporary database
/// and the given push sender.
pub async fn test_app_with_sender(sender: RecordingSender) -> Router {
    let dir = tempfile::tempdir()
        .expect("Failed to create temp dir")
        .keep();
    let db_path = dir.join("db");
    fs::create_dir_all(&db_path).expect("Failed to create db directory");
    let db_path_str = db_path.to_str().unwrap().to_string();

    let db = async_db(&db_path_str)
        .await
        .expect("Failed to connect to async db");
    db.call(|conn| {
        initialize_db(conn).expect("Failed to migrate db");
        Ok(())
    })
    .await
    .unwrap();

    let app_config = AppConfig {
        storage_path: dir.display().to_string(),
        db_path: db_path_str,
        assets_path: dir.join("web").display().to_string(),
        notification_icon: "/icon-192x192.png".to_string(),
        notification_link: "/".to_string(),
        fcm_api_base: "http://localhost:0".to_string(),
    };
    let app_state = AppState::new(db, app_config, Arc::new(sender));
    app(Arc::new(RwLock::new(app_state)))
}

/// Creates a test application router with a throwaway sender.
pub async fn test_app() -> Router {
    test_app_with_sender(RecordingSender::default()).await
}

pub async fn body_to_string(body: Body) -> String {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Failed to read response body");
    String::from_utf8(bytes.to_vec()).expect("Response body was not utf-8")
}
