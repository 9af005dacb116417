use std::sync::Arc;

use tokio_rusqlite::Connection;

use crate::core::AppConfig;
use crate::fcm::PushSender;

pub struct AppState {
    pub db: Connection,
    pub config: AppConfig,
    pub sender: Arc<dyn PushSender>,
}

impl AppState {
    pub fn new(db: Connection, config: AppConfig, sender: Arc<dyn PushSender>) -> Self {
        Self { db, config, sender }
    }
}
