use std::env;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub storage_path: String,
    pub db_path: String,
    pub assets_path: String,
    pub notification_icon: String,
    pub notification_link: String,
    pub fcm_api_base: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        let storage_path = env::var("PUSHBRIDGE_STORAGE_PATH").unwrap_or("./".to_string());
        let db_path = format!("{}/db", storage_path);
        let assets_path =
            env::var("PUSHBRIDGE_ASSETS_PATH").unwrap_or_else(|_| "./web".to_string());
        let notification_icon = env::var("PUSHBRIDGE_NOTIFICATION_ICON")
            .unwrap_or_else(|_| "/icon-192x192.png".to_string());
        let notification_link =
            env::var("PUSHBRIDGE_NOTIFICATION_LINK").unwrap_or_else(|_| "/".to_string());
        let fcm_api_base = env::var("PUSHBRIDGE_FCM_API_BASE")
            .unwrap_or_else(|_| "https://fcm.googleapis.com".to_string());

        Self {
            storage_path,
            db_path,
            assets_path,
            notification_icon,
            notification_link,
            fcm_api_base,
        }
    }
}
