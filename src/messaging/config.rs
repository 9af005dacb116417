use serde::Deserialize;

/// Project configuration issued by the push backend provisioning
/// step. All fields are opaque identifiers.
#[derive(Clone, Debug, Deserialize)]
pub struct FirebaseConfig {
    pub api_key: String,
    pub auth_domain: String,
    pub project_id: String,
    pub storage_bucket: String,
    pub messaging_sender_id: String,
    pub app_id: String,
    pub measurement_id: String,
}
