use std::collections::HashMap;

use anyhow::Context;
use rusqlite::{
    ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};

/// Firebase service account credentials. Loaded from the
/// `FCM_SERVICE_ACCOUNT` environment variable as JSON, matching the
/// key file downloaded from the Firebase console.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServiceAccountKey {
    pub project_id: String,
    #[serde(default)]
    pub private_key_id: String,
    pub private_key: String,
    pub client_email: String,
    #[serde(default)]
    pub client_id: String,
    #[serde(default = "default_auth_uri")]
    pub auth_uri: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_auth_uri() -> String {
    "https://accounts.google.com/o/oauth2/auth".to_string()
}

fn default_token_uri() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

impl ServiceAccountKey {
    pub fn from_env() -> anyhow::Result<Self> {
        let raw = std::env::var("FCM_SERVICE_ACCOUNT")
            .context("Missing env var FCM_SERVICE_ACCOUNT")?;
        let key = serde_json::from_str(&raw)
            .context("Failed to parse FCM_SERVICE_ACCOUNT as a service account key")?;
        Ok(key)
    }
}

/// Kind of device a token was registered from. Drives how the FCM
/// message is shaped and is stored with each registered device.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceType {
    Web,
    Android,
    Ios,
}

impl ToSql for DeviceType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        // Round-trip through serde so the stored string always
        // matches a `DeviceType` variant.
        let name = serde_json::to_string(self).expect("Failed to parse enum into string");
        let value: String = serde_json::from_str(&name).expect("Failed to parse string from enum");
        Ok(value.into())
    }
}

impl FromSql for DeviceType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        // Serde deserialization can only parse an enum from string if
        // it's double quoted.
        serde_json::from_str(&format!("\"{}\"", value.as_str()?))
            .map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}

// OAuth2 exchange types

/// Claims for the service-account JWT exchanged for an access token.
#[derive(Debug, Serialize)]
pub struct JwtClaims {
    pub iss: String,
    pub sub: String,
    pub scope: String,
    pub aud: String,
    pub exp: i64,
    pub iat: i64,
}

#[derive(Debug, Deserialize)]
pub struct GoogleTokenResponse {
    pub access_token: String,
    pub expires_in: i64,
}

#[derive(Clone, Debug)]
pub struct TokenCache {
    pub access_token: String,
    pub expires_at: i64,
}

// FCM v1 wire types

#[derive(Debug, Serialize)]
pub struct FcmMessage {
    pub message: FcmMessageContent,
}

#[derive(Debug, Serialize)]
pub struct FcmMessageContent {
    pub token: String,
    pub notification: FcmNotification,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub data: HashMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub android: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub apns: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webpush: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
pub struct FcmNotification {
    pub title: String,
    pub body: String,
}

#[derive(Debug, Deserialize)]
pub struct FcmApiResponse {
    pub name: Option<String>,
}

/// Aggregated outcome of sending one notification to a set of
/// devices.
#[derive(Clone, Debug, Default, Serialize)]
pub struct FanoutResult {
    pub success: usize,
    pub failed: usize,
    pub tokens_to_remove: Vec<String>,
}
