use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use serde_json::json;

use super::errors::FcmError;
use super::models::{
    DeviceType, FcmApiResponse, FcmMessage, FcmMessageContent, FcmNotification,
    GoogleTokenResponse, JwtClaims, ServiceAccountKey, TokenCache,
};
use crate::core::AppConfig;
use crate::messaging::NOTIFICATION_ICON;

const OAUTH_SCOPE: &str = "https://www.googleapis.com/auth/cloud-platform";

// Refresh the cached access token when it has less than this long
// left to live.
const TOKEN_EXPIRY_MARGIN_SECS: i64 = 60;

/// Seam between notification dispatch and the actual push backend so
/// handlers and the notification service can run against a fake
/// sender in tests.
#[async_trait]
pub trait PushSender: Send + Sync {
    /// Deliver one notification to one device. Returns the backend's
    /// message id.
    async fn send(
        &self,
        device_token: &str,
        device_type: DeviceType,
        title: &str,
        body: &str,
        data: &HashMap<String, String>,
    ) -> Result<String, FcmError>;
}

/// Firebase Cloud Messaging HTTP v1 client. Signs a service-account
/// JWT, exchanges it for an OAuth2 access token (cached until close
/// to expiry), and posts `messages:send` requests.
pub struct FcmClient {
    credentials: Arc<ServiceAccountKey>,
    api_base: String,
    notification_icon: String,
    notification_link: String,
    token_cache: Arc<Mutex<Option<TokenCache>>>,
    http_client: reqwest::Client,
}

impl FcmClient {
    pub fn new(credentials: ServiceAccountKey) -> Self {
        Self {
            credentials: Arc::new(credentials),
            api_base: "https://fcm.googleapis.com".to_string(),
            notification_icon: NOTIFICATION_ICON.to_string(),
            notification_link: "/".to_string(),
            token_cache: Arc::new(Mutex::new(None)),
            http_client: reqwest::Client::new(),
        }
    }

    /// Build a client from the app config, reading credentials from
    /// the `FCM_SERVICE_ACCOUNT` environment variable. Failure here
    /// is fatal to startup.
    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let credentials = ServiceAccountKey::from_env()?;
        Ok(Self {
            api_base: config.fcm_api_base.clone(),
            notification_icon: config.notification_icon.clone(),
            notification_link: config.notification_link.clone(),
            ..Self::new(credentials)
        })
    }

    /// Point the client at a different API host (used by tests).
    pub fn with_api_base(mut self, api_base: &str) -> Self {
        self.api_base = api_base.to_string();
        self
    }

    /// Cheap shape check for a device token before storing it. FCM
    /// tokens are typically 100-200 characters.
    pub fn validate_token(device_token: &str) -> bool {
        device_token.len() >= 10 && device_token.len() <= 1000
    }

    /// Get an OAuth2 access token for the service account, reusing
    /// the cached one while it is still valid.
    async fn access_token(&self) -> Result<String, FcmError> {
        {
            let cache = self.token_cache.lock().expect("Token cache lock poisoned");
            if let Some(cached) = cache.as_ref() {
                if cached.expires_at > Utc::now().timestamp() + TOKEN_EXPIRY_MARGIN_SECS {
                    return Ok(cached.access_token.clone());
                }
            }
        }

        let now = Utc::now();
        let claims = JwtClaims {
            iss: self.credentials.client_email.clone(),
            sub: self.credentials.client_email.clone(),
            scope: OAUTH_SCOPE.to_string(),
            aud: self.credentials.token_uri.clone(),
            exp: (now + Duration::hours(1)).timestamp(),
            iat: now.timestamp(),
        };

        let encoding_key = EncodingKey::from_rsa_pem(self.credentials.private_key.as_bytes())?;
        let assertion = encode(&Header::new(Algorithm::RS256), &claims, &encoding_key)?;

        let params = [
            ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
            ("assertion", &assertion),
        ];
        let response = self
            .http_client
            .post(&self.credentials.token_uri)
            .form(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(FcmError::Auth(format!(
                "token request returned {}",
                response.status()
            )));
        }

        let token_response: GoogleTokenResponse = response.json().await?;
        let expires_at = Utc::now().timestamp() + token_response.expires_in;
        {
            let mut cache = self.token_cache.lock().expect("Token cache lock poisoned");
            *cache = Some(TokenCache {
                access_token: token_response.access_token.clone(),
                expires_at,
            });
        }

        Ok(token_response.access_token)
    }

    /// Shape the FCM message for the target device type. Web devices
    /// get a webpush block carrying the notification icon and click
    /// link; mobile devices get high priority and a default sound.
    fn message_for(
        &self,
        device_token: &str,
        device_type: DeviceType,
        title: &str,
        body: &str,
        data: &HashMap<String, String>,
    ) -> FcmMessage {
        let mut content = FcmMessageContent {
            token: device_token.to_string(),
            notification: FcmNotification {
                title: title.to_string(),
                body: body.to_string(),
            },
            data: data.clone(),
            android: None,
            apns: None,
            webpush: None,
        };

        match device_type {
            DeviceType::Web => {
                content.webpush = Some(json!({
                    "notification": {
                        "title": title,
                        "body": body,
                        "icon": self.notification_icon,
                    },
                    "fcm_options": {
                        "link": self.notification_link,
                    },
                }));
            }
            DeviceType::Android | DeviceType::Ios => {
                content.android = Some(json!({
                    "priority": "high",
                    "notification": {
                        "sound": "default",
                    },
                }));
                content.apns = Some(json!({
                    "payload": {
                        "aps": {
                            "alert": { "title": title, "body": body },
                            "sound": "default",
                        },
                    },
                }));
            }
        }

        FcmMessage { message: content }
    }
}

/// Map a non-OK FCM API response to the error taxonomy. Tokens that
/// came back unregistered or mismatched are flagged for removal by
/// `FcmError::should_remove_token`.
fn classify_api_error(status: u16, body: String) -> FcmError {
    if body.contains("UNREGISTERED") {
        FcmError::Unregistered
    } else if body.contains("SENDER_ID_MISMATCH") {
        FcmError::SenderIdMismatch
    } else if body.contains("INVALID_ARGUMENT") {
        FcmError::InvalidArgument(body)
    } else {
        FcmError::Api { status, body }
    }
}

#[async_trait]
impl PushSender for FcmClient {
    async fn send(
        &self,
        device_token: &str,
        device_type: DeviceType,
        title: &str,
        body: &str,
        data: &HashMap<String, String>,
    ) -> Result<String, FcmError> {
        let access_token = self.access_token().await?;
        let message = self.message_for(device_token, device_type, title, body, data);

        let url = format!(
            "{}/v1/projects/{}/messages:send",
            self.api_base, self.credentials.project_id
        );
        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&access_token)
            .json(&message)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            let api_response: FcmApiResponse = response.json().await?;
            Ok(api_response
                .name
                .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()))
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(classify_api_error(status.as_u16(), body))
        }
    }
}
