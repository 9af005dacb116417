use thiserror::Error;

/// Errors from the FCM delivery path.
#[derive(Debug, Error)]
pub enum FcmError {
    /// The device token is no longer registered with FCM.
    #[error("FCM token is unregistered")]
    Unregistered,

    /// The token was issued for a different sender ID.
    #[error("Sender ID mismatch for device token")]
    SenderIdMismatch,

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Access token request failed: {0}")]
    Auth(String),

    #[error("FCM API error: {status} - {body}")]
    Api { status: u16, body: String },

    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    #[error(transparent)]
    Jwt(#[from] jsonwebtoken::errors::Error),
}

impl FcmError {
    /// Whether the stored device token is invalid and should be
    /// deactivated rather than retried.
    pub fn should_remove_token(&self) -> bool {
        matches!(self, FcmError::Unregistered | FcmError::SenderIdMismatch)
    }
}
