use anyhow::{Result, bail};

use super::config::FirebaseConfig;
use super::payload::PushPayload;

/// Callback invoked by the host runtime for every message delivered
/// while the hosting context is backgrounded.
pub trait BackgroundMessageHandler: Send + Sync {
    fn handle(&self, payload: PushPayload);
}

impl<F> BackgroundMessageHandler for F
where
    F: Fn(PushPayload) + Send + Sync,
{
    fn handle(&self, payload: PushPayload) {
        self(payload)
    }
}

/// Handle representing a binding to the push backend for one
/// project. Constructed explicitly and passed where needed so tests
/// can substitute their own instance. Handles built from distinct
/// configurations share no state.
pub struct MessagingClient {
    config: FirebaseConfig,
    handler: Option<Box<dyn BackgroundMessageHandler>>,
}

impl std::fmt::Debug for MessagingClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessagingClient")
            .field("config", &self.config)
            .field("handler", &self.handler.as_ref().map(|_| "..."))
            .finish()
    }
}

impl MessagingClient {
    /// Bind to the push backend. A malformed configuration is fatal
    /// to startup; it is not caught or retried.
    pub fn new(config: FirebaseConfig) -> Result<Self> {
        for (field, value) in [
            ("api_key", &config.api_key),
            ("project_id", &config.project_id),
            ("messaging_sender_id", &config.messaging_sender_id),
            ("app_id", &config.app_id),
        ] {
            if value.is_empty() {
                bail!("Messaging config is missing required field: {}", field);
            }
        }
        Ok(Self {
            config,
            handler: None,
        })
    }

    pub fn config(&self) -> &FirebaseConfig {
        &self.config
    }

    /// Register the single handler invoked once per delivered
    /// message. Registering again replaces the previous handler.
    pub fn on_background_message(&mut self, handler: impl BackgroundMessageHandler + 'static) {
        self.handler = Some(Box::new(handler));
    }

    /// Entry point for the host runtime's event dispatch. Each
    /// invocation is independent; no state is retained between them
    /// and no ordering is guaranteed.
    pub fn dispatch(&self, payload: PushPayload) {
        match &self.handler {
            Some(handler) => handler.handle(payload),
            None => {
                tracing::debug!("No background message handler registered, dropping message")
            }
        }
    }
}
