use super::client::BackgroundMessageHandler;
use super::payload::PushPayload;

/// Icon resource shown for every notification regardless of payload
/// content.
pub const NOTIFICATION_ICON: &str = "/icon-192x192.png";

/// Parameters for a host-level notification display request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NotificationOptions {
    pub body: String,
    pub icon: String,
}

/// Host capability for displaying a system notification. Once a
/// display request is issued its completion is owned entirely by the
/// host; the adapter neither observes nor reports the outcome.
pub trait Notifier: Send + Sync {
    fn show_notification(&self, title: &str, options: NotificationOptions);
}

/// Maps each delivered payload to a single notification display
/// request. Stateless across invocations.
pub struct BackgroundMessageAdapter<N: Notifier> {
    notifier: N,
    icon: String,
}

impl<N: Notifier> BackgroundMessageAdapter<N> {
    pub fn new(notifier: N) -> Self {
        Self::with_icon(notifier, NOTIFICATION_ICON)
    }

    pub fn with_icon(notifier: N, icon: &str) -> Self {
        Self {
            notifier,
            icon: icon.to_string(),
        }
    }
}

impl<N: Notifier> BackgroundMessageHandler for BackgroundMessageAdapter<N> {
    fn handle(&self, payload: PushPayload) {
        let Some(notification) = payload.notification else {
            // Data-only messages are valid upstream; nothing to display
            tracing::warn!("Push payload has no notification section, skipping display");
            return;
        };

        self.notifier.show_notification(
            &notification.title,
            NotificationOptions {
                body: notification.body,
                icon: self.icon.clone(),
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use super::super::payload::NotificationDescriptor;
    use super::*;

    #[derive(Clone, Default)]
    struct RecordingNotifier {
        requests: Arc<Mutex<Vec<(String, NotificationOptions)>>>,
    }

    impl Notifier for RecordingNotifier {
        fn show_notification(&self, title: &str, options: NotificationOptions) {
            self.requests
                .lock()
                .unwrap()
                .push((title.to_string(), options));
        }
    }

    fn payload(title: &str, body: &str) -> PushPayload {
        PushPayload {
            notification: Some(NotificationDescriptor {
                title: title.to_string(),
                body: body.to_string(),
            }),
            data: HashMap::new(),
        }
    }

    #[test]
    fn it_displays_title_body_and_fixed_icon() {
        let notifier = RecordingNotifier::default();
        let adapter = BackgroundMessageAdapter::new(notifier.clone());

        adapter.handle(payload("T", "B"));

        let requests = notifier.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].0, "T");
        assert_eq!(
            requests[0].1,
            NotificationOptions {
                body: "B".to_string(),
                icon: NOTIFICATION_ICON.to_string(),
            }
        );
    }

    #[test]
    fn it_skips_display_for_data_only_payloads() {
        let notifier = RecordingNotifier::default();
        let adapter = BackgroundMessageAdapter::new(notifier.clone());

        adapter.handle(PushPayload {
            notification: None,
            data: HashMap::from([("booking_id".to_string(), "42".to_string())]),
        });

        assert!(notifier.requests.lock().unwrap().is_empty());
    }

    #[test]
    fn it_handles_consecutive_payloads_independently() {
        let notifier = RecordingNotifier::default();
        let adapter = BackgroundMessageAdapter::new(notifier.clone());

        adapter.handle(payload("first", "one"));
        adapter.handle(payload("second", "two"));

        let requests = notifier.requests.lock().unwrap();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].0, "first");
        assert_eq!(requests[0].1.body, "one");
        assert_eq!(requests[1].0, "second");
        assert_eq!(requests[1].1.body, "two");
    }

    #[test]
    fn it_uses_a_constant_icon_across_invocations() {
        let notifier = RecordingNotifier::default();
        let adapter = BackgroundMessageAdapter::new(notifier.clone());

        adapter.handle(payload("a", "alpha"));
        adapter.handle(payload("b", "beta"));

        let requests = notifier.requests.lock().unwrap();
        assert!(
            requests
                .iter()
                .all(|(_, options)| options.icon == NOTIFICATION_ICON)
        );
    }

    #[test]
    fn it_registers_with_a_messaging_client() {
        use super::super::client::MessagingClient;
        use super::super::config::FirebaseConfig;

        let notifier = RecordingNotifier::default();
        let mut client = MessagingClient::new(FirebaseConfig {
            api_key: "test-api-key".to_string(),
            auth_domain: "test.firebaseapp.com".to_string(),
            project_id: "test-project".to_string(),
            storage_bucket: "test.appspot.com".to_string(),
            messaging_sender_id: "1234567890".to_string(),
            app_id: "1:1234567890:web:abcdef".to_string(),
            measurement_id: "G-TEST".to_string(),
        })
        .unwrap();
        client.on_background_message(BackgroundMessageAdapter::new(notifier.clone()));

        client.dispatch(payload("T", "B"));

        assert_eq!(notifier.requests.lock().unwrap().len(), 1);
    }
}
