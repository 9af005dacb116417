//! Integration tests for the notifications API endpoints

mod test_utils;

#[cfg(test)]
mod tests {
    use axum::{
        Router,
        body::Body,
        http::{Request, StatusCode},
    };
    use serde_json::Value;
    use serial_test::serial;
    use tower::util::ServiceExt;

    use crate::test_utils::{RecordingSender, body_to_string, test_app, test_app_with_sender};

    async fn register_device(app: &Router, user_id: &str, token: &str) {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/devices/register")
                    .method("POST")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        serde_json::json!({
                            "user_id": user_id,
                            "device_type": "web",
                            "fcm_token": token,
                        })
                        .to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    async fn send_notification(app: &Router, user_id: &str, title: &str, message: &str) -> Value {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/notifications/send")
                    .method("POST")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        serde_json::json!({
                            "user_id": user_id,
                            "title": title,
                            "message": message,
                        })
                        .to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        serde_json::from_str(&body_to_string(response.into_body()).await).unwrap()
    }

    /// Tests a notification is pushed to each registered device
    #[tokio::test]
    #[serial]
    async fn it_sends_a_notification_to_registered_devices() {
        let sender = RecordingSender::default();
        let app = test_app_with_sender(sender.clone()).await;

        register_device(&app, "user-1", "test-device-token-0123456789").await;
        let result = send_notification(&app, "user-1", "Booking Confirmed", "See you at 10:00").await;

        assert_eq!(result["push_success_count"], 1);
        assert_eq!(result["push_failure_count"], 0);

        let sent = sender.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].title, "Booking Confirmed");
        assert_eq!(sent[0].body, "See you at 10:00");
        // Standard data fields ride along with every push
        assert_eq!(sent[0].data["notification_kind"], "general");
        assert_eq!(sent[0].data["user_id"], "user-1");
        assert!(sent[0].data.contains_key("notification_id"));
    }

    /// Tests notifications are stored even when the user has no devices
    #[tokio::test]
    #[serial]
    async fn it_stores_notification_when_user_has_no_devices() {
        let app = test_app().await;

        let result = send_notification(&app, "user-1", "T", "B").await;
        assert_eq!(result["push_success_count"], 0);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/notifications/?user_id=user-1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let records: Vec<Value> =
            serde_json::from_str(&body_to_string(response.into_body()).await).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["title"], "T");
        assert_eq!(records[0]["is_read"], false);
    }

    /// Tests devices with stale tokens are deactivated after a failed push
    #[tokio::test]
    #[serial]
    async fn it_deactivates_devices_with_unregistered_tokens() {
        let sender = RecordingSender::default();
        let app = test_app_with_sender(sender.clone()).await;

        register_device(&app, "user-1", "unregistered-device-token-0123").await;
        let result = send_notification(&app, "user-1", "T", "B").await;
        assert_eq!(result["push_failure_count"], 1);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/devices/?user_id=user-1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let devices: Vec<Value> =
            serde_json::from_str(&body_to_string(response.into_body()).await).unwrap();
        assert_eq!(devices[0]["is_active"], false);
    }

    /// Tests listing with the unread_only filter
    #[tokio::test]
    #[serial]
    async fn it_filters_unread_notifications() {
        let app = test_app().await;

        send_notification(&app, "user-1", "first", "1").await;
        send_notification(&app, "user-1", "second", "2").await;

        // Mark the most recent notification as read
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/notifications/?user_id=user-1&limit=1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let records: Vec<Value> =
            serde_json::from_str(&body_to_string(response.into_body()).await).unwrap();
        let id = records[0]["id"].as_i64().unwrap();

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri(format!("/api/notifications/{}/read", id))
                    .method("PUT")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        serde_json::json!({ "user_id": "user-1" }).to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/notifications/?user_id=user-1&unread_only=true")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let records: Vec<Value> =
            serde_json::from_str(&body_to_string(response.into_body()).await).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["is_read"], false);
    }

    /// Tests marking an unknown notification as read returns 404
    #[tokio::test]
    #[serial]
    async fn it_returns_404_for_marking_unknown_notification() {
        let app = test_app().await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/notifications/999/read")
                    .method("PUT")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        serde_json::json!({ "user_id": "user-1" }).to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    /// Tests marking everything read and the unread counter
    #[tokio::test]
    #[serial]
    async fn it_marks_all_notifications_read() {
        let app = test_app().await;

        send_notification(&app, "user-1", "first", "1").await;
        send_notification(&app, "user-1", "second", "2").await;

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/notifications/read-all")
                    .method("PUT")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        serde_json::json!({ "user_id": "user-1" }).to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        let result: Value =
            serde_json::from_str(&body_to_string(response.into_body()).await).unwrap();
        assert_eq!(result["marked_read"], 2);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/notifications/unread-count?user_id=user-1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let result: Value =
            serde_json::from_str(&body_to_string(response.into_body()).await).unwrap();
        assert_eq!(result["unread_count"], 0);
    }

    /// Tests deleting a notification, and that it stays deleted
    #[tokio::test]
    #[serial]
    async fn it_deletes_a_notification() {
        let app = test_app().await;

        send_notification(&app, "user-1", "T", "B").await;
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/notifications/?user_id=user-1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let records: Vec<Value> =
            serde_json::from_str(&body_to_string(response.into_body()).await).unwrap();
        let id = records[0]["id"].as_i64().unwrap();

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri(format!("/api/notifications/{}?user_id=user-1", id))
                    .method("DELETE")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        // Deleting again returns 404
        let response = app
            .oneshot(
                Request::builder()
                    .uri(format!("/api/notifications/{}?user_id=user-1", id))
                    .method("DELETE")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    /// Tests another user cannot delete someone else's notification
    #[tokio::test]
    #[serial]
    async fn it_returns_404_for_deleting_another_users_notification() {
        let app = test_app().await;

        send_notification(&app, "user-1", "T", "B").await;
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/notifications/?user_id=user-1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let records: Vec<Value> =
            serde_json::from_str(&body_to_string(response.into_body()).await).unwrap();
        let id = records[0]["id"].as_i64().unwrap();

        let response = app
            .oneshot(
                Request::builder()
                    .uri(format!("/api/notifications/{}?user_id=user-2", id))
                    .method("DELETE")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    /// Tests clearing all of a user's notifications
    #[tokio::test]
    #[serial]
    async fn it_clears_all_notifications() {
        let app = test_app().await;

        send_notification(&app, "user-1", "first", "1").await;
        send_notification(&app, "user-1", "second", "2").await;

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/notifications/clear-all?user_id=user-1")
                    .method("DELETE")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let result: Value =
            serde_json::from_str(&body_to_string(response.into_body()).await).unwrap();
        assert_eq!(result["deleted_count"], 2);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/notifications/?user_id=user-1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let records: Vec<Value> =
            serde_json::from_str(&body_to_string(response.into_body()).await).unwrap();
        assert!(records.is_empty());
    }

    /// Tests negative paging values never reach SQLite as unbounded
    /// queries
    #[tokio::test]
    #[serial]
    async fn it_clamps_negative_paging_values() {
        let app = test_app().await;

        send_notification(&app, "user-1", "T", "B").await;

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/notifications/?user_id=user-1&limit=-1&offset=-5")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let records: Vec<Value> =
            serde_json::from_str(&body_to_string(response.into_body()).await).unwrap();
        // limit clamps to zero rows rather than SQLite's LIMIT -1
        // meaning "no limit"
        assert!(records.is_empty());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/notifications/?user_id=user-1&offset=-5")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let records: Vec<Value> =
            serde_json::from_str(&body_to_string(response.into_body()).await).unwrap();
        assert_eq!(records.len(), 1);
    }

    /// Tests the stats endpoint aggregates counts
    #[tokio::test]
    #[serial]
    async fn it_returns_notification_stats() {
        let sender = RecordingSender::default();
        let app = test_app_with_sender(sender).await;

        register_device(&app, "user-1", "test-device-token-0123456789").await;
        send_notification(&app, "user-1", "T", "B").await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/notifications/stats?user_id=user-1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let stats: Value =
            serde_json::from_str(&body_to_string(response.into_body()).await).unwrap();
        assert_eq!(stats["total_notifications"], 1);
        assert_eq!(stats["unread_count"], 1);
        assert_eq!(stats["recent_count"], 1);
        assert_eq!(stats["active_devices"], 1);
    }

    /// Tests the canned test notification
    #[tokio::test]
    #[serial]
    async fn it_sends_a_test_notification() {
        let sender = RecordingSender::default();
        let app = test_app_with_sender(sender.clone()).await;

        register_device(&app, "user-1", "test-device-token-0123456789").await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/notifications/test")
                    .method("POST")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        serde_json::json!({ "user_id": "user-1" }).to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let sent = sender.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].title, "Test Notification");
        assert_eq!(sent[0].data["test"], "true");
        assert_eq!(sent[0].data["notification_kind"], "test_notification");
    }

    /// Tests send returns 422 for a missing message field
    #[tokio::test]
    #[serial]
    async fn it_returns_422_for_missing_message() {
        let app = test_app().await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/notifications/send")
                    .method("POST")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        serde_json::json!({ "user_id": "user-1", "title": "T" }).to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        // Missing required field should return 422 (validation error)
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    /// Tests notification endpoints return 405 for wrong methods
    #[tokio::test]
    #[serial]
    async fn it_returns_405_for_get_on_send() {
        let app = test_app().await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/notifications/send")
                    .method("GET")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        // Method not allowed for GET on POST endpoint
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
