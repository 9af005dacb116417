//! API routes module

pub mod devices;
pub mod notifications;

use std::sync::{Arc, RwLock};

use crate::api::state::AppState;
use axum::Router;

type SharedState = Arc<RwLock<AppState>>;

/// Create the combined API router
pub fn router() -> Router<SharedState> {
    Router::new()
        // Device registration routes
        .nest("/devices", devices::router())
        // Notification routes
        .nest("/notifications", notifications::router())
        // The list endpoints are also reachable with a trailing
        // slash, the canonical form of the original API; nested "/"
        // routes only match the bare prefix in axum
        .route("/devices/", axum::routing::get(devices::list_devices))
        .route(
            "/notifications/",
            axum::routing::get(notifications::list_notifications),
        )
}
