//! Axum Router Configuration
//!
//! The service exposes exactly two routes: the WebSocket upgrade for the
//! drill and a liveness probe.

use crate::{state::AppState, ws::ws_handler};
use axum::{Router, routing::get};
use std::sync::Arc;

/// Creates the main Axum router for the application.
pub fn create_router(app_state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/ws/learn", get(ws_handler))
        .with_state(app_state)
}

async fn healthz() -> &'static str {
    "ok"
}
