// ── Route table ──

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

use crate::AppState;
use crate::handlers::{portal, webhook};

/// Build the portal router with all endpoints and middleware.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/v1/packages", get(portal::list_packages))
        .route("/api/v1/login", post(portal::login))
        .route("/api/v1/status", get(portal::status))
        .route("/api/v1/logout", post(portal::logout))
        .route("/api/v1/purchase", post(portal::purchase))
        .route("/telegram/webhook/:secret", post(webhook::telegram_webhook))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
