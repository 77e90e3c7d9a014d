//! Axum router configuration for the provider webhook endpoint.

use std::time::Duration;

use axum::routing::post;
use axum::Router;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use super::handlers::{receive_provider_event, WebhookAppState};

/// Create the webhook routes.
///
/// # Routes
/// - `POST /provider` - Receive a provider event (signature verified)
pub fn webhook_routes() -> Router<WebhookAppState> {
    Router::new().route("/provider", post(receive_provider_event))
}

/// Create the complete webhook router, mounted at `/webhooks`.
///
/// Requests exceeding `request_timeout` are answered with 408.
pub fn webhook_router(state: WebhookAppState, request_timeout: Duration) -> Router {
    Router::new()
        .nest("/webhooks", webhook_routes())
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
