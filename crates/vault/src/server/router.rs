//! Axum router construction.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use super::{handlers, state::AppState};

/// Build the application [`Router`] with all routes and middleware attached.
///
/// No request timeout is applied: a message runs to completion even if the
/// caller has stopped waiting for it.
pub fn build(state: AppState) -> Router {
    Router::new()
        .route("/message", post(handlers::message))
        .route("/health", get(handlers::health))
        .fallback(handlers::not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
