//! Router construction, grounded on `sem_os_server::router::build_router`:
//! plain routes plus shared state handed in via `Extension`, `TraceLayer`
//! for request spans.

use axum::{
    routing::{get, post},
    Extension, Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health))
        .route("/register", post(handlers::registry::register))
        .route("/heartbeat", post(handlers::registry::heartbeat))
        .route("/workers", get(handlers::registry::workers))
        .route("/start", post(handlers::run::start))
        .route("/status", get(handlers::run::status))
        .route("/next", post(handlers::run::next))
        .route("/done", post(handlers::run::done))
        .layer(Extension(state))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
