//! Route definitions for the DomainRecon API.

pub mod health;
pub mod scans;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::AppState;

/// Build the application router.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(health::root))
        .route("/health", get(health::check))
        .route("/scan", post(scans::create))
        .route("/scan/{id}", get(scans::get_by_id))
        .route("/history", get(scans::history))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
