//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! One Axum router: a health probe, a read-only participant listing, and the
//! session websocket. When a static directory is configured it is served as
//! the fallback so a browser client can be hosted alongside the API.

pub mod people;
pub mod ws;

use std::path::Path;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::get;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the full application router.
pub fn app(state: AppState, static_dir: Option<&Path>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Upgrade responses stay uncompressed.
    let rest = Router::new()
        .route("/api/people", get(people::list_people))
        .layer(CompressionLayer::new());

    let router = Router::new()
        .merge(rest)
        .route("/api/ws", get(ws::handle_ws))
        .route("/healthz", get(healthz))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    match static_dir {
        Some(dir) => router.fallback_service(ServeDir::new(dir).append_index_html_on_directories(true)),
        None => router,
    }
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}
