//! Bandroom web backend.
//!
//! JSON API for band show and payout management. The payout engine in
//! [`payout`] is pure and deterministic; the HTTP and persistence layers
//! around it only move its inputs and outputs.

pub mod cache;
pub mod db;
pub mod error;
pub mod models;
pub mod payout;

use axum::Router;
use sqlx::PgPool;
use tower_http::{
    compression::CompressionLayer,
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

use cache::AppCache;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub cache: AppCache,
}

/// Build the application router: the payout API under /api, with the SPA
/// bundle served from `static_dir` for everything else.
pub fn app(state: AppState, static_dir: &str) -> Router {
    let index = format!("{}/index.html", static_dir);
    let spa = ServeDir::new(static_dir).not_found_service(ServeFile::new(index));

    Router::new()
        .nest("/api", payout::router())
        .fallback_service(spa)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .with_state(state)
}
