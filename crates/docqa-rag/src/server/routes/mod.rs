//! HTTP routes for the document Q&A server

pub mod health;
pub mod ingest;
pub mod query;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::server::state::AppState;

/// Build all routes
pub fn api_routes(max_upload_size: usize) -> Router<AppState> {
    Router::new()
        // Ingestion - with larger body limit for file uploads
        .route(
            "/index-texts",
            post(ingest::index_texts).layer(DefaultBodyLimit::max(max_upload_size)),
        )
        .route("/query", post(query::query))
        .route("/health", get(health::health))
}
