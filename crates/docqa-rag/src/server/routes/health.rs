//! Health endpoint

use axum::{extract::State, Json};

use crate::server::state::AppState;
use crate::types::response::{HealthResponse, ResponseStatus};

/// GET /health - Index counters and credential presence
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let stats = state.pipeline().stats();

    Json(HealthResponse {
        status: ResponseStatus::Ok,
        total_vectors: stats.total_vectors,
        total_chunks: stats.total_chunks,
        llm_configured: state.config().llm_configured(),
    })
}
