//! Question answering endpoint

use axum::{extract::State, Json};
use std::time::Instant;

use crate::error::{Error, Result};
use crate::server::state::AppState;
use crate::types::{query::QueryRequest, response::QueryResponse};

/// POST /query - Answer a question from the indexed documents
pub async fn query(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<QueryResponse>> {
    if request.question.trim().is_empty() {
        return Err(Error::InvalidRequest("No question was provided".to_string()));
    }

    let start = Instant::now();
    tracing::info!("Query: \"{}\"", request.question);

    let answer = state.pipeline().answer_question(&request.question).await?;

    tracing::info!(
        "Answered in {:?} ({:?})",
        start.elapsed(),
        answer.status
    );

    Ok(Json(QueryResponse::from(answer)))
}
