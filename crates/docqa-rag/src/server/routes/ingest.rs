//! Document ingestion endpoint

use axum::{
    extract::{Multipart, State},
    Json,
};
use std::time::Instant;

use crate::error::{Error, Result};
use crate::server::state::AppState;
use crate::types::{response::IngestResponse, UploadedFile};

/// Multipart field carrying uploaded files
const FILES_FIELD: &str = "files";

/// POST /index-texts - Replace the corpus with the uploaded files
pub async fn index_texts(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<IngestResponse>> {
    let start = Instant::now();
    let mut files = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        Error::InvalidRequest(format!("Failed to read multipart field: {}", e))
    })? {
        if field.name() != Some(FILES_FIELD) {
            continue;
        }

        let filename = field.file_name().unwrap_or("").to_string();
        let data = field.bytes().await.map_err(|e| {
            Error::InvalidRequest(format!("Failed to read file '{}': {}", filename, e))
        })?;

        // browsers send an empty part for an empty file input
        if filename.is_empty() && data.is_empty() {
            continue;
        }

        tracing::info!("Received file: {} ({} bytes)", filename, data.len());
        files.push(UploadedFile::new(filename, data.to_vec()));
    }

    if files.is_empty() {
        return Err(Error::InvalidRequest("No files were provided".to_string()));
    }

    let response = state.pipeline().ingest(files).await?;

    tracing::info!(
        "Ingest finished in {:?}: {}",
        start.elapsed(),
        response.message
    );

    Ok(Json(response))
}
