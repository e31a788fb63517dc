//! Application state for the document Q&A server

use std::sync::Arc;

use crate::config::RagConfig;
use crate::error::Result;
use crate::pipeline::DocumentPipeline;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Ingest and answer flows, owning the index
    pipeline: DocumentPipeline,
}

impl AppState {
    /// Create new application state with the production providers
    pub async fn new(config: RagConfig) -> Result<Self> {
        tracing::info!("Initializing document Q&A state...");
        let pipeline = DocumentPipeline::from_config(config).await?;

        let stats = pipeline.stats();
        tracing::info!(
            "Pipeline ready ({} chunks indexed, {} dimensions)",
            stats.total_chunks,
            stats.dimension
        );

        Ok(Self::from_pipeline(pipeline))
    }

    /// Wrap an already constructed pipeline
    pub fn from_pipeline(pipeline: DocumentPipeline) -> Self {
        Self {
            inner: Arc::new(AppStateInner { pipeline }),
        }
    }

    pub fn pipeline(&self) -> &DocumentPipeline {
        &self.inner.pipeline
    }

    pub fn config(&self) -> &RagConfig {
        self.inner.pipeline.config()
    }
}
