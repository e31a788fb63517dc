//! Vector index plus parallel chunk metadata, with persistence
//!
//! The live state is an immutable [`IndexSnapshot`] behind an `Arc`. Writers
//! build a new snapshot and swap it in, so readers always see a vector count
//! equal to the metadata count.

use parking_lot::RwLock;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;

use crate::config::VectorIndexConfig;
use crate::error::{Error, Result};
use crate::providers::EmbeddingProvider;
use crate::types::Chunk;

use super::flat_index::FlatL2Index;

/// One consistent view of the index and its metadata
#[derive(Debug, Clone)]
pub struct IndexSnapshot {
    index: FlatL2Index,
    metadata: Vec<Chunk>,
}

impl IndexSnapshot {
    fn empty(dimension: usize) -> Self {
        Self {
            index: FlatL2Index::new(dimension),
            metadata: Vec::new(),
        }
    }

    /// Chunks in storage order
    pub fn chunks(&self) -> &[Chunk] {
        &self.metadata
    }

    pub fn len(&self) -> usize {
        self.metadata.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metadata.is_empty()
    }
}

/// Result of [`IndexManager::add`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// Number of chunks appended
    Added(usize),
    /// No chunk had text; the index is unchanged
    NothingToAdd,
}

/// Index counters for health reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IndexStats {
    pub total_vectors: usize,
    pub total_chunks: usize,
    pub dimension: usize,
}

/// Owns the vector index, its metadata and their persisted artifacts
pub struct IndexManager {
    embedder: Arc<dyn EmbeddingProvider>,
    paths: VectorIndexConfig,
    dimension: usize,
    state: RwLock<Arc<IndexSnapshot>>,
    /// Serializes add, reset and persist
    write_lock: tokio::sync::Mutex<()>,
}

impl IndexManager {
    /// Create a manager, loading persisted state when both artifacts exist
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        dimension: usize,
        paths: VectorIndexConfig,
    ) -> Result<Self> {
        if embedder.dimensions() != dimension {
            return Err(Error::Config(format!(
                "Embedding provider '{}' produces {} dimensions, index is configured for {}",
                embedder.name(),
                embedder.dimensions(),
                dimension
            )));
        }

        let snapshot = match load_snapshot(&paths, dimension) {
            Ok(Some(snapshot)) => {
                tracing::info!(
                    "Loaded vector index with {} chunks from {}",
                    snapshot.len(),
                    paths.index_path.display()
                );
                snapshot
            }
            Ok(None) => IndexSnapshot::empty(dimension),
            Err(e) => {
                tracing::error!("Failed to load vector index, starting empty: {}", e);
                IndexSnapshot::empty(dimension)
            }
        };

        Ok(Self {
            embedder,
            paths,
            dimension,
            state: RwLock::new(Arc::new(snapshot)),
            write_lock: tokio::sync::Mutex::new(()),
        })
    }

    /// Current snapshot
    pub fn snapshot(&self) -> Arc<IndexSnapshot> {
        self.state.read().clone()
    }

    /// Embed and append chunks, then persist
    pub async fn add(&self, chunks: Vec<Chunk>) -> Result<AddOutcome> {
        let chunks: Vec<Chunk> = chunks.into_iter().filter(|c| !c.text.is_empty()).collect();

        if chunks.is_empty() {
            tracing::warn!("No chunks with text to add to the index");
            return Ok(AddOutcome::NothingToAdd);
        }

        let _guard = self.write_lock.lock().await;

        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let vectors = self.embedder.embed_batch(&texts).await?;

        if vectors.len() != chunks.len() {
            return Err(Error::embedding(format!(
                "Expected {} embeddings, got {}",
                chunks.len(),
                vectors.len()
            )));
        }

        let mut next = IndexSnapshot::clone(&self.snapshot());
        next.index.add(&vectors)?;
        next.metadata.extend(chunks);

        let added = vectors.len();
        let next = Arc::new(next);
        *self.state.write() = Arc::clone(&next);

        tracing::info!("Added {} chunks (index now holds {})", added, next.len());

        if let Err(e) = self.persist_snapshot(next).await {
            tracing::error!("Failed to persist vector index: {}", e);
        }

        Ok(AddOutcome::Added(added))
    }

    /// The `top_k` chunks nearest to `question`
    pub async fn query(&self, question: &str, top_k: usize) -> Result<Vec<Chunk>> {
        Ok(self
            .query_scored(question, top_k)
            .await?
            .into_iter()
            .map(|(chunk, _)| chunk)
            .collect())
    }

    /// The `top_k` chunks nearest to `question` with their squared L2 distances
    pub async fn query_scored(&self, question: &str, top_k: usize) -> Result<Vec<(Chunk, f32)>> {
        let snapshot = self.snapshot();
        if snapshot.is_empty() {
            return Ok(Vec::new());
        }

        let embedding = self.embedder.embed(question).await?;
        let hits = snapshot.index.search(&embedding, top_k.min(snapshot.len()))?;

        let mut results = Vec::with_capacity(hits.len());
        for (position, distance) in hits {
            match snapshot.metadata.get(position) {
                Some(chunk) => {
                    tracing::debug!(
                        "Retrieved chunk {} from {} at distance {:.4}",
                        position,
                        chunk.source,
                        distance
                    );
                    results.push((chunk.clone(), distance));
                }
                None => tracing::warn!("Index position {} has no metadata", position),
            }
        }

        Ok(results)
    }

    /// Discard all vectors and metadata and delete the persisted artifacts
    pub async fn reset(&self) -> Result<()> {
        let _guard = self.write_lock.lock().await;

        *self.state.write() = Arc::new(IndexSnapshot::empty(self.dimension));

        for path in [&self.paths.index_path, &self.paths.metadata_path] {
            remove_if_exists(path)?;
        }

        tracing::info!("Vector index reset");
        Ok(())
    }

    /// Write the current state to both artifacts
    pub async fn persist(&self) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        self.persist_snapshot(self.snapshot()).await
    }

    async fn persist_snapshot(&self, snapshot: Arc<IndexSnapshot>) -> Result<()> {
        let paths = self.paths.clone();
        tokio::task::spawn_blocking(move || -> Result<()> {
            snapshot.index.save(&paths.index_path)?;

            if let Some(parent) = paths.metadata_path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let json = serde_json::to_vec(&snapshot.metadata)?;
            std::fs::write(&paths.metadata_path, json)?;

            tracing::debug!("Persisted {} chunks", snapshot.len());
            Ok(())
        })
        .await?
    }

    pub fn stats(&self) -> IndexStats {
        let snapshot = self.snapshot();
        IndexStats {
            total_vectors: snapshot.index.len(),
            total_chunks: snapshot.metadata.len(),
            dimension: self.dimension,
        }
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }
}

fn load_snapshot(paths: &VectorIndexConfig, dimension: usize) -> Result<Option<IndexSnapshot>> {
    if !paths.index_path.exists() || !paths.metadata_path.exists() {
        return Ok(None);
    }

    let index = FlatL2Index::load(&paths.index_path, dimension)?;
    let raw = std::fs::read(&paths.metadata_path)?;
    let metadata: Vec<Chunk> = serde_json::from_slice(&raw)?;

    if index.len() != metadata.len() {
        return Err(Error::vector_db(format!(
            "Index holds {} vectors but metadata holds {} chunks",
            index.len(),
            metadata.len()
        )));
    }

    Ok(Some(IndexSnapshot { index, metadata }))
}

fn remove_if_exists(path: &Path) -> Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}
