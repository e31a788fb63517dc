//! Exact (brute-force) L2 vector index with a compact on-disk format

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Error, Result};

/// "DQIX"
const INDEX_MAGIC: u32 = 0x4451_4958;
const INDEX_FORMAT_VERSION: u32 = 1;

/// On-disk layout of the index file
#[derive(Serialize, Deserialize)]
struct IndexFile {
    magic: u32,
    version: u32,
    dimension: u32,
    /// Row-major, `dimension` floats per vector
    vectors: Vec<f32>,
}

/// Flat index of fixed-dimension vectors searched by squared L2 distance
#[derive(Debug, Clone)]
pub struct FlatL2Index {
    dimension: usize,
    /// Row-major storage
    vectors: Vec<f32>,
}

impl FlatL2Index {
    /// Create an empty index
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            vectors: Vec::new(),
        }
    }

    /// Vector dimension
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Number of stored vectors
    pub fn len(&self) -> usize {
        if self.dimension == 0 {
            0
        } else {
            self.vectors.len() / self.dimension
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append vectors in order. Nothing is appended if any vector has the wrong dimension.
    pub fn add(&mut self, vectors: &[Vec<f32>]) -> Result<()> {
        if let Some((i, bad)) = vectors
            .iter()
            .enumerate()
            .find(|(_, v)| v.len() != self.dimension)
        {
            return Err(Error::vector_db(format!(
                "Vector {} has dimension {}, index expects {}",
                i,
                bad.len(),
                self.dimension
            )));
        }

        self.vectors.reserve(vectors.len() * self.dimension);
        for vector in vectors {
            self.vectors.extend_from_slice(vector);
        }
        Ok(())
    }

    /// The `min(k, len)` nearest positions with their squared L2 distances.
    ///
    /// Results are in ascending distance; equal distances keep insertion order.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<(usize, f32)>> {
        if query.len() != self.dimension {
            return Err(Error::vector_db(format!(
                "Query has dimension {}, index expects {}",
                query.len(),
                self.dimension
            )));
        }

        if k == 0 || self.is_empty() {
            return Ok(Vec::new());
        }

        let mut scored: Vec<(usize, f32)> = self
            .vectors
            .chunks_exact(self.dimension)
            .enumerate()
            .map(|(i, row)| (i, squared_l2(query, row)))
            .collect();

        // stable: ties stay in insertion order
        scored.sort_by(|a, b| a.1.total_cmp(&b.1));
        scored.truncate(k);
        Ok(scored)
    }

    /// Write the index to `path`, creating parent directories
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = IndexFile {
            magic: INDEX_MAGIC,
            version: INDEX_FORMAT_VERSION,
            dimension: self.dimension as u32,
            vectors: self.vectors.clone(),
        };

        let bytes = bincode::serde::encode_to_vec(&file, bincode::config::standard())
            .map_err(|e| Error::vector_db(format!("Failed to encode index: {}", e)))?;
        std::fs::write(path, bytes)?;
        Ok(())
    }

    /// Read an index from `path`, requiring it to hold `expected_dimension` vectors
    pub fn load(path: &Path, expected_dimension: usize) -> Result<Self> {
        let bytes = std::fs::read(path)?;

        let (file, _): (IndexFile, usize) =
            bincode::serde::decode_from_slice(&bytes, bincode::config::standard())
                .map_err(|e| Error::vector_db(format!("Failed to decode index: {}", e)))?;

        if file.magic != INDEX_MAGIC {
            return Err(Error::vector_db(format!(
                "{} is not a vector index file",
                path.display()
            )));
        }
        if file.version != INDEX_FORMAT_VERSION {
            return Err(Error::vector_db(format!(
                "Unsupported index format version {}",
                file.version
            )));
        }
        if file.dimension as usize != expected_dimension {
            return Err(Error::vector_db(format!(
                "Index dimension {} does not match configured dimension {}",
                file.dimension, expected_dimension
            )));
        }
        if expected_dimension == 0 || file.vectors.len() % expected_dimension != 0 {
            return Err(Error::vector_db("Index data is truncated"));
        }

        Ok(Self {
            dimension: expected_dimension,
            vectors: file.vectors,
        })
    }
}

fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b)
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}
