//! Configuration for the document Q&A system

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RagConfig {
    /// Server configuration
    pub server: ServerConfig,
    /// Embedding configuration
    pub embeddings: EmbeddingConfig,
    /// Chunking configuration
    pub chunking: ChunkingConfig,
    /// Chat-completion configuration
    pub llm: LlmConfig,
    /// Persisted vector index configuration
    pub vector_index: VectorIndexConfig,
    /// Retrieval and prompt bounds
    pub retrieval: RetrievalConfig,
    /// OCR configuration
    pub ocr: OcrConfig,
}

impl RagConfig {
    /// Load configuration from an optional TOML file, then apply env overrides.
    ///
    /// Missing sections and fields fall back to their defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path).map_err(|e| {
                    Error::Config(format!("Failed to read config {}: {}", path.display(), e))
                })?;
                Self::from_toml_str(&raw)?
            }
            None => Self::default(),
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a TOML string
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        toml::from_str(raw).map_err(|e| Error::Config(format!("Invalid config: {}", e)))
    }

    /// Apply `DOCQA_HOST`, `DOCQA_PORT` and `DOCQA_DATA_DIR` overrides
    pub fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("DOCQA_HOST") {
            self.server.host = host;
        }

        if let Ok(port) = std::env::var("DOCQA_PORT") {
            match port.parse() {
                Ok(port) => self.server.port = port,
                Err(_) => tracing::warn!("Ignoring invalid DOCQA_PORT value: {}", port),
            }
        }

        if let Ok(dir) = std::env::var("DOCQA_DATA_DIR") {
            self.vector_index = VectorIndexConfig::in_dir(PathBuf::from(dir));
        }
    }

    /// Reject parameter combinations the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.chunking.chunk_size == 0 {
            return Err(Error::Config("chunk_size must be greater than zero".to_string()));
        }
        if self.chunking.chunk_overlap >= self.chunking.chunk_size {
            return Err(Error::Config(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                self.chunking.chunk_overlap, self.chunking.chunk_size
            )));
        }
        if self.embeddings.dimensions == 0 {
            return Err(Error::Config("embedding dimensions must be greater than zero".to_string()));
        }
        if self.vector_index.index_path == self.vector_index.metadata_path {
            return Err(Error::Config(
                "index_path and metadata_path must be different files".to_string(),
            ));
        }
        Ok(())
    }

    /// Whether the chat-completion credential is present in the environment
    pub fn llm_configured(&self) -> bool {
        std::env::var(&self.llm.api_key_env).is_ok_and(|key| !key.trim().is_empty())
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host address
    pub host: String,
    /// Port number
    pub port: u16,
    /// Enable CORS
    pub enable_cors: bool,
    /// Maximum upload size in bytes (default: 100MB)
    pub max_upload_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            enable_cors: true,
            max_upload_size: 100 * 1024 * 1024, // 100MB
        }
    }
}

/// Embedding configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// sentence-transformers model name
    pub model: String,
    /// Embedding dimensions (384 for MiniLM). Changing this requires a full reset.
    pub dimensions: usize,
    /// Batch size for embedding generation
    pub batch_size: usize,
    /// Maximum sequence length
    pub max_length: usize,
    /// Cache directory for models
    pub cache_dir: PathBuf,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: "all-MiniLM-L6-v2".to_string(),
            dimensions: 384,
            batch_size: 32,
            max_length: 256,
            cache_dir: dirs::cache_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("docqa-rag")
                .join("models"),
        }
    }
}

/// Text chunking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Chunk size in characters
    pub chunk_size: usize,
    /// Overlap between consecutive chunks in characters
    pub chunk_overlap: usize,
    /// Files whose cleaned text is shorter than this are skipped
    pub min_text_chars: usize,
    /// Chunks must be longer than this after cleaning
    pub min_chunk_chars: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 800,
            chunk_overlap: 150,
            min_text_chars: 10,
            min_chunk_chars: 20,
        }
    }
}

/// Chat-completion (OpenAI-compatible) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// API base URL; `/chat/completions` is appended
    pub base_url: String,
    /// Generation model name
    pub model: String,
    /// Environment variable holding the API key
    pub api_key_env: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Number of retries for failed requests
    pub max_retries: u32,
    /// Temperature for question answering
    pub query_temperature: f32,
    /// Token limit for question answering
    pub query_max_tokens: u32,
    /// Temperature for corpus analysis
    pub analysis_temperature: f32,
    /// Token limit for corpus analysis
    pub analysis_max_tokens: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.groq.com/openai/v1".to_string(),
            model: "llama-3.1-8b-instant".to_string(),
            api_key_env: "GROQ_API_KEY".to_string(),
            timeout_secs: 120,
            max_retries: 2,
            query_temperature: 0.3,
            query_max_tokens: 1200,
            analysis_temperature: 0.4,
            analysis_max_tokens: 1500,
        }
    }
}

/// Persisted vector index configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorIndexConfig {
    /// Binary vector index file
    pub index_path: PathBuf,
    /// JSON metadata file, parallel to the index
    pub metadata_path: PathBuf,
}

impl VectorIndexConfig {
    /// Both artifacts inside `dir`
    pub fn in_dir(dir: PathBuf) -> Self {
        Self {
            index_path: dir.join("vectors.index"),
            metadata_path: dir.join("metadata.json"),
        }
    }
}

impl Default for VectorIndexConfig {
    fn default() -> Self {
        let dir = dirs::data_local_dir()
            .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
            .join("docqa-rag");
        Self::in_dir(dir)
    }
}

/// Retrieval and prompt bounds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Chunks retrieved per question
    pub top_k: usize,
    /// Hard cap on the context sent with a question
    pub max_context_chars: usize,
    /// Length of the raw-context fallback when the LLM call fails
    pub fallback_chars: usize,
    /// Chunks included in the post-ingest analysis
    pub analysis_max_chunks: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: 5,
            max_context_chars: 8000,
            fallback_chars: 800,
            analysis_max_chunks: 50,
        }
    }
}

/// OCR configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Tesseract language models
    pub languages: String,
    /// PDF pages with less direct text than this are OCR'd
    pub min_page_chars: usize,
    /// Raster resolution for rendered PDF pages
    pub render_dpi: u32,
    /// tesseract executable
    pub tesseract_bin: String,
    /// pdftoppm executable
    pub pdftoppm_bin: String,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            languages: "spa+eng".to_string(),
            min_page_chars: 50,
            render_dpi: 150,
            tesseract_bin: "tesseract".to_string(),
            pdftoppm_bin: "pdftoppm".to_string(),
        }
    }
}
