//! docqa-rag: document question answering over a local vector index
//!
//! Uploaded PDFs, text files and images are turned into text (with OCR for
//! scanned pages), split into overlapping chunks, embedded with a local ONNX
//! sentence-transformer and stored in an exact L2 index. Questions are
//! answered by a chat-completion model from the nearest chunks.

pub mod config;
pub mod embeddings;
pub mod error;
pub mod generation;
pub mod ingestion;
pub mod pipeline;
pub mod providers;
pub mod retrieval;
pub mod server;
pub mod types;

pub use config::RagConfig;
pub use error::{Error, Result};
pub use pipeline::DocumentPipeline;
pub use types::{
    document::{Chunk, FileType, UploadedFile},
    query::QueryRequest,
    response::{Answer, AnswerStatus, IngestResponse, QueryResponse},
};
