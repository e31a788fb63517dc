//! Core types for the document Q&A system

pub mod document;
pub mod query;
pub mod response;

pub use document::{Chunk, FileType, UploadedFile};
pub use query::QueryRequest;
pub use response::{Answer, AnswerStatus, HealthResponse, IngestResponse, QueryResponse};
