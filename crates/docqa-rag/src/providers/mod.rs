//! Provider abstractions for embeddings, chat completion and OCR
//!
//! The pipeline only talks to these traits, so the ONNX model, the HTTP
//! completion API and the tesseract binaries can be swapped for fakes in tests.

pub mod embedding;
pub mod llm;
pub mod ocr;

pub use embedding::EmbeddingProvider;
pub use llm::LlmProvider;
pub use ocr::{OcrEngine, TesseractOcr};
