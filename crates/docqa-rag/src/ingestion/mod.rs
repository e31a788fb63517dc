//! Document ingestion: extraction, cleaning and chunking

mod chunker;
mod cleaner;
mod extractor;

pub use chunker::TextChunker;
pub use cleaner::clean_text;
pub use extractor::TextExtractor;
