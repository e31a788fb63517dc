//! Ingest and answer flows over a single active corpus

use std::sync::Arc;

use crate::config::RagConfig;
use crate::embeddings::OnnxEmbedder;
use crate::error::Result;
use crate::generation::{AnswerComposer, GroqClient};
use crate::ingestion::{clean_text, TextChunker, TextExtractor};
use crate::providers::{EmbeddingProvider, LlmProvider, OcrEngine, TesseractOcr};
use crate::retrieval::{AddOutcome, IndexManager, IndexStats};
use crate::types::document::base_name;
use crate::types::{Answer, AnswerStatus, Chunk, FileType, IngestResponse, UploadedFile};

pub const EMPTY_QUESTION_MESSAGE: &str = "The question is empty.";

/// Wires extraction, chunking, the vector index and answer composition
pub struct DocumentPipeline {
    config: RagConfig,
    extractor: TextExtractor,
    chunker: TextChunker,
    index: Arc<IndexManager>,
    composer: AnswerComposer,
    /// One ingest at a time; reset never races an add
    ingest_lock: tokio::sync::Mutex<()>,
}

impl DocumentPipeline {
    /// Build the production pipeline: ONNX embeddings, Groq completions, tesseract OCR
    pub async fn from_config(config: RagConfig) -> Result<Self> {
        config.validate()?;

        let llm = GroqClient::from_env(&config.llm)?;
        let embedder = OnnxEmbedder::new(&config.embeddings).await?;
        let ocr = TesseractOcr::new(&config.ocr);

        for file_type in [FileType::Image, FileType::Pdf] {
            let available = match file_type {
                FileType::Image => ocr.has_tesseract(),
                _ => ocr.has_tesseract() && ocr.has_pdftoppm(),
            };
            if let (false, Some(tools)) = (available, file_type.required_tools()) {
                tracing::warn!("OCR for {:?} files is unavailable, install {}", file_type, tools);
            }
        }

        Self::new(config, Arc::new(embedder), Arc::new(llm), Arc::new(ocr))
    }

    /// Build a pipeline from explicit providers
    pub fn new(
        config: RagConfig,
        embedder: Arc<dyn EmbeddingProvider>,
        llm: Arc<dyn LlmProvider>,
        ocr: Arc<dyn OcrEngine>,
    ) -> Result<Self> {
        config.validate()?;

        let chunker = TextChunker::new(config.chunking.chunk_size, config.chunking.chunk_overlap)?;
        let extractor = TextExtractor::new(ocr, &config.ocr);
        let index = Arc::new(IndexManager::new(
            embedder,
            config.embeddings.dimensions,
            config.vector_index.clone(),
        )?);
        let composer = AnswerComposer::new(index.clone(), llm, &config.llm, &config.retrieval);

        Ok(Self {
            config,
            extractor,
            chunker,
            index,
            composer,
            ingest_lock: tokio::sync::Mutex::new(()),
        })
    }

    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    pub fn index(&self) -> &Arc<IndexManager> {
        &self.index
    }

    pub fn stats(&self) -> IndexStats {
        self.index.stats()
    }

    /// Replace the corpus with the given files, then analyze it.
    ///
    /// Files that fail to extract are logged and skipped. Only an embedding
    /// or index failure is returned as an error.
    pub async fn ingest(&self, files: Vec<UploadedFile>) -> Result<IngestResponse> {
        if files.is_empty() {
            return Ok(IngestResponse::error("No files were provided"));
        }

        let _guard = self.ingest_lock.lock().await;

        tracing::info!("Processing {} files", files.len());
        self.index.reset().await?;

        let total_files = files.len();
        let mut all_chunks = Vec::new();
        let mut files_processed = Vec::new();

        for (i, file) in files.into_iter().enumerate() {
            let name = base_name(&file.name);
            tracing::info!("File {}/{}: {}", i + 1, total_files, name);

            let extractor = self.extractor.clone();
            let extracted = tokio::task::spawn_blocking(move || {
                extractor.extract(&file.name, &file.data)
            })
            .await;

            let text = match extracted {
                Ok(Ok(text)) => text,
                Ok(Err(e)) => {
                    tracing::warn!("Skipping {}: {}", name, e);
                    continue;
                }
                Err(e) => {
                    tracing::error!("Extraction task for {} failed: {}", name, e);
                    continue;
                }
            };

            let cleaned = clean_text(&text);
            let cleaned_len = cleaned.chars().count();
            if cleaned_len < self.config.chunking.min_text_chars {
                tracing::warn!("Skipping {}: empty or too short ({} chars)", name, cleaned_len);
                continue;
            }
            tracing::info!("Extracted {} characters from {}", cleaned_len, name);

            let raw_chunks = self.chunker.chunk(&cleaned);
            let before = all_chunks.len();
            all_chunks.extend(
                raw_chunks
                    .iter()
                    .map(|raw| clean_text(raw))
                    .filter(|chunk| chunk.chars().count() >= self.config.chunking.min_chunk_chars)
                    .map(|chunk| Chunk::new(chunk, name.clone())),
            );
            tracing::info!(
                "{}: {} chunks created, {} kept",
                name,
                raw_chunks.len(),
                all_chunks.len() - before
            );

            files_processed.push(name);
        }

        if all_chunks.is_empty() {
            tracing::warn!("No valid chunks extracted from {} files", total_files);
            return Ok(IngestResponse::error("No valid chunks could be extracted"));
        }

        let total_chunks = all_chunks.len();
        tracing::info!("Total valid chunks: {}", total_chunks);

        if let AddOutcome::NothingToAdd = self.index.add(all_chunks).await? {
            return Ok(IngestResponse::error("No valid chunks could be extracted"));
        }

        let analysis = self
            .composer
            .analyze(self.config.retrieval.analysis_max_chunks)
            .await;

        Ok(IngestResponse::success(files_processed, total_chunks, analysis))
    }

    /// Answer a question from the current corpus
    pub async fn answer_question(&self, question: &str) -> Result<Answer> {
        let question = clean_text(question);
        if question.is_empty() {
            return Ok(Answer::new(EMPTY_QUESTION_MESSAGE, AnswerStatus::EmptyQuestion));
        }

        self.composer
            .query(&question, self.config.retrieval.top_k)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::VectorIndexConfig;
    use crate::test_support::{FakeEmbedder, FakeOcr, ScriptedLlm};

    const DIM: usize = 8;

    fn pipeline(dir: &std::path::Path, llm: ScriptedLlm) -> (DocumentPipeline, Arc<FakeEmbedder>) {
        let mut config = RagConfig::default();
        config.embeddings.dimensions = DIM;
        config.vector_index = VectorIndexConfig::in_dir(dir.to_path_buf());

        let embedder = Arc::new(FakeEmbedder::new(DIM));
        let pipeline = DocumentPipeline::new(
            config,
            embedder.clone(),
            Arc::new(llm),
            Arc::new(FakeOcr::new("")),
        )
        .unwrap();
        (pipeline, embedder)
    }

    /// 1800 characters with no whitespace, so cleaning leaves it unchanged
    fn long_text() -> String {
        (0..1800).map(|i| (b'a' + (i % 26) as u8) as char).collect()
    }

    #[tokio::test]
    async fn test_ingest_chunks_long_text_file() {
        let dir = tempfile::tempdir().unwrap();
        let (pipeline, _) = pipeline(dir.path(), ScriptedLlm::replying("Overview"));
        let text = long_text();

        let response = pipeline
            .ingest(vec![UploadedFile::new("uploads/long.txt", text.clone())])
            .await
            .unwrap();

        assert!(response.is_success());
        assert_eq!(response.message, "3 chunks processed");
        assert_eq!(response.total_chunks, Some(3));
        assert_eq!(response.files_processed, Some(vec!["long.txt".to_string()]));
        assert_eq!(response.analysis.as_deref(), Some("Overview"));
        assert_eq!(response.analysis_status, Some(AnswerStatus::Generated));

        let snapshot = pipeline.index().snapshot();
        let chunks = snapshot.chunks();
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].text, text[0..800]);
        assert_eq!(chunks[1].text, text[650..1450]);
        assert_eq!(chunks[2].text, text[1300..1800]);
        assert!(chunks.iter().all(|c| c.source == "long.txt"));
    }

    #[tokio::test]
    async fn test_unsupported_file_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let (pipeline, _) = pipeline(dir.path(), ScriptedLlm::replying("Overview"));

        let response = pipeline
            .ingest(vec![
                UploadedFile::new("report.docx", b"PK\x03\x04".to_vec()),
                UploadedFile::new("notes.txt", "These notes are long enough to be indexed."),
            ])
            .await
            .unwrap();

        assert!(response.is_success());
        assert_eq!(response.files_processed, Some(vec!["notes.txt".to_string()]));
        assert_eq!(response.total_chunks, Some(1));
    }

    #[tokio::test]
    async fn test_ingest_without_files() {
        let dir = tempfile::tempdir().unwrap();
        let (pipeline, _) = pipeline(dir.path(), ScriptedLlm::replying("unused"));

        let response = pipeline.ingest(Vec::new()).await.unwrap();
        assert!(!response.is_success());
        assert_eq!(response.message, "No files were provided");
    }

    #[tokio::test]
    async fn test_ingest_with_only_short_text() {
        let dir = tempfile::tempdir().unwrap();
        let (pipeline, _) = pipeline(dir.path(), ScriptedLlm::replying("unused"));

        let response = pipeline
            .ingest(vec![
                UploadedFile::new("tiny.txt", "hi"),
                UploadedFile::new("short.txt", "just fifteen ch"),
            ])
            .await
            .unwrap();

        assert!(!response.is_success());
        assert_eq!(response.message, "No valid chunks could be extracted");
        assert_eq!(pipeline.stats().total_chunks, 0);
    }

    #[tokio::test]
    async fn test_chunk_at_minimum_length_is_kept() {
        let dir = tempfile::tempdir().unwrap();
        let (pipeline, _) = pipeline(dir.path(), ScriptedLlm::replying("Overview"));

        let response = pipeline
            .ingest(vec![UploadedFile::new("edge.txt", "abcdefghij klmnopqrs")])
            .await
            .unwrap();

        assert!(response.is_success());
        assert_eq!(response.total_chunks, Some(1));
        assert_eq!(pipeline.index().snapshot().chunks()[0].text, "abcdefghij klmnopqrs");
    }

    #[tokio::test]
    async fn test_new_ingest_replaces_corpus() {
        let dir = tempfile::tempdir().unwrap();
        let (pipeline, _) = pipeline(dir.path(), ScriptedLlm::replying("Overview"));

        pipeline
            .ingest(vec![UploadedFile::new("a.txt", long_text())])
            .await
            .unwrap();
        pipeline
            .ingest(vec![UploadedFile::new("b.txt", "A second, much smaller document.")])
            .await
            .unwrap();

        let stats = pipeline.stats();
        assert_eq!(stats.total_vectors, 1);
        assert_eq!(stats.total_chunks, 1);
        assert_eq!(pipeline.index().snapshot().chunks()[0].source, "b.txt");
    }

    #[tokio::test]
    async fn test_empty_question_skips_retrieval() {
        let dir = tempfile::tempdir().unwrap();
        let (pipeline, embedder) = pipeline(dir.path(), ScriptedLlm::replying("unused"));
        pipeline
            .ingest(vec![UploadedFile::new("a.txt", long_text())])
            .await
            .unwrap();
        let embedded_before = embedder.calls();

        for question in ["", "   ", "😀", "\n", " \n ", "😀\n"] {
            let answer = pipeline.answer_question(question).await.unwrap();
            assert_eq!(
                answer,
                Answer::new(EMPTY_QUESTION_MESSAGE, AnswerStatus::EmptyQuestion)
            );
        }
        assert_eq!(embedder.calls(), embedded_before);
    }

    #[tokio::test]
    async fn test_question_is_answered_from_corpus() {
        let dir = tempfile::tempdir().unwrap();
        let (pipeline, _) = pipeline(dir.path(), ScriptedLlm::replying("It is about knitting."));
        pipeline
            .ingest(vec![UploadedFile::new("hobby.txt", "A long guide about knitting scarves.")])
            .await
            .unwrap();

        let answer = pipeline.answer_question("What is it about?\n").await.unwrap();
        assert_eq!(answer, Answer::new("It is about knitting.", AnswerStatus::Generated));
    }
}
