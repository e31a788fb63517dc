//! Retrieval-augmented answers and corpus analysis

use std::sync::Arc;

use crate::config::{LlmConfig, RetrievalConfig};
use crate::error::{Error, Result};
use crate::ingestion::clean_text;
use crate::providers::LlmProvider;
use crate::retrieval::IndexManager;
use crate::types::{Answer, AnswerStatus};

use super::prompt::PromptBuilder;

pub const NO_DOCUMENTS_MESSAGE: &str = "No documents to analyze.";
pub const NOT_FOUND_MESSAGE: &str = "No relevant information was found in the loaded documents.";

/// Builds prompts from the index and submits them to the completion model.
///
/// Completion failures never surface as errors: the caller gets a
/// [`AnswerStatus::Degraded`] answer carrying a prefix of the raw context.
pub struct AnswerComposer {
    index: Arc<IndexManager>,
    llm: Arc<dyn LlmProvider>,
    llm_config: LlmConfig,
    retrieval: RetrievalConfig,
}

impl AnswerComposer {
    /// Create a new composer over a shared index
    pub fn new(
        index: Arc<IndexManager>,
        llm: Arc<dyn LlmProvider>,
        llm_config: &LlmConfig,
        retrieval: &RetrievalConfig,
    ) -> Self {
        Self {
            index,
            llm,
            llm_config: llm_config.clone(),
            retrieval: retrieval.clone(),
        }
    }

    /// Summarize the first `max_chunks` indexed chunks
    pub async fn analyze(&self, max_chunks: usize) -> Answer {
        let snapshot = self.index.snapshot();
        if snapshot.is_empty() {
            return Answer::new(NO_DOCUMENTS_MESSAGE, AnswerStatus::NoDocuments);
        }

        let count = max_chunks.min(snapshot.len());
        let combined = snapshot.chunks()[..count]
            .iter()
            .map(|c| c.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        let combined = clean_text(&combined);

        tracing::info!("Analyzing {} chunks", count);

        let prompt = PromptBuilder::build_analysis_prompt(&combined);
        match self
            .complete(
                &prompt,
                self.llm_config.analysis_temperature,
                self.llm_config.analysis_max_tokens,
            )
            .await
        {
            Ok(text) => Answer::new(text, AnswerStatus::Generated),
            Err(e) => {
                tracing::error!("Document analysis failed: {}", e);
                Answer::new(
                    format!(
                        "Error analyzing documents: {}\n\nPartial context:\n{}",
                        e,
                        truncate_chars(&combined, self.retrieval.fallback_chars)
                    ),
                    AnswerStatus::Degraded,
                )
            }
        }
    }

    /// Answer a question from the `top_k` nearest chunks.
    ///
    /// Only retrieval (embedding) failures are returned as errors.
    pub async fn query(&self, question: &str, top_k: usize) -> Result<Answer> {
        let results = self.index.query(question, top_k).await?;
        if results.is_empty() {
            return Ok(Answer::new(NOT_FOUND_MESSAGE, AnswerStatus::NotFound));
        }

        let context = results
            .iter()
            .map(|c| clean_text(&c.text))
            .collect::<Vec<_>>()
            .join(" ");
        let context = truncate_chars(&context, self.retrieval.max_context_chars);

        tracing::debug!(
            "Retrieved context: {}...",
            truncate_chars(&context, 400)
        );

        let prompt = PromptBuilder::build_query_prompt(question, &context);
        match self
            .complete(
                &prompt,
                self.llm_config.query_temperature,
                self.llm_config.query_max_tokens,
            )
            .await
        {
            Ok(text) => Ok(Answer::new(text, AnswerStatus::Generated)),
            Err(e) => {
                tracing::error!("Answer generation failed: {}", e);
                Ok(Answer::new(
                    truncate_chars(&context, self.retrieval.fallback_chars),
                    AnswerStatus::Degraded,
                ))
            }
        }
    }

    async fn complete(&self, prompt: &str, temperature: f32, max_tokens: u32) -> Result<String> {
        let text = self.llm.complete(prompt, temperature, max_tokens).await?;
        if text.trim().is_empty() {
            return Err(Error::llm(format!("{} returned an empty completion", self.llm.model())));
        }
        Ok(text)
    }
}

/// The first `max` characters of `text`
fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::VectorIndexConfig;
    use crate::test_support::{FakeEmbedder, ScriptedLlm};
    use crate::types::Chunk;

    const DIM: usize = 8;

    struct Fixture {
        _dir: tempfile::TempDir,
        index: Arc<IndexManager>,
        llm: Arc<ScriptedLlm>,
        composer: AnswerComposer,
    }

    fn fixture(llm: ScriptedLlm, retrieval: RetrievalConfig) -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let index = Arc::new(
            IndexManager::new(
                Arc::new(FakeEmbedder::new(DIM)),
                DIM,
                VectorIndexConfig::in_dir(dir.path().to_path_buf()),
            )
            .unwrap(),
        );
        let llm = Arc::new(llm);
        let composer = AnswerComposer::new(
            index.clone(),
            llm.clone(),
            &LlmConfig::default(),
            &retrieval,
        );
        Fixture {
            _dir: dir,
            index,
            llm,
            composer,
        }
    }

    #[tokio::test]
    async fn test_analyze_empty_index() {
        let f = fixture(ScriptedLlm::replying("unused"), RetrievalConfig::default());
        let answer = f.composer.analyze(50).await;

        assert_eq!(answer, Answer::new(NO_DOCUMENTS_MESSAGE, AnswerStatus::NoDocuments));
        assert!(f.llm.prompts().is_empty());
    }

    #[tokio::test]
    async fn test_analyze_uses_first_chunks_in_order() {
        let f = fixture(ScriptedLlm::replying("A summary"), RetrievalConfig::default());
        f.index
            .add(vec![
                Chunk::new("first chunk\ntext", "a.txt"),
                Chunk::new("second chunk", "a.txt"),
                Chunk::new("third chunk", "b.txt"),
            ])
            .await
            .unwrap();

        let answer = f.composer.analyze(2).await;
        assert_eq!(answer, Answer::new("A summary", AnswerStatus::Generated));

        let calls = f.llm.calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].prompt.contains("first chunk. text second chunk"));
        assert!(!calls[0].prompt.contains("third chunk"));
        assert_eq!(calls[0].temperature, 0.4);
        assert_eq!(calls[0].max_tokens, 1500);
    }

    #[tokio::test]
    async fn test_analyze_failure_is_degraded_with_prefix() {
        let f = fixture(ScriptedLlm::failing("rate limited"), RetrievalConfig::default());
        let long_text = "x".repeat(1000);
        f.index
            .add(vec![Chunk::new(long_text.clone(), "big.txt")])
            .await
            .unwrap();

        let answer = f.composer.analyze(50).await;
        assert_eq!(answer.status, AnswerStatus::Degraded);
        assert!(answer.text.starts_with("Error analyzing documents: "));
        assert!(answer.text.contains("rate limited"));
        assert!(answer
            .text
            .ends_with(&format!("\n\nPartial context:\n{}", "x".repeat(800))));
    }

    #[tokio::test]
    async fn test_query_empty_index_is_not_found() {
        let f = fixture(ScriptedLlm::replying("unused"), RetrievalConfig::default());
        let answer = f.composer.query("anything?", 5).await.unwrap();

        assert_eq!(answer, Answer::new(NOT_FOUND_MESSAGE, AnswerStatus::NotFound));
        assert!(f.llm.prompts().is_empty());
    }

    #[tokio::test]
    async fn test_query_builds_grounded_prompt() {
        let f = fixture(ScriptedLlm::replying("Paris"), RetrievalConfig::default());
        f.index
            .add(vec![Chunk::new("The capital of France is Paris.", "geo.txt")])
            .await
            .unwrap();

        let answer = f.composer.query("What is the capital?", 5).await.unwrap();
        assert!(answer.is_generated());
        assert_eq!(answer.text, "Paris");

        let calls = f.llm.calls();
        assert!(calls[0].prompt.contains("The capital of France is Paris."));
        assert!(calls[0].prompt.contains("What is the capital?"));
        assert_eq!(calls[0].temperature, 0.3);
        assert_eq!(calls[0].max_tokens, 1200);
    }

    #[tokio::test]
    async fn test_query_context_is_capped() {
        let retrieval = RetrievalConfig {
            max_context_chars: 30,
            fallback_chars: 10,
            ..RetrievalConfig::default()
        };
        let f = fixture(ScriptedLlm::failing("timeout"), retrieval);
        f.index
            .add(vec![Chunk::new("abcdefghij".repeat(10), "letters.txt")])
            .await
            .unwrap();

        let answer = f.composer.query("letters", 5).await.unwrap();
        assert_eq!(answer, Answer::new("abcdefghij", AnswerStatus::Degraded));

        let prompt = &f.llm.prompts()[0];
        assert!(prompt.contains(&"abcdefghij".repeat(3)));
        assert!(!prompt.contains(&"abcdefghij".repeat(4)));
    }

    #[tokio::test]
    async fn test_blank_completion_is_degraded() {
        let f = fixture(ScriptedLlm::replying("   "), RetrievalConfig::default());
        f.index
            .add(vec![Chunk::new("Some indexed content here", "c.txt")])
            .await
            .unwrap();

        let answer = f.composer.query("content?", 5).await.unwrap();
        assert_eq!(answer, Answer::new("Some indexed content here", AnswerStatus::Degraded));
    }
}
