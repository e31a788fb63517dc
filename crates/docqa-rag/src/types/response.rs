//! Answer and response payloads

use serde::{Deserialize, Serialize};

/// How an answer was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerStatus {
    /// Produced by the chat-completion model
    Generated,
    /// The completion call failed; the text is a raw-context fallback
    Degraded,
    /// Retrieval returned nothing
    NotFound,
    /// The index holds no documents
    NoDocuments,
    /// The question was empty after cleaning
    EmptyQuestion,
}

/// Text returned to the caller, tagged with how it was produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    /// Answer text (never empty)
    pub text: String,
    /// Outcome tag
    pub status: AnswerStatus,
}

impl Answer {
    /// Create a new answer
    pub fn new(text: impl Into<String>, status: AnswerStatus) -> Self {
        Self {
            text: text.into(),
            status,
        }
    }

    /// Whether the text came from the model
    pub fn is_generated(&self) -> bool {
        self.status == AnswerStatus::Generated
    }
}

/// Top-level response status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    Success,
    Ok,
    Error,
}

/// Response from an ingest request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestResponse {
    /// `success` or `error`
    pub status: ResponseStatus,
    /// Human-readable summary
    pub message: String,
    /// Base names of files that produced text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files_processed: Option<Vec<String>>,
    /// Chunks added to the index
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_chunks: Option<usize>,
    /// Automatic corpus analysis
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<String>,
    /// How the analysis was produced
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis_status: Option<AnswerStatus>,
}

impl IngestResponse {
    /// Successful ingest
    pub fn success(files_processed: Vec<String>, total_chunks: usize, analysis: Answer) -> Self {
        Self {
            status: ResponseStatus::Success,
            message: format!("{} chunks processed", total_chunks),
            files_processed: Some(files_processed),
            total_chunks: Some(total_chunks),
            analysis: Some(analysis.text),
            analysis_status: Some(analysis.status),
        }
    }

    /// Failed ingest
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: ResponseStatus::Error,
            message: message.into(),
            files_processed: None,
            total_chunks: None,
            analysis: None,
            analysis_status: None,
        }
    }

    /// Whether the ingest indexed anything
    pub fn is_success(&self) -> bool {
        self.status == ResponseStatus::Success
    }
}

/// Response to a question
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResponse {
    /// Always `ok`; request-level failures are returned as errors
    pub status: ResponseStatus,
    /// Answer text
    pub answer: String,
    /// How the answer was produced
    pub answer_status: AnswerStatus,
}

impl From<Answer> for QueryResponse {
    fn from(answer: Answer) -> Self {
        Self {
            status: ResponseStatus::Ok,
            answer: answer.text,
            answer_status: answer.status,
        }
    }
}

/// Health check payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: ResponseStatus,
    /// Vectors in the index
    pub total_vectors: usize,
    /// Chunks in the metadata store
    pub total_chunks: usize,
    /// Whether the chat-completion credential is set
    pub llm_configured: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ingest_error_omits_optional_fields() {
        let json = serde_json::to_value(IngestResponse::error("No files were provided")).unwrap();
        assert_eq!(json["status"], "error");
        assert_eq!(json["message"], "No files were provided");
        assert!(json.get("files_processed").is_none());
        assert!(json.get("analysis").is_none());
    }

    #[test]
    fn test_ingest_success_carries_analysis_status() {
        let response = IngestResponse::success(
            vec!["a.txt".to_string()],
            3,
            Answer::new("partial", AnswerStatus::Degraded),
        );
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["status"], "success");
        assert_eq!(json["message"], "3 chunks processed");
        assert_eq!(json["total_chunks"], 3);
        assert_eq!(json["analysis_status"], "degraded");
    }

    #[test]
    fn test_query_response_from_answer() {
        let response = QueryResponse::from(Answer::new("42", AnswerStatus::Generated));
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["answer"], "42");
        assert_eq!(json["answer_status"], "generated");
    }
}
