//! Groq (OpenAI-compatible) chat-completion client with retry logic

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::sleep;

use crate::config::LlmConfig;
use crate::error::{Error, Result};
use crate::providers::LlmProvider;

/// Chat-completion client with automatic retry
pub struct GroqClient {
    /// HTTP client
    client: Client,
    /// `{base_url}/chat/completions`
    endpoint: String,
    /// Generation model
    model: String,
    /// Bearer token
    api_key: String,
    /// Maximum retries
    max_retries: u32,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_completion_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

impl GroqClient {
    /// Create a client with an explicit API key
    pub fn new(config: &LlmConfig, api_key: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .pool_max_idle_per_host(5)
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            model: config.model.clone(),
            api_key: api_key.into(),
            max_retries: config.max_retries,
        })
    }

    /// Create a client whose API key is read from `config.api_key_env`
    pub fn from_env(config: &LlmConfig) -> Result<Self> {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                Error::Config(format!("{} is not set in the environment", config.api_key_env))
            })?;

        Self::new(config, api_key)
    }

    /// Retry a request with exponential backoff
    async fn retry_request<F, Fut, T>(&self, operation: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<T>>,
    {
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) => {
                    last_error = Some(e);
                    if attempt < self.max_retries {
                        let delay = Duration::from_secs(2u64.pow(attempt));
                        tracing::warn!(
                            "Request failed (attempt {}/{}), retrying in {:?}",
                            attempt + 1,
                            self.max_retries + 1,
                            delay
                        );
                        sleep(delay).await;
                    }
                }
            }
        }

        Err(last_error.unwrap_or_else(|| Error::Llm("Unknown error".to_string())))
    }

    async fn send_once(&self, prompt: &str, temperature: f32, max_tokens: u32) -> Result<String> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature,
            max_completion_tokens: max_tokens,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Llm(format!("Completion request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Llm(format!(
                "Completion failed: HTTP {} - {}",
                status, body
            )));
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| Error::Llm(format!("Failed to parse completion response: {}", e)))?;

        chat.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| Error::Llm("Completion response has no content".to_string()))
    }
}

#[async_trait]
impl LlmProvider for GroqClient {
    async fn complete(&self, prompt: &str, temperature: f32, max_tokens: u32) -> Result<String> {
        tracing::info!(
            "Requesting completion from {} ({} prompt chars)",
            self.model,
            prompt.len()
        );

        self.retry_request(|| self.send_once(prompt, temperature, max_tokens))
            .await
    }

    fn name(&self) -> &str {
        "groq"
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(server: &MockServer, max_retries: u32) -> LlmConfig {
        LlmConfig {
            base_url: server.uri(),
            max_retries,
            timeout_secs: 5,
            ..LlmConfig::default()
        }
    }

    fn reply(content: &str) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({
            "id": "chatcmpl-1",
            "choices": [
                { "index": 0, "message": { "role": "assistant", "content": content } }
            ]
        }))
    }

    #[tokio::test]
    async fn test_sends_chat_request_and_parses_reply() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer test-key"))
            .and(body_partial_json(json!({
                "model": "llama-3.1-8b-instant",
                "max_completion_tokens": 1200,
                "messages": [{ "role": "user", "content": "What is in the file?" }]
            })))
            .respond_with(reply("A recipe."))
            .expect(1)
            .mount(&server)
            .await;

        let client = GroqClient::new(&config_for(&server, 0), "test-key").unwrap();
        let answer = client
            .complete("What is in the file?", 0.3, 1200)
            .await
            .unwrap();

        assert_eq!(answer, "A recipe.");
        assert_eq!(client.model(), "llama-3.1-8b-instant");
    }

    #[tokio::test]
    async fn test_http_error_is_llm_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(500).set_body_string("overloaded"))
            .expect(1)
            .mount(&server)
            .await;

        let client = GroqClient::new(&config_for(&server, 0), "test-key").unwrap();
        let result = client.complete("hello", 0.3, 10).await;

        assert!(matches!(result, Err(Error::Llm(msg)) if msg.contains("500")));
    }

    #[tokio::test]
    async fn test_retries_after_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(reply("second time lucky"))
            .mount(&server)
            .await;

        let client = GroqClient::new(&config_for(&server, 1), "test-key").unwrap();
        let answer = client.complete("hello", 0.4, 10).await.unwrap();
        assert_eq!(answer, "second time lucky");
    }

    #[tokio::test]
    async fn test_empty_choices_is_llm_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
            .mount(&server)
            .await;

        let client = GroqClient::new(&config_for(&server, 0), "test-key").unwrap();
        assert!(matches!(
            client.complete("hello", 0.3, 10).await,
            Err(Error::Llm(_))
        ));
    }

    #[test]
    fn test_missing_credential_is_config_error() {
        let config = LlmConfig {
            api_key_env: "DOCQA_TEST_KEY_THAT_IS_NEVER_SET".to_string(),
            ..LlmConfig::default()
        };
        assert!(matches!(
            GroqClient::from_env(&config),
            Err(Error::Config(_))
        ));
    }
}
