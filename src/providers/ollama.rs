//! Ollama provider using the `/api/chat` API.

use serde::{Deserialize, Serialize};

use super::{check_http_response, PlanModel, PlanRequest, ProviderError};

/// Default Ollama API base URL.
pub const DEFAULT_OLLAMA_URL: &str = "http://127.0.0.1:11434";

// ---------------------------------------------------------------------------
// Wire types (pub for integration testing)
// ---------------------------------------------------------------------------

/// Chat API request body.
#[doc(hidden)]
#[derive(Debug, Serialize)]
pub struct OllamaRequest {
    /// Model name.
    pub model: String,
    /// Conversation messages.
    pub messages: Vec<OllamaMessage>,
    /// Disable streaming; the advisor wants one body.
    pub stream: bool,
    /// Generation options.
    pub options: OllamaOptions,
}

/// A message in Ollama format.
#[doc(hidden)]
#[derive(Debug, Serialize, Deserialize)]
pub struct OllamaMessage {
    /// Role: "system" or "user".
    pub role: String,
    /// Message content.
    pub content: String,
}

/// Generation options.
#[doc(hidden)]
#[derive(Debug, Serialize)]
pub struct OllamaOptions {
    /// Maximum tokens to generate.
    pub num_predict: u32,
}

/// Chat API response body.
#[doc(hidden)]
#[derive(Debug, Deserialize)]
pub struct OllamaResponse {
    /// Response message.
    pub message: OllamaResponseMessage,
}

/// The message part of a response.
#[doc(hidden)]
#[derive(Debug, Deserialize)]
pub struct OllamaResponseMessage {
    /// Message content.
    pub content: String,
}

// ---------------------------------------------------------------------------
// Provider
// ---------------------------------------------------------------------------

/// Ollama chat API provider for local models.
#[derive(Debug, Clone)]
pub struct OllamaModel {
    base_url: String,
    model: String,
    client: reqwest::Client,
}

impl OllamaModel {
    /// Create a provider instance against a base URL.
    pub fn new(base_url: String, model: String) -> Self {
        Self {
            base_url,
            model,
            client: reqwest::Client::new(),
        }
    }
}

/// Parse a chat API response body into its text content.
///
/// # Errors
///
/// Returns `ProviderError::Parse` when the body cannot be deserialized.
#[doc(hidden)]
pub fn parse_response(body: &str) -> Result<String, ProviderError> {
    let resp: OllamaResponse =
        serde_json::from_str(body).map_err(|e| ProviderError::Parse(e.to_string()))?;
    Ok(resp.message.content)
}

#[async_trait::async_trait]
impl PlanModel for OllamaModel {
    async fn complete(&self, request: PlanRequest) -> Result<String, ProviderError> {
        let api_request = OllamaRequest {
            model: self.model.clone(),
            messages: vec![
                OllamaMessage {
                    role: "system".to_owned(),
                    content: request.system,
                },
                OllamaMessage {
                    role: "user".to_owned(),
                    content: request.user,
                },
            ],
            stream: false,
            options: OllamaOptions {
                num_predict: request.max_tokens,
            },
        };

        let url = format!("{}/api/chat", self.base_url.trim_end_matches('/'));
        let response = self.client.post(&url).json(&api_request).send().await?;

        let payload = check_http_response(response).await?;
        parse_response(&payload)
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}
