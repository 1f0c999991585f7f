//! Anthropic provider using the `/v1/messages` API.

use serde::{Deserialize, Serialize};

use super::{check_http_response, PlanModel, PlanRequest, ProviderError};

const ANTHROPIC_API_BASE: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";

// ---------------------------------------------------------------------------
// Wire types (pub for integration testing)
// ---------------------------------------------------------------------------

/// Messages API request body.
#[doc(hidden)]
#[derive(Debug, Serialize)]
pub struct AnthropicRequest {
    /// Model identifier.
    pub model: String,
    /// Conversation messages -- always a single user turn here.
    pub messages: Vec<AnthropicMessage>,
    /// Maximum tokens to generate.
    pub max_tokens: u32,
    /// System prompt.
    pub system: String,
}

/// A message in Anthropic format.
#[doc(hidden)]
#[derive(Debug, Serialize, Deserialize)]
pub struct AnthropicMessage {
    /// Role: "user" or "assistant".
    pub role: String,
    /// Plain text content.
    pub content: String,
}

/// Messages API response body.
#[doc(hidden)]
#[derive(Debug, Deserialize)]
pub struct AnthropicResponse {
    /// Content blocks in the response.
    pub content: Vec<AnthropicContentBlock>,
}

/// A content block in the response.
#[doc(hidden)]
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnthropicContentBlock {
    /// Text content.
    Text {
        /// The text.
        text: String,
    },
    /// Any non-text block; ignored when joining text.
    #[serde(other)]
    Other,
}

// ---------------------------------------------------------------------------
// Provider
// ---------------------------------------------------------------------------

/// Anthropic messages API provider.
#[derive(Clone)]
pub struct AnthropicModel {
    model: String,
    api_key: String,
    client: reqwest::Client,
}

impl std::fmt::Debug for AnthropicModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnthropicModel")
            .field("model", &self.model)
            .field("api_key", &"__REDACTED__")
            .finish()
    }
}

impl AnthropicModel {
    /// Create a provider instance for one model.
    pub fn new(model: String, api_key: String) -> Self {
        Self {
            model,
            api_key,
            client: reqwest::Client::new(),
        }
    }
}

/// Parse a messages API response body, joining all text blocks.
///
/// # Errors
///
/// Returns `ProviderError::Parse` when the body cannot be deserialized.
#[doc(hidden)]
pub fn parse_response(body: &str) -> Result<String, ProviderError> {
    let resp: AnthropicResponse =
        serde_json::from_str(body).map_err(|e| ProviderError::Parse(e.to_string()))?;

    let text: String = resp
        .content
        .into_iter()
        .filter_map(|block| match block {
            AnthropicContentBlock::Text { text } => Some(text),
            AnthropicContentBlock::Other => None,
        })
        .collect();

    Ok(text)
}

#[async_trait::async_trait]
impl PlanModel for AnthropicModel {
    async fn complete(&self, request: PlanRequest) -> Result<String, ProviderError> {
        let api_request = AnthropicRequest {
            model: self.model.clone(),
            messages: vec![AnthropicMessage {
                role: "user".to_owned(),
                content: request.user,
            }],
            max_tokens: request.max_tokens,
            system: request.system,
        };

        let response = self
            .client
            .post(ANTHROPIC_API_BASE)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .header("x-api-key", &self.api_key)
            .json(&api_request)
            .send()
            .await?;

        let payload = check_http_response(response).await?;
        parse_response(&payload)
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}
