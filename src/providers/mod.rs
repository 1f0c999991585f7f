//! Model provider abstraction.
//!
//! The advisor only ever needs one thing from a model: raw text for one
//! system+user prompt pair. [`PlanModel`] captures exactly that, so the
//! pipeline stays ignorant of which vendor is behind it.
//!
//! Two providers are implemented:
//! - [`anthropic::AnthropicModel`] -- Anthropic `/v1/messages` API
//! - [`ollama::OllamaModel`] -- Ollama `/api/chat` API

use async_trait::async_trait;
use regex::Regex;

pub mod anthropic;
pub mod ollama;

/// A single completion request: prompts in, raw text out.
#[derive(Debug, Clone)]
pub struct PlanRequest {
    /// System prompt fixing the output contract.
    pub system: String,
    /// User prompt carrying the wizard answers.
    pub user: String,
    /// Maximum tokens to generate.
    pub max_tokens: u32,
}

/// Errors returned by model providers.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// HTTP transport failure.
    #[error("provider request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// Response body did not match the provider's documented shape.
    #[error("provider response parse error: {0}")]
    Parse(String),
    /// Upstream responded with an error status.
    #[error("provider returned non-success status {status}: {body}")]
    HttpStatus {
        /// HTTP status code.
        status: u16,
        /// Sanitized response body excerpt.
        body: String,
    },
}

/// Core model interface: one prompt pair, one raw text response.
///
/// Implementations must be `Send + Sync`; the advisor holds them behind an
/// `Arc` across async boundaries.
#[async_trait]
pub trait PlanModel: Send + Sync {
    /// Request a completion.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] on transport, status, or parse failure.
    async fn complete(&self, request: PlanRequest) -> Result<String, ProviderError>;

    /// The model identifier this provider is instantiated for.
    fn model_id(&self) -> &str;
}

/// Check HTTP response status and return the body text or a structured
/// error.
///
/// # Errors
///
/// Returns `ProviderError::Request` on transport failure and
/// `ProviderError::HttpStatus` (with a sanitized body) on non-2xx.
pub(crate) async fn check_http_response(
    response: reqwest::Response,
) -> Result<String, ProviderError> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(ProviderError::HttpStatus {
            status: status.as_u16(),
            body: sanitize_error_body(&body),
        });
    }
    Ok(body)
}

/// Collapse whitespace, strip anything that looks like a credential, and
/// cap the length so error bodies are safe to log.
fn sanitize_error_body(raw: &str) -> String {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");

    let mut sanitized = collapsed;
    for pattern in [
        r"sk-ant-[A-Za-z0-9_\-]{10,}",
        r"sk-[A-Za-z0-9]{32,}",
        r"(?i)bearer\s+[A-Za-z0-9._\-]{10,}",
    ] {
        if let Ok(regex) = Regex::new(pattern) {
            sanitized = regex.replace_all(&sanitized, "[REDACTED]").into_owned();
        }
    }

    const MAX_ERROR_BODY_CHARS: usize = 256;
    if sanitized.chars().count() > MAX_ERROR_BODY_CHARS {
        let shortened = sanitized
            .chars()
            .take(MAX_ERROR_BODY_CHARS)
            .collect::<String>();
        return format!("{shortened}...[truncated]");
    }

    sanitized
}
