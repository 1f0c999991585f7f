//! Configuration loading and management.
//!
//! Loads configuration from `./stackwise.toml` (or `$STACKWISE_CONFIG_PATH`).
//! Environment variables override file values; file values override
//! defaults.
//!
//! Precedence: env vars > config file > defaults.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::advisor::response::Shape;
use crate::advisor::DEFAULT_MODEL_TIMEOUT_SECONDS;
use crate::cache::{DEFAULT_CAPACITY, DEFAULT_TTL_SECONDS};

// ── Top-level config ────────────────────────────────────────────

/// Top-level configuration loaded from TOML.
///
/// Path: `./stackwise.toml` or `$STACKWISE_CONFIG_PATH`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StackwiseConfig {
    /// Advisor pipeline settings (`[advisor]`).
    pub advisor: AdvisorSection,
    /// Plan cache settings (`[cache]`).
    pub cache: CacheSection,
    /// Model provider configuration (`[llm]`).
    pub llm: LlmSection,
    /// Filesystem paths (`[paths]`).
    pub paths: PathsSection,
}

impl StackwiseConfig {
    /// Load configuration with precedence: env vars > TOML file > defaults.
    ///
    /// If the file does not exist, defaults are used.
    ///
    /// # Errors
    ///
    /// Returns an error when the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from_file()?;
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Load from the TOML file only, no env overrides.
    fn load_from_file() -> Result<Self> {
        let path = Self::config_path_with(|key| std::env::var(key).ok());
        match std::fs::read_to_string(&path) {
            Ok(contents) => {
                tracing::info!(path = %path.display(), "loading config from file");
                let config: StackwiseConfig =
                    toml::from_str(&contents).context("failed to parse config TOML")?;
                Ok(config)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("no config file found, using defaults");
                Ok(StackwiseConfig::default())
            }
            Err(e) => Err(anyhow::anyhow!("failed to read config file: {e}")),
        }
    }

    /// Resolve the config path using a custom env resolver (for testing).
    fn config_path_with(env: impl Fn(&str) -> Option<String>) -> PathBuf {
        match env("STACKWISE_CONFIG_PATH") {
            Some(p) => PathBuf::from(p),
            None => PathBuf::from("stackwise.toml"),
        }
    }

    /// Apply environment variable overrides (env > config > defaults).
    ///
    /// Takes a resolver function for testability.
    fn apply_overrides(&mut self, env: impl Fn(&str) -> Option<String>) {
        // Advisor.
        if let Some(v) = env("STACKWISE_OFFLINE") {
            self.advisor.offline = matches!(v.as_str(), "1" | "true" | "yes");
        }
        if let Some(v) = env("STACKWISE_MODEL_TIMEOUT_SECS") {
            match v.parse() {
                Ok(n) => self.advisor.model_timeout_seconds = n,
                Err(_) => tracing::warn!(
                    var = "STACKWISE_MODEL_TIMEOUT_SECS",
                    value = %v,
                    "ignoring invalid env override"
                ),
            }
        }
        if let Some(v) = env("STACKWISE_SHAPE") {
            match Shape::parse(&v) {
                Some(shape) => self.advisor.shape = shape,
                None => tracing::warn!(
                    var = "STACKWISE_SHAPE",
                    value = %v,
                    "ignoring invalid env override"
                ),
            }
        }

        // Cache.
        if let Some(v) = env("STACKWISE_CACHE_TTL_SECS") {
            match v.parse() {
                Ok(n) => self.cache.ttl_seconds = n,
                Err(_) => tracing::warn!(
                    var = "STACKWISE_CACHE_TTL_SECS",
                    value = %v,
                    "ignoring invalid env override"
                ),
            }
        }
        if let Some(v) = env("STACKWISE_CACHE_CAPACITY") {
            match v.parse() {
                Ok(n) => self.cache.capacity = n,
                Err(_) => tracing::warn!(
                    var = "STACKWISE_CACHE_CAPACITY",
                    value = %v,
                    "ignoring invalid env override"
                ),
            }
        }

        // LLM -- Anthropic (env var presence creates the provider).
        if let Some(key) = env("STACKWISE_ANTHROPIC_API_KEY") {
            let model = env("STACKWISE_ANTHROPIC_MODEL").unwrap_or_else(|| {
                self.llm
                    .anthropic
                    .as_ref()
                    .map(|c| c.model.clone())
                    .unwrap_or_else(default_anthropic_model)
            });
            self.llm.anthropic = Some(AnthropicSection {
                api_key: key,
                model,
            });
        }

        // LLM -- Ollama.
        if let Some(url) = env("STACKWISE_OLLAMA_URL") {
            let model = env("STACKWISE_OLLAMA_MODEL").unwrap_or_else(|| {
                self.llm
                    .ollama
                    .as_ref()
                    .map(|c| c.model.clone())
                    .unwrap_or_else(default_ollama_model)
            });
            self.llm.ollama = Some(OllamaSection {
                base_url: url,
                model,
            });
        }

        // Paths.
        if let Some(v) = env("STACKWISE_LOGS_DIR") {
            self.paths.logs_dir = v;
        }
    }

    /// Parse a TOML string into config (for testing).
    ///
    /// # Errors
    ///
    /// Returns an error when the TOML is malformed.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: StackwiseConfig =
            toml::from_str(toml_str).context("failed to parse config TOML")?;
        Ok(config)
    }
}

// ── Advisor section ─────────────────────────────────────────────

/// Advisor pipeline settings (`[advisor]`).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AdvisorSection {
    /// Skip model construction entirely; the fallback planner is
    /// authoritative.
    pub offline: bool,
    /// Bound on one model call in seconds.
    pub model_timeout_seconds: u64,
    /// Requested default unlocked index per plan.
    pub unlocked_default: usize,
    /// Which response shape to render by default.
    pub shape: Shape,
}

impl Default for AdvisorSection {
    fn default() -> Self {
        Self {
            offline: false,
            model_timeout_seconds: DEFAULT_MODEL_TIMEOUT_SECONDS,
            unlocked_default: 0,
            shape: Shape::Canonical,
        }
    }
}

// ── Cache section ───────────────────────────────────────────────

/// Plan cache settings (`[cache]`).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheSection {
    /// Entry lifetime in seconds.
    pub ttl_seconds: u64,
    /// Entry capacity before oldest-first eviction.
    pub capacity: usize,
}

impl Default for CacheSection {
    fn default() -> Self {
        Self {
            ttl_seconds: DEFAULT_TTL_SECONDS,
            capacity: DEFAULT_CAPACITY,
        }
    }
}

// ── LLM section ─────────────────────────────────────────────────

/// Model provider configuration (`[llm]`).
///
/// Both providers are optional; with neither configured the advisor runs
/// offline.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LlmSection {
    /// Anthropic provider.
    pub anthropic: Option<AnthropicSection>,
    /// Ollama provider (local).
    pub ollama: Option<OllamaSection>,
}

/// Anthropic provider config (`[llm.anthropic]`).
#[derive(Clone, Deserialize)]
pub struct AnthropicSection {
    /// API key.
    pub api_key: String,
    /// Model name.
    #[serde(default = "default_anthropic_model")]
    pub model: String,
}

impl std::fmt::Debug for AnthropicSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnthropicSection")
            .field("api_key", &"__REDACTED__")
            .field("model", &self.model)
            .finish()
    }
}

fn default_anthropic_model() -> String {
    "claude-sonnet-4-20250514".to_owned()
}

/// Ollama provider config (`[llm.ollama]`).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OllamaSection {
    /// Server base URL.
    pub base_url: String,
    /// Model name.
    pub model: String,
}

impl Default for OllamaSection {
    fn default() -> Self {
        Self {
            base_url: crate::providers::ollama::DEFAULT_OLLAMA_URL.to_owned(),
            model: default_ollama_model(),
        }
    }
}

fn default_ollama_model() -> String {
    "llama3".to_owned()
}

// ── Paths section ───────────────────────────────────────────────

/// Filesystem paths (`[paths]`).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PathsSection {
    /// Directory for rotated JSON log files.
    pub logs_dir: String,
}

impl Default for PathsSection {
    fn default() -> Self {
        Self {
            logs_dir: "logs".to_owned(),
        }
    }
}

// ── Tests ───────────────────────────────────────────────────────
