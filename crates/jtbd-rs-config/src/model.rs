//! Configuration schema for the JTBD pipeline.

use serde::{Deserialize, Serialize};

/// Root config for the JTBD SDK and CLI.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct JtbdConfig {
    #[serde(default, rename = "$schema")]
    pub schema: Option<String>,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl JtbdConfig {
    /// Start building a config programmatically with defaults applied.
    pub fn builder() -> JtbdConfigBuilder {
        JtbdConfigBuilder::new()
    }
}

/// Builder for assembling a `JtbdConfig` in code.
#[derive(Debug, Default, Clone)]
pub struct JtbdConfigBuilder {
    config: JtbdConfig,
}

impl JtbdConfigBuilder {
    /// Create a new builder seeded with default config values.
    pub fn new() -> Self {
        Self {
            config: JtbdConfig::default(),
        }
    }

    /// Replace the store configuration.
    pub fn store(mut self, store: StoreConfig) -> Self {
        self.config.store = store;
        self
    }

    /// Replace the embedding configuration.
    pub fn embedding(mut self, embedding: EmbeddingConfig) -> Self {
        self.config.embedding = embedding;
        self
    }

    /// Replace the logging configuration.
    pub fn logging(mut self, logging: LoggingConfig) -> Self {
        self.config.logging = logging;
        self
    }

    /// Finalize and return the built `JtbdConfig`.
    pub fn build(self) -> JtbdConfig {
        self.config
    }
}

/// SQLite store settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StoreConfig {
    /// Database file path; defaults to `~/.jtbd/jtbd.sqlite3`.
    #[serde(default)]
    pub path: Option<String>,
    /// Back the pipeline's duplicate check with a case-insensitive unique index.
    #[serde(default)]
    pub enforce_unique_statements: bool,
}

/// Embedding generator settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_embedding_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_embedding_model")]
    pub model: String,
    #[serde(default = "default_embedding_dimensions")]
    pub dimensions: usize,
    /// Environment variable holding the bearer token.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_embedding_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: default_embedding_endpoint(),
            model: default_embedding_model(),
            dimensions: default_embedding_dimensions(),
            api_key_env: default_api_key_env(),
            timeout_ms: default_embedding_timeout_ms(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_embedding_endpoint() -> String {
    "https://api.openai.com/v1/embeddings".to_string()
}

fn default_embedding_model() -> String {
    "text-embedding-3-small".to_string()
}

fn default_embedding_dimensions() -> usize {
    1536
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

fn default_embedding_timeout_ms() -> u64 {
    10_000
}

/// Structured logger settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Emit single-line JSON records instead of human-readable output.
    #[serde(default)]
    pub production: bool,
    /// Context keys whose values are redacted before emission.
    #[serde(default = "default_sensitive_fields")]
    pub sensitive_fields: Vec<String>,
    #[serde(default = "default_max_message_chars")]
    pub max_message_chars: usize,
    /// Tracked operations slower than this are logged at warn.
    #[serde(default = "default_slow_operation_ms")]
    pub slow_operation_ms: u64,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            production: false,
            sensitive_fields: default_sensitive_fields(),
            max_message_chars: default_max_message_chars(),
            slow_operation_ms: default_slow_operation_ms(),
        }
    }
}

/// Default sensitive key fragments.
fn default_sensitive_fields() -> Vec<String> {
    ["password", "token", "secret", "api_key", "authorization"]
        .iter()
        .map(|field| field.to_string())
        .collect()
}

fn default_max_message_chars() -> usize {
    1000
}

fn default_slow_operation_ms() -> u64 {
    1000
}
