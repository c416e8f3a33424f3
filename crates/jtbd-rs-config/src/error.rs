//! Errors raised while loading jtbd config layers.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// A config file could not be read from disk.
    #[error("cannot read jtbd config file {}: {source}", path.display())]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// A layer is not valid JSON5. `layer` names the file or `inline`.
    #[error("{layer} is not valid JSON5: {source}")]
    ParseFailed {
        layer: String,
        #[source]
        source: json5::Error,
    },
    /// The merged value does not deserialize into `JtbdConfig`.
    #[error("config does not match the jtbd schema: {0}")]
    DecodeFailed(#[from] serde_json::Error),
    #[error("{path}: {message}")]
    InvalidField { path: String, message: String },
    /// A cross-field rule failed after all layers were merged.
    #[error("invalid jtbd config: {0}")]
    Invalid(String),
}
