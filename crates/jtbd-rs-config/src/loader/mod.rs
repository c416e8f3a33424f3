//! Layered configuration loader.
//!
//! Reads the optional user layer and any explicit override files, validates
//! each against the schema, deep-merges them in order, and produces the final
//! `JtbdConfig`.

mod merge;
mod schema;


use crate::{ConfigError, JtbdConfig};
use directories::UserDirs;
use log::{debug, info};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// Default config filename.
const DEFAULT_CONFIG_FILE: &str = "jtbd.json5";
/// Default config directory under the home directory.
const DEFAULT_CONFIG_DIR: &str = ".jtbd";

/// Effective config plus metadata about which layers were loaded.
#[derive(Debug, Clone)]
pub struct LayeredConfig {
    /// The merged, validated config.
    pub config: JtbdConfig,
    /// Metadata for each layer that contributed.
    pub layers: Vec<ConfigLayer>,
}

/// Origin for a single config layer in the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigLayerSource {
    /// User-specific configuration.
    User,
    /// Explicit override files (highest precedence, applied in order).
    Override,
}

/// Metadata about a loaded config layer.
#[derive(Debug, Clone)]
pub struct ConfigLayer {
    pub source: ConfigLayerSource,
    pub path: PathBuf,
}

/// Options controlling layered config discovery and overrides.
#[derive(Debug, Clone, Default)]
pub struct LayeredConfigOptions {
    /// Optional user config path (defaults to `~/.jtbd/jtbd.json5`).
    pub user_config_path: Option<PathBuf>,
    /// Override config paths applied after the user layer.
    pub override_paths: Vec<PathBuf>,
}

impl LayeredConfigOptions {
    /// Create options with the default user layer location.
    pub fn new() -> Self {
        Self {
            user_config_path: default_user_config_path(),
            override_paths: Vec::new(),
        }
    }

    /// Add an override config path that is applied last.
    pub fn with_override_path(mut self, path: impl AsRef<Path>) -> Self {
        self.override_paths.push(path.as_ref().to_path_buf());
        self
    }
}

impl JtbdConfig {
    /// Load a single config from a path (no layering).
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        info!("loading config from path: {}", path.display());
        let value = read_json5(path, &path.display().to_string())?;
        config_from_value(value, "config")
    }

    /// Load a single config from JSON5 contents (no layering).
    pub fn load_from_str(contents: &str) -> Result<Self, ConfigError> {
        debug!("loading config from raw contents (len={})", contents.len());
        let value: Value = json5::from_str(contents).map_err(|source| ConfigError::ParseFailed {
            layer: "inline config".to_string(),
            source,
        })?;
        config_from_value(value, "config")
    }

    /// Load the user layer (if present) followed by the given override files.
    pub fn load_layered(
        override_paths: impl IntoIterator<Item = PathBuf>,
    ) -> Result<LayeredConfig, ConfigError> {
        let mut options = LayeredConfigOptions::new();
        options.override_paths.extend(override_paths);
        Self::load_layered_with_options(options)
    }

    /// Load a layered config stack using explicit layer locations.
    ///
    /// Layer precedence (low -> high): user, overrides in the given order.
    /// A missing user layer is skipped; a missing override is an error.
    pub fn load_layered_with_options(
        options: LayeredConfigOptions,
    ) -> Result<LayeredConfig, ConfigError> {
        let mut layers = Vec::new();
        let mut merged = Value::Object(serde_json::Map::new());

        if let Some(path) = options.user_config_path.as_deref() {
            if path.exists() {
                let value = load_layer(ConfigLayerSource::User, path)?;
                merge::merge_json_values(&mut merged, &value);
                layers.push(ConfigLayer {
                    source: ConfigLayerSource::User,
                    path: path.to_path_buf(),
                });
            } else {
                debug!("user layer missing (path={})", path.display());
            }
        }

        for path in &options.override_paths {
            let value = load_layer(ConfigLayerSource::Override, path)?;
            merge::merge_json_values(&mut merged, &value);
            layers.push(ConfigLayer {
                source: ConfigLayerSource::Override,
                path: path.clone(),
            });
        }

        let config = config_from_value(merged, "effective")?;
        info!("layered config loaded (layers={})", layers.len());
        Ok(LayeredConfig { config, layers })
    }

    /// Validate configuration invariants that cannot be expressed in serde.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.embedding.enabled {
            if self.embedding.dimensions == 0 {
                return Err(ConfigError::Invalid(
                    "embedding.dimensions must be greater than zero".to_string(),
                ));
            }
            if self.embedding.endpoint.trim().is_empty() {
                return Err(ConfigError::Invalid(
                    "embedding.endpoint is required when embedding is enabled".to_string(),
                ));
            }
            if self.embedding.model.trim().is_empty() {
                return Err(ConfigError::Invalid(
                    "embedding.model is required when embedding is enabled".to_string(),
                ));
            }
        }
        if self.logging.max_message_chars == 0 {
            return Err(ConfigError::Invalid(
                "logging.max_message_chars must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Resolve the SQLite path, falling back to the user data directory.
    pub fn store_path(&self) -> Option<PathBuf> {
        match &self.store.path {
            Some(path) => Some(PathBuf::from(path)),
            None => UserDirs::new().map(|dirs| {
                dirs.home_dir()
                    .join(DEFAULT_CONFIG_DIR)
                    .join("jtbd.sqlite3")
            }),
        }
    }
}

fn config_from_value(value: Value, label: &str) -> Result<JtbdConfig, ConfigError> {
    schema::validate_layer_schema(&value, label)?;
    let config: JtbdConfig = serde_json::from_value(value)?;
    config.validate()?;
    Ok(config)
}

/// Read and schema-check a single layer from disk.
fn load_layer(source: ConfigLayerSource, path: &Path) -> Result<Value, ConfigError> {
    debug!(
        "loading config layer (source={:?}, path={})",
        source,
        path.display()
    );
    let label = layer_label(source, path);
    let value = read_json5(path, &label)?;
    schema::validate_layer_schema(&value, &label)?;
    Ok(value)
}

fn read_json5(path: &Path, label: &str) -> Result<Value, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
        path: path.to_path_buf(),
        source,
    })?;
    json5::from_str(&contents).map_err(|source| ConfigError::ParseFailed {
        layer: label.to_string(),
        source,
    })
}

/// Build a user-friendly label for schema validation errors.
fn layer_label(source: ConfigLayerSource, path: &Path) -> String {
    let name = match source {
        ConfigLayerSource::User => "user",
        ConfigLayerSource::Override => "override",
    };
    format!("{name}({})", path.display())
}

/// Default user config path under the home directory.
fn default_user_config_path() -> Option<PathBuf> {
    UserDirs::new().map(|dirs| {
        dirs.home_dir()
            .join(DEFAULT_CONFIG_DIR)
            .join(DEFAULT_CONFIG_FILE)
    })
}
