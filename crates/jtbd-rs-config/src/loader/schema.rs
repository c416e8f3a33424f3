//! Schema validation helpers for JTBD JSON5 configuration.

use crate::ConfigError;
use serde_json::{Map, Value};

/// Validate a config layer (or the merged result) against the schema.
pub(super) fn validate_layer_schema(value: &Value, layer: &str) -> Result<(), ConfigError> {
    let map = expect_object(value, layer, "")?;
    ensure_allowed_keys(map, &["$schema", "store", "embedding", "logging"], layer, "")?;
    expect_keys(map, &["$schema"], JsonKind::String, layer, "")?;

    if let Some(value) = map.get("store") {
        let store = expect_object(value, layer, "store")?;
        ensure_allowed_keys(store, &["path", "enforce_unique_statements"], layer, "store")?;
        expect_keys(store, &["path"], JsonKind::String, layer, "store")?;
        expect_keys(
            store,
            &["enforce_unique_statements"],
            JsonKind::Bool,
            layer,
            "store",
        )?;
    }

    if let Some(value) = map.get("embedding") {
        let embedding = expect_object(value, layer, "embedding")?;
        ensure_allowed_keys(
            embedding,
            &[
                "enabled",
                "endpoint",
                "model",
                "dimensions",
                "api_key_env",
                "timeout_ms",
            ],
            layer,
            "embedding",
        )?;
        expect_keys(embedding, &["enabled"], JsonKind::Bool, layer, "embedding")?;
        expect_keys(
            embedding,
            &["endpoint", "model", "api_key_env"],
            JsonKind::String,
            layer,
            "embedding",
        )?;
        expect_keys(
            embedding,
            &["dimensions", "timeout_ms"],
            JsonKind::UnsignedInteger,
            layer,
            "embedding",
        )?;
    }

    if let Some(value) = map.get("logging") {
        let logging = expect_object(value, layer, "logging")?;
        ensure_allowed_keys(
            logging,
            &[
                "production",
                "sensitive_fields",
                "max_message_chars",
                "slow_operation_ms",
            ],
            layer,
            "logging",
        )?;
        expect_keys(logging, &["production"], JsonKind::Bool, layer, "logging")?;
        expect_keys(
            logging,
            &["sensitive_fields"],
            JsonKind::StringArray,
            layer,
            "logging",
        )?;
        expect_keys(
            logging,
            &["max_message_chars", "slow_operation_ms"],
            JsonKind::UnsignedInteger,
            layer,
            "logging",
        )?;
    }

    Ok(())
}

/// JSON shapes a config value can be checked against.
#[derive(Debug, Clone, Copy)]
enum JsonKind {
    String,
    Bool,
    UnsignedInteger,
    StringArray,
}

impl JsonKind {
    fn matches(self, value: &Value) -> bool {
        match self {
            JsonKind::String => value.is_string(),
            JsonKind::Bool => value.is_boolean(),
            JsonKind::UnsignedInteger => value.is_u64(),
            JsonKind::StringArray => value
                .as_array()
                .is_some_and(|entries| entries.iter().all(Value::is_string)),
        }
    }

    fn describe(self) -> &'static str {
        match self {
            JsonKind::String => "expected string",
            JsonKind::Bool => "expected bool",
            JsonKind::UnsignedInteger => "expected non-negative integer",
            JsonKind::StringArray => "expected array of strings",
        }
    }
}

fn expect_object<'a>(
    value: &'a Value,
    layer: &str,
    path: &str,
) -> Result<&'a Map<String, Value>, ConfigError> {
    value
        .as_object()
        .ok_or_else(|| invalid_field(layer, path, "expected object"))
}

/// Check every present key in `keys` against `kind`.
fn expect_keys(
    map: &Map<String, Value>,
    keys: &[&str],
    kind: JsonKind,
    layer: &str,
    path: &str,
) -> Result<(), ConfigError> {
    for key in keys {
        if let Some(value) = map.get(*key) {
            if !kind.matches(value) {
                return Err(invalid_field(layer, &join_path(path, key), kind.describe()));
            }
        }
    }
    Ok(())
}

/// Ensure an object contains only allowed keys.
fn ensure_allowed_keys(
    map: &Map<String, Value>,
    allowed: &[&str],
    layer: &str,
    path: &str,
) -> Result<(), ConfigError> {
    for key in map.keys() {
        if !allowed.contains(&key.as_str()) {
            return Err(invalid_field(layer, &join_path(path, key), "unknown key"));
        }
    }
    Ok(())
}

/// Join nested paths for better error messages.
fn join_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}

/// Build a structured invalid-field error.
fn invalid_field(layer: &str, path: &str, message: &str) -> ConfigError {
    let normalized_path = if path.is_empty() { "root" } else { path };
    ConfigError::InvalidField {
        path: format!("{layer}:{normalized_path}"),
        message: message.to_string(),
    }
}
