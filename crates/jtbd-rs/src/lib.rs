//! Public SDK surface for the JTBD creation pipeline.
//!
//! This crate re-exports the building blocks and wires a `CreationPipeline`
//! from a `JtbdConfig` so the CLI and embedding applications share setup.

use anyhow::Context;
use jtbd_rs_config::{EmbeddingConfig, JtbdConfig, LoggingConfig};
use jtbd_rs_core::CreationPipeline;
use jtbd_rs_embedding::{EmbeddingGenerator, OpenAiEmbeddingConfig, OpenAiEmbeddingGenerator};
use jtbd_rs_logging::{LoggerSettings, StructuredLogger};
use jtbd_rs_store::{SqliteJobStore, SqliteStoreOptions};
use log::{debug, info, warn};
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

/// Re-export for convenience.
pub use jtbd_rs_config as config;
pub use jtbd_rs_core as core;
/// Re-export for convenience.
pub use jtbd_rs_embedding as embedding;
pub use jtbd_rs_logging as logging;
/// Re-export for convenience.
pub use jtbd_rs_store as store;

#[inline]
/// Initialize the `log` backend from `RUST_LOG`.
///
/// Safe to call more than once; later calls are ignored.
pub fn init_logging() {
    let _ = env_logger::builder()
        .format(|buf, record| {
            let timestamp = buf.timestamp_millis();
            write_record(buf, &timestamp, record)
        })
        .parse_default_env()
        .try_init();
}

/// Structured logger lines carry their own timestamp and level, so they are
/// written as-is; everything else gets the usual prefix.
fn write_record(
    out: &mut dyn Write,
    timestamp: &dyn std::fmt::Display,
    record: &log::Record<'_>,
) -> std::io::Result<()> {
    if record.target() == jtbd_rs_logging::LOG_TARGET {
        return writeln!(out, "{}", record.args());
    }
    writeln!(
        out,
        "{timestamp} {:<5} {}: {}",
        record.level(),
        record.target(),
        record.args()
    )
}

/// Translate the logging section into structured logger settings.
pub fn logger_settings(config: &LoggingConfig) -> LoggerSettings {
    LoggerSettings {
        production: config.production,
        sensitive_fields: config.sensitive_fields.clone(),
        max_message_chars: config.max_message_chars,
        slow_operation: Duration::from_millis(config.slow_operation_ms),
    }
}

/// Open the configured SQLite store.
pub fn open_store(config: &JtbdConfig) -> anyhow::Result<Arc<SqliteJobStore>> {
    let path = config
        .store_path()
        .context("no store path configured and no home directory to default to")?;
    info!("opening job statement store (path={})", path.display());
    let store = SqliteJobStore::open(
        &path,
        SqliteStoreOptions {
            enforce_unique_statements: config.store.enforce_unique_statements,
        },
    )
    .with_context(|| format!("failed to open store at {}", path.display()))?;
    Ok(Arc::new(store))
}

/// Build the embedding generator, or `None` when embedding is disabled.
pub fn embedder_from_config(
    config: &EmbeddingConfig,
) -> anyhow::Result<Option<Arc<dyn EmbeddingGenerator>>> {
    if !config.enabled {
        debug!("embedding disabled by config");
        return Ok(None);
    }
    let api_key = std::env::var(&config.api_key_env).ok();
    if api_key.is_none() {
        warn!(
            "{} is not set; embedding requests are sent without credentials",
            config.api_key_env
        );
    }
    let generator = OpenAiEmbeddingGenerator::new(OpenAiEmbeddingConfig {
        endpoint: config.endpoint.clone(),
        model: config.model.clone(),
        dimensions: config.dimensions,
        api_key,
        timeout: Duration::from_millis(config.timeout_ms),
    })
    .context("failed to build embedding generator")?;
    Ok(Some(Arc::new(generator)))
}

/// Assemble a pipeline over an existing store.
pub fn build_pipeline_with_store(
    config: &JtbdConfig,
    store: Arc<SqliteJobStore>,
) -> anyhow::Result<CreationPipeline> {
    let logger = Arc::new(StructuredLogger::new(logger_settings(&config.logging)));
    let pipeline = CreationPipeline::new(store, logger);
    Ok(match embedder_from_config(&config.embedding)? {
        Some(embedder) => pipeline.with_embedder(embedder),
        None => pipeline,
    })
}

/// Open the configured store and assemble a pipeline over it.
pub fn build_pipeline(config: &JtbdConfig) -> anyhow::Result<CreationPipeline> {
    let store = open_store(config)?;
    build_pipeline_with_store(config, store)
}
