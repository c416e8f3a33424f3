//! Structured logger facade.

use crate::perf::{PerformanceTracker, TrackingId};
use crate::redact::RedactionPolicy;
use crate::sink::{LogFacadeSink, LogSink};
use chrono::{DateTime, SecondsFormat, Utc};
use log::Level;
use serde_json::{Map, Value, json};
use std::sync::Arc;
use std::time::Duration;

/// Suffix appended to messages cut at `max_message_chars`.
const TRUNCATION_MARKER: &str = "...[truncated]";

/// Runtime settings for `StructuredLogger`.
#[derive(Debug, Clone)]
pub struct LoggerSettings {
    /// Single-line JSON output when true, multi-line human output otherwise.
    pub production: bool,
    pub sensitive_fields: Vec<String>,
    pub max_message_chars: usize,
    /// Tracked operations slower than this are logged at warn.
    pub slow_operation: Duration,
}

impl Default for LoggerSettings {
    fn default() -> Self {
        Self {
            production: false,
            sensitive_fields: ["password", "token", "secret", "api_key", "authorization"]
                .iter()
                .map(|field| field.to_string())
                .collect(),
            max_message_chars: 1000,
            slow_operation: Duration::from_secs(1),
        }
    }
}

/// Leveled logger that redacts context, truncates messages and hands the
/// formatted line to a `LogSink`.
pub struct StructuredLogger {
    settings: LoggerSettings,
    redaction: RedactionPolicy,
    tracker: PerformanceTracker,
    sink: Arc<dyn LogSink>,
}

impl std::fmt::Debug for StructuredLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StructuredLogger")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl Default for StructuredLogger {
    fn default() -> Self {
        Self::new(LoggerSettings::default())
    }
}

impl StructuredLogger {
    /// Logger that forwards to the `log` facade.
    pub fn new(settings: LoggerSettings) -> Self {
        Self::with_sink(settings, Arc::new(LogFacadeSink::default()))
    }

    /// Logger writing to a caller-supplied sink.
    pub fn with_sink(settings: LoggerSettings, sink: Arc<dyn LogSink>) -> Self {
        let redaction = RedactionPolicy::new(settings.sensitive_fields.clone());
        let tracker = PerformanceTracker::new(settings.slow_operation);
        Self {
            settings,
            redaction,
            tracker,
            sink,
        }
    }

    pub fn settings(&self) -> &LoggerSettings {
        &self.settings
    }

    pub fn debug(&self, message: &str, context: Value) {
        self.log(Level::Debug, message, context);
    }

    pub fn info(&self, message: &str, context: Value) {
        self.log(Level::Info, message, context);
    }

    pub fn warn(&self, message: &str, context: Value) {
        self.log(Level::Warn, message, context);
    }

    pub fn error(&self, message: &str, context: Value) {
        self.log(Level::Error, message, context);
    }

    /// Format and emit a record at the given level.
    pub fn log(&self, level: Level, message: &str, context: Value) {
        let line = self.format_at(Utc::now(), level, message, context);
        self.sink.emit(level, &line);
    }

    /// Start tracking an operation; pair with `end`.
    pub fn start(&self, operation: &str, correlation: Value) -> TrackingId {
        self.tracker.begin(operation, correlation)
    }

    /// Finish a tracked operation and log its duration.
    ///
    /// Returns the elapsed time, or `None` when the id was unknown or already
    /// ended (nothing is logged in that case).
    pub fn end(&self, id: TrackingId, success: bool, extra: Value) -> Option<Duration> {
        let finished = self.tracker.finish(id)?;
        let level = self.tracker.level_for(finished.elapsed, success);

        let mut context = into_map(finished.correlation);
        context.extend(into_map(extra));
        context.insert("operation".to_string(), json!(finished.operation));
        context.insert("success".to_string(), json!(success));
        context.insert(
            "durationMs".to_string(),
            json!(finished.elapsed.as_secs_f64() * 1000.0),
        );
        let message = if success {
            format!("{} completed", finished.operation)
        } else {
            format!("{} failed", finished.operation)
        };
        self.log(level, &message, Value::Object(context));
        Some(finished.elapsed)
    }

    /// Tracked operations started but not yet ended.
    pub fn in_flight(&self) -> usize {
        self.tracker.in_flight()
    }

    /// Render a record without emitting it.
    pub fn format_at(
        &self,
        timestamp: DateTime<Utc>,
        level: Level,
        message: &str,
        context: Value,
    ) -> String {
        let message = truncate_message(message, self.settings.max_message_chars);
        let context = into_map(self.redaction.apply(context));
        let timestamp = timestamp.to_rfc3339_opts(SecondsFormat::Millis, true);

        if self.settings.production {
            return json!({
                "timestamp": timestamp,
                "level": level.as_str().to_ascii_lowercase(),
                "message": message,
                "context": context,
            })
            .to_string();
        }

        let mut line = format!("{timestamp} {:<5} {message}", level.as_str());
        for (key, value) in &context {
            let rendered = match value {
                Value::String(text) => text.clone(),
                other => other.to_string(),
            };
            line.push_str(&format!("\n    {key}: {rendered}"));
        }
        line
    }
}

/// Coerce a context value to an object; scalars land under `"value"`.
fn into_map(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        Value::Null => Map::new(),
        other => {
            let mut map = Map::new();
            map.insert("value".to_string(), other);
            map
        }
    }
}

fn truncate_message(message: &str, max_chars: usize) -> String {
    if message.chars().count() <= max_chars {
        return message.to_string();
    }
    let mut truncated: String = message.chars().take(max_chars).collect();
    truncated.push_str(TRUNCATION_MARKER);
    truncated
}
