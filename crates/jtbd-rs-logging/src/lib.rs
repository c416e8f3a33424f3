//! Structured, redacting logger with single-use performance tracking.
//!
//! The logger is an explicitly constructed value: callers build one from
//! `LoggerSettings`, wrap it in an `Arc`, and hand it to whatever needs it.

mod logger;
mod perf;
mod redact;
mod sink;

/// Logger facade and its settings.
pub use logger::{LoggerSettings, StructuredLogger};
/// Performance tracking primitives.
pub use perf::{FinishedOperation, PerformanceTracker, TrackingId};
/// Context redaction policy.
pub use redact::RedactionPolicy;
/// Output sinks.
pub use sink::{LOG_TARGET, LogFacadeSink, LogSink};
/// Re-exported so callers need no direct `log` dependency to pick a level.
pub use log::Level;
