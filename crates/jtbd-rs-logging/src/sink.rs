//! Destinations for formatted log lines.

use log::Level;

/// `log` target used by `LogFacadeSink` unless another is given.
///
/// Records under this target are already timestamped and leveled.
pub const LOG_TARGET: &str = "jtbd";

/// Receives fully formatted, already-redacted log lines.
pub trait LogSink: Send + Sync {
    fn emit(&self, level: Level, line: &str);
}

/// Forwards lines to the `log` facade so the binary's logger decides where
/// they end up.
#[derive(Debug, Clone)]
pub struct LogFacadeSink {
    target: String,
}

impl LogFacadeSink {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
        }
    }
}

impl Default for LogFacadeSink {
    fn default() -> Self {
        Self::new(LOG_TARGET)
    }
}

impl LogSink for LogFacadeSink {
    fn emit(&self, level: Level, line: &str) {
        log::log!(target: self.target.as_str(), level, "{line}");
    }
}
