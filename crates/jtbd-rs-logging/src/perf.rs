//! Single-use operation timing.

use log::Level;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Handle returned by `PerformanceTracker::begin`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TrackingId(Uuid);

impl fmt::Display for TrackingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug)]
struct PendingOperation {
    operation: String,
    correlation: Value,
    started_at: Instant,
}

/// A tracked operation after `finish` removed it from the tracker.
#[derive(Debug, Clone)]
pub struct FinishedOperation {
    pub operation: String,
    pub correlation: Value,
    pub elapsed: Duration,
}

/// Tracks in-flight operations keyed by `TrackingId`.
#[derive(Debug)]
pub struct PerformanceTracker {
    slow_threshold: Duration,
    pending: Mutex<HashMap<TrackingId, PendingOperation>>,
}

impl PerformanceTracker {
    pub fn new(slow_threshold: Duration) -> Self {
        Self {
            slow_threshold,
            pending: Mutex::new(HashMap::new()),
        }
    }

    /// Start timing an operation.
    pub fn begin(&self, operation: &str, correlation: Value) -> TrackingId {
        let id = TrackingId(Uuid::new_v4());
        self.pending.lock().insert(
            id,
            PendingOperation {
                operation: operation.to_string(),
                correlation,
                started_at: Instant::now(),
            },
        );
        id
    }

    /// Stop timing and drop the entry. Unknown or already-finished ids yield `None`.
    pub fn finish(&self, id: TrackingId) -> Option<FinishedOperation> {
        let pending = self.pending.lock().remove(&id)?;
        Some(FinishedOperation {
            operation: pending.operation,
            correlation: pending.correlation,
            elapsed: pending.started_at.elapsed(),
        })
    }

    /// Error on failure, warn when slower than the threshold, debug otherwise.
    pub fn level_for(&self, elapsed: Duration, success: bool) -> Level {
        if !success {
            Level::Error
        } else if elapsed > self.slow_threshold {
            Level::Warn
        } else {
            Level::Debug
        }
    }

    /// Number of operations started but not yet finished.
    pub fn in_flight(&self) -> usize {
        self.pending.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::PerformanceTracker;
    use log::Level;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::time::Duration;

    #[test]
    fn finish_is_single_use() {
        let tracker = PerformanceTracker::new(Duration::from_secs(1));
        let id = tracker.begin("create", json!({ "ownerId": "u" }));
        assert_eq!(tracker.in_flight(), 1);

        let finished = tracker.finish(id).expect("first finish");
        assert_eq!(finished.operation, "create");
        assert_eq!(finished.correlation, json!({ "ownerId": "u" }));
        assert_eq!(tracker.in_flight(), 0);
        assert!(tracker.finish(id).is_none());
    }

    #[test]
    fn level_escalates_on_slowness_and_failure() {
        let tracker = PerformanceTracker::new(Duration::from_millis(100));
        assert_eq!(tracker.level_for(Duration::from_millis(5), true), Level::Debug);
        assert_eq!(tracker.level_for(Duration::from_millis(500), true), Level::Warn);
        assert_eq!(tracker.level_for(Duration::from_millis(5), false), Level::Error);
        assert_eq!(tracker.level_for(Duration::from_millis(500), false), Level::Error);
    }
}
