use jtbd_rs_logging::{Level, LogSink};
use parking_lot::Mutex;

#[derive(Debug, Default)]
pub struct RecordingSink {
    lines: Mutex<Vec<(Level, String)>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<(Level, String)> {
        self.lines.lock().clone()
    }

    /// True when some line at `level` contains `needle`.
    pub fn contains(&self, level: Level, needle: &str) -> bool {
        self.lines
            .lock()
            .iter()
            .any(|(line_level, line)| *line_level == level && line.contains(needle))
    }

    pub fn count_at(&self, level: Level) -> usize {
        self.lines
            .lock()
            .iter()
            .filter(|(line_level, _)| *line_level == level)
            .count()
    }
}

impl LogSink for RecordingSink {
    fn emit(&self, level: Level, line: &str) {
        self.lines.lock().push((level, line.to_string()));
    }
}
