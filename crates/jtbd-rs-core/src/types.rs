//! Request, result and stage types for the creation pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Input for creating a job statement.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CreationRequest {
    pub statement: String,
    #[serde(default)]
    pub context: Option<String>,
    #[serde(default)]
    pub priority: Option<i64>,
}

impl CreationRequest {
    pub fn new(statement: impl Into<String>) -> Self {
        Self {
            statement: statement.into(),
            context: None,
            priority: None,
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_priority(mut self, priority: i64) -> Self {
        self.priority = Some(priority);
        self
    }
}

/// Per-call switches.
#[derive(Debug, Clone, Copy)]
pub struct CreateOptions {
    /// Attempt to attach an embedding (default true).
    pub generate_embedding: bool,
}

impl Default for CreateOptions {
    fn default() -> Self {
        Self {
            generate_embedding: true,
        }
    }
}

/// Successful creation, as returned to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreationResult {
    pub id: Uuid,
    pub statement: String,
    pub context: Option<String>,
    pub priority: Option<u8>,
    pub embedding_generated: bool,
    pub created_at: DateTime<Utc>,
}

/// Result of a stage that may not abort the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum StageOutcome<T> {
    /// The stage ran and produced a value.
    Completed(T),
    /// The stage was not attempted.
    Skipped,
    /// The stage failed; the pipeline continues without its output.
    Degraded(String),
}

impl<T> StageOutcome<T> {
    pub fn is_completed(&self) -> bool {
        matches!(self, StageOutcome::Completed(_))
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, StageOutcome::Degraded(_))
    }

    pub fn completed(self) -> Option<T> {
        match self {
            StageOutcome::Completed(value) => Some(value),
            StageOutcome::Skipped | StageOutcome::Degraded(_) => None,
        }
    }
}

/// Position of a creation call in the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Validating,
    CheckingDuplicates,
    Embedding,
    Persisting,
    Done,
}

impl PipelineStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStage::Validating => "validating",
            PipelineStage::CheckingDuplicates => "checking_duplicates",
            PipelineStage::Embedding => "embedding",
            PipelineStage::Persisting => "persisting",
            PipelineStage::Done => "done",
        }
    }

    /// The stage that follows this one; `Done` is terminal.
    pub fn next(self) -> Self {
        match self {
            PipelineStage::Validating => PipelineStage::CheckingDuplicates,
            PipelineStage::CheckingDuplicates => PipelineStage::Embedding,
            PipelineStage::Embedding => PipelineStage::Persisting,
            PipelineStage::Persisting | PipelineStage::Done => PipelineStage::Done,
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
