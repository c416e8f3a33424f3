//! Error types for the creation pipeline.

use serde::Serialize;
use serde_json::{Value, json};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Machine-readable failure code shared with callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReasonCode {
    InvalidInput,
    DuplicateEntry,
    PersistenceError,
}

impl ReasonCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReasonCode::InvalidInput => "INVALID_INPUT",
            ReasonCode::DuplicateEntry => "DUPLICATE_ENTRY",
            ReasonCode::PersistenceError => "PERSISTENCE_ERROR",
        }
    }
}

impl fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What exactly was wrong with a field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(
    tag = "kind",
    rename_all = "snake_case",
    rename_all_fields = "camelCase"
)]
pub enum ValidationDetail {
    /// Required field absent or null.
    Missing,
    /// Field present with the wrong JSON type.
    WrongType { expected: &'static str },
    /// Text empty after trimming.
    Empty,
    /// Trimmed text longer than allowed.
    TooLong {
        current_length: usize,
        max_length: usize,
    },
    /// Number that is not a whole integer.
    NotAnInteger { min: i64, max: i64 },
    /// Integer outside the inclusive range.
    OutOfRange { min: i64, max: i64 },
}

impl fmt::Display for ValidationDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationDetail::Missing => write!(f, "is required"),
            ValidationDetail::WrongType { expected } => write!(f, "must be a {expected}"),
            ValidationDetail::Empty => write!(f, "must not be empty"),
            ValidationDetail::TooLong {
                current_length,
                max_length,
            } => write!(
                f,
                "is {current_length} characters, maximum is {max_length}"
            ),
            ValidationDetail::NotAnInteger { min, max } => {
                write!(f, "must be an integer between {min} and {max}")
            }
            ValidationDetail::OutOfRange { min, max } => {
                write!(f, "must be between {min} and {max}")
            }
        }
    }
}

/// Rejected input, naming the field and the offending value.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[error("{field} {detail}")]
pub struct ValidationError {
    pub field: &'static str,
    /// Offending value; `None` when the field was absent.
    pub value: Option<Value>,
    pub detail: ValidationDetail,
}

impl ValidationError {
    pub(crate) fn new(field: &'static str, value: Option<Value>, detail: ValidationDetail) -> Self {
        Self {
            field,
            value,
            detail,
        }
    }
}

/// Fatal outcomes of `CreationPipeline::create`.
#[derive(Debug, Error)]
pub enum CreateJobError {
    /// The request failed validation; nothing was read or written.
    #[error("invalid input: {0}")]
    Validation(#[from] ValidationError),
    /// The owner already has a live record with this statement.
    #[error("duplicate job statement (existing id {existing_id})")]
    DuplicateEntry { existing_id: Uuid },
    /// The final write failed.
    #[error("failed to persist job statement ({reason}): {message}")]
    Persistence {
        /// Store-provided reason, e.g. `UNIQUE_VIOLATION`.
        reason: &'static str,
        message: String,
    },
}

impl CreateJobError {
    pub fn code(&self) -> ReasonCode {
        match self {
            CreateJobError::Validation(_) => ReasonCode::InvalidInput,
            CreateJobError::DuplicateEntry { .. } => ReasonCode::DuplicateEntry,
            CreateJobError::Persistence { .. } => ReasonCode::PersistenceError,
        }
    }

    /// Caller-facing body: the code, a message and the contextual fields.
    pub fn to_json(&self) -> Value {
        let details = match self {
            CreateJobError::Validation(err) => json!(err),
            CreateJobError::DuplicateEntry { existing_id } => json!({ "existingId": existing_id }),
            CreateJobError::Persistence { reason, .. } => json!({ "reason": reason }),
        };
        json!({
            "code": self.code(),
            "message": self.to_string(),
            "details": details,
        })
    }
}
