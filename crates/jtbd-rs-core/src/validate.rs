//! Input validation. Pure functions: no I/O, no logging.
//!
//! Rules run in a fixed order and the first failure wins: statement type,
//! statement emptiness, statement length, context type, context length,
//! priority.

use crate::error::{ValidationDetail, ValidationError};
use crate::types::CreationRequest;
use serde_json::{Value, json};

pub const MAX_STATEMENT_CHARS: usize = 500;
pub const MAX_CONTEXT_CHARS: usize = 1000;
pub const MIN_PRIORITY: i64 = 1;
pub const MAX_PRIORITY: i64 = 5;

/// A request that passed validation, with statement and context trimmed.
///
/// Only constructible through `validate_request` or `validate_payload`.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedRequest {
    statement: String,
    context: Option<String>,
    priority: Option<u8>,
}

impl ValidatedRequest {
    pub fn statement(&self) -> &str {
        &self.statement
    }

    /// Trimmed context; whitespace-only context is treated as absent.
    pub fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }

    pub fn priority(&self) -> Option<u8> {
        self.priority
    }
}

/// Validate a typed request.
pub fn validate_request(request: &CreationRequest) -> Result<ValidatedRequest, ValidationError> {
    let statement = check_statement(&request.statement)?;
    let context = request.context.as_deref().map(check_context).transpose()?;
    let priority = request.priority.map(check_priority).transpose()?;
    Ok(ValidatedRequest {
        statement,
        context: context.flatten(),
        priority,
    })
}

/// Validate an untyped JSON payload, where fields may be missing or mistyped.
pub fn validate_payload(payload: &Value) -> Result<ValidatedRequest, ValidationError> {
    let Some(fields) = payload.as_object() else {
        return Err(ValidationError::new(
            "payload",
            Some(payload.clone()),
            ValidationDetail::WrongType { expected: "object" },
        ));
    };

    let statement = match fields.get("statement") {
        None | Some(Value::Null) => {
            return Err(ValidationError::new(
                "statement",
                None,
                ValidationDetail::Missing,
            ));
        }
        Some(Value::String(statement)) => check_statement(statement)?,
        Some(other) => {
            return Err(ValidationError::new(
                "statement",
                Some(other.clone()),
                ValidationDetail::WrongType { expected: "string" },
            ));
        }
    };

    let context = match fields.get("context") {
        None | Some(Value::Null) => None,
        Some(Value::String(context)) => check_context(context)?,
        Some(other) => {
            return Err(ValidationError::new(
                "context",
                Some(other.clone()),
                ValidationDetail::WrongType { expected: "string" },
            ));
        }
    };

    let priority = match fields.get("priority") {
        None | Some(Value::Null) => None,
        Some(value) => Some(check_priority(priority_integer(value)?)?),
    };

    Ok(ValidatedRequest {
        statement,
        context,
        priority,
    })
}

fn check_statement(statement: &str) -> Result<String, ValidationError> {
    let trimmed = statement.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::new(
            "statement",
            Some(json!(statement)),
            ValidationDetail::Empty,
        ));
    }
    let length = trimmed.chars().count();
    if length > MAX_STATEMENT_CHARS {
        return Err(ValidationError::new(
            "statement",
            Some(json!(statement)),
            ValidationDetail::TooLong {
                current_length: length,
                max_length: MAX_STATEMENT_CHARS,
            },
        ));
    }
    Ok(trimmed.to_string())
}

fn check_context(context: &str) -> Result<Option<String>, ValidationError> {
    let trimmed = context.trim();
    let length = trimmed.chars().count();
    if length > MAX_CONTEXT_CHARS {
        return Err(ValidationError::new(
            "context",
            Some(json!(context)),
            ValidationDetail::TooLong {
                current_length: length,
                max_length: MAX_CONTEXT_CHARS,
            },
        ));
    }
    if trimmed.is_empty() {
        return Ok(None);
    }
    Ok(Some(trimmed.to_string()))
}

fn check_priority(priority: i64) -> Result<u8, ValidationError> {
    if !(MIN_PRIORITY..=MAX_PRIORITY).contains(&priority) {
        return Err(ValidationError::new(
            "priority",
            Some(json!(priority)),
            ValidationDetail::OutOfRange {
                min: MIN_PRIORITY,
                max: MAX_PRIORITY,
            },
        ));
    }
    Ok(priority as u8)
}

/// Extract an integer from a JSON priority. Whole floats such as `3.0` count
/// as integers; huge unsigned values are reported as out of range.
fn priority_integer(value: &Value) -> Result<i64, ValidationError> {
    if let Some(integer) = value.as_i64() {
        return Ok(integer);
    }
    if value.as_u64().is_some() {
        return Err(ValidationError::new(
            "priority",
            Some(value.clone()),
            ValidationDetail::OutOfRange {
                min: MIN_PRIORITY,
                max: MAX_PRIORITY,
            },
        ));
    }
    if let Some(float) = value.as_f64() {
        if float.fract() == 0.0 && float >= i64::MIN as f64 && float <= i64::MAX as f64 {
            return Ok(float as i64);
        }
    }
    Err(ValidationError::new(
        "priority",
        Some(value.clone()),
        ValidationDetail::NotAnInteger {
            min: MIN_PRIORITY,
            max: MAX_PRIORITY,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::{MAX_STATEMENT_CHARS, validate_payload, validate_request};
    use crate::error::ValidationDetail;
    use crate::types::CreationRequest;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn trims_statement_and_context() {
        let request = CreationRequest::new("  Stay motivated  ")
            .with_context("\tmornings\n")
            .with_priority(3);

        let validated = validate_request(&request).expect("valid");

        assert_eq!(validated.statement(), "Stay motivated");
        assert_eq!(validated.context(), Some("mornings"));
        assert_eq!(validated.priority(), Some(3));
    }

    #[test]
    fn whitespace_statement_is_empty() {
        let err = validate_request(&CreationRequest::new(" \n\t ")).unwrap_err();
        assert_eq!(err.field, "statement");
        assert_eq!(err.detail, ValidationDetail::Empty);
    }

    #[test]
    fn statement_length_is_counted_after_trim_in_chars() {
        let exact = format!("  {}  ", "é".repeat(MAX_STATEMENT_CHARS));
        assert!(validate_request(&CreationRequest::new(exact)).is_ok());

        let over = "a".repeat(MAX_STATEMENT_CHARS + 1);
        let err = validate_request(&CreationRequest::new(over)).unwrap_err();
        assert_eq!(
            err.detail,
            ValidationDetail::TooLong {
                current_length: 501,
                max_length: 500,
            }
        );
    }

    #[test]
    fn context_over_limit_is_rejected() {
        let request = CreationRequest::new("ok").with_context("c".repeat(1001));
        let err = validate_request(&request).unwrap_err();
        assert_eq!(err.field, "context");
        assert_eq!(
            err.detail,
            ValidationDetail::TooLong {
                current_length: 1001,
                max_length: 1000,
            }
        );
    }

    #[test]
    fn blank_context_is_dropped() {
        let validated =
            validate_request(&CreationRequest::new("ok").with_context("   ")).expect("valid");
        assert_eq!(validated.context(), None);
    }

    #[test]
    fn priority_bounds_are_inclusive() {
        for priority in [1, 5] {
            assert!(validate_request(&CreationRequest::new("ok").with_priority(priority)).is_ok());
        }
        for priority in [0, 6, -1, i64::MAX] {
            let err =
                validate_request(&CreationRequest::new("ok").with_priority(priority)).unwrap_err();
            assert_eq!(err.field, "priority");
            assert_eq!(err.detail, ValidationDetail::OutOfRange { min: 1, max: 5 });
        }
    }

    #[test]
    fn payload_reports_missing_and_mistyped_fields() {
        let err = validate_payload(&json!({ "context": "x" })).unwrap_err();
        assert_eq!((err.field, err.detail), ("statement", ValidationDetail::Missing));

        let err = validate_payload(&json!({ "statement": 42 })).unwrap_err();
        assert_eq!(err.field, "statement");
        assert_eq!(err.value, Some(json!(42)));
        assert_eq!(err.detail, ValidationDetail::WrongType { expected: "string" });

        let err = validate_payload(&json!({ "statement": "ok", "context": ["x"] })).unwrap_err();
        assert_eq!(err.field, "context");

        let err = validate_payload(&json!("statement")).unwrap_err();
        assert_eq!(err.field, "payload");
    }

    #[test]
    fn payload_priority_must_be_integral() {
        let err = validate_payload(&json!({ "statement": "ok", "priority": 2.5 })).unwrap_err();
        assert_eq!(err.detail, ValidationDetail::NotAnInteger { min: 1, max: 5 });

        let err = validate_payload(&json!({ "statement": "ok", "priority": "3" })).unwrap_err();
        assert_eq!(err.detail, ValidationDetail::NotAnInteger { min: 1, max: 5 });

        let err =
            validate_payload(&json!({ "statement": "ok", "priority": u64::MAX })).unwrap_err();
        assert_eq!(err.detail, ValidationDetail::OutOfRange { min: 1, max: 5 });

        let validated =
            validate_payload(&json!({ "statement": "ok", "priority": 4.0 })).expect("valid");
        assert_eq!(validated.priority(), Some(4));
    }

    #[test]
    fn first_failure_wins() {
        let err = validate_payload(&json!({ "statement": "  ", "context": 7, "priority": 9 }))
            .unwrap_err();
        assert_eq!(err.field, "statement");

        let err = validate_payload(&json!({ "statement": "ok", "context": 7, "priority": 9 }))
            .unwrap_err();
        assert_eq!(err.field, "context");
    }

    #[test]
    fn validation_is_idempotent() {
        let payload = json!({ "statement": "x".repeat(600), "priority": 0 });
        assert_eq!(validate_payload(&payload), validate_payload(&payload));

        let request = CreationRequest::new("Stay motivated").with_priority(2);
        assert_eq!(validate_request(&request), validate_request(&request));
    }
}
