//! Owner-scoped, case-insensitive duplicate detection.
//!
//! A confirmed duplicate is fatal. A failed lookup is logged and the request
//! moves on with `StageOutcome::Degraded`, so for that call uniqueness rests
//! on the store's own constraint, if it has one.

use crate::error::CreateJobError;
use crate::types::StageOutcome;
use crate::validate::ValidatedRequest;
use jtbd_rs_logging::StructuredLogger;
use jtbd_rs_store::{JobStore, OwnerId, RecordFilter};
use serde_json::json;

/// A validated request that passed (or could not run) the duplicate check.
#[derive(Debug, Clone, PartialEq)]
pub struct UniqueRequest {
    request: ValidatedRequest,
    check: StageOutcome<()>,
}

impl UniqueRequest {
    pub fn request(&self) -> &ValidatedRequest {
        &self.request
    }

    pub fn check(&self) -> &StageOutcome<()> {
        &self.check
    }
}

/// Look for a live record of `owner` with the same statement, ignoring case.
pub async fn check_duplicates(
    store: &dyn JobStore,
    logger: &StructuredLogger,
    owner: OwnerId,
    request: ValidatedRequest,
) -> Result<UniqueRequest, CreateJobError> {
    let filter = RecordFilter::StatementEqualsIgnoreCase(request.statement().to_string());
    match store.find_one(owner, &filter).await {
        Ok(Some(existing)) => {
            logger.info(
                "duplicate job statement rejected",
                json!({ "ownerId": owner, "existingId": existing.id }),
            );
            Err(CreateJobError::DuplicateEntry {
                existing_id: existing.id,
            })
        }
        Ok(None) => Ok(UniqueRequest {
            request,
            check: StageOutcome::Completed(()),
        }),
        Err(err) => {
            logger.warn(
                "duplicate check failed; continuing without uniqueness guarantee",
                json!({
                    "ownerId": owner,
                    "reason": err.reason(),
                    "error": err.to_string(),
                }),
            );
            Ok(UniqueRequest {
                request,
                check: StageOutcome::Degraded(err.to_string()),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::check_duplicates;
    use crate::error::CreateJobError;
    use crate::types::{CreationRequest, StageOutcome};
    use crate::validate::validate_request;
    use jtbd_rs_logging::{Level, LoggerSettings, StructuredLogger};
    use jtbd_rs_store::OwnerId;
    use jtbd_rs_test_utils::{InMemoryJobStore, RecordingSink};
    use std::sync::Arc;
    use uuid::Uuid;

    fn logger() -> (StructuredLogger, Arc<RecordingSink>) {
        let sink = Arc::new(RecordingSink::new());
        (
            StructuredLogger::with_sink(LoggerSettings::default(), sink.clone()),
            sink,
        )
    }

    #[tokio::test]
    async fn existing_statement_in_other_case_is_duplicate() {
        let owner = OwnerId::new(Uuid::new_v4());
        let existing = InMemoryJobStore::record(owner, "Stay motivated");
        let store = InMemoryJobStore::with_records(vec![existing.clone()]);
        let (logger, _) = logger();
        let request = validate_request(&CreationRequest::new("stay MOTIVATED")).expect("valid");

        let err = check_duplicates(&store, &logger, owner, request)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            CreateJobError::DuplicateEntry { existing_id } if existing_id == existing.id
        ));
    }

    #[tokio::test]
    async fn archived_record_is_not_a_duplicate() {
        let owner = OwnerId::new(Uuid::new_v4());
        let mut archived = InMemoryJobStore::record(owner, "Stay motivated");
        archived.deleted_at = Some(chrono::Utc::now());
        let store = InMemoryJobStore::with_records(vec![archived]);
        let (logger, _) = logger();
        let request = validate_request(&CreationRequest::new("Stay motivated")).expect("valid");

        let unique = check_duplicates(&store, &logger, owner, request)
            .await
            .expect("not a duplicate");

        assert_eq!(unique.check(), &StageOutcome::Completed(()));
    }

    #[tokio::test]
    async fn lookup_failure_degrades_and_warns() {
        let owner = OwnerId::new(Uuid::new_v4());
        let store = InMemoryJobStore::new().failing_find("connection reset");
        let (logger, sink) = logger();
        let request = validate_request(&CreationRequest::new("Stay motivated")).expect("valid");

        let unique = check_duplicates(&store, &logger, owner, request)
            .await
            .expect("soft failure");

        assert!(unique.check().is_degraded());
        assert!(sink.contains(Level::Warn, "connection reset"));
    }
}
