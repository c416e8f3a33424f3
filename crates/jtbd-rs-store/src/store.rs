//! Store contract consumed by the creation pipeline.

use crate::error::StoreError;
use crate::model::{JobStatement, NewJobStatement, OwnerId, statement_key};
use async_trait::async_trait;

/// Predicate applied by `JobStore::find_one` within one owner's records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordFilter {
    /// Non-deleted record whose statement equals this text ignoring case.
    StatementEqualsIgnoreCase(String),
}

impl RecordFilter {
    /// In-process evaluation, for stores that cannot push the filter down.
    pub fn matches(&self, record: &JobStatement) -> bool {
        match self {
            RecordFilter::StatementEqualsIgnoreCase(statement) => {
                !record.is_deleted() && statement_key(&record.statement) == statement_key(statement)
            }
        }
    }
}

#[async_trait]
/// Persistence abstraction used by the creation pipeline.
pub trait JobStore: Send + Sync {
    /// Persist a new record, assigning its id and creation timestamp.
    async fn insert(&self, record: NewJobStatement) -> Result<JobStatement, StoreError>;

    /// Find one record owned by `owner` matching `filter`.
    ///
    /// `Ok(None)` means nothing matched; `Err` means the query itself failed.
    async fn find_one(
        &self,
        owner: OwnerId,
        filter: &RecordFilter,
    ) -> Result<Option<JobStatement>, StoreError>;
}
