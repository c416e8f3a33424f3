use async_trait::async_trait;
use chrono::Utc;
use jtbd_rs_store::{JobStatement, JobStore, NewJobStatement, OwnerId, RecordFilter, StoreError};
use parking_lot::Mutex;
use std::sync::Arc;
use uuid::Uuid;

/// Vec-backed store with optional injected failures. Clones share state.
#[derive(Clone, Default)]
pub struct InMemoryJobStore {
    records: Arc<Mutex<Vec<JobStatement>>>,
    find_error: Option<String>,
    insert_error: Option<String>,
    find_calls: Arc<Mutex<usize>>,
    insert_calls: Arc<Mutex<usize>>,
}

impl InMemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<JobStatement>) -> Self {
        Self {
            records: Arc::new(Mutex::new(records)),
            ..Self::default()
        }
    }

    /// Make every `find_one` fail with `StoreError::Unavailable`.
    pub fn failing_find(mut self, message: impl Into<String>) -> Self {
        self.find_error = Some(message.into());
        self
    }

    /// Make every `insert` fail with `StoreError::Unavailable`.
    pub fn failing_insert(mut self, message: impl Into<String>) -> Self {
        self.insert_error = Some(message.into());
        self
    }

    pub fn records(&self) -> Vec<JobStatement> {
        self.records.lock().clone()
    }

    pub fn find_calls(&self) -> usize {
        *self.find_calls.lock()
    }

    pub fn insert_calls(&self) -> usize {
        *self.insert_calls.lock()
    }

    /// Build a stored record directly, bypassing `insert`.
    pub fn record(owner_id: OwnerId, statement: &str) -> JobStatement {
        JobStatement {
            id: Uuid::new_v4(),
            owner_id,
            statement: statement.to_string(),
            context: None,
            priority: None,
            embedding: Vec::new(),
            created_at: Utc::now(),
            deleted_at: None,
        }
    }
}

#[async_trait]
impl JobStore for InMemoryJobStore {
    async fn insert(&self, record: NewJobStatement) -> Result<JobStatement, StoreError> {
        *self.insert_calls.lock() += 1;
        if let Some(message) = &self.insert_error {
            return Err(StoreError::Unavailable(message.clone()));
        }
        let stored = JobStatement {
            id: Uuid::new_v4(),
            owner_id: record.owner_id,
            statement: record.statement,
            context: record.context,
            priority: record.priority,
            embedding: record.embedding,
            created_at: Utc::now(),
            deleted_at: None,
        };
        self.records.lock().push(stored.clone());
        Ok(stored)
    }

    async fn find_one(
        &self,
        owner: OwnerId,
        filter: &RecordFilter,
    ) -> Result<Option<JobStatement>, StoreError> {
        *self.find_calls.lock() += 1;
        if let Some(message) = &self.find_error {
            return Err(StoreError::Unavailable(message.clone()));
        }
        Ok(self
            .records
            .lock()
            .iter()
            .find(|record| record.owner_id == owner && filter.matches(record))
            .cloned())
    }
}
