//! Error types for store operations.

/// Errors returned by job statement stores.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// IO error while preparing the database location.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// SQLite error.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// A storage-level constraint rejected the write.
    #[error("constraint violation: {0}")]
    Conflict(String),
    /// A stored row could not be decoded.
    #[error("corrupt record: {0}")]
    Corrupt(String),
    /// The store could not be reached.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Machine-readable reason surfaced to callers of the creation pipeline.
    pub fn reason(&self) -> &'static str {
        match self {
            StoreError::Io(_) => "STORAGE_IO",
            StoreError::Sqlite(_) => "DATABASE_ERROR",
            StoreError::Conflict(_) => "UNIQUE_VIOLATION",
            StoreError::Corrupt(_) => "CORRUPT_RECORD",
            StoreError::Unavailable(_) => "STORE_UNAVAILABLE",
        }
    }
}
