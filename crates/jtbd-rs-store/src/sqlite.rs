//! SQLite-backed job statement store.

use crate::error::StoreError;
use crate::model::{JobStatement, NewJobStatement, OwnerId, statement_key};
use crate::store::{JobStore, RecordFilter};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, info};
use parking_lot::Mutex;
use rusqlite::{Connection, OptionalExtension, Row, params};
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS job_statements (
    id TEXT PRIMARY KEY,
    owner_id TEXT NOT NULL,
    statement TEXT NOT NULL,
    statement_key TEXT NOT NULL,
    context TEXT,
    priority INTEGER,
    embedding BLOB NOT NULL,
    created_at TEXT NOT NULL,
    deleted_at TEXT
);
CREATE INDEX IF NOT EXISTS idx_job_statements_owner_key
    ON job_statements (owner_id, statement_key);
";

/// Partial unique index backing the pipeline's duplicate check.
const UNIQUE_STATEMENT_INDEX: &str = "
CREATE UNIQUE INDEX IF NOT EXISTS uq_job_statements_owner_key
    ON job_statements (owner_id, statement_key)
    WHERE deleted_at IS NULL;
";

const SELECT_COLUMNS: &str =
    "id, owner_id, statement, context, priority, embedding, created_at, deleted_at";

/// Options applied when opening a SQLite store.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteStoreOptions {
    /// Create the case-insensitive unique index on (owner, statement).
    pub enforce_unique_statements: bool,
}

/// Job statement store backed by a single SQLite connection.
///
/// `JobStore` calls run on tokio's blocking pool. The inherent helpers
/// (`get`, `count_for_owner`, `archive`) block the calling thread.
#[derive(Debug)]
pub struct SqliteJobStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteJobStore {
    /// Open (or create) a database file, creating parent directories.
    pub fn open(path: impl AsRef<Path>, options: SqliteStoreOptions) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode = WAL; PRAGMA busy_timeout = 5000;")?;
        let store = Self::init(conn, options)?;
        info!(
            "initialized sqlite job store (path={}, unique_statements={})",
            path.display(),
            options.enforce_unique_statements
        );
        Ok(store)
    }

    /// Open a private in-memory database.
    pub fn open_in_memory(options: SqliteStoreOptions) -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?, options)
    }

    fn init(conn: Connection, options: SqliteStoreOptions) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA)?;
        if options.enforce_unique_statements {
            conn.execute_batch(UNIQUE_STATEMENT_INDEX)?;
        }
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run `work` against the connection on the blocking pool.
    async fn with_conn<T, F>(&self, work: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, StoreError> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || work(&conn.lock()))
            .await
            .map_err(|err| StoreError::Unavailable(format!("store task failed: {err}")))?
    }

    /// Fetch a record by id within an owner's partition, archived or not.
    pub fn get(&self, owner: OwnerId, id: Uuid) -> Result<Option<JobStatement>, StoreError> {
        let conn = self.conn.lock();
        let sql = format!("SELECT {SELECT_COLUMNS} FROM job_statements WHERE owner_id = ?1 AND id = ?2");
        let raw = conn
            .query_row(&sql, params![owner.to_string(), id.to_string()], RawRow::from_row)
            .optional()?;
        raw.map(RawRow::into_record).transpose()
    }

    /// Number of non-archived records for an owner.
    pub fn count_for_owner(&self, owner: OwnerId) -> Result<usize, StoreError> {
        let conn = self.conn.lock();
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM job_statements WHERE owner_id = ?1 AND deleted_at IS NULL",
            params![owner.to_string()],
            |row| row.get(0),
        )?;
        Ok(usize::try_from(count).unwrap_or_default())
    }

    /// Archive a record so it no longer participates in uniqueness checks.
    ///
    /// Returns false when no live record with that id exists for the owner.
    pub fn archive(&self, owner: OwnerId, id: Uuid) -> Result<bool, StoreError> {
        let conn = self.conn.lock();
        let changed = conn.execute(
            "UPDATE job_statements SET deleted_at = ?1
             WHERE owner_id = ?2 AND id = ?3 AND deleted_at IS NULL",
            params![Utc::now(), owner.to_string(), id.to_string()],
        )?;
        debug!("archive job statement (owner={owner}, id={id}, changed={changed})");
        Ok(changed > 0)
    }
}

#[async_trait]
impl JobStore for SqliteJobStore {
    async fn insert(&self, record: NewJobStatement) -> Result<JobStatement, StoreError> {
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
        let row = stored.clone();
        self.with_conn(move |conn| {
            conn.execute(
                "INSERT INTO job_statements
                    (id, owner_id, statement, statement_key, context, priority, embedding, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    row.id.to_string(),
                    row.owner_id.to_string(),
                    row.statement,
                    statement_key(&row.statement),
                    row.context,
                    row.priority,
                    encode_embedding(&row.embedding),
                    row.created_at,
                ],
            )
            .map_err(map_write_error)?;
            Ok(())
        })
        .await?;
        debug!(
            "stored job statement (owner={}, id={}, embedding_len={})",
            stored.owner_id,
            stored.id,
            stored.embedding.len()
        );
        Ok(stored)
    }

    async fn find_one(
        &self,
        owner: OwnerId,
        filter: &RecordFilter,
    ) -> Result<Option<JobStatement>, StoreError> {
        let filter = filter.clone();
        let raw = self
            .with_conn(move |conn| {
                let raw = match &filter {
                    RecordFilter::StatementEqualsIgnoreCase(statement) => {
                        let sql = format!(
                            "SELECT {SELECT_COLUMNS} FROM job_statements
                             WHERE owner_id = ?1 AND statement_key = ?2 AND deleted_at IS NULL
                             ORDER BY created_at ASC LIMIT 1"
                        );
                        conn.query_row(
                            &sql,
                            params![owner.to_string(), statement_key(statement)],
                            RawRow::from_row,
                        )
                        .optional()?
                    }
                };
                Ok(raw)
            })
            .await?;
        raw.map(RawRow::into_record).transpose()
    }
}

/// Column values as read from SQLite, before domain decoding.
struct RawRow {
    id: String,
    owner_id: String,
    statement: String,
    context: Option<String>,
    priority: Option<i64>,
    embedding: Vec<u8>,
    created_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

impl RawRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            owner_id: row.get(1)?,
            statement: row.get(2)?,
            context: row.get(3)?,
            priority: row.get(4)?,
            embedding: row.get(5)?,
            created_at: row.get(6)?,
            deleted_at: row.get(7)?,
        })
    }

    fn into_record(self) -> Result<JobStatement, StoreError> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|err| StoreError::Corrupt(format!("id {}: {err}", self.id)))?;
        let owner_id = self
            .owner_id
            .parse::<OwnerId>()
            .map_err(|err| StoreError::Corrupt(format!("owner_id {}: {err}", self.owner_id)))?;
        let priority = self
            .priority
            .map(u8::try_from)
            .transpose()
            .map_err(|_| StoreError::Corrupt(format!("priority out of range for {id}")))?;
        Ok(JobStatement {
            id,
            owner_id,
            statement: self.statement,
            context: self.context,
            priority,
            embedding: decode_embedding(&self.embedding)?,
            created_at: self.created_at,
            deleted_at: self.deleted_at,
        })
    }
}

/// Little-endian f32 bytes; an empty vector encodes to an empty blob.
fn encode_embedding(embedding: &[f32]) -> Vec<u8> {
    embedding
        .iter()
        .flat_map(|value| value.to_le_bytes())
        .collect()
}

fn decode_embedding(bytes: &[u8]) -> Result<Vec<f32>, StoreError> {
    let chunks = bytes.chunks_exact(4);
    if !chunks.remainder().is_empty() {
        return Err(StoreError::Corrupt(format!(
            "embedding blob length {} is not a multiple of 4",
            bytes.len()
        )));
    }
    Ok(chunks
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect())
}

/// Unique-index violations become `Conflict`; every other failure,
/// including primary key and NOT NULL violations, stays a database error.
fn map_write_error(err: rusqlite::Error) -> StoreError {
    match &err {
        rusqlite::Error::SqliteFailure(inner, message)
            if inner.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
        {
            StoreError::Conflict(message.clone().unwrap_or_else(|| inner.to_string()))
        }
        _ => StoreError::Sqlite(err),
    }
}

#[cfg(test)]
mod tests {
    use super::{
        SqliteJobStore, SqliteStoreOptions, decode_embedding, encode_embedding, map_write_error,
    };
    use crate::{JobStore, NewJobStatement, OwnerId, RecordFilter, StoreError};
    use pretty_assertions::assert_eq;
    use rusqlite::params;
    use tempfile::tempdir;
    use uuid::Uuid;

    fn new_record(owner_id: OwnerId, statement: &str) -> NewJobStatement {
        NewJobStatement {
            owner_id,
            statement: statement.to_string(),
            context: None,
            priority: None,
            embedding: Vec::new(),
        }
    }

    fn filter(statement: &str) -> RecordFilter {
        RecordFilter::StatementEqualsIgnoreCase(statement.to_string())
    }

    #[test]
    fn embedding_bytes_survive_encoding() {
        let vector = vec![0.25_f32, -1.5, 3.0];
        assert_eq!(decode_embedding(&encode_embedding(&vector)).expect("decode"), vector);
        assert!(encode_embedding(&[]).is_empty());
        assert!(matches!(
            decode_embedding(&[0, 1, 2]),
            Err(StoreError::Corrupt(_))
        ));
    }

    #[tokio::test]
    async fn insert_then_find_ignores_case_and_owner() {
        let store = SqliteJobStore::open_in_memory(SqliteStoreOptions::default()).expect("store");
        let owner = OwnerId::new(Uuid::new_v4());
        let other = OwnerId::new(Uuid::new_v4());

        let stored = store
            .insert(NewJobStatement {
                context: Some("mornings".to_string()),
                priority: Some(2),
                embedding: vec![0.5, 0.25],
                ..new_record(owner, "Stay motivated")
            })
            .await
            .expect("insert");

        let found = store
            .find_one(owner, &filter("STAY MOTIVATED"))
            .await
            .expect("find")
            .expect("match");
        assert_eq!(found, stored);

        let missing = store
            .find_one(other, &filter("stay motivated"))
            .await
            .expect("find");
        assert_eq!(missing, None);
    }

    #[tokio::test]
    async fn empty_embedding_is_stored_as_empty_vector() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("nested").join("jobs.sqlite3");
        let store = SqliteJobStore::open(&path, SqliteStoreOptions::default()).expect("store");
        let owner = OwnerId::new(Uuid::new_v4());

        let stored = store
            .insert(new_record(owner, "Ship weekly"))
            .await
            .expect("insert");

        let fetched = store.get(owner, stored.id).expect("get").expect("row");
        assert_eq!(fetched.embedding, Vec::<f32>::new());
        assert!(path.exists());
    }

    #[tokio::test]
    async fn unique_index_rejects_case_insensitive_duplicates() {
        let store = SqliteJobStore::open_in_memory(SqliteStoreOptions {
            enforce_unique_statements: true,
        })
        .expect("store");
        let owner = OwnerId::new(Uuid::new_v4());

        store
            .insert(new_record(owner, "Stay motivated"))
            .await
            .expect("first insert");
        let err = store
            .insert(new_record(owner, "stay MOTIVATED"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
        assert_eq!(err.reason(), "UNIQUE_VIOLATION");

        let other = OwnerId::new(Uuid::new_v4());
        store
            .insert(new_record(other, "Stay motivated"))
            .await
            .expect("other owner");
    }

    #[tokio::test]
    async fn archived_records_leave_uniqueness_scope() {
        let store = SqliteJobStore::open_in_memory(SqliteStoreOptions {
            enforce_unique_statements: true,
        })
        .expect("store");
        let owner = OwnerId::new(Uuid::new_v4());

        let first = store
            .insert(new_record(owner, "Stay motivated"))
            .await
            .expect("insert");
        assert!(store.archive(owner, first.id).expect("archive"));
        assert!(!store.archive(owner, first.id).expect("second archive"));

        let found = store
            .find_one(owner, &filter("stay motivated"))
            .await
            .expect("find");
        assert_eq!(found, None);
        assert_eq!(store.count_for_owner(owner).expect("count"), 0);

        store
            .insert(new_record(owner, "Stay motivated"))
            .await
            .expect("re-insert after archive");
        let archived = store.get(owner, first.id).expect("get").expect("row");
        assert!(archived.is_deleted());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn concurrent_writes_share_one_connection() {
        let store = std::sync::Arc::new(
            SqliteJobStore::open_in_memory(SqliteStoreOptions::default()).expect("store"),
        );
        let owner = OwnerId::new(Uuid::new_v4());

        let tasks: Vec<_> = (0..8)
            .map(|n| {
                let store = store.clone();
                tokio::spawn(async move {
                    store
                        .insert(new_record(owner, &format!("Water plant {n}")))
                        .await
                })
            })
            .collect();
        for task in tasks {
            task.await.expect("join").expect("insert");
        }

        assert_eq!(store.count_for_owner(owner).expect("count"), 8);
        let found = store
            .find_one(owner, &filter("water plant 3"))
            .await
            .expect("find");
        assert_eq!(found.map(|record| record.statement), Some("Water plant 3".to_string()));
    }

    #[test]
    fn only_unique_index_violations_are_conflicts() {
        let store = SqliteJobStore::open_in_memory(SqliteStoreOptions {
            enforce_unique_statements: true,
        })
        .expect("store");
        let conn = store.conn.lock();
        let insert = |id: &str, key: &str| {
            conn.execute(
                "INSERT INTO job_statements
                    (id, owner_id, statement, statement_key, embedding, created_at)
                 VALUES (?1, 'owner', 'Walk the dog', ?2, x'', '2026-01-01 00:00:00+00:00')",
                params![id, key],
            )
        };

        insert("a", "walk the dog").expect("first row");

        let duplicate_id = map_write_error(insert("a", "other key").unwrap_err());
        assert!(matches!(duplicate_id, StoreError::Sqlite(_)));
        assert_eq!(duplicate_id.reason(), "DATABASE_ERROR");

        let duplicate_key = map_write_error(insert("b", "walk the dog").unwrap_err());
        assert!(matches!(duplicate_key, StoreError::Conflict(_)));
        assert_eq!(duplicate_key.reason(), "UNIQUE_VIOLATION");
    }
}
