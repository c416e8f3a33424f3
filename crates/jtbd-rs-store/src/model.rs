//! Job statement record model used by stores.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Identity that owns a record and scopes every read and write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(Uuid);

impl OwnerId {
    pub fn new(id: Uuid) -> Self {
        Self(id)
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl From<Uuid> for OwnerId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl FromStr for OwnerId {
    type Err = uuid::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(value).map(Self)
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Persisted job statement.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct JobStatement {
    /// Store-assigned identifier.
    pub id: Uuid,
    pub owner_id: OwnerId,
    pub statement: String,
    pub context: Option<String>,
    pub priority: Option<u8>,
    /// Empty when no embedding was generated; never absent.
    pub embedding: Vec<f32>,
    pub created_at: DateTime<Utc>,
    /// Set when the record has been archived; archived records do not count
    /// towards statement uniqueness.
    pub deleted_at: Option<DateTime<Utc>>,
}

impl JobStatement {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// Record payload handed to `JobStore::insert`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewJobStatement {
    pub owner_id: OwnerId,
    pub statement: String,
    pub context: Option<String>,
    pub priority: Option<u8>,
    pub embedding: Vec<f32>,
}

/// Comparison key for case-insensitive statement matching.
pub fn statement_key(statement: &str) -> String {
    statement.to_lowercase()
}
