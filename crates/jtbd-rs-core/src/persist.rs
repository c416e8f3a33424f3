//! Final write of a prepared record.

use crate::augment::PreparedRecord;
use crate::error::CreateJobError;
use crate::types::CreationResult;
use jtbd_rs_store::{JobStore, NewJobStatement, OwnerId};

/// Write the record. The embedding column always receives a vector: the
/// generated one, or an empty one when none was produced.
pub async fn persist(
    store: &dyn JobStore,
    owner: OwnerId,
    record: PreparedRecord,
) -> Result<CreationResult, CreateJobError> {
    let (request, embedding) = record.into_parts();
    let embedding_generated = embedding.is_completed();
    let validated = request.request();

    let stored = store
        .insert(NewJobStatement {
            owner_id: owner,
            statement: validated.statement().to_string(),
            context: validated.context().map(str::to_string),
            priority: validated.priority(),
            embedding: embedding.completed().unwrap_or_default(),
        })
        .await
        .map_err(|err| CreateJobError::Persistence {
            reason: err.reason(),
            message: err.to_string(),
        })?;

    Ok(CreationResult {
        id: stored.id,
        statement: stored.statement,
        context: stored.context,
        priority: stored.priority,
        embedding_generated,
        created_at: stored.created_at,
    })
}
