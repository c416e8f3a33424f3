//! Best-effort embedding of the statement text.
//!
//! Nothing in here returns an error: collaborator failures, timeouts and
//! unusable vectors all become `StageOutcome::Degraded`.

use crate::duplicates::UniqueRequest;
use crate::types::{CreateOptions, StageOutcome};
use jtbd_rs_embedding::EmbeddingGenerator;
use jtbd_rs_logging::StructuredLogger;
use jtbd_rs_store::OwnerId;
use serde_json::json;

/// A request ready to be written, with whatever embedding could be produced.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedRecord {
    request: UniqueRequest,
    embedding: StageOutcome<Vec<f32>>,
}

impl PreparedRecord {
    pub fn request(&self) -> &UniqueRequest {
        &self.request
    }

    pub fn embedding(&self) -> &StageOutcome<Vec<f32>> {
        &self.embedding
    }

    pub fn embedding_generated(&self) -> bool {
        self.embedding.is_completed()
    }

    pub(crate) fn into_parts(self) -> (UniqueRequest, StageOutcome<Vec<f32>>) {
        (self.request, self.embedding)
    }
}

/// Text sent to the generator: the statement, then the context if any.
pub fn embedding_text(statement: &str, context: Option<&str>) -> String {
    match context {
        Some(context) => format!("{statement} {context}"),
        None => statement.to_string(),
    }
}

/// Attach an embedding to `request` when enabled and a generator is present.
pub async fn augment(
    embedder: Option<&dyn EmbeddingGenerator>,
    logger: &StructuredLogger,
    owner: OwnerId,
    request: UniqueRequest,
    options: CreateOptions,
) -> PreparedRecord {
    let embedding = match embedder {
        Some(embedder) if options.generate_embedding => {
            let validated = request.request();
            let text = embedding_text(validated.statement(), validated.context());
            generate(embedder, logger, owner, &text).await
        }
        _ => StageOutcome::Skipped,
    };
    PreparedRecord { request, embedding }
}

async fn generate(
    embedder: &dyn EmbeddingGenerator,
    logger: &StructuredLogger,
    owner: OwnerId,
    text: &str,
) -> StageOutcome<Vec<f32>> {
    let expected = embedder.dimensions();
    let failure = match embedder.embed(text).await {
        Ok(vector) if vector.is_empty() => "generator returned an empty vector".to_string(),
        Ok(vector) if vector.len() != expected => format!(
            "generator returned {} dimensions, expected {expected}",
            vector.len()
        ),
        Ok(vector) if vector.iter().any(|value| !value.is_finite()) => {
            "generator returned non-finite values".to_string()
        }
        Ok(vector) => return StageOutcome::Completed(vector),
        Err(err) => err.to_string(),
    };
    logger.warn(
        "embedding generation failed; continuing without embedding",
        json!({
            "ownerId": owner,
            "textLength": text.chars().count(),
            "error": failure,
        }),
    );
    StageOutcome::Degraded(failure)
}
