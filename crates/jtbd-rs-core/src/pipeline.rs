use crate::augment::augment;
use crate::duplicates::check_duplicates;
use crate::error::CreateJobError;
use crate::persist::persist;
use crate::types::{CreateOptions, CreationRequest, CreationResult, PipelineStage};
use crate::validate::{ValidatedRequest, validate_payload, validate_request};
use jtbd_rs_embedding::EmbeddingGenerator;
use jtbd_rs_logging::{StructuredLogger, TrackingId};
use jtbd_rs_store::{JobStore, OwnerId};
use serde_json::json;
use std::sync::Arc;

const OPERATION: &str = "create_job_statement";

/// Runs creation requests through validation, duplicate detection,
/// embedding and persistence.
///
/// Cheap to clone; clones share the store, generator and logger.
#[derive(Clone)]
pub struct CreationPipeline {
    store: Arc<dyn JobStore>,
    embedder: Option<Arc<dyn EmbeddingGenerator>>,
    logger: Arc<StructuredLogger>,
}

impl std::fmt::Debug for CreationPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreationPipeline")
            .field("embedder", &self.embedder.is_some())
            .field("logger", &self.logger)
            .finish_non_exhaustive()
    }
}

impl CreationPipeline {
    /// Pipeline without an embedding generator; every record is stored
    /// with an empty embedding.
    pub fn new(store: Arc<dyn JobStore>, logger: Arc<StructuredLogger>) -> Self {
        Self {
            store,
            embedder: None,
            logger,
        }
    }

    pub fn with_embedder(mut self, embedder: Arc<dyn EmbeddingGenerator>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    pub fn logger(&self) -> &StructuredLogger {
        &self.logger
    }

    /// Create a job statement for `owner` from a typed request.
    pub async fn create(
        &self,
        owner: OwnerId,
        request: &CreationRequest,
        options: CreateOptions,
    ) -> Result<CreationResult, CreateJobError> {
        let mut tracked = TrackedCreate::start(&self.logger, owner);
        let result = match validate_request(request) {
            Ok(validated) => self.run_validated(&mut tracked, validated, options).await,
            Err(err) => Err(err.into()),
        };
        tracked.finish(&result);
        result
    }

    /// Create a job statement from an untyped JSON body.
    pub async fn create_from_json(
        &self,
        owner: OwnerId,
        payload: &serde_json::Value,
        options: CreateOptions,
    ) -> Result<CreationResult, CreateJobError> {
        let mut tracked = TrackedCreate::start(&self.logger, owner);
        let result = match validate_payload(payload) {
            Ok(validated) => self.run_validated(&mut tracked, validated, options).await,
            Err(err) => Err(err.into()),
        };
        tracked.finish(&result);
        result
    }

    async fn run_validated(
        &self,
        tracked: &mut TrackedCreate<'_>,
        validated: ValidatedRequest,
        options: CreateOptions,
    ) -> Result<CreationResult, CreateJobError> {
        let owner = tracked.owner;
        tracked.advance();
        let unique = check_duplicates(self.store.as_ref(), &self.logger, owner, validated).await?;

        tracked.advance();
        let prepared = augment(
            self.embedder.as_deref(),
            &self.logger,
            owner,
            unique,
            options,
        )
        .await;

        tracked.advance();
        persist(self.store.as_ref(), owner, prepared).await
    }
}

/// One in-progress `create` call: its tracking entry and current stage.
///
/// Dropping it before `finish` (the caller dropped the future) ends the
/// tracked operation as a failure at the stage it was in.
struct TrackedCreate<'a> {
    logger: &'a StructuredLogger,
    owner: OwnerId,
    stage: PipelineStage,
    tracking: Option<TrackingId>,
}

impl<'a> TrackedCreate<'a> {
    fn start(logger: &'a StructuredLogger, owner: OwnerId) -> Self {
        let tracked = Self {
            logger,
            owner,
            stage: PipelineStage::Validating,
            tracking: Some(logger.start(OPERATION, json!({ "ownerId": owner }))),
        };
        tracked.log_stage();
        tracked
    }

    fn advance(&mut self) {
        self.stage = self.stage.next();
        self.log_stage();
    }

    fn log_stage(&self) {
        self.logger.debug(
            "pipeline stage",
            json!({ "ownerId": self.owner, "stage": self.stage.as_str() }),
        );
    }

    fn finish(mut self, result: &Result<CreationResult, CreateJobError>) {
        let Some(tracking) = self.tracking.take() else {
            return;
        };
        let owner = self.owner;
        match result {
            Ok(created) => {
                self.advance();
                self.logger.info(
                    "job statement created",
                    json!({
                        "ownerId": owner,
                        "id": created.id,
                        "embeddingGenerated": created.embedding_generated,
                    }),
                );
                self.logger.end(tracking, true, json!({ "id": created.id }));
            }
            Err(err) => {
                match err {
                    CreateJobError::Persistence { reason, message } => self.logger.error(
                        "job statement could not be persisted",
                        json!({ "ownerId": owner, "reason": reason, "error": message }),
                    ),
                    CreateJobError::Validation(_) | CreateJobError::DuplicateEntry { .. } => {
                        self.logger.info(
                            "job statement rejected",
                            json!({ "ownerId": owner, "code": err.code(), "error": err.to_string() }),
                        )
                    }
                }
                self.logger.end(tracking, false, json!({ "code": err.code() }));
            }
        }
    }
}

impl Drop for TrackedCreate<'_> {
    fn drop(&mut self) {
        if let Some(tracking) = self.tracking.take() {
            let stage = self.stage.as_str();
            self.logger.warn(
                "job statement creation cancelled",
                json!({ "ownerId": self.owner, "stage": stage }),
            );
            self.logger.end(
                tracking,
                false,
                json!({ "cancelled": true, "stage": stage }),
            );
        }
    }
}
