//! Creation pipeline for Jobs-to-be-Done statements.
//!
//! A request flows validate -> duplicate check -> embedding -> persist. The
//! duplicate check and embedding stages degrade instead of failing; the
//! validator and persister are fatal. `CreationPipeline` is the entry point.

pub mod augment;
pub mod duplicates;
pub mod error;
pub mod persist;
pub mod pipeline;
pub mod types;
pub mod validate;

pub use error::{CreateJobError, ReasonCode, ValidationDetail, ValidationError};
pub use pipeline::CreationPipeline;
pub use types::{CreateOptions, CreationRequest, CreationResult, PipelineStage, StageOutcome};
pub use validate::{ValidatedRequest, validate_payload, validate_request};

/// Re-exported so callers can name owners without depending on the store crate.
pub use jtbd_rs_store::OwnerId;
