//! Text embedding generation for job statements.

pub mod error;
pub mod generator;
pub mod openai;

/// Embedding error type.
pub use error::EmbeddingError;
/// Generator contract.
pub use generator::EmbeddingGenerator;
/// OpenAI-compatible HTTP generator.
pub use openai::{OpenAiEmbeddingConfig, OpenAiEmbeddingGenerator};
