//! Embedding generator contract.

use crate::error::EmbeddingError;
use async_trait::async_trait;

#[async_trait]
/// Converts text into a fixed-length vector.
pub trait EmbeddingGenerator: Send + Sync {
    /// Dimensionality every successful `embed` call is expected to return.
    fn dimensions(&self) -> usize;

    /// Embed a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;
}
