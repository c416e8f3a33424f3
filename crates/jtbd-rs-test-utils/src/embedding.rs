use async_trait::async_trait;
use jtbd_rs_embedding::{EmbeddingError, EmbeddingGenerator};
use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct FixedEmbedder {
    embedding: Vec<f32>,
    dimensions: usize,
    inputs: Arc<Mutex<Vec<String>>>,
}

impl FixedEmbedder {
    /// Embedder returning `embedding` and declaring its length as dimensionality.
    pub fn new(embedding: Vec<f32>) -> Self {
        let dimensions = embedding.len();
        Self {
            embedding,
            dimensions,
            inputs: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Declare a dimensionality that differs from the returned vector.
    pub fn with_dimensions(mut self, dimensions: usize) -> Self {
        self.dimensions = dimensions;
        self
    }

    /// Texts passed to `embed`, in call order.
    pub fn inputs(&self) -> Vec<String> {
        self.inputs.lock().clone()
    }
}

#[async_trait]
impl EmbeddingGenerator for FixedEmbedder {
    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        self.inputs.lock().push(text.to_string());
        Ok(self.embedding.clone())
    }
}

#[derive(Debug, Clone)]
pub struct FailingEmbedder {
    message: String,
    dimensions: usize,
}

impl FailingEmbedder {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            dimensions: 3,
        }
    }
}

#[async_trait]
impl EmbeddingGenerator for FailingEmbedder {
    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbeddingError> {
        Err(EmbeddingError::Provider(self.message.clone()))
    }
}
