//! OpenAI-compatible `/embeddings` client.

use crate::error::EmbeddingError;
use crate::generator::EmbeddingGenerator;
use async_trait::async_trait;
use log::debug;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Connection settings for `OpenAiEmbeddingGenerator`.
#[derive(Debug, Clone)]
pub struct OpenAiEmbeddingConfig {
    /// Full URL of the embeddings endpoint.
    pub endpoint: String,
    pub model: String,
    pub dimensions: usize,
    /// Bearer token; omitted from the request when `None`.
    pub api_key: Option<String>,
    pub timeout: Duration,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

/// Embedding generator calling an OpenAI-compatible HTTP API.
#[derive(Debug, Clone)]
pub struct OpenAiEmbeddingGenerator {
    client: reqwest::Client,
    config: OpenAiEmbeddingConfig,
}

impl OpenAiEmbeddingGenerator {
    pub fn new(config: OpenAiEmbeddingConfig) -> Result<Self, EmbeddingError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|err| EmbeddingError::Setup(err.to_string()))?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl EmbeddingGenerator for OpenAiEmbeddingGenerator {
    fn dimensions(&self) -> usize {
        self.config.dimensions
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let mut request = self
            .client
            .post(&self.config.endpoint)
            .json(&EmbeddingRequest {
                model: &self.config.model,
                input: text,
            });
        if let Some(api_key) = &self.config.api_key {
            request = request.bearer_auth(api_key);
        }

        let response = request.send().await.map_err(map_transport_error)?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EmbeddingError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body: EmbeddingResponse = response
            .json()
            .await
            .map_err(|err| EmbeddingError::Malformed(err.to_string()))?;
        let embedding = body
            .data
            .into_iter()
            .next()
            .map(|data| data.embedding)
            .ok_or_else(|| EmbeddingError::Malformed("response contained no data".to_string()))?;
        debug!(
            "embedding generated (model={}, input_len={}, dimensions={})",
            self.config.model,
            text.len(),
            embedding.len()
        );
        Ok(embedding)
    }
}

fn map_transport_error(err: reqwest::Error) -> EmbeddingError {
    if err.is_timeout() {
        EmbeddingError::Timeout
    } else {
        EmbeddingError::Request(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::{OpenAiEmbeddingConfig, OpenAiEmbeddingGenerator};
    use crate::{EmbeddingError, EmbeddingGenerator};
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use axum::{Json, Router};
    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};
    use std::time::Duration;

    async fn embeddings(headers: HeaderMap, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
        let authorized = headers
            .get("authorization")
            .and_then(|value| value.to_str().ok())
            == Some("Bearer test-key");
        if !authorized {
            return (StatusCode::UNAUTHORIZED, Json(json!({ "error": "no key" })));
        }
        let input = body["input"].as_str().unwrap_or_default();
        let length = input.len() as f32;
        (
            StatusCode::OK,
            Json(json!({ "data": [{ "embedding": [length, 0.5, 0.25] }] })),
        )
    }

    async fn empty() -> Json<Value> {
        Json(json!({ "data": [] }))
    }

    async fn slow() -> Json<Value> {
        tokio::time::sleep(Duration::from_millis(500)).await;
        Json(json!({ "data": [{ "embedding": [1.0] }] }))
    }

    async fn spawn_server() -> String {
        let app = Router::new()
            .route("/v1/embeddings", post(embeddings))
            .route("/empty", post(empty))
            .route("/slow", post(slow));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind");
        let addr = listener.local_addr().expect("addr");
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        format!("http://{addr}")
    }

    fn generator(endpoint: String, api_key: Option<&str>) -> OpenAiEmbeddingGenerator {
        OpenAiEmbeddingGenerator::new(OpenAiEmbeddingConfig {
            endpoint,
            model: "test-model".to_string(),
            dimensions: 3,
            api_key: api_key.map(str::to_string),
            timeout: Duration::from_millis(100),
        })
        .expect("client")
    }

    #[tokio::test]
    async fn embed_returns_first_vector() {
        let base = spawn_server().await;
        let generator = generator(format!("{base}/v1/embeddings"), Some("test-key"));

        let vector = generator.embed("abcd").await.expect("embed");

        assert_eq!(vector, vec![4.0, 0.5, 0.25]);
        assert_eq!(generator.dimensions(), 3);
    }

    #[tokio::test]
    async fn embed_surfaces_status_errors() {
        let base = spawn_server().await;
        let generator = generator(format!("{base}/v1/embeddings"), None);

        let err = generator.embed("abcd").await.unwrap_err();

        assert!(matches!(err, EmbeddingError::Status { status: 401, .. }));
    }

    #[tokio::test]
    async fn embed_rejects_empty_data() {
        let base = spawn_server().await;
        let generator = generator(format!("{base}/empty"), None);

        let err = generator.embed("abcd").await.unwrap_err();

        assert!(matches!(err, EmbeddingError::Malformed(_)));
    }

    #[tokio::test]
    async fn embed_times_out() {
        let base = spawn_server().await;
        let generator = generator(format!("{base}/slow"), None);

        let err = generator.embed("abcd").await.unwrap_err();

        assert!(matches!(err, EmbeddingError::Timeout));
    }
}
