use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use super::error::EmbeddingError;
use crate::constants::{
    DEFAULT_EMBEDDING_DIM, DEFAULT_EMBEDDING_MODEL, DEFAULT_MAX_RETRIES,
    DEFAULT_REQUEST_TIMEOUT_SECS, GEMINI_API_BASE,
};

/// Async interface for the embedding collaborator.
pub trait TextEmbedder: Send + Sync {
    /// Embeds one text into a fixed-length vector.
    fn embed(
        &self,
        text: &str,
    ) -> impl std::future::Future<Output = Result<Vec<f32>, EmbeddingError>> + Send;

    /// Embeds a batch of texts, preserving input order.
    fn embed_batch(
        &self,
        texts: &[String],
    ) -> impl std::future::Future<Output = Result<Vec<Vec<f32>>, EmbeddingError>> + Send;

    /// Dimensionality of the vectors this embedder produces.
    fn dimension(&self) -> usize;

    /// Returns `true` when the collaborator can actually make calls.
    fn is_configured(&self) -> bool;
}

/// Client for the Gemini `embedContent` / `batchEmbedContents` REST
/// endpoints, with a retry budget for transient failures.
#[derive(Clone)]
pub struct GeminiEmbedder {
    client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
    dimension: usize,
    max_retries: u32,
}

impl GeminiEmbedder {
    /// Creates an embedding client. `api_key = None` yields an unconfigured
    /// client whose calls fail immediately.
    pub fn new(
        api_key: Option<String>,
        model: Option<String>,
        timeout: Duration,
        max_retries: u32,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();

        Self {
            client,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            base_url: GEMINI_API_BASE.to_string(),
            model: model.unwrap_or_else(|| DEFAULT_EMBEDDING_MODEL.to_string()),
            dimension: DEFAULT_EMBEDDING_DIM,
            max_retries,
        }
    }

    /// Creates a client from an API key with product defaults.
    pub fn from_api_key(api_key: Option<String>) -> Self {
        Self::new(
            api_key,
            None,
            Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            DEFAULT_MAX_RETRIES,
        )
    }

    /// Overrides the endpoint base URL (used by tests against a local stub).
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Configured model id.
    pub fn model(&self) -> &str {
        &self.model
    }

    async fn post_with_retries<T: Serialize + ?Sized>(
        &self,
        url: &str,
        api_key: &str,
        request: &T,
    ) -> Result<reqwest::Response, EmbeddingError> {
        let mut attempt: u32 = 0;
        loop {
            let result = self
                .client
                .post(url)
                .header("x-goog-api-key", api_key)
                .json(request)
                .send()
                .await;

            match result {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return Ok(response);
                    }

                    let body = response.text().await.unwrap_or_default();
                    if should_retry(status) && attempt + 1 < self.max_retries {
                        attempt += 1;
                        warn!(status = %status, attempt = attempt, "Embedding request failed, retrying");
                        tokio::time::sleep(retry_backoff(attempt)).await;
                        continue;
                    }

                    return Err(EmbeddingError::RequestRejected {
                        status: status.as_u16(),
                        message: truncate(&body, 500),
                    });
                }
                Err(err) => {
                    if is_retryable_error(&err) && attempt + 1 < self.max_retries {
                        attempt += 1;
                        warn!(error = %err, attempt = attempt, "Embedding request errored, retrying");
                        tokio::time::sleep(retry_backoff(attempt)).await;
                        continue;
                    }

                    return Err(EmbeddingError::ServiceUnreachable {
                        message: err.to_string(),
                    });
                }
            }
        }
    }
}

impl TextEmbedder for GeminiEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let api_key = self
            .api_key
            .clone()
            .ok_or(EmbeddingError::NotConfigured)?;

        let url = format!("{}/models/{}:embedContent", self.base_url, self.model);
        let request = EmbedContentRequest {
            content: TextContent {
                parts: vec![TextPart { text }],
            },
        };

        let response = self.post_with_retries(&url, &api_key, &request).await?;
        let parsed: EmbedContentResponse =
            response
                .json()
                .await
                .map_err(|e| EmbeddingError::InvalidResponse {
                    message: e.to_string(),
                })?;

        debug!(dim = parsed.embedding.values.len(), "Embedding generated");
        Ok(parsed.embedding.values)
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let api_key = self
            .api_key
            .clone()
            .ok_or(EmbeddingError::NotConfigured)?;

        let url = format!(
            "{}/models/{}:batchEmbedContents",
            self.base_url, self.model
        );
        let model_path = format!("models/{}", self.model);
        let request = BatchEmbedRequest {
            requests: texts
                .iter()
                .map(|text| EmbedEntry {
                    model: &model_path,
                    content: TextContent {
                        parts: vec![TextPart { text }],
                    },
                })
                .collect(),
        };

        let response = self.post_with_retries(&url, &api_key, &request).await?;
        let parsed: BatchEmbedResponse =
            response
                .json()
                .await
                .map_err(|e| EmbeddingError::InvalidResponse {
                    message: e.to_string(),
                })?;

        if parsed.embeddings.len() != texts.len() {
            return Err(EmbeddingError::CountMismatch {
                expected: texts.len(),
                actual: parsed.embeddings.len(),
            });
        }

        debug!(count = parsed.embeddings.len(), "Batch embeddings generated");
        Ok(parsed.embeddings.into_iter().map(|e| e.values).collect())
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

fn should_retry(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

fn is_retryable_error(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_connect() || err.is_request() || err.is_body() || err.is_decode()
}

fn retry_backoff(attempt: u32) -> Duration {
    let capped = attempt.min(5);
    Duration::from_millis(500 * (1 << capped))
}

fn truncate(text: &str, max: usize) -> String {
    if text.len() <= max {
        text.to_string()
    } else {
        let mut cut = max;
        while !text.is_char_boundary(cut) {
            cut -= 1;
        }
        format!("{}...", &text[..cut])
    }
}

#[derive(Serialize)]
struct EmbedContentRequest<'a> {
    content: TextContent<'a>,
}

#[derive(Serialize)]
struct BatchEmbedRequest<'a> {
    requests: Vec<EmbedEntry<'a>>,
}

#[derive(Serialize)]
struct EmbedEntry<'a> {
    model: &'a str,
    content: TextContent<'a>,
}

#[derive(Serialize)]
struct TextContent<'a> {
    parts: Vec<TextPart<'a>>,
}

#[derive(Serialize)]
struct TextPart<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct EmbedContentResponse {
    embedding: EmbeddingValues,
}

#[derive(Deserialize)]
struct BatchEmbedResponse {
    #[serde(default)]
    embeddings: Vec<EmbeddingValues>,
}

#[derive(Deserialize)]
struct EmbeddingValues {
    values: Vec<f32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unconfigured_client_reports_not_configured() {
        let embedder = GeminiEmbedder::from_api_key(None);
        assert!(!embedder.is_configured());
        assert_eq!(embedder.dimension(), DEFAULT_EMBEDDING_DIM);
    }

    #[tokio::test]
    async fn test_unconfigured_client_fails_fast() {
        let embedder = GeminiEmbedder::from_api_key(None);
        let result = embedder.embed("aceite girasol").await;
        assert!(matches!(result, Err(EmbeddingError::NotConfigured)));

        let result = embedder.embed_batch(&["a".to_string()]).await;
        assert!(matches!(result, Err(EmbeddingError::NotConfigured)));
    }

    #[tokio::test]
    async fn test_empty_batch_short_circuits() {
        // No API key needed: an empty batch never reaches the network.
        let embedder = GeminiEmbedder::from_api_key(None);
        let result = embedder.embed_batch(&[]).await.unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_should_retry_classification() {
        assert!(should_retry(StatusCode::TOO_MANY_REQUESTS));
        assert!(should_retry(StatusCode::INTERNAL_SERVER_ERROR));
        assert!(should_retry(StatusCode::SERVICE_UNAVAILABLE));
        assert!(!should_retry(StatusCode::BAD_REQUEST));
        assert!(!should_retry(StatusCode::UNAUTHORIZED));
    }

    #[test]
    fn test_retry_backoff_is_capped() {
        assert_eq!(retry_backoff(1), Duration::from_millis(1000));
        assert_eq!(retry_backoff(2), Duration::from_millis(2000));
        assert_eq!(retry_backoff(5), retry_backoff(9));
    }
}
