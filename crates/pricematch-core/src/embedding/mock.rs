use super::client::TextEmbedder;
use super::error::EmbeddingError;
use crate::hashing::hash_to_u64;

/// Deterministic in-memory embedder for tests.
///
/// Vectors are seeded from a BLAKE3 hash of the input text, so identical
/// texts always embed identically (cosine 1.0) and different texts land far
/// apart with overwhelming probability.
#[derive(Clone)]
pub struct MockEmbedder {
    dimension: usize,
    fail_on: Option<String>,
}

impl MockEmbedder {
    /// Embedder producing vectors of `dimension` floats.
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            fail_on: None,
        }
    }

    /// Fails any embed whose text contains `needle` (for per-item failure
    /// injection in batch-resilience tests).
    pub fn with_failure_on(mut self, needle: &str) -> Self {
        self.fail_on = Some(needle.to_string());
        self
    }

    fn vector_for(&self, text: &str) -> Vec<f32> {
        (0..self.dimension)
            .map(|i| {
                let seed = hash_to_u64(format!("{text}\u{1f}{i}").as_bytes());
                // Map the hash into [-1.0, 1.0).
                (seed as f64 / u64::MAX as f64 * 2.0 - 1.0) as f32
            })
            .collect()
    }
}

impl TextEmbedder for MockEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        if let Some(needle) = &self.fail_on
            && text.contains(needle.as_str())
        {
            return Err(EmbeddingError::ServiceUnreachable {
                message: format!("mock embedder configured to fail on '{needle}'"),
            });
        }
        Ok(self.vector_for(text))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let mut vectors = Vec::with_capacity(texts.len());
        for text in texts {
            vectors.push(self.embed(text).await?);
        }
        Ok(vectors)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn is_configured(&self) -> bool {
        true
    }
}
