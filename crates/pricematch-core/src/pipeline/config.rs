use crate::constants::{
    BRAND_BOOST, DEFAULT_COLLECTION_NAME, DEFAULT_EMBEDDING_DIM, DEFAULT_MIN_MATCH_SCORE,
    DEFAULT_SEARCH_LIMIT, DEFAULT_SEARCH_SCORE_THRESHOLD,
};

use super::error::PipelineError;

/// Tunables for one [`super::CatalogPipeline`] instance.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Catalog collection to search and ingest into.
    pub collection_name: String,

    /// Maximum candidates requested from the index per product.
    pub search_limit: u64,

    /// Score threshold applied inside the index search.
    pub score_threshold: f32,

    /// Raw-score floor applied after retrieval; candidates below it are
    /// dropped from the preview.
    pub min_match_score: f32,

    /// Additive boost for exact brand matches.
    pub brand_boost: f32,

    /// Whether the LLM re-ranking stage runs.
    pub rerank_enabled: bool,

    /// Embedding dimension the collection was created with.
    pub embedding_dim: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            collection_name: DEFAULT_COLLECTION_NAME.to_string(),
            search_limit: DEFAULT_SEARCH_LIMIT,
            score_threshold: DEFAULT_SEARCH_SCORE_THRESHOLD,
            min_match_score: DEFAULT_MIN_MATCH_SCORE,
            brand_boost: BRAND_BOOST,
            rerank_enabled: false,
            embedding_dim: DEFAULT_EMBEDDING_DIM,
        }
    }
}

impl PipelineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_collection_name(mut self, name: impl Into<String>) -> Self {
        self.collection_name = name.into();
        self
    }

    pub fn with_search_limit(mut self, limit: u64) -> Self {
        self.search_limit = limit;
        self
    }

    pub fn with_score_threshold(mut self, threshold: f32) -> Self {
        self.score_threshold = threshold;
        self
    }

    pub fn with_min_match_score(mut self, min_score: f32) -> Self {
        self.min_match_score = min_score;
        self
    }

    pub fn with_brand_boost(mut self, boost: f32) -> Self {
        self.brand_boost = boost;
        self
    }

    pub fn with_rerank_enabled(mut self, enabled: bool) -> Self {
        self.rerank_enabled = enabled;
        self
    }

    pub fn with_embedding_dim(mut self, dim: usize) -> Self {
        self.embedding_dim = dim;
        self
    }

    /// Validates the configuration before the pipeline is built.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.collection_name.trim().is_empty() {
            return Err(PipelineError::InvalidConfig {
                message: "collection_name must not be empty".to_string(),
            });
        }
        if self.search_limit == 0 {
            return Err(PipelineError::InvalidConfig {
                message: "search_limit must be at least 1".to_string(),
            });
        }
        for (name, value) in [
            ("score_threshold", self.score_threshold),
            ("min_match_score", self.min_match_score),
            ("brand_boost", self.brand_boost),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(PipelineError::InvalidConfig {
                    message: format!("{name} must be within [0.0, 1.0], got {value}"),
                });
            }
        }
        if self.embedding_dim == 0 {
            return Err(PipelineError::InvalidConfig {
                message: "embedding_dim must be at least 1".to_string(),
            });
        }

        Ok(())
    }
}
