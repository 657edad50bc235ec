//! Pricematch library crate (used by the server and integration tests).
//!
//! # Public API Surface
//!
//! The exports are organized by module:
//!
//! ## Core Types
//! - [`Config`], [`ConfigError`] - Server configuration
//! - [`CatalogPipeline`], [`PipelineConfig`] - End-to-end orchestration
//! - [`ProcessResponse`], [`PreviewItem`] - Response envelope
//!
//! ## Collaborators
//! - [`GeminiVisionExtractor`] / [`ProductExtractor`] - Image extraction
//! - [`GeminiEmbedder`] / [`TextEmbedder`] - Text embedding
//! - [`QdrantCatalogIndex`] / [`CatalogIndex`] - Vector catalog index
//! - [`LlmReranker`] / [`Reranker`] - Candidate re-ranking
//!
//! ## Domain
//! - [`ExtractedProduct`], [`CandidateMatch`], [`CatalogRow`]
//! - [`ExactFilters`], query construction in [`query`]
//! - Unit normalization in [`units`], score adjustment in [`scoring`]
//!
//! ## Test/Mock Support
//! Mock implementations are available behind `#[cfg(any(test, feature = "mock"))]`.

pub mod config;
pub mod constants;
pub mod embedding;
pub mod extraction;
pub mod hashing;
pub mod ingest;
pub mod pipeline;
pub mod query;
pub mod reranker;
pub mod scoring;
pub mod units;
pub mod vectordb;

pub use config::{Config, ConfigError, DEFAULT_QDRANT_URL};

pub use constants::{
    BRAND_BOOST, BRAND_FILTER_MIN_CONFIDENCE, DEFAULT_COLLECTION_NAME, DEFAULT_EMBEDDING_DIM,
    DEFAULT_MIN_MATCH_SCORE, DEFAULT_SEARCH_LIMIT, DEFAULT_SEARCH_SCORE_THRESHOLD,
    DEFAULT_VECTOR_SIZE_U64, DimValidationError, UNKNOWN_WHOLESALER, validate_embedding_dim,
};

pub use embedding::{EmbeddingError, GeminiEmbedder, TextEmbedder};
#[cfg(any(test, feature = "mock"))]
pub use embedding::MockEmbedder;

pub use extraction::{
    ExtractedProduct, ExtractionError, GeminiVisionExtractor, ProductExtractor,
};
#[cfg(any(test, feature = "mock"))]
pub use extraction::MockExtractor;

pub use hashing::{hash_to_u64, point_id_for_code};

pub use ingest::CatalogRow;

pub use pipeline::{
    CatalogPipeline, PipelineConfig, PipelineError, PreviewItem, ProcessData, ProcessMetadata,
    ProcessResponse, wholesaler_tag_from_filename,
};

pub use query::{ExactFilters, build_filters, build_query_text};

pub use reranker::{LlmReranker, RerankError, Reranker};
#[cfg(any(test, feature = "mock"))]
pub use reranker::MockReranker;

pub use scoring::{CandidateMatch, adjust_candidates};

pub use vectordb::{
    CatalogIndex, CollectionSummary, ProductPayload, ProductVectorRecord, QdrantCatalogIndex,
    SearchHit, VectorDbError,
};
#[cfg(any(test, feature = "mock"))]
pub use vectordb::{MockCatalogIndex, cosine_similarity};
