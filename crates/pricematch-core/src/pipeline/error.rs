use thiserror::Error;

use crate::embedding::EmbeddingError;
use crate::extraction::ExtractionError;
use crate::vectordb::VectorDbError;

#[derive(Debug, Error)]
/// Request-level pipeline errors. Per-item failures inside a batch are
/// reported through [`super::PreviewItem`] fields instead.
pub enum PipelineError {
    /// Image extraction failed for the whole request.
    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    /// Embedding failed.
    #[error(transparent)]
    Embedding(#[from] EmbeddingError),

    /// Catalog index operation failed.
    #[error(transparent)]
    VectorDb(#[from] VectorDbError),

    /// Pipeline configuration failed validation.
    #[error("invalid pipeline configuration: {message}")]
    InvalidConfig {
        /// What was wrong.
        message: String,
    },
}
