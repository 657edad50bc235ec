//! Cross-cutting, shared constants.
//!
//! The embedding dimension is treated as a single system-wide invariant: the
//! embedder and the vector collection must agree on it exactly, so every
//! module that touches vectors derives its size from [`DEFAULT_EMBEDDING_DIM`]
//! and validates incoming vectors with [`validate_embedding_dim`] instead of
//! carrying its own copy.

/// Width of the vectors produced by the embedding collaborator and configured
/// on the catalog collection. `gemini-embedding-001` emits 3072 floats at its
/// native output dimensionality.
pub const DEFAULT_EMBEDDING_DIM: usize = 3072;

pub const DEFAULT_VECTOR_SIZE_U64: u64 = DEFAULT_EMBEDDING_DIM as u64;

/// Name of the catalog collection in the vector index.
pub const DEFAULT_COLLECTION_NAME: &str = "supermarket_products";

/// How many nearest neighbors one product retrieval asks the index for.
pub const DEFAULT_SEARCH_LIMIT: u64 = 10;

/// Similarity floor handed to the index at retrieval time. Candidates below
/// this cosine score never reach the scoring stage.
pub const DEFAULT_SEARCH_SCORE_THRESHOLD: f32 = 0.5;

/// Minimum raw similarity a candidate must have to survive score adjustment.
pub const DEFAULT_MIN_MATCH_SCORE: f32 = 0.7;

/// Additive bonus applied to a candidate's adjusted score when its brand
/// equals the extracted product's brand. Adjusted scores may exceed 1.0.
pub const BRAND_BOOST: f32 = 0.1;

/// Extraction confidence required before the brand joins the exact-filter
/// set for multi-unit packs.
pub const BRAND_FILTER_MIN_CONFIDENCE: f32 = 0.9;

pub const DEFAULT_EMBEDDING_MODEL: &str = "gemini-embedding-001";
pub const DEFAULT_EXTRACTION_MODEL: &str = "gemini-2.0-flash-exp";
pub const DEFAULT_RERANK_MODEL: &str = "gemini-2.0-flash";

/// Base URL of the Gemini REST API used by the embedding and extraction
/// clients.
pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Per-call timeout for HTTP collaborators.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Retry budget for transient embedding failures (429, 5xx, network).
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Wholesaler tag used when the upload filename yields no usable segment.
pub const UNKNOWN_WHOLESALER: &str = "DESCONOCIDO";

/// Error returned when dimension validation fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DimValidationError {
    /// Embedding dimension cannot be zero.
    ZeroDimension,
    /// Runtime dimension does not match the configured dimension.
    DimensionMismatch { expected: usize, actual: usize },
}

impl std::fmt::Display for DimValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ZeroDimension => write!(f, "embedding dimension cannot be zero"),
            Self::DimensionMismatch { expected, actual } => {
                write!(
                    f,
                    "dimension mismatch: expected {}, got {}",
                    expected, actual
                )
            }
        }
    }
}

impl std::error::Error for DimValidationError {}

/// Validates that a runtime embedding dimension matches the expected dimension.
///
/// Use this at module boundaries (upsert, search) to catch mismatches early
/// instead of letting the index reject or silently mis-rank vectors.
pub fn validate_embedding_dim(actual: usize, expected: usize) -> Result<(), DimValidationError> {
    if expected == 0 || actual == 0 {
        return Err(DimValidationError::ZeroDimension);
    }
    if actual != expected {
        return Err(DimValidationError::DimensionMismatch { expected, actual });
    }
    Ok(())
}
