//! Text-embedding collaborator.
//!
//! Query texts and catalog rows are embedded by an external endpoint; the
//! resulting vectors must match the catalog collection's configured
//! dimensionality exactly (see [`crate::constants::DEFAULT_EMBEDDING_DIM`]).

pub mod client;
pub mod error;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use client::{GeminiEmbedder, TextEmbedder};
pub use error::EmbeddingError;

#[cfg(any(test, feature = "mock"))]
pub use mock::MockEmbedder;
