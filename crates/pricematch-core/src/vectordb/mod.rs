//! Qdrant catalog-index integration.

pub mod client;
pub mod error;
pub mod model;

#[cfg(any(test, feature = "mock"))]
pub mod mock;


pub use client::{CatalogIndex, QdrantCatalogIndex};
pub use error::VectorDbError;
pub use model::{CollectionSummary, ProductPayload, ProductVectorRecord, SearchHit};

#[cfg(any(test, feature = "mock"))]
pub use mock::{MockCatalogIndex, cosine_similarity};

/// Payload keys carrying a keyword index so exact filters stay fast.
pub const INDEXED_PAYLOAD_KEYS: [&str; 2] = ["marca", "peso"];
