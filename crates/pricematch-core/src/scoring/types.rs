use serde::{Deserialize, Serialize};

use crate::vectordb::{ProductPayload, SearchHit};

/// One catalog candidate for an extracted product, carrying both the raw
/// similarity score and the brand-adjusted one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateMatch {
    /// Catalog point id.
    pub id: u64,

    /// Raw cosine similarity from the index.
    pub score: f32,

    /// Score after brand adjustment; equals `score` when no boost applied.
    pub score_ajustado: f32,

    /// Catalog payload for the matched point.
    pub payload: ProductPayload,
}

impl From<SearchHit> for CandidateMatch {
    fn from(hit: SearchHit) -> Self {
        Self {
            id: hit.id,
            score: hit.score,
            score_ajustado: hit.score,
            payload: hit.payload,
        }
    }
}
