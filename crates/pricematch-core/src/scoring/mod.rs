//! Post-retrieval score adjustment.
//!
//! Raw similarity scores from the index stay untouched; a brand match adds a
//! fixed boost to a separate adjusted score so downstream consumers can see
//! both. Retention is decided on the raw score alone, which keeps the boost
//! from pulling otherwise-poor matches above the floor.

mod types;


pub use types::CandidateMatch;

use crate::extraction::ExtractedProduct;

fn brands_match(extracted: Option<&str>, catalog: Option<&str>) -> bool {
    match (extracted, catalog) {
        (Some(a), Some(b)) => {
            let a = a.trim().to_uppercase();
            let b = b.trim().to_uppercase();
            !a.is_empty() && a == b
        }
        _ => false,
    }
}

/// Applies the brand boost and the minimum-score floor to a candidate list.
///
/// Candidates whose raw score falls below `min_score` are dropped. Survivors
/// whose catalog brand equals the extracted brand (case-insensitive, trimmed)
/// get `brand_boost` added to their adjusted score, which may exceed 1.0.
/// Input order is preserved.
pub fn adjust_candidates(
    product: &ExtractedProduct,
    candidates: Vec<CandidateMatch>,
    min_score: f32,
    brand_boost: f32,
) -> Vec<CandidateMatch> {
    candidates
        .into_iter()
        .filter(|c| c.score >= min_score)
        .map(|mut c| {
            if brands_match(product.brand.as_deref(), c.payload.marca.as_deref()) {
                c.score_ajustado = c.score + brand_boost;
            } else {
                c.score_ajustado = c.score;
            }
            c
        })
        .collect()
}
