//! Deterministic re-ranker for tests.

use super::Reranker;
use super::error::RerankError;
use crate::pipeline::PreviewItem;
use crate::scoring::CandidateMatch;

/// Keeps candidates whose brand and weight both match the extracted product
/// exactly (after uppercase/trim), or fails on every call when built with
/// [`MockReranker::failing`].
#[derive(Debug, Default)]
pub struct MockReranker {
    fail: bool,
}

impl MockReranker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self { fail: true }
    }
}

fn norm(value: Option<&str>) -> Option<String> {
    value
        .map(|v| v.trim().to_uppercase())
        .filter(|v| !v.is_empty())
}

impl Reranker for MockReranker {
    async fn rerank(&self, item: &PreviewItem) -> Result<Vec<CandidateMatch>, RerankError> {
        if self.fail {
            return Err(RerankError::CallFailed {
                message: "mock re-ranker configured to fail".to_string(),
            });
        }

        let product = &item.producto_extraido;
        let want_brand = norm(product.brand.as_deref());
        let want_peso = norm(Some(&crate::units::normalize(&product.unit_of_measure)));

        Ok(item
            .coincidencias
            .iter()
            .filter(|c| {
                norm(c.payload.marca.as_deref()) == want_brand
                    && norm(c.payload.peso.as_deref()) == want_peso
            })
            .cloned()
            .collect())
    }
}
