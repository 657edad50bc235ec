use std::sync::Arc;

use pricematch::embedding::TextEmbedder;
use pricematch::extraction::ProductExtractor;
use pricematch::pipeline::CatalogPipeline;
use pricematch::reranker::Reranker;
use pricematch::vectordb::CatalogIndex;

/// Shared handler state: one pipeline instance behind an `Arc`.
pub struct HandlerState<X, E, V, R>
where
    X: ProductExtractor + 'static,
    E: TextEmbedder + 'static,
    V: CatalogIndex + 'static,
    R: Reranker + 'static,
{
    pub pipeline: Arc<CatalogPipeline<X, E, V, R>>,
}

impl<X, E, V, R> HandlerState<X, E, V, R>
where
    X: ProductExtractor + 'static,
    E: TextEmbedder + 'static,
    V: CatalogIndex + 'static,
    R: Reranker + 'static,
{
    pub fn new(pipeline: Arc<CatalogPipeline<X, E, V, R>>) -> Self {
        Self { pipeline }
    }
}

// Manual impl: `#[derive(Clone)]` would demand `Clone` on every collaborator,
// but only the Arc is cloned.
impl<X, E, V, R> Clone for HandlerState<X, E, V, R>
where
    X: ProductExtractor + 'static,
    E: TextEmbedder + 'static,
    V: CatalogIndex + 'static,
    R: Reranker + 'static,
{
    fn clone(&self) -> Self {
        Self {
            pipeline: Arc::clone(&self.pipeline),
        }
    }
}
