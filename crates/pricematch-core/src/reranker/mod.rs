//! Optional LLM re-ranking of candidate matches.

pub mod error;
pub mod llm;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use error::RerankError;
pub use llm::LlmReranker;

#[cfg(any(test, feature = "mock"))]
pub use mock::MockReranker;

use crate::pipeline::PreviewItem;
use crate::scoring::CandidateMatch;

/// Re-ranks (and prunes) the candidate list of one preview item.
///
/// Implementations return a subset of the item's candidates; they never
/// invent new ones. A failure leaves the item unranked, which the pipeline
/// records without aborting the batch.
pub trait Reranker: Send + Sync {
    fn rerank(
        &self,
        item: &PreviewItem,
    ) -> impl std::future::Future<Output = Result<Vec<CandidateMatch>, RerankError>> + Send;
}
