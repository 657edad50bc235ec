use std::time::Instant;

use futures_util::future::join_all;
use tracing::{debug, info, instrument, warn};

use super::config::PipelineConfig;
use super::error::PipelineError;
use super::types::{PreviewItem, ProcessData, ProcessMetadata, ProcessResponse};
use crate::constants::{UNKNOWN_WHOLESALER, validate_embedding_dim};
use crate::embedding::TextEmbedder;
use crate::extraction::{ExtractedProduct, ProductExtractor};
use crate::ingest::CatalogRow;
use crate::query::{self, ExactFilters};
use crate::reranker::Reranker;
use crate::scoring::{CandidateMatch, adjust_candidates};
use crate::vectordb::{CatalogIndex, CollectionSummary, SearchHit};

/// Derives the wholesaler tag from an upload filename: extension dropped,
/// first segment before an underscore, hyphen, or space, upper-cased.
pub fn wholesaler_tag_from_filename(filename: Option<&str>) -> String {
    let Some(filename) = filename else {
        return UNKNOWN_WHOLESALER.to_string();
    };

    // Extension-only names (".jpg") leave an empty stem, which yields no
    // usable segment below and falls through to the unknown tag.
    let stem = match filename.rsplit_once('.') {
        Some((stem, _ext)) => stem,
        None => filename,
    };

    stem.split(['_', '-'])
        .flat_map(str::split_whitespace)
        .find(|segment| !segment.is_empty())
        .map(str::to_uppercase)
        .unwrap_or_else(|| UNKNOWN_WHOLESALER.to_string())
}

/// The full image-to-preview pipeline: extraction, query building, vector
/// retrieval, score adjustment, and optional LLM re-ranking.
///
/// Collaborators are injected by trait so the whole pipeline runs against
/// in-memory mocks in tests.
pub struct CatalogPipeline<X, E, V, R> {
    extractor: X,
    embedder: E,
    index: V,
    reranker: Option<R>,
    config: PipelineConfig,
}

impl<X, E, V, R> CatalogPipeline<X, E, V, R>
where
    X: ProductExtractor,
    E: TextEmbedder,
    V: CatalogIndex,
    R: Reranker,
{
    /// Builds a pipeline after validating its configuration.
    pub fn new(
        extractor: X,
        embedder: E,
        index: V,
        reranker: Option<R>,
        config: PipelineConfig,
    ) -> Result<Self, PipelineError> {
        config.validate()?;
        Ok(Self {
            extractor,
            embedder,
            index,
            reranker,
            config,
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn index(&self) -> &V {
        &self.index
    }

    /// `true` when the extraction collaborator holds credentials.
    pub fn extractor_configured(&self) -> bool {
        self.extractor.is_configured()
    }

    /// `true` when the embedding collaborator holds credentials.
    pub fn embedder_configured(&self) -> bool {
        self.embedder.is_configured()
    }

    /// Ensures the catalog collection exists with the configured dimension.
    pub async fn ensure_collection(&self) -> Result<(), PipelineError> {
        self.index
            .ensure_collection(&self.config.collection_name, self.config.embedding_dim as u64)
            .await?;
        Ok(())
    }

    /// Processes one catalog image end to end.
    ///
    /// Extraction failure fails the request; everything after that is
    /// per-item, so one bad product never drops the rest of the batch.
    #[instrument(skip(self, image), fields(image_bytes = image.len(), content_type))]
    pub async fn process_image(
        &self,
        image: &[u8],
        content_type: &str,
        filename: Option<&str>,
        company: Option<&str>,
    ) -> Result<ProcessResponse, PipelineError> {
        let started = Instant::now();
        let wholesaler_tag = wholesaler_tag_from_filename(filename);

        // An unconfigured embedder would fail every item identically;
        // surface that as a request failure instead of a wall of per-item
        // errors.
        if !self.embedder.is_configured() {
            return Err(PipelineError::Embedding(
                crate::embedding::EmbeddingError::NotConfigured,
            ));
        }

        let products = self.extractor.extract(image, content_type, company).await?;
        info!(
            products = products.len(),
            wholesaler = %wholesaler_tag,
            "Products extracted from image"
        );

        let mut preview = Vec::with_capacity(products.len());
        for mut product in products {
            if let Err(e) = product.validate() {
                warn!(error = %e, "Skipping invalid extracted product");
                continue;
            }
            product.wholesaler = Some(wholesaler_tag.clone());

            let item = match self.match_product(&product).await {
                Ok(candidates) => PreviewItem::matched(product, candidates),
                Err(e) => {
                    warn!(error = %e, "Product matching failed, continuing batch");
                    PreviewItem::failed(product, e.to_string())
                }
            };
            preview.push(item);
        }

        if self.config.rerank_enabled
            && let Some(reranker) = &self.reranker
        {
            self.rerank_preview(reranker, &mut preview).await;
        }

        let products_processed = preview.len();
        Ok(ProcessResponse {
            success: true,
            data: ProcessData {
                products_processed,
                preview,
            },
            metadata: ProcessMetadata {
                processing_time_ms: started.elapsed().as_millis() as u64,
                wholesaler_tag,
            },
        })
    }

    /// Retrieves and score-adjusts candidates for one extracted product.
    #[instrument(skip(self, product), fields(product = %product.normalized_name))]
    pub async fn match_product(
        &self,
        product: &ExtractedProduct,
    ) -> Result<Vec<CandidateMatch>, PipelineError> {
        let query_text = query::build_query_text(product);
        let filters = query::build_filters(product);
        debug!(query = %query_text, ?filters, "Built retrieval request");

        let vector = self.embedder.embed(&query_text).await?;
        validate_embedding_dim(vector.len(), self.config.embedding_dim).map_err(|e| {
            PipelineError::InvalidConfig {
                message: e.to_string(),
            }
        })?;

        let hits = self
            .index
            .search(
                &self.config.collection_name,
                vector,
                self.config.search_limit,
                self.config.score_threshold,
                &filters,
            )
            .await?;

        let candidates: Vec<CandidateMatch> = hits.into_iter().map(CandidateMatch::from).collect();
        Ok(adjust_candidates(
            product,
            candidates,
            self.config.min_match_score,
            self.config.brand_boost,
        ))
    }

    /// Re-ranks every matchable preview item concurrently. A failed re-rank
    /// fails closed: the item's candidate list empties and the error is
    /// recorded, the rest of the batch unaffected.
    async fn rerank_preview(&self, reranker: &R, preview: &mut [PreviewItem]) {
        let results = join_all(preview.iter().map(|item| async move {
            if item.error.is_some() || item.coincidencias.is_empty() {
                None
            } else {
                Some(reranker.rerank(item).await)
            }
        }))
        .await;

        for (item, result) in preview.iter_mut().zip(results) {
            match result {
                Some(Ok(kept)) => {
                    item.total_coincidencias = kept.len();
                    item.coincidencias = kept;
                }
                Some(Err(e)) => {
                    warn!(error = %e, "Re-rank failed, dropping candidates for item");
                    item.coincidencias.clear();
                    item.total_coincidencias = 0;
                    item.error_llm = Some(e.to_string());
                }
                None => {}
            }
        }
    }

    /// Direct text search against the catalog, for the search surface.
    #[instrument(skip(self, text, filters))]
    pub async fn search_text(
        &self,
        text: &str,
        filters: &ExactFilters,
        limit: Option<u64>,
        score_threshold: Option<f32>,
    ) -> Result<Vec<SearchHit>, PipelineError> {
        let vector = self.embedder.embed(text).await?;
        let hits = self
            .index
            .search(
                &self.config.collection_name,
                vector,
                limit.unwrap_or(self.config.search_limit),
                score_threshold.unwrap_or(self.config.score_threshold),
                filters,
            )
            .await?;
        Ok(hits)
    }

    /// Embeds and upserts a batch of catalog rows. Returns how many points
    /// were written.
    #[instrument(skip(self, rows), fields(rows = rows.len()))]
    pub async fn ingest_rows(&self, rows: Vec<CatalogRow>) -> Result<usize, PipelineError> {
        if rows.is_empty() {
            return Ok(0);
        }

        let texts: Vec<String> = rows.iter().map(CatalogRow::build_row_text).collect();
        let vectors = self.embedder.embed_batch(&texts).await?;

        for vector in &vectors {
            validate_embedding_dim(vector.len(), self.config.embedding_dim).map_err(|e| {
                PipelineError::InvalidConfig {
                    message: e.to_string(),
                }
            })?;
        }

        let records: Vec<_> = rows
            .iter()
            .zip(vectors)
            .map(|(row, vector)| row.to_record(vector))
            .collect();
        let count = records.len();

        self.index
            .upsert(&self.config.collection_name, records)
            .await?;
        info!(points = count, "Catalog rows ingested");
        Ok(count)
    }

    /// Status snapshot of the catalog collection.
    pub async fn collection_info(&self) -> Result<CollectionSummary, PipelineError> {
        Ok(self
            .index
            .collection_info(&self.config.collection_name)
            .await?)
    }

    /// Drops and recreates the catalog collection.
    pub async fn recreate_collection(&self) -> Result<(), PipelineError> {
        self.index
            .recreate_collection(&self.config.collection_name, self.config.embedding_dim as u64)
            .await?;
        Ok(())
    }
}
