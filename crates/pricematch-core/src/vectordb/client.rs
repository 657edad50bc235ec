use qdrant_client::Qdrant;
use qdrant_client::qdrant::{
    Condition, CreateCollectionBuilder, CreateFieldIndexCollectionBuilder, Distance, FieldType,
    Filter, PointStruct, SearchPointsBuilder, UpsertPointsBuilder, VectorParamsBuilder,
};
use tracing::debug;

use super::INDEXED_PAYLOAD_KEYS;
use super::error::VectorDbError;
use super::model::{CollectionSummary, ProductVectorRecord, SearchHit};
use crate::query::ExactFilters;

/// Minimal async interface over the catalog index, used by the pipeline and
/// substituted with [`super::MockCatalogIndex`] in tests.
pub trait CatalogIndex: Send + Sync {
    /// Ensures the collection exists with its payload indexes.
    fn ensure_collection(
        &self,
        name: &str,
        vector_size: u64,
    ) -> impl std::future::Future<Output = Result<(), VectorDbError>> + Send;

    /// Upserts catalog points.
    fn upsert(
        &self,
        collection: &str,
        records: Vec<ProductVectorRecord>,
    ) -> impl std::future::Future<Output = Result<(), VectorDbError>> + Send;

    /// Searches by vector similarity with an exact-filter conjunction. An
    /// empty filter set means an unfiltered search.
    fn search(
        &self,
        collection: &str,
        query: Vec<f32>,
        limit: u64,
        score_threshold: f32,
        filters: &ExactFilters,
    ) -> impl std::future::Future<Output = Result<Vec<SearchHit>, VectorDbError>> + Send;

    /// Returns a status snapshot of the collection.
    fn collection_info(
        &self,
        name: &str,
    ) -> impl std::future::Future<Output = Result<CollectionSummary, VectorDbError>> + Send;

    /// Drops and recreates the collection (with payload indexes).
    fn recreate_collection(
        &self,
        name: &str,
        vector_size: u64,
    ) -> impl std::future::Future<Output = Result<(), VectorDbError>> + Send;

    /// Basic liveness probe.
    fn health_check(&self)
    -> impl std::future::Future<Output = Result<(), VectorDbError>> + Send;
}

#[derive(Clone)]
/// Direct Qdrant client wrapper for the catalog collection.
pub struct QdrantCatalogIndex {
    client: Qdrant,
    url: String,
}

impl QdrantCatalogIndex {
    /// Creates a client for `url`.
    pub async fn new(url: &str) -> Result<Self, VectorDbError> {
        let client =
            Qdrant::from_url(url)
                .build()
                .map_err(|e| VectorDbError::ConnectionFailed {
                    url: url.to_string(),
                    message: e.to_string(),
                })?;

        Ok(Self {
            client,
            url: url.to_string(),
        })
    }

    /// Returns the configured URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Creates a collection with cosine distance and keyword payload
    /// indexes on the exact-filter keys.
    async fn create_collection(&self, name: &str, vector_size: u64) -> Result<(), VectorDbError> {
        let vectors_config = VectorParamsBuilder::new(vector_size, Distance::Cosine);

        self.client
            .create_collection(
                CreateCollectionBuilder::new(name)
                    .vectors_config(vectors_config)
                    .on_disk_payload(true),
            )
            .await
            .map_err(|e| VectorDbError::CreateCollectionFailed {
                collection: name.to_string(),
                message: e.to_string(),
            })?;

        self.create_payload_indexes(name).await?;

        Ok(())
    }

    async fn create_payload_indexes(&self, name: &str) -> Result<(), VectorDbError> {
        for field in INDEXED_PAYLOAD_KEYS {
            self.client
                .create_field_index(CreateFieldIndexCollectionBuilder::new(
                    name,
                    field,
                    FieldType::Keyword,
                ))
                .await
                .map_err(|e| VectorDbError::CreateIndexFailed {
                    collection: name.to_string(),
                    field: field.to_string(),
                    message: e.to_string(),
                })?;
        }

        debug!(collection = name, "Keyword payload indexes ensured");
        Ok(())
    }

    fn build_filter(filters: &ExactFilters) -> Option<Filter> {
        if filters.is_empty() {
            return None;
        }

        let mut conditions = Vec::new();
        if let Some(count) = filters.unidad_count {
            conditions.push(Condition::matches("unidad_count", count as i64));
        }
        if let Some(peso) = &filters.peso {
            conditions.push(Condition::matches("peso", peso.clone()));
        }
        if let Some(marca) = &filters.marca {
            conditions.push(Condition::matches("marca", marca.clone()));
        }

        Some(Filter::must(conditions))
    }
}

impl CatalogIndex for QdrantCatalogIndex {
    async fn ensure_collection(&self, name: &str, vector_size: u64) -> Result<(), VectorDbError> {
        let exists = self.client.collection_exists(name).await.map_err(|e| {
            VectorDbError::CreateCollectionFailed {
                collection: name.to_string(),
                message: e.to_string(),
            }
        })?;

        if !exists {
            self.create_collection(name, vector_size).await?;
        }

        Ok(())
    }

    async fn upsert(
        &self,
        collection: &str,
        records: Vec<ProductVectorRecord>,
    ) -> Result<(), VectorDbError> {
        if records.is_empty() {
            return Ok(());
        }

        let points: Vec<PointStruct> = records
            .into_iter()
            .map(|r| PointStruct::new(r.id, r.vector, r.payload.to_qdrant_payload()))
            .collect();

        self.client
            .upsert_points(UpsertPointsBuilder::new(collection, points).wait(true))
            .await
            .map_err(|e| VectorDbError::UpsertFailed {
                collection: collection.to_string(),
                message: e.to_string(),
            })?;

        Ok(())
    }

    async fn search(
        &self,
        collection: &str,
        query: Vec<f32>,
        limit: u64,
        score_threshold: f32,
        filters: &ExactFilters,
    ) -> Result<Vec<SearchHit>, VectorDbError> {
        let mut search_builder = SearchPointsBuilder::new(collection, query, limit)
            .with_payload(true)
            .score_threshold(score_threshold);

        if let Some(filter) = Self::build_filter(filters) {
            search_builder = search_builder.filter(filter);
        }

        let search_result = self
            .client
            .search_points(search_builder)
            .await
            .map_err(|e| VectorDbError::SearchFailed {
                collection: collection.to_string(),
                message: e.to_string(),
            })?;

        let hits = search_result
            .result
            .into_iter()
            .filter_map(SearchHit::from_scored_point)
            .collect();

        Ok(hits)
    }

    async fn collection_info(&self, name: &str) -> Result<CollectionSummary, VectorDbError> {
        let response = self.client.collection_info(name).await.map_err(|e| {
            VectorDbError::SearchFailed {
                collection: name.to_string(),
                message: e.to_string(),
            }
        })?;

        let info = response
            .result
            .ok_or_else(|| VectorDbError::CollectionNotFound {
                collection: name.to_string(),
            })?;

        Ok(CollectionSummary {
            name: name.to_string(),
            points_count: info.points_count.unwrap_or(0),
            status: info.status().as_str_name().to_lowercase(),
        })
    }

    async fn recreate_collection(&self, name: &str, vector_size: u64) -> Result<(), VectorDbError> {
        self.client.delete_collection(name).await.map_err(|e| {
            VectorDbError::DeleteCollectionFailed {
                collection: name.to_string(),
                message: e.to_string(),
            }
        })?;

        self.create_collection(name, vector_size).await
    }

    async fn health_check(&self) -> Result<(), VectorDbError> {
        self.client
            .health_check()
            .await
            .map_err(|e| VectorDbError::ConnectionFailed {
                url: self.url.clone(),
                message: e.to_string(),
            })?;
        Ok(())
    }
}
