//! In-memory catalog index used by tests and the `mock` feature.

use std::collections::HashMap;
use std::sync::RwLock;

use super::client::CatalogIndex;
use super::error::VectorDbError;
use super::model::{CollectionSummary, ProductVectorRecord, SearchHit};
use crate::query::ExactFilters;

/// Cosine similarity between two vectors; 0.0 for mismatched or zero-norm
/// inputs.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a.sqrt() * norm_b.sqrt())
}

struct MockCollection {
    vector_size: u64,
    points: HashMap<u64, ProductVectorRecord>,
}

/// In-memory stand-in for [`super::QdrantCatalogIndex`]. Honors exact
/// filters, score thresholds, and result limits so pipeline tests exercise
/// the real retrieval contract.
#[derive(Default)]
pub struct MockCatalogIndex {
    collections: RwLock<HashMap<String, MockCollection>>,
}

impl MockCatalogIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of points currently stored in `collection`.
    pub fn point_count(&self, collection: &str) -> usize {
        self.collections
            .read()
            .unwrap()
            .get(collection)
            .map(|c| c.points.len())
            .unwrap_or(0)
    }

    fn matches_filters(record: &ProductVectorRecord, filters: &ExactFilters) -> bool {
        if let Some(count) = filters.unidad_count
            && record.payload.unidad_count != Some(count)
        {
            return false;
        }
        if let Some(peso) = &filters.peso
            && record.payload.peso.as_deref() != Some(peso.as_str())
        {
            return false;
        }
        if let Some(marca) = &filters.marca
            && record.payload.marca.as_deref() != Some(marca.as_str())
        {
            return false;
        }
        true
    }
}

impl CatalogIndex for MockCatalogIndex {
    async fn ensure_collection(&self, name: &str, vector_size: u64) -> Result<(), VectorDbError> {
        let mut collections = self.collections.write().unwrap();
        collections
            .entry(name.to_string())
            .or_insert_with(|| MockCollection {
                vector_size,
                points: HashMap::new(),
            });
        Ok(())
    }

    async fn upsert(
        &self,
        collection: &str,
        records: Vec<ProductVectorRecord>,
    ) -> Result<(), VectorDbError> {
        let mut collections = self.collections.write().unwrap();
        let coll =
            collections
                .get_mut(collection)
                .ok_or_else(|| VectorDbError::CollectionNotFound {
                    collection: collection.to_string(),
                })?;

        for record in records {
            if record.vector.len() as u64 != coll.vector_size {
                return Err(VectorDbError::InvalidDimension {
                    expected: coll.vector_size as usize,
                    actual: record.vector.len(),
                });
            }
            coll.points.insert(record.id, record);
        }

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
        let collections = self.collections.read().unwrap();
        let coll =
            collections
                .get(collection)
                .ok_or_else(|| VectorDbError::CollectionNotFound {
                    collection: collection.to_string(),
                })?;

        let mut hits: Vec<SearchHit> = coll
            .points
            .values()
            .filter(|record| Self::matches_filters(record, filters))
            .map(|record| SearchHit {
                id: record.id,
                score: cosine_similarity(&query, &record.vector),
                payload: record.payload.clone(),
            })
            .filter(|hit| hit.score >= score_threshold)
            .collect();

        hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        hits.truncate(limit as usize);

        Ok(hits)
    }

    async fn collection_info(&self, name: &str) -> Result<CollectionSummary, VectorDbError> {
        let collections = self.collections.read().unwrap();
        let coll = collections
            .get(name)
            .ok_or_else(|| VectorDbError::CollectionNotFound {
                collection: name.to_string(),
            })?;

        Ok(CollectionSummary {
            name: name.to_string(),
            points_count: coll.points.len() as u64,
            status: "green".to_string(),
        })
    }

    async fn recreate_collection(&self, name: &str, vector_size: u64) -> Result<(), VectorDbError> {
        let mut collections = self.collections.write().unwrap();
        collections.insert(
            name.to_string(),
            MockCollection {
                vector_size,
                points: HashMap::new(),
            },
        );
        Ok(())
    }

    async fn health_check(&self) -> Result<(), VectorDbError> {
        Ok(())
    }
}
