//! Query construction for one extracted product.
//!
//! Produces the two halves of a retrieval request: the denormalized text
//! string handed to the embedder, and the exact-match filter set that
//! pre-restricts the nearest-neighbor search.

use serde::{Deserialize, Serialize};

use crate::constants::BRAND_FILTER_MIN_CONFIDENCE;
use crate::extraction::ExtractedProduct;
use crate::units;

/// Exact-match filter conjunction applied alongside vector similarity.
///
/// Field names double as the catalog payload keys they filter on. The three
/// measure-ish keys are mutually exclusive by construction (see
/// [`build_filters`]); `marca` may accompany `unidad_count`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExactFilters {
    /// Units per pack, for multi-unit products.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unidad_count: Option<u32>,

    /// Normalized weight/volume string, e.g. "250G" or "1.5L".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub peso: Option<String>,

    /// Upper-cased, trimmed brand.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marca: Option<String>,
}

impl ExactFilters {
    /// `true` when no condition is set (unfiltered search).
    pub fn is_empty(&self) -> bool {
        self.unidad_count.is_none() && self.peso.is_none() && self.marca.is_none()
    }
}

/// Assembles the text that gets embedded for similarity search.
///
/// Assembly order (category, brand, name, pack count) is fixed: changing it
/// changes embedding semantics and silently degrades retrieval against a
/// collection embedded with the old order.
pub fn build_query_text(product: &ExtractedProduct) -> String {
    let mut parts: Vec<&str> = Vec::with_capacity(4);

    if let Some(category) = product.inferred_category.as_deref()
        && !category.trim().is_empty()
    {
        parts.push(category);
    }

    if let Some(brand) = product.brand.as_deref()
        && !brand.trim().is_empty()
    {
        parts.push(brand);
    }

    parts.push(&product.normalized_name);

    let pack_count_text;
    if product.pack_count > 1 {
        pack_count_text = product.pack_count.to_string();
        parts.push(&pack_count_text);
    }

    parts
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Builds the exact-filter set for one product. First matching rule wins:
///
/// 1. Multi-unit pack: filter by pack count, plus brand when extraction
///    confidence is high enough.
/// 2. Count unit (sachets, pairs, packs...): no filter at all; similarity
///    alone carries the search.
/// 3. Measure unit: filter by the normalized weight/volume string.
pub fn build_filters(product: &ExtractedProduct) -> ExactFilters {
    if product.pack_count > 1 {
        let marca = product
            .brand
            .as_deref()
            .map(|b| b.to_uppercase().trim().to_string())
            .filter(|b| !b.is_empty())
            .filter(|_| product.confidence >= BRAND_FILTER_MIN_CONFIDENCE);

        return ExactFilters {
            unidad_count: Some(product.pack_count),
            peso: None,
            marca,
        };
    }

    if units::is_count_unit(&product.unit_of_measure) {
        return ExactFilters::default();
    }

    let mut peso = units::normalize(&product.unit_of_measure);

    // Known extraction artifact: price-per-kilo products sometimes come back
    // with a bare "kg" unit and an "xkg." marker in the name. Coerce to the
    // catalog's "1KG" spelling for those alone.
    if peso == "KG" && product.normalized_name.contains("xkg.") {
        peso = "1KG".to_string();
    }

    ExactFilters {
        unidad_count: None,
        peso: (!peso.is_empty()).then_some(peso),
        marca: None,
    }
}
