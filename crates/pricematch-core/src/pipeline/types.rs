use serde::{Deserialize, Serialize};

use crate::extraction::ExtractedProduct;
use crate::scoring::CandidateMatch;

/// One extracted product with its candidate matches and any per-item errors.
///
/// Per-item failures never abort the batch: a match failure lands in
/// `error`, a re-rank failure in `error_llm`, and the item still ships in
/// the preview.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreviewItem {
    /// The product as extracted from the image.
    pub producto_extraido: ExtractedProduct,

    /// Candidate catalog matches, best-first.
    pub coincidencias: Vec<CandidateMatch>,

    /// Candidate count, kept explicit for clients that drop the list.
    pub total_coincidencias: usize,

    /// Matching-stage error for this item, when one occurred.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Re-ranking error for this item, when one occurred.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_llm: Option<String>,
}

impl PreviewItem {
    /// Item with successfully matched candidates.
    pub fn matched(product: ExtractedProduct, coincidencias: Vec<CandidateMatch>) -> Self {
        let total_coincidencias = coincidencias.len();
        Self {
            producto_extraido: product,
            coincidencias,
            total_coincidencias,
            error: None,
            error_llm: None,
        }
    }

    /// Item whose matching stage failed.
    pub fn failed(product: ExtractedProduct, error: String) -> Self {
        Self {
            producto_extraido: product,
            coincidencias: Vec::new(),
            total_coincidencias: 0,
            error: Some(error),
            error_llm: None,
        }
    }
}

/// Payload half of the process-image envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessData {
    #[serde(rename = "productsProcessed")]
    pub products_processed: usize,

    pub preview: Vec<PreviewItem>,
}

/// Metadata half of the process-image envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessMetadata {
    #[serde(rename = "processingTimeMs")]
    pub processing_time_ms: u64,

    #[serde(rename = "wholesalerTag")]
    pub wholesaler_tag: String,
}

/// Full response envelope for one processed image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessResponse {
    pub success: bool,
    pub data: ProcessData,
    pub metadata: ProcessMetadata,
}
