//! Multimodal catalog-image extraction collaborator.
//!
//! An external vision LLM turns one catalog photograph into a list of
//! structured [`ExtractedProduct`] records. The concrete client talks to the
//! Gemini `generateContent` REST endpoint; tests substitute
//! [`MockExtractor`].

pub mod client;
pub mod error;
pub mod model;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use client::{GeminiVisionExtractor, ProductExtractor};
pub use error::ExtractionError;
pub use model::ExtractedProduct;

#[cfg(any(test, feature = "mock"))]
pub use mock::MockExtractor;

/// Provenance tag attached to every record produced by the vision client.
pub const MULTIMODAL_PROVENANCE: &str = "multimodal_analysis";

/// Confidence assigned to records the vision model returns without an
/// explicit confidence of its own.
pub const DEFAULT_EXTRACTION_CONFIDENCE: f32 = 0.95;
