//! End-to-end catalog processing pipeline.

pub mod config;
pub mod error;
pub mod orchestrator;
pub mod types;

#[cfg(test)]
mod tests;

pub use config::PipelineConfig;
pub use error::PipelineError;
pub use orchestrator::{CatalogPipeline, wholesaler_tag_from_filename};
pub use types::{PreviewItem, ProcessData, ProcessMetadata, ProcessResponse};
