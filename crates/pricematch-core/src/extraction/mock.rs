use super::client::ProductExtractor;
use super::error::ExtractionError;
use super::model::ExtractedProduct;

/// Deterministic in-memory extractor for tests: returns a fixed product
/// list, or a fixed failure.
#[derive(Default, Clone)]
pub struct MockExtractor {
    products: Vec<ExtractedProduct>,
    fail: bool,
}

impl MockExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Extractor that returns `products` for every image.
    pub fn with_products(products: Vec<ExtractedProduct>) -> Self {
        Self {
            products,
            fail: false,
        }
    }

    /// Extractor whose every call fails as if the service were unreachable.
    pub fn failing() -> Self {
        Self {
            products: Vec::new(),
            fail: true,
        }
    }
}

impl ProductExtractor for MockExtractor {
    async fn extract(
        &self,
        _image: &[u8],
        _content_type: &str,
        _company: Option<&str>,
    ) -> Result<Vec<ExtractedProduct>, ExtractionError> {
        if self.fail {
            return Err(ExtractionError::ServiceUnreachable {
                message: "mock extractor configured to fail".to_string(),
            });
        }
        Ok(self.products.clone())
    }

    fn is_configured(&self) -> bool {
        !self.fail
    }
}
