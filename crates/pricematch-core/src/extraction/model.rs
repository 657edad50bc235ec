use serde::{Deserialize, Serialize};

use super::error::ExtractionError;

fn default_pack_count() -> u32 {
    1
}

fn default_confidence() -> f32 {
    super::DEFAULT_EXTRACTION_CONFIDENCE
}

/// One product record extracted from a catalog image.
///
/// Wire names are the Spanish field names of the extraction schema.
/// `catalog_price` is the literal value printed in the image; no per-unit or
/// pre-discount price is ever derived from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedProduct {
    /// Normalized product name, e.g. "ACEITE GIRASOL COCINERO".
    #[serde(rename = "producto_normalizado")]
    pub normalized_name: String,

    /// Specific subtype ("girasol", "0000", "entera"), when identifiable.
    #[serde(rename = "tipo_producto", default, skip_serializing_if = "Option::is_none")]
    pub product_subtype: Option<String>,

    /// The price printed in the source image, verbatim.
    #[serde(rename = "precio_catalogo")]
    pub catalog_price: f64,

    /// Advertised discount percentage, when the image shows one.
    #[serde(
        rename = "porcentaje_descuento",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub discount_percent: Option<f64>,

    /// Brand, when visible.
    #[serde(rename = "marca", default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,

    /// Units per pack; 1 for individually-sold products.
    #[serde(rename = "cantidad_pack", default = "default_pack_count")]
    pub pack_count: u32,

    /// Raw per-unit quantity string, e.g. "250g" or "1,5 LT".
    #[serde(rename = "unidad_medida", default)]
    pub unit_of_measure: String,

    /// Free-text quantity description, e.g. "12 x 250g".
    #[serde(rename = "descripcion_cantidad", default)]
    pub quantity_description: String,

    /// Category inferred by the extractor, when one was.
    #[serde(
        rename = "categoria_inferida",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub inferred_category: Option<String>,

    /// Extraction confidence in `0..=1`.
    #[serde(default = "default_confidence")]
    pub confidence: f32,

    /// Tag identifying which extraction path produced this record.
    #[serde(rename = "procedencia", default)]
    pub provenance: String,

    /// Wholesaler identifier derived from the upload filename. Attached by
    /// the pipeline, never by the extractor.
    #[serde(rename = "mayorista", default, skip_serializing_if = "Option::is_none")]
    pub wholesaler: Option<String>,
}

impl ExtractedProduct {
    /// Ingress-boundary validation. Malformed extraction output is rejected
    /// here instead of propagating through the match pipeline.
    pub fn validate(&self) -> Result<(), ExtractionError> {
        if self.normalized_name.trim().is_empty() {
            return Err(ExtractionError::InvalidRecord {
                reason: "producto_normalizado is empty".to_string(),
            });
        }

        if self.pack_count < 1 {
            return Err(ExtractionError::InvalidRecord {
                reason: format!("cantidad_pack must be >= 1, got {}", self.pack_count),
            });
        }

        if !(0.0..=1.0).contains(&self.confidence) {
            return Err(ExtractionError::InvalidRecord {
                reason: format!("confidence {} outside 0..=1", self.confidence),
            });
        }

        if !self.catalog_price.is_finite() || self.catalog_price < 0.0 {
            return Err(ExtractionError::InvalidRecord {
                reason: format!("precio_catalogo {} is not a valid price", self.catalog_price),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_product() -> ExtractedProduct {
        ExtractedProduct {
            normalized_name: "MAYONESA CADA DIA".to_string(),
            product_subtype: Some("standard".to_string()),
            catalog_price: 646.78,
            discount_percent: None,
            brand: Some("CADA DIA".to_string()),
            pack_count: 12,
            unit_of_measure: "250g".to_string(),
            quantity_description: "12 x 250g".to_string(),
            inferred_category: Some("aderezos".to_string()),
            confidence: 0.95,
            provenance: "multimodal_analysis".to_string(),
            wholesaler: None,
        }
    }

    #[test]
    fn test_validate_accepts_well_formed_record() {
        assert!(sample_product().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_name() {
        let mut product = sample_product();
        product.normalized_name = "  ".to_string();
        assert!(product.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_out_of_range_confidence() {
        let mut product = sample_product();
        product.confidence = 1.2;
        assert!(product.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_negative_price() {
        let mut product = sample_product();
        product.catalog_price = -1.0;
        assert!(product.validate().is_err());
    }

    #[test]
    fn test_deserialize_spanish_wire_names_with_defaults() {
        let json = r#"{
            "producto_normalizado": "LECHE ENTERA SANCOR",
            "precio_catalogo": 320.0,
            "unidad_medida": "1L"
        }"#;

        let product: ExtractedProduct = serde_json::from_str(json).unwrap();
        assert_eq!(product.normalized_name, "LECHE ENTERA SANCOR");
        assert_eq!(product.pack_count, 1);
        assert_eq!(product.confidence, 0.95);
        assert!(product.brand.is_none());
        assert!(product.wholesaler.is_none());
    }

    #[test]
    fn test_serialize_uses_spanish_wire_names() {
        let value = serde_json::to_value(sample_product()).unwrap();
        assert!(value.get("producto_normalizado").is_some());
        assert!(value.get("precio_catalogo").is_some());
        assert!(value.get("cantidad_pack").is_some());
        assert!(value.get("normalized_name").is_none());
    }
}
