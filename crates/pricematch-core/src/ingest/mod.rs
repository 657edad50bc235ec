//! Catalog ingestion: turning source rows into index-ready records.

use serde::{Deserialize, Serialize};

use crate::hashing::point_id_for_code;
use crate::units;
use crate::vectordb::{ProductPayload, ProductVectorRecord};

/// One row from the catalog source, as received on the ingest surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogRow {
    /// Source product code; numeric codes become the point id directly.
    pub codigo: String,

    /// Category.
    #[serde(default)]
    pub rubro: String,

    /// Brand.
    #[serde(default)]
    pub marca: String,

    /// Description.
    #[serde(default)]
    pub descripcion: String,

    /// Raw weight/volume string, normalized at ingest time.
    #[serde(default)]
    pub peso: String,

    /// Catalog price.
    pub precio: f64,
}

impl CatalogRow {
    /// Builds the text that gets embedded for this row. The labeled format
    /// is load-bearing: the collection was embedded with it, so search-time
    /// text must stay stylistically close.
    pub fn build_row_text(&self) -> String {
        let text = format!(
            "Código: {}; Rubro: {}; Marca: {}; Descripción: {}; Peso: {}; Precio: ${};",
            self.codigo, self.rubro, self.marca, self.descripcion, self.peso, self.precio
        );
        text.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    /// Converts the row plus its embedding into an upsert-ready record.
    /// Brand is upper-cased and trimmed, weight normalized, so the payload
    /// values line up with what the exact-filter layer produces.
    pub fn to_record(&self, vector: Vec<f32>) -> ProductVectorRecord {
        let marca = self.marca.trim().to_uppercase();
        let peso = units::normalize(&self.peso);

        let payload = ProductPayload {
            codigo: self.codigo.trim().parse::<i64>().ok(),
            rubro: (!self.rubro.trim().is_empty()).then(|| self.rubro.trim().to_string()),
            marca: (!marca.is_empty()).then_some(marca),
            descripcion: (!self.descripcion.trim().is_empty())
                .then(|| self.descripcion.trim().to_string()),
            peso: (!peso.is_empty()).then_some(peso),
            precio: Some(self.precio),
            unidad_count: None,
            texto_para_embedding: Some(self.build_row_text()),
        };

        ProductVectorRecord::new(point_id_for_code(&self.codigo), vector, payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> CatalogRow {
        CatalogRow {
            codigo: "1001".to_string(),
            rubro: "ALMACEN".to_string(),
            marca: " natura ".to_string(),
            descripcion: "MAYONESA NATURA".to_string(),
            peso: "250 gr".to_string(),
            precio: 646.78,
        }
    }

    #[test]
    fn test_row_text_format() {
        let text = row().build_row_text();
        assert_eq!(
            text,
            "Código: 1001; Rubro: ALMACEN; Marca: natura ; Descripción: MAYONESA NATURA; Peso: 250 gr; Precio: $646.78;"
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ")
        );
        assert!(text.starts_with("Código: 1001;"));
        assert!(text.ends_with("Precio: $646.78;"));
    }

    #[test]
    fn test_to_record_normalizes_payload() {
        let record = row().to_record(vec![0.0; 4]);
        assert_eq!(record.id, 1001);
        assert_eq!(record.payload.codigo, Some(1001));
        assert_eq!(record.payload.marca.as_deref(), Some("NATURA"));
        assert_eq!(record.payload.peso.as_deref(), Some("250G"));
        assert_eq!(record.payload.precio, Some(646.78));
        assert!(record.payload.texto_para_embedding.is_some());
    }

    #[test]
    fn test_non_numeric_code_hashes_to_stable_id() {
        let mut r = row();
        r.codigo = "AB-77".to_string();
        let a = r.to_record(vec![0.0; 4]).id;
        let b = r.to_record(vec![0.0; 4]).id;
        assert_eq!(a, b);
        assert!(r.to_record(vec![0.0; 4]).payload.codigo.is_none());
    }

    #[test]
    fn test_empty_fields_omitted_from_payload() {
        let mut r = row();
        r.rubro = String::new();
        r.marca = "  ".to_string();
        r.peso = String::new();
        let record = r.to_record(vec![0.0; 4]);
        assert!(record.payload.rubro.is_none());
        assert!(record.payload.marca.is_none());
        assert!(record.payload.peso.is_none());
    }
}
