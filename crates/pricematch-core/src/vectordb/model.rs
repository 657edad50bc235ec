use qdrant_client::qdrant::ScoredPoint;
use qdrant_client::qdrant::point_id::PointIdOptions;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Payload stored with every catalog point. Keys are the Spanish wire names
/// shared with the ingestion source and the exact-filter layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductPayload {
    /// Numeric product code, when the source code parsed as one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub codigo: Option<i64>,

    /// Category ("rubro") from the catalog source.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rubro: Option<String>,

    /// Brand, upper-cased and trimmed at ingestion time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marca: Option<String>,

    /// Free-text product description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub descripcion: Option<String>,

    /// Normalized weight/volume string ("250G", "1.5L").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub peso: Option<String>,

    /// Catalog price.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub precio: Option<f64>,

    /// Units per pack, for multipack catalog rows.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unidad_count: Option<u32>,

    /// The exact text that was embedded for this point, kept for debugging
    /// retrieval quality.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub texto_para_embedding: Option<String>,
}

impl ProductPayload {
    /// Converts into the Qdrant payload map, omitting unset fields.
    pub fn to_qdrant_payload(&self) -> HashMap<String, qdrant_client::qdrant::Value> {
        let mut payload: HashMap<String, qdrant_client::qdrant::Value> = HashMap::new();

        if let Some(codigo) = self.codigo {
            payload.insert("codigo".to_string(), codigo.into());
        }
        if let Some(rubro) = &self.rubro {
            payload.insert("rubro".to_string(), rubro.clone().into());
        }
        if let Some(marca) = &self.marca {
            payload.insert("marca".to_string(), marca.clone().into());
        }
        if let Some(descripcion) = &self.descripcion {
            payload.insert("descripcion".to_string(), descripcion.clone().into());
        }
        if let Some(peso) = &self.peso {
            payload.insert("peso".to_string(), peso.clone().into());
        }
        if let Some(precio) = self.precio {
            payload.insert("precio".to_string(), precio.into());
        }
        if let Some(count) = self.unidad_count {
            payload.insert("unidad_count".to_string(), (count as i64).into());
        }
        if let Some(texto) = &self.texto_para_embedding {
            payload.insert("texto_para_embedding".to_string(), texto.clone().into());
        }

        payload
    }

    /// Reads the payload back from a Qdrant map.
    pub fn from_qdrant_payload(
        payload: &HashMap<String, qdrant_client::qdrant::Value>,
    ) -> Self {
        Self {
            codigo: payload.get("codigo").and_then(|v| v.as_integer()),
            rubro: payload.get("rubro").and_then(|v| v.as_str()).cloned(),
            marca: payload.get("marca").and_then(|v| v.as_str()).cloned(),
            descripcion: payload
                .get("descripcion")
                .and_then(|v| v.as_str())
                .cloned(),
            peso: payload.get("peso").and_then(|v| v.as_str()).cloned(),
            precio: payload.get("precio").and_then(|v| v.as_double()),
            unidad_count: payload
                .get("unidad_count")
                .and_then(|v| v.as_integer())
                .map(|i| i as u32),
            texto_para_embedding: payload
                .get("texto_para_embedding")
                .and_then(|v| v.as_str())
                .cloned(),
        }
    }
}

/// One catalog point queued for upsert into the index.
#[derive(Debug, Clone)]
pub struct ProductVectorRecord {
    pub id: u64,
    pub vector: Vec<f32>,
    pub payload: ProductPayload,
}

impl ProductVectorRecord {
    pub fn new(id: u64, vector: Vec<f32>, payload: ProductPayload) -> Self {
        Self {
            id,
            vector,
            payload,
        }
    }
}

/// One scored hit returned by the index, ordered best-first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub id: u64,
    pub score: f32,
    pub payload: ProductPayload,
}

impl SearchHit {
    /// Builds a hit from a Qdrant scored point; points without a numeric id
    /// are dropped (this system only writes numeric ids).
    pub fn from_scored_point(point: ScoredPoint) -> Option<Self> {
        let id = match point.id.and_then(|pid| pid.point_id_options) {
            Some(PointIdOptions::Num(n)) => n,
            _ => return None,
        };

        Some(SearchHit {
            id,
            score: point.score,
            payload: ProductPayload::from_qdrant_payload(&point.payload),
        })
    }
}

/// Collection status snapshot for the admin surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionSummary {
    pub name: String,
    pub points_count: u64,
    pub status: String,
}
