use genai::Client;
use genai::chat::{ChatMessage, ChatRequest};
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use super::Reranker;
use super::error::RerankError;
use crate::pipeline::PreviewItem;
use crate::scoring::CandidateMatch;

const RERANK_SYSTEM_PROMPT: &str = "\
Sos un experto en matching de productos de supermercado. Recibís un producto \
extraído de un catálogo y una lista de candidatos de la base de datos. Tu \
tarea es DESCARTAR los candidatos incorrectos y devolver sólo los que \
corresponden al mismo producto.

Reglas estrictas:
1. La marca debe coincidir. Si el producto extraído tiene marca y un \
candidato tiene otra marca, descartalo.
2. La unidad de medida (peso/volumen/cantidad) debe coincidir. \"500G\" no \
es \"1KG\".
3. La categoría debe ser compatible (una mayonesa no coincide con un \
ketchup).
4. Si varios candidatos son variantes perfectamente válidas del mismo \
producto, conservalos a todos.
5. Ante empate, preferí el candidato con mayor score_ajustado.

Respondé ÚNICAMENTE con JSON, sin texto adicional, con esta forma exacta:
{\"coincidencias\": [{\"id\": <id del candidato>}, ...]}
Si ningún candidato corresponde, devolvé {\"coincidencias\": []}.";

#[derive(Debug, Deserialize)]
struct RerankSelection {
    coincidencias: Vec<RerankChoice>,
}

#[derive(Debug, Deserialize)]
struct RerankChoice {
    id: u64,
}

/// LLM-backed [`Reranker`]. Sends the extracted product and its candidates
/// to a chat model and keeps only the candidates the model selects.
pub struct LlmReranker {
    client: Client,
    model: String,
}

impl LlmReranker {
    pub fn new(client: Client, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }

    fn build_user_prompt(item: &PreviewItem) -> Result<String, RerankError> {
        let product = serde_json::to_string(&item.producto_extraido).map_err(|e| {
            RerankError::ParseFailed {
                message: e.to_string(),
            }
        })?;
        let candidates =
            serde_json::to_string(&item.coincidencias).map_err(|e| RerankError::ParseFailed {
                message: e.to_string(),
            })?;

        Ok(format!(
            "Producto extraído:\n{product}\n\nCandidatos:\n{candidates}"
        ))
    }

    /// Maps the model's id selection back onto the original candidate
    /// objects, in the model's order. Ids the item never contained are
    /// dropped rather than trusted.
    fn select_candidates(
        item: &PreviewItem,
        selection: RerankSelection,
    ) -> Vec<CandidateMatch> {
        selection
            .coincidencias
            .into_iter()
            .filter_map(|choice| {
                let found = item.coincidencias.iter().find(|c| c.id == choice.id);
                if found.is_none() {
                    warn!(id = choice.id, "Re-rank selected an unknown candidate id");
                }
                found.cloned()
            })
            .collect()
    }
}

/// Strips a leading/trailing markdown code fence, if present.
fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

impl Reranker for LlmReranker {
    #[instrument(skip(self, item), fields(model = %self.model, candidates = item.coincidencias.len()))]
    async fn rerank(&self, item: &PreviewItem) -> Result<Vec<CandidateMatch>, RerankError> {
        if item.coincidencias.is_empty() {
            return Ok(Vec::new());
        }

        let chat_req = ChatRequest::new(vec![
            ChatMessage::system(RERANK_SYSTEM_PROMPT),
            ChatMessage::user(Self::build_user_prompt(item)?),
        ]);

        let response = self
            .client
            .exec_chat(&self.model, chat_req, None)
            .await
            .map_err(|e| RerankError::CallFailed {
                message: e.to_string(),
            })?;

        let text = response.first_text().ok_or(RerankError::EmptyResponse)?;
        let body = strip_code_fences(text);

        let selection: RerankSelection =
            serde_json::from_str(body).map_err(|e| RerankError::ParseFailed {
                message: e.to_string(),
            })?;

        let kept = Self::select_candidates(item, selection);
        debug!(kept = kept.len(), "Re-rank selection applied");
        Ok(kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::ExtractedProduct;
    use crate::vectordb::ProductPayload;

    fn item_with_candidates(ids: &[u64]) -> PreviewItem {
        let product = ExtractedProduct {
            normalized_name: "YERBA MATE".to_string(),
            product_subtype: None,
            catalog_price: 2100.0,
            discount_percent: None,
            brand: Some("TARAGUI".to_string()),
            pack_count: 1,
            unit_of_measure: "1kg".to_string(),
            quantity_description: String::new(),
            inferred_category: Some("yerba".to_string()),
            confidence: 0.95,
            provenance: "test".to_string(),
            wholesaler: None,
        };
        let coincidencias = ids
            .iter()
            .map(|&id| CandidateMatch {
                id,
                score: 0.8,
                score_ajustado: 0.8,
                payload: ProductPayload::default(),
            })
            .collect();
        PreviewItem::matched(product, coincidencias)
    }

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(
            strip_code_fences("```json\n{\"coincidencias\": []}\n```"),
            "{\"coincidencias\": []}"
        );
        assert_eq!(
            strip_code_fences("{\"coincidencias\": []}"),
            "{\"coincidencias\": []}"
        );
    }

    #[test]
    fn test_select_candidates_keeps_model_order_and_drops_unknown_ids() {
        let item = item_with_candidates(&[1, 2, 3]);
        let selection: RerankSelection =
            serde_json::from_str(r#"{"coincidencias": [{"id": 3}, {"id": 99}, {"id": 1}]}"#)
                .unwrap();
        let kept = LlmReranker::select_candidates(&item, selection);
        let ids: Vec<u64> = kept.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![3, 1]);
    }

    #[test]
    fn test_user_prompt_carries_product_and_candidates() {
        let item = item_with_candidates(&[7]);
        let prompt = LlmReranker::build_user_prompt(&item).unwrap();
        assert!(prompt.contains("YERBA MATE"));
        assert!(prompt.contains("\"id\":7"));
    }
}
