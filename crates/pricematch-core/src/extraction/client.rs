use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use super::error::ExtractionError;
use super::model::ExtractedProduct;
use crate::constants::{DEFAULT_EXTRACTION_MODEL, DEFAULT_REQUEST_TIMEOUT_SECS, GEMINI_API_BASE};

/// Async interface for the image-extraction collaborator.
pub trait ProductExtractor: Send + Sync {
    /// Extracts product records from one catalog image.
    fn extract(
        &self,
        image: &[u8],
        content_type: &str,
        company: Option<&str>,
    ) -> impl std::future::Future<Output = Result<Vec<ExtractedProduct>, ExtractionError>> + Send;

    /// Returns `true` when the collaborator can actually make calls.
    fn is_configured(&self) -> bool;
}

/// Vision client for the Gemini `generateContent` REST endpoint.
///
/// Built once from configuration; a missing API key leaves the client in an
/// unconfigured state where every call fails fast with
/// [`ExtractionError::NotConfigured`] instead of crashing the process.
#[derive(Clone)]
pub struct GeminiVisionExtractor {
    client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
}

impl GeminiVisionExtractor {
    /// Creates a vision client. `api_key = None` yields an unconfigured
    /// client whose calls fail immediately.
    pub fn new(api_key: Option<String>, model: Option<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();

        Self {
            client,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            base_url: GEMINI_API_BASE.to_string(),
            model: model.unwrap_or_else(|| DEFAULT_EXTRACTION_MODEL.to_string()),
        }
    }

    /// Creates a client from an API key with product defaults.
    pub fn from_api_key(api_key: Option<String>) -> Self {
        Self::new(
            api_key,
            None,
            Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        )
    }

    /// Overrides the endpoint base URL (used by tests against a local stub).
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Configured model id.
    pub fn model(&self) -> &str {
        &self.model
    }

    fn build_prompt(company: Option<&str>) -> String {
        let company_clause = company
            .map(|c| format!(" {c}"))
            .unwrap_or_default();

        format!(
            r#"Eres un especialista en procesar catálogos de supermercados mayoristas{company_clause}.

ANÁLISIS DE LA IMAGEN DEL CATÁLOGO:

INSTRUCCIONES CRÍTICAS:
1. Analiza DETALLADAMENTE la imagen completa del catálogo
2. Identifica TODOS los productos visibles con sus precios
3. El precio extraído es SIEMPRE el precio literal que se ve en la imagen. NO calcules precios por unidad ni precios sin descuento.
4. Busca indicadores de descuento como "%", "OFF", "oferta" y repórtalos solo como porcentaje
5. EXTRACCIÓN DE MARCAS: la marca debe ser el nombre COMPLETO.
   - "MAYONESA CADA DIA" → marca: "CADA DIA"
   - "AC.GIRASOL NATURA" → marca: "NATURA"
6. NORMALIZACIÓN DE UNIDADES:
   - "250 GR" → "250g"
   - "1,5 LT" → "1.5L"
   - "1KG" → "1kg"
7. TIPO ESPECÍFICO: determina el subtipo para aceites ("girasol", "mezcla"), harinas ("000", "0000"), lácteos ("entera", "descremada"), bebidas ("cola", "zero"). Usa "standard" solo como último recurso.

FORMATO DE RESPUESTA - SOLO JSON:
[
  {{
    "producto_normalizado": "nombre completo del producto",
    "tipo_producto": "tipo específico o standard",
    "precio_catalogo": 646.78,
    "porcentaje_descuento": 15,
    "marca": "marca si existe",
    "cantidad_pack": 12,
    "unidad_medida": "250g",
    "descripcion_cantidad": "12 x 250g",
    "categoria_inferida": "categoría apropiada"
  }}
]

IMPORTANTE:
- precio_catalogo es SIEMPRE el precio que se ve en la imagen
- cantidad_pack es 1 para productos individuales
- Responde EXCLUSIVAMENTE con el array JSON, sin texto adicional."#
        )
    }

    /// Parses a model response into validated product records. Tolerates a
    /// fenced code block wrapper; skips records that fail validation.
    fn parse_products(text: &str) -> Result<Vec<ExtractedProduct>, ExtractionError> {
        let cleaned = strip_code_fences(text);
        let array = extract_json_array(cleaned).ok_or_else(|| ExtractionError::InvalidResponse {
            message: "no JSON array found in response".to_string(),
        })?;

        let raw: Vec<serde_json::Value> =
            serde_json::from_str(array).map_err(|e| ExtractionError::InvalidResponse {
                message: e.to_string(),
            })?;

        let mut products = Vec::with_capacity(raw.len());
        for (index, value) in raw.into_iter().enumerate() {
            match serde_json::from_value::<ExtractedProduct>(value) {
                Ok(mut product) => {
                    product.provenance = super::MULTIMODAL_PROVENANCE.to_string();
                    match product.validate() {
                        Ok(()) => products.push(product),
                        Err(e) => {
                            warn!(index = index, error = %e, "Skipping invalid extracted record");
                        }
                    }
                }
                Err(e) => {
                    warn!(index = index, error = %e, "Skipping unparseable extracted record");
                }
            }
        }

        Ok(products)
    }
}

impl ProductExtractor for GeminiVisionExtractor {
    async fn extract(
        &self,
        image: &[u8],
        content_type: &str,
        company: Option<&str>,
    ) -> Result<Vec<ExtractedProduct>, ExtractionError> {
        let api_key = self.api_key.as_deref().ok_or(ExtractionError::NotConfigured)?;

        let url = format!(
            "{}/models/{}:generateContent",
            self.base_url, self.model
        );

        let request = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![
                    Part::InlineData {
                        inline_data: InlineData {
                            mime_type: content_type,
                            data: BASE64.encode(image),
                        },
                    },
                    Part::Text {
                        text: Self::build_prompt(company),
                    },
                ],
            }],
        };

        debug!(model = %self.model, image_bytes = image.len(), "Sending catalog image for extraction");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| ExtractionError::ServiceUnreachable {
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ExtractionError::RequestRejected {
                status: status.as_u16(),
                message: truncate(&body, 500),
            });
        }

        let parsed: GenerateContentResponse =
            response
                .json()
                .await
                .map_err(|e| ExtractionError::InvalidResponse {
                    message: e.to_string(),
                })?;

        let text = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .and_then(|p| p.text)
            .ok_or_else(|| ExtractionError::InvalidResponse {
                message: "empty response from model".to_string(),
            })?;

        let products = Self::parse_products(&text)?;
        debug!(products = products.len(), "Extraction complete");

        Ok(products)
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let without_open = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    without_open.strip_suffix("```").unwrap_or(without_open).trim()
}

fn extract_json_array(text: &str) -> Option<&str> {
    let start = text.find('[')?;
    let end = text.rfind(']')?;
    (end > start).then(|| &text[start..=end])
}

fn truncate(text: &str, max: usize) -> String {
    if text.len() <= max {
        text.to_string()
    } else {
        let mut cut = max;
        while !text.is_char_boundary(cut) {
            cut -= 1;
        }
        format!("{}...", &text[..cut])
    }
}

#[derive(Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part<'a> {
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData<'a>,
    },
    Text {
        text: String,
    },
}

#[derive(Serialize)]
struct InlineData<'a> {
    #[serde(rename = "mimeType")]
    mime_type: &'a str,
    data: String,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<ResponseCandidate>,
}

#[derive(Deserialize)]
struct ResponseCandidate {
    content: ResponseContent,
}

#[derive(Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}
