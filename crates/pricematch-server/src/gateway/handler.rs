use axum::{
    Json,
    extract::{Multipart, State},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use pricematch::embedding::TextEmbedder;
use pricematch::extraction::ProductExtractor;
use pricematch::ingest::CatalogRow;
use pricematch::query::ExactFilters;
use pricematch::reranker::Reranker;
use pricematch::vectordb::{CatalogIndex, SearchHit};

use crate::gateway::error::GatewayError;
use crate::gateway::state::HandlerState;

const IMAGE_FIELD: &str = "image";
const COMPANY_FIELD: &str = "company";
const DEFAULT_IMAGE_CONTENT_TYPE: &str = "image/jpeg";

struct ImageUpload {
    bytes: Vec<u8>,
    content_type: String,
    filename: Option<String>,
    company: Option<String>,
}

async fn read_image_upload(mut multipart: Multipart) -> Result<ImageUpload, GatewayError> {
    let mut image: Option<(Vec<u8>, String, Option<String>)> = None;
    let mut company: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| GatewayError::InvalidRequest(format!("malformed multipart body: {e}")))?
    {
        match field.name() {
            Some(IMAGE_FIELD) => {
                let filename = field.file_name().map(str::to_string);
                let content_type = field
                    .content_type()
                    .unwrap_or(DEFAULT_IMAGE_CONTENT_TYPE)
                    .to_string();
                let bytes = field.bytes().await.map_err(|e| {
                    GatewayError::InvalidRequest(format!("failed to read image field: {e}"))
                })?;
                image = Some((bytes.to_vec(), content_type, filename));
            }
            Some(COMPANY_FIELD) => {
                let value = field.text().await.map_err(|e| {
                    GatewayError::InvalidRequest(format!("failed to read company field: {e}"))
                })?;
                let value = value.trim().to_string();
                if !value.is_empty() {
                    company = Some(value);
                }
            }
            _ => {}
        }
    }

    let (bytes, content_type, filename) = image.ok_or_else(|| {
        GatewayError::InvalidRequest(format!("missing required '{IMAGE_FIELD}' field"))
    })?;

    if bytes.is_empty() {
        return Err(GatewayError::InvalidRequest(format!(
            "'{IMAGE_FIELD}' field is empty"
        )));
    }

    Ok(ImageUpload {
        bytes,
        content_type,
        filename,
        company,
    })
}

/// Processes one catalog image into the match-preview envelope.
#[instrument(skip(state, multipart))]
pub async fn process_image_handler<X, E, V, R>(
    State(state): State<HandlerState<X, E, V, R>>,
    multipart: Multipart,
) -> Result<Response, GatewayError>
where
    X: ProductExtractor + 'static,
    E: TextEmbedder + 'static,
    V: CatalogIndex + 'static,
    R: Reranker + 'static,
{
    let upload = read_image_upload(multipart).await?;
    info!(
        image_bytes = upload.bytes.len(),
        content_type = %upload.content_type,
        filename = upload.filename.as_deref().unwrap_or("<none>"),
        "Processing catalog image"
    );

    let response = state
        .pipeline
        .process_image(
            &upload.bytes,
            &upload.content_type,
            upload.filename.as_deref(),
            upload.company.as_deref(),
        )
        .await?;

    Ok(Json(response).into_response())
}

#[derive(Debug, Deserialize)]
pub struct IngestRequest {
    pub rows: Vec<CatalogRow>,
}

#[derive(Debug, Serialize)]
pub struct IngestResponse {
    pub success: bool,
    pub points: usize,
}

/// Embeds and upserts a batch of catalog rows.
#[instrument(skip(state, request), fields(rows = request.rows.len()))]
pub async fn ingest_handler<X, E, V, R>(
    State(state): State<HandlerState<X, E, V, R>>,
    Json(request): Json<IngestRequest>,
) -> Result<Response, GatewayError>
where
    X: ProductExtractor + 'static,
    E: TextEmbedder + 'static,
    V: CatalogIndex + 'static,
    R: Reranker + 'static,
{
    if request.rows.is_empty() {
        return Err(GatewayError::InvalidRequest(
            "rows must not be empty".to_string(),
        ));
    }

    let points = state.pipeline.ingest_rows(request.rows).await?;
    Ok(Json(IngestResponse {
        success: true,
        points,
    })
    .into_response())
}

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub texto: String,

    #[serde(default)]
    pub filtros: ExactFilters,

    #[serde(default)]
    pub limit: Option<u64>,

    #[serde(default)]
    pub score_threshold: Option<f32>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub success: bool,
    pub resultados: Vec<SearchHit>,
    pub total: usize,
}

/// Direct text search against the catalog collection.
#[instrument(skip(state, request))]
pub async fn search_handler<X, E, V, R>(
    State(state): State<HandlerState<X, E, V, R>>,
    Json(request): Json<SearchRequest>,
) -> Result<Response, GatewayError>
where
    X: ProductExtractor + 'static,
    E: TextEmbedder + 'static,
    V: CatalogIndex + 'static,
    R: Reranker + 'static,
{
    if request.texto.trim().is_empty() {
        return Err(GatewayError::InvalidRequest(
            "texto must not be empty".to_string(),
        ));
    }

    let resultados = state
        .pipeline
        .search_text(
            &request.texto,
            &request.filtros,
            request.limit,
            request.score_threshold,
        )
        .await?;

    let total = resultados.len();
    Ok(Json(SearchResponse {
        success: true,
        resultados,
        total,
    })
    .into_response())
}

/// Returns the catalog collection's status snapshot.
#[instrument(skip(state))]
pub async fn collection_info_handler<X, E, V, R>(
    State(state): State<HandlerState<X, E, V, R>>,
) -> Result<Response, GatewayError>
where
    X: ProductExtractor + 'static,
    E: TextEmbedder + 'static,
    V: CatalogIndex + 'static,
    R: Reranker + 'static,
{
    let summary = state.pipeline.collection_info().await?;
    Ok(Json(summary).into_response())
}

#[derive(Debug, Serialize)]
pub struct RecreateResponse {
    pub success: bool,
}

/// Drops and recreates the catalog collection.
#[instrument(skip(state))]
pub async fn recreate_collection_handler<X, E, V, R>(
    State(state): State<HandlerState<X, E, V, R>>,
) -> Result<Response, GatewayError>
where
    X: ProductExtractor + 'static,
    E: TextEmbedder + 'static,
    V: CatalogIndex + 'static,
    R: Reranker + 'static,
{
    state.pipeline.recreate_collection().await?;
    info!("Catalog collection recreated");
    Ok(Json(RecreateResponse { success: true }).into_response())
}
