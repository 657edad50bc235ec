//! HTTP gateway (Axum) for catalog processing, ingestion, and search.
//!
//! This module is primarily used by the `pricematch` server binary.

#![allow(missing_docs)]

pub mod error;
pub mod handler;
pub mod state;


use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, State},
    http::{HeaderMap, StatusCode, header::HeaderValue},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use handler::{
    collection_info_handler, ingest_handler, process_image_handler, recreate_collection_handler,
    search_handler,
};
pub use state::HandlerState;

use pricematch::embedding::TextEmbedder;
use pricematch::extraction::ProductExtractor;
use pricematch::reranker::Reranker;
use pricematch::vectordb::CatalogIndex;

/// Response header carrying the gateway's own status signal.
pub const PRICEMATCH_STATUS_HEADER: &str = "x-pricematch-status";
pub const PRICEMATCH_STATUS_HEALTHY: &str = "healthy";
pub const PRICEMATCH_STATUS_READY: &str = "ready";
pub const PRICEMATCH_STATUS_NOT_READY: &str = "not_ready";
pub const PRICEMATCH_STATUS_ERROR: &str = "error";

/// Catalog images can be large photographs; cap request bodies at 20 MiB.
const MAX_BODY_BYTES: usize = 20 * 1024 * 1024;

pub fn create_router_with_state<X, E, V, R>(state: HandlerState<X, E, V, R>) -> Router
where
    X: ProductExtractor + 'static,
    E: TextEmbedder + 'static,
    V: CatalogIndex + 'static,
    R: Reranker + 'static,
{
    Router::new()
        .route("/healthz", get(health_handler))
        .route("/ready", get(ready_handler))
        .route("/catalog/process-image", post(process_image_handler))
        .route("/catalog/ingest", post(ingest_handler))
        .route("/catalog/search", post(search_handler))
        .route("/catalog/collection", get(collection_info_handler))
        .route("/catalog/recreate-collection", post(recreate_collection_handler))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[derive(serde::Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(serde::Serialize)]
pub struct ReadyResponse {
    pub status: &'static str,
    pub components: ComponentStatus,
}

#[derive(serde::Serialize)]
pub struct ComponentStatus {
    pub http: &'static str,
    pub vectordb: &'static str,
    pub extraction: &'static str,
    pub embedding: &'static str,
}

#[tracing::instrument]
pub async fn health_handler() -> Response {
    let mut headers = HeaderMap::new();
    headers.insert(
        PRICEMATCH_STATUS_HEADER,
        HeaderValue::from_static(PRICEMATCH_STATUS_HEALTHY),
    );

    (
        StatusCode::OK,
        headers,
        Json(HealthResponse { status: "ok" }),
    )
        .into_response()
}

#[tracing::instrument(skip(state))]
pub async fn ready_handler<X, E, V, R>(State(state): State<HandlerState<X, E, V, R>>) -> Response
where
    X: ProductExtractor + 'static,
    E: TextEmbedder + 'static,
    V: CatalogIndex + 'static,
    R: Reranker + 'static,
{
    let vectordb_status = if state.pipeline.index().health_check().await.is_ok() {
        PRICEMATCH_STATUS_READY
    } else {
        "pending"
    };

    let extraction_status = if state.pipeline.extractor_configured() {
        PRICEMATCH_STATUS_READY
    } else {
        "unconfigured"
    };

    let embedding_status = if state.pipeline.embedder_configured() {
        PRICEMATCH_STATUS_READY
    } else {
        "unconfigured"
    };

    let components = ComponentStatus {
        http: PRICEMATCH_STATUS_READY,
        vectordb: vectordb_status,
        extraction: extraction_status,
        embedding: embedding_status,
    };

    let is_ready = components.vectordb == PRICEMATCH_STATUS_READY
        && components.extraction == PRICEMATCH_STATUS_READY
        && components.embedding == PRICEMATCH_STATUS_READY;

    let status_code = if is_ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    let status_msg = if is_ready { "ok" } else { "pending" };

    let mut headers = HeaderMap::new();
    headers.insert(
        PRICEMATCH_STATUS_HEADER,
        HeaderValue::from_str(status_msg).unwrap_or(HeaderValue::from_static("error")),
    );

    (
        status_code,
        headers,
        Json(ReadyResponse {
            status: status_msg,
            components,
        }),
    )
        .into_response()
}
