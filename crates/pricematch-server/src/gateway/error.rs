use axum::{
    Json,
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

use pricematch::pipeline::PipelineError;

use crate::gateway::PRICEMATCH_STATUS_HEADER;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("extraction failed: {0}")]
    ExtractionFailed(String),

    #[error("embedding failed: {0}")]
    EmbeddingFailed(String),

    #[error("catalog index error: {0}")]
    VectorDbFailed(String),

    #[error("internal error: {0}")]
    InternalError(String),
}

impl From<PipelineError> for GatewayError {
    fn from(e: PipelineError) -> Self {
        match e {
            PipelineError::Extraction(inner) => Self::ExtractionFailed(inner.to_string()),
            PipelineError::Embedding(inner) => Self::EmbeddingFailed(inner.to_string()),
            PipelineError::VectorDb(inner) => Self::VectorDbFailed(inner.to_string()),
            PipelineError::InvalidConfig { message } => Self::InternalError(message),
        }
    }
}

#[derive(serde::Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let (status, error_message, gateway_status) = match &self {
            GatewayError::InvalidRequest(_) => {
                (StatusCode::BAD_REQUEST, self.to_string(), "invalid_request")
            }
            GatewayError::ExtractionFailed(_) => (
                StatusCode::BAD_GATEWAY,
                self.to_string(),
                "extraction_error",
            ),
            GatewayError::EmbeddingFailed(_) => (
                StatusCode::BAD_GATEWAY,
                self.to_string(),
                "embedding_error",
            ),
            GatewayError::VectorDbFailed(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                self.to_string(),
                "vectordb_error",
            ),
            GatewayError::InternalError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                self.to_string(),
                "internal_error",
            ),
        };

        let mut headers = HeaderMap::new();
        headers.insert(
            PRICEMATCH_STATUS_HEADER,
            HeaderValue::from_str(gateway_status).unwrap_or(HeaderValue::from_static("error")),
        );

        let body = Json(ErrorResponse {
            error: error_message,
            code: status.as_u16(),
        });

        (status, headers, body).into_response()
    }
}
