use thiserror::Error;

#[derive(Debug, Error)]
/// Errors from the re-ranking stage.
pub enum RerankError {
    /// The model call itself failed.
    #[error("re-rank model call failed: {message}")]
    CallFailed {
        /// Error message.
        message: String,
    },

    /// The model replied but the reply could not be parsed as a candidate
    /// selection.
    #[error("failed to parse re-rank response: {message}")]
    ParseFailed {
        /// Error message.
        message: String,
    },

    /// The model returned no text content.
    #[error("re-rank model returned an empty response")]
    EmptyResponse,
}
