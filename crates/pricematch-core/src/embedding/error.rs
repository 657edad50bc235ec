use thiserror::Error;

#[derive(Debug, Error)]
/// Errors returned by the embedding collaborator.
pub enum EmbeddingError {
    /// No API key was configured; the client cannot make calls.
    #[error("embedding client not configured: missing API key")]
    NotConfigured,

    /// The endpoint could not be reached at the network level, after the
    /// retry budget was exhausted.
    #[error("embedding service unreachable: {message}")]
    ServiceUnreachable {
        /// Transport-level error message.
        message: String,
    },

    /// The endpoint answered with a non-success status.
    #[error("embedding service rejected request ({status}): {message}")]
    RequestRejected {
        /// HTTP status code.
        status: u16,
        /// Response body excerpt.
        message: String,
    },

    /// The endpoint answered with an unparseable or incomplete body.
    #[error("invalid embedding response: {message}")]
    InvalidResponse {
        /// Parse failure description.
        message: String,
    },

    /// The endpoint returned a different number of vectors than inputs.
    #[error("embedding count mismatch: expected {expected}, got {actual}")]
    CountMismatch {
        /// Number of input texts.
        expected: usize,
        /// Number of vectors received.
        actual: usize,
    },
}
