use thiserror::Error;

#[derive(Debug, Error)]
/// Errors returned by the image-extraction collaborator.
pub enum ExtractionError {
    /// No API key was configured; the client cannot make calls.
    #[error("extraction client not configured: missing API key")]
    NotConfigured,

    /// The endpoint could not be reached at the network level.
    #[error("extraction service unreachable: {message}")]
    ServiceUnreachable {
        /// Transport-level error message.
        message: String,
    },

    /// The endpoint answered with a non-success status.
    #[error("extraction service rejected request ({status}): {message}")]
    RequestRejected {
        /// HTTP status code.
        status: u16,
        /// Response body excerpt.
        message: String,
    },

    /// The model answered, but with nothing parseable as a product list.
    #[error("unparseable extraction response: {message}")]
    InvalidResponse {
        /// Parse failure description.
        message: String,
    },

    /// A single extracted record failed ingress validation.
    #[error("invalid extracted record: {reason}")]
    InvalidRecord {
        /// Validation failure description.
        reason: String,
    },
}
