//! Error types for multipart operations.

/// Result type alias for multipart operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Multipart error types.
///
/// Encoding with [`encode`](crate::encode) never fails; these errors come from
/// parsing a body back or from [`encode_checked`](crate::encode_checked).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid part header.
    #[error("Invalid part header: {0}")]
    InvalidHeader(String),

    /// Invalid content type.
    #[error("Invalid content type: {0}")]
    InvalidContentType(String),

    /// Invalid parameter encoding.
    #[error("Invalid encoding: {0}")]
    InvalidEncoding(String),

    /// Missing boundary in a multipart content type.
    #[error("Missing boundary in multipart content type")]
    MissingBoundary,

    /// Invalid multipart structure.
    #[error("Invalid multipart structure: {0}")]
    InvalidMultipart(String),

    /// Every generated boundary appeared inside the payload.
    #[error("Boundary collided with payload after {attempts} attempts")]
    BoundaryCollision {
        /// Number of boundaries tried.
        attempts: usize,
    },
}
