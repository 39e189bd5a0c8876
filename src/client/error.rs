//! Client error type

use thiserror::Error;

/// Errors surfaced by the feed client
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport or decoding failure
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered 404
    #[error("Resource not found")]
    NotFound,

    /// The server answered 401
    #[error("Authentication required")]
    Unauthorized,

    /// Any other non-success status
    #[error("Server returned {status}: {message}")]
    Status { status: u16, message: String },

    /// The same mutation is already running for this item
    #[error("A request for this item is already pending")]
    AlreadyPending,

    /// The configured base URL cannot be used
    #[error("Invalid base URL: {0}")]
    InvalidUrl(String),
}
