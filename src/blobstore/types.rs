//! Shared types used by the object store gateway.

use reqwest::StatusCode;
use thiserror::Error;
use time::OffsetDateTime;

/// Errors returned while interacting with the object store.
#[derive(Debug, Error)]
pub enum BlobStoreError {
    /// Base URL failed to parse or normalize.
    #[error("Invalid object store URL: {0}")]
    InvalidUrl(String),
    /// HTTP layer failed before receiving a response.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// Object store responded with an unexpected status code.
    #[error("Unexpected object store response ({status}): {body}")]
    UnexpectedStatus {
        /// HTTP status returned from the store.
        status: StatusCode,
        /// Body payload associated with the failing response.
        body: String,
    },
    /// Access handle expiry could not be rendered as RFC3339.
    #[error("Failed to format access handle expiry: {0}")]
    ExpiryFormat(#[from] time::error::Format),
}

/// Read-only, time-limited reference to a stored object.
///
/// The URL embeds the expiry and a signature over the store's account key;
/// it is handed to the extraction backend and never persisted.
#[derive(Debug, Clone)]
pub struct AccessHandle {
    /// Fully-qualified URL granting read access until the expiry.
    pub url: String,
    /// Instant at which the handle stops being honored.
    pub expires_at: OffsetDateTime,
}
