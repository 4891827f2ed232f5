//! Shared types used by the content-extraction gateway.

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// Errors returned while interacting with the extraction backend.
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// Base URL failed to parse or normalize.
    #[error("Invalid extraction URL: {0}")]
    InvalidUrl(String),
    /// HTTP layer failed before receiving a response.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// Extraction backend responded with an unexpected status code.
    #[error("Unexpected extraction response ({status}): {body}")]
    UnexpectedStatus {
        /// HTTP status returned from the backend.
        status: StatusCode,
        /// Body payload associated with the failing response.
        body: String,
    },
    /// Analysis was accepted but no operation location was returned to follow.
    #[error("Extraction backend did not return an operation location")]
    MissingOperationLocation,
    /// Backend reported the analysis operation itself as failed.
    #[error("Document analysis failed: {0}")]
    AnalysisFailed(String),
}

/// Status document returned while an analysis operation is in flight.
#[derive(Deserialize)]
pub(crate) struct AnalyzeOperation {
    pub(crate) status: String,
    #[serde(default)]
    pub(crate) error: Option<OperationError>,
    #[serde(default)]
    pub(crate) result: Option<AnalyzeResult>,
}

#[derive(Deserialize)]
pub(crate) struct OperationError {
    pub(crate) message: String,
}

#[derive(Deserialize)]
pub(crate) struct AnalyzeResult {
    #[serde(default)]
    pub(crate) pages: Vec<AnalyzePage>,
}

#[derive(Deserialize)]
pub(crate) struct AnalyzePage {
    #[serde(default)]
    pub(crate) lines: Vec<AnalyzeLine>,
}

#[derive(Deserialize)]
pub(crate) struct AnalyzeLine {
    pub(crate) content: String,
}
