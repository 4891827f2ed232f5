//! Shared types used by the search backend gateway.

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Errors returned while interacting with the search backend.
///
/// The three `Missing*` variants are configuration errors raised before any
/// remote call, each naming the absent setting; `UnexpectedStatus` carries a
/// backend failure's status code; `Decode` covers malformed result shapes.
#[derive(Debug, Error)]
pub enum SearchError {
    /// `SEARCH_ENDPOINT` is absent or empty.
    #[error("Search endpoint is not configured")]
    MissingEndpoint,
    /// `SEARCH_INDEX_NAME` is absent or empty.
    #[error("Search index name is not configured")]
    MissingIndexName,
    /// `SEARCH_API_KEY` is absent or empty.
    #[error("Search API key is not configured")]
    MissingApiKey,
    /// HTTP layer failed before receiving a response.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// Search backend responded with an unexpected status code.
    #[error("Search request failed with status code {status}: {body}")]
    UnexpectedStatus {
        /// HTTP status returned from the backend.
        status: StatusCode,
        /// Body payload associated with the failing response.
        body: String,
    },
    /// Search results could not be decoded into the expected shape.
    #[error("Error processing search results: {0}")]
    Decode(#[source] reqwest::Error),
}

/// One searchable record: a server-generated id and the summary text.
#[derive(Debug, Clone, Serialize)]
pub struct SearchRecord {
    /// Opaque unique identifier, freshly generated per ingestion.
    pub id: String,
    /// Summary text to make searchable.
    pub content: String,
}

#[derive(Deserialize)]
pub(crate) struct ListIndexesResponse {
    #[serde(default)]
    pub(crate) value: Vec<IndexDescription>,
}

#[derive(Deserialize)]
pub(crate) struct IndexDescription {
    pub(crate) name: String,
}

#[derive(Deserialize)]
pub(crate) struct QueryResponse {
    #[serde(default)]
    pub(crate) value: Vec<Map<String, Value>>,
}
