//! HTTP client wrapper for the content-extraction backend.
//!
//! Extraction is asynchronous on the backend side: submitting a document
//! returns an operation location, which is followed at a fixed interval until
//! the backend reports a terminal status. The caller simply awaits the whole
//! exchange; no timeout is imposed here beyond the access handle's own expiry.

use crate::blobstore::AccessHandle;
use crate::config::Config;
use crate::extraction::types::{AnalyzeOperation, AnalyzeResult, ExtractionError};
use reqwest::{Client, StatusCode, header::HeaderMap};
use serde_json::json;
use std::time::Duration;

/// Analysis profile requesting plain text lines without layout features.
const READ_TEXT_PROFILE: &str = "read-text";

/// Lightweight HTTP client for document analysis operations.
pub struct ExtractionService {
    pub(crate) client: Client,
    pub(crate) base_url: String,
    pub(crate) api_key: String,
    pub(crate) poll_interval: Duration,
}

impl ExtractionService {
    /// Construct a new client from the loaded configuration.
    pub fn new(config: &Config) -> Result<Self, ExtractionError> {
        let client = Client::builder().user_agent("docsum/0.1").build()?;
        Ok(Self {
            client,
            base_url: config.extraction_endpoint.trim_end_matches('/').to_string(),
            api_key: config.extraction_api_key.clone(),
            poll_interval: Duration::from_millis(500),
        })
    }

    /// Submit the readable reference for analysis and await the extracted text.
    ///
    /// All lines across all pages are concatenated in document order,
    /// separated by single spaces. A document with no recognized lines yields
    /// an empty string, not an error.
    pub async fn extract_text(&self, handle: &AccessHandle) -> Result<String, ExtractionError> {
        let location = self.submit(handle).await?;

        loop {
            let operation = self.fetch_operation(&location).await?;
            match operation.status.as_str() {
                "succeeded" => {
                    let text = flatten_lines(operation.result);
                    tracing::debug!(chars = text.len(), "Document analysis succeeded");
                    return Ok(text);
                }
                "failed" => {
                    let detail = operation
                        .error
                        .map(|error| error.message)
                        .unwrap_or_else(|| "no detail provided".to_string());
                    let error = ExtractionError::AnalysisFailed(detail);
                    tracing::error!(error = %error, "Document analysis failed");
                    return Err(error);
                }
                status => {
                    tracing::debug!(status, "Analysis still in progress");
                    tokio::time::sleep(self.poll_interval).await;
                }
            }
        }
    }

    async fn submit(&self, handle: &AccessHandle) -> Result<String, ExtractionError> {
        let body = json!({
            "source": handle.url,
            "profile": READ_TEXT_PROFILE,
        });

        let response = self
            .client
            .post(format!("{}/analyze", self.base_url))
            .header("api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let error = ExtractionError::UnexpectedStatus { status, body };
            tracing::error!(error = %error, "Failed to submit document for analysis");
            return Err(error);
        }

        operation_location(response.headers())
    }

    async fn fetch_operation(&self, location: &str) -> Result<AnalyzeOperation, ExtractionError> {
        let response = self
            .client
            .get(location)
            .header("api-key", &self.api_key)
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => Ok(response.json().await?),
            status => {
                let body = response.text().await.unwrap_or_default();
                let error = ExtractionError::UnexpectedStatus { status, body };
                tracing::error!(error = %error, "Failed to poll analysis operation");
                Err(error)
            }
        }
    }
}

fn operation_location(headers: &HeaderMap) -> Result<String, ExtractionError> {
    headers
        .get("operation-location")
        .and_then(|value| value.to_str().ok())
        .map(|value| value.to_string())
        .ok_or(ExtractionError::MissingOperationLocation)
}

fn flatten_lines(result: Option<AnalyzeResult>) -> String {
    let Some(result) = result else {
        return String::new();
    };

    result
        .pages
        .iter()
        .flat_map(|page| page.lines.iter())
        .map(|line| line.content.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}
