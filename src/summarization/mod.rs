//! Chat-completion backend integration for document summarization.
//!
//! The client mirrors the other gateways by issuing HTTP requests directly to
//! the completion service: a fixed system instruction plus a user message
//! wrapping the extracted text, taking the first returned choice as the
//! summary.

use crate::config::Config;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

/// System instruction sent with every summarization request.
const SYSTEM_INSTRUCTION: &str = "You are a helpful assistant that summarizes documents.";

/// Errors surfaced while requesting a summary from the completion backend.
#[derive(Debug, Error)]
pub enum SummarizationError {
    /// HTTP layer failed before receiving a response.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// Completion backend responded with an unexpected status code.
    #[error("Unexpected completion response ({status}): {body}")]
    UnexpectedStatus {
        /// HTTP status returned from the backend.
        status: reqwest::StatusCode,
        /// Body payload associated with the failing response.
        body: String,
    },
    /// Backend answered successfully but returned no choices.
    #[error("Completion backend returned no choices")]
    EmptyCompletion,
}

/// Lightweight HTTP client for the chat-completion backend.
pub struct SummarizationService {
    pub(crate) client: Client,
    pub(crate) base_url: String,
    pub(crate) api_key: String,
    pub(crate) deployment: String,
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Deserialize)]
struct CompletionMessage {
    content: String,
}

impl SummarizationService {
    /// Construct a new client from the loaded configuration.
    pub fn new(config: &Config) -> Result<Self, SummarizationError> {
        let client = Client::builder().user_agent("docsum/0.1").build()?;
        Ok(Self {
            client,
            base_url: config.completion_endpoint.trim_end_matches('/').to_string(),
            api_key: config.completion_api_key.clone(),
            deployment: config.completion_deployment.clone(),
        })
    }

    /// Request a summary of the extracted text, returning the first choice.
    ///
    /// An empty input text is submitted as-is; whether anything useful comes
    /// back is the model's business, not ours.
    pub async fn summarize(&self, text: &str) -> Result<String, SummarizationError> {
        let body = json!({
            "model": self.deployment,
            "messages": [
                { "role": "system", "content": SYSTEM_INSTRUCTION },
                { "role": "user", "content": format!("Summarize the following document: {text}") }
            ]
        });

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let error = SummarizationError::UnexpectedStatus { status, body };
            tracing::error!(error = %error, "Completion request failed");
            return Err(error);
        }

        let completion: CompletionResponse = response.json().await?;
        let summary = completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or(SummarizationError::EmptyCompletion)?;

        tracing::debug!(chars = summary.len(), "Summary generated");
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::{Method::POST, MockServer};

    fn service(base_url: String) -> SummarizationService {
        SummarizationService {
            client: Client::builder()
                .user_agent("docsum-test")
                .build()
                .expect("client"),
            base_url,
            api_key: "completion-key".into(),
            deployment: "summarizer-4o".into(),
        }
    }

    #[tokio::test]
    async fn sends_system_and_user_messages_and_takes_first_choice() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/chat/completions")
                    .header("api-key", "completion-key")
                    .json_body(json!({
                        "model": "summarizer-4o",
                        "messages": [
                            { "role": "system", "content": "You are a helpful assistant that summarizes documents." },
                            { "role": "user", "content": "Summarize the following document: Q3 revenue grew 10%." }
                        ]
                    }));
                then.status(200).json_body(json!({
                    "choices": [
                        { "message": { "content": "Revenue grew 10% in Q3." } },
                        { "message": { "content": "A second, ignored choice." } }
                    ]
                }));
            })
            .await;

        let service = service(server.base_url());
        let summary = service
            .summarize("Q3 revenue grew 10%.")
            .await
            .expect("summary");

        mock.assert();
        assert_eq!(summary, "Revenue grew 10% in Q3.");
    }

    #[tokio::test]
    async fn empty_extracted_text_is_still_submitted() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/chat/completions")
                    .body_contains("Summarize the following document: ");
                then.status(200).json_body(json!({
                    "choices": [ { "message": { "content": "Nothing to summarize." } } ]
                }));
            })
            .await;

        let service = service(server.base_url());
        let summary = service.summarize("").await.expect("summary");
        mock.assert();
        assert_eq!(summary, "Nothing to summarize.");
    }

    #[tokio::test]
    async fn missing_choices_is_an_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/chat/completions");
                then.status(200).json_body(json!({ "choices": [] }));
            })
            .await;

        let service = service(server.base_url());
        let error = service.summarize("text").await.expect_err("no choices");
        assert!(matches!(error, SummarizationError::EmptyCompletion));
    }

    #[tokio::test]
    async fn backend_failure_carries_status_and_body() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/chat/completions");
                then.status(429).body("rate limited");
            })
            .await;

        let service = service(server.base_url());
        let error = service.summarize("text").await.expect_err("429 must fail");
        match error {
            SummarizationError::UnexpectedStatus { status, body } => {
                assert_eq!(status.as_u16(), 429);
                assert_eq!(body, "rate limited");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
