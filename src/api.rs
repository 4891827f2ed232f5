//! HTTP surface for the document summarization service.
//!
//! This module exposes a compact Axum router with three endpoints:
//!
//! - `POST /api/upload` – Accept a multipart file, run the full ingestion
//!   pipeline (persist, extract, summarize, index), and return the summary.
//! - `GET /api/search?q=<text>` – Execute a free-text query over the indexed
//!   summaries and return their content in the backend's ranking order.
//! - `GET /metrics` – Observe ingestion and search counters.
//!
//! Handlers are generic over [`DocumentApi`] so tests can drive the router
//! against a stub service.

use crate::pipeline::{DocumentApi, IngestError, UploadedDocument};
use crate::search::SearchError;
use axum::{
    Json, Router,
    extract::{Multipart, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Build the HTTP router exposing the upload and search API surface.
pub fn create_router<S>(service: Arc<S>) -> Router
where
    S: DocumentApi + 'static,
{
    Router::new()
        .route("/api/upload", post(upload_document::<S>))
        .route("/api/search", get(search_documents::<S>))
        .route("/metrics", get(get_metrics::<S>))
        .with_state(service)
}

/// Success response for the `POST /api/upload` endpoint.
#[derive(Serialize)]
struct UploadResponse {
    /// Machine-generated summary of the uploaded document.
    summary: String,
}

/// Ingest an uploaded document and return its summary.
async fn upload_document<S>(
    State(service): State<Arc<S>>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError>
where
    S: DocumentApi,
{
    let document = read_document(&mut multipart).await?;
    let file = document.file_name.clone();
    let summary = service.ingest(document).await.map_err(AppError::Ingest)?;
    tracing::info!(file, "Upload request completed");
    Ok(Json(UploadResponse { summary }))
}

/// Pull the uploaded file out of the multipart body.
///
/// The first field carrying a filename (or explicitly named `file`) wins;
/// anything else is skipped. A body with no such field is a bad request.
async fn read_document(multipart: &mut Multipart) -> Result<UploadedDocument, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| AppError::BadRequest(format!("Malformed multipart body: {err}")))?
    {
        if field.file_name().is_none() && field.name() != Some("file") {
            continue;
        }

        let file_name = field.file_name().unwrap_or("document").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|err| AppError::BadRequest(format!("Failed to read file body: {err}")))?;

        return Ok(UploadedDocument {
            file_name,
            bytes: bytes.to_vec(),
        });
    }

    Err(AppError::BadRequest("No file uploaded".to_string()))
}

/// Query parameters for the `GET /api/search` endpoint.
#[derive(Deserialize)]
struct SearchParams {
    /// Free-text query; absent means match everything.
    #[serde(default)]
    q: String,
}

/// Success response for the `GET /api/search` endpoint.
#[derive(Serialize)]
struct SearchResponse {
    /// Projected summary texts in the backend's ranking order.
    results: Vec<String>,
}

/// Run a free-text query over the indexed summaries.
async fn search_documents<S>(
    State(service): State<Arc<S>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, AppError>
where
    S: DocumentApi,
{
    let results = service.search(&params.q).await.map_err(AppError::Search)?;
    Ok(Json(SearchResponse { results }))
}

/// Return a concise metrics snapshot with ingestion and search counters.
async fn get_metrics<S>(State(service): State<Arc<S>>) -> Json<crate::metrics::MetricsSnapshot>
where
    S: DocumentApi,
{
    Json(service.metrics_snapshot())
}

/// Error envelope translating pipeline failures into HTTP responses.
enum AppError {
    /// Request was malformed before the pipeline ran.
    BadRequest(String),
    /// Ingestion pipeline failed at some stage.
    Ingest(IngestError),
    /// Search configuration or backend failed.
    Search(SearchError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            Self::Ingest(IngestError::InvalidInput) => (
                StatusCode::BAD_REQUEST,
                IngestError::InvalidInput.to_string(),
            ),
            Self::Ingest(error) => {
                tracing::error!(error = %error, "Ingestion failed");
                (StatusCode::INTERNAL_SERVER_ERROR, error.to_string())
            }
            Self::Search(error) => {
                tracing::error!(error = %error, "Search failed");
                (StatusCode::INTERNAL_SERVER_ERROR, error.to_string())
            }
        };
        (status, message).into_response()
    }
}
