//! Ingestion service sequencing storage, extraction, summarization, and indexing.

use crate::{
    blobstore::BlobStoreService,
    config::Config,
    extraction::ExtractionService,
    metrics::{IngestMetrics, MetricsSnapshot},
    pipeline::types::{IngestError, UploadedDocument},
    search::{SearchError, SearchIndexService, SearchRecord},
    summarization::SummarizationService,
};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

/// Validity window for the read handle consumed by the extraction backend.
const ACCESS_HANDLE_TTL_MINUTES: i64 = 10;

/// Coordinates the full ingestion pipeline: persist, extract, summarize, and index.
///
/// The service owns long-lived handles to the four backend gateways and the
/// metrics registry. Construct it once near process start and share it
/// through an `Arc`; each request then runs the stages strictly in sequence
/// on its own task, with no client-side locking around the remote backends.
pub struct IngestionService {
    blob: BlobStoreService,
    extraction: ExtractionService,
    summarization: SummarizationService,
    search_index: SearchIndexService,
    metrics: Arc<IngestMetrics>,
}

/// Abstraction over the document pipeline used by the HTTP surface.
#[async_trait]
pub trait DocumentApi: Send + Sync {
    /// Run the full ingestion sequence and return the generated summary.
    async fn ingest(&self, document: UploadedDocument) -> Result<String, IngestError>;

    /// Execute a free-text query over the indexed summaries.
    async fn search(&self, query: &str) -> Result<Vec<String>, SearchError>;

    /// Retrieve the current metrics snapshot for diagnostics.
    fn metrics_snapshot(&self) -> MetricsSnapshot;
}

impl IngestionService {
    /// Build a new ingestion service from the loaded configuration.
    pub fn new(config: &Config) -> Self {
        Self {
            blob: BlobStoreService::new(config).expect("Failed to initialize object store client"),
            extraction: ExtractionService::new(config)
                .expect("Failed to initialize extraction client"),
            summarization: SummarizationService::new(config)
                .expect("Failed to initialize summarization client"),
            search_index: SearchIndexService::new(config)
                .expect("Failed to initialize search client"),
            metrics: Arc::new(IngestMetrics::new()),
        }
    }

    /// Persist, extract, summarize, provision, and index one document.
    ///
    /// Stages run strictly in order and short-circuit on the first failure;
    /// there is no compensation for stages that already completed. On success
    /// exactly one new record carrying the summary is in the index.
    pub async fn ingest(&self, document: UploadedDocument) -> Result<String, IngestError> {
        if document.file_name.trim().is_empty() || document.bytes.is_empty() {
            return Err(IngestError::InvalidInput);
        }

        tracing::info!(
            file = %document.file_name,
            bytes = document.bytes.len(),
            "Ingesting document"
        );

        self.blob.ensure_container().await?;
        self.blob
            .upload_document(&document.file_name, document.bytes)
            .await?;
        let handle = self
            .blob
            .generate_read_handle(&document.file_name, ACCESS_HANDLE_TTL_MINUTES)?;
        tracing::debug!(file = %document.file_name, expires_at = %handle.expires_at, "Derived read handle");

        let text = self.extraction.extract_text(&handle).await?;
        tracing::debug!(file = %document.file_name, chars = text.len(), "Extracted document text");

        let summary = self.summarization.summarize(&text).await?;

        self.search_index.ensure_index().await?;
        let record = SearchRecord {
            id: Uuid::new_v4().to_string(),
            content: summary.clone(),
        };
        self.search_index.upload_record(&record).await?;

        self.metrics.record_document();
        tracing::info!(file = %document.file_name, record = %record.id, "Document ingested");
        Ok(summary)
    }

    /// Query the summary index and project each hit's content field.
    ///
    /// Records without a non-empty `content` string are dropped; the rest
    /// keep the backend's ranking order.
    pub async fn search(&self, query: &str) -> Result<Vec<String>, SearchError> {
        let records = self.search_index.query(query).await?;
        let results: Vec<String> = records
            .into_iter()
            .filter_map(|record| {
                record
                    .get("content")
                    .and_then(Value::as_str)
                    .map(str::to_string)
            })
            .filter(|content| !content.is_empty())
            .collect();

        self.metrics.record_search();
        tracing::info!(query, results = results.len(), "Search completed");
        Ok(results)
    }

    /// Return the current activity counters.
    pub fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}

#[async_trait]
impl DocumentApi for IngestionService {
    async fn ingest(&self, document: UploadedDocument) -> Result<String, IngestError> {
        IngestionService::ingest(self, document).await
    }

    async fn search(&self, query: &str) -> Result<Vec<String>, SearchError> {
        IngestionService::search(self, query).await
    }

    fn metrics_snapshot(&self) -> MetricsSnapshot {
        IngestionService::metrics_snapshot(self)
    }
}
