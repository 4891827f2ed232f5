//! Ingestion pipeline: storage, extraction, summarization, and indexing orchestration.

mod service;
pub mod types;

pub use service::{DocumentApi, IngestionService};
pub use types::{IngestError, UploadedDocument};
