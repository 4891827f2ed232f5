//! Core data types and error definitions for the ingestion pipeline.

use crate::blobstore::BlobStoreError;
use crate::extraction::ExtractionError;
use crate::search::SearchError;
use crate::summarization::SummarizationError;
use thiserror::Error;

/// Errors emitted by the ingestion pipeline, one variant per stage.
///
/// Every remote failure aborts the remaining stages; nothing earlier is
/// rolled back, so an object persisted before a later failure stays in the
/// store. The variant order mirrors the stage order.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Request carried no document; rejected before any remote call.
    #[error("No file uploaded")]
    InvalidInput,
    /// Persisting the document (or deriving its read handle) failed.
    #[error("Object storage error: {0}")]
    Storage(#[from] BlobStoreError),
    /// Text extraction failed.
    #[error("Text extraction error: {0}")]
    Extraction(#[from] ExtractionError),
    /// Summarization failed.
    #[error("Summarization error: {0}")]
    Summarization(#[from] SummarizationError),
    /// Index provisioning or the record upload failed.
    #[error("Search indexing error: {0}")]
    Indexing(#[from] SearchError),
}

/// Document accepted for ingestion: raw bytes plus the client-supplied name.
///
/// The name is used verbatim as the object store key; uploading the same
/// name twice overwrites the stored bytes (last writer wins).
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    /// Client-supplied filename.
    pub file_name: String,
    /// Raw document bytes.
    pub bytes: Vec<u8>,
}
