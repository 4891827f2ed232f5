use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters describing ingestion and search activity.
#[derive(Default)]
pub struct IngestMetrics {
    documents_ingested: AtomicU64,
    searches_served: AtomicU64,
}

impl IngestMetrics {
    /// Create an empty metrics accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one fully ingested document.
    pub fn record_document(&self) {
        self.documents_ingested.fetch_add(1, Ordering::Relaxed);
    }

    /// Record one served search query.
    pub fn record_search(&self) {
        self.searches_served.fetch_add(1, Ordering::Relaxed);
    }

    /// Return a snapshot of the current counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            documents_ingested: self.documents_ingested.load(Ordering::Relaxed),
            searches_served: self.searches_served.load(Ordering::Relaxed),
        }
    }
}

/// Immutable view of activity counters used for reporting.
#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct MetricsSnapshot {
    /// Number of documents fully ingested since startup.
    pub documents_ingested: u64,
    /// Number of search queries served since startup.
    pub searches_served: u64,
}
