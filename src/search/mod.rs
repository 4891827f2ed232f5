//! Search backend integration: index provisioning, record upload, and queries.

pub mod client;
pub mod types;

pub use client::SearchIndexService;
pub use types::{SearchError, SearchRecord};
