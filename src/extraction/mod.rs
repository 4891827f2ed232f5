//! Content-extraction backend integration.

pub mod client;
pub mod types;

pub use client::ExtractionService;
pub use types::ExtractionError;
