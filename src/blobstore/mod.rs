//! Object store integration for uploaded documents.

pub mod client;
pub mod types;

pub use client::BlobStoreService;
pub use types::{AccessHandle, BlobStoreError};
