// file: src/search/mod.rs
// description: search cluster operations module exports
// reference: internal module structure

pub mod bulk;
pub mod client;
pub mod schema;

pub use bulk::{BulkIndexer, BulkStats};
pub use client::OpenSearchClient;
pub use schema::SchemaManager;
