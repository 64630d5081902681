// file: src/source/mod.rs
// description: Snapshot file discovery and archiving module exports
// reference: Internal module structure

pub mod archive;
pub mod scanner;

pub use archive::ProcessedArchive;
pub use scanner::{SnapshotFile, SnapshotScanner};
