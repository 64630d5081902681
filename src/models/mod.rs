// file: src/models/mod.rs
// description: data models module exports
// reference: internal module structure

pub mod article;
pub mod benchmark;
pub mod search_result;

pub use article::{Article, ParsedFile};
pub use benchmark::{BenchmarkItem, EvaluationRecord, EvaluationSummary};
pub use search_result::SearchHit;
