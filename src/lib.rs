// file: src/lib.rs
// description: library entry point and public api exports
// reference: rust library patterns
#![doc = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/readme.md"))]

pub mod config;
pub mod error;
pub mod evaluation;
pub mod models;
pub mod parser;
pub mod pipeline;
pub mod search;
pub mod source;
pub mod utils;

pub use config::{Config, EvaluationConfig, IndexConfig, LlmConfig, OpenSearchConfig, PipelineConfig};
pub use error::{PipelineError, Result};
pub use evaluation::{ChatClient, Evaluator, load_benchmark};
pub use models::{Article, BenchmarkItem, EvaluationRecord, EvaluationSummary, ParsedFile, SearchHit};
pub use parser::{PubmedParser, Record, RecordReader};
pub use pipeline::{FileProcessor, IndexingPipeline, PipelineStats, ProgressTracker};
pub use search::{BulkIndexer, BulkStats, OpenSearchClient, SchemaManager};
pub use source::{ProcessedArchive, SnapshotFile, SnapshotScanner};
pub use utils::{HealthCheck, HealthReport, HealthStatus, OperationTimer, Validator};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        let config = Config::default_config();
        let _parser = PubmedParser::new();
        let _scanner = SnapshotScanner::new(config.pipeline.clone());
        assert!(OpenSearchClient::new(config.opensearch).is_ok());
    }
}
