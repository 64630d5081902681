// file: src/pipeline/mod.rs
// description: pipeline module exports and public api
// reference: pipeline orchestration

mod orchestrator;
mod processor;
mod progress;

pub use orchestrator::{IndexingPipeline, completion_line};
pub use processor::{FileOutcome, FileProcessor};
pub use progress::{PipelineStats, ProgressTracker, estimate_remaining};
