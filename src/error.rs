// file: src/error.rs
// description: Custom error types and result type aliases
// reference: https://docs.rs/thiserror

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PipelineError>;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("File operation failed for {path}: {source}")]
    FileOperation {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("XML error: {0}")]
    Xml(String),

    #[error("Root element is not 'PubmedArticleSet' (found '{0}')")]
    UnexpectedRoot(String),

    #[error("Unexpected element '{0}' in PubmedArticleSet")]
    UnexpectedRecord(String),

    #[error("Element '{tag}' has no pmid")]
    MissingPmid { tag: String },

    #[error("Search cluster error: {0}")]
    Search(String),

    #[error("Bulk request had {failed} failed item(s), first error: {first_error}")]
    Bulk { failed: usize, first_error: String },

    #[error("LLM request failed: {0}")]
    Llm(String),

    #[error("Benchmark line {line}: {message}")]
    Benchmark { line: usize, message: String },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl From<quick_xml::Error> for PipelineError {
    fn from(err: quick_xml::Error) -> Self {
        PipelineError::Xml(err.to_string())
    }
}

impl From<serde_json::Error> for PipelineError {
    fn from(err: serde_json::Error) -> Self {
        PipelineError::Serialization(err.to_string())
    }
}
