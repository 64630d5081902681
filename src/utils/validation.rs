// file: src/utils/validation.rs
// description: data validation utilities and helpers
// reference: input validation patterns

use crate::error::{PipelineError, Result};
use std::path::Path;

/// Characters OpenSearch refuses in index names.
const INVALID_INDEX_CHARS: [char; 11] = [' ', '\\', '/', '*', '?', '"', '<', '>', '|', ',', '#'];

pub struct Validator;

impl Validator {
    pub fn validate_directory(path: &Path) -> Result<()> {
        if !path.exists() {
            return Err(PipelineError::Validation(format!(
                "Directory does not exist: {}",
                path.display()
            )));
        }

        if !path.is_dir() {
            return Err(PipelineError::Validation(format!(
                "Path is not a directory: {}",
                path.display()
            )));
        }

        Ok(())
    }

    pub fn validate_file(path: &Path) -> Result<()> {
        if !path.is_file() {
            return Err(PipelineError::Validation(format!(
                "Path is not a file: {}",
                path.display()
            )));
        }
        Ok(())
    }

    pub fn validate_index_name(name: &str) -> Result<()> {
        if name.is_empty() {
            return Err(PipelineError::Validation("Index name is empty".to_string()));
        }

        if name.starts_with(['_', '-', '+']) {
            return Err(PipelineError::Validation(format!(
                "Index name cannot start with '_', '-' or '+': {}",
                name
            )));
        }

        if name.chars().any(|c| c.is_uppercase() || INVALID_INDEX_CHARS.contains(&c)) {
            return Err(PipelineError::Validation(format!(
                "Index name must be lowercase without spaces or special characters: {}",
                name
            )));
        }

        Ok(())
    }

    pub fn validate_url(url: &str) -> Result<()> {
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(PipelineError::Validation(format!(
                "Invalid URL format: {}",
                url
            )));
        }
        Ok(())
    }

    pub fn validate_port(port: u16) -> Result<()> {
        if port == 0 {
            return Err(PipelineError::Validation("Port cannot be 0".to_string()));
        }
        Ok(())
    }

    pub fn validate_batch_size(size: usize) -> Result<()> {
        if size == 0 {
            return Err(PipelineError::Validation(
                "Batch size must be greater than 0".to_string(),
            ));
        }

        if size > 10000 {
            return Err(PipelineError::Validation(
                "Batch size too large (max 10000)".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_validate_directory() {
        let temp = TempDir::new().unwrap();
        assert!(Validator::validate_directory(temp.path()).is_ok());
        assert!(Validator::validate_directory(Path::new("/nonexistent")).is_err());

        let file = temp.path().join("file.xml.gz");
        std::fs::write(&file, b"x").unwrap();
        assert!(Validator::validate_directory(&file).is_err());
        assert!(Validator::validate_file(&file).is_ok());
    }

    #[test]
    fn test_validate_index_name() {
        assert!(Validator::validate_index_name("pubmed").is_ok());
        assert!(Validator::validate_index_name("pubmed_update").is_ok());
        assert!(Validator::validate_index_name("").is_err());
        assert!(Validator::validate_index_name("PubMed").is_err());
        assert!(Validator::validate_index_name("_pubmed").is_err());
        assert!(Validator::validate_index_name("pub med").is_err());
        assert!(Validator::validate_index_name("pub/med").is_err());
    }

    #[test]
    fn test_validate_url() {
        assert!(Validator::validate_url("https://api.openai.com/v1").is_ok());
        assert!(Validator::validate_url("http://localhost:8000/v1").is_ok());
        assert!(Validator::validate_url("api.openai.com").is_err());
    }

    #[test]
    fn test_validate_batch_size() {
        assert!(Validator::validate_batch_size(50).is_ok());
        assert!(Validator::validate_batch_size(0).is_err());
        assert!(Validator::validate_batch_size(10001).is_err());
    }

    #[test]
    fn test_validate_port() {
        assert!(Validator::validate_port(9200).is_ok());
        assert!(Validator::validate_port(0).is_err());
    }
}
