// file: src/source/scanner.rs
// description: Discovery of downloaded baseline/update snapshot files
// reference: https://docs.rs/walkdir

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::utils::Validator;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

pub struct SnapshotScanner {
    config: PipelineConfig,
}

#[derive(Debug, Clone)]
pub struct SnapshotFile {
    pub path: PathBuf,
    pub file_name: String,
    pub size: u64,
}

impl SnapshotScanner {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Lists matching files directly under `root`, ordered by name so that
    /// numbered update files are applied in publication order.
    pub fn scan_directory(&self, root: &Path) -> Result<Vec<SnapshotFile>> {
        Validator::validate_directory(root)?;
        info!("Scanning directory: {}", root.display());

        let mut files = Vec::new();

        for entry in WalkDir::new(root)
            .min_depth(1)
            .max_depth(1)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            if !entry.file_type().is_file() {
                continue;
            }

            let file_name = entry.file_name().to_string_lossy().to_string();

            if !self.matches(&file_name) {
                debug!("Skipping file: {}", entry.path().display());
                continue;
            }

            let size = entry.metadata().map(|m| m.len()).unwrap_or(0);

            files.push(SnapshotFile {
                path: entry.path().to_path_buf(),
                file_name,
                size,
            });
        }

        info!("Found {} snapshot files", files.len());
        Ok(files)
    }

    fn matches(&self, file_name: &str) -> bool {
        !file_name.starts_with('.') && file_name.ends_with(&self.config.file_suffix)
    }
}
