// file: src/source/archive.rs
// description: Moves fully indexed snapshot files out of the input directory
// reference: https://docs.rs/tokio/latest/tokio/fs/

use crate::error::{PipelineError, Result};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct ProcessedArchive {
    dir: PathBuf,
}

impl ProcessedArchive {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub async fn ensure(&self) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| PipelineError::FileOperation {
                path: self.dir.clone(),
                source,
            })
    }

    /// Moves `path` into the archive directory and returns its new location.
    pub async fn archive(&self, path: &Path) -> Result<PathBuf> {
        let file_name = path.file_name().ok_or_else(|| {
            PipelineError::Validation(format!("Path has no file name: {}", path.display()))
        })?;

        self.ensure().await?;
        let destination = self.dir.join(file_name);

        if let Err(rename_err) = fs::rename(path, &destination).await {
            // rename fails across filesystems, copy then remove instead
            debug!(
                "Rename of {} failed ({}), falling back to copy",
                path.display(),
                rename_err
            );
            fs::copy(path, &destination)
                .await
                .map_err(|source| PipelineError::FileOperation {
                    path: path.to_path_buf(),
                    source,
                })?;
            fs::remove_file(path)
                .await
                .map_err(|source| PipelineError::FileOperation {
                    path: path.to_path_buf(),
                    source,
                })?;
        }

        info!("Moved processed file to {}", destination.display());
        Ok(destination)
    }
}
