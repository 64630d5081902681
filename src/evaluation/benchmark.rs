// file: src/evaluation/benchmark.rs
// description: JSONL benchmark loading and result writing

use crate::error::{PipelineError, Result};
use crate::models::{BenchmarkItem, EvaluationRecord};
use std::path::Path;
use tokio::fs;
use tracing::info;

pub fn parse_benchmark(content: &str) -> Result<Vec<BenchmarkItem>> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| {
            serde_json::from_str::<BenchmarkItem>(line).map_err(|e| PipelineError::Benchmark {
                line: idx + 1,
                message: e.to_string(),
            })
        })
        .collect()
}

pub async fn load_benchmark(path: &Path) -> Result<Vec<BenchmarkItem>> {
    let content = fs::read_to_string(path)
        .await
        .map_err(|source| PipelineError::FileOperation {
            path: path.to_path_buf(),
            source,
        })?;

    let items = parse_benchmark(&content)?;
    info!("Loaded {} benchmark items from {}", items.len(), path.display());
    Ok(items)
}

pub async fn write_records(path: &Path, records: &[EvaluationRecord]) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .await
            .map_err(|source| PipelineError::FileOperation {
                path: parent.to_path_buf(),
                source,
            })?;
    }

    let mut output = String::new();
    for record in records {
        output.push_str(&serde_json::to_string(record)?);
        output.push('\n');
    }

    fs::write(path, output)
        .await
        .map_err(|source| PipelineError::FileOperation {
            path: path.to_path_buf(),
            source,
        })?;

    info!("Wrote {} evaluation records to {}", records.len(), path.display());
    Ok(())
}
