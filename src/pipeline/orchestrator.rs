// file: src/pipeline/orchestrator.rs
// description: coordinates scanning, concurrent per-file indexing and archiving
// reference: orchestrates asynchronous ingestion workflow

use crate::config::Config;
use crate::error::Result;
use crate::pipeline::processor::FileProcessor;
use crate::pipeline::progress::{PipelineStats, ProgressTracker};
use crate::search::{OpenSearchClient, SchemaManager};
use crate::source::{ProcessedArchive, SnapshotFile, SnapshotScanner};
use crate::utils::format_duration;
use futures::stream::{self, StreamExt};
use std::time::Duration;
use tracing::{error, info, warn};

pub struct IndexingPipeline {
    config: Config,
    client: OpenSearchClient,
    processor: FileProcessor,
    archive: ProcessedArchive,
    max_concurrent_tasks: usize,
    colored: bool,
}

impl IndexingPipeline {
    pub fn new(config: Config, colored: bool) -> Result<Self> {
        let client = OpenSearchClient::new(config.opensearch.clone())?;
        let processor = FileProcessor::new(client.clone(), &config);
        let archive = ProcessedArchive::new(config.pipeline.processed_dir());
        let max_concurrent_tasks = config.pipeline.parallel_workers.max(1);

        Ok(Self {
            config,
            client,
            processor,
            archive,
            max_concurrent_tasks,
            colored,
        })
    }

    pub async fn run(&self, limit: Option<usize>) -> Result<PipelineStats> {
        let index = &self.config.index.name;
        info!(
            "Indexing {} into '{}'",
            self.config.pipeline.input_dir.display(),
            index
        );

        SchemaManager::new(&self.client, &self.config.index)
            .initialize()
            .await?;
        self.archive.ensure().await?;

        let mut files = self.scan_files().await?;
        if let Some(limit) = limit {
            files.truncate(limit);
        }
        info!("Found {} files to process", files.len());

        if files.is_empty() {
            warn!("No files found to process");
            return Ok(PipelineStats::new());
        }

        let progress = ProgressTracker::with_color(files.len(), self.colored);

        info!(
            "Processing files with {} concurrent tasks...",
            self.max_concurrent_tasks
        );

        stream::iter(files)
            .map(|file| self.process_file(file, &progress))
            .buffer_unordered(self.max_concurrent_tasks)
            .collect::<Vec<()>>()
            .await;

        if let Err(e) = self.client.refresh(index).await {
            warn!("Failed to refresh index '{}': {}", index, e);
        }

        let stats = progress.get_stats();
        progress.finish();
        self.log_final_stats(&stats);

        Ok(stats)
    }

    async fn scan_files(&self) -> Result<Vec<SnapshotFile>> {
        let input_dir = self.config.pipeline.input_dir.clone();
        let pipeline_config = self.config.pipeline.clone();

        tokio::task::spawn_blocking(move || {
            SnapshotScanner::new(pipeline_config).scan_directory(&input_dir)
        })
        .await?
    }

    /// Indexes one file and moves it to the processed directory. Failures are
    /// logged and counted, never propagated, so the run moves on.
    async fn process_file(&self, file: SnapshotFile, progress: &ProgressTracker) {
        progress.set_message(format!("Indexing {}", file.file_name));

        let result = match self.processor.process(&file).await {
            Ok(outcome) => self.archive.archive(&file.path).await.map(|_| outcome),
            Err(e) => Err(e),
        };

        match result {
            Ok(outcome) => {
                progress.add_articles(outcome.articles_indexed);
                progress.add_deletions(outcome.deletions_applied);
                progress.add_bytes_processed(file.size);
                progress.inc_files_processed();

                if outcome.deletions_skipped > 0 {
                    warn!(
                        "{}: skipped {} delete citations (enable apply_deletions to remove them)",
                        file.file_name, outcome.deletions_skipped
                    );
                }

                info!(
                    "{}",
                    completion_line(&file.file_name, progress.progress_percent(), progress.eta())
                );
            }
            Err(e) => {
                progress.inc_files_failed();
                error!("Error processing file {}: {}", file.file_name, e);
            }
        }
    }

    fn log_final_stats(&self, stats: &PipelineStats) {
        info!("=== Indexing Summary ===");
        info!("Index: {}", self.config.index.name);
        info!(
            "Total time: {}",
            format_duration(Duration::from_secs(stats.duration_secs))
        );
        info!("Files indexed: {}", stats.files_processed);
        info!("Files failed: {}", stats.files_failed);
        info!("Success rate: {:.2}%", stats.success_rate());
        info!("Articles indexed: {}", stats.articles_indexed);
        info!("Deletions applied: {}", stats.deletions_applied);
        info!(
            "Processing speed: {:.2} articles/sec, {:.3} files/sec",
            stats.articles_per_second(),
            stats.files_per_second()
        );
        info!(
            "Throughput: {:.2} MB/sec (compressed)",
            stats.bytes_per_second() / 1_048_576.0
        );
        info!("========================");
    }
}

pub fn completion_line(file_name: &str, percent: f64, eta: Option<Duration>) -> String {
    format!(
        "Completed indexing {}. Progress: {:.2}%. Estimated time left: {}",
        file_name,
        percent,
        eta.map(format_duration)
            .unwrap_or_else(|| "unknown".to_string())
    )
}
