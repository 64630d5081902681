// file: src/pipeline/progress.rs
// description: progress tracking and statistics reporting for indexing runs
// reference: uses indicatif for progress bars and tracks processing metrics

use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Default)]
pub struct PipelineStats {
    pub files_processed: usize,
    pub files_failed: usize,
    pub articles_indexed: usize,
    pub deletions_applied: usize,
    pub total_bytes_processed: u64,
    pub duration_secs: u64,
}

impl PipelineStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn files_per_second(&self) -> f64 {
        if self.duration_secs == 0 {
            return 0.0;
        }
        self.files_processed as f64 / self.duration_secs as f64
    }

    pub fn articles_per_second(&self) -> f64 {
        if self.duration_secs == 0 {
            return 0.0;
        }
        self.articles_indexed as f64 / self.duration_secs as f64
    }

    pub fn bytes_per_second(&self) -> f64 {
        if self.duration_secs == 0 {
            return 0.0;
        }
        self.total_bytes_processed as f64 / self.duration_secs as f64
    }

    pub fn success_rate(&self) -> f64 {
        let total = self.files_processed + self.files_failed;
        if total == 0 {
            return 0.0;
        }
        (self.files_processed as f64 / total as f64) * 100.0
    }
}

/// Remaining time assuming every outstanding file takes the average time of
/// the completed ones.
pub fn estimate_remaining(elapsed: Duration, completed: usize, total: usize) -> Option<Duration> {
    if completed == 0 {
        return None;
    }
    let remaining = total.saturating_sub(completed) as u32;
    Some(elapsed / completed as u32 * remaining)
}

/// What the bars count: snapshot files or benchmark items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TrackerKind {
    Indexing,
    Evaluation,
}

pub struct ProgressTracker {
    kind: TrackerKind,
    main_bar: ProgressBar,
    detail_bar: ProgressBar,
    total_files: usize,
    files_processed: Arc<AtomicUsize>,
    files_failed: Arc<AtomicUsize>,
    articles_indexed: Arc<AtomicUsize>,
    deletions_applied: Arc<AtomicUsize>,
    bytes_processed: Arc<AtomicU64>,
    start_time: Instant,
}

impl ProgressTracker {
    pub fn with_color(total_files: usize, colored: bool) -> Self {
        Self::build(TrackerKind::Indexing, MultiProgress::new(), total_files, colored)
    }

    /// Counts answered benchmark items instead of files.
    pub fn for_evaluation(total_items: usize, colored: bool) -> Self {
        Self::build(TrackerKind::Evaluation, MultiProgress::new(), total_items, colored)
    }

    /// Tracker that counts without drawing anything.
    pub fn hidden(total_files: usize) -> Self {
        Self::build(
            TrackerKind::Indexing,
            MultiProgress::with_draw_target(ProgressDrawTarget::hidden()),
            total_files,
            false,
        )
    }

    fn build(
        kind: TrackerKind,
        multi_progress: MultiProgress,
        total_files: usize,
        colored: bool,
    ) -> Self {
        let main_bar = create_progress_bar(&multi_progress, total_files as u64, colored);
        let detail_bar = create_detail_bar(&multi_progress);

        Self {
            kind,
            main_bar,
            detail_bar,
            total_files,
            files_processed: Arc::new(AtomicUsize::new(0)),
            files_failed: Arc::new(AtomicUsize::new(0)),
            articles_indexed: Arc::new(AtomicUsize::new(0)),
            deletions_applied: Arc::new(AtomicUsize::new(0)),
            bytes_processed: Arc::new(AtomicU64::new(0)),
            start_time: Instant::now(),
        }
    }

    pub fn inc_files_processed(&self) {
        self.files_processed.fetch_add(1, Ordering::SeqCst);
        self.main_bar.inc(1);
        self.update_detail_bar();
    }

    pub fn inc_files_failed(&self) {
        self.files_failed.fetch_add(1, Ordering::SeqCst);
        self.main_bar.inc(1);
        self.update_detail_bar();
    }

    pub fn record_item(&self, succeeded: bool) {
        if succeeded {
            self.inc_files_processed();
        } else {
            self.inc_files_failed();
        }
    }

    pub fn add_articles(&self, count: usize) {
        self.articles_indexed.fetch_add(count, Ordering::SeqCst);
    }

    pub fn add_deletions(&self, count: usize) {
        self.deletions_applied.fetch_add(count, Ordering::SeqCst);
    }

    pub fn add_bytes_processed(&self, bytes: u64) {
        self.bytes_processed.fetch_add(bytes, Ordering::SeqCst);
    }

    /// Files finished either way.
    pub fn completed(&self) -> usize {
        self.files_processed.load(Ordering::SeqCst) + self.files_failed.load(Ordering::SeqCst)
    }

    pub fn progress_percent(&self) -> f64 {
        if self.total_files == 0 {
            return 100.0;
        }
        self.completed() as f64 / self.total_files as f64 * 100.0
    }

    pub fn eta(&self) -> Option<Duration> {
        estimate_remaining(self.start_time.elapsed(), self.completed(), self.total_files)
    }

    pub fn set_message(&self, message: String) {
        self.detail_bar.set_message(message);
    }

    pub fn finish(&self) {
        let message = match self.kind {
            TrackerKind::Indexing => "Indexing complete",
            TrackerKind::Evaluation => "Evaluation complete",
        };
        self.main_bar.finish_with_message(message);
        self.detail_bar.finish_and_clear();
    }

    pub fn get_stats(&self) -> PipelineStats {
        PipelineStats {
            files_processed: self.files_processed.load(Ordering::SeqCst),
            files_failed: self.files_failed.load(Ordering::SeqCst),
            articles_indexed: self.articles_indexed.load(Ordering::SeqCst),
            deletions_applied: self.deletions_applied.load(Ordering::SeqCst),
            total_bytes_processed: self.bytes_processed.load(Ordering::SeqCst),
            duration_secs: self.start_time.elapsed().as_secs(),
        }
    }

    fn update_detail_bar(&self) {
        self.detail_bar.set_message(self.detail_message());
    }

    fn detail_message(&self) -> String {
        let succeeded = self.files_processed.load(Ordering::SeqCst);
        let failed = self.files_failed.load(Ordering::SeqCst);

        match self.kind {
            TrackerKind::Indexing => format!(
                "Articles: {} | Deletions: {} | Failed files: {}",
                self.articles_indexed.load(Ordering::SeqCst),
                self.deletions_applied.load(Ordering::SeqCst),
                failed
            ),
            TrackerKind::Evaluation => format!("Answered: {} | Failed: {}", succeeded, failed),
        }
    }
}

impl Drop for ProgressTracker {
    fn drop(&mut self) {
        if !self.main_bar.is_finished() {
            self.finish();
        }
    }
}

fn create_progress_bar(multi_progress: &MultiProgress, total: u64, colored: bool) -> ProgressBar {
    let bar = multi_progress.add(ProgressBar::new(total));
    let (template, chars) = if colored {
        (
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}",
            "█▓▒░",
        )
    } else {
        (
            "{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({eta}) {msg}",
            "=>-",
        )
    };

    let style = ProgressStyle::default_bar()
        .template(template)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars(chars);
    bar.set_style(style);
    bar
}

fn create_detail_bar(multi_progress: &MultiProgress) -> ProgressBar {
    let bar = multi_progress.add(ProgressBar::new(0));
    let style = ProgressStyle::default_bar()
        .template("{msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    bar.set_style(style);
    bar
}
