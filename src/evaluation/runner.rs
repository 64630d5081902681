// file: src/evaluation/runner.rs
// description: retrieval-augmented benchmark evaluation against a chat model
// reference: concurrent evaluation with bounded parallelism

use crate::config::Config;
use crate::error::Result;
use crate::evaluation::answer::{
    SYSTEM_PROMPT, build_prompt, expected_answer, extract_answer, is_correct,
};
use crate::evaluation::benchmark::write_records;
use crate::evaluation::llm::ChatClient;
use crate::models::{BenchmarkItem, EvaluationRecord, EvaluationSummary, SearchHit};
use crate::pipeline::ProgressTracker;
use crate::search::OpenSearchClient;
use futures::stream::{self, StreamExt};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

pub struct Evaluator {
    search: OpenSearchClient,
    chat: ChatClient,
    index: String,
    retrieval_k: usize,
    parallel_requests: usize,
    run_id: Uuid,
}

impl Evaluator {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            search: OpenSearchClient::new(config.opensearch.clone())?,
            chat: ChatClient::new(&config.llm)?,
            index: config.index.name.clone(),
            retrieval_k: config.evaluation.retrieval_k,
            parallel_requests: config.evaluation.parallel_requests.max(1),
            run_id: Uuid::new_v4(),
        })
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Evaluates every item, writes one JSON line per item to `output` and
    /// returns the aggregate. Records keep the benchmark order.
    pub async fn run(
        &self,
        items: Vec<BenchmarkItem>,
        output: &Path,
        colored: bool,
    ) -> Result<EvaluationSummary> {
        info!(
            "Evaluating {} items with model '{}' (run {}, top-k {}, {} parallel requests)",
            items.len(),
            self.chat.model(),
            self.run_id,
            self.retrieval_k,
            self.parallel_requests
        );

        let progress = ProgressTracker::for_evaluation(items.len(), colored);

        let records: Vec<EvaluationRecord> = stream::iter(items)
            .map(|item| {
                let progress = &progress;
                async move {
                    let record = self.evaluate_item(&item).await;
                    progress.record_item(record.error.is_none());
                    record
                }
            })
            .buffered(self.parallel_requests)
            .collect()
            .await;

        progress.finish();

        write_records(output, &records).await?;

        let summary = EvaluationSummary::from_records(self.run_id, self.chat.model(), &records);
        info!("=== Evaluation Summary ===");
        info!("Model: {}", summary.model);
        info!("Items: {}", summary.total);
        info!("Correct: {}", summary.correct);
        info!("Failed: {}", summary.failed);
        info!("Accuracy: {:.2}%", summary.accuracy * 100.0);
        info!("==========================");

        Ok(summary)
    }

    pub async fn evaluate_item(&self, item: &BenchmarkItem) -> EvaluationRecord {
        let started = Instant::now();

        let mut record = EvaluationRecord {
            run_id: self.run_id,
            item_id: item.id.clone(),
            model: self.chat.model().to_string(),
            question: item.question.clone(),
            expected: expected_answer(item),
            predicted: None,
            raw_response: None,
            correct: false,
            retrieved_pmids: Vec::new(),
            latency_ms: 0,
            error: None,
        };

        let passages = match self.retrieve(&item.question).await {
            Ok(hits) => hits,
            Err(e) => {
                warn!("Retrieval failed for item {}: {}", item.id, e);
                record.error = Some(format!("retrieval: {}", e));
                record.latency_ms = started.elapsed().as_millis() as u64;
                return record;
            }
        };
        record.retrieved_pmids = passages.iter().map(|hit| hit.pmid().to_string()).collect();

        let prompt = build_prompt(item, &passages);
        debug!("Prompt for item {}:\n{}", item.id, prompt);

        match self.chat.complete(SYSTEM_PROMPT, &prompt).await {
            Ok(response) => {
                let predicted = extract_answer(item, &response);
                record.correct = is_correct(item, predicted.as_deref());
                record.predicted = predicted;
                record.raw_response = Some(response);
            }
            Err(e) => {
                warn!("Model call failed for item {}: {}", item.id, e);
                record.error = Some(e.to_string());
            }
        }

        record.latency_ms = started.elapsed().as_millis() as u64;
        record
    }

    async fn retrieve(&self, question: &str) -> Result<Vec<SearchHit>> {
        if self.retrieval_k == 0 {
            return Ok(Vec::new());
        }
        self.search.search(&self.index, question, self.retrieval_k).await
    }
}
