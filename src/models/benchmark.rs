// file: src/models/benchmark.rs
// description: benchmark questions and per-item evaluation outcomes
// reference: PubMedQA / MedQA style JSONL benchmarks

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// A benchmark question. `options` maps a letter (`A`, `B`, ...) to its text;
/// when empty the expected answer is free form (e.g. `yes`/`no`/`maybe`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkItem {
    pub id: String,
    pub question: String,
    #[serde(default)]
    pub options: BTreeMap<String, String>,
    pub answer: String,
    #[serde(default)]
    pub context: Option<String>,
}

impl BenchmarkItem {
    pub fn is_multiple_choice(&self) -> bool {
        !self.options.is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationRecord {
    pub run_id: Uuid,
    pub item_id: String,
    pub model: String,
    pub question: String,
    pub expected: String,
    pub predicted: Option<String>,
    pub raw_response: Option<String>,
    pub correct: bool,
    pub retrieved_pmids: Vec<String>,
    pub latency_ms: u64,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationSummary {
    pub run_id: Uuid,
    pub model: String,
    pub total: usize,
    pub correct: usize,
    pub failed: usize,
    pub accuracy: f64,
}

impl EvaluationSummary {
    pub fn from_records(run_id: Uuid, model: &str, records: &[EvaluationRecord]) -> Self {
        let total = records.len();
        let correct = records.iter().filter(|r| r.correct).count();
        let failed = records.iter().filter(|r| r.error.is_some()).count();
        let accuracy = if total == 0 {
            0.0
        } else {
            correct as f64 / total as f64
        };

        Self {
            run_id,
            model: model.to_string(),
            total,
            correct,
            failed,
            accuracy,
        }
    }
}
