// file: src/evaluation/mod.rs
// description: evaluation module exports
// reference: benchmark evaluation workflow

pub mod answer;
mod benchmark;
mod llm;
mod runner;

pub use answer::{build_prompt, extract_answer, is_correct};
pub use benchmark::{load_benchmark, parse_benchmark, write_records};
pub use llm::ChatClient;
pub use runner::Evaluator;
