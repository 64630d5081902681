// file: src/config.rs
// description: application configuration management with toml and .env support
// reference: https://docs.rs/config

use crate::error::{PipelineError, Result};
use crate::utils::Validator;
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Environment variables read from `.env` that map directly onto
/// `opensearch.*` keys.
const CONNECTION_ENV_VARS: [(&str, &str); 4] = [
    ("OPENSEARCH_USERNAME", "opensearch.username"),
    ("OPENSEARCH_PASSWORD", "opensearch.password"),
    ("OPENSEARCH_HOST", "opensearch.host"),
    ("OPENSEARCH_PORT", "opensearch.port"),
];

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub opensearch: OpenSearchConfig,
    pub index: IndexConfig,
    pub pipeline: PipelineConfig,
    pub llm: LlmConfig,
    pub evaluation: EvaluationConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OpenSearchConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub use_ssl: bool,
    /// Self-signed clusters are the common case, so certificates are not
    /// verified unless asked for.
    pub verify_certs: bool,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IndexConfig {
    /// `pubmed` for the annual baseline, `pubmed_update` for update files.
    pub name: String,
    pub shards: u32,
    pub replicas: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PipelineConfig {
    pub input_dir: PathBuf,
    /// Defaults to `<input_dir>/processed` when unset.
    pub processed_dir: Option<PathBuf>,
    pub file_suffix: String,
    pub parallel_workers: usize,
    pub bulk_chunk_size: usize,
    pub apply_deletions: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LlmConfig {
    pub api_base: String,
    pub api_key: Option<String>,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EvaluationConfig {
    /// Number of articles retrieved per question, 0 disables retrieval.
    pub retrieval_k: usize,
    pub parallel_requests: usize,
    pub output_path: PathBuf,
}

impl PipelineConfig {
    pub fn processed_dir(&self) -> PathBuf {
        self.processed_dir
            .clone()
            .unwrap_or_else(|| self.input_dir.join("processed"))
    }
}

impl Config {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        dotenv().ok();

        let defaults = config::Config::try_from(&Self::default_config())
            .map_err(|e| PipelineError::Config(e.to_string()))?;

        let mut builder = config::Config::builder().add_source(defaults);

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        } else {
            builder = builder
                .add_source(config::File::from(Path::new(DEFAULT_CONFIG_PATH)).required(false));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("PUBMED_INDEXER")
                .separator("__")
                .try_parsing(true),
        );

        for (var, key) in CONNECTION_ENV_VARS {
            builder = builder
                .set_override_option(key, non_empty_env(var))
                .map_err(|e| PipelineError::Config(e.to_string()))?;
        }

        builder = builder
            .set_override_option("llm.api_key", non_empty_env("OPENAI_API_KEY"))
            .map_err(|e| PipelineError::Config(e.to_string()))?;

        let settings = builder
            .build()
            .map_err(|e| PipelineError::Config(e.to_string()))?;

        let config: Config = settings
            .try_deserialize()
            .map_err(|e| PipelineError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    pub fn default_config() -> Self {
        Self {
            opensearch: OpenSearchConfig {
                host: "localhost".to_string(),
                port: 9200,
                username: String::new(),
                password: String::new(),
                use_ssl: true,
                verify_certs: false,
                timeout_secs: 60,
            },
            index: IndexConfig {
                name: "pubmed".to_string(),
                shards: 1,
                replicas: 1,
            },
            pipeline: PipelineConfig {
                input_dir: PathBuf::from("./pubmed"),
                processed_dir: None,
                file_suffix: ".xml.gz".to_string(),
                parallel_workers: 3,
                bulk_chunk_size: 50,
                apply_deletions: false,
            },
            llm: LlmConfig {
                api_base: "https://api.openai.com/v1".to_string(),
                api_key: None,
                model: "gpt-4o-mini".to_string(),
                temperature: 0.0,
                max_tokens: 512,
                timeout_secs: 120,
            },
            evaluation: EvaluationConfig {
                retrieval_k: 5,
                parallel_requests: 4,
                output_path: PathBuf::from("./results/evaluation.jsonl"),
            },
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.pipeline.parallel_workers == 0 {
            return Err(PipelineError::Config(
                "parallel_workers must be greater than 0".to_string(),
            ));
        }

        if self.evaluation.parallel_requests == 0 {
            return Err(PipelineError::Config(
                "parallel_requests must be greater than 0".to_string(),
            ));
        }

        Validator::validate_index_name(&self.index.name)
            .and_then(|_| Validator::validate_batch_size(self.pipeline.bulk_chunk_size))
            .and_then(|_| Validator::validate_port(self.opensearch.port))
            .and_then(|_| Validator::validate_url(&self.llm.api_base))
            .map_err(|e| PipelineError::Config(e.to_string()))
    }
}

/// Unset and blank variables both leave the layered value alone.
fn non_empty_env(var: &str) -> Option<String> {
    env::var(var).ok().filter(|value| !value.trim().is_empty())
}
