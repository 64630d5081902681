// file: src/main.rs
// description: commandline application entry point with command handling
// reference: application bootstrap and orchestration

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use pubmed_indexer::utils::logging::{format_error, format_success, format_warning};
use pubmed_indexer::{
    Config, Evaluator, HealthCheck, HealthReport, IndexingPipeline, OpenSearchClient,
    OperationTimer, SchemaManager, Validator, load_benchmark,
};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{error, info, warn};

#[derive(Parser)]
#[command(name = "pubmed_indexer")]
#[command(version)]
#[command(about = "Index PubMed baseline and update snapshots into OpenSearch", long_about = None)]
struct Cli {
    #[arg(
        short,
        long,
        value_name = "FILE",
        default_value = "config/default.toml"
    )]
    config: PathBuf,

    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    color: bool,

    #[arg(short, long, action = ArgAction::SetTrue)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Index every snapshot file in the input directory
    Index {
        #[arg(long, value_name = "DIR")]
        input: Option<PathBuf>,

        #[arg(long, value_name = "DIR")]
        processed: Option<PathBuf>,

        /// Target index, e.g. `pubmed` or `pubmed_update`
        #[arg(long, value_name = "NAME")]
        index: Option<String>,

        #[arg(short, long, value_name = "NUM")]
        workers: Option<usize>,

        #[arg(long, value_name = "NUM")]
        limit: Option<usize>,

        /// Apply DeleteCitation entries from update files
        #[arg(long)]
        apply_deletions: bool,
    },

    Verify {
        #[arg(long)]
        create_index: bool,
    },

    Stats,

    Reset {
        #[arg(long)]
        confirm: bool,
    },

    /// Full-text search over titles and abstracts
    Search {
        query: String,

        #[arg(short, long, default_value_t = 5)]
        limit: usize,
    },

    /// Run a JSONL benchmark through retrieval and a chat model
    Evaluate {
        #[arg(short, long, value_name = "FILE")]
        benchmark: PathBuf,

        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        #[arg(short, long)]
        model: Option<String>,

        /// Abstracts retrieved per question; 0 disables retrieval
        #[arg(long, value_name = "NUM")]
        top_k: Option<usize>,

        #[arg(long, value_name = "NUM")]
        limit: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    pubmed_indexer::utils::logging::init_logger(cli.color, cli.verbose);

    info!("PubMed Indexer");
    info!("Loading configuration from: {}", cli.config.display());

    let config = if cli.config.exists() {
        Config::load(Some(cli.config.as_path())).context("Failed to load configuration")?
    } else {
        warn!(
            "Config file {} not found, using defaults and environment",
            cli.config.display()
        );
        Config::load(None).context("Failed to load configuration")?
    };

    match cli.command {
        Commands::Index {
            input,
            processed,
            index,
            workers,
            limit,
            apply_deletions,
        } => {
            let mut config = config;
            if let Some(input) = input {
                config.pipeline.input_dir = input;
            }
            if processed.is_some() {
                config.pipeline.processed_dir = processed;
            }
            if let Some(index) = index {
                config.index.name = index;
            }
            if let Some(workers) = workers {
                config.pipeline.parallel_workers = workers;
            }
            config.pipeline.apply_deletions |= apply_deletions;
            config.validate().context("Invalid indexing options")?;

            cmd_index(config, limit, cli.color).await
        }
        Commands::Verify { create_index } => cmd_verify(&config, create_index).await,
        Commands::Stats => cmd_stats(&config).await,
        Commands::Reset { confirm } => cmd_reset(&config, confirm).await,
        Commands::Search { query, limit } => cmd_search(&config, &query, limit).await,
        Commands::Evaluate {
            benchmark,
            output,
            model,
            top_k,
            limit,
        } => {
            let mut config = config;
            if let Some(model) = model {
                config.llm.model = model;
            }
            if let Some(top_k) = top_k {
                config.evaluation.retrieval_k = top_k;
            }
            if let Some(output) = output {
                config.evaluation.output_path = output;
            }

            cmd_evaluate(&config, &benchmark, limit, cli.color).await
        }
    }
}

async fn connect(config: &Config) -> Result<OpenSearchClient> {
    let client = OpenSearchClient::new(config.opensearch.clone())
        .context("Failed to create OpenSearch client")?;

    client
        .ping()
        .await
        .context("Cannot connect to OpenSearch")?;

    Ok(client)
}

async fn cmd_index(config: Config, limit: Option<usize>, colored: bool) -> Result<()> {
    let timer = OperationTimer::new("index");

    connect(&config).await?;

    let pipeline = IndexingPipeline::new(config, colored).context("Failed to build pipeline")?;
    let stats = pipeline.run(limit).await.context("Indexing failed")?;

    timer.finish_with_count(stats.articles_indexed);

    if stats.files_failed > 0 {
        println!(
            "{}",
            format_warning(&format!(
                "{} files indexed, {} failed; failed files stay in the input directory",
                stats.files_processed, stats.files_failed
            ))
        );
    } else {
        println!(
            "{}",
            format_success(&format!(
                "{} files indexed ({} articles)",
                stats.files_processed, stats.articles_indexed
            ))
        );
    }

    Ok(())
}

async fn cmd_verify(config: &Config, create_index: bool) -> Result<()> {
    info!("Verifying OpenSearch cluster and index");

    let client = OpenSearchClient::new(config.opensearch.clone())
        .context("Failed to create OpenSearch client")?;
    let mut checks = Vec::new();

    let started = Instant::now();
    let connected = match client.ping().await {
        Ok(_) => {
            checks.push(HealthCheck::healthy("opensearch", started.elapsed()));
            true
        }
        Err(e) => {
            checks.push(HealthCheck::unhealthy(
                "opensearch",
                e.to_string(),
                started.elapsed(),
            ));
            false
        }
    };

    if connected {
        let schema_manager = SchemaManager::new(&client, &config.index);
        let component = format!("index '{}'", config.index.name);
        let started = Instant::now();

        match schema_manager.verify_schema().await {
            Ok(true) => checks.push(HealthCheck::healthy(&component, started.elapsed())),
            Ok(false) if create_index => {
                schema_manager
                    .initialize()
                    .await
                    .context("Failed to create index")?;
                checks.push(HealthCheck::healthy(&component, started.elapsed()));
                info!("Index created successfully");
            }
            Ok(false) => checks.push(HealthCheck::degraded(
                &component,
                "missing; use --create-index to create it".to_string(),
                started.elapsed(),
            )),
            Err(e) => checks.push(HealthCheck::unhealthy(
                &component,
                e.to_string(),
                started.elapsed(),
            )),
        }
    }

    let report = HealthReport::new(checks, env!("CARGO_PKG_VERSION").to_string());
    println!("{}", report.format());

    if !connected {
        println!("{}", format_error("OpenSearch is unreachable"));
        return Err(anyhow::anyhow!("OpenSearch connection failed"));
    }

    Ok(())
}

async fn cmd_stats(config: &Config) -> Result<()> {
    info!("Gathering statistics");

    let client = connect(config).await?;
    let index = &config.index.name;

    if !client.index_exists(index).await? {
        println!("{}", format_warning(&format!("Index '{}' does not exist", index)));
        return Ok(());
    }

    let count = client.count(index).await?;
    println!("Index: {}", index);
    println!("Documents: {}", count);

    Ok(())
}

async fn cmd_reset(config: &Config, confirm: bool) -> Result<()> {
    if !confirm {
        error!("This will delete all indexed articles. Use --confirm to proceed");
        return Ok(());
    }

    warn!("Resetting index '{}' - all documents will be lost", config.index.name);

    let client = connect(config).await?;
    let schema_manager = SchemaManager::new(&client, &config.index);

    schema_manager
        .drop_index()
        .await
        .context("Failed to drop index")?;

    schema_manager
        .initialize()
        .await
        .context("Failed to recreate index")?;

    println!(
        "{}",
        format_success(&format!("Index '{}' reset", config.index.name))
    );

    Ok(())
}

async fn cmd_search(config: &Config, query: &str, limit: usize) -> Result<()> {
    info!("Searching for: {}", query);
    let timer = OperationTimer::new("search");

    let client = connect(config).await?;
    let results = client
        .search(&config.index.name, query, limit)
        .await
        .context("Search failed")?;

    if results.is_empty() {
        println!("\nNo results found for query: \"{}\"\n", query);
        println!("Try:");
        println!("  - Using different search terms");
        println!("  - Checking that snapshot files have been indexed");
        return Ok(());
    }

    println!("\nSearch Results for: \"{}\"\n", query);
    println!("Found {} result(s)\n", results.len());
    println!("{}", "=".repeat(80));

    for (idx, hit) in results.iter().enumerate() {
        println!(
            "\n{}. {} (Score: {:.4})",
            idx + 1,
            hit.article.title.as_deref().unwrap_or("[untitled]"),
            hit.score
        );
        println!("   PMID: {}", hit.pmid());
        println!("   URL: {}", hit.article.url);

        let preview = hit.preview(300);
        if !preview.is_empty() {
            println!("   Abstract:");
            for line in preview.lines().take(5) {
                println!("     {}", line);
            }
        }
    }

    println!("\n{}", "=".repeat(80));
    timer.finish();

    Ok(())
}

async fn cmd_evaluate(
    config: &Config,
    benchmark: &Path,
    limit: Option<usize>,
    colored: bool,
) -> Result<()> {
    Validator::validate_file(benchmark).context("Invalid benchmark file")?;
    let timer = OperationTimer::new("evaluate");

    let mut items = load_benchmark(benchmark)
        .await
        .context("Failed to load benchmark")?;
    if let Some(limit) = limit {
        items.truncate(limit);
    }

    if config.llm.api_key.as_deref().is_none_or(|key| key.trim().is_empty()) {
        warn!("No LLM API key configured (set OPENAI_API_KEY)");
    }

    let evaluator = Evaluator::new(config).context("Failed to build evaluator")?;
    let summary = evaluator
        .run(items, &config.evaluation.output_path, colored)
        .await
        .context("Evaluation failed")?;

    timer.finish_with_count(summary.total);

    println!(
        "{}",
        format_success(&format!(
            "{}: {}/{} correct ({:.2}%), {} failed. Results in {}",
            summary.model,
            summary.correct,
            summary.total,
            summary.accuracy * 100.0,
            summary.failed,
            config.evaluation.output_path.display()
        ))
    );

    Ok(())
}
