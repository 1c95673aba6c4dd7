//! `kbase`: ask questions of a directory of knowledge-base articles.
//!
//!   kbase query "how do I reset my password" -k 3
//!   kbase query "billing" --generate --json
//!   kbase stats
//!   kbase health

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use kbase_core::config::{Config, Settings};
use kbase_core::types::{QueryRequest, QueryResponse};
use kbase_core::Error;
use kbase_engine::{build_from_settings, EngineCell, RetrievalEngine};

static ENGINE: EngineCell = EngineCell::new();

#[derive(Parser)]
#[command(name = "kbase", version, about = "Knowledge-base question answering over local articles")]
struct Cli {
    /// Article directory (overrides corpus.dir)
    #[arg(long, global = true)]
    corpus: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Retrieve the closest articles and answer a question
    Query {
        text: String,
        /// Number of articles to retrieve
        #[arg(short = 'k', allow_negative_numbers = true)]
        k: Option<i64>,
        /// Phrase the answer with the configured chat model
        #[arg(long)]
        generate: bool,
        #[arg(long)]
        json: bool,
    },
    /// Show index statistics
    Stats {
        #[arg(long)]
        json: bool,
    },
    /// Report whether the engine and answer generation are available
    Health,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let config = Config::load().map_err(|e| {
        eprintln!("Error loading config: {e:#}");
        e
    })?;
    let mut settings = config.settings()?;
    if let Some(dir) = &cli.corpus {
        settings.corpus.dir = dir.display().to_string();
    }

    match cli.command {
        Command::Query { text, k, generate, json } => {
            let request = QueryRequest {
                query: text,
                k: k.unwrap_or(settings.search.default_k as i64),
                generate,
            };
            // reject bad input before paying for model load and indexing
            if request.query.trim().is_empty() {
                return Err(Error::EmptyQuery.into());
            }
            settings.search.validate_k(request.k)?;

            let engine = init_engine(settings).await?;
            let response = engine.query(&request).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&response)?);
            } else {
                print_response(&response);
            }
        }
        Command::Stats { json } => {
            let engine = init_engine(settings).await?;
            let stats = engine.stats();
            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                println!("📊 Articles indexed:  {}", stats.total_documents);
                println!("📐 Embedding dim:     {}", stats.embedding_dimension);
                println!("🧠 Embedding model:   {}", stats.model_name);
            }
        }
        Command::Health => {
            if let Err(e) = init_engine(settings).await {
                warn!("Engine unavailable: {:#}", e);
            }
            println!("{}", serde_json::to_string_pretty(&ENGINE.health())?);
        }
    }
    Ok(())
}

async fn init_engine(settings: Settings) -> Result<Arc<RetrievalEngine>> {
    let base_dir = std::env::current_dir().context("resolving working directory")?;

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")?);
    spinner.set_message(format!("Indexing knowledge base from {}", settings.corpus.dir));
    spinner.enable_steady_tick(Duration::from_millis(120));

    let outcome = tokio::task::spawn_blocking(move || ENGINE.get_or_init(|| build_from_settings(&settings, &base_dir)))
        .await
        .context("engine initialization task")?;

    match outcome {
        Ok(engine) => {
            spinner.finish_with_message(format!("✅ Indexed {} articles", engine.len()));
            Ok(engine)
        }
        Err(e) => {
            spinner.abandon_with_message("❌ Engine initialization failed");
            Err(e.into())
        }
    }
}

fn print_response(response: &QueryResponse) {
    println!("\n🔍 {}", response.query);
    println!("Confidence: {:.3}  ({} articles)\n", response.confidence_score, response.num_retrieved);
    println!("{}\n", response.answer);
    for article in &response.retrieved_articles {
        println!("  {}. [{:.4}] {}  ({})", article.rank, article.similarity_score, article.title, article.category);
        if !article.tags.is_empty() {
            println!("     tags: {}", article.tags.join(", "));
        }
    }
}
