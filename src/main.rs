use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;
use webaudit::audit::{DEFAULT_CLARITY_GUIDELINES, DEFAULT_LAYOUT_GUIDELINES};
use webaudit::{AppConfig, Auditor, ChunkerConfig, HtmlChunker, ModelBackend, PageFetcher};

#[derive(Parser, Debug)]
#[command(name = "webaudit")]
#[command(version, about = "Token-budgeted page chunking and LLM-backed page audits")]
#[command(propagate_version = true)]
struct Cli {
    /// Show debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Model backend (overrides WEBAUDIT_BACKEND)
    #[arg(long, global = true, value_enum)]
    backend: Option<ModelBackend>,

    /// Model name (overrides WEBAUDIT_MODEL)
    #[arg(long, global = true)]
    model: Option<String>,

    /// Concurrent model calls (overrides WEBAUDIT_WORKERS)
    #[arg(long, global = true)]
    workers: Option<usize>,

    /// Token budget per chunk (overrides WEBAUDIT_TOKEN_BUDGET)
    #[arg(long, global = true)]
    budget: Option<usize>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Split a page into token-budgeted chunks and print them as JSON
    Chunk {
        /// URL or local HTML file
        target: String,

        /// Keep markup instead of visible text
        #[arg(long)]
        markup: bool,
    },

    /// Review a page's markup for WCAG 2.1 AA issues
    Accessibility {
        target: String,

        /// Review passes per chunk (overrides WEBAUDIT_MAX_ISSUES)
        #[arg(long)]
        max_issues: Option<usize>,
    },

    /// Suggest clearer wording for a page's text
    Clarity {
        target: String,

        /// Plain-text guideline file
        #[arg(long, value_name = "FILE")]
        guidelines: Option<PathBuf>,
    },

    /// Review a page screenshot's layout
    Webdesign {
        /// Publicly reachable image URL
        screenshot_url: String,

        /// Plain-text guideline file
        #[arg(long, value_name = "FILE")]
        guidelines: Option<PathBuf>,
    },

    /// Walk through a page as a given user persona
    Persona {
        target: String,

        #[arg(long, value_name = "TEXT")]
        persona: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = load_config(&cli)?;

    match cli.command {
        Command::Chunk { target, markup } => {
            let fetcher = PageFetcher::new()?;
            let html = fetcher
                .load(&target)
                .await
                .with_context(|| format!("Failed to load {target}"))?;

            let preset = if markup {
                ChunkerConfig::markup()
            } else {
                ChunkerConfig::text()
            };
            let chunker = HtmlChunker::new(preset.max_tokens(config.token_budget))?;
            let chunks = chunker.chunk(&html);
            info!(%target, chunks = chunks.len(), "chunked page");
            print_json(&chunks)?;
        }
        Command::Accessibility { target, max_issues } => {
            let mut config = config;
            if let Some(n) = max_issues {
                config.max_issues = n;
            }
            let report = auditor(config)?.accessibility(&target).await?;
            print_json(&report)?;
        }
        Command::Clarity { target, guidelines } => {
            let guidelines = read_guidelines(guidelines.as_deref(), DEFAULT_CLARITY_GUIDELINES)?;
            let report = auditor(config)?.content_clarity(&target, &guidelines).await?;
            print_json(&report)?;
        }
        Command::Webdesign {
            screenshot_url,
            guidelines,
        } => {
            let guidelines = read_guidelines(guidelines.as_deref(), DEFAULT_LAYOUT_GUIDELINES)?;
            let report = auditor(config)?
                .web_design(&screenshot_url, &guidelines)
                .await?;
            print_json(&report)?;
        }
        Command::Persona { target, persona } => {
            let report = auditor(config)?.persona(&target, &persona).await?;
            print_json(&report)?;
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("webaudit={level}")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Environment first, then command-line overrides
fn load_config(cli: &Cli) -> Result<AppConfig> {
    let mut config = AppConfig::from_env().context("Invalid configuration")?;

    if let Some(backend) = cli.backend {
        if backend != config.model.backend {
            config.model = config.model.clone().with_backend(backend);
            config.model.api_key = std::env::var(backend.api_key_var())
                .ok()
                .filter(|k| !k.trim().is_empty());
        }
    }
    if let Some(model) = &cli.model {
        config.model.model = model.clone();
    }
    if let Some(workers) = cli.workers {
        config.workers = workers;
    }
    if let Some(budget) = cli.budget {
        config.token_budget = budget;
    }

    Ok(config)
}

fn auditor(config: AppConfig) -> Result<Auditor> {
    Auditor::new(config).context("Failed to set up model client")
}

fn read_guidelines(path: Option<&Path>, default: &str) -> Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read guidelines from {}", path.display())),
        None => Ok(default.to_string()),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
