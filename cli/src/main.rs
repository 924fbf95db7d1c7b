//! CLI entrypoint for gengate
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::Result;
use clap::Parser;
use gengate_application::GenerateTextUseCase;
use gengate_domain::{GenerationRequest, Model};
use gengate_infrastructure::{ConfigLoader, TieredGenerator};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "gengate", version, about = "Resilient multi-tier LLM generation gateway")]
struct Cli {
    /// Prompt to send to the model
    prompt: String,

    /// Target model (e.g. gemini-2.5-pro, gpt-5-codex)
    #[arg(short, long, default_value = "gemini-2.5-pro")]
    model: String,

    /// Wall-clock budget per tier attempt, in seconds
    #[arg(short, long)]
    timeout: Option<u64>,

    /// Explicit config file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Skip config files, use built-in defaults
    #[arg(long)]
    no_config: bool,

    /// Print the full response as JSON (text plus usage counters)
    #[arg(long)]
    json: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity level
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref()).map_err(|e| anyhow::anyhow!(e))?
    };

    let model: Model = cli.model.parse()?;
    let mut request = GenerationRequest::new(cli.prompt, model);
    if let Some(secs) = cli.timeout {
        request = request.with_timeout(Duration::from_secs(secs));
    }

    info!(model = %request.model, "starting generation");

    // === Dependency Injection ===
    let generator = Arc::new(TieredGenerator::new(config));
    let use_case = GenerateTextUseCase::new(generator);

    let response = use_case.execute(request).await?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        println!("{}", response.text);
        if let Some(usage) = &response.usage {
            info!(
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                total_tokens = usage.total_tokens,
                "token usage"
            );
        }
    }

    Ok(())
}
