//! claimcheck: verify a claim across the news, fact and scam lanes
//!
//! Usage:
//!   claimcheck "The city banned cars downtown"             # heuristic lane selection
//!   claimcheck --lanes scam,fact "Your parcel is held..."  # explicit lanes
//!   echo "claim" | claimcheck --format json                # claim from stdin

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use claimcheck_core::{
    render, EngineConfig, FixedSelector, HeuristicSelector, Lane, LaneSelector, Orchestrator,
    SubmissionContext,
};
use claimcheck_providers::{standard_sources, ProviderSettings};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Markdown,
    Json,
}

#[derive(Parser)]
#[command(name = "claimcheck")]
#[command(about = "Verify a claim across independent news, fact and scam lanes")]
struct Args {
    /// Claim text; read from stdin when omitted
    claim: Option<String>,

    /// Comma-separated lanes to run (news, fact, scam); selected from the claim when omitted
    #[arg(short = 'l', long, value_delimiter = ',')]
    lanes: Vec<Lane>,

    /// Engine configuration YAML
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Per-source timeout in milliseconds (overrides the config file)
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Report output format
    #[arg(short = 'f', long, value_enum, default_value = "markdown")]
    format: OutputFormat,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("claimcheck=info".parse().context("invalid log directive")?),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let claim = match args.claim {
        Some(claim) => claim,
        None => {
            let mut input = String::new();
            std::io::stdin()
                .read_to_string(&mut input)
                .context("failed to read claim from stdin")?;
            input
        }
    };
    if claim.trim().is_empty() {
        bail!("no claim text supplied");
    }

    let mut config = match &args.config {
        Some(path) => EngineConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => EngineConfig::default(),
    };
    if let Some(timeout_ms) = args.timeout_ms {
        config = config.with_source_timeout(Duration::from_millis(timeout_ms));
    }

    let settings = ProviderSettings::from_env();
    for var in settings.missing_credentials() {
        tracing::warn!(var, "Credential not configured; dependent sources will report errors");
    }

    let selector: Arc<dyn LaneSelector> = if args.lanes.is_empty() {
        Arc::new(HeuristicSelector::new())
    } else {
        Arc::new(FixedSelector::new(args.lanes.iter().copied()))
    };

    let orchestrator = Orchestrator::builder(config)
        .lanes(standard_sources(&settings).context("failed to wire signal sources")?)
        .selector(selector)
        .build();

    let mut ctx = SubmissionContext::new(claim.trim());
    let report = orchestrator.verify(&mut ctx).await;

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Markdown => println!("{}", render::markdown(&report)),
    }

    Ok(())
}
