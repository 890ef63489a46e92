mod api_types;
mod client;
mod compare;
mod error;
mod models;
mod pipeline;
mod presenter;
mod render;
mod store;
mod viz_export;

use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Result};
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{debug, info};

use client::{BackendClient, ReviewApi, DEFAULT_API_BASE};
use compare::ComparisonController;
use error::{AnalysisError, Side};
use models::{AnalysisResult, Platform};
use pipeline::{Phase, PipelineController};
use presenter::ResultPresenter;

/// Review Vibes - product review sentiment analyzer
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Backend API base URL
    #[arg(long, env = "REVIEW_VIBES_API_BASE", default_value = DEFAULT_API_BASE)]
    api_base: String,

    /// Per-request timeout in seconds; expiry aborts the run
    #[arg(long, default_value_t = 30)]
    timeout: u64,

    /// Output directory for generated files (default: "out")
    #[arg(short, long, default_value = "out")]
    output_dir: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyze one product listing's reviews
    Analyze {
        url: String,
        /// Platform override; detected from the URL when omitted
        #[arg(short, long, value_enum)]
        platform: Option<PlatformArg>,
    },
    /// Compare two product listings side by side
    Compare { url1: String, url2: String },
    /// Check backend health
    Health,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PlatformArg {
    Ebay,
    Bestbuy,
}

impl From<PlatformArg> for Platform {
    fn from(arg: PlatformArg) -> Self {
        match arg {
            PlatformArg::Ebay => Platform::Ebay,
            PlatformArg::Bestbuy => Platform::BestBuy,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_thread_ids(false)
        .with_line_number(true)
        .init();

    info!("Starting review_vibes");

    let args = Args::parse();
    let client = BackendClient::new(&args.api_base, Duration::from_secs(args.timeout))?;
    debug!(
        "Backend configured - api_base={}, timeout={}s",
        args.api_base, args.timeout
    );

    match &args.command {
        Command::Analyze { url, platform } => {
            let platform = *platform;
            run_analyze(client, &args, url, platform).await
        }
        Command::Compare { url1, url2 } => run_compare(client, &args, url1, url2).await,
        Command::Health => run_health(client).await,
    }
}

async fn run_analyze(
    client: BackendClient,
    args: &Args,
    url: &str,
    platform: Option<PlatformArg>,
) -> Result<()> {
    if url.trim().is_empty() {
        bail!(AnalysisError::InvalidUrl);
    }
    let platform: Platform = match platform {
        Some(p) => p.into(),
        None => Platform::classify(url).ok_or(AnalysisError::UnknownPlatform(Side::Single))?,
    };

    let controller = PipelineController::new(client, platform);
    controller.run(url).await?;

    let outcome = match controller.phase() {
        Phase::Ready(outcome) => outcome,
        other => bail!("pipeline ended in unexpected state: {}", other.name()),
    };

    // hydrate the display from the process endpoint; it is idempotent and
    // safely re-queryable independent of the pipeline's own success signal
    let payload = controller.api().process(&outcome.product_id).await?;
    let result = AnalysisResult::from_parts(payload, outcome.summary);
    let presenter = ResultPresenter::new(result);

    let md = render::render_analysis(&presenter);
    println!("{md}");

    persist(args, &presenter, "analysis.md", &md)?;
    Ok(())
}

async fn run_compare(client: BackendClient, args: &Args, url1: &str, url2: &str) -> Result<()> {
    let controller = ComparisonController::new(client);
    controller.compare(url1, url2).await?;

    let outcome = match controller.phase() {
        Phase::Ready(outcome) => outcome,
        other => bail!("comparison ended in unexpected state: {}", other.name()),
    };

    let left = ResultPresenter::new(outcome.product1.analysis.clone());
    let right = ResultPresenter::new(outcome.product2.analysis.clone());
    let md = render::render_comparison(&outcome, &left, &right);
    println!("{md}");

    let date = Utc::now().format("%Y-%m-%d").to_string();
    let date_dir = Path::new(&args.output_dir).join(&date);
    std::fs::create_dir_all(&date_dir)?;
    std::fs::write(date_dir.join("comparison.md"), &md)?;
    viz_export::write_all_viz(&date_dir.join("product1"), &date, left.store())?;
    viz_export::write_all_viz(&date_dir.join("product2"), &date, right.store())?;
    info!("Output persisted - directory={}", date_dir.display());
    Ok(())
}

async fn run_health(client: BackendClient) -> Result<()> {
    let health = client.health().await?;
    println!(
        "status: {} (summarizer loaded: {})",
        health.status, health.summarizer_loaded
    );
    Ok(())
}

fn persist(args: &Args, presenter: &ResultPresenter, name: &str, md: &str) -> Result<()> {
    let date = Utc::now().format("%Y-%m-%d").to_string();
    let date_dir = Path::new(&args.output_dir).join(&date);
    std::fs::create_dir_all(&date_dir)?;
    std::fs::write(date_dir.join(name), md)?;
    viz_export::write_all_viz(&date_dir, &date, presenter.store())?;
    info!("Output persisted - directory={}", date_dir.display());
    Ok(())
}
