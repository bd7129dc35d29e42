//! Doc-Harvest main entry point
//!
//! This is the command-line interface for the Doc-Harvest document harvester.

use anyhow::Context;
use clap::Parser;
use doc_harvest::config::{load_config, validate, Config};
use doc_harvest::output::print_summary;
use doc_harvest::runner::{exit_status_for_error, run, RunOptions, EXIT_FATAL};
use std::path::PathBuf;
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Doc-Harvest: a hierarchical document harvester
///
/// Doc-Harvest crawls seed pages, follows links to nested pages and
/// documents, and downloads every document into a directory tree named
/// after the page titles it was found under.
#[derive(Parser, Debug)]
#[command(name = "doc-harvest")]
#[command(version = "1.0.0")]
#[command(about = "A hierarchical document harvester", long_about = None)]
struct Cli {
    /// Seed page locations (appended to any seeds from the config file)
    #[arg(value_name = "SEED")]
    seeds: Vec<String>,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Directory the timestamped run root is created under
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<String>,

    /// Where to write the manifest dump
    #[arg(long, value_name = "PATH")]
    manifest_path: Option<String>,

    /// Number of downloads allowed in flight at once
    #[arg(long)]
    concurrency: Option<u32>,

    /// Per-download timeout in seconds
    #[arg(long, value_name = "SECS")]
    download_timeout: Option<u64>,

    /// Crawl and write the manifest, but download nothing
    #[arg(long, conflicts_with = "dry_run")]
    crawl_only: bool,

    /// Validate config and show what would be crawled without crawling
    #[arg(long)]
    dry_run: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = match build_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{:#}", e);
            return ExitCode::from(EXIT_FATAL);
        }
    };

    if cli.dry_run {
        handle_dry_run(&config);
        return ExitCode::SUCCESS;
    }

    handle_run(&config, cli.crawl_only).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("doc_harvest=info,warn"),
            1 => EnvFilter::new("doc_harvest=debug,info"),
            2 => EnvFilter::new("doc_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads the config file (if any), applies command-line overrides and validates
fn build_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            load_config(path)
                .with_context(|| format!("failed to load configuration {}", path.display()))?
        }
        None => Config::default(),
    };

    config.seeds.extend(cli.seeds.iter().cloned());
    if let Some(dir) = &cli.output_dir {
        config.output.root_dir = dir.clone();
    }
    if let Some(path) = &cli.manifest_path {
        config.output.manifest_path = path.clone();
    }
    if let Some(concurrency) = cli.concurrency {
        config.download.concurrency = concurrency;
    }
    if let Some(secs) = cli.download_timeout {
        config.download.timeout_secs = secs;
    }

    validate(&config).context("invalid configuration")?;
    Ok(config)
}

/// Handles the --dry-run mode: shows what would be crawled
fn handle_dry_run(config: &Config) {
    println!("=== Doc-Harvest Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Max depth: {}", config.crawler.max_depth);
    println!(
        "  Max concurrent fetches: {}",
        config.crawler.max_concurrent_fetches
    );
    println!(
        "  Request timeout: {}s",
        config.crawler.request_timeout_secs
    );
    println!(
        "  Document extensions: {}",
        config.crawler.document_extensions.join(", ")
    );
    println!(
        "  Page extensions: {}",
        config.crawler.page_extensions.join(", ")
    );
    println!("  Missing title: {:?}", config.crawler.missing_title);
    println!(
        "  Abort on fetch error: {}",
        config.crawler.abort_on_fetch_error
    );

    println!("\nDownloads:");
    println!("  Concurrency: {}", config.download.concurrency);
    println!("  Timeout: {}s", config.download.timeout_secs);

    println!("\nUser Agent:");
    println!("  Name: {}", config.user_agent.crawler_name);
    println!("  Version: {}", config.user_agent.crawler_version);

    println!("\nOutput:");
    println!("  Root directory: {}", config.output.root_dir);
    println!("  Manifest: {}", config.output.manifest_path);

    println!("\nSeeds ({}):", config.seeds.len());
    for seed in &config.seeds {
        println!("  - {}", seed);
    }

    println!("\n✓ Configuration is valid");
    println!(
        "✓ Would start crawling with {} seed URLs",
        config.seeds.len()
    );
}

/// Handles the main harvest: crawl, manifest dump and downloads
async fn handle_run(config: &Config, crawl_only: bool) -> ExitCode {
    tracing::info!("Total seed URLs: {}", config.seeds.len());

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, stopping");
            interrupt.cancel();
        }
    });

    match run(config, RunOptions { crawl_only }, cancel).await {
        Ok(summary) => {
            tracing::info!("Harvest completed");
            print_summary(&summary);
            summary.exit_code()
        }
        Err(e) => {
            tracing::error!("Harvest failed: {}", e);
            ExitCode::from(exit_status_for_error(&e))
        }
    }
}
