//! Sumi-Tree main entry point
//!
//! This is the command-line interface for the Sumi-Tree site mapper.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use sumi_tree::config::{load_config_with_hash, Config, OutputFormat};
use sumi_tree::crawler::{run_crawl, CrawlRequest};
use sumi_tree::output::{print_statistics, ConsoleOutput, MarkdownOutput, OutputHandler};
use tracing_subscriber::EnvFilter;

/// Sumi-Tree: a bounded, concurrent site mapper
///
/// Sumi-Tree crawls outward from a seed URL, following at most a fixed
/// number of new links per page down to a maximum depth, and prints the
/// pages it visited as a tree.
#[derive(Parser, Debug)]
#[command(name = "sumi-tree")]
#[command(version = "1.0.0")]
#[command(about = "A bounded, concurrent site mapper", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Seed URL, replacing `crawl.url` from the config file
    #[arg(long)]
    url: Option<String>,

    /// Maximum tree depth, replacing `crawl.max-depth`
    #[arg(long)]
    max_depth: Option<u32>,

    /// New links followed per page, replacing `crawl.limit-per-level`
    #[arg(long)]
    limit_per_level: Option<u32>,

    /// Print the tree as JSON instead of indented text
    #[arg(long)]
    json: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (mut config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    apply_overrides(&mut config, &cli);

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    handle_crawl(&config, cli.quiet).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sumi_tree=info,warn"),
            1 => EnvFilter::new("sumi_tree=debug,info"),
            2 => EnvFilter::new("sumi_tree=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Replaces config file values with those given on the command line
fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(url) = &cli.url {
        config.crawl.url = url.clone();
    }
    if let Some(max_depth) = cli.max_depth {
        config.crawl.max_depth = max_depth;
    }
    if let Some(limit) = cli.limit_per_level {
        config.crawl.limit_per_level = limit;
    }
    if cli.json {
        config.output.format = OutputFormat::Json;
    }
}

/// Handles the --dry-run mode: shows the effective request and settings
fn handle_dry_run(config: &Config) {
    let request = CrawlRequest::from(&config.crawl);

    println!("=== Sumi-Tree Dry Run ===\n");

    println!("Crawl Request:");
    println!("  Seed URL: {}", request.url);
    println!("  Max depth: {}", request.max_depth);
    println!("  Limit per level: {}", request.limit_per_level);

    println!("\nFetcher:");
    println!("  Timeout: {}ms", config.fetcher.timeout_ms);
    match config.fetcher.max_concurrent_fetches {
        Some(max) => println!("  Max concurrent fetches: {}", max),
        None => println!("  Max concurrent fetches: unbounded"),
    }

    println!("\nUser Agent:");
    println!("  Name: {}", config.user_agent.crawler_name);
    println!("  Version: {}", config.user_agent.crawler_version);
    println!("  Contact URL: {}", config.user_agent.contact_url);
    println!("  Contact Email: {}", config.user_agent.contact_email);

    println!("\nOutput:");
    println!("  Format: {:?}", config.output.format);
    if let Some(path) = &config.output.summary_path {
        println!("  Summary: {}", path);
    }

    match request.validate() {
        Ok(()) => println!("\n✓ Configuration is valid"),
        Err(e) => println!("\n✗ Request is invalid: {}", e),
    }
}

/// Handles the main crawl operation
async fn handle_crawl(config: &Config, quiet: bool) -> anyhow::Result<()> {
    let summary = match run_crawl(config).await {
        Ok(summary) => summary,
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            return Err(e.into());
        }
    };

    ConsoleOutput::new(config.output.format).write_summary(&summary)?;

    if !quiet && config.output.format == OutputFormat::Tree {
        println!();
        print_statistics(&summary.statistics);
    }

    if let Some(path) = &config.output.summary_path {
        MarkdownOutput::new(path)
            .write_summary(&summary)
            .with_context(|| format!("Failed to write summary to {}", path))?;
    }

    tracing::info!(
        "Crawl completed in {}ms",
        summary.duration().num_milliseconds()
    );
    Ok(())
}
