//! Crawler module for page fetching and tree building
//!
//! This module contains the core crawling logic, including:
//! - Request validation
//! - The `Fetcher` boundary and its HTTP implementation
//! - HTML link extraction
//! - Concurrent, bounded traversal coordination

mod coordinator;
mod fetcher;
mod parser;
mod request;

pub use coordinator::{Coordinator, DEFAULT_FETCH_TIMEOUT};
pub use fetcher::{build_http_client, user_agent_string, FetchedPage, Fetcher, HttpFetcher};
pub use parser::extract_links;
pub use request::CrawlRequest;

use crate::config::Config;
use crate::output::CrawlSummary;
use crate::SumiError;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;

/// Builds a coordinator from configuration, backed by [`HttpFetcher`]
pub fn coordinator_from_config(config: &Config) -> Result<Coordinator, SumiError> {
    let fetcher = HttpFetcher::from_config(&config.user_agent)?;
    let mut coordinator = Coordinator::new(Arc::new(fetcher))
        .with_fetch_timeout(Duration::from_millis(config.fetcher.timeout_ms));

    if let Some(max) = config.fetcher.max_concurrent_fetches {
        coordinator = coordinator.with_max_concurrent_fetches(max as usize);
    }

    Ok(coordinator)
}

/// Runs a complete crawl operation
///
/// This is the main entry point for a configured crawl. It will:
/// 1. Build the HTTP client and coordinator
/// 2. Crawl from the configured seed
/// 3. Wait for every page visit to finish
/// 4. Return the tree with timing information
///
/// # Arguments
///
/// * `config` - The crawler configuration
///
/// # Returns
///
/// * `Ok(CrawlSummary)` - Crawl completed
/// * `Err(SumiError)` - The request was invalid or the client could not be built
///
/// # Example
///
/// ```no_run
/// use sumi_tree::config::load_config;
/// use sumi_tree::crawler::run_crawl;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("config.toml"))?;
/// let summary = run_crawl(&config).await?;
/// println!("{} pages", summary.root.page_count());
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(config: &Config) -> Result<CrawlSummary, SumiError> {
    let coordinator = coordinator_from_config(config)?;
    let request = CrawlRequest::from(&config.crawl);

    let started_at = Utc::now();
    let root = coordinator.crawl(&request).await?;
    let finished_at = Utc::now();

    Ok(CrawlSummary::new(request, root, started_at, finished_at))
}
