//! Statistics computed from a finished page tree
//!
//! This module provides functionality for summarizing a crawl's outcomes
//! and displaying them.

use crate::tree::{FailureKind, FetchOutcome, PageNode};
use serde::Serialize;
use std::collections::BTreeMap;

/// Crawl statistics summary
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CrawlStatistics {
    /// Total number of pages in the tree
    pub total_pages: u64,

    /// Pages fetched with a 2xx status
    pub succeeded: u64,

    /// Pages that answered with a non-2xx status
    pub http_errors: u64,

    /// Pages whose fetch failed without a status code
    pub fetch_failures: u64,

    /// Pages whose visit ended without recording an outcome
    pub unfinished: u64,

    /// Deepest level present in the tree
    pub deepest_level: u32,

    /// Count of pages per depth
    pub pages_by_depth: BTreeMap<u32, u64>,

    /// Count of pages per HTTP status code
    pub status_codes: BTreeMap<u16, u64>,

    /// Count of fetch failures per kind
    pub failures_by_kind: BTreeMap<FailureKind, u64>,
}

impl CrawlStatistics {
    /// Walks the tree and tallies every page
    pub fn from_tree(root: &PageNode) -> Self {
        let mut stats = Self::default();

        for node in root.iter() {
            stats.total_pages += 1;
            stats.deepest_level = stats.deepest_level.max(node.depth);
            *stats.pages_by_depth.entry(node.depth).or_default() += 1;

            match &node.outcome {
                Some(outcome @ FetchOutcome::Status { code }) => {
                    *stats.status_codes.entry(*code).or_default() += 1;
                    if outcome.is_success() {
                        stats.succeeded += 1;
                    } else {
                        stats.http_errors += 1;
                    }
                }
                Some(FetchOutcome::Failed(failure)) => {
                    stats.fetch_failures += 1;
                    *stats.failures_by_kind.entry(failure.kind).or_default() += 1;
                }
                None => stats.unfinished += 1,
            }
        }

        stats
    }

    /// Returns the success rate as a percentage
    pub fn success_rate(&self) -> f64 {
        if self.total_pages == 0 {
            return 0.0;
        }
        (self.succeeded as f64 / self.total_pages as f64) * 100.0
    }
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Crawl Statistics ===\n");

    println!("Overview:");
    println!("  Total pages: {}", stats.total_pages);
    println!(
        "  Succeeded: {} ({:.1}%)",
        stats.succeeded,
        stats.success_rate()
    );
    println!("  HTTP errors: {}", stats.http_errors);
    println!("  Fetch failures: {}", stats.fetch_failures);
    if stats.unfinished > 0 {
        println!("  Unfinished: {}", stats.unfinished);
    }
    println!("  Deepest level: {}", stats.deepest_level);
    println!();

    println!("Pages by Depth:");
    for (depth, count) in &stats.pages_by_depth {
        println!("  {}: {}", depth, count);
    }
    println!();

    if !stats.status_codes.is_empty() {
        println!("Status Codes:");
        for (code, count) in &stats.status_codes {
            println!("  {}: {}", code, count);
        }
        println!();
    }

    if !stats.failures_by_kind.is_empty() {
        println!("Failures:");
        for (kind, count) in &stats.failures_by_kind {
            println!("  {}: {}", kind, count);
        }
        println!();
    }
}
