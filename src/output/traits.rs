//! Output handler traits and types
//!
//! This module defines the trait interface for output handlers and
//! the summary record they receive once a crawl has finished.

use crate::crawler::CrawlRequest;
use crate::output::stats::CrawlStatistics;
use crate::tree::PageNode;
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to format output: {0}")]
    Format(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// A finished crawl: the request, the tree, and how it went
#[derive(Debug, Clone, Serialize)]
pub struct CrawlSummary {
    pub request: CrawlRequest,
    pub root: PageNode,
    pub statistics: CrawlStatistics,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl CrawlSummary {
    /// Builds a summary, computing statistics from the tree
    pub fn new(
        request: CrawlRequest,
        root: PageNode,
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
    ) -> Self {
        let statistics = CrawlStatistics::from_tree(&root);
        Self {
            request,
            root,
            statistics,
            started_at,
            finished_at,
        }
    }

    /// Wall-clock duration of the crawl
    pub fn duration(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}

/// Trait for output handlers
///
/// An output handler reports a finished crawl somewhere: the terminal,
/// a file, or anything else that can render a [`CrawlSummary`].
pub trait OutputHandler {
    /// Writes the summary to this handler's destination
    fn write_summary(&self, summary: &CrawlSummary) -> OutputResult<()>;
}
