//! Crawl request definition and validation

use crate::config::CrawlConfig;
use crate::InvalidArgument;
use serde::Serialize;

/// What to crawl and how far
///
/// A request is immutable once submitted to
/// [`Coordinator::crawl`](crate::crawler::Coordinator::crawl); it is
/// validated there before any work is dispatched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CrawlRequest {
    /// Seed URL (depth 1)
    pub url: String,

    /// Deepest level at which pages are created
    pub max_depth: u32,

    /// Maximum number of new links followed from any one page
    pub limit_per_level: u32,
}

impl CrawlRequest {
    pub fn new(url: impl Into<String>, max_depth: u32, limit_per_level: u32) -> Self {
        Self {
            url: url.into(),
            max_depth,
            limit_per_level,
        }
    }

    /// Checks every precondition, reporting the first one violated
    pub fn validate(&self) -> Result<(), InvalidArgument> {
        if self.url.trim().is_empty() {
            return Err(InvalidArgument::MissingUrl);
        }
        if self.max_depth < 1 {
            return Err(InvalidArgument::NonPositiveDepth);
        }
        if self.limit_per_level < 1 {
            return Err(InvalidArgument::NonPositiveLimit);
        }
        Ok(())
    }
}

impl From<&CrawlConfig> for CrawlRequest {
    fn from(config: &CrawlConfig) -> Self {
        Self::new(config.url.trim(), config.max_depth, config.limit_per_level)
    }
}
