//! Sumi-Tree: a bounded, concurrent site mapper
//!
//! This crate walks a website outward from a seed URL, level by level, and
//! records every visited page as a tree annotated with its fetch outcome.
//! The walk is bounded by a maximum depth and by a per-page limit on the
//! number of new links followed.

pub mod config;
pub mod crawler;
pub mod output;
pub mod state;
pub mod tree;

use thiserror::Error;

/// Main error type for Sumi-Tree operations
#[derive(Debug, Error)]
pub enum SumiError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Crawl error: {0}")]
    Crawl(#[from] CrawlError),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors surfaced by [`crawler::Coordinator::crawl`]
///
/// Only malformed requests are caller-visible. Fetch failures are recorded
/// on the affected node and never abort a crawl.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CrawlError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(#[from] InvalidArgument),
}

/// The precondition a crawl request violated
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum InvalidArgument {
    #[error("seed URL is missing")]
    MissingUrl,

    #[error("max depth must be a positive number")]
    NonPositiveDepth,

    #[error("limit per level must be a positive number")]
    NonPositiveLimit,
}

/// Errors reported by a [`crawler::Fetcher`]
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Connection failed for {url}: {message}")]
    Connect { url: String, message: String },

    #[error("HTTP error for {url}: {message}")]
    Request { url: String, message: String },

    #[error("Failed to read body of {url}: {message}")]
    Body { url: String, message: String },

    #[error("Invalid URL {url}: {message}")]
    InvalidUrl { url: String, message: String },
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Sumi-Tree operations
pub type Result<T> = std::result::Result<T, SumiError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{Coordinator, CrawlRequest, FetchedPage, Fetcher, HttpFetcher};
pub use state::{PendingWorkTracker, VisitedRegistry, WorkGuard};
pub use tree::{FailureKind, FetchFailure, FetchOutcome, PageNode};
