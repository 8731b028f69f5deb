use serde::Deserialize;

/// Main configuration structure for Sumi-Tree
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawl: CrawlConfig,
    #[serde(default)]
    pub fetcher: FetcherConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// What to crawl and how far
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlConfig {
    /// Seed URL the crawl starts from
    pub url: String,

    /// Maximum depth of the page tree (the seed is depth 1)
    #[serde(rename = "max-depth")]
    pub max_depth: u32,

    /// Maximum number of new links followed from any one page
    #[serde(rename = "limit-per-level")]
    pub limit_per_level: u32,
}

/// Page fetching behavior
#[derive(Debug, Clone, Deserialize)]
pub struct FetcherConfig {
    /// Per-page fetch timeout (milliseconds)
    #[serde(rename = "timeout-ms", default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Upper bound on fetches in flight at once (unbounded when absent)
    #[serde(rename = "max-concurrent-fetches", default)]
    pub max_concurrent_fetches: Option<u32>,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            max_concurrent_fetches: None,
        }
    }
}

fn default_timeout_ms() -> u64 {
    3000
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

/// How the finished tree is reported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Indented text, one page per line
    #[default]
    Tree,
    /// The tree serialized as JSON
    Json,
}

/// Output configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputConfig {
    /// Format of the tree printed to stdout
    #[serde(default)]
    pub format: OutputFormat,

    /// Path to the markdown summary file, if one should be written
    #[serde(rename = "summary-path", default)]
    pub summary_path: Option<String>,
}
