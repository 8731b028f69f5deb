//! Output module for reporting finished crawls
//!
//! This module handles:
//! - Rendering the page tree to the terminal
//! - Generating markdown summaries of crawl results
//! - Computing crawl statistics

mod console;
mod markdown;
pub mod stats;
mod traits;

pub use console::{render_tree, ConsoleOutput};
pub use markdown::{format_markdown_summary, generate_markdown_summary, MarkdownOutput};
pub use stats::{print_statistics, CrawlStatistics};
pub use traits::{CrawlSummary, OutputError, OutputHandler, OutputResult};
