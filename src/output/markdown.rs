//! Markdown summary generation
//!
//! This module generates human-readable markdown summaries of crawl results,
//! including statistics, failure reports, and the page tree itself.

use crate::output::traits::{CrawlSummary, OutputHandler, OutputResult};
use crate::tree::{FetchOutcome, PageNode};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Generates a markdown summary from a finished crawl
///
/// # Arguments
///
/// * `summary` - The crawl summary data
/// * `output_path` - Path where the markdown file should be written
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote markdown summary
/// * `Err(OutputError)` - Failed to write summary
pub fn generate_markdown_summary(summary: &CrawlSummary, output_path: &Path) -> OutputResult<()> {
    let markdown = format_markdown_summary(summary);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats a crawl summary as markdown
///
/// # Arguments
///
/// * `summary` - The crawl summary data
///
/// # Returns
///
/// A formatted markdown string
pub fn format_markdown_summary(summary: &CrawlSummary) -> String {
    let stats = &summary.statistics;
    let mut md = String::new();

    md.push_str("# Sumi-Tree Crawl Summary\n\n");

    // Run metadata
    md.push_str("## Run Information\n\n");
    md.push_str(&format!("- **Seed URL**: {}\n", summary.request.url));
    md.push_str(&format!("- **Max Depth**: {}\n", summary.request.max_depth));
    md.push_str(&format!(
        "- **Limit Per Level**: {}\n",
        summary.request.limit_per_level
    ));
    md.push_str(&format!("- **Started**: {}\n", summary.started_at.to_rfc3339()));
    md.push_str(&format!(
        "- **Finished**: {}\n",
        summary.finished_at.to_rfc3339()
    ));
    let duration_ms = summary.duration().num_milliseconds();
    md.push_str(&format!(
        "- **Duration**: {:.2} seconds\n\n",
        duration_ms as f64 / 1000.0
    ));

    // Overall statistics
    md.push_str("## Overall Statistics\n\n");
    md.push_str(&format!("- **Total Pages**: {}\n", stats.total_pages));
    md.push_str(&format!("- **Succeeded**: {}\n", stats.succeeded));
    md.push_str(&format!("- **HTTP Errors**: {}\n", stats.http_errors));
    md.push_str(&format!("- **Fetch Failures**: {}\n", stats.fetch_failures));
    if stats.unfinished > 0 {
        md.push_str(&format!("- **Unfinished**: {}\n", stats.unfinished));
    }
    md.push_str(&format!("- **Deepest Level**: {}\n", stats.deepest_level));
    md.push_str(&format!(
        "- **Success Rate**: {:.2}%\n\n",
        stats.success_rate()
    ));

    // Depth breakdown
    if !stats.pages_by_depth.is_empty() {
        md.push_str("## Depth Breakdown\n\n");
        md.push_str("| Depth | Pages |\n");
        md.push_str("|-------|-------|\n");
        for (depth, count) in &stats.pages_by_depth {
            md.push_str(&format!("| {} | {} |\n", depth, count));
        }
        md.push('\n');
    }

    if !stats.status_codes.is_empty() {
        md.push_str("## Status Codes\n\n");
        md.push_str("| Status | Pages |\n");
        md.push_str("|--------|-------|\n");
        for (code, count) in &stats.status_codes {
            md.push_str(&format!("| {} | {} |\n", code, count));
        }
        md.push('\n');
    }

    // Failed fetches, listed individually
    let failed: Vec<&PageNode> = summary.root.iter().filter(|n| n.fetch_failed()).collect();
    if !failed.is_empty() {
        md.push_str("## Fetch Failures\n\n");
        md.push_str("| URL | Kind | Message |\n");
        md.push_str("|-----|------|---------|\n");
        for node in failed {
            if let Some(FetchOutcome::Failed(failure)) = &node.outcome {
                md.push_str(&format!(
                    "| {} | {} | {} |\n",
                    node.url,
                    failure.kind,
                    failure.message.replace('|', "\\|")
                ));
            }
        }
        md.push('\n');
    }

    md.push_str("## Page Tree\n\n");
    for node in summary.root.iter() {
        let indent = node.depth.saturating_sub(summary.root.depth) as usize * 2;
        md.push_str(&format!(
            "{:indent$}- {} ({})\n",
            "",
            node.url,
            outcome_text(node.outcome.as_ref()),
            indent = indent
        ));
    }

    md
}

fn outcome_text(outcome: Option<&FetchOutcome>) -> String {
    match outcome {
        Some(FetchOutcome::Status { code }) => code.to_string(),
        Some(FetchOutcome::Failed(failure)) => failure.kind.to_string(),
        None => "no result".to_string(),
    }
}

/// Writes a markdown summary file for each finished crawl
#[derive(Debug, Clone)]
pub struct MarkdownOutput {
    path: PathBuf,
}

impl MarkdownOutput {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl OutputHandler for MarkdownOutput {
    fn write_summary(&self, summary: &CrawlSummary) -> OutputResult<()> {
        generate_markdown_summary(summary, &self.path)?;
        tracing::info!("Wrote markdown summary to {}", self.path.display());
        Ok(())
    }
}
