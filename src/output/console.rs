//! Terminal output of the page tree

use crate::config::OutputFormat;
use crate::output::traits::{CrawlSummary, OutputHandler, OutputResult};
use crate::tree::{FetchOutcome, PageNode};
use std::fmt::Write as _;
use std::io::Write;

/// Renders a tree as indented text, one page per line
///
/// Each level of depth below the root adds two spaces of indentation:
///
/// ```text
/// [200] https://example.com/
///   [200] https://example.com/a
///   [failed: timeout] https://example.com/b
/// ```
pub fn render_tree(root: &PageNode) -> String {
    let mut out = String::new();
    for node in root.iter() {
        let indent = node.depth.saturating_sub(root.depth) as usize * 2;
        let _ = writeln!(
            out,
            "{:indent$}[{}] {}",
            "",
            outcome_label(node.outcome.as_ref()),
            node.url,
            indent = indent
        );
    }
    out
}

fn outcome_label(outcome: Option<&FetchOutcome>) -> String {
    match outcome {
        Some(FetchOutcome::Status { code }) => code.to_string(),
        Some(FetchOutcome::Failed(failure)) => format!("failed: {}", failure.kind),
        None => "no result".to_string(),
    }
}

/// Writes the page tree to stdout
#[derive(Debug, Clone, Copy)]
pub struct ConsoleOutput {
    format: OutputFormat,
}

impl ConsoleOutput {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats the tree the way [`OutputHandler::write_summary`] prints it
    pub fn render(&self, summary: &CrawlSummary) -> OutputResult<String> {
        match self.format {
            OutputFormat::Tree => Ok(render_tree(&summary.root)),
            OutputFormat::Json => {
                let mut json = serde_json::to_string_pretty(&summary.root)?;
                json.push('\n');
                Ok(json)
            }
        }
    }
}

impl OutputHandler for ConsoleOutput {
    fn write_summary(&self, summary: &CrawlSummary) -> OutputResult<()> {
        let rendered = self.render(summary)?;
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(rendered.as_bytes())?;
        stdout.flush()?;
        Ok(())
    }
}
