use crate::FetchError;
use serde::Serialize;
use std::fmt;

/// Category of a failed fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Timeout,
    Connect,
    Request,
    Body,
    InvalidUrl,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Timeout => "timeout",
            Self::Connect => "connect",
            Self::Request => "request",
            Self::Body => "body",
            Self::InvalidUrl => "invalid_url",
        };
        f.write_str(name)
    }
}

/// A fetch that produced no status code
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FetchFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl From<&FetchError> for FetchFailure {
    fn from(error: &FetchError) -> Self {
        let kind = match error {
            FetchError::Timeout { .. } => FailureKind::Timeout,
            FetchError::Connect { .. } => FailureKind::Connect,
            FetchError::Request { .. } => FailureKind::Request,
            FetchError::Body { .. } => FailureKind::Body,
            FetchError::InvalidUrl { .. } => FailureKind::InvalidUrl,
        };
        Self {
            kind,
            message: error.to_string(),
        }
    }
}

/// Terminal result of fetching one page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum FetchOutcome {
    /// The server answered with this status code
    Status { code: u16 },

    /// No status code was obtained
    Failed(FetchFailure),
}

impl FetchOutcome {
    /// Returns true for a 2xx status
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Status { code } if (200..300).contains(code))
    }
}

/// One visited page and the pages discovered from it
///
/// `outcome` is `None` only when the visit for this node died before
/// recording a result; that failure is reported through logging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageNode {
    pub url: String,
    pub depth: u32,
    pub outcome: Option<FetchOutcome>,
    pub children: Vec<PageNode>,
}

impl PageNode {
    /// HTTP status code, if the fetch produced one
    pub fn status_code(&self) -> Option<u16> {
        match self.outcome {
            Some(FetchOutcome::Status { code }) => Some(code),
            _ => None,
        }
    }

    /// Returns true if the fetch failed without a status code
    pub fn fetch_failed(&self) -> bool {
        matches!(self.outcome, Some(FetchOutcome::Failed(_)))
    }

    /// Returns true if the fetch returned a 2xx status
    pub fn is_success(&self) -> bool {
        self.outcome.as_ref().is_some_and(FetchOutcome::is_success)
    }

    /// Total number of nodes in this subtree, including `self`
    pub fn page_count(&self) -> usize {
        self.iter().count()
    }

    /// Pre-order walk over this subtree
    pub fn iter(&self) -> Iter<'_> {
        Iter { stack: vec![self] }
    }

    /// Finds the node for `url` in this subtree
    pub fn find(&self, url: &str) -> Option<&PageNode> {
        self.iter().find(|node| node.url == url)
    }

    /// URLs of the direct children, in discovery order
    pub fn child_urls(&self) -> Vec<&str> {
        self.children.iter().map(|c| c.url.as_str()).collect()
    }
}

/// Pre-order iterator over a [`PageNode`] subtree
pub struct Iter<'a> {
    stack: Vec<&'a PageNode>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a PageNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}
