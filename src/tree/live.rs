//! Tree nodes that are still being filled in by in-flight visits

use crate::tree::{FetchOutcome, PageNode};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

/// A node shared between its parent's child list and its own visit
///
/// Only the visit that owns the node writes to it: the outcome is set once
/// and children are appended in discovery order.
#[derive(Debug)]
pub(crate) struct LiveNode {
    url: String,
    depth: u32,
    outcome: OnceLock<FetchOutcome>,
    children: Mutex<Vec<Arc<LiveNode>>>,
}

impl LiveNode {
    pub(crate) fn new(url: impl Into<String>, depth: u32) -> Arc<Self> {
        Arc::new(Self {
            url: url.into(),
            depth,
            outcome: OnceLock::new(),
            children: Mutex::new(Vec::new()),
        })
    }

    pub(crate) fn url(&self) -> &str {
        &self.url
    }

    pub(crate) fn depth(&self) -> u32 {
        self.depth
    }

    /// Records the fetch outcome; later calls are ignored
    pub(crate) fn record(&self, outcome: FetchOutcome) {
        if self.outcome.set(outcome).is_err() {
            tracing::error!("Outcome for {} recorded twice", self.url);
        }
    }

    /// Creates a child one level deeper and appends it
    pub(crate) fn append_child(&self, url: impl Into<String>) -> Arc<LiveNode> {
        let child = LiveNode::new(url, self.depth + 1);
        self.children().push(Arc::clone(&child));
        child
    }

    /// Copies this subtree into an owned [`PageNode`]
    ///
    /// Call only after every visit in the subtree has completed.
    pub(crate) fn snapshot(&self) -> PageNode {
        let children = self.children().iter().map(|c| c.snapshot()).collect();
        PageNode {
            url: self.url.clone(),
            depth: self.depth,
            outcome: self.outcome.get().cloned(),
            children,
        }
    }

    fn children(&self) -> MutexGuard<'_, Vec<Arc<LiveNode>>> {
        self.children.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
