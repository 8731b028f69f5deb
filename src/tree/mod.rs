//! Page tree produced by a crawl
//!
//! The crawl grows the tree through shared `LiveNode`s while visits
//! are in flight, then hands the caller an owned, immutable [`PageNode`]
//! snapshot once every visit has completed.

pub(crate) mod live;
mod node;

pub use node::{FailureKind, FetchFailure, FetchOutcome, Iter, PageNode};
