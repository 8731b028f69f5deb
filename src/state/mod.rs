//! State module for tracking crawl progress
//!
//! This module provides the state shared by every concurrent visit of a
//! single crawl.
//!
//! # Components
//!
//! - `VisitedRegistry`: Atomic claim set over page URLs (deduplication)
//! - `PendingWorkTracker`: Counting barrier over outstanding visit units
//! - `WorkGuard`: One registered unit, completed when dropped

mod pending;
mod visited;

// Re-export main types
pub use pending::{PendingWorkTracker, WorkGuard};
pub use visited::VisitedRegistry;
