//! Registry of URLs already claimed for visiting during one crawl

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Concurrency-safe set of claimed page URLs
///
/// A URL enters the registry exactly once. Membership check and insertion
/// happen under one lock acquisition, so two concurrent visits can never
/// both believe they were first to see the same link. There is no removal.
#[derive(Debug, Default)]
pub struct VisitedRegistry {
    claimed: Mutex<HashSet<String>>,
}

impl VisitedRegistry {
    /// Creates an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims `url` for visiting
    ///
    /// Returns `true` for the single call that wins the claim and `false`
    /// on every later call with the same URL.
    pub fn try_claim(&self, url: &str) -> bool {
        let mut claimed = self.lock();
        if claimed.contains(url) {
            return false;
        }
        claimed.insert(url.to_string())
    }

    /// Returns true if `url` has already been claimed
    pub fn contains(&self, url: &str) -> bool {
        self.lock().contains(url)
    }

    /// Number of claimed URLs
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns true if nothing has been claimed yet
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // A panic in another visit cannot leave the set half-updated, so a
    // poisoned lock is still safe to use.
    fn lock(&self) -> MutexGuard<'_, HashSet<String>> {
        self.claimed.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
