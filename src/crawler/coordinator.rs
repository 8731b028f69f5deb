//! Crawler coordinator - main crawl orchestration logic
//!
//! The coordinator validates a request, seeds the page tree, and dispatches
//! one independent tokio task per page visit. Each visit fetches its page
//! and, while depth and the per-level limit allow, claims and dispatches
//! one child visit per newly discovered link. The caller's `crawl` future
//! resolves only once the whole, dynamically growing set of visits has
//! completed.

use crate::crawler::fetcher::{FetchedPage, Fetcher};
use crate::crawler::request::CrawlRequest;
use crate::state::{PendingWorkTracker, VisitedRegistry, WorkGuard};
use crate::tree::live::LiveNode;
use crate::tree::{FetchFailure, FetchOutcome, PageNode};
use crate::{CrawlError, FetchError};
use futures::future::BoxFuture;
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

/// Fetch timeout used when none is configured
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_millis(3000);

/// Drives bounded, concurrent crawls through a [`Fetcher`]
///
/// One coordinator can run any number of crawls, sequentially or at once;
/// each `crawl` call gets its own visited set and completion barrier.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use sumi_tree::config::UserAgentConfig;
/// use sumi_tree::crawler::{Coordinator, CrawlRequest, HttpFetcher};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let fetcher = HttpFetcher::from_config(&UserAgentConfig {
///     crawler_name: "SumiTree".to_string(),
///     crawler_version: "1.0".to_string(),
///     contact_url: "https://example.com/about".to_string(),
///     contact_email: "admin@example.com".to_string(),
/// })?;
///
/// let coordinator = Coordinator::new(Arc::new(fetcher));
/// let tree = coordinator
///     .crawl(&CrawlRequest::new("https://example.com/", 2, 10))
///     .await?;
/// println!("Visited {} pages", tree.page_count());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Coordinator {
    fetcher: Arc<dyn Fetcher>,
    fetch_timeout: Duration,
    max_concurrent_fetches: Option<usize>,
}

impl Coordinator {
    /// Creates a coordinator with the default timeout and no global fetch cap
    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            fetcher,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            max_concurrent_fetches: None,
        }
    }

    /// Sets the timeout applied to every individual fetch
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// Caps the number of fetches in flight across the whole crawl
    ///
    /// Visits beyond the cap still get dispatched; they wait for a permit
    /// before fetching. A cap of zero is treated as one.
    pub fn with_max_concurrent_fetches(mut self, max: usize) -> Self {
        self.max_concurrent_fetches = Some(max.max(1));
        self
    }

    /// Crawls from `request.url` and returns the completed page tree
    ///
    /// Fails only for a malformed request, before anything is dispatched.
    /// Per-page fetch failures are recorded on the corresponding node.
    ///
    /// Must be called from within a tokio runtime; visits run as spawned
    /// tasks.
    pub async fn crawl(&self, request: &CrawlRequest) -> Result<PageNode, CrawlError> {
        request.validate()?;

        tracing::info!(
            "Starting crawl of {} (max depth {}, limit per level {})",
            request.url,
            request.max_depth,
            request.limit_per_level
        );

        let ctx = Arc::new(CrawlContext {
            fetcher: Arc::clone(&self.fetcher),
            visited: VisitedRegistry::new(),
            pending: Arc::new(PendingWorkTracker::new()),
            max_depth: request.max_depth,
            limit_per_level: request.limit_per_level as usize,
            fetch_timeout: self.fetch_timeout,
            fetch_permits: self.max_concurrent_fetches.map(Semaphore::new),
        });

        let seed_claimed = ctx.visited.try_claim(&request.url);
        debug_assert!(seed_claimed, "fresh registry rejected the seed");

        let root = LiveNode::new(request.url.clone(), 1);
        dispatch(&ctx, Arc::clone(&root));

        ctx.pending.wait_for_zero().await;

        let tree = root.snapshot();
        tracing::info!(
            "Crawl of {} finished: {} pages in tree, {} URLs claimed",
            request.url,
            tree.page_count(),
            ctx.visited.len()
        );

        Ok(tree)
    }
}

/// State shared by every visit of one crawl
struct CrawlContext {
    fetcher: Arc<dyn Fetcher>,
    visited: VisitedRegistry,
    pending: Arc<PendingWorkTracker>,
    max_depth: u32,
    limit_per_level: usize,
    fetch_timeout: Duration,
    fetch_permits: Option<Semaphore>,
}

impl CrawlContext {
    /// Fetches `url` under the global cap and the per-fetch timeout
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        let _permit = match &self.fetch_permits {
            Some(permits) => permits.acquire().await.ok(),
            None => None,
        };

        match tokio::time::timeout(
            self.fetch_timeout,
            self.fetcher.fetch(url, self.fetch_timeout),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout {
                url: url.to_string(),
            }),
        }
    }
}

/// Registers one unit for `node` and spawns its visit
///
/// Registration happens here, synchronously, before the task exists, and
/// always from a context that is itself an outstanding unit (or the seed,
/// before the barrier is awaited).
fn dispatch(ctx: &Arc<CrawlContext>, node: Arc<LiveNode>) {
    let guard = ctx.pending.guard();
    tokio::spawn(run_unit(Arc::clone(ctx), node, guard));
}

/// One registered unit: visits the node, completing the guard on any exit
fn run_unit(
    ctx: Arc<CrawlContext>,
    node: Arc<LiveNode>,
    guard: WorkGuard,
) -> BoxFuture<'static, ()> {
    async move {
        let _guard = guard;
        let url = node.url().to_string();

        if let Err(panic) = AssertUnwindSafe(visit_node(ctx, node)).catch_unwind().await {
            tracing::error!("Visit of {} panicked: {}", url, panic_message(&*panic));
        }
    }
    .boxed()
}

/// Fetches one page and fans out to its unvisited links
///
/// The per-level limit is checked before a link is claimed, so links past
/// the limit stay unclaimed and may still be visited from another page.
/// Each node's children match claim-then-check, but the whole tree can
/// differ: with `A -> [B, C]`, `B -> [C]` and a limit of 1, `C` appears
/// under `B` at depth 3 instead of being dropped.
async fn visit_node(ctx: Arc<CrawlContext>, node: Arc<LiveNode>) {
    tracing::debug!("Visiting {} at depth {}", node.url(), node.depth());

    let page = match ctx.fetch(node.url()).await {
        Ok(page) => page,
        Err(e) => {
            tracing::warn!("Failed to fetch {}: {}", node.url(), e);
            node.record(FetchOutcome::Failed(FetchFailure::from(&e)));
            return;
        }
    };

    let outcome = FetchOutcome::Status {
        code: page.status_code,
    };
    let success = outcome.is_success();
    node.record(outcome);

    if !success {
        tracing::debug!("{} returned HTTP {}", node.url(), page.status_code);
        return;
    }

    if node.depth() >= ctx.max_depth {
        tracing::debug!("Reached max depth {} at {}", ctx.max_depth, node.url());
        return;
    }

    let mut followed = 0;
    for link in &page.links {
        let link = link.trim();
        if link.is_empty() {
            continue;
        }

        // Checked before claiming so a dropped link stays reachable from
        // other pages.
        if followed >= ctx.limit_per_level {
            tracing::debug!(
                "Reached limit per level ({}) at {}",
                ctx.limit_per_level,
                node.url()
            );
            break;
        }

        if !ctx.visited.try_claim(link) {
            tracing::trace!("Duplicate url: {}", link);
            continue;
        }

        let child = node.append_child(link);
        dispatch(&ctx, child);
        followed += 1;
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message
    } else {
        "unknown panic payload"
    }
}
