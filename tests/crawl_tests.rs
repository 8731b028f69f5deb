//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test the full
//! crawl cycle end-to-end, plus an in-memory link graph for checking the
//! shape of the resulting tree.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use sumi_tree::config::parse_config;
use sumi_tree::crawler::{run_crawl, Coordinator, CrawlRequest, FetchedPage, Fetcher, HttpFetcher};
use sumi_tree::output::{MarkdownOutput, OutputHandler};
use sumi_tree::{CrawlError, FailureKind, FetchError, FetchOutcome, InvalidArgument, PageNode};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// An HTML page whose body links to each of `links`
fn html_page(links: &[&str]) -> ResponseTemplate {
    let anchors: String = links
        .iter()
        .map(|href| format!(r#"<a href="{}">{}</a>"#, href, href))
        .collect();
    ResponseTemplate::new(200).set_body_raw(
        format!("<html><body>{}</body></html>", anchors),
        "text/html",
    )
}

async fn mount_page(server: &MockServer, page: &str, links: &[&str]) {
    Mock::given(method("GET"))
        .and(path(page))
        .respond_with(html_page(links))
        .expect(1)
        .mount(server)
        .await;
}

fn http_coordinator() -> Coordinator {
    Coordinator::new(Arc::new(HttpFetcher::new(reqwest::Client::new())))
}

#[tokio::test]
async fn test_full_crawl_builds_tree() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(&server, "/", &["/a", "/b", "/c", "/a"]).await;
    mount_page(&server, "/a", &["/d"]).await;
    mount_page(&server, "/b", &["/", "/c"]).await;
    mount_page(&server, "/c", &["/e"]).await;
    mount_page(&server, "/d", &["/e"]).await;

    let request = CrawlRequest::new(format!("{}/", base), 3, 2);
    let root = http_coordinator().crawl(&request).await.unwrap();

    assert_eq!(root.url, format!("{}/", base));
    assert_eq!(root.depth, 1);
    assert_eq!(root.status_code(), Some(200));
    assert_eq!(
        root.child_urls(),
        vec![format!("{}/a", base), format!("{}/b", base)]
    );

    let a = root.find(&format!("{}/a", base)).unwrap();
    assert_eq!(a.depth, 2);
    assert_eq!(a.child_urls(), vec![format!("{}/d", base)]);

    // /c was dropped by the limit at the root and is picked up from /b
    let b = root.find(&format!("{}/b", base)).unwrap();
    assert_eq!(b.child_urls(), vec![format!("{}/c", base)]);

    // Depth 3 pages are fetched but never expanded
    let c = root.find(&format!("{}/c", base)).unwrap();
    assert_eq!(c.depth, 3);
    assert_eq!(c.status_code(), Some(200));
    assert!(c.children.is_empty());
    assert!(root.find(&format!("{}/e", base)).is_none());

    assert_eq!(root.page_count(), 5);
}

#[tokio::test]
async fn test_error_statuses_are_leaves() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(&server, "/", &["/missing", "/broken"]).await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_raw(
            r#"<html><body><a href="/hidden">x</a></body></html>"#,
            "text/html",
        ))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/hidden"))
        .respond_with(html_page(&[]))
        .expect(0)
        .mount(&server)
        .await;

    let request = CrawlRequest::new(format!("{}/", base), 5, 5);
    let root = http_coordinator().crawl(&request).await.unwrap();

    let missing = root.find(&format!("{}/missing", base)).unwrap();
    assert_eq!(missing.status_code(), Some(404));
    assert!(missing.children.is_empty());

    let broken = root.find(&format!("{}/broken", base)).unwrap();
    assert_eq!(broken.status_code(), Some(500));
    assert!(!broken.is_success());
}

#[tokio::test]
async fn test_non_html_pages_have_no_children() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(&server, "/", &["/data.json"]).await;
    Mock::given(method("GET"))
        .and(path("/data.json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(r#"{"link": "<a href=\"/x\">x</a>"}"#, "application/json"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let request = CrawlRequest::new(format!("{}/", base), 3, 5);
    let root = http_coordinator().crawl(&request).await.unwrap();

    let data = root.find(&format!("{}/data.json", base)).unwrap();
    assert_eq!(data.status_code(), Some(200));
    assert!(data.children.is_empty());
    assert_eq!(root.page_count(), 2);
}

#[tokio::test]
async fn test_unreachable_seed_is_recorded() {
    let request = CrawlRequest::new("http://127.0.0.1:1/", 3, 3);
    let root = http_coordinator().crawl(&request).await.unwrap();

    assert_eq!(root.url, "http://127.0.0.1:1/");
    assert!(root.fetch_failed());
    assert!(root.children.is_empty());
}

#[tokio::test]
async fn test_slow_page_times_out() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(&server, "/", &["/slow"]).await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(html_page(&["/never"]).set_delay(Duration::from_millis(2000)))
        .mount(&server)
        .await;

    let request = CrawlRequest::new(format!("{}/", base), 3, 3);
    let root = http_coordinator()
        .with_fetch_timeout(Duration::from_millis(200))
        .crawl(&request)
        .await
        .unwrap();

    let slow = root.find(&format!("{}/slow", base)).unwrap();
    match &slow.outcome {
        Some(FetchOutcome::Failed(failure)) => assert_eq!(failure.kind, FailureKind::Timeout),
        other => panic!("expected a timeout, got {:?}", other),
    }
    assert!(slow.children.is_empty());
}

#[tokio::test]
async fn test_invalid_request_sends_nothing() {
    let server = MockServer::start().await;

    let request = CrawlRequest::new(format!("{}/", server.uri()), 2, 0);
    let result = http_coordinator().crawl(&request).await;

    assert_eq!(
        result,
        Err(CrawlError::InvalidArgument(InvalidArgument::NonPositiveLimit))
    );
    let received = server.received_requests().await.unwrap_or_default();
    assert!(received.is_empty());
}

#[tokio::test]
async fn test_run_crawl_from_config() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(&server, "/", &["/a", "/b"]).await;
    mount_page(&server, "/a", &[]).await;
    mount_page(&server, "/b", &[]).await;

    let config = parse_config(&format!(
        r#"
[crawl]
url = "{}/"
max-depth = 2
limit-per-level = 5

[fetcher]
timeout-ms = 2000
max-concurrent-fetches = 2

[user-agent]
crawler-name = "TestBot"
crawler-version = "1.0.0"
contact-url = "https://example.com/contact"
contact-email = "test@example.com"
"#,
        base
    ))
    .unwrap();

    let summary = run_crawl(&config).await.unwrap();

    assert_eq!(summary.request.limit_per_level, 5);
    assert_eq!(summary.root.page_count(), 3);
    assert_eq!(summary.statistics.total_pages, 3);
    assert_eq!(summary.statistics.succeeded, 3);
    assert_eq!(summary.statistics.deepest_level, 2);
    assert!(summary.finished_at >= summary.started_at);

    let received = server.received_requests().await.unwrap();
    let user_agent = received[0]
        .headers
        .get(&"user-agent".into())
        .unwrap()
        .last()
        .as_str();
    assert!(user_agent.starts_with("TestBot/1.0.0"));

    let dir = tempfile::tempdir().unwrap();
    let summary_path = dir.path().join("summary.md");
    MarkdownOutput::new(&summary_path)
        .write_summary(&summary)
        .unwrap();
    let markdown = std::fs::read_to_string(&summary_path).unwrap();
    assert!(markdown.contains(&format!("- **Seed URL**: {}/", base)));
    assert!(markdown.contains("- **Total Pages**: 3"));
}

/// In-memory link graph: page `i` links to `(i * k + j) % size` for each j
struct GraphFetcher {
    links: HashMap<String, Vec<String>>,
    fetched: Mutex<Vec<String>>,
}

impl GraphFetcher {
    fn new(size: usize, fan_out: usize) -> Self {
        let links = (0..size)
            .map(|i| {
                let targets = (1..=fan_out)
                    .map(|j| page_url((i * 7 + j * 3) % size))
                    .collect();
                (page_url(i), targets)
            })
            .collect();
        Self {
            links,
            fetched: Mutex::new(Vec::new()),
        }
    }
}

fn page_url(i: usize) -> String {
    format!("https://graph.test/{}", i)
}

#[async_trait]
impl Fetcher for GraphFetcher {
    async fn fetch(&self, url: &str, _timeout: Duration) -> Result<FetchedPage, FetchError> {
        self.fetched.lock().unwrap().push(url.to_string());
        tokio::task::yield_now().await;
        match self.links.get(url) {
            Some(links) => Ok(FetchedPage::new(200, links.clone())),
            None => Ok(FetchedPage::new(404, Vec::new())),
        }
    }
}

/// True if `children` appear in `links` in the same relative order
fn is_in_order_subsequence(children: &[&str], links: &[String]) -> bool {
    let mut links = links.iter();
    children
        .iter()
        .all(|child| links.any(|link| link.as_str() == *child))
}

fn assert_tree_shape(root: &PageNode, fetcher: &GraphFetcher, max_depth: u32, limit: usize) {
    let mut seen = HashSet::new();
    for node in root.iter() {
        assert!(seen.insert(node.url.clone()), "{} appears twice", node.url);
        assert!(node.depth >= 1 && node.depth <= max_depth);
        assert!(node.outcome.is_some());
        assert!(node.children.len() <= limit);
        if !node.children.is_empty() {
            assert!(node.is_success());
            assert!(node.depth < max_depth);
        }
        for child in &node.children {
            assert_eq!(child.depth, node.depth + 1);
        }
        if let Some(links) = fetcher.links.get(&node.url) {
            assert!(
                is_in_order_subsequence(&node.child_urls(), links),
                "children of {} out of link order: {:?}",
                node.url,
                node.child_urls()
            );
        }
    }
}

#[test]
fn test_in_order_subsequence() {
    let links: Vec<String> = ["a", "b", "c", "b"].iter().map(|s| s.to_string()).collect();
    assert!(is_in_order_subsequence(&["a", "c"], &links));
    assert!(is_in_order_subsequence(&["c", "b"], &links));
    assert!(!is_in_order_subsequence(&["c", "a"], &links));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_tree_shape_over_link_graph() {
    for (max_depth, limit) in [(1, 1), (2, 3), (3, 2), (4, 4), (6, 3)] {
        let fetcher = Arc::new(GraphFetcher::new(60, 5));
        let coordinator = Coordinator::new(fetcher.clone());

        let request = CrawlRequest::new(page_url(0), max_depth, limit);
        let root = coordinator.crawl(&request).await.unwrap();

        assert_eq!(root.url, page_url(0));
        assert_tree_shape(&root, &fetcher, max_depth, limit as usize);

        // Every tree node was fetched exactly once, and nothing else was
        let fetched = fetcher.fetched.lock().unwrap().clone();
        let unique: HashSet<_> = fetched.iter().cloned().collect();
        assert_eq!(unique.len(), fetched.len());
        assert_eq!(fetched.len(), root.page_count());
        for url in &fetched {
            assert!(root.find(url).is_some());
        }
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_global_fetch_cap_completes() {
    let fetcher = Arc::new(GraphFetcher::new(40, 4));
    let coordinator = Coordinator::new(fetcher.clone()).with_max_concurrent_fetches(1);

    let request = CrawlRequest::new(page_url(0), 4, 4);
    let root = coordinator.crawl(&request).await.unwrap();

    assert_tree_shape(&root, &fetcher, 4, 4);
    assert_eq!(fetcher.fetched.lock().unwrap().len(), root.page_count());
}
