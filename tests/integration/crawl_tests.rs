//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the crawl, quiescence and flatten cycle end-to-end.

use doc_harvest::config::{CrawlerConfig, MissingTitle};
use doc_harvest::crawler::Crawler;
use doc_harvest::manifest::{flatten, ManifestNode};
use doc_harvest::HarvestError;
use reqwest::Client;
use tokio_util::sync::CancellationToken;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Builds an HTML page with a title and one anchor per reference
fn page(title: Option<&str>, references: &[&str]) -> String {
    let head = title
        .map(|t| format!("<head><title>{}</title></head>", t))
        .unwrap_or_default();
    let links: String = references
        .iter()
        .map(|r| format!("<a href=\"{}\">{}</a>\n", r, r))
        .collect();
    format!("<html>{}<body>{}</body></html>", head, links)
}

async fn mount_page(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

fn crawler(config: CrawlerConfig) -> Crawler {
    Crawler::new(&config, Client::new(), CancellationToken::new())
}

#[tokio::test]
async fn test_single_page_with_documents() {
    let mock_server = MockServer::start().await;
    mount_page(
        &mock_server,
        "/index.html",
        page(Some("Report"), &["a.pdf", "b.pdf"]),
    )
    .await;

    let seed = format!("{}/index.html", mock_server.uri());
    let crawler = crawler(CrawlerConfig::default());
    let manifest = crawler.crawl(&[seed.clone()]).await.unwrap();

    let root = manifest.get(&seed).expect("seed should be in the manifest");
    assert_eq!(root.title(), Some("Report"));
    let children = root.children().unwrap();
    assert_eq!(children.len(), 2);
    assert_eq!(
        children.get("a.pdf").map(ManifestNode::location),
        Some(&Url::parse(&format!("{}/a.pdf", mock_server.uri())).unwrap())
    );

    let dir = tempfile::tempdir().unwrap();
    let queue = flatten(&manifest, dir.path()).unwrap();
    assert_eq!(queue.len(), 2);
    assert!(dir.path().join("Report").is_dir());
    assert!(queue
        .iter()
        .all(|item| item.directory == dir.path().join("Report")));
}

#[tokio::test]
async fn test_nested_pages_become_nested_directories() {
    let mock_server = MockServer::start().await;
    mount_page(
        &mock_server,
        "/index.html",
        page(Some("Report"), &["sub.html"]),
    )
    .await;
    mount_page(&mock_server, "/sub.html", page(Some("Sub"), &["c.pdf"])).await;

    let seed = format!("{}/index.html", mock_server.uri());
    let crawler = crawler(CrawlerConfig::default());
    let manifest = crawler.crawl(&[seed]).await.unwrap();

    assert_eq!(manifest.page_count(), 2);
    assert_eq!(manifest.document_count(), 1);

    let dir = tempfile::tempdir().unwrap();
    let queue = flatten(&manifest, dir.path()).unwrap();
    let items: Vec<_> = queue.into_iter().collect();

    assert_eq!(items.len(), 1);
    assert_eq!(items[0].directory, dir.path().join("Report").join("Sub"));
    assert_eq!(
        items[0].location.as_str(),
        format!("{}/c.pdf", mock_server.uri())
    );
}

#[tokio::test]
async fn test_every_document_location_is_absolute() {
    let mock_server = MockServer::start().await;
    mount_page(
        &mock_server,
        "/docs/index.html",
        page(Some("Docs"), &["guide.html", "files/x.pdf"]),
    )
    .await;
    mount_page(
        &mock_server,
        "/docs/guide.html",
        page(Some("Guide"), &["files/y.pdf"]),
    )
    .await;

    let seed = format!("{}/docs/index.html", mock_server.uri());
    let crawler = crawler(CrawlerConfig::default());
    let manifest = crawler.crawl(&[seed]).await.unwrap();

    let locations = manifest.document_locations();
    assert_eq!(locations.len(), 2);
    for location in locations {
        assert!(location.has_host());
        assert!(location.path().starts_with("/docs/files/"));
    }
}

#[tokio::test]
async fn test_empty_seed_set_settles_with_nothing() {
    let crawler = crawler(CrawlerConfig::default());
    let manifest = crawler.crawl(&[]).await.unwrap();

    assert!(manifest.is_empty());
    assert_eq!(crawler.detector().fire_count(), 1);

    let dir = tempfile::tempdir().unwrap();
    let queue = flatten(&manifest, dir.path()).unwrap();
    assert!(queue.is_empty());
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_quiescence_fires_exactly_once() {
    let mock_server = MockServer::start().await;
    mount_page(
        &mock_server,
        "/index.html",
        page(Some("Root"), &["one.html", "two.html", "r.pdf"]),
    )
    .await;
    mount_page(&mock_server, "/one.html", page(Some("One"), &["a.pdf"])).await;
    mount_page(
        &mock_server,
        "/two.html",
        page(Some("Two"), &["b.pdf", "c.pdf"]),
    )
    .await;

    let seed = format!("{}/index.html", mock_server.uri());
    let crawler = crawler(CrawlerConfig::default());
    let manifest = crawler.crawl(&[seed]).await.unwrap();

    assert_eq!(manifest.document_count(), 4);
    assert!(crawler.detector().is_quiescent());
    assert_eq!(crawler.detector().pending(), 0);
    assert_eq!(crawler.detector().fire_count(), 1);
}

#[tokio::test]
async fn test_fetch_failure_aborts_crawl() {
    let mock_server = MockServer::start().await;
    mount_page(
        &mock_server,
        "/index.html",
        page(Some("Report"), &["a.pdf", "missing.html"]),
    )
    .await;

    let seed = format!("{}/index.html", mock_server.uri());
    let crawler = crawler(CrawlerConfig::default());
    let result = crawler.crawl(&[seed]).await;

    assert!(matches!(
        result,
        Err(HarvestError::HttpStatus { status: 404, .. })
    ));
    assert_eq!(crawler.detector().fire_count(), 1);
}

#[tokio::test]
async fn test_fetch_failure_isolated_when_not_aborting() {
    let mock_server = MockServer::start().await;
    mount_page(
        &mock_server,
        "/index.html",
        page(Some("Report"), &["a.pdf", "missing.html"]),
    )
    .await;

    let seed = format!("{}/index.html", mock_server.uri());
    let crawler = crawler(CrawlerConfig {
        abort_on_fetch_error: false,
        ..CrawlerConfig::default()
    });
    let manifest = crawler.crawl(&[seed.clone()]).await.unwrap();

    let children = manifest.get(&seed).unwrap().children().unwrap();
    assert_eq!(children.len(), 1);
    assert!(children.contains_key("a.pdf"));
}

#[tokio::test]
async fn test_missing_title_skips_page() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "/index.html", page(None, &["a.pdf"])).await;

    let seed = format!("{}/index.html", mock_server.uri());
    let crawler = crawler(CrawlerConfig::default());
    let manifest = crawler.crawl(&[seed]).await.unwrap();

    assert!(manifest.is_empty());
}

#[tokio::test]
async fn test_missing_title_falls_back_to_reference() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "/index.html", page(Some("Root"), &["notes.html"])).await;
    mount_page(&mock_server, "/notes.html", page(None, &["n.pdf"])).await;

    let seed = format!("{}/index.html", mock_server.uri());
    let crawler = crawler(CrawlerConfig {
        missing_title: MissingTitle::Reference,
        ..CrawlerConfig::default()
    });
    let manifest = crawler.crawl(&[seed]).await.unwrap();

    let dir = tempfile::tempdir().unwrap();
    let items: Vec<_> = flatten(&manifest, dir.path()).unwrap().into_iter().collect();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].directory, dir.path().join("Root").join("notes"));
}

#[tokio::test]
async fn test_cycles_are_not_followed() {
    let mock_server = MockServer::start().await;
    mount_page(
        &mock_server,
        "/index.html",
        page(Some("Root"), &["index.html", "loop.html"]),
    )
    .await;
    mount_page(
        &mock_server,
        "/loop.html",
        page(Some("Loop"), &["index.html", "l.pdf"]),
    )
    .await;

    let seed = format!("{}/index.html", mock_server.uri());
    let crawler = crawler(CrawlerConfig::default());
    let manifest = crawler.crawl(&[seed]).await.unwrap();

    assert_eq!(manifest.page_count(), 2);
    assert_eq!(manifest.document_count(), 1);
    assert_eq!(crawler.detector().fire_count(), 1);
}

#[tokio::test]
async fn test_max_depth_limits_nesting() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "/index.html", page(Some("L0"), &["l1.html"])).await;
    mount_page(&mock_server, "/l1.html", page(Some("L1"), &["l2.html"])).await;
    mount_page(&mock_server, "/l2.html", page(Some("L2"), &["deep.pdf"])).await;

    let seed = format!("{}/index.html", mock_server.uri());
    let crawler = crawler(CrawlerConfig {
        max_depth: 1,
        ..CrawlerConfig::default()
    });
    let manifest = crawler.crawl(&[seed]).await.unwrap();

    assert_eq!(manifest.page_count(), 2);
    assert_eq!(manifest.document_count(), 0);
}
