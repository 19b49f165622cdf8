//! Integration tests for the page data flow: catalog → search index,
//! catalog → icon resolution and loading, and persisted state.
//!
//! HTTP endpoints are mocked with wiremock; each test uses its own
//! in-memory SQLite database.

use sitenav::catalog::{load_catalog, CatalogOrigin, CatalogSource};
use sitenav::config::IconServiceConfig;
use sitenav::icons::{load_icon, IconKind, IconRef, IconResolver};
use sitenav::search::{SearchIndex, SearchOutcome};
use sitenav::storage::{Database, MAX_CLICK_HISTORY};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CATALOG: &str = r#"{
  "categories": [
    { "name": "Video", "links": [
        { "title": "Tencent Video", "url": "https://v.qq.com" },
        { "title": "Bilibili", "url": "https://www.bilibili.com" }
    ]},
    { "name": "Dev", "links": [
        { "title": "GitHub", "url": "https://github.com" },
        { "title": "Rust", "url": "https://www.rust-lang.org" }
    ]}
  ]
}"#;

const TIMEOUT: Duration = Duration::from_secs(2);

async fn serve_catalog(server: &MockServer) -> CatalogSource {
    Mock::given(method("GET"))
        .and(path("/site.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string(CATALOG))
        .mount(server)
        .await;
    CatalogSource::Remote(Url::parse(&format!("{}/site.json", server.uri())).unwrap())
}

fn service(name: &str, template: String) -> IconServiceConfig {
    IconServiceConfig {
        name: name.to_string(),
        template,
    }
}

// ============================================================================
// Catalog → Search
// ============================================================================

#[tokio::test]
async fn test_remote_catalog_drives_search() {
    let server = MockServer::start().await;
    let source = serve_catalog(&server).await;

    let loaded = load_catalog(&reqwest::Client::new(), &source).await;
    assert_eq!(loaded.origin, CatalogOrigin::Source);

    let index = SearchIndex::build(&loaded.catalog);
    assert_eq!(index.len(), 4);

    // Category names match every link in them
    let results = index.search("dev");
    assert_eq!(results.results().len(), 2);

    // Domains match with the leading www. removed
    let results = index.search("rust-lang");
    assert_eq!(results.results()[0].title, "Rust");
    assert_eq!(results.results()[0].domain, "rust-lang.org");

    assert_eq!(index.search("   "), SearchOutcome::Inactive);
    assert_eq!(index.search("nope"), SearchOutcome::Matches(Vec::new()));
}

#[tokio::test]
async fn test_unreachable_catalog_falls_back_to_builtin() {
    let source = CatalogSource::Remote(Url::parse("http://127.0.0.1:1/site.json").unwrap());
    let loaded = load_catalog(&reqwest::Client::new(), &source).await;

    assert!(loaded.is_fallback());
    let index = SearchIndex::build(&loaded.catalog);
    assert_eq!(index.search("github").results().len(), 1);
}

// ============================================================================
// Catalog → Icons
// ============================================================================

#[tokio::test]
async fn test_icon_chain_over_catalog() {
    let server = MockServer::start().await;
    let source = serve_catalog(&server).await;
    Mock::given(method("HEAD"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let client = reqwest::Client::new();
    let loaded = load_catalog(&client, &source).await;
    let resolver = Arc::new(IconResolver::new(
        client.clone(),
        vec![service("mock", format!("{}/icons/{{domain}}", server.uri()))],
        &HashMap::new(),
        TIMEOUT,
    ));

    let urls: Vec<String> = loaded.catalog.links().map(|l| l.url.clone()).collect();
    resolver.preload(urls).await.unwrap();

    // Local table entries win over services
    let bilibili = resolver.cached("https://bilibili.com/anything").unwrap();
    assert_eq!(bilibili.kind(), IconKind::Local);
    assert_eq!(bilibili.as_str(), "assets/icons/bilibili.png");

    // The table is keyed by exact domain: v.qq.com is not qq.com
    let qq = resolver.cached("https://v.qq.com").unwrap();
    assert_eq!(qq.as_str(), format!("{}/icons/v.qq.com", server.uri()));

    // Everything else comes from the service, keyed by domain
    let github = resolver.cached("https://github.com").unwrap();
    assert_eq!(github.as_str(), format!("{}/icons/github.com", server.uri()));
    let rust = resolver.cached("https://www.rust-lang.org").unwrap();
    assert_eq!(rust.as_str(), format!("{}/icons/rust-lang.org", server.uri()));

    assert_eq!(resolver.cache_stats().cached, 4);
}

#[tokio::test]
async fn test_resolved_icon_that_fails_to_load() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = reqwest::Client::new();
    let resolver = IconResolver::new(
        client.clone(),
        vec![service("mock", format!("{}/icons/{{domain}}", server.uri()))],
        &HashMap::new(),
        TIMEOUT,
    );

    // The probe answered, so the service URL is accepted...
    let icon = resolver.resolve("https://github.com").await;
    assert_eq!(icon.kind(), IconKind::Remote);

    // ...and the failure only shows up when the image is loaded
    let result = load_icon(&client, &icon, Path::new("/nonexistent"), TIMEOUT).await;
    assert!(result.is_err());

    // The cached entry is kept
    assert_eq!(resolver.cached("https://github.com"), Some(icon));
}

#[tokio::test]
async fn test_no_services_uses_site_favicon() {
    let resolver = IconResolver::new(
        reqwest::Client::new(),
        Vec::new(),
        &HashMap::new(),
        TIMEOUT,
    );
    let icon = resolver.resolve("https://www.example.org:8443/page").await;
    assert_eq!(icon, IconRef::new("https://www.example.org/favicon.ico"));
}

// ============================================================================
// Persisted State
// ============================================================================

#[tokio::test]
async fn test_state_survives_reopen_of_shared_handle() {
    let db = Database::open(":memory:").await.unwrap();
    let other = db.clone();

    db.store_theme("dark").await.unwrap();
    for n in 0..(MAX_CLICK_HISTORY + 5) {
        other
            .track_click(&format!("Site {n}"), &format!("https://site{n}.example"))
            .await
            .unwrap();
    }

    assert_eq!(other.stored_theme().await.unwrap().as_deref(), Some("dark"));
    let clicks = db.recent_clicks().await.unwrap();
    assert_eq!(clicks.len(), MAX_CLICK_HISTORY);
    assert_eq!(clicks[0].title, format!("Site {}", MAX_CLICK_HISTORY + 4));
}
