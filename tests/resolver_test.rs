//! Tests for config resolution.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::json;
use strictly_bingo::{
    ConfigResolver, Fetch, FetchedDocument, HttpFetcher, ResolveError, cache_busted, publish,
    validate_document,
};

/// Returns a canned response and records every requested URL.
#[derive(Debug, Clone, Default)]
struct StubFetcher {
    response: Option<FetchedDocument>,
    requests: Arc<Mutex<Vec<String>>>,
}

impl StubFetcher {
    fn responding(status: u16, content_type: Option<&str>, body: &str) -> Self {
        Self {
            response: Some(FetchedDocument::new(
                status,
                content_type.map(str::to_string),
                body.to_string(),
            )),
            requests: Arc::default(),
        }
    }

    fn requests(&self) -> Vec<String> {
        self.requests.lock().expect("Lock poisoned").clone()
    }
}

#[async_trait]
impl Fetch for StubFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedDocument, ResolveError> {
        self.requests.lock().expect("Lock poisoned").push(url.to_string());
        self.response.clone().ok_or_else(|| ResolveError::Transport {
            message: "connection refused".to_string(),
        })
    }
}

fn sixteen_words() -> Vec<String> {
    (1..=16).map(|i| format!("m{i}")).collect()
}

#[tokio::test]
async fn test_missing_source_makes_no_request() {
    let fetcher = StubFetcher::responding(200, Some("application/json"), "{}");
    let resolver = ConfigResolver::new(fetcher.clone());

    let config = resolver.resolve_location("https://bingo.test/?view=player").await;

    assert_eq!(config.error(), Some("no source provided"));
    assert!(fetcher.requests().is_empty());
}

#[tokio::test]
async fn test_http_error_status() {
    let resolver = ConfigResolver::new(StubFetcher::responding(404, Some("text/html"), "nope"));

    let config = resolver.resolve_source("https://data.test/bingo.json").await;

    assert_eq!(config.error(), Some("HTTP 404"));
    assert!(config.categories().is_empty());
}

#[tokio::test]
async fn test_html_is_not_json() {
    let resolver = ConfigResolver::new(StubFetcher::responding(
        200,
        Some("text/html"),
        "<html><body>hi</body></html>",
    ));

    let config = resolver.resolve_source("https://data.test/bingo.json").await;
    assert_eq!(config.error(), Some("response is not JSON"));
}

#[tokio::test]
async fn test_json_content_type_with_bad_body_reports_parser_message() {
    let resolver = ConfigResolver::new(StubFetcher::responding(
        200,
        Some("Application/JSON; charset=utf-8"),
        "<html></html>",
    ));

    let err = resolver
        .try_resolve("https://data.test/bingo.json")
        .await
        .unwrap_err();
    match err {
        ResolveError::Parse { message } => assert!(message.contains("line 1")),
        other => panic!("Expected parse error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_object_shaped_body_needs_no_content_type() {
    let body = json!({ "categories": { "A": sixteen_words() } }).to_string();
    let resolver = ConfigResolver::new(StubFetcher::responding(200, None, &format!("\n  {body}\n")));

    let config = resolver.resolve_source("https://data.test/bingo.json").await;
    assert!(config.error().is_none());
    assert_eq!(config.category_names(), ["A"]);
}

#[tokio::test]
async fn test_legacy_cats_document() {
    let body = json!({ "cats": { "Movies": sixteen_words() } }).to_string();
    let resolver = ConfigResolver::new(StubFetcher::responding(200, Some("application/json"), &body));

    let config = resolver.resolve_source("https://data.test/bingo.json").await;

    assert!(config.error().is_none());
    assert_eq!(config.category_names(), ["Movies"]);
    assert_eq!(config.words("Movies").map(<[String]>::len), Some(16));
}

#[tokio::test]
async fn test_category_list_follows_document_order() {
    let body = r#"{"cats":{"Zoo":["a"],"Apple":["b"],"Mango":["c"]}}"#;
    let resolver = ConfigResolver::new(StubFetcher::responding(200, Some("application/json"), body));

    let config = resolver.resolve_source("https://data.test/bingo.json").await;
    assert!(config.error().is_none());
    assert_eq!(config.category_names(), ["Zoo", "Apple", "Mango"]);
}

#[tokio::test]
async fn test_numeric_and_null_pools_resolve() {
    let numbers: Vec<u32> = (1..=16).collect();
    let body = json!({ "cats": { "Nums": numbers, "Nothing": null } }).to_string();
    let resolver = ConfigResolver::new(StubFetcher::responding(200, Some("application/json"), &body));

    let config = resolver.resolve_source("https://data.test/bingo.json").await;

    assert!(config.error().is_none(), "error: {:?}", config.error());
    assert_eq!(config.category_names(), ["Nums", "Nothing"]);
    assert_eq!(config.words("Nums").map(<[String]>::len), Some(16));
    assert_eq!(config.words("Nothing").map(<[String]>::len), Some(0));
}

#[tokio::test]
async fn test_missing_or_non_object_categories() {
    for body in [
        r#"{"size": 4}"#,
        r#"{"categories": ["a", "b"]}"#,
        r#"{"cats": "Movies"}"#,
    ] {
        let resolver = ConfigResolver::new(StubFetcher::responding(200, Some("application/json"), body));
        let config = resolver.resolve_source("https://data.test/bingo.json").await;
        assert_eq!(config.error(), Some("missing categories field"), "body: {body}");
    }
}

#[tokio::test]
async fn test_document_fields_pass_through() {
    let body = json!({
        "categories": { "A": sixteen_words(), "B": sixteen_words() },
        "order": ["B", "A"],
        "size": 4,
        "requiredLines": 3,
        "updatedAt": "2025-01-01T00:00:00Z"
    })
    .to_string();
    let resolver = ConfigResolver::new(StubFetcher::responding(200, Some("application/json"), &body));

    let config = resolver.resolve_source("https://data.test/bingo.json").await;

    assert_eq!(config.category_names(), ["B", "A"]);
    assert_eq!(config.updated_at(), Some("2025-01-01T00:00:00Z"));
    assert_eq!(*config.required_lines(), Some(3));
}

#[tokio::test]
async fn test_error_payload_document_stays_failed() {
    let body = json!({ "categories": {}, "error": "maintenance" }).to_string();
    let resolver = ConfigResolver::new(StubFetcher::responding(200, Some("application/json"), &body));

    let config = resolver.resolve_source("https://data.test/bingo.json").await;
    assert_eq!(config.error(), Some("maintenance"));
}

#[tokio::test]
async fn test_transport_failure_becomes_config_error() {
    let resolver = ConfigResolver::new(StubFetcher::default());
    let config = resolver.resolve_source("https://data.test/bingo.json").await;
    assert_eq!(config.error(), Some("connection refused"));
}

#[tokio::test]
async fn test_request_is_cache_busted_and_resolved() {
    let fetcher = StubFetcher::responding(200, Some("application/json"), r#"{"cats":{}}"#);
    let resolver = ConfigResolver::new(fetcher.clone());

    resolver
        .resolve_location("https://bingo.test/app/?view=player&src=data/bingo.json%3Fv%3D2")
        .await;

    let requests = fetcher.requests();
    assert_eq!(requests.len(), 1);
    assert!(
        requests[0].starts_with("https://bingo.test/data/bingo.json?v=2&_ts="),
        "got {}",
        requests[0]
    );
}

#[tokio::test]
async fn test_invalid_location() {
    let resolver = ConfigResolver::new(StubFetcher::default());
    let config = resolver.resolve_location("::not a url::").await;
    let reason = config.error().expect("Failure expected");
    assert!(reason.contains("Invalid page location"));
}

#[test]
fn test_cache_busted_separator() {
    assert_eq!(cache_busted("https://d.test/a.json", 42), "https://d.test/a.json?_ts=42");
    assert_eq!(
        cache_busted("https://d.test/a.json?v=1", 42),
        "https://d.test/a.json?v=1&_ts=42"
    );
}

#[test]
fn test_validate_document_directly() {
    assert!(matches!(
        validate_document(Some("text/plain"), "plain text"),
        Err(ResolveError::NotJson)
    ));
    assert!(validate_document(Some("text/plain"), r#"{"categories":{}}"#).is_ok());
}

/// Serves `document` on an ephemeral port and returns the base URL.
async fn spawn_document_server(document: std::path::PathBuf) -> String {
    let app = publish::document_router(document, publish::DEFAULT_ROUTE);
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", 0))
        .await
        .expect("Bind ephemeral port");
    let addr = listener.local_addr().expect("Local address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server runs");
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn test_resolves_over_http() {
    let dir = tempfile::TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("bingo.json");
    let body = json!({ "cats": { "Movies": sixteen_words() }, "ord": ["Movies"] });
    std::fs::write(&path, body.to_string()).expect("Write document");

    let base = spawn_document_server(path).await;
    let resolver = ConfigResolver::new(HttpFetcher::new());
    let config = resolver
        .resolve_location(&format!("{base}/?view=player&src=/bingo.json"))
        .await;

    assert!(config.error().is_none(), "error: {:?}", config.error());
    assert_eq!(config.category_names(), ["Movies"]);
}

#[tokio::test]
async fn test_http_404_over_http() {
    let dir = tempfile::TempDir::new().expect("Failed to create temp dir");
    let base = spawn_document_server(dir.path().join("missing.json")).await;

    let resolver = ConfigResolver::new(HttpFetcher::new());
    let config = resolver.resolve_source(&format!("{base}/bingo.json")).await;

    assert_eq!(config.error(), Some("HTTP 404"));
    assert!(config.categories().is_empty());
}
