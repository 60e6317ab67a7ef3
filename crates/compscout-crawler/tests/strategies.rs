//! Fetch strategies and the crawler chain against mocked HTTP backends.

use std::sync::Arc;

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

use compscout_crawler::{
    identify_platform, BrowserStrategy, CrawlerChain, CrawlerError, FetchStrategy,
    FirecrawlStrategy, PlatformKind, ReaderStrategy,
};

fn article(title: &str) -> String {
    format!(
        "# {title}\n\n{}",
        "Jasper helps teams write on-brand content faster. ".repeat(4)
    )
}

// ---------------------------------------------------------------------------
// Firecrawl
// ---------------------------------------------------------------------------

#[tokio::test]
async fn firecrawl_returns_markdown_and_metadata_title() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/scrape"))
        .and(header("authorization", "Bearer fc-key"))
        .and(body_json(json!({
            "url": "https://www.jasper.ai/pricing",
            "formats": ["markdown"]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {
                "markdown": article("Pricing"),
                "metadata": {"title": "Jasper Pricing", "statusCode": 200}
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let strategy = FirecrawlStrategy::with_base_url("fc-key", 5, &server.uri()).unwrap();
    let platform = identify_platform("https://www.jasper.ai/pricing").unwrap();
    let result = strategy
        .fetch("https://www.jasper.ai/pricing", &platform)
        .await
        .unwrap();

    assert!(result.success);
    assert_eq!(result.title, "Jasper Pricing");
    assert_eq!(result.method, "firecrawl");
    assert_eq!(result.platform, PlatformKind::Website);
    assert_eq!(result.metadata["api"], "firecrawl-v2");
}

#[tokio::test]
async fn firecrawl_rejects_captcha_pages() {
    let server = MockServer::start().await;
    let page = format!("{}\nPlease complete the CAPTCHA to continue", "x".repeat(120));
    Mock::given(method("POST"))
        .and(path("/v1/scrape"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {"markdown": page}
        })))
        .mount(&server)
        .await;

    let strategy = FirecrawlStrategy::with_base_url("fc-key", 5, &server.uri()).unwrap();
    let platform = identify_platform("https://example.org/").unwrap();
    let err = strategy
        .fetch("https://example.org/", &platform)
        .await
        .unwrap_err();
    assert!(matches!(err, CrawlerError::VerificationPage { .. }), "got {err:?}");
}

#[tokio::test]
async fn firecrawl_success_false_is_unsuccessful() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/scrape"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "error": "blocked"
        })))
        .mount(&server)
        .await;

    let strategy = FirecrawlStrategy::with_base_url("fc-key", 5, &server.uri()).unwrap();
    let platform = identify_platform("https://example.org/").unwrap();
    let err = strategy
        .fetch("https://example.org/", &platform)
        .await
        .unwrap_err();
    assert!(
        matches!(err, CrawlerError::Unsuccessful { ref reason, .. } if reason == "blocked"),
        "got {err:?}"
    );
}

#[tokio::test]
async fn firecrawl_without_key_is_unavailable_and_fails_fast() {
    let server = MockServer::start().await;
    let strategy = FirecrawlStrategy::with_base_url("", 5, &server.uri()).unwrap();
    assert!(!strategy.is_available());

    let platform = identify_platform("https://example.org/").unwrap();
    let err = strategy
        .fetch("https://example.org/", &platform)
        .await
        .unwrap_err();
    assert!(matches!(err, CrawlerError::MissingCredential { .. }));
    assert!(server.received_requests().await.unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// Reader proxy
// ---------------------------------------------------------------------------

#[tokio::test]
async fn reader_sends_platform_user_agent_and_extracts_heading() {
    let server = MockServer::start().await;
    let platform = identify_platform("https://zhuanlan.zhihu.com/p/123").unwrap();

    Mock::given(method("GET"))
        .and(path_regex(r"zhuanlan\.zhihu\.com/p/123$"))
        .and(header("accept", "text/markdown"))
        .and(header("user-agent", platform.user_agent))
        .respond_with(ResponseTemplate::new(200).set_body_string(article("知乎专栏")))
        .expect(1)
        .mount(&server)
        .await;

    let strategy = ReaderStrategy::with_base_url(5, &server.uri()).unwrap();
    let result = strategy
        .fetch("https://zhuanlan.zhihu.com/p/123", &platform)
        .await
        .unwrap();

    assert_eq!(result.title, "知乎专栏");
    assert_eq!(result.method, "jina");
    assert_eq!(result.platform, PlatformKind::Zhihu);
    assert_eq!(result.url, "https://zhuanlan.zhihu.com/p/123");
}

#[tokio::test]
async fn reader_non_200_is_unexpected_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(451))
        .mount(&server)
        .await;

    let strategy = ReaderStrategy::with_base_url(5, &server.uri()).unwrap();
    let platform = identify_platform("https://example.org/").unwrap();
    let err = strategy
        .fetch("https://example.org/", &platform)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        CrawlerError::UnexpectedStatus { status: 451, .. }
    ));
}

// ---------------------------------------------------------------------------
// Chain
// ---------------------------------------------------------------------------

#[tokio::test]
async fn chain_falls_back_to_reader_when_firecrawl_content_is_too_short() {
    let firecrawl_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/scrape"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {"markdown": "Access denied"}
        })))
        .expect(1)
        .mount(&firecrawl_server)
        .await;

    let reader_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(article("Jasper")))
        .expect(1)
        .mount(&reader_server)
        .await;

    let strategies: Vec<Arc<dyn FetchStrategy>> = vec![
        Arc::new(FirecrawlStrategy::with_base_url("fc-key", 5, &firecrawl_server.uri()).unwrap()),
        Arc::new(ReaderStrategy::with_base_url(5, &reader_server.uri()).unwrap()),
        Arc::new(BrowserStrategy),
    ];
    let chain = CrawlerChain::new(strategies);

    let result = chain.crawl("https://www.jasper.ai/").await.unwrap();
    assert_eq!(result.method, "jina");
    assert_eq!(result.title, "Jasper");
}

#[tokio::test]
async fn chain_without_firecrawl_key_goes_straight_to_reader() {
    let firecrawl_server = MockServer::start().await;
    let reader_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(article("Copy.ai")))
        .expect(1)
        .mount(&reader_server)
        .await;

    let strategies: Vec<Arc<dyn FetchStrategy>> = vec![
        Arc::new(FirecrawlStrategy::with_base_url("", 5, &firecrawl_server.uri()).unwrap()),
        Arc::new(ReaderStrategy::with_base_url(5, &reader_server.uri()).unwrap()),
    ];
    let chain = CrawlerChain::new(strategies);

    let result = chain.crawl("https://www.copy.ai/").await.unwrap();
    assert_eq!(result.method, "jina");
    assert!(firecrawl_server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn chain_reports_last_error_when_everything_fails() {
    let reader_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("too short"))
        .mount(&reader_server)
        .await;

    let strategies: Vec<Arc<dyn FetchStrategy>> = vec![
        Arc::new(ReaderStrategy::with_base_url(5, &reader_server.uri()).unwrap()),
        Arc::new(BrowserStrategy),
    ];
    let chain = CrawlerChain::new(strategies);

    let err = chain.crawl("https://example.org/").await.unwrap_err();
    match err {
        CrawlerError::AllStrategiesFailed { source } => {
            assert!(matches!(*source, CrawlerError::ContentTooShort { chars: 9, .. }));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}
