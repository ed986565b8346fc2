//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and run the full
//! crawl cycle end-to-end through the public API.

use site_inspector::config::Config;
use site_inspector::output::{write_report, FindingKind};
use site_inspector::{run_crawl, FailureReason, Finding, Inspector, JsonRenderer, TextRenderer};
use std::io::Write;
use std::time::Duration;
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration with short timeouts and no spell checking
fn test_config() -> Config {
    let mut config = Config::default();
    config.crawler.worker_count = 3;
    config.crawler.request_timeout_ms = 2_000;
    config.crawler.probe_timeout_ms = 1_000;
    config.spelling.enabled = false;
    config.user_agent.crawler_name = "TestBot".to_string();
    config
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(
        format!("<html><body>{}</body></html>", body),
        "text/html",
    )
}

async fn mount_page(server: &MockServer, route: &str, body: &str) {
    Mock::given(path(route))
        .respond_with(html(body))
        .mount(server)
        .await;
}

fn visited(report: &site_inspector::CrawlReport) -> Vec<String> {
    report.pages.iter().map(|p| p.url.as_url().path().to_string()).collect()
}

#[tokio::test]
async fn test_full_crawl_single_site() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        r#"<a href="/about">About</a> <a href="/blog/">Blog</a> <img src="/logo.png">"#,
    )
    .await;
    mount_page(&server, "/about", r#"<a href="/">Home</a>"#).await;
    mount_page(&server, "/blog/", r#"<a href="/about">About</a>"#).await;
    Mock::given(path("/logo.png"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(vec![0u8; 16], "image/png"))
        .mount(&server)
        .await;

    let inspector = Inspector::new(test_config()).unwrap();
    let report = inspector.run(&server.uri()).await.unwrap();

    assert_eq!(report.pages_visited, 3);
    assert_eq!(report.pages_discovered, 3);
    assert_eq!(visited(&report), vec!["/", "/about", "/blog"]);
    assert!(report.is_clean(), "unexpected findings: {:?}", report.findings);
    assert!(!report.aborted);
    assert!(report.user_agent.starts_with("TestBot/"));
}

#[tokio::test]
async fn test_broken_link_reported_and_not_crawled() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        r#"<a href="/missing">Gone</a> <a href="/ok">Fine</a>"#,
    )
    .await;
    mount_page(&server, "/ok", "fine").await;

    let inspector = Inspector::new(test_config()).unwrap();
    let report = inspector.run(&server.uri()).await.unwrap();

    assert_eq!(visited(&report), vec!["/", "/ok"]);
    assert_eq!(report.count(FindingKind::BrokenLink), 1);

    let finding = &report.findings[0];
    assert_eq!(finding.page().as_url().path(), "/");
    assert_eq!(finding.target().unwrap().as_url().path(), "/missing");
    assert_eq!(finding.reason(), Some(&FailureReason::HttpStatus(404)));
}

#[tokio::test]
async fn test_broken_image_reported() {
    let server = MockServer::start().await;
    mount_page(&server, "/", r#"<img src="/images/missing.png">"#).await;

    let inspector = Inspector::new(test_config()).unwrap();
    let report = inspector.run(&server.uri()).await.unwrap();

    assert_eq!(report.pages_visited, 1);
    assert_eq!(report.count(FindingKind::BrokenImage), 1);
    assert_eq!(report.broken_count(), 1);
}

#[tokio::test]
async fn test_misspellings_with_custom_dictionary() {
    let mut dictionary = tempfile::NamedTempFile::new().unwrap();
    writeln!(dictionary, "welcome\nto\nour\nwebsite\nplease\nread\nthe\nnews").unwrap();

    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        "<p>Welcome to our websit. Please raed the news.</p><script>var notaword = 1;</script>",
    )
    .await;

    let mut config = test_config();
    config.spelling.enabled = true;
    config.spelling.dictionary_path = Some(dictionary.path().to_path_buf());

    let inspector = Inspector::new(config).unwrap();
    let report = inspector.run(&server.uri()).await.unwrap();

    let words: Vec<(&str, Option<&str>)> = report
        .findings
        .iter()
        .filter_map(|f| match f {
            Finding::MisspelledWord {
                word, suggestion, ..
            } => Some((word.as_str(), suggestion.as_deref())),
            _ => None,
        })
        .collect();
    assert_eq!(words, vec![("websit", Some("website")), ("raed", Some("read"))]);
    assert_eq!(report.misspelling_count(), 2);
}

#[tokio::test]
async fn test_missing_dictionary_is_config_error() {
    let mut config = test_config();
    config.spelling.enabled = true;
    config.spelling.dictionary_path = Some("/definitely/not/here/words.txt".into());

    assert!(Inspector::new(config).is_err());
}

#[tokio::test]
async fn test_page_limit_stops_admission() {
    let server = MockServer::start().await;
    let links: String = (0..10)
        .map(|i| format!(r#"<a href="/page{}">Page {}</a>"#, i, i))
        .collect();
    mount_page(&server, "/", &links).await;

    Mock::given(method("HEAD"))
        .and(path_regex(r"^/page\d+$"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/page\d+$"))
        .respond_with(html("never fetched"))
        .expect(0)
        .mount(&server)
        .await;

    let mut config = test_config();
    config.crawler.max_pages = 1;
    let inspector = Inspector::new(config).unwrap();
    let report = inspector.run(&server.uri()).await.unwrap();

    assert_eq!(report.pages_visited, 1);
    assert_eq!(report.pages_discovered, 11);
    assert!(report.is_clean());
}

#[tokio::test]
async fn test_depth_limit() {
    let server = MockServer::start().await;
    mount_page(&server, "/", r#"<a href="/one">1</a>"#).await;
    mount_page(&server, "/one", r#"<a href="/two">2</a>"#).await;
    mount_page(&server, "/two", r#"<a href="/three">3</a>"#).await;
    Mock::given(method("GET"))
        .and(path("/three"))
        .respond_with(html("too deep"))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("HEAD"))
        .and(path("/three"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let mut config = test_config();
    config.crawler.max_depth = 2;
    let inspector = Inspector::new(config).unwrap();
    let report = inspector.run(&server.uri()).await.unwrap();

    assert_eq!(visited(&report), vec!["/", "/one", "/two"]);
    let depths: Vec<u32> = report.pages.iter().map(|p| p.depth).collect();
    assert_eq!(depths, vec![0, 1, 2]);
}

#[tokio::test]
async fn test_robots_disallow_respected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw("User-agent: *\nDisallow: /private/\n", "text/plain"),
        )
        .mount(&server)
        .await;
    mount_page(
        &server,
        "/",
        r#"<a href="/private/secret">Secret</a> <a href="/public">Public</a>"#,
    )
    .await;
    mount_page(&server, "/public", "public").await;
    Mock::given(path("/private/secret"))
        .respond_with(html("secret"))
        .expect(0)
        .mount(&server)
        .await;

    let inspector = Inspector::new(test_config()).unwrap();
    let report = inspector.run(&server.uri()).await.unwrap();

    assert_eq!(visited(&report), vec!["/", "/public"]);
    assert!(report.is_clean());
}

#[tokio::test]
async fn test_relative_links_resolved_against_directory_page() {
    let server = MockServer::start().await;
    mount_page(&server, "/", r#"<a href="/blog/">Blog</a>"#).await;
    mount_page(&server, "/blog/", r#"<a href="post">Post</a>"#).await;
    mount_page(&server, "/blog/post", "post").await;
    Mock::given(path("/post"))
        .respond_with(html("wrong level"))
        .expect(0)
        .mount(&server)
        .await;

    let inspector = Inspector::new(test_config()).unwrap();
    let report = inspector.run(&server.uri()).await.unwrap();

    assert_eq!(visited(&report), vec!["/", "/blog", "/blog/post"]);
    assert!(report.is_clean(), "unexpected findings: {:?}", report.findings);
}

#[tokio::test]
async fn test_robots_disallow_matches_directory_link() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw("User-agent: *\nDisallow: /private/\n", "text/plain"),
        )
        .mount(&server)
        .await;
    mount_page(&server, "/", r#"<a href="/private/">Private</a>"#).await;
    Mock::given(path("/private/"))
        .respond_with(html("secret"))
        .expect(0)
        .mount(&server)
        .await;

    let inspector = Inspector::new(test_config()).unwrap();
    let report = inspector.run(&server.uri()).await.unwrap();

    assert_eq!(visited(&report), vec!["/"]);
    assert!(report.is_clean());
}

#[tokio::test]
async fn test_redirect_into_disallowed_path_not_followed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw("User-agent: *\nDisallow: /private/\n", "text/plain"),
        )
        .mount(&server)
        .await;
    mount_page(&server, "/", r#"<a href="/old">Old</a>"#).await;
    Mock::given(path("/old"))
        .respond_with(ResponseTemplate::new(301).insert_header("location", "/private/secret"))
        .mount(&server)
        .await;
    Mock::given(path("/private/secret"))
        .respond_with(html("secret"))
        .expect(0)
        .mount(&server)
        .await;

    let inspector = Inspector::new(test_config()).unwrap();
    let report = inspector.run(&server.uri()).await.unwrap();

    assert_eq!(visited(&report), vec!["/", "/old"]);
    assert!(report.is_clean(), "unexpected findings: {:?}", report.findings);
}

#[tokio::test]
async fn test_robots_rules_for_named_agent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            "User-agent: TestBot\nDisallow: /\n\nUser-agent: *\nAllow: /\n",
            "text/plain",
        ))
        .mount(&server)
        .await;
    Mock::given(path("/"))
        .respond_with(html("home"))
        .expect(0)
        .mount(&server)
        .await;

    let inspector = Inspector::new(test_config()).unwrap();
    let report = inspector.run(&server.uri()).await.unwrap();

    assert_eq!(report.pages_visited, 0);
    assert!(report.findings.is_empty());
}

#[tokio::test]
async fn test_probe_timeout_is_broken_link() {
    let server = MockServer::start().await;
    mount_page(&server, "/", r#"<a href="/slow">Slow</a>"#).await;
    Mock::given(path("/slow"))
        .respond_with(html("late").set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let mut config = test_config();
    config.crawler.probe_timeout_ms = 200;
    let inspector = Inspector::new(config).unwrap();
    let report = inspector.run(&server.uri()).await.unwrap();

    assert_eq!(report.pages_visited, 1);
    assert_eq!(report.count(FindingKind::BrokenLink), 1);
    assert_eq!(report.findings[0].reason(), Some(&FailureReason::Timeout));
}

#[tokio::test]
async fn test_external_links_probed_not_crawled() {
    let site = MockServer::start().await;
    let external = MockServer::start().await;

    Mock::given(path("/down"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&external)
        .await;
    Mock::given(path("/up"))
        .respond_with(html(r#"<a href="/never">never</a>"#))
        .mount(&external)
        .await;
    mount_page(
        &site,
        "/",
        &format!(
            r#"<a href="{0}/down">Down</a> <a href="{0}/up">Up</a>"#,
            external.uri()
        ),
    )
    .await;

    let inspector = Inspector::new(test_config()).unwrap();
    let report = inspector.run(&site.uri()).await.unwrap();

    assert_eq!(report.pages_visited, 1);
    assert_eq!(report.count(FindingKind::BrokenLink), 1);
    assert_eq!(report.findings[0].reason(), Some(&FailureReason::HttpStatus(500)));

    let requests = external.received_requests().await.unwrap();
    assert!(requests.iter().all(|r| r.url.path() != "/never"));
}

#[tokio::test]
async fn test_seed_failure_is_page_error() {
    let server = MockServer::start().await;
    Mock::given(path("/"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let inspector = Inspector::new(test_config()).unwrap();
    let report = inspector.run(&server.uri()).await.unwrap();

    assert_eq!(report.pages_visited, 1);
    assert_eq!(report.count(FindingKind::PageError), 1);
    assert_eq!(report.findings[0].reason(), Some(&FailureReason::HttpStatus(503)));
}

#[tokio::test]
async fn test_run_crawl_convenience() {
    let server = MockServer::start().await;
    mount_page(&server, "/", r#"<a href="/gone">x</a>"#).await;

    let report = run_crawl(&server.uri(), 10, 2, 2, "ConvenienceBot/2.0")
        .await
        .unwrap();

    assert_eq!(report.pages_visited, 1);
    assert_eq!(report.broken_count(), 1);
    assert_eq!(report.user_agent, "ConvenienceBot/2.0");
}

#[tokio::test]
async fn test_reports_written_to_disk() {
    let server = MockServer::start().await;
    mount_page(&server, "/", r#"<a href="/missing">Gone</a>"#).await;

    let inspector = Inspector::new(test_config()).unwrap();
    let report = inspector.run(&server.uri()).await.unwrap();

    let dir = tempfile::tempdir().unwrap();
    let json_path = dir.path().join("out/report.json");
    let text_path = dir.path().join("out/summary.txt");
    write_report(&JsonRenderer::new(), &report, &json_path).unwrap();
    write_report(&TextRenderer, &report, &text_path).unwrap();

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
    assert_eq!(json["pages_visited"], 1);
    assert_eq!(json["findings"][0]["kind"], "broken_link");

    let text = std::fs::read_to_string(&text_path).unwrap();
    assert!(text.contains("=== Summary Report ==="));
    assert!(text.contains("/missing"));
    assert!(text.contains("=== Crawl Summary ==="));
}
