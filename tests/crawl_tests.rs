//! End-to-end crawl tests against a local mock server

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use web_crawler::crawler::{
    BrowserLauncher, BrowserSession, EventKind, MemorySink, RenderError,
};
use web_crawler::{CrawlRequest, Crawler, FilterSpec, RenderRequest, SelectorSpec, SessionConfig};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const QUOTES_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head>
  <title>Quotes to Scrape</title>
  <meta name="description" content="A collection of famous quotes">
</head>
<body>
  <h1>Quotes to Scrape</h1>
  <article>
    <p>"The world as we have created it is a process of our thinking." by Albert Einstein</p>
  </article>
  <a href="/page/2/">Next</a>
  <a href="/page/2/">Next again</a>
  <a href="/tag/life/">life</a>
  <img src="/logo.png"><img src="/logo.png">
</body>
</html>"#;

async fn quotes_server() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /private"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(QUOTES_PAGE, "text/html; charset=utf-8"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/page/2/"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(QUOTES_PAGE, "text/html"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    server
}

fn fast_session() -> SessionConfig {
    SessionConfig::default().with_delay(Duration::ZERO)
}

fn crawler_with_sink() -> (Crawler, Arc<MemorySink>) {
    let sink = Arc::new(MemorySink::new());
    let crawler = Crawler::new(fast_session())
        .unwrap()
        .with_sink(sink.clone());
    (crawler, sink)
}

#[tokio::test]
async fn test_end_to_end_duplicate_yields_one_result() {
    let server = quotes_server().await;
    let (mut crawler, sink) = crawler_with_sink();
    let home = format!("{}/", server.uri());

    let results = crawler
        .crawl_many([home.as_str(), home.as_str()], &CrawlRequest::new())
        .await;

    assert_eq!(results.len(), 1);
    assert_eq!(sink.urls(EventKind::Visited), vec![home.clone()]);
    assert_eq!(sink.count(EventKind::DuplicateSkipped), 1);

    let result = &results[0];
    assert_eq!(result.url(), home);
    assert_eq!(result.title(), "Quotes to Scrape");
    assert_eq!(result.description(), "A collection of famous quotes");
    assert!(result.content().contains("Albert Einstein"));
    assert_eq!(result.links().len(), 2);
    assert_eq!(result.images().len(), 1);
    assert_eq!(result.status_code(), 200);
}

#[tokio::test]
async fn test_visited_events_follow_input_order() {
    let server = quotes_server().await;
    let (mut crawler, sink) = crawler_with_sink();
    let urls = vec![
        format!("{}/page/2/", server.uri()),
        format!("{}/", server.uri()),
        format!("{}/missing", server.uri()),
        format!("{}/page/2/", server.uri()),
    ];

    let results = crawler.crawl_many(&urls, &CrawlRequest::new()).await;

    assert_eq!(results.len(), 2);
    assert_eq!(sink.urls(EventKind::Visited), urls[..3].to_vec());
    assert_eq!(sink.count(EventKind::FetchError), 1);
    assert_eq!(crawler.visited_count(), 3);

    let stats = crawler.statistics().unwrap();
    assert_eq!(stats.total_pages, 2);
    assert_eq!(stats.total_urls_visited, 3);
    assert_eq!(stats.total_links_found, 4);
}

#[tokio::test]
async fn test_robots_denied_url_is_not_fetched() {
    let server = quotes_server().await;
    Mock::given(method("GET"))
        .and(path("/private"))
        .respond_with(ResponseTemplate::new(200).set_body_string("secret"))
        .expect(0)
        .mount(&server)
        .await;

    let (mut crawler, sink) = crawler_with_sink();
    let url = format!("{}/private", server.uri());

    assert!(crawler.crawl_one(&url, &CrawlRequest::new()).await.is_none());
    assert_eq!(sink.count(EventKind::PolicyDenied), 1);
    assert!(!crawler.is_visited(&url));
}

#[tokio::test]
async fn test_ignore_robots_fetches_denied_url() {
    let server = quotes_server().await;
    Mock::given(method("GET"))
        .and(path("/private"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<title>secret</title>"))
        .mount(&server)
        .await;

    let (mut crawler, _) = crawler_with_sink();
    let request = CrawlRequest::new().with_respect_robots(false);

    let result = crawler
        .crawl_one(&format!("{}/private", server.uri()), &request)
        .await
        .unwrap();
    assert_eq!(result.title(), "secret");
}

#[tokio::test]
async fn test_missing_robots_fails_open() {
    // No robots.txt is mounted, so the server answers 404
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<title>open</title>"))
        .mount(&server)
        .await;

    let (mut crawler, _) = crawler_with_sink();
    let result = crawler
        .crawl_one(&format!("{}/", server.uri()), &CrawlRequest::new())
        .await;

    assert!(result.is_some());
}

#[tokio::test]
async fn test_filters_and_custom_selectors() {
    let server = quotes_server().await;
    let (mut crawler, sink) = crawler_with_sink();
    let home = format!("{}/", server.uri());
    let second = format!("{}/page/2/", server.uri());

    let rejecting = CrawlRequest::new().with_filter(
        FilterSpec::new()
            .with_keywords(["quote"])
            .with_exclude_keywords(["einstein"]),
    );
    assert!(crawler.crawl_one(&home, &rejecting).await.is_none());
    assert_eq!(sink.count(EventKind::Filtered), 1);

    let accepting = CrawlRequest::new()
        .with_selectors(SelectorSpec::new().with_title(["#missing", "h1"]))
        .with_filter(FilterSpec::new().with_regex("albert\\s+einstein").unwrap());
    let result = crawler.crawl_one(&second, &accepting).await.unwrap();
    assert_eq!(result.title(), "Quotes to Scrape");
}

#[tokio::test]
async fn test_delay_applies_to_first_request() {
    let server = quotes_server().await;
    let session = SessionConfig::default().with_delay(Duration::from_millis(300));
    let mut crawler = Crawler::new(session).unwrap();
    let request = CrawlRequest::new().with_respect_robots(false);

    let started = Instant::now();
    crawler.crawl_one(&format!("{}/", server.uri()), &request).await;

    assert!(started.elapsed() >= Duration::from_millis(300));
}

#[tokio::test]
async fn test_stop_flag_between_urls() {
    let server = quotes_server().await;
    let (mut crawler, _) = crawler_with_sink();
    let stop = AtomicBool::new(true);

    let results = crawler
        .crawl_many_until([format!("{}/", server.uri())], &CrawlRequest::new(), &stop)
        .await;

    assert!(results.is_empty());
    assert_eq!(crawler.visited_count(), 0);
}

struct FakeBrowser {
    html: String,
    fail_navigation: bool,
    launches: Arc<AtomicUsize>,
    closes: Arc<AtomicUsize>,
}

struct FakeTab {
    html: String,
    fail_navigation: bool,
    closes: Arc<AtomicUsize>,
}

impl BrowserLauncher for FakeBrowser {
    fn launch(&self, user_agent: &str) -> Result<Box<dyn BrowserSession>, RenderError> {
        assert!(!user_agent.is_empty());
        self.launches.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeTab {
            html: self.html.clone(),
            fail_navigation: self.fail_navigation,
            closes: Arc::clone(&self.closes),
        }))
    }
}

impl BrowserSession for FakeTab {
    fn navigate(&mut self, url: &str) -> Result<(), RenderError> {
        if self.fail_navigation {
            return Err(RenderError::Navigation {
                url: url.to_string(),
                message: "timeout".to_string(),
            });
        }
        Ok(())
    }

    fn evaluate(&mut self, script: &str) -> Result<(), RenderError> {
        if script.contains("throw") {
            return Err(RenderError::Script("Uncaught Error".to_string()));
        }
        Ok(())
    }

    fn content(&mut self) -> Result<String, RenderError> {
        Ok(self.html.clone())
    }

    fn close(&mut self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }
}

fn fake_browser(fail_navigation: bool) -> (Arc<FakeBrowser>, Arc<AtomicUsize>, Arc<AtomicUsize>) {
    let launches = Arc::new(AtomicUsize::new(0));
    let closes = Arc::new(AtomicUsize::new(0));
    let browser = Arc::new(FakeBrowser {
        html: QUOTES_PAGE.to_string(),
        fail_navigation,
        launches: Arc::clone(&launches),
        closes: Arc::clone(&closes),
    });
    (browser, launches, closes)
}

fn quick_render() -> RenderRequest {
    RenderRequest::default().with_settle(Duration::ZERO)
}

#[tokio::test]
async fn test_rendered_crawl_bypasses_gating_by_default() {
    let (browser, launches, closes) = fake_browser(false);
    let (crawler, sink) = crawler_with_sink();
    let mut crawler = crawler.with_launcher(browser);
    let url = "https://rendered.example/";

    let first = crawler.crawl_one_rendered(url, &quick_render()).await.unwrap();
    let second = crawler.crawl_one_rendered(url, &quick_render()).await;

    assert_eq!(first.status_code(), 200);
    assert_eq!(first.title(), "Quotes to Scrape");
    assert!(second.is_some());
    assert_eq!(launches.load(Ordering::SeqCst), 2);
    assert_eq!(closes.load(Ordering::SeqCst), 2);
    assert_eq!(crawler.visited_count(), 0);
    assert_eq!(sink.count(EventKind::Visited), 0);
    assert_eq!(crawler.results().len(), 2);
}

#[tokio::test]
async fn test_rendered_crawl_with_gating_dedups() {
    let (browser, launches, _) = fake_browser(false);
    let (crawler, sink) = crawler_with_sink();
    let mut crawler = crawler.with_launcher(browser).with_gate_rendered(true);
    let request = RenderRequest::new(CrawlRequest::new().with_respect_robots(false))
        .with_settle(Duration::ZERO);
    let url = "https://rendered.example/";

    assert!(crawler.crawl_one_rendered(url, &request).await.is_some());
    assert!(crawler.crawl_one_rendered(url, &request).await.is_none());

    assert_eq!(launches.load(Ordering::SeqCst), 1);
    assert_eq!(sink.count(EventKind::DuplicateSkipped), 1);
}

#[tokio::test]
async fn test_rendered_teardown_on_every_path() {
    let (browser, _, closes) = fake_browser(false);
    let (crawler, sink) = crawler_with_sink();
    let mut crawler = crawler.with_launcher(browser);

    let throwing = quick_render().with_script("throw new Error('boom')");
    assert!(crawler
        .crawl_one_rendered("https://a.example/", &throwing)
        .await
        .is_none());
    assert_eq!(closes.load(Ordering::SeqCst), 1);
    assert_eq!(sink.count(EventKind::FetchError), 1);

    let (broken, _, broken_closes) = fake_browser(true);
    let mut crawler = crawler.with_launcher(broken);
    assert!(crawler
        .crawl_one_rendered("https://b.example/", &quick_render())
        .await
        .is_none());
    assert_eq!(broken_closes.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_rendered_batch_stop_flag() {
    let (browser, launches, _) = fake_browser(false);
    let (crawler, _) = crawler_with_sink();
    let mut crawler = crawler.with_launcher(browser);
    let urls = ["https://a.example/", "https://b.example/"];

    let stopped = AtomicBool::new(true);
    let results = crawler
        .crawl_many_rendered_until(urls, &quick_render(), &stopped)
        .await;
    assert!(results.is_empty());
    assert_eq!(launches.load(Ordering::SeqCst), 0);

    let running = AtomicBool::new(false);
    let results = crawler
        .crawl_many_rendered_until(urls, &quick_render(), &running)
        .await;
    assert_eq!(results.len(), 2);
    assert_eq!(launches.load(Ordering::SeqCst), 2);
}
