//! Crawl coordinator - per-URL orchestration
//!
//! This module sequences every step a URL goes through:
//! - Politeness gating (robots.txt) and duplicate detection
//! - Inter-request delay
//! - Fetching through a [`FetchStrategy`]
//! - Extraction, filtering, and result accumulation
//!
//! URLs are processed strictly one at a time. The coordinator owns the
//! visited set and the result collection; both are only reachable through
//! `&mut self` methods and read-only accessors.

use crate::config::{validate_session_config, Config, SessionConfig};
use crate::crawler::events::{EventKind, EventSink, TracingSink};
use crate::crawler::fetcher::{
    build_http_client, FetchError, FetchStrategy, FetchedPage, HttpFetcher,
};
use crate::crawler::render::{
    BrowserLauncher, ChromeLauncher, RenderError, RenderOptions, RenderingFetcher, SCRIPT_SETTLE,
};
use crate::crawler::result::CrawlResult;
use crate::extract::{extract_html, SelectorSpec};
use crate::filter::FilterSpec;
use crate::output::CrawlStatistics;
use crate::robots::PolitenessGate;
use crate::state::VisitedSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// What to extract from a page and whether to keep it
#[derive(Debug, Clone)]
pub struct CrawlRequest {
    pub selectors: SelectorSpec,
    pub filter: Option<FilterSpec>,
    pub respect_robots: bool,
}

impl Default for CrawlRequest {
    fn default() -> Self {
        Self {
            selectors: SelectorSpec::default(),
            filter: None,
            respect_robots: true,
        }
    }
}

impl CrawlRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_selectors(mut self, selectors: SelectorSpec) -> Self {
        self.selectors = selectors;
        self
    }

    pub fn with_filter(mut self, filter: FilterSpec) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn with_respect_robots(mut self, respect_robots: bool) -> Self {
        self.respect_robots = respect_robots;
        self
    }

    /// Builds the request described by a loaded configuration
    pub fn from_config(config: &Config) -> crate::ConfigResult<Self> {
        Ok(Self {
            selectors: config.selector_spec()?,
            filter: config.filter_spec()?,
            respect_robots: config.session.respect_robots,
        })
    }
}

/// A crawl request served by the rendering strategy
#[derive(Debug, Clone)]
pub struct RenderRequest {
    pub crawl: CrawlRequest,
    /// Wait after navigation before capture
    pub settle: Duration,
    /// Script evaluated in the page after the settle wait
    pub script: Option<String>,
}

impl Default for RenderRequest {
    fn default() -> Self {
        Self {
            crawl: CrawlRequest::default(),
            settle: Duration::from_secs(3),
            script: None,
        }
    }
}

impl RenderRequest {
    pub fn new(crawl: CrawlRequest) -> Self {
        Self {
            crawl,
            ..Default::default()
        }
    }

    pub fn with_settle(mut self, settle: Duration) -> Self {
        self.settle = settle;
        self
    }

    pub fn with_script(mut self, script: impl Into<String>) -> Self {
        self.script = Some(script.into());
        self
    }

    /// Builds the request described by a loaded configuration
    pub fn from_config(config: &Config) -> crate::ConfigResult<Self> {
        Ok(Self {
            crawl: CrawlRequest::from_config(config)?,
            settle: config.render.settle(),
            script: config.render.script.clone(),
        })
    }

    fn options(&self) -> RenderOptions {
        RenderOptions {
            settle: self.settle,
            script: self.script.clone(),
            script_settle: SCRIPT_SETTLE,
        }
    }
}

/// Why a URL produced no result
///
/// None of these abort a batch.
#[derive(Debug, Error)]
pub enum SkipReason {
    #[error("disallowed by robots.txt")]
    PolicyDenied,

    #[error("already visited")]
    Duplicate,

    #[error(transparent)]
    Fetch(FetchError),

    #[error(transparent)]
    Render(RenderError),

    #[error("rejected by content filter")]
    Filtered,
}

impl From<FetchError> for SkipReason {
    fn from(error: FetchError) -> Self {
        match error {
            FetchError::Render(e) => SkipReason::Render(e),
            other => SkipReason::Fetch(other),
        }
    }
}

impl SkipReason {
    fn event_kind(&self) -> EventKind {
        match self {
            SkipReason::PolicyDenied => EventKind::PolicyDenied,
            SkipReason::Duplicate => EventKind::DuplicateSkipped,
            SkipReason::Fetch(_) | SkipReason::Render(_) => EventKind::FetchError,
            SkipReason::Filtered => EventKind::Filtered,
        }
    }
}

/// Sequential crawl orchestrator
pub struct Crawler {
    session: SessionConfig,
    fetcher: Box<dyn FetchStrategy>,
    launcher: Arc<dyn BrowserLauncher>,
    gate: PolitenessGate,
    sink: Arc<dyn EventSink>,
    gate_rendered: bool,
    visited: VisitedSet,
    results: Vec<CrawlResult>,
}

impl Crawler {
    /// Creates a crawler for one session
    ///
    /// # Errors
    ///
    /// Returns a configuration error for invalid timeouts, delays, headers
    /// or proxies. Nothing is fetched here.
    pub fn new(session: SessionConfig) -> crate::Result<Self> {
        validate_session_config(&session)?;
        let client = build_http_client(&session)?;

        Ok(Self {
            fetcher: Box::new(HttpFetcher::new(client.clone())),
            launcher: Arc::new(ChromeLauncher::default()),
            gate: PolitenessGate::new(client),
            sink: Arc::new(TracingSink),
            gate_rendered: false,
            visited: VisitedSet::new(),
            results: Vec::new(),
            session,
        })
    }

    /// Creates a crawler from a loaded configuration
    pub fn from_config(config: &Config) -> crate::Result<Self> {
        Ok(Self::new(config.session.clone())?.with_gate_rendered(config.render.gate_rendered))
    }

    /// Replaces the plain fetch strategy
    pub fn with_fetcher(mut self, fetcher: impl FetchStrategy + 'static) -> Self {
        self.fetcher = Box::new(fetcher);
        self
    }

    /// Replaces the browser used by rendered crawls
    pub fn with_launcher(mut self, launcher: Arc<dyn BrowserLauncher>) -> Self {
        self.launcher = launcher;
        self
    }

    pub fn with_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Whether rendered crawls go through robots, dedup, and delay
    pub fn with_gate_rendered(mut self, gate_rendered: bool) -> Self {
        self.gate_rendered = gate_rendered;
        self
    }

    pub fn session(&self) -> &SessionConfig {
        &self.session
    }

    /// Crawls one URL with the plain HTTP strategy
    ///
    /// Returns `None` when the URL is denied, already visited, fails to
    /// fetch, or is filtered out. Each outcome is reported to the sink.
    pub async fn crawl_one(&mut self, url: &str, request: &CrawlRequest) -> Option<CrawlResult> {
        let outcome = self.try_crawl_one(url, request).await;
        self.settle_outcome(url, outcome)
    }

    /// Like [`Crawler::crawl_one`], but reports why a URL was skipped
    ///
    /// Skips are not reported to the event sink.
    pub async fn try_crawl_one(
        &mut self,
        url: &str,
        request: &CrawlRequest,
    ) -> Result<CrawlResult, SkipReason> {
        self.admit(url, request.respect_robots).await?;
        let page = self.fetcher.fetch(url).await?;
        self.accept(url, page, request)
    }

    /// Crawls one URL with the rendering strategy
    ///
    /// Robots, dedup, and delay apply only when the crawler was built with
    /// `with_gate_rendered(true)`. The browser is torn down before this
    /// returns.
    pub async fn crawl_one_rendered(
        &mut self,
        url: &str,
        request: &RenderRequest,
    ) -> Option<CrawlResult> {
        let outcome = self.try_crawl_one_rendered(url, request).await;
        self.settle_outcome(url, outcome)
    }

    pub async fn try_crawl_one_rendered(
        &mut self,
        url: &str,
        request: &RenderRequest,
    ) -> Result<CrawlResult, SkipReason> {
        if self.gate_rendered {
            self.admit(url, request.crawl.respect_robots).await?;
        }

        let fetcher = RenderingFetcher::new(Arc::clone(&self.launcher), request.options());
        let page = fetcher.fetch(url).await?;
        self.accept(url, page, &request.crawl)
    }

    /// Crawls URLs in order with the plain strategy
    pub async fn crawl_many<I, S>(&mut self, urls: I, request: &CrawlRequest) -> Vec<CrawlResult>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let never = AtomicBool::new(false);
        self.crawl_many_until(urls, request, &never).await
    }

    /// Crawls URLs in order until `stop` is set
    ///
    /// The flag is checked before each URL; a URL already in flight runs to
    /// completion.
    pub async fn crawl_many_until<I, S>(
        &mut self,
        urls: I,
        request: &CrawlRequest,
        stop: &AtomicBool,
    ) -> Vec<CrawlResult>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let urls: Vec<S> = urls.into_iter().collect();
        let total = urls.len();
        let mut accepted = Vec::new();

        for (index, url) in urls.iter().enumerate() {
            if stop.load(Ordering::SeqCst) {
                tracing::info!("Crawl stopped after {}/{} URLs", index, total);
                break;
            }

            let url: &str = url.as_ref();
            tracing::info!("Processing {}/{}: {}", index + 1, total, url);

            if let Some(result) = self.crawl_one(url, request).await {
                accepted.push(result);
            }
        }

        accepted
    }

    /// Rendered counterpart of [`Crawler::crawl_many_until`]
    pub async fn crawl_many_rendered_until<I, S>(
        &mut self,
        urls: I,
        request: &RenderRequest,
        stop: &AtomicBool,
    ) -> Vec<CrawlResult>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let urls: Vec<S> = urls.into_iter().collect();
        let total = urls.len();
        let mut accepted = Vec::new();

        for (index, url) in urls.iter().enumerate() {
            if stop.load(Ordering::SeqCst) {
                tracing::info!("Rendered crawl stopped after {}/{} URLs", index, total);
                break;
            }

            let url: &str = url.as_ref();
            tracing::info!("Rendering {}/{}: {}", index + 1, total, url);

            if let Some(result) = self.crawl_one_rendered(url, request).await {
                accepted.push(result);
            }
        }

        accepted
    }

    /// Results accepted so far, in acceptance order
    pub fn results(&self) -> &[CrawlResult] {
        &self.results
    }

    /// Owned copy of the accepted results
    pub fn snapshot(&self) -> Vec<CrawlResult> {
        self.results.clone()
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    pub fn is_visited(&self, url: &str) -> bool {
        self.visited.contains(url)
    }

    /// Visited URLs in sorted order
    pub fn visited_urls(&self) -> Vec<String> {
        self.visited.snapshot()
    }

    /// Summary of the accepted results, or `None` before the first one
    pub fn statistics(&self) -> Option<CrawlStatistics> {
        CrawlStatistics::from_results(&self.results, self.visited.len())
    }

    /// Starts a fresh session: forgets results, visited URLs, and robots rules
    pub fn reset(&mut self) {
        self.results.clear();
        self.visited.clear();
        self.gate.clear();
        tracing::info!("Crawler session reset");
    }

    /// Robots check, dedup, visited insertion, then the politeness delay
    async fn admit(&mut self, url: &str, respect_robots: bool) -> Result<(), SkipReason> {
        if respect_robots
            && !self
                .gate
                .is_allowed(url, &self.session.robots_user_agent)
                .await
        {
            return Err(SkipReason::PolicyDenied);
        }

        if !self.visited.insert(url) {
            return Err(SkipReason::Duplicate);
        }
        self.sink.record(EventKind::Visited, url, "");

        let delay = self.session.delay();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        Ok(())
    }

    /// Extracts, filters, and records a fetched page
    fn accept(
        &mut self,
        url: &str,
        page: FetchedPage,
        request: &CrawlRequest,
    ) -> Result<CrawlResult, SkipReason> {
        let extracted = extract_html(&page.html, &request.selectors);

        if let Some(filter) = &request.filter {
            if !filter.accepts(&extracted.combined_text()) {
                return Err(SkipReason::Filtered);
            }
        }

        let result = CrawlResult::new(url, extracted, page.status_code, page.response_time);
        self.results.push(result.clone());

        self.sink.record(
            EventKind::FetchSuccess,
            url,
            &format!(
                "status {} in {:.2}s",
                result.status_code(),
                result.response_time()
            ),
        );

        Ok(result)
    }

    fn settle_outcome(
        &self,
        url: &str,
        outcome: Result<CrawlResult, SkipReason>,
    ) -> Option<CrawlResult> {
        match outcome {
            Ok(result) => Some(result),
            Err(reason) => {
                self.sink
                    .record(reason.event_kind(), url, &reason.to_string());
                None
            }
        }
    }
}
