//! Structured crawl events
//!
//! The orchestrator reports every decision point to an injected
//! [`EventSink`] instead of writing to a global logger.

use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::Mutex;

/// Decision points reported by the orchestrator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// robots.txt forbids the URL
    PolicyDenied,
    /// URL was already visited in this session
    DuplicateSkipped,
    /// URL was added to the visited set
    Visited,
    /// Page was fetched but rejected by the content filter
    Filtered,
    /// Fetch or render failed
    FetchError,
    /// Page was fetched, extracted, and accepted
    FetchSuccess,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::PolicyDenied => "policy",
            EventKind::DuplicateSkipped => "duplicate",
            EventKind::Visited => "visited",
            EventKind::Filtered => "filtered",
            EventKind::FetchError => "fetch-error",
            EventKind::FetchSuccess => "fetch-success",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A recorded event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlEvent {
    pub kind: EventKind,
    pub url: String,
    pub detail: String,
    pub timestamp: DateTime<Utc>,
}

/// Receiver for crawl events
pub trait EventSink: Send + Sync {
    fn record(&self, kind: EventKind, url: &str, detail: &str);
}

/// Sink that forwards events to `tracing`
///
/// Skips and successes are `info`, policy denials `warn`, fetch failures
/// `error`, and visited-set insertions `debug`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn record(&self, kind: EventKind, url: &str, detail: &str) {
        match kind {
            EventKind::PolicyDenied => {
                tracing::warn!(event = %kind, url, "Disallowed by robots.txt: {}", detail)
            }
            EventKind::DuplicateSkipped | EventKind::Filtered => {
                tracing::info!(event = %kind, url, "Skipped: {}", detail)
            }
            EventKind::Visited => tracing::debug!(event = %kind, url, "Marked visited"),
            EventKind::FetchError => {
                tracing::error!(event = %kind, url, "Crawl failed: {}", detail)
            }
            EventKind::FetchSuccess => {
                tracing::info!(event = %kind, url, "Crawled successfully: {}", detail)
            }
        }
    }
}

/// Sink that keeps every event in memory
///
/// Useful for presentation layers that show a crawl log, and for tests.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<CrawlEvent>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copies the events recorded so far
    pub fn events(&self) -> Vec<CrawlEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    /// Number of recorded events of one kind
    pub fn count(&self, kind: EventKind) -> usize {
        self.events
            .lock()
            .map(|events| events.iter().filter(|e| e.kind == kind).count())
            .unwrap_or_default()
    }

    /// URLs of the recorded events of one kind, in order
    pub fn urls(&self, kind: EventKind) -> Vec<String> {
        self.events
            .lock()
            .map(|events| {
                events
                    .iter()
                    .filter(|e| e.kind == kind)
                    .map(|e| e.url.clone())
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl EventSink for MemorySink {
    fn record(&self, kind: EventKind, url: &str, detail: &str) {
        if let Ok(mut events) = self.events.lock() {
            events.push(CrawlEvent {
                kind,
                url: url.to_string(),
                detail: detail.to_string(),
                timestamp: Utc::now(),
            });
        }
    }
}
