//! Crawler module for page acquisition and orchestration
//!
//! This module contains the core crawling logic, including:
//! - Plain HTTP and headless-browser fetch strategies
//! - Per-URL orchestration (gating, delay, extraction, filtering)
//! - Structured crawl events
//! - The immutable crawl result type

mod coordinator;
mod events;
mod fetcher;
mod render;
mod result;

pub use coordinator::{CrawlRequest, Crawler, RenderRequest, SkipReason};
pub use events::{CrawlEvent, EventKind, EventSink, MemorySink, TracingSink};
pub use fetcher::{
    build_http_client, default_headers, random_user_agent, FetchError, FetchStrategy,
    FetchedPage, HttpFetcher, USER_AGENTS,
};
pub use render::{
    BrowserLauncher, BrowserSession, ChromeLauncher, RenderError, RenderOptions,
    RenderingFetcher, MAX_SETTLE, SCRIPT_SETTLE,
};
pub use result::CrawlResult;
