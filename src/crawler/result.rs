//! Crawl result type

use crate::extract::ExtractedContent;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeSet;
use std::time::Duration;

/// One accepted page
///
/// Built exactly once per successful, accepted fetch and never modified
/// afterwards. Fields are read through accessors only.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrawlResult {
    url: String,
    title: String,
    description: String,
    content: String,
    links: BTreeSet<String>,
    images: BTreeSet<String>,
    timestamp: DateTime<Utc>,
    status_code: u16,
    response_time: f64,
}

impl CrawlResult {
    /// Creates a result stamped with the current time
    ///
    /// # Arguments
    ///
    /// * `url` - The URL as requested
    /// * `extracted` - Fields pulled from the page
    /// * `status_code` - HTTP status, or 200 for rendered fetches
    /// * `response_time` - Wall-clock fetch duration
    pub fn new(
        url: impl Into<String>,
        extracted: ExtractedContent,
        status_code: u16,
        response_time: Duration,
    ) -> Self {
        Self {
            url: url.into(),
            title: extracted.title,
            description: extracted.description,
            content: extracted.content,
            links: extracted.links,
            images: extracted.images,
            timestamp: Utc::now(),
            status_code,
            response_time: response_time.as_secs_f64(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn links(&self) -> &BTreeSet<String> {
        &self.links
    }

    pub fn images(&self) -> &BTreeSet<String> {
        &self.images
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    /// Fetch duration in seconds
    pub fn response_time(&self) -> f64 {
        self.response_time
    }
}
