//! Plain HTTP fetch strategy
//!
//! This module handles the HTTP side of page acquisition:
//! - Building the session client from [`SessionConfig`]
//! - Browser-like default headers with a rotated user agent
//! - Status and transport error classification
//! - Body decoding and response timing

use crate::config::SessionConfig;
use crate::crawler::render::RenderError;
use async_trait::async_trait;
use rand::seq::SliceRandom;
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::Client;
use std::time::{Duration, Instant};
use thiserror::Error;

/// User agents rotated across sessions
pub const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/121.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/121.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:122.0) Gecko/20100101 Firefox/122.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.2 Safari/605.1.15",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/121.0.0.0 Safari/537.36",
];

/// Picks one entry of [`USER_AGENTS`] at random
pub fn random_user_agent() -> &'static str {
    USER_AGENTS
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(USER_AGENTS[0])
}

/// Raw page as returned by a fetch strategy
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub html: String,
    pub status_code: u16,
    pub response_time: Duration,
}

/// Errors that turn a single URL into a skip
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Request to {url} timed out")]
    Timeout { url: String },

    #[error("Connection to {url} failed: {source}")]
    Connect {
        url: String,
        source: reqwest::Error,
    },

    #[error("Request to {url} failed: {source}")]
    Request {
        url: String,
        source: reqwest::Error,
    },

    #[error("Failed to read body of {url}: {source}")]
    Body {
        url: String,
        source: reqwest::Error,
    },

    #[error("Rendering failed: {0}")]
    Render(#[from] RenderError),
}

impl FetchError {
    /// HTTP status for `Status` errors
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    fn from_reqwest(url: &str, error: reqwest::Error) -> Self {
        let url = url.to_string();
        if error.is_timeout() {
            FetchError::Timeout { url }
        } else if error.is_connect() {
            FetchError::Connect { url, source: error }
        } else {
            FetchError::Request { url, source: error }
        }
    }
}

/// A way of turning a URL into HTML
#[async_trait]
pub trait FetchStrategy: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError>;
}

/// Headers sent when the session configures none
pub fn default_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::USER_AGENT,
        HeaderValue::from_static(random_user_agent()),
    );
    headers.insert(
        header::ACCEPT,
        HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
    );
    headers.insert(
        header::ACCEPT_LANGUAGE,
        HeaderValue::from_static("pt-BR,pt;q=0.9,en;q=0.8"),
    );
    headers.insert(header::UPGRADE_INSECURE_REQUESTS, HeaderValue::from_static("1"));
    headers
}

/// Builds the session HTTP client
///
/// Custom headers replace the defaults entirely, except that a rotated
/// user agent is supplied when they lack one. Compression negotiation is
/// left to reqwest.
///
/// # Errors
///
/// Invalid headers or proxies surface as [`crate::ConfigError`]; a failing
/// TLS backend surfaces as a reqwest error.
pub fn build_http_client(session: &SessionConfig) -> crate::Result<Client> {
    let mut headers = session.header_map()?;
    if headers.is_empty() {
        headers = default_headers();
    } else if !headers.contains_key(header::USER_AGENT) {
        headers.insert(
            header::USER_AGENT,
            HeaderValue::from_static(random_user_agent()),
        );
    }

    let timeout = session.timeout();
    let mut builder = Client::builder()
        .default_headers(headers)
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .gzip(true)
        .brotli(true);

    for proxy in session.proxy_list()? {
        builder = builder.proxy(proxy);
    }

    Ok(builder.build()?)
}

/// Fetches pages with a shared reqwest client
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn from_session(session: &SessionConfig) -> crate::Result<Self> {
        Ok(Self::new(build_http_client(session)?))
    }

    pub fn client(&self) -> &Client {
        &self.client
    }
}

#[async_trait]
impl FetchStrategy for HttpFetcher {
    /// GETs the URL and decodes the body
    ///
    /// Redirects are followed. Any final status outside 2xx is an error.
    /// The body is decoded with the charset from `Content-Type`, falling
    /// back to UTF-8. Timing covers the request and the full body read.
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        let started = Instant::now();

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let html = response
            .text_with_charset("utf-8")
            .await
            .map_err(|source| FetchError::Body {
                url: url.to_string(),
                source,
            })?;

        Ok(FetchedPage {
            html,
            status_code: status.as_u16(),
            response_time: started.elapsed(),
        })
    }
}
