//! Robots.txt handling module
//!
//! This module provides functionality for fetching, parsing, and caching
//! robots.txt files, and the [`PolitenessGate`] that answers per-URL fetch
//! permission from them.

mod cache;
mod gate;
mod parser;

pub use cache::{CachedRobots, RobotsCache};
pub use gate::PolitenessGate;
pub use parser::ParsedRobots;

use reqwest::{Client, StatusCode};
use url::Url;

/// Derives the robots.txt location governing a URL
///
/// # Example
///
/// ```
/// use url::Url;
/// use web_crawler::robots::robots_url;
///
/// let page = Url::parse("https://example.com:8443/a/b?c=d").unwrap();
/// assert_eq!(robots_url(&page).unwrap().as_str(), "https://example.com:8443/robots.txt");
/// ```
pub fn robots_url(url: &Url) -> Result<Url, url::ParseError> {
    url.join("/robots.txt")
}

/// Fetches and parses robots.txt for the origin of `url`
///
/// This never fails. Unreachable hosts, server errors, and unreadable
/// bodies fall back to allow-all and are logged as warnings. A 401 or 403
/// answer means the whole origin is off limits.
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `url` - Any URL on the origin to check
pub async fn fetch_robots(client: &Client, url: &Url) -> ParsedRobots {
    let target = match robots_url(url) {
        Ok(target) => target,
        Err(e) => {
            tracing::warn!("Cannot derive robots.txt location for {}: {}", url, e);
            return ParsedRobots::allow_all();
        }
    };

    tracing::debug!("Fetching robots.txt: {}", target);

    let response = match client.get(target.clone()).send().await {
        Ok(response) => response,
        Err(e) => {
            tracing::warn!("Failed to fetch {}, allowing all: {}", target, e);
            return ParsedRobots::allow_all();
        }
    };

    let status = response.status();
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        tracing::info!("{} answered {}, treating origin as disallowed", target, status);
        return ParsedRobots::disallow_all();
    }

    if !status.is_success() {
        if status.is_server_error() {
            tracing::warn!("{} answered {}, allowing all", target, status);
        } else {
            tracing::debug!("{} answered {}, allowing all", target, status);
        }
        return ParsedRobots::allow_all();
    }

    match response.text().await {
        Ok(body) => ParsedRobots::from_content(&body),
        Err(e) => {
            tracing::warn!("Failed to read {}, allowing all: {}", target, e);
            ParsedRobots::allow_all()
        }
    }
}
