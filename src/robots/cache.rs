//! Robots.txt caching implementation
//!
//! Parsed robots.txt rules are cached per origin for the lifetime of a crawl
//! session. Entries expire after 24 hours so long sessions still pick up
//! changes made by the site owner.

use crate::robots::ParsedRobots;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;

/// Cached robots.txt data for an origin
#[derive(Debug, Clone)]
pub struct CachedRobots {
    /// The parsed robots.txt content
    pub content: ParsedRobots,

    /// When the robots.txt was fetched
    pub fetched_at: DateTime<Utc>,
}

impl CachedRobots {
    /// Creates a new CachedRobots stamped with the current time
    pub fn new(content: ParsedRobots) -> Self {
        Self {
            content,
            fetched_at: Utc::now(),
        }
    }

    /// Checks if the cached robots.txt is older than 24 hours
    pub fn is_stale(&self) -> bool {
        self.age() > Duration::hours(24)
    }

    /// Returns how long ago the robots.txt was fetched
    pub fn age(&self) -> Duration {
        Utc::now() - self.fetched_at
    }

    /// Checks if a URL is allowed according to the cached robots.txt
    pub fn is_allowed(&self, url: &str, user_agent: &str) -> bool {
        self.content.is_allowed(url, user_agent)
    }
}

/// Origin-keyed robots.txt cache
///
/// Keys are ASCII-serialized origins such as `https://example.com:8443`.
#[derive(Debug, Default)]
pub struct RobotsCache {
    entries: HashMap<String, CachedRobots>,
}

impl RobotsCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the fresh entry for an origin, if any
    pub fn get(&self, origin: &str) -> Option<&CachedRobots> {
        self.entries.get(origin).filter(|entry| !entry.is_stale())
    }

    pub fn insert(&mut self, origin: impl Into<String>, robots: ParsedRobots) {
        self.entries.insert(origin.into(), CachedRobots::new(robots));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    #[cfg(test)]
    fn backdate(&mut self, origin: &str, by: Duration) {
        if let Some(entry) = self.entries.get_mut(origin) {
            entry.fetched_at = entry.fetched_at - by;
        }
    }
}
