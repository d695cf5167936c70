//! Visited URL tracking
//!
//! A URL is recorded before its fetch outcome is known, so a failed URL is
//! not retried later in the same session.

use std::collections::HashSet;

/// Append-only set of URLs processed in the current session
///
/// URLs are compared as exact strings. Only [`VisitedSet::clear`] removes
/// entries, and the orchestrator calls it only on an explicit session reset.
#[derive(Debug, Clone, Default)]
pub struct VisitedSet {
    urls: HashSet<String>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a URL
    ///
    /// # Returns
    ///
    /// * `true` - The URL was not seen before
    /// * `false` - The URL was already recorded
    pub fn insert(&mut self, url: &str) -> bool {
        if self.urls.contains(url) {
            return false;
        }
        self.urls.insert(url.to_string())
    }

    pub fn contains(&self, url: &str) -> bool {
        self.urls.contains(url)
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    /// Returns the recorded URLs in sorted order
    pub fn snapshot(&self) -> Vec<String> {
        let mut urls: Vec<String> = self.urls.iter().cloned().collect();
        urls.sort();
        urls
    }

    pub fn clear(&mut self) {
        self.urls.clear();
    }
}
