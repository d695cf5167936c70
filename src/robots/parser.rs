//! Robots.txt parser implementation
//!
//! This module wraps the robotstxt crate's matcher behind a small value type
//! that can also represent the allow-all and disallow-all fallbacks.

use robotstxt::DefaultMatcher;

/// How a [`ParsedRobots`] answers permission queries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Verdict {
    /// Evaluate the stored rules
    Rules,
    /// Everything is permitted (missing or unreachable robots.txt)
    AllowAll,
    /// Nothing is permitted (robots.txt answered 401/403)
    DisallowAll,
}

/// Parsed robots.txt data
#[derive(Debug, Clone)]
pub struct ParsedRobots {
    /// Raw robots.txt content
    content: String,
    verdict: Verdict,
}

impl ParsedRobots {
    /// Creates a new ParsedRobots from raw robots.txt content
    pub fn from_content(content: &str) -> Self {
        Self {
            content: content.to_string(),
            verdict: Verdict::Rules,
        }
    }

    /// Creates a permissive ParsedRobots that allows everything
    ///
    /// This is used when robots.txt cannot be fetched.
    pub fn allow_all() -> Self {
        Self {
            content: String::new(),
            verdict: Verdict::AllowAll,
        }
    }

    /// Creates a ParsedRobots that denies everything
    pub fn disallow_all() -> Self {
        Self {
            content: String::new(),
            verdict: Verdict::DisallowAll,
        }
    }

    /// Returns the raw robots.txt content
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Checks if a URL is allowed for the given user agent
    ///
    /// # Arguments
    ///
    /// * `url` - Full URL or path to check (e.g., "/page.html")
    /// * `user_agent` - The user agent string; `*` selects the global group
    ///
    /// # Returns
    ///
    /// * `true` - If the URL is allowed
    /// * `false` - If the URL is disallowed
    pub fn is_allowed(&self, url: &str, user_agent: &str) -> bool {
        match self.verdict {
            Verdict::AllowAll => true,
            Verdict::DisallowAll => false,
            Verdict::Rules if self.content.trim().is_empty() => true,
            Verdict::Rules => {
                let mut matcher = DefaultMatcher::default();
                matcher.one_agent_allowed_by_robots(&self.content, user_agent, url)
            }
        }
    }
}
