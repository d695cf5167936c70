//! Post-extraction content filtering
//!
//! A [`FilterSpec`] combines up to four predicates. Every predicate that is
//! present must pass for a page to be accepted; absent predicates pass
//! vacuously. All comparisons are case-insensitive.

use crate::ConfigError;
use regex::{Regex, RegexBuilder};
use serde::Deserialize;

/// Content acceptance rules
///
/// Construct through the builder methods or [`FilterConfig`]. The regex is
/// compiled at construction so an invalid pattern is reported before any
/// crawl starts.
#[derive(Debug, Clone, Default)]
pub struct FilterSpec {
    keywords: Vec<String>,
    exclude_keywords: Vec<String>,
    min_length: usize,
    regex: Option<Regex>,
}

impl FilterSpec {
    /// Creates a filter that accepts everything
    pub fn new() -> Self {
        Self::default()
    }

    /// At least one of these must occur in the text
    pub fn with_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords = lowercase_all(keywords);
        self
    }

    /// None of these may occur in the text
    pub fn with_exclude_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_keywords = lowercase_all(keywords);
        self
    }

    /// Minimum length of the text in characters
    pub fn with_min_length(mut self, min_length: usize) -> Self {
        self.min_length = min_length;
        self
    }

    /// Case-insensitive pattern that must match somewhere in the text
    pub fn with_regex(mut self, pattern: &str) -> Result<Self, ConfigError> {
        let regex = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map_err(|source| ConfigError::InvalidRegex {
                pattern: pattern.to_string(),
                source,
            })?;
        self.regex = Some(regex);
        Ok(self)
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn exclude_keywords(&self) -> &[String] {
        &self.exclude_keywords
    }

    pub fn min_length(&self) -> usize {
        self.min_length
    }

    pub fn regex(&self) -> Option<&str> {
        self.regex.as_ref().map(Regex::as_str)
    }

    /// Returns true if no predicate is configured
    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
            && self.exclude_keywords.is_empty()
            && self.min_length == 0
            && self.regex.is_none()
    }

    /// Fills every predicate left unset here from `fallback`
    pub fn or(self, fallback: &FilterSpec) -> Self {
        Self {
            keywords: if self.keywords.is_empty() {
                fallback.keywords.clone()
            } else {
                self.keywords
            },
            exclude_keywords: if self.exclude_keywords.is_empty() {
                fallback.exclude_keywords.clone()
            } else {
                self.exclude_keywords
            },
            min_length: if self.min_length == 0 {
                fallback.min_length
            } else {
                self.min_length
            },
            regex: self.regex.or_else(|| fallback.regex.clone()),
        }
    }

    /// Evaluates the filter against combined page text
    ///
    /// Predicates run in a fixed order and the first failure rejects:
    /// keywords, minimum length, regex, then exclusions.
    ///
    /// # Example
    ///
    /// ```
    /// use web_crawler::FilterSpec;
    ///
    /// let filter = FilterSpec::new().with_keywords(["quote"]);
    /// assert!(filter.accepts("Quotes to Scrape"));
    /// assert!(!filter.accepts("Books to Scrape"));
    /// ```
    pub fn accepts(&self, text: &str) -> bool {
        let lowered = text.to_lowercase();

        if !self.keywords.is_empty() && !self.keywords.iter().any(|k| lowered.contains(k.as_str())) {
            return false;
        }

        // Counted in characters over whitespace-collapsed extracted text
        if self.min_length > 0 && text.chars().count() < self.min_length {
            return false;
        }

        if let Some(regex) = &self.regex {
            if !regex.is_match(text) {
                return false;
            }
        }

        if self
            .exclude_keywords
            .iter()
            .any(|k| lowered.contains(k.as_str()))
        {
            return false;
        }

        true
    }
}

fn lowercase_all<I, S>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    values.into_iter().map(|v| v.into().to_lowercase()).collect()
}

/// Serializable form of [`FilterSpec`] as it appears in configuration files
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct FilterConfig {
    #[serde(default)]
    pub keywords: Vec<String>,

    #[serde(default)]
    pub exclude_keywords: Vec<String>,

    #[serde(default)]
    pub min_length: usize,

    #[serde(default)]
    pub regex: Option<String>,
}

impl TryFrom<&FilterConfig> for FilterSpec {
    type Error = ConfigError;

    fn try_from(config: &FilterConfig) -> Result<Self, Self::Error> {
        let spec = FilterSpec::new()
            .with_keywords(config.keywords.iter().map(|k| k.trim().to_string()))
            .with_exclude_keywords(config.exclude_keywords.iter().map(|k| k.trim().to_string()))
            .with_min_length(config.min_length);

        match config.regex.as_deref().map(str::trim) {
            Some(pattern) if !pattern.is_empty() => spec.with_regex(pattern),
            _ => Ok(spec),
        }
    }
}
