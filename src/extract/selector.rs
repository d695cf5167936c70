//! Selector fallback resolution
//!
//! A field is described by an ordered chain of [`FieldSelector`]s. The chain is
//! walked front to back and the first candidate that yields a non-empty value
//! wins. Malformed selectors are skipped, never reported as errors.

use scraper::{ElementRef, Html, Selector};
use serde::Deserialize;

/// A single extraction rule in a fallback chain
///
/// In TOML a plain string deserializes to [`FieldSelector::Css`] and a table
/// with `selector`/`attribute` keys to [`FieldSelector::MetaAttribute`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum FieldSelector {
    /// Visible text of the first matching element
    Css(String),

    /// Attribute value of the first matching element (usually a `<meta>` tag)
    MetaAttribute {
        selector: String,
        #[serde(default = "default_meta_attribute")]
        attribute: String,
    },
}

fn default_meta_attribute() -> String {
    "content".to_string()
}

impl FieldSelector {
    /// Text selector
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    /// Selector reading the `content` attribute of the matched element
    pub fn meta(selector: impl Into<String>) -> Self {
        Self::MetaAttribute {
            selector: selector.into(),
            attribute: default_meta_attribute(),
        }
    }

    /// Returns the raw CSS selector string
    pub fn selector(&self) -> &str {
        match self {
            Self::Css(selector) => selector,
            Self::MetaAttribute { selector, .. } => selector,
        }
    }

    /// Resolves this single candidate against a document
    ///
    /// Returns `None` when the selector is malformed, matches nothing, or the
    /// first match carries an empty value.
    fn resolve_in(&self, document: &Html) -> Option<String> {
        let selector = parse_selector(self.selector())?;
        let element = document.select(&selector).next()?;

        let value = match self {
            Self::Css(_) => visible_text(element),
            Self::MetaAttribute { attribute, .. } => element
                .value()
                .attr(attribute)
                .map(|v| v.trim().to_string())
                .unwrap_or_default(),
        };

        if value.is_empty() {
            None
        } else {
            Some(value)
        }
    }
}

impl From<&str> for FieldSelector {
    fn from(selector: &str) -> Self {
        Self::Css(selector.to_string())
    }
}

/// Walks a selector chain and returns the first non-empty value
///
/// # Arguments
///
/// * `document` - The parsed HTML document
/// * `selectors` - Candidates in priority order
///
/// # Returns
///
/// The resolved value, or an empty string if no candidate produced one
///
/// # Example
///
/// ```
/// use scraper::Html;
/// use web_crawler::extract::{resolve, FieldSelector};
///
/// let document = Html::parse_document("<html><body><h1>Hello</h1></body></html>");
/// let chain = [FieldSelector::css("#missing"), FieldSelector::css("h1")];
/// assert_eq!(resolve(&document, &chain), "Hello");
/// ```
pub fn resolve(document: &Html, selectors: &[FieldSelector]) -> String {
    selectors
        .iter()
        .find_map(|candidate| candidate.resolve_in(document))
        .unwrap_or_default()
}

/// Parses a CSS selector, logging and discarding syntax errors
pub(crate) fn parse_selector(raw: &str) -> Option<Selector> {
    match Selector::parse(raw) {
        Ok(selector) => Some(selector),
        Err(e) => {
            tracing::debug!("Skipping malformed selector '{}': {:?}", raw, e);
            None
        }
    }
}

/// Collects an element's text with whitespace runs collapsed to single spaces
///
/// Filter length checks see this collapsed form, not the raw markup text.
fn visible_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
