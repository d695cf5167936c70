//! Structured content extraction
//!
//! Turns a parsed HTML document into title, description, main content, and
//! the de-duplicated link and image sets of the page.

use crate::extract::selector::{parse_selector, resolve, FieldSelector};
use scraper::Html;
use serde::Deserialize;
use std::borrow::Cow;
use std::collections::BTreeSet;

/// Per-field selector chains supplied by the caller
///
/// A field left as `None` uses the built-in default chain. A field set to an
/// empty list disables that field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SelectorSpec {
    #[serde(default)]
    pub title: Option<Vec<FieldSelector>>,

    #[serde(default)]
    pub description: Option<Vec<FieldSelector>>,

    #[serde(default)]
    pub content: Option<Vec<FieldSelector>>,

    /// CSS selectors whose matches contribute their `href`
    #[serde(default)]
    pub links: Option<Vec<String>>,

    /// CSS selectors whose matches contribute their `src`
    #[serde(default)]
    pub images: Option<Vec<String>>,
}

impl SelectorSpec {
    /// Creates a spec that uses the default chain for every field
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title<I, S>(mut self, chain: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<FieldSelector>,
    {
        self.title = Some(chain.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_description<I, S>(mut self, chain: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<FieldSelector>,
    {
        self.description = Some(chain.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_content<I, S>(mut self, chain: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<FieldSelector>,
    {
        self.content = Some(chain.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_links<I, S>(mut self, selectors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.links = Some(selectors.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_images<I, S>(mut self, selectors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.images = Some(selectors.into_iter().map(Into::into).collect());
        self
    }

    /// Fills every field left unset here from `fallback`
    pub fn or(self, fallback: &SelectorSpec) -> Self {
        Self {
            title: self.title.or_else(|| fallback.title.clone()),
            description: self.description.or_else(|| fallback.description.clone()),
            content: self.content.or_else(|| fallback.content.clone()),
            links: self.links.or_else(|| fallback.links.clone()),
            images: self.images.or_else(|| fallback.images.clone()),
        }
    }

    pub fn title_chain(&self) -> Cow<'_, [FieldSelector]> {
        chain_or(&self.title, default_title)
    }

    pub fn description_chain(&self) -> Cow<'_, [FieldSelector]> {
        chain_or(&self.description, default_description)
    }

    pub fn content_chain(&self) -> Cow<'_, [FieldSelector]> {
        chain_or(&self.content, default_content)
    }

    pub fn link_selectors(&self) -> Cow<'_, [String]> {
        chain_or(&self.links, || vec!["a[href]".to_string()])
    }

    pub fn image_selectors(&self) -> Cow<'_, [String]> {
        chain_or(&self.images, || vec!["img[src]".to_string()])
    }
}

fn chain_or<T: Clone>(configured: &Option<Vec<T>>, default: fn() -> Vec<T>) -> Cow<'_, [T]> {
    match configured {
        Some(chain) => Cow::Borrowed(chain.as_slice()),
        None => Cow::Owned(default()),
    }
}

fn default_title() -> Vec<FieldSelector> {
    ["title", "h1", ".title", "#title"]
        .into_iter()
        .map(FieldSelector::css)
        .collect()
}

fn default_description() -> Vec<FieldSelector> {
    vec![
        FieldSelector::meta("meta[name=description]"),
        FieldSelector::css(".description"),
        FieldSelector::css(".summary"),
        // The first <p> in document order is also the first of its type
        FieldSelector::css("p"),
    ]
}

fn default_content() -> Vec<FieldSelector> {
    [
        "article",
        ".content",
        ".post-content",
        ".entry-content",
        "main",
        "#content",
    ]
    .into_iter()
    .map(FieldSelector::css)
    .collect()
}

/// Content extracted from a single page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedContent {
    pub title: String,
    pub description: String,
    pub content: String,
    pub links: BTreeSet<String>,
    pub images: BTreeSet<String>,
}

impl ExtractedContent {
    /// Title, description, and content joined by single spaces
    ///
    /// This is the text that content filters are evaluated against.
    pub fn combined_text(&self) -> String {
        format!("{} {} {}", self.title, self.description, self.content)
    }
}

/// Extracts all fields from a parsed document
///
/// No field ever fails: missing matches produce empty strings and sets.
pub fn extract(document: &Html, spec: &SelectorSpec) -> ExtractedContent {
    ExtractedContent {
        title: resolve(document, &spec.title_chain()),
        description: resolve(document, &spec.description_chain()),
        content: resolve(document, &spec.content_chain()),
        links: collect_attribute(document, &spec.link_selectors(), "href"),
        images: collect_attribute(document, &spec.image_selectors(), "src"),
    }
}

/// Parses raw HTML and extracts it in one step
///
/// # Example
///
/// ```
/// use web_crawler::extract::{extract_html, SelectorSpec};
///
/// let html = r#"<html><body><a href="/x">1</a><a href="/x">2</a><a href="/x">3</a></body></html>"#;
/// let extracted = extract_html(html, &SelectorSpec::default());
/// assert_eq!(extracted.links.len(), 1);
/// ```
pub fn extract_html(html: &str, spec: &SelectorSpec) -> ExtractedContent {
    let document = Html::parse_document(html);
    extract(&document, spec)
}

/// Collects a named attribute from every match of every selector
fn collect_attribute(document: &Html, selectors: &[String], attribute: &str) -> BTreeSet<String> {
    let mut values = BTreeSet::new();

    for raw in selectors {
        let Some(selector) = parse_selector(raw) else {
            continue;
        };

        for element in document.select(&selector) {
            if let Some(value) = element.value().attr(attribute) {
                if !value.is_empty() {
                    values.insert(value.to_string());
                }
            }
        }
    }

    values
}
