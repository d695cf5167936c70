//! Content extraction module
//!
//! This module turns raw HTML into structured fields:
//! - Selector fallback chains for title, description, and content
//! - De-duplicated link and image collection
//!
//! Extraction never fails. Missing or malformed selectors simply produce
//! empty values.

mod extractor;
mod selector;

pub use extractor::{extract, extract_html, ExtractedContent, SelectorSpec};
pub use selector::{resolve, FieldSelector};
