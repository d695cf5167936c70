//! web-crawler: a polite page acquisition and extraction pipeline
//!
//! This crate fetches web pages one at a time, extracts structured content
//! through ordered selector fallback chains, filters it, and keeps the
//! accepted results in memory for statistics and export.

pub mod config;
pub mod crawler;
pub mod extract;
pub mod filter;
pub mod output;
pub mod robots;
pub mod state;

use thiserror::Error;

/// Main error type for crawler operations
#[derive(Debug, Error)]
pub enum CrawlerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
///
/// These are surfaced at construction time and never turned into a per-URL
/// skip.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid regex '{pattern}': {source}")]
    InvalidRegex {
        pattern: String,
        source: regex::Error,
    },

    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    #[error("Invalid proxy '{scheme}': {message}")]
    InvalidProxy { scheme: String, message: String },

    #[error("Unknown preset: {0}")]
    UnknownPreset(String),
}

/// Result type alias for crawler operations
pub type Result<T> = std::result::Result<T, CrawlerError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::{Config, SessionConfig};
pub use crawler::{CrawlRequest, CrawlResult, Crawler, RenderRequest};
pub use extract::{FieldSelector, SelectorSpec};
pub use filter::FilterSpec;
pub use output::CrawlStatistics;
