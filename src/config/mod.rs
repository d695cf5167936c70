//! Configuration module
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files, plus the built-in selector/filter presets.
//!
//! # Example
//!
//! ```no_run
//! use web_crawler::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("crawler.toml")).unwrap();
//! println!("Crawler will wait {:?} between requests", config.session.delay());
//! ```

mod parser;
mod presets;
mod types;
mod validation;

// Re-export types
pub use presets::Preset;
pub use types::{Config, RenderConfig, SessionConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::{
    validate, validate_session_config, validate_urls, MAX_DELAY_SECS, MAX_SETTLE_SECS,
};
