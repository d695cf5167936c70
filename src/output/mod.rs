//! Output module for crawl summaries and exports
//!
//! This module handles:
//! - Deriving statistics from the accepted results
//! - Flattening results into export rows and writing them as JSON

pub mod export;
pub mod stats;

pub use export::{export_json, export_rows, write_json, ExportRow};
pub use stats::{print_statistics, CrawlStatistics};
