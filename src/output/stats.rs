//! Statistics derived from crawl results
//!
//! This module summarizes the accepted results of a session and prints the
//! summary for the CLI.

use crate::crawler::CrawlResult;
use serde::Serialize;
use std::collections::BTreeMap;

/// Crawl statistics summary
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrawlStatistics {
    /// Number of accepted results
    pub total_pages: usize,

    /// Mean response time in seconds, rounded to 2 decimals
    pub average_response_time: f64,

    /// Sum of per-result unique link counts
    pub total_links_found: usize,

    /// Sum of per-result unique image counts
    pub total_images_found: usize,

    /// Histogram of status codes over accepted results
    pub status_codes: BTreeMap<u16, usize>,

    /// URLs visited in the session, accepted or not
    pub total_urls_visited: usize,
}

impl CrawlStatistics {
    /// Summarizes `results`
    ///
    /// # Arguments
    ///
    /// * `results` - Accepted results of the session
    /// * `urls_visited` - Size of the session's visited set
    ///
    /// # Returns
    ///
    /// `None` when there are no results.
    pub fn from_results(results: &[CrawlResult], urls_visited: usize) -> Option<Self> {
        if results.is_empty() {
            return None;
        }

        let mut status_codes = BTreeMap::new();
        for result in results {
            *status_codes.entry(result.status_code()).or_insert(0) += 1;
        }

        let total_time: f64 = results.iter().map(|r| r.response_time()).sum();

        Some(Self {
            total_pages: results.len(),
            average_response_time: round2(total_time / results.len() as f64),
            total_links_found: results.iter().map(|r| r.links().len()).sum(),
            total_images_found: results.iter().map(|r| r.images().len()).sum(),
            status_codes,
            total_urls_visited: urls_visited,
        })
    }
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Crawl Statistics ===\n");

    println!("Overview:");
    println!("  Pages collected: {}", stats.total_pages);
    println!("  URLs visited: {}", stats.total_urls_visited);
    println!("  Average response time: {:.2}s", stats.average_response_time);
    println!("  Links found: {}", stats.total_links_found);
    println!("  Images found: {}", stats.total_images_found);
    println!();

    println!("Status Codes:");
    for (status, count) in &stats.status_codes {
        let percentage = (*count as f64 / stats.total_pages as f64) * 100.0;
        println!("  {}: {} ({:.1}%)", status, count, percentage);
    }
    println!();

    let skipped = stats.total_urls_visited.saturating_sub(stats.total_pages);
    if skipped > 0 {
        println!("Skipped (fetch errors or filtered): {}", skipped);
    }
}
