//! Tabular export of crawl results
//!
//! Results are flattened into [`ExportRow`]s before serialization. The
//! rows borrow nothing from the results and never modify them.

use crate::crawler::CrawlResult;
use crate::output::stats::round2;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Characters of content kept in an export row
pub const CONTENT_PREVIEW_CHARS: usize = 500;

/// One flattened result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportRow {
    pub url: String,
    pub title: String,
    pub description: String,
    /// Content truncated to [`CONTENT_PREVIEW_CHARS`] plus `...`
    pub content: String,
    pub links_count: usize,
    pub images_count: usize,
    pub status_code: u16,
    /// Seconds, rounded to 2 decimals
    pub response_time: f64,
    /// `%Y-%m-%d %H:%M:%S` in UTC
    pub timestamp: String,
}

impl From<&CrawlResult> for ExportRow {
    fn from(result: &CrawlResult) -> Self {
        Self {
            url: result.url().to_string(),
            title: result.title().to_string(),
            description: result.description().to_string(),
            content: truncate_content(result.content(), CONTENT_PREVIEW_CHARS),
            links_count: result.links().len(),
            images_count: result.images().len(),
            status_code: result.status_code(),
            response_time: round2(result.response_time()),
            timestamp: result.timestamp().format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

/// Cuts `content` to `max_chars` characters, appending `...` when cut
pub fn truncate_content(content: &str, max_chars: usize) -> String {
    match content.char_indices().nth(max_chars) {
        Some((byte_index, _)) => format!("{}...", &content[..byte_index]),
        None => content.to_string(),
    }
}

pub fn export_rows(results: &[CrawlResult]) -> Vec<ExportRow> {
    results.iter().map(ExportRow::from).collect()
}

/// Writes the export rows as a pretty-printed JSON array
pub fn write_json<W: Write>(results: &[CrawlResult], writer: W) -> crate::Result<()> {
    serde_json::to_writer_pretty(writer, &export_rows(results))?;
    Ok(())
}

/// Writes the export rows to a JSON file, replacing it if present
///
/// # Errors
///
/// Fails when the file cannot be created or written.
pub fn export_json(results: &[CrawlResult], path: &Path) -> crate::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_json(results, &mut writer)?;
    writer.flush()?;

    tracing::info!("Exported {} results to {}", results.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::ExtractedContent;
    use std::time::Duration;
    use tempfile::tempdir;

    fn sample(content: &str) -> CrawlResult {
        let mut extracted = ExtractedContent {
            title: "Title".to_string(),
            content: content.to_string(),
            ..Default::default()
        };
        extracted.links.insert("/a".to_string());
        extracted.links.insert("/b".to_string());
        extracted.images.insert("/i.png".to_string());
        CrawlResult::new(
            "https://example.com/",
            extracted,
            200,
            Duration::from_millis(1234),
        )
    }

    #[test]
    fn test_truncate_content() {
        assert_eq!(truncate_content("short", 500), "short");
        assert_eq!(truncate_content("abcdef", 3), "abc...");
        assert_eq!(truncate_content("abc", 3), "abc");
        // Multi-byte characters are counted, not bytes
        assert_eq!(truncate_content("ééééé", 2), "éé...");
    }

    #[test]
    fn test_export_row_view() {
        let long = "x".repeat(600);
        let result = sample(&long);

        let row = ExportRow::from(&result);

        assert_eq!(row.content.chars().count(), CONTENT_PREVIEW_CHARS + 3);
        assert!(row.content.ends_with("..."));
        assert_eq!(row.links_count, 2);
        assert_eq!(row.images_count, 1);
        assert_eq!(row.response_time, 1.23);
        assert_eq!(row.timestamp.len(), "2024-01-01 00:00:00".len());
        // The result itself is untouched
        assert_eq!(result.content().len(), 600);
    }

    #[test]
    fn test_export_json_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("results.json");

        export_json(&[sample("body")], &path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        let rows: serde_json::Value = serde_json::from_str(&written).unwrap();
        assert_eq!(rows[0]["url"], "https://example.com/");
        assert_eq!(rows[0]["content"], "body");
        assert_eq!(rows[0]["links_count"], 2);
        assert_eq!(rows[0]["status_code"], 200);
    }

    #[test]
    fn test_export_json_bad_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("results.json");

        assert!(matches!(
            export_json(&[], &path),
            Err(crate::CrawlerError::Io(_))
        ));
    }
}
