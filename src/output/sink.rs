//! JSON-lines page sink
//!
//! Each crawled page is appended as one JSON object per line. Write
//! failures are local: they are logged and the crawl continues.

use crate::extract::PageData;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Mutex;

/// Append-only JSON-lines writer for crawled pages.
pub struct PageSink {
    writer: Mutex<BufWriter<File>>,
}

impl PageSink {
    /// Opens (or creates) the sink file in append mode.
    pub fn open(path: &Path) -> std::io::Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            writer: Mutex::new(BufWriter::new(file)),
        })
    }

    /// Appends one page record, flushing the line immediately.
    pub fn write(&self, page: &PageData) {
        let line = match serde_json::to_string(page) {
            Ok(line) => line,
            Err(e) => {
                tracing::warn!("Failed to serialise page {}: {}", page.url, e);
                return;
            }
        };

        let mut writer = self.writer.lock().expect("sink mutex poisoned");
        if let Err(e) = writeln!(writer, "{}", line).and_then(|_| writer.flush()) {
            tracing::warn!("Failed to write page {} to sink: {}", page.url, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_writes_one_line_per_page() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("pages.jsonl");
        let sink = PageSink::open(&path).unwrap();

        let mut page = PageData::default();
        page.url = "https://example.com/a".to_string();
        sink.write(&page);
        page.url = "https://example.com/b".to_string();
        sink.write(&page);

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["url"], "https://example.com/a");
    }

    #[test]
    fn test_append_survives_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("pages.jsonl");

        {
            let sink = PageSink::open(&path).unwrap();
            let page = PageData {
                url: "https://example.com/1".to_string(),
                ..Default::default()
            };
            sink.write(&page);
        }
        {
            let sink = PageSink::open(&path).unwrap();
            let page = PageData {
                url: "https://example.com/2".to_string(),
                ..Default::default()
            };
            sink.write(&page);
        }

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 2);
    }

    #[test]
    fn test_creates_parent_directory() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/deeper/pages.jsonl");
        let sink = PageSink::open(&path).unwrap();
        sink.write(&PageData::default());
        assert!(path.exists());
    }
}
