//! Persistence boundary for completed acquisitions.
//!
//! The crawler holds no database; it emits one [`AcquisitionRecord`] per
//! saved page and leaves storage to an [`AcquisitionSink`].

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tokio::io::AsyncWriteExt;

use crate::error::CrawlerError;

pub const JOURNAL_FILE: &str = "acquisitions.jsonl";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcquisitionRecord {
    pub competitor: String,
    pub url: String,
    pub source_type: String,
    pub content_path: PathBuf,
    pub image_files: Vec<String>,
    pub title: String,
    pub platform: String,
    pub method: String,
    /// SHA-256 of the fetched markdown, lowercase hex.
    pub content_hash: String,
    pub captured_at: DateTime<Utc>,
}

#[async_trait]
pub trait AcquisitionSink: Send + Sync {
    /// # Errors
    ///
    /// Returns an error if the record cannot be stored.
    async fn record(&self, record: AcquisitionRecord) -> Result<(), CrawlerError>;
}

#[must_use]
pub fn content_hash(markdown: &str) -> String {
    format!("{:x}", Sha256::digest(markdown.as_bytes()))
}

/// Appends records as JSON lines to a single journal file.
pub struct JsonlSink {
    path: PathBuf,
    write_lock: tokio::sync::Mutex<()>,
}

impl JsonlSink {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: tokio::sync::Mutex::new(()),
        }
    }

    /// Journal at [`JOURNAL_FILE`] inside `storage_root`.
    #[must_use]
    pub fn in_storage_root(storage_root: &Path) -> Self {
        Self::new(storage_root.join(JOURNAL_FILE))
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl AcquisitionSink for JsonlSink {
    async fn record(&self, record: AcquisitionRecord) -> Result<(), CrawlerError> {
        let mut line = serde_json::to_string(&record).map_err(|e| CrawlerError::Encode {
            context: format!("acquisition record for {}", record.url),
            reason: e.to_string(),
        })?;
        line.push('\n');

        let _guard = self.write_lock.lock().await;
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| CrawlerError::io(format!("creating {}", parent.display()), e))?;
        }
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| CrawlerError::io(format!("opening {}", self.path.display()), e))?;
        file.write_all(line.as_bytes())
            .await
            .map_err(|e| CrawlerError::io(format!("appending to {}", self.path.display()), e))?;
        file.flush()
            .await
            .map_err(|e| CrawlerError::io(format!("flushing {}", self.path.display()), e))?;
        Ok(())
    }
}

/// Keeps records in memory; used for dry runs and tests.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<AcquisitionRecord>>,
}

impl MemorySink {
    #[must_use]
    pub fn records(&self) -> Vec<AcquisitionRecord> {
        self.records
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl AcquisitionSink for MemorySink {
    async fn record(&self, record: AcquisitionRecord) -> Result<(), CrawlerError> {
        if let Ok(mut records) = self.records.lock() {
            records.push(record);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(url: &str) -> AcquisitionRecord {
        AcquisitionRecord {
            competitor: "Jasper".to_string(),
            url: url.to_string(),
            source_type: "pricing".to_string(),
            content_path: PathBuf::from("/tmp/x/content.md"),
            image_files: vec!["img_01.png".to_string()],
            title: "Pricing".to_string(),
            platform: "普通网站".to_string(),
            method: "jina".to_string(),
            content_hash: content_hash("body"),
            captured_at: Utc::now(),
        }
    }

    #[test]
    fn content_hash_is_sha256_hex() {
        assert_eq!(
            content_hash(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(content_hash("body").len(), 64);
    }

    #[tokio::test]
    async fn jsonl_sink_appends_one_line_per_record() {
        let root = std::env::temp_dir().join(format!("compscout-sink-{}", uuid::Uuid::new_v4()));
        let sink = JsonlSink::in_storage_root(&root);

        sink.record(record("https://a.com/pricing")).await.unwrap();
        sink.record(record("https://b.com/pricing")).await.unwrap();

        let journal = std::fs::read_to_string(sink.path()).unwrap();
        let parsed: Vec<AcquisitionRecord> = journal
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[1].url, "https://b.com/pricing");
        assert_eq!(parsed[0].image_files, ["img_01.png"]);

        std::fs::remove_dir_all(&root).ok();
    }

    #[tokio::test]
    async fn memory_sink_keeps_records_in_order() {
        let sink = MemorySink::default();
        sink.record(record("https://a.com")).await.unwrap();
        sink.record(record("https://b.com")).await.unwrap();
        let urls: Vec<String> = sink.records().into_iter().map(|r| r.url).collect();
        assert_eq!(urls, ["https://a.com", "https://b.com"]);
    }
}
