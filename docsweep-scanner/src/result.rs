use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A document that made it to disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    pub url: String,
    pub path: PathBuf,
    pub bytes: u64,
}

/// Result of one download attempt that did not fail outright.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    Saved(FileRecord),
    /// The response did not resolve to a recognized document name; nothing
    /// was written.
    NotADocument,
    /// The cancel signal fired mid-stream. `partial` is the file left behind,
    /// if any bytes were kept.
    Cancelled {
        partial: Option<PathBuf>,
        bytes_written: u64,
    },
}

/// Totals for a finished (or stopped) crawl.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CrawlSummary {
    pub pages_processed: usize,
    pub pages_failed: usize,
    pub downloads: Vec<FileRecord>,
    pub download_failures: usize,
    pub cancelled: bool,
}

impl CrawlSummary {
    pub fn bytes_downloaded(&self) -> u64 {
        self.downloads.iter().map(|record| record.bytes).sum()
    }
}
