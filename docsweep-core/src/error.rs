use docsweep_scanner::ScanError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RunError {
    /// The download root could not be prepared; nothing was crawled.
    #[error("Cannot prepare download directory {}: {source}", path.display())]
    DownloadRoot {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid header '{0}'")]
    InvalidHeader(String),

    #[error("Crawl failed: {0}")]
    Scan(#[from] ScanError),

    #[error("Report error: {0}")]
    Report(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, RunError>;
