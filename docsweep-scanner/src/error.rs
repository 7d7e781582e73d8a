use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("HTTP request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("HTTP {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Failed to write {}: {source}", path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to resolve iframe URL {url}: {message}")]
    Extraction { url: String, message: String },

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl ScanError {
    pub fn filesystem(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Filesystem {
            path: path.into(),
            source,
        }
    }

    /// True for failures that happened on the wire rather than on disk.
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network(_) | Self::HttpStatus { .. })
    }
}

pub type Result<T> = std::result::Result<T, ScanError>;
