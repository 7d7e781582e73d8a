//! Retrieval of a single URL into a level folder.
//!
//! [`Downloader::stream`] is used for links already known to be documents and
//! polls the cancel signal between fixed-size writes. [`Downloader::fetch`] is
//! the fallback for links whose document-ness only shows once the response
//! headers arrive; it reads the body in one go.

use crate::cancel::CancelSignal;
use crate::classifier::resolve_filename;
use crate::error::{Result, ScanError};
use crate::result::{DownloadOutcome, FileRecord};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Response};
use std::path::{Path, PathBuf};
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;
use tracing::debug;
use url::Url;

pub const CHUNK_SIZE: usize = 8192;

#[derive(Debug, Clone)]
pub struct Downloader {
    client: Client,
    discard_partial: bool,
}

impl Downloader {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            discard_partial: false,
        }
    }

    /// Remove files left behind by a cancelled streaming download.
    pub fn with_discard_partial(mut self, discard_partial: bool) -> Self {
        self.discard_partial = discard_partial;
        self
    }

    /// Cancellable streaming download.
    pub async fn stream(
        &self,
        url: &str,
        folder: &Path,
        cancel: &CancelSignal,
    ) -> Result<DownloadOutcome> {
        if cancel.is_cancelled() {
            return Ok(DownloadOutcome::Cancelled {
                partial: None,
                bytes_written: 0,
            });
        }

        let (parsed, mut response) = self.request(url).await?;
        let Some(path) = target_path(&parsed, &response, folder) else {
            return Ok(DownloadOutcome::NotADocument);
        };

        let mut file = create_file(folder, &path).await?;
        let mut written: u64 = 0;
        let mut cancelled = false;

        'body: loop {
            if cancel.is_cancelled() {
                cancelled = true;
                break;
            }
            let Some(chunk) = response.chunk().await? else {
                break;
            };
            for piece in chunk.chunks(CHUNK_SIZE) {
                if cancel.is_cancelled() {
                    cancelled = true;
                    break 'body;
                }
                file.write_all(piece)
                    .await
                    .map_err(|e| ScanError::filesystem(&path, e))?;
                written += piece.len() as u64;
            }
        }

        file.flush()
            .await
            .map_err(|e| ScanError::filesystem(&path, e))?;
        drop(file);

        if cancelled {
            debug!("Download of {} cancelled after {} bytes", url, written);
            let partial = if self.discard_partial {
                fs::remove_file(&path)
                    .await
                    .map_err(|e| ScanError::filesystem(&path, e))?;
                None
            } else {
                Some(path)
            };
            return Ok(DownloadOutcome::Cancelled {
                partial,
                bytes_written: written,
            });
        }

        Ok(DownloadOutcome::Saved(FileRecord {
            url: url.to_string(),
            path,
            bytes: written,
        }))
    }

    /// Non-cancellable fallback: classify by headers, then write the whole
    /// body at once.
    pub async fn fetch(&self, url: &str, folder: &Path) -> Result<DownloadOutcome> {
        let (parsed, response) = self.request(url).await?;
        let Some(path) = target_path(&parsed, &response, folder) else {
            return Ok(DownloadOutcome::NotADocument);
        };

        let body = response.bytes().await?;
        let mut file = create_file(folder, &path).await?;
        file.write_all(&body)
            .await
            .map_err(|e| ScanError::filesystem(&path, e))?;
        file.flush()
            .await
            .map_err(|e| ScanError::filesystem(&path, e))?;

        Ok(DownloadOutcome::Saved(FileRecord {
            url: url.to_string(),
            path,
            bytes: body.len() as u64,
        }))
    }

    async fn request(&self, url: &str) -> Result<(Url, Response)> {
        let parsed =
            Url::parse(url).map_err(|e| ScanError::InvalidUrl(format!("{}: {}", url, e)))?;

        debug!("Downloading {}", url);
        let response = self.client.get(parsed.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ScanError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok((parsed, response))
    }
}

fn target_path(url: &Url, response: &Response, folder: &Path) -> Option<PathBuf> {
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok());

    resolve_filename(url, content_type).map(|name| folder.join(name))
}

async fn create_file(folder: &Path, path: &Path) -> Result<File> {
    fs::create_dir_all(folder)
        .await
        .map_err(|e| ScanError::filesystem(folder, e))?;
    File::create(path)
        .await
        .map_err(|e| ScanError::filesystem(path, e))
}
