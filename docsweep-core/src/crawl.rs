use crate::error::{Result, RunError};
use crate::session::RunSession;
use chrono::{DateTime, Utc};
use docsweep_scanner::event::{EventSink, event_channel};
use docsweep_scanner::{CrawlSummary, Crawler, MaxDepth};
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tracing::info;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/58.0.3029.110 Safari/537.3";
pub const DEFAULT_OUTPUT_DIR: &str = "downloads";

/// Options for configuring a crawl run
#[derive(Debug, Clone)]
pub struct CrawlOptions {
    pub urls: Vec<String>,
    /// Sent with every request, in addition to the default User-Agent unless
    /// one is given here.
    pub headers: Vec<(String, String)>,
    pub max_depth: MaxDepth,
    pub threads: usize,
    pub output_dir: PathBuf,
    /// Wipe `output_dir` before the run starts.
    pub clean: bool,
    pub discard_partial: bool,
    pub timeout: Option<Duration>,
    pub show_progress_bars: bool,
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self {
            urls: Vec::new(),
            headers: Vec::new(),
            max_depth: MaxDepth::Unbounded,
            threads: docsweep_scanner::crawler::DEFAULT_WORKERS,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            clean: false,
            discard_partial: false,
            timeout: None,
            show_progress_bars: false,
        }
    }
}

/// Callback for reporting crawl progress
pub type CrawlProgressCallback = Arc<dyn Fn(String) + Send + Sync>;

/// What a finished (or stopped) run produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: String,
    pub download_root: PathBuf,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub summary: CrawlSummary,
}

/// Builds the header set attached to every request.
pub fn build_header_map(headers: &[(String, String)]) -> Result<HeaderMap> {
    let mut map = HeaderMap::new();
    map.insert(
        reqwest::header::USER_AGENT,
        HeaderValue::from_static(DEFAULT_USER_AGENT),
    );

    for (name, value) in headers {
        let header_name = HeaderName::from_bytes(name.trim().as_bytes())
            .map_err(|_| RunError::InvalidHeader(name.clone()))?;
        let header_value = HeaderValue::from_str(value.trim())
            .map_err(|_| RunError::InvalidHeader(format!("{}: {}", name, value)))?;
        map.insert(header_name, header_value);
    }

    Ok(map)
}

/// Creates the download root, optionally wiping it first. Failure here is
/// the only fatal condition of a run.
pub fn prepare_download_root(path: &Path, clean: bool) -> Result<()> {
    let fail = |source| RunError::DownloadRoot {
        path: path.to_path_buf(),
        source,
    };

    if clean && path.exists() {
        std::fs::remove_dir_all(path).map_err(fail)?;
    }
    std::fs::create_dir_all(path).map_err(fail)
}

/// Execute a crawl run with the given options.
///
/// Events are appended to the session log as they arrive and forwarded to
/// `progress_callback` as display lines. The session is marked ready when the
/// run completes or is stopped.
pub async fn execute_run(
    options: CrawlOptions,
    session: &RunSession,
    progress_callback: Option<CrawlProgressCallback>,
) -> Result<RunReport> {
    let CrawlOptions {
        urls,
        headers,
        max_depth,
        threads,
        output_dir,
        clean,
        discard_partial,
        timeout,
        show_progress_bars,
    } = options;

    prepare_download_root(&output_dir, clean)?;
    let header_map = build_header_map(&headers)?;

    let run_id = session.run_id();
    let started_at = Utc::now();
    info!("Run {} writing to {}", run_id, output_dir.display());
    session.info(format!("Run {} started with {} seed URL(s)", run_id, urls.len()));

    // Set up single progress bar for overall crawl progress (only if enabled)
    let progress_bar = if show_progress_bars {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.enable_steady_tick(Duration::from_millis(100));
        pb.set_message("Starting crawl...");
        Some(pb)
    } else {
        None
    };

    let processed_count = Arc::new(AtomicUsize::new(0));
    let (tx, mut rx) = event_channel();

    // Drain events into the session log until the crawler drops its sender.
    let collector = {
        let session = session.clone();
        let progress_bar = progress_bar.clone();
        let progress_callback = progress_callback.clone();
        tokio::spawn(async move {
            while let Some(timed) = rx.recv().await {
                let line = timed.event.to_string();
                session.record(timed);
                match (&progress_bar, &progress_callback) {
                    (Some(pb), Some(callback)) => pb.suspend(|| callback(line)),
                    (None, Some(callback)) => callback(line),
                    _ => {}
                }
            }
        })
    };

    let outcome = {
        let count = processed_count.clone();
        let pb = progress_bar.clone();
        let crawler = Crawler::with_client_options(header_map, timeout)?
            .with_max_depth(max_depth)
            .with_workers(threads)
            .with_discard_partial(discard_partial)
            .with_cancel_signal(session.cancel_signal())
            .with_visited(session.visited())
            .with_events(EventSink::new(tx))
            .with_progress_callback(Arc::new(move |_worker_id: usize, _url: String| {
                let n = count.fetch_add(1, Ordering::Relaxed) + 1;
                if let Some(pb) = &pb {
                    pb.set_message(format!("Crawling... {} pages processed", n));
                }
            }));

        crawler.crawl(&urls, &output_dir).await
    };

    // Sender is gone with the crawler; wait for the log to catch up.
    let _ = collector.await;

    if let Some(pb) = &progress_bar {
        let total = processed_count.load(Ordering::Relaxed);
        pb.finish_with_message(format!("Crawl finished! {} pages processed", total));
    }

    let summary = match outcome {
        Ok(summary) => summary,
        Err(e) => {
            session.mark_ready();
            return Err(e.into());
        }
    };

    if summary.cancelled {
        session.info("Crawl stopped before completion.");
    } else {
        session.info("Crawl completed successfully!");
    }
    session.mark_ready();

    Ok(RunReport {
        run_id,
        download_root: output_dir,
        started_at,
        finished_at: Utc::now(),
        summary,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_user_agent_is_set() {
        let map = build_header_map(&[]).unwrap();
        assert_eq!(
            map.get(reqwest::header::USER_AGENT).unwrap(),
            DEFAULT_USER_AGENT
        );
    }

    #[test]
    fn test_custom_headers_override_defaults() {
        let map = build_header_map(&[
            ("User-Agent".to_string(), "custom/1.0".to_string()),
            ("X-Token".to_string(), " abc ".to_string()),
        ])
        .unwrap();
        assert_eq!(map.get("user-agent").unwrap(), "custom/1.0");
        assert_eq!(map.get("x-token").unwrap(), "abc");
    }

    #[test]
    fn test_invalid_header_name() {
        let err = build_header_map(&[("bad header".to_string(), "v".to_string())]).unwrap_err();
        assert!(matches!(err, RunError::InvalidHeader(_)));
    }
}
