use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

/// Message types emitted by the crawler while a run is in progress
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum CrawlEvent {
    /// A page is about to be fetched
    Processing { url: String, depth: usize },
    /// A page was skipped because it was processed before
    AlreadyVisited { url: String },
    /// A document was written to disk
    Downloaded {
        url: String,
        path: PathBuf,
        bytes: u64,
    },
    /// A streaming download stopped because the run was cancelled
    DownloadCancelled { url: String, partial: Option<PathBuf> },
    /// The crawler noticed the cancel signal and stopped scheduling work
    Stopped,
    /// Free-form log line
    Log { level: LogLevel, message: String },
}

impl CrawlEvent {
    pub fn level(&self) -> LogLevel {
        match self {
            CrawlEvent::Log { level, .. } => *level,
            CrawlEvent::DownloadCancelled { .. } | CrawlEvent::Stopped => LogLevel::Warn,
            _ => LogLevel::Info,
        }
    }
}

impl fmt::Display for CrawlEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CrawlEvent::Processing { url, depth } => {
                write!(f, "Processing URL: {} at level {}", url, depth)
            }
            CrawlEvent::AlreadyVisited { url } => {
                write!(f, "Skipping already visited URL: {}", url)
            }
            CrawlEvent::Downloaded { path, bytes, .. } => {
                write!(f, "Downloaded: {} ({} bytes)", path.display(), bytes)
            }
            CrawlEvent::DownloadCancelled { url, .. } => {
                write!(f, "Cancelled download for {}", url)
            }
            CrawlEvent::Stopped => write!(f, "Stopping the crawl."),
            CrawlEvent::Log { message, .. } => write!(f, "{}", message),
        }
    }
}

/// A crawl event stamped with the time it was emitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimedEvent {
    pub at: DateTime<Utc>,
    pub event: CrawlEvent,
}

/// Injected log sink. Every event goes to `tracing` and, when a channel is
/// attached, to the consumer on the other end.
#[derive(Debug, Clone, Default)]
pub struct EventSink {
    tx: Option<mpsc::UnboundedSender<TimedEvent>>,
}

impl EventSink {
    pub fn new(tx: mpsc::UnboundedSender<TimedEvent>) -> Self {
        Self { tx: Some(tx) }
    }

    /// Sink that only logs through `tracing`.
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn emit(&self, event: CrawlEvent) {
        match event.level() {
            LogLevel::Info => info!("{}", event),
            LogLevel::Warn => warn!("{}", event),
            LogLevel::Error => error!("{}", event),
        }

        if let Some(tx) = &self.tx {
            // Receiver gone means nobody is listening any more; keep crawling.
            let _ = tx.send(TimedEvent {
                at: Utc::now(),
                event,
            });
        }
    }

    pub fn info(&self, message: impl Into<String>) {
        self.log(LogLevel::Info, message);
    }

    pub fn warn(&self, message: impl Into<String>) {
        self.log(LogLevel::Warn, message);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.log(LogLevel::Error, message);
    }

    fn log(&self, level: LogLevel, message: impl Into<String>) {
        self.emit(CrawlEvent::Log {
            level,
            message: message.into(),
        });
    }
}

/// Create a channel pair for receiving crawl events
pub fn event_channel() -> (
    mpsc::UnboundedSender<TimedEvent>,
    mpsc::UnboundedReceiver<TimedEvent>,
) {
    mpsc::unbounded_channel()
}
