pub mod cancel;
pub mod classifier;
pub mod crawler;
pub mod download;
pub mod error;
pub mod event;
pub mod extractor;
pub mod frontier;
pub mod result;

pub use cancel::CancelSignal;
pub use crawler::{Crawler, ProgressCallback, ResultCallback};
pub use error::ScanError;
pub use event::{CrawlEvent, EventSink, LogLevel, TimedEvent};
pub use frontier::{MaxDepth, VisitedSet};
pub use result::{CrawlSummary, DownloadOutcome, FileRecord};
