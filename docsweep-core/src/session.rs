// Run session state shared between the crawl and whoever drives it

use docsweep_scanner::event::{CrawlEvent, LogLevel, TimedEvent};
use docsweep_scanner::{CancelSignal, VisitedSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex as StdMutex, PoisonError};

#[derive(Debug)]
struct SessionState {
    run_id: String,
    log: Vec<TimedEvent>,
}

/// One operator session: the log sequence, the "download ready" flag, the
/// stop signal and the visited set of the current run.
///
/// Cloning yields another handle to the same session, so a Ctrl-C handler
/// can call [`RunSession::stop`] while a run is in progress.
#[derive(Debug, Clone)]
pub struct RunSession {
    state: Arc<StdMutex<SessionState>>,
    download_ready: Arc<AtomicBool>,
    cancel: CancelSignal,
    visited: VisitedSet,
}

impl RunSession {
    pub fn new() -> Self {
        Self {
            state: Arc::new(StdMutex::new(SessionState {
                run_id: new_run_id(),
                log: Vec::new(),
            })),
            download_ready: Arc::new(AtomicBool::new(false)),
            cancel: CancelSignal::new(),
            visited: VisitedSet::new(),
        }
    }

    pub fn run_id(&self) -> String {
        self.lock().run_id.clone()
    }

    pub fn cancel_signal(&self) -> CancelSignal {
        self.cancel.clone()
    }

    pub fn visited(&self) -> VisitedSet {
        self.visited.clone()
    }

    /// Asks the running crawl to stop at its next poll point. Whatever was
    /// retrieved so far is ready to be collected.
    pub fn stop(&self) {
        self.cancel.cancel();
        self.download_ready.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn mark_ready(&self) {
        self.download_ready.store(true, Ordering::SeqCst);
    }

    pub fn is_download_ready(&self) -> bool {
        self.download_ready.load(Ordering::SeqCst)
    }

    /// Clears visited URLs, log and readiness, and re-arms the stop signal.
    /// Must run before a new crawl starts.
    pub async fn reset(&self) {
        {
            let mut state = self.lock();
            state.run_id = new_run_id();
            state.log.clear();
        }
        self.download_ready.store(false, Ordering::SeqCst);
        self.cancel.reset();
        self.visited.clear().await;
    }

    pub fn record(&self, event: TimedEvent) {
        self.lock().log.push(event);
    }

    pub fn info(&self, message: impl Into<String>) {
        self.record(TimedEvent {
            at: chrono::Utc::now(),
            event: CrawlEvent::Log {
                level: LogLevel::Info,
                message: message.into(),
            },
        });
    }

    /// Snapshot of the log, oldest first.
    pub fn log(&self) -> Vec<TimedEvent> {
        self.lock().log.clone()
    }

    pub fn log_lines(&self) -> Vec<String> {
        self.lock()
            .log
            .iter()
            .map(|timed| timed.event.to_string())
            .collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for RunSession {
    fn default() -> Self {
        Self::new()
    }
}

fn new_run_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
