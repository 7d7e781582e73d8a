use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared stop flag polled by the crawler and the download paths.
///
/// Setting it never interrupts a request that is already in flight; work
/// stops at the next poll point (link loops, chunk writes, frame checks and
/// the worker loop).
#[derive(Debug, Clone, Default)]
pub struct CancelSignal {
    flag: Arc<AtomicBool>,
}

impl CancelSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Clears the flag for every clone. Only call between runs.
    pub fn reset(&self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}
