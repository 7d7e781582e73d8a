use std::collections::{HashSet, VecDeque};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Mutex;
use url::Url;

use crate::classifier::sanitize_filename;

/// How many page-to-page hops a crawl may take from its seed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MaxDepth {
    Limited(usize),
    #[default]
    Unbounded,
}

impl MaxDepth {
    /// Seeds sit at depth 1.
    pub fn allows(&self, depth: usize) -> bool {
        match self {
            MaxDepth::Limited(max) => depth >= 1 && depth <= *max,
            MaxDepth::Unbounded => depth >= 1,
        }
    }
}

impl FromStr for MaxDepth {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("max") || s.eq_ignore_ascii_case("unbounded") {
            return Ok(MaxDepth::Unbounded);
        }
        match s.parse::<usize>() {
            Ok(0) => Err("depth must be at least 1".to_string()),
            Ok(n) => Ok(MaxDepth::Limited(n)),
            Err(_) => Err(format!("invalid depth '{}': expected a number or 'max'", s)),
        }
    }
}

impl fmt::Display for MaxDepth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MaxDepth::Limited(n) => write!(f, "{}", n),
            MaxDepth::Unbounded => write!(f, "max"),
        }
    }
}

/// `host` or `host:port` when the URL names a non-default port.
pub fn authority(url: &Url) -> Option<String> {
    let host = url.host_str()?;
    Some(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    })
}

/// A seed URL and the storage it owns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Seed {
    pub url: String,
    pub authority: String,
    pub folder: PathBuf,
}

impl Seed {
    pub fn new(url: &Url, download_root: &std::path::Path) -> Option<Self> {
        let authority = authority(url)?;
        let folder = download_root.join(sanitize_filename(&authority));
        Some(Self {
            url: url.to_string(),
            authority,
            folder,
        })
    }

    /// `<root>/<domain>/level_<depth>`; created lazily by the downloader.
    pub fn level_folder(&self, depth: usize) -> PathBuf {
        self.folder.join(format!("level_{}", depth))
    }

    /// Domain restriction: exact authority match with the seed.
    pub fn owns(&self, url: &str) -> bool {
        Url::parse(url)
            .ok()
            .and_then(|parsed| authority(&parsed))
            .is_some_and(|a| a == self.authority)
    }
}

#[derive(Debug, Clone)]
pub struct FrontierItem {
    pub url: String,
    pub depth: usize,
    pub seed: Arc<Seed>,
}

/// Work queue of not-yet-processed pages shared by all workers.
///
/// `outstanding` counts queued items plus items a worker is still
/// processing, so an empty queue with zero outstanding work means the crawl
/// is finished.
#[derive(Debug, Default)]
pub struct Frontier {
    queue: Mutex<VecDeque<FrontierItem>>,
    outstanding: AtomicUsize,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn push(&self, item: FrontierItem) {
        self.outstanding.fetch_add(1, Ordering::SeqCst);
        self.queue.lock().await.push_back(item);
    }

    /// Takes the next item. The returned [`Claim`] keeps the item counted
    /// as outstanding until it is dropped, including during a panic unwind.
    pub async fn pop(&self) -> Option<(FrontierItem, Claim<'_>)> {
        let item = self.queue.lock().await.pop_front()?;
        Some((item, Claim { frontier: self }))
    }

    pub fn is_idle(&self) -> bool {
        self.outstanding.load(Ordering::SeqCst) == 0
    }

    pub async fn is_empty(&self) -> bool {
        self.queue.lock().await.is_empty()
    }
}

/// Outstanding-work marker for one popped [`FrontierItem`].
#[derive(Debug)]
pub struct Claim<'a> {
    frontier: &'a Frontier,
}

impl Drop for Claim<'_> {
    fn drop(&mut self) {
        self.frontier.outstanding.fetch_sub(1, Ordering::SeqCst);
    }
}

/// URLs already processed in this run, shared by every seed.
#[derive(Debug, Clone, Default)]
pub struct VisitedSet {
    inner: Arc<Mutex<HashSet<String>>>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `url` and returns true if it had not been seen before.
    /// Check and insert happen under one lock.
    pub async fn insert(&self, url: &str) -> bool {
        self.inner.lock().await.insert(url.to_string())
    }

    pub async fn contains(&self, url: &str) -> bool {
        self.inner.lock().await.contains(url)
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.is_empty()
    }

    pub async fn clear(&self) {
        self.inner.lock().await.clear();
    }

    pub async fn snapshot(&self) -> Vec<String> {
        let mut urls: Vec<String> = self.inner.lock().await.iter().cloned().collect();
        urls.sort();
        urls
    }
}
