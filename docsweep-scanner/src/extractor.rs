//! Link discovery across the different ways pages expose documents.
//!
//! Each [`LinkStrategy`] looks at one structural pattern (plain anchors,
//! `SaveToDisk(...)` click handlers, tables, lists, inline frames) and the
//! [`LinkExtractor`] merges their results into one set. Navigation, header
//! and footer regions are removed before any strategy runs.

use crate::cancel::CancelSignal;
use crate::error::{Result, ScanError};
use crate::event::EventSink;
use regex::Regex;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use std::collections::BTreeSet;
use std::sync::LazyLock;
use tracing::debug;
use url::Url;

static NOISE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("nav, header, footer").expect("valid selector"));
static BASE_HREF: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("base[href]").expect("valid selector"));
static ANCHORS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("valid selector"));
static CLICK_HANDLERS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("[onclick]").expect("valid selector"));
static TABLE_ANCHORS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("table a[href]").expect("valid selector"));
static LIST_ANCHORS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("ul a[href], ol a[href]").expect("valid selector"));
static FRAMES: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("iframe[src]").expect("valid selector"));
static SAVE_TO_DISK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"SaveToDisk\(\s*["']([^"']+)["']"#).expect("valid SaveToDisk pattern")
});

/// One way of finding candidate links in a page.
pub trait LinkStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Absolute candidate URLs found by this strategy.
    fn extract(&self, document: ElementRef<'_>, base: &Url) -> Vec<Url>;

    /// Whether candidates must pass an existence check before being kept.
    fn requires_verification(&self) -> bool {
        false
    }
}

pub struct AnchorStrategy;
pub struct ClickHandlerStrategy;
pub struct TableStrategy;
pub struct ListStrategy;
pub struct FrameStrategy;

impl LinkStrategy for AnchorStrategy {
    fn name(&self) -> &'static str {
        "anchor"
    }

    fn extract(&self, document: ElementRef<'_>, base: &Url) -> Vec<Url> {
        hrefs_matching(document, &ANCHORS, base)
    }
}

impl LinkStrategy for ClickHandlerStrategy {
    fn name(&self) -> &'static str {
        "click-handler"
    }

    fn extract(&self, document: ElementRef<'_>, base: &Url) -> Vec<Url> {
        document
            .select(&CLICK_HANDLERS)
            .filter_map(|element| element.value().attr("onclick"))
            .filter_map(|handler| SAVE_TO_DISK.captures(handler))
            .filter_map(|captures| resolve_href(base, &captures[1]))
            .collect()
    }
}

impl LinkStrategy for TableStrategy {
    fn name(&self) -> &'static str {
        "table"
    }

    fn extract(&self, document: ElementRef<'_>, base: &Url) -> Vec<Url> {
        hrefs_matching(document, &TABLE_ANCHORS, base)
    }
}

impl LinkStrategy for ListStrategy {
    fn name(&self) -> &'static str {
        "list"
    }

    fn extract(&self, document: ElementRef<'_>, base: &Url) -> Vec<Url> {
        hrefs_matching(document, &LIST_ANCHORS, base)
    }
}

impl LinkStrategy for FrameStrategy {
    fn name(&self) -> &'static str {
        "frame"
    }

    fn extract(&self, document: ElementRef<'_>, base: &Url) -> Vec<Url> {
        document
            .select(&FRAMES)
            .filter_map(|element| element.value().attr("src"))
            .filter_map(|src| resolve_href(base, src))
            .collect()
    }

    fn requires_verification(&self) -> bool {
        true
    }
}

/// Candidates found in one page, before frame probing.
#[derive(Debug, Default)]
pub struct Candidates {
    pub links: BTreeSet<String>,
    pub frames: Vec<Url>,
}

pub struct LinkExtractor {
    strategies: Vec<Box<dyn LinkStrategy>>,
}

impl LinkExtractor {
    /// Extractor running every built-in strategy.
    pub fn new() -> Self {
        Self::with_strategies(vec![
            Box::new(AnchorStrategy),
            Box::new(ClickHandlerStrategy),
            Box::new(TableStrategy),
            Box::new(ListStrategy),
            Box::new(FrameStrategy),
        ])
    }

    pub fn with_strategies(strategies: Vec<Box<dyn LinkStrategy>>) -> Self {
        Self { strategies }
    }

    /// Parses `html`, strips noise regions and runs every strategy.
    ///
    /// Synchronous so the parsed document never lives across an await point.
    pub fn candidates(&self, html: &str, page_url: &Url) -> Candidates {
        let mut document = Html::parse_document(html);
        strip_noise(&mut document);

        let root = document.root_element();
        let base = root
            .select(&BASE_HREF)
            .next()
            .and_then(|element| element.value().attr("href"))
            .and_then(|href| page_url.join(href.trim()).ok())
            .unwrap_or_else(|| page_url.clone());

        let mut candidates = Candidates::default();
        for strategy in &self.strategies {
            let found = strategy.extract(root, &base);
            debug!("{} strategy found {} link(s) on {}", strategy.name(), found.len(), page_url);

            if strategy.requires_verification() {
                candidates.frames.extend(found);
            } else {
                candidates.links.extend(found.into_iter().map(String::from));
            }
        }

        candidates
    }

    /// Full extraction: candidates plus frame sources that answer a GET with
    /// a success status. Failed checks are logged and the frame dropped.
    pub async fn extract(
        &self,
        client: &Client,
        html: &str,
        page_url: &Url,
        cancel: &CancelSignal,
        events: &EventSink,
    ) -> BTreeSet<String> {
        let Candidates { mut links, frames } = self.candidates(html, page_url);

        for frame in frames {
            if cancel.is_cancelled() {
                break;
            }
            if links.contains(frame.as_str()) {
                continue;
            }

            match verify_frame(client, &frame).await {
                Ok(()) => {
                    links.insert(frame.into());
                }
                Err(e) => events.warn(e.to_string()),
            }
        }

        links
    }
}

impl Default for LinkExtractor {
    fn default() -> Self {
        Self::new()
    }
}

async fn verify_frame(client: &Client, url: &Url) -> Result<()> {
    let extraction = |message: String| ScanError::Extraction {
        url: url.to_string(),
        message,
    };

    let response = client
        .get(url.clone())
        .send()
        .await
        .map_err(|e| extraction(e.to_string()))?;

    if response.status().is_success() {
        Ok(())
    } else {
        Err(extraction(format!("HTTP {}", response.status())))
    }
}

fn strip_noise(document: &mut Html) {
    let ids: Vec<_> = document
        .root_element()
        .select(&NOISE)
        .map(|element| element.id())
        .collect();

    for id in ids {
        if let Some(mut node) = document.tree.get_mut(id) {
            node.detach();
        }
    }
}

fn hrefs_matching(document: ElementRef<'_>, selector: &Selector, base: &Url) -> Vec<Url> {
    document
        .select(selector)
        .filter_map(|element| element.value().attr("href"))
        .filter_map(|href| resolve_href(base, href))
        .collect()
}

/// Resolves `href` against `base`, dropping pseudo-URLs and fragments.
pub fn resolve_href(base: &Url, href: &str) -> Option<Url> {
    let href = href.trim();
    let lower = href.to_ascii_lowercase();
    if href.is_empty()
        || href.starts_with('#')
        || lower.starts_with("javascript:")
        || lower.starts_with("mailto:")
        || lower.starts_with("tel:")
        || lower.starts_with("data:")
    {
        return None;
    }

    let mut url = base.join(href).ok()?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return None;
    }
    url.set_fragment(None);
    Some(url)
}
