use crate::cancel::CancelSignal;
use crate::classifier::is_document_url;
use crate::download::Downloader;
use crate::error::{Result, ScanError};
use crate::event::{CrawlEvent, EventSink};
use crate::extractor::LinkExtractor;
use crate::frontier::{Frontier, FrontierItem, MaxDepth, Seed, VisitedSet};
use crate::result::{CrawlSummary, DownloadOutcome, FileRecord};
use futures::future::join_all;
use reqwest::Client;
use reqwest::header::{CONTENT_TYPE, HeaderMap};
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info};
use url::Url;

pub type ProgressCallback = Arc<dyn Fn(usize, String) + Send + Sync>;
pub type ResultCallback = Arc<dyn Fn(FileRecord) + Send + Sync>;

pub const DEFAULT_WORKERS: usize = 4;
const MAX_REDIRECTS: usize = 10;

/// Everything a worker needs, owned by the run and shared by all workers.
pub struct CrawlContext {
    pub client: Client,
    pub downloader: Downloader,
    pub extractor: LinkExtractor,
    pub visited: VisitedSet,
    pub cancel: CancelSignal,
    pub events: EventSink,
    pub max_depth: MaxDepth,
    summary: Mutex<CrawlSummary>,
    progress_callback: Option<ProgressCallback>,
    result_callback: Option<ResultCallback>,
}

pub struct Crawler {
    client: Client,
    visited: VisitedSet,
    max_depth: MaxDepth,
    workers: usize,
    discard_partial: bool,
    cancel: CancelSignal,
    events: EventSink,
    progress_callback: Option<ProgressCallback>,
    result_callback: Option<ResultCallback>,
}

impl Crawler {
    pub fn new() -> Result<Self> {
        Self::with_client_options(HeaderMap::new(), None)
    }

    /// `headers` are attached to every request. Without a timeout the
    /// transport defaults apply.
    pub fn with_client_options(headers: HeaderMap, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder()
            .default_headers(headers)
            .pool_max_idle_per_host(50)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(60))
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self::with_client(builder.build()?))
    }

    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            visited: VisitedSet::new(),
            max_depth: MaxDepth::Unbounded,
            workers: DEFAULT_WORKERS,
            discard_partial: false,
            cancel: CancelSignal::new(),
            events: EventSink::disabled(),
            progress_callback: None,
            result_callback: None,
        }
    }

    pub fn with_max_depth(mut self, depth: MaxDepth) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn with_discard_partial(mut self, discard_partial: bool) -> Self {
        self.discard_partial = discard_partial;
        self
    }

    pub fn with_cancel_signal(mut self, cancel: CancelSignal) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn with_events(mut self, events: EventSink) -> Self {
        self.events = events;
        self
    }

    /// Share a visited set with another crawler.
    pub fn with_visited(mut self, visited: VisitedSet) -> Self {
        self.visited = visited;
        self
    }

    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Called synchronously after every saved document.
    pub fn with_result_callback(mut self, callback: ResultCallback) -> Self {
        self.result_callback = Some(callback);
        self
    }

    pub fn visited(&self) -> &VisitedSet {
        &self.visited
    }

    pub fn cancel_signal(&self) -> &CancelSignal {
        &self.cancel
    }

    /// Crawls every seed concurrently, saving documents under
    /// `<download_root>/<domain>/level_<N>/`.
    ///
    /// Individual page and download failures are reported as events and never
    /// fail the crawl; only an empty or entirely invalid seed list does.
    pub async fn crawl(&self, seeds: &[String], download_root: &Path) -> Result<CrawlSummary> {
        let frontier = Arc::new(Frontier::new());
        let mut seeded = 0;

        for raw in seeds {
            let raw = raw.trim();
            let seed = Url::parse(raw)
                .ok()
                .and_then(|url| Seed::new(&url, download_root).map(|seed| (url, seed)));

            match seed {
                Some((url, seed)) => {
                    frontier
                        .push(FrontierItem {
                            url: url.to_string(),
                            depth: 1,
                            seed: Arc::new(seed),
                        })
                        .await;
                    seeded += 1;
                }
                None => self.events.error(format!("Invalid seed URL: '{}'", raw)),
            }
        }

        if seeded == 0 {
            return Err(ScanError::InvalidUrl("no valid seed URLs".to_string()));
        }

        info!(
            "Starting crawl of {} seed(s) with {} workers, max depth {}",
            seeded, self.workers, self.max_depth
        );

        let context = Arc::new(CrawlContext {
            client: self.client.clone(),
            downloader: Downloader::new(self.client.clone())
                .with_discard_partial(self.discard_partial),
            extractor: LinkExtractor::new(),
            visited: self.visited.clone(),
            cancel: self.cancel.clone(),
            events: self.events.clone(),
            max_depth: self.max_depth,
            summary: Mutex::new(CrawlSummary::default()),
            progress_callback: self.progress_callback.clone(),
            result_callback: self.result_callback.clone(),
        });

        let mut worker_handles = Vec::new();
        for worker_id in 0..self.workers {
            let context = context.clone();
            let frontier = frontier.clone();
            worker_handles.push(tokio::spawn(async move {
                run_worker(worker_id, context, frontier).await;
            }));
        }

        for joined in join_all(worker_handles).await {
            if let Err(e) = joined {
                self.events.error(format!("Worker task failed: {}", e));
            }
        }

        let mut summary = context.summary.lock().await.clone();
        summary.cancelled = self.cancel.is_cancelled();
        info!(
            "Crawl finished: {} page(s), {} document(s)",
            summary.pages_processed,
            summary.downloads.len()
        );
        Ok(summary)
    }
}

async fn run_worker(worker_id: usize, context: Arc<CrawlContext>, frontier: Arc<Frontier>) {
    debug!("Worker {} started", worker_id);

    loop {
        if context.cancel.is_cancelled() {
            break;
        }

        let Some((item, _claim)) = frontier.pop().await else {
            if frontier.is_idle() {
                break;
            }
            // Others are still working and may enqueue more pages.
            tokio::time::sleep(Duration::from_millis(10)).await;
            continue;
        };

        if let Some(callback) = &context.progress_callback {
            callback(worker_id, item.url.clone());
        }

        process_page(&context, &frontier, item).await;
    }

    debug!("Worker {} finished", worker_id);
}

/// FetchPage → ExtractLinks → DownloadPhase → RecursePhase for one page.
async fn process_page(context: &CrawlContext, frontier: &Frontier, item: FrontierItem) {
    if context.cancel.is_cancelled() || !context.max_depth.allows(item.depth) {
        return;
    }

    if !context.visited.insert(&item.url).await {
        context
            .events
            .emit(CrawlEvent::AlreadyVisited { url: item.url });
        return;
    }

    context.events.emit(CrawlEvent::Processing {
        url: item.url.clone(),
        depth: item.depth,
    });
    context.summary.lock().await.pages_processed += 1;

    let (page_url, body) = match fetch_page(&context.client, &item.url).await {
        Ok(page) => page,
        Err(e) => {
            context
                .events
                .error(format!("Error fetching the URL {}: {}", item.url, e));
            context.summary.lock().await.pages_failed += 1;
            return;
        }
    };

    let links = match body {
        Some(html) => {
            context
                .extractor
                .extract(
                    &context.client,
                    &html,
                    &page_url,
                    &context.cancel,
                    &context.events,
                )
                .await
        }
        None => BTreeSet::new(),
    };
    debug!("{} link(s) extracted from {}", links.len(), item.url);

    let folder = item.seed.level_folder(item.depth);
    for link in &links {
        if context.cancel.is_cancelled() {
            context.events.emit(CrawlEvent::Stopped);
            return;
        }

        let attempt = if is_document_url(link) {
            context.downloader.stream(link, &folder, &context.cancel).await
        } else {
            context.downloader.fetch(link, &folder).await
        };
        record_download(context, link, attempt).await;
    }

    let next_depth = item.depth + 1;
    if !context.max_depth.allows(next_depth) {
        return;
    }

    for link in &links {
        if context.cancel.is_cancelled() {
            context.events.emit(CrawlEvent::Stopped);
            return;
        }

        // The insert at pop time still decides who processes a page.
        if !is_document_url(link)
            && item.seed.owns(link)
            && !context.visited.contains(link).await
        {
            frontier
                .push(FrontierItem {
                    url: link.clone(),
                    depth: next_depth,
                    seed: item.seed.clone(),
                })
                .await;
        }
    }
}

async fn record_download(
    context: &CrawlContext,
    url: &str,
    attempt: Result<DownloadOutcome>,
) {
    match attempt {
        Ok(DownloadOutcome::Saved(record)) => {
            context.events.emit(CrawlEvent::Downloaded {
                url: record.url.clone(),
                path: record.path.clone(),
                bytes: record.bytes,
            });
            context.summary.lock().await.downloads.push(record.clone());
            if let Some(callback) = &context.result_callback {
                callback(record);
            }
        }
        Ok(DownloadOutcome::NotADocument) => {
            debug!("{} is not a document, nothing saved", url);
        }
        Ok(DownloadOutcome::Cancelled { partial, .. }) => {
            context.events.emit(CrawlEvent::DownloadCancelled {
                url: url.to_string(),
                partial,
            });
        }
        Err(e @ ScanError::Filesystem { .. }) => {
            context
                .events
                .error(format!("Failed to save {}: {}", url, e));
            context.summary.lock().await.download_failures += 1;
        }
        Err(e) => {
            context
                .events
                .error(format!("Failed to download {}: {}", url, e));
            context.summary.lock().await.download_failures += 1;
        }
    }
}

/// GETs a page. Returns the final URL (after redirects) and the body when
/// the response looks like markup; binary responses yield no links.
async fn fetch_page(client: &Client, url: &str) -> Result<(Url, Option<String>)> {
    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(ScanError::HttpStatus {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let final_url = response.url().clone();
    let is_markup = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|ct| {
            let ct = ct.to_ascii_lowercase();
            ct.contains("html") || ct.contains("xml") || ct.starts_with("text/")
        })
        .unwrap_or(true);

    if !is_markup {
        return Ok((final_url, None));
    }

    let body = response.text().await?;
    Ok((final_url, Some(body)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{TimedEvent, event_channel};
    use tempfile::TempDir;
    use tokio::sync::mpsc::UnboundedReceiver;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{method, path},
    };

    async fn mount_html(server: &MockServer, route: &str, html: String) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/html")
                    .set_body_bytes(html.into_bytes()),
            )
            .mount(server)
            .await;
    }

    async fn mount_document(server: &MockServer, route: &str, content_type: &str) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", content_type)
                    .set_body_bytes(format!("content of {}", route).into_bytes()),
            )
            .mount(server)
            .await;
    }

    fn drain(rx: &mut UnboundedReceiver<TimedEvent>) -> Vec<CrawlEvent> {
        let mut events = Vec::new();
        while let Ok(timed) = rx.try_recv() {
            events.push(timed.event);
        }
        events
    }

    fn seed_folder(server: &MockServer, root: &Path) -> std::path::PathBuf {
        let url = Url::parse(&server.uri()).unwrap();
        Seed::new(&url, root).unwrap().folder
    }

    /// Three document anchors at depth 1 end up in level_1, no recursion.
    #[tokio::test]
    async fn test_documents_at_first_level() {
        let server = MockServer::start().await;
        mount_html(
            &server,
            "/",
            r#"<html><body>
                <a href="/files/a.pdf">A</a>
                <a href="/files/b.csv">B</a>
                <a href="/files/c.xlsx">C</a>
            </body></html>"#
                .to_string(),
        )
        .await;
        mount_document(&server, "/files/a.pdf", "application/pdf").await;
        mount_document(&server, "/files/b.csv", "text/csv").await;
        mount_document(
            &server,
            "/files/c.xlsx",
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        )
        .await;

        let dir = TempDir::new().unwrap();
        let crawler = Crawler::new().unwrap().with_max_depth(MaxDepth::Limited(1));
        let summary = crawler.crawl(&[server.uri()], dir.path()).await.unwrap();

        let level_1 = seed_folder(&server, dir.path()).join("level_1");
        for name in ["a.pdf", "b.csv", "c.xlsx"] {
            assert!(level_1.join(name).exists(), "{} missing", name);
        }
        assert_eq!(summary.downloads.len(), 3);
        assert_eq!(summary.pages_processed, 1);
        assert_eq!(crawler.visited().len().await, 1);
    }

    /// seed → intermediate page → document needs depth 2.
    #[tokio::test]
    async fn test_depth_limit_controls_reach() {
        let server = MockServer::start().await;
        mount_html(
            &server,
            "/",
            r#"<html><body><a href="/intermediate">Next</a></body></html>"#.to_string(),
        )
        .await;
        mount_html(
            &server,
            "/intermediate",
            r#"<html><body><a href="/deep/report.pdf">Report</a></body></html>"#.to_string(),
        )
        .await;
        mount_document(&server, "/deep/report.pdf", "application/pdf").await;

        let deep = TempDir::new().unwrap();
        Crawler::new()
            .unwrap()
            .with_max_depth(MaxDepth::Limited(2))
            .crawl(&[server.uri()], deep.path())
            .await
            .unwrap();
        let folder = seed_folder(&server, deep.path());
        assert!(folder.join("level_2").join("report.pdf").exists());

        let shallow = TempDir::new().unwrap();
        let summary = Crawler::new()
            .unwrap()
            .with_max_depth(MaxDepth::Limited(1))
            .crawl(&[server.uri()], shallow.path())
            .await
            .unwrap();
        assert!(summary.downloads.is_empty());
        assert!(!seed_folder(&server, shallow.path()).join("level_2").exists());
    }

    /// The same link in a table and as a bare anchor is fetched once.
    #[tokio::test]
    async fn test_duplicate_links_download_once() {
        let server = MockServer::start().await;
        mount_html(
            &server,
            "/",
            r#"<html><body>
                <a href="/dup.pdf">bare</a>
                <table><tr><td><a href="/dup.pdf">in table</a></td></tr></table>
            </body></html>"#
                .to_string(),
        )
        .await;
        Mock::given(method("GET"))
            .and(path("/dup.pdf"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "application/pdf")
                    .set_body_bytes(b"%PDF".to_vec()),
            )
            .expect(1)
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let summary = Crawler::new()
            .unwrap()
            .with_max_depth(MaxDepth::Limited(1))
            .crawl(&[server.uri()], dir.path())
            .await
            .unwrap();
        assert_eq!(summary.downloads.len(), 1);
    }

    /// Pages linking to each other are visited once each.
    #[tokio::test]
    async fn test_cycles_visit_each_page_once() {
        let server = MockServer::start().await;
        let uri = server.uri();
        mount_html(
            &server,
            "/",
            format!(r#"<html><body><a href="{uri}/a">A</a><a href="{uri}/b">B</a></body></html>"#),
        )
        .await;
        mount_html(
            &server,
            "/a",
            format!(r#"<html><body><a href="{uri}/b">B</a><a href="{uri}/">Home</a></body></html>"#),
        )
        .await;
        mount_html(
            &server,
            "/b",
            format!(r#"<html><body><a href="{uri}/a">A</a><a href="{uri}/">Home</a></body></html>"#),
        )
        .await;

        let dir = TempDir::new().unwrap();
        let crawler = Crawler::new().unwrap().with_workers(3);
        let summary = crawler.crawl(&[uri.clone()], dir.path()).await.unwrap();

        assert_eq!(summary.pages_processed, 3);
        let visited = crawler.visited().snapshot().await;
        assert_eq!(
            visited,
            vec![format!("{uri}/"), format!("{uri}/a"), format!("{uri}/b")]
        );
    }

    /// Links back to pages that were already processed are not queued again.
    #[tokio::test]
    async fn test_visited_links_not_requeued() {
        let server = MockServer::start().await;
        let uri = server.uri();
        mount_html(
            &server,
            "/",
            format!(r#"<html><body><a href="{uri}/a">A</a><a href="{uri}/b">B</a></body></html>"#),
        )
        .await;
        mount_html(
            &server,
            "/a",
            format!(r#"<html><body><a href="{uri}/b">B</a><a href="{uri}/">Home</a></body></html>"#),
        )
        .await;
        mount_html(
            &server,
            "/b",
            format!(r#"<html><body><a href="{uri}/a">A</a><a href="{uri}/">Home</a></body></html>"#),
        )
        .await;

        let (tx, mut rx) = event_channel();
        let dir = TempDir::new().unwrap();
        let summary = Crawler::new()
            .unwrap()
            .with_workers(1)
            .with_events(EventSink::new(tx))
            .crawl(&[uri.clone()], dir.path())
            .await
            .unwrap();
        assert_eq!(summary.pages_processed, 3);

        // One worker handles "/", "/a", "/b" in order. Only the copy of "/b"
        // queued by "/a" before "/b" ran reaches the pop-time check.
        let repeats: Vec<String> = drain(&mut rx)
            .into_iter()
            .filter_map(|e| match e {
                CrawlEvent::AlreadyVisited { url } => Some(url),
                _ => None,
            })
            .collect();
        assert_eq!(repeats, vec![format!("{uri}/b")]);
    }

    /// Off-domain pages are never fetched as pages, off-domain documents are
    /// still downloaded.
    #[tokio::test]
    async fn test_domain_restriction() {
        let site = MockServer::start().await;
        let other = MockServer::start().await;

        mount_html(
            &site,
            "/",
            format!(
                r#"<html><body>
                    <a href="{}/elsewhere">External page</a>
                    <a href="{}/shared.pdf">External doc</a>
                </body></html>"#,
                other.uri(),
                other.uri()
            ),
        )
        .await;

        mount_document(&other, "/shared.pdf", "application/pdf").await;
        // Only the fallback download may touch the external page.
        Mock::given(method("GET"))
            .and(path("/elsewhere"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/html")
                    .set_body_string("<html><body><a href='/never.pdf'>x</a></body></html>"),
            )
            .expect(1)
            .mount(&other)
            .await;

        let dir = TempDir::new().unwrap();
        let crawler = Crawler::new().unwrap().with_max_depth(MaxDepth::Limited(3));
        let summary = crawler.crawl(&[site.uri()], dir.path()).await.unwrap();

        assert_eq!(summary.pages_processed, 1);
        assert_eq!(summary.downloads.len(), 1);
        assert!(
            seed_folder(&site, dir.path())
                .join("level_1")
                .join("shared.pdf")
                .exists()
        );
        assert!(!crawler.visited().contains(&format!("{}/elsewhere", other.uri())).await);
    }

    /// Cancelling after the first of five documents stops the rest.
    #[tokio::test]
    async fn test_cancel_after_first_document() {
        let server = MockServer::start().await;
        let names = ["d1.pdf", "d2.pdf", "d3.pdf", "d4.pdf", "d5.pdf"];
        let anchors: String = names
            .iter()
            .map(|n| format!(r#"<a href="/{n}">{n}</a>"#))
            .collect();
        mount_html(&server, "/", format!("<html><body>{anchors}</body></html>")).await;

        Mock::given(method("GET"))
            .and(path("/d1.pdf"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "application/pdf")
                    .set_body_bytes(b"%PDF-first".to_vec()),
            )
            .expect(1)
            .mount(&server)
            .await;
        for name in &names[1..] {
            Mock::given(method("GET"))
                .and(path(format!("/{name}")))
                .respond_with(ResponseTemplate::new(200))
                .expect(0)
                .mount(&server)
                .await;
        }

        let cancel = CancelSignal::new();
        let trigger = cancel.clone();
        let (tx, mut rx) = event_channel();

        let dir = TempDir::new().unwrap();
        let summary = Crawler::new()
            .unwrap()
            .with_workers(1)
            .with_cancel_signal(cancel)
            .with_events(EventSink::new(tx))
            .with_result_callback(Arc::new(move |_record| trigger.cancel()))
            .crawl(&[server.uri()], dir.path())
            .await
            .unwrap();

        assert!(summary.cancelled);
        assert_eq!(summary.downloads.len(), 1);
        assert!(summary.downloads[0].path.exists());

        let events = drain(&mut rx);
        assert!(events.iter().any(|e| matches!(e, CrawlEvent::Stopped)));
    }

    /// A failing page is logged and does not stop its siblings.
    #[tokio::test]
    async fn test_failing_branch_does_not_abort_siblings() {
        let server = MockServer::start().await;
        mount_html(
            &server,
            "/",
            r#"<html><body><a href="/broken">B</a><a href="/fine">F</a></body></html>"#.to_string(),
        )
        .await;
        Mock::given(method("GET"))
            .and(path("/broken"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        mount_html(
            &server,
            "/fine",
            r#"<html><body><a href="/ok.csv">ok</a></body></html>"#.to_string(),
        )
        .await;
        mount_document(&server, "/ok.csv", "text/csv").await;

        let (tx, mut rx) = event_channel();
        let dir = TempDir::new().unwrap();
        let summary = Crawler::new()
            .unwrap()
            .with_max_depth(MaxDepth::Limited(2))
            .with_events(EventSink::new(tx))
            .crawl(&[server.uri()], dir.path())
            .await
            .unwrap();

        assert_eq!(summary.pages_failed, 1);
        assert_eq!(summary.downloads.len(), 1);
        assert!(
            seed_folder(&server, dir.path())
                .join("level_2")
                .join("ok.csv")
                .exists()
        );

        let events = drain(&mut rx);
        assert!(events.iter().any(|e| e.to_string().contains("Error fetching the URL")));
    }

    /// Depth recorded for every processed page grows by one per hop.
    #[tokio::test]
    async fn test_processing_depths() {
        let server = MockServer::start().await;
        mount_html(
            &server,
            "/",
            r#"<html><body><a href="/one">1</a></body></html>"#.to_string(),
        )
        .await;
        mount_html(
            &server,
            "/one",
            r#"<html><body><a href="/two">2</a></body></html>"#.to_string(),
        )
        .await;
        mount_html(
            &server,
            "/two",
            r#"<html><body><a href="/three">3</a></body></html>"#.to_string(),
        )
        .await;
        Mock::given(method("GET"))
            .and(path("/three"))
            .respond_with(ResponseTemplate::new(200).insert_header("content-type", "text/html"))
            .mount(&server)
            .await;

        let (tx, mut rx) = event_channel();
        let dir = TempDir::new().unwrap();
        Crawler::new()
            .unwrap()
            .with_max_depth(MaxDepth::Limited(3))
            .with_events(EventSink::new(tx))
            .crawl(&[server.uri()], dir.path())
            .await
            .unwrap();

        let depths: Vec<(String, usize)> = drain(&mut rx)
            .into_iter()
            .filter_map(|e| match e {
                CrawlEvent::Processing { url, depth } => Some((url, depth)),
                _ => None,
            })
            .collect();

        let uri = server.uri();
        assert_eq!(
            depths,
            vec![
                (format!("{uri}/"), 1),
                (format!("{uri}/one"), 2),
                (format!("{uri}/two"), 3),
            ]
        );
    }

    #[tokio::test]
    async fn test_invalid_seeds_fail_the_crawl() {
        let dir = TempDir::new().unwrap();
        let result = Crawler::new()
            .unwrap()
            .crawl(&["not a url".to_string()], dir.path())
            .await;
        assert!(matches!(result, Err(ScanError::InvalidUrl(_))));
    }

    #[tokio::test]
    async fn test_headers_are_sent() {
        use wiremock::matchers::header;

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .and(header("user-agent", "docsweep-test"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/html")
                    .set_body_string("<html><body></body></html>"),
            )
            .expect(1)
            .mount(&server)
            .await;

        let mut headers = HeaderMap::new();
        headers.insert(
            reqwest::header::USER_AGENT,
            "docsweep-test".parse().unwrap(),
        );

        let dir = TempDir::new().unwrap();
        let summary = Crawler::with_client_options(headers, None)
            .unwrap()
            .crawl(&[server.uri()], dir.path())
            .await
            .unwrap();
        assert_eq!(summary.pages_failed, 0);
    }
}
