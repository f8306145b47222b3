//! Crawl engine: a fixed pool of workers over the shared frontier.
//!
//! Each worker loops dequeue → fetch → extract → discover → enqueue-new +
//! record until the frontier reports quiescence. Every error inside a
//! single URL's processing is caught at the worker boundary, logged with
//! the URL and cause, and converted into "this page contributes no content
//! and no links". It never terminates the worker, the pool, or the crawl.

use std::net::IpAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use reqwest::Client;
use tracing::{debug, info, instrument, warn};
use url::Url;

use webcorpus_corpus::{CorpusAssembler, MediaStore};
use webcorpus_extract::Extractor;
use webcorpus_shared::{ContentKind, Corpus, CrawlOptions, Result, WebCorpusError};

use crate::discover::discover_links;
use crate::fetcher::{build_http_client, fetch};
use crate::frontier::Frontier;

// ---------------------------------------------------------------------------
// CrawlStats
// ---------------------------------------------------------------------------

/// Summary of a completed crawl run.
#[derive(Debug, Clone)]
pub struct CrawlStats {
    /// Pages fetched and recorded in the corpus.
    pub pages_fetched: usize,
    /// Admitted URLs whose processing failed (fetch, extract, conversion).
    pub pages_failed: usize,
    /// URLs ever admitted to the frontier (bounded by the page budget).
    pub urls_admitted: usize,
    /// Total crawl duration.
    pub duration: Duration,
}

// ---------------------------------------------------------------------------
// Progress reporting
// ---------------------------------------------------------------------------

/// Progress callback for reporting crawl status. Workers run as spawned
/// tasks, so implementations are shared behind an `Arc`.
pub trait ProgressReporter: Send + Sync {
    /// Called after a page is fetched and recorded.
    fn page_fetched(&self, url: &str, recorded: usize, admitted: usize);
    /// Called when an admitted URL fails.
    fn page_failed(&self, url: &str);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn page_fetched(&self, _url: &str, _recorded: usize, _admitted: usize) {}
    fn page_failed(&self, _url: &str) {}
}

// ---------------------------------------------------------------------------
// CrawlEngine
// ---------------------------------------------------------------------------

/// Bounded breadth-first crawler over a single domain.
pub struct CrawlEngine {
    options: CrawlOptions,
    client: Client,
    extractor: Arc<Extractor>,
    media_store: Option<Arc<MediaStore>>,
    /// Allow localhost/private IPs (for integration tests with mock servers).
    allow_localhost: bool,
}

/// Per-crawl state shared by all workers.
struct CrawlShared {
    client: Client,
    frontier: Frontier,
    assembler: CorpusAssembler,
    extractor: Arc<Extractor>,
    media_store: Option<Arc<MediaStore>>,
    seed_host: String,
    allow_localhost: bool,
    failed: AtomicUsize,
}

impl CrawlEngine {
    /// Create an engine with the given options and a default extractor
    /// (no audio transcription).
    pub fn new(options: CrawlOptions) -> Result<Self> {
        let client = build_http_client(options.timeout_secs)?;
        Ok(Self {
            options,
            client,
            extractor: Arc::new(Extractor::new()),
            media_store: None,
            allow_localhost: false,
        })
    }

    /// Replace the content extractor (e.g. one carrying a transcriber).
    pub fn with_extractor(mut self, extractor: Extractor) -> Self {
        self.extractor = Arc::new(extractor);
        self
    }

    /// Persist non-markup payloads into the given media store.
    pub fn with_media_store(mut self, store: MediaStore) -> Self {
        self.media_store = Some(Arc::new(store));
        self
    }

    /// Allow crawling localhost/private IPs (for integration tests).
    #[cfg(test)]
    pub fn allow_localhost(mut self) -> Self {
        self.allow_localhost = true;
        self
    }

    /// Run one bounded breadth-first sweep from `seed`.
    #[instrument(skip_all, fields(seed = %seed))]
    pub async fn crawl(
        &self,
        seed: &Url,
        progress: Arc<dyn ProgressReporter>,
    ) -> Result<(Corpus, CrawlStats)> {
        let start = Instant::now();

        let seed_host = seed
            .host_str()
            .ok_or_else(|| WebCorpusError::validation(format!("seed URL has no host: {seed}")))?
            .to_string();

        if self.options.page_budget == 0 {
            return Err(WebCorpusError::validation("page budget must be positive"));
        }
        if self.options.workers == 0 {
            return Err(WebCorpusError::validation("worker count must be positive"));
        }

        let shared = Arc::new(CrawlShared {
            client: self.client.clone(),
            frontier: Frontier::new(self.options.page_budget),
            assembler: CorpusAssembler::new(seed.clone()),
            extractor: Arc::clone(&self.extractor),
            media_store: self.media_store.clone(),
            seed_host,
            allow_localhost: self.allow_localhost,
            failed: AtomicUsize::new(0),
        });

        shared.frontier.try_enqueue(seed);

        info!(
            budget = self.options.page_budget,
            workers = self.options.workers,
            "starting crawl"
        );

        let mut handles = Vec::with_capacity(self.options.workers);
        for worker in 0..self.options.workers {
            let shared = Arc::clone(&shared);
            let progress = Arc::clone(&progress);
            handles.push(tokio::spawn(async move {
                worker_loop(worker, shared, progress).await;
            }));
        }

        for handle in handles {
            if let Err(e) = handle.await {
                warn!(error = %e, "worker task panicked");
            }
        }

        let corpus = shared.assembler.finalize();
        let stats = CrawlStats {
            pages_fetched: corpus.pages.len(),
            pages_failed: shared.failed.load(Ordering::Relaxed),
            urls_admitted: shared.frontier.admitted(),
            duration: start.elapsed(),
        };

        info!(
            pages_fetched = stats.pages_fetched,
            pages_failed = stats.pages_failed,
            urls_admitted = stats.urls_admitted,
            duration_ms = stats.duration.as_millis(),
            "crawl completed"
        );

        Ok((corpus, stats))
    }
}

// ---------------------------------------------------------------------------
// Worker loop
// ---------------------------------------------------------------------------

/// One worker: pull from the frontier until it reports quiescence.
async fn worker_loop(worker: usize, shared: Arc<CrawlShared>, progress: Arc<dyn ProgressReporter>) {
    while let Some(url) = shared.frontier.next().await {
        match process_url(&shared, &url).await {
            Ok(()) => {
                progress.page_fetched(
                    url.as_str(),
                    shared.assembler.len(),
                    shared.frontier.admitted(),
                );
            }
            Err(e) => {
                // A single failed page never aborts the crawl: log, count,
                // move on to the next URL.
                warn!(%url, error = %e, "page failed");
                shared.failed.fetch_add(1, Ordering::Relaxed);
                progress.page_failed(url.as_str());
            }
        }
        shared.frontier.complete();
    }
    debug!(worker, "worker idle, frontier quiescent");
}

/// Process one admitted URL: fetch, extract, discover, record.
///
/// Any error here consumes the URL's single processing attempt; there is
/// no re-admission.
async fn process_url(shared: &CrawlShared, url: &Url) -> Result<()> {
    if !shared.allow_localhost && is_ssrf_target(url) {
        return Err(WebCorpusError::fetch(
            url.as_str(),
            "blocked: private or non-http target",
        ));
    }

    let resource = fetch(&shared.client, url).await?;

    // Only markup payloads ever yield links.
    let links = if resource.kind == ContentKind::Markup {
        discover_links(&resource.bytes, url, &shared.seed_host)
    } else {
        Vec::new()
    };

    // Side effect only: a failed media write never fails the page.
    if resource.kind != ContentKind::Markup {
        if let Some(store) = &shared.media_store {
            if let Err(e) = store.save(url, &resource.bytes) {
                warn!(%url, error = %e, "failed to persist media file");
            }
        }
    }

    let record = shared
        .extractor
        .extract(
            url,
            resource.kind,
            resource.media_type.as_deref(),
            &resource.bytes,
        )
        .await?;
    shared.assembler.record(record);

    for link in &links {
        shared.frontier.try_enqueue(link);
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// SSRF protection
// ---------------------------------------------------------------------------

/// Check if a URL targets a potentially dangerous resource.
fn is_ssrf_target(url: &Url) -> bool {
    match url.scheme() {
        "http" | "https" => {}
        _ => return true,
    }

    if let Some(host) = url.host_str() {
        if let Ok(ip) = host.parse::<IpAddr>() {
            return is_private_ip(&ip);
        }
        if host == "localhost" || host.ends_with(".local") || host.ends_with(".internal") {
            return true;
        }
    }

    false
}

/// Check if an IP is in a private/reserved range.
fn is_private_ip(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => {
            v4.is_loopback()
                || v4.is_private()
                || v4.is_link_local()
                || v4.is_broadcast()
                || v4.is_unspecified()
        }
        IpAddr::V6(v6) => v6.is_loopback() || v6.is_unspecified(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn options(budget: usize, workers: usize) -> CrawlOptions {
        CrawlOptions {
            page_budget: budget,
            workers,
            timeout_secs: 5,
        }
    }

    async fn mount_html(server: &MockServer, route: &str, body: &str) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw(body.as_bytes().to_vec(), "text/html"),
            )
            .mount(server)
            .await;
    }

    async fn run_crawl(
        server: &MockServer,
        budget: usize,
        workers: usize,
    ) -> (Corpus, CrawlStats) {
        let engine = CrawlEngine::new(options(budget, workers))
            .unwrap()
            .allow_localhost();
        let seed = Url::parse(&server.uri()).unwrap();
        engine.crawl(&seed, Arc::new(SilentProgress)).await.unwrap()
    }

    #[tokio::test]
    async fn budget_caps_admission_and_no_page_repeats() {
        // Seed A links to B and C; B links back to A and on to D.
        // Budget 3, pool of 2: D must never be admitted.
        let server = MockServer::start().await;
        mount_html(
            &server,
            "/",
            r#"<html><body><h1>A</h1><a href="/b">B</a><a href="/c">C</a></body></html>"#,
        )
        .await;
        mount_html(
            &server,
            "/b",
            r#"<html><body><h1>B</h1><a href="/">A</a><a href="/d">D</a></body></html>"#,
        )
        .await;
        mount_html(&server, "/c", "<html><body><h1>C</h1></body></html>").await;
        mount_html(&server, "/d", "<html><body><h1>D</h1></body></html>").await;

        let (corpus, stats) = run_crawl(&server, 3, 2).await;

        assert_eq!(stats.urls_admitted, 3);
        assert_eq!(corpus.pages.len(), 3);
        assert_eq!(stats.pages_failed, 0);

        let mut paths: Vec<_> = corpus.pages.iter().map(|p| p.url.path()).collect();
        paths.sort();
        assert_eq!(paths, vec!["/", "/b", "/c"]);
    }

    #[tokio::test]
    async fn failed_page_never_aborts_the_crawl() {
        let server = MockServer::start().await;
        mount_html(
            &server,
            "/",
            r#"<a href="/broken">broken</a><a href="/fine">fine</a>"#,
        )
        .await;
        Mock::given(method("GET"))
            .and(path("/broken"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        mount_html(&server, "/fine", "<p>still here</p>").await;

        let (corpus, stats) = run_crawl(&server, 10, 3).await;

        assert_eq!(stats.pages_failed, 1);
        assert_eq!(corpus.pages.len(), 2);
        assert_eq!(stats.urls_admitted, 3);
        assert!(corpus.pages.iter().all(|p| p.url.path() != "/broken"));
    }

    #[tokio::test]
    async fn offsite_links_are_never_admitted() {
        let server = MockServer::start().await;
        mount_html(
            &server,
            "/",
            r#"<a href="https://elsewhere.example/x">off</a><a href="/here">on</a>"#,
        )
        .await;
        mount_html(&server, "/here", "<p>local</p>").await;

        let (corpus, stats) = run_crawl(&server, 10, 2).await;

        assert_eq!(stats.urls_admitted, 2);
        assert_eq!(corpus.pages.len(), 2);
    }

    #[tokio::test]
    async fn non_markup_payloads_record_without_link_expansion() {
        let server = MockServer::start().await;
        mount_html(&server, "/", r#"<a href="/data.csv">data</a>"#).await;
        Mock::given(method("GET"))
            .and(path("/data.csv"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw(b"x,y\n1,2\n".to_vec(), "text/csv"),
            )
            .mount(&server)
            .await;

        let (corpus, stats) = run_crawl(&server, 10, 2).await;

        assert_eq!(stats.urls_admitted, 2);
        let csv_page = corpus
            .pages
            .iter()
            .find(|p| p.url.path() == "/data.csv")
            .expect("csv page recorded");
        assert_eq!(csv_page.kind, ContentKind::Tabular);
        assert_eq!(csv_page.text, "x | y\n1 | 2");
    }

    #[tokio::test]
    async fn media_store_receives_binary_side_files() {
        let server = MockServer::start().await;
        mount_html(&server, "/", r#"<a href="/report.pdf">report</a>"#).await;
        Mock::given(method("GET"))
            .and(path("/report.pdf"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "application/pdf")
                    .set_body_bytes(b"%PDF-1.4 not really".to_vec()),
            )
            .mount(&server)
            .await;

        let media_dir =
            std::env::temp_dir().join(format!("webcorpus-engine-test-{}", std::process::id()));
        let engine = CrawlEngine::new(options(10, 2))
            .unwrap()
            .with_media_store(MediaStore::new(&media_dir).unwrap())
            .allow_localhost();

        let seed = Url::parse(&server.uri()).unwrap();
        let (corpus, _stats) = engine.crawl(&seed, Arc::new(SilentProgress)).await.unwrap();

        assert_eq!(corpus.pages.len(), 2);
        let saved: Vec<_> = std::fs::read_dir(&media_dir).unwrap().collect();
        assert_eq!(saved.len(), 1);

        let _ = std::fs::remove_dir_all(&media_dir);
    }

    #[tokio::test]
    async fn seed_without_host_is_rejected() {
        let engine = CrawlEngine::new(options(10, 2)).unwrap();
        let seed = Url::parse("data:text/plain,hello").unwrap();
        let err = engine
            .crawl(&seed, Arc::new(SilentProgress))
            .await
            .unwrap_err();
        assert!(matches!(err, WebCorpusError::Validation { .. }));
    }

    #[test]
    fn ssrf_guard_blocks_private_targets() {
        assert!(is_ssrf_target(&Url::parse("http://192.168.1.1/admin").unwrap()));
        assert!(is_ssrf_target(&Url::parse("http://127.0.0.1:8080/").unwrap()));
        assert!(is_ssrf_target(&Url::parse("http://localhost:3000/api").unwrap()));
        assert!(is_ssrf_target(&Url::parse("file:///etc/passwd").unwrap()));
        assert!(!is_ssrf_target(&Url::parse("https://docs.example.com/page").unwrap()));
    }
}
