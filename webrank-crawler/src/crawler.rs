use crate::error::{CrawlError, Result};
use crate::policy::LinkPolicy;
use crate::result::PageResult;
use reqwest::Client;
use scraper::{Html, Selector};
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use url::Url;

pub type ProgressCallback = Arc<dyn Fn(usize, String) + Send + Sync>;

/// Seed-set crawler: fetches pages with a pool of async workers and reports
/// each page's in-scope out-links. Fetch failures are logged and skipped, so
/// a flaky host shrinks the result set instead of aborting the crawl.
pub struct Crawler {
    client: Client,
    visited: Arc<Mutex<HashSet<String>>>,
    results: Arc<Mutex<Vec<PageResult>>>,
    policy: LinkPolicy,
    max_depth: usize,
    max_pages: usize,
    delay: Option<Duration>,
    progress_callback: Option<ProgressCallback>,
}

impl Crawler {
    pub fn new() -> Self {
        Self::with_timeout(15)
    }

    pub fn with_timeout(timeout_secs: u64) -> Self {
        let client = Client::builder()
            .user_agent(concat!("webrank/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(timeout_secs.div_ceil(2)))
            .pool_max_idle_per_host(50)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(60))
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            visited: Arc::new(Mutex::new(HashSet::new())),
            results: Arc::new(Mutex::new(Vec::new())),
            policy: LinkPolicy::default(),
            max_depth: 1,
            max_pages: 500,
            delay: None,
            progress_callback: None,
        }
    }

    pub fn with_policy(mut self, policy: LinkPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Fetch depth bound: pages queued at `depth >= max_depth` are never
    /// fetched, though edges pointing at them are still reported.
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Hard cap on the number of pages fetched across the whole crawl.
    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages;
        self
    }

    /// Courtesy pause before each fetch.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    pub async fn crawl(&self, seeds: &[String], workers: usize) -> Result<Vec<PageResult>> {
        info!(
            "Starting crawl of {} seed(s) with {} workers",
            seeds.len(),
            workers
        );

        for seed in seeds {
            Url::parse(seed).map_err(|e| CrawlError::InvalidUrl(format!("{seed}: {e}")))?;
        }

        // Mark seeds visited and spread them across the worker queues
        let worker_queues: Arc<Vec<Mutex<VecDeque<(String, usize)>>>> =
            Arc::new((0..workers).map(|_| Mutex::new(VecDeque::new())).collect());
        {
            let mut visited = self.visited.lock().await;
            for (i, seed) in seeds.iter().enumerate() {
                if visited.insert(seed.clone()) {
                    let mut queue = worker_queues[i % workers].lock().await;
                    queue.push_back((seed.clone(), 0));
                }
            }
        }

        let fetched = Arc::new(AtomicUsize::new(0));
        let mut worker_handles = Vec::new();

        for worker_id in 0..workers {
            let client = self.client.clone();
            let policy = self.policy.clone();
            let progress_cb = self.progress_callback.clone();
            let max_depth = self.max_depth;
            let max_pages = self.max_pages;
            let delay = self.delay;
            let visited = self.visited.clone();
            let results = self.results.clone();
            let fetched = fetched.clone();
            let worker_queues_clone = worker_queues.clone();

            let handle = tokio::spawn(async move {
                debug!("Worker {} started", worker_id);
                let mut empty_iterations = 0;
                const MAX_EMPTY_ITERATIONS: usize = 10;

                loop {
                    let work_item = {
                        let mut queue = worker_queues_clone[worker_id].lock().await;
                        queue.pop_front()
                    };

                    let (url, depth) = if let Some(item) = work_item {
                        empty_iterations = 0;
                        item
                    } else {
                        if Self::all_queues_empty(&worker_queues_clone).await {
                            empty_iterations += 1;
                            if empty_iterations >= MAX_EMPTY_ITERATIONS {
                                debug!("Worker {} exiting", worker_id);
                                break;
                            }
                        } else {
                            empty_iterations = 0;
                        }
                        tokio::time::sleep(Duration::from_millis(10)).await;
                        continue;
                    };

                    if depth >= max_depth {
                        continue;
                    }
                    if fetched.fetch_add(1, Ordering::SeqCst) >= max_pages {
                        debug!("Worker {} hit the page cap, dropping {}", worker_id, url);
                        continue;
                    }

                    if let Some(ref callback) = progress_cb {
                        callback(worker_id, url.clone());
                    }
                    if let Some(delay) = delay {
                        tokio::time::sleep(delay).await;
                    }

                    match Self::fetch_and_parse_static(&client, &url, &policy).await {
                        Ok((page_result, new_urls)) => {
                            {
                                let mut results_lock = results.lock().await;
                                results_lock.push(page_result);
                            }

                            // Distribute fresh URLs round-robin across all queues
                            let mut target_worker = 0;
                            for new_url in new_urls {
                                let should_queue = {
                                    let mut visited_lock = visited.lock().await;
                                    visited_lock.insert(new_url.clone())
                                };
                                if should_queue {
                                    let mut queue =
                                        worker_queues_clone[target_worker].lock().await;
                                    queue.push_back((new_url, depth + 1));
                                    drop(queue);
                                    target_worker = (target_worker + 1) % worker_queues_clone.len();
                                }
                            }
                        }
                        Err(e) => {
                            warn!("Crawl error for {}: {}", url, e);
                        }
                    }
                }

                debug!("Worker {} finished", worker_id);
            });

            worker_handles.push(handle);
        }

        for handle in worker_handles {
            handle
                .await
                .map_err(|e| CrawlError::Other(format!("Worker task failed: {e}")))?;
        }

        let results = self.results.lock().await;
        info!("Crawl complete. Fetched {} pages", results.len());
        Ok(results.clone())
    }

    async fn all_queues_empty(worker_queues: &Arc<Vec<Mutex<VecDeque<(String, usize)>>>>) -> bool {
        for queue in worker_queues.iter() {
            if !queue.lock().await.is_empty() {
                return false;
            }
        }
        true
    }

    async fn fetch_and_parse_static(
        client: &Client,
        url: &str,
        policy: &LinkPolicy,
    ) -> Result<(PageResult, Vec<String>)> {
        debug!("Fetching {}", url);

        let start = Instant::now();
        let response = client.get(url).send().await?;
        let response_time = start.elapsed();

        let status_code = response.status().as_u16();
        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());
        let content_length = response.content_length();

        let body = response.text().await?;

        let mut result = PageResult::new(url.to_string());
        result.status_code = status_code;
        result.content_type = content_type.clone();
        result.content_length = content_length;
        result.response_time = response_time;

        let is_html = content_type
            .as_ref()
            .map(|ct| ct.contains("text/html"))
            .unwrap_or(false);

        let mut new_urls = Vec::new();
        if is_html {
            let links = Self::extract_links_static(&body, url, policy)?;
            result.links_found = links.clone();
            new_urls = links;
        }

        Ok((result, new_urls))
    }

    /// Pull `a[href]` targets out of a page, canonicalize them against the
    /// page URL, and keep the ones the policy accepts, deduplicated in
    /// document order.
    fn extract_links_static(html: &str, current_url: &str, policy: &LinkPolicy) -> Result<Vec<String>> {
        let page_url = Url::parse(current_url)
            .map_err(|e| CrawlError::InvalidUrl(format!("{current_url}: {e}")))?;

        let document = Html::parse_document(html);
        let link_selector = Selector::parse("a[href]").unwrap();

        let mut links = Vec::new();
        let mut seen = HashSet::new();

        for element in document.select(&link_selector) {
            if let Some(href) = element.value().attr("href")
                && let Some(resolved) = Self::resolve_url_static(&page_url, href)
                && policy.accepts(&resolved, &page_url)
            {
                let link = resolved.to_string();
                if seen.insert(link.clone()) {
                    links.push(link);
                }
            }
        }

        Ok(links)
    }

    fn resolve_url_static(base: &Url, href: &str) -> Option<Url> {
        // Skip empty, javascript:, mailto:, tel:, and fragment-only hrefs
        if href.is_empty()
            || href.starts_with("javascript:")
            || href.starts_with("mailto:")
            || href.starts_with("tel:")
            || href.starts_with('#')
        {
            return None;
        }

        let mut resolved = base.join(href).ok()?;
        resolved.set_fragment(None);
        Some(resolved)
    }
}

impl Default for Crawler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mount_html(server: &MockServer, at: &str, body: String) {
        Mock::given(method("GET"))
            .and(path(at))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/html")
                    .set_body_bytes(body.into_bytes()),
            )
            .mount(server)
            .await;
    }

    /// Depth 1 fetches only the seeds, but still reports edges to every
    /// discovered (unfetched) target.
    #[tokio::test]
    async fn seed_only_crawl_reports_unfetched_targets() {
        let server = MockServer::start().await;
        let root_html = format!(
            r#"<html><body>
                <a href="{0}/page1">Page 1</a>
                <a href="{0}/page2">Page 2</a>
            </body></html>"#,
            server.uri()
        );
        mount_html(&server, "/", root_html).await;

        let crawler = Crawler::new().with_max_depth(1);
        let seed = format!("{}/", server.uri());
        let results = crawler.crawl(&[seed.clone()], 2).await.unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].url, seed);
        assert_eq!(
            results[0].links_found,
            vec![
                format!("{}/page1", server.uri()),
                format!("{}/page2", server.uri())
            ]
        );
    }

    #[tokio::test]
    async fn fragment_variants_collapse_to_one_link() {
        let server = MockServer::start().await;
        let root_html = format!(
            r##"<html><body>
                <a href="{0}/article#intro">Intro</a>
                <a href="{0}/article#details">Details</a>
                <a href="#top">Top</a>
            </body></html>"##,
            server.uri()
        );
        mount_html(&server, "/", root_html).await;

        let crawler = Crawler::new().with_max_depth(1);
        let results = crawler
            .crawl(&[format!("{}/", server.uri())], 1)
            .await
            .unwrap();

        assert_eq!(
            results[0].links_found,
            vec![format!("{}/article", server.uri())]
        );
    }

    #[tokio::test]
    async fn policy_filters_namespace_and_offsite_links() {
        let server = MockServer::start().await;
        let root_html = r#"<html><body>
                <a href="/wiki/Article">Good</a>
                <a href="/wiki/File:Logo.svg">Namespace</a>
                <a href="/w/index.php">Outside prefix</a>
                <a href="https://other.test/wiki/Article">Offsite</a>
            </body></html>"#
            .to_string();
        mount_html(&server, "/wiki/Start", root_html).await;

        let crawler = Crawler::new()
            .with_max_depth(1)
            .with_policy(LinkPolicy::wiki());
        let results = crawler
            .crawl(&[format!("{}/wiki/Start", server.uri())], 1)
            .await
            .unwrap();

        assert_eq!(
            results[0].links_found,
            vec![format!("{}/wiki/Article", server.uri())]
        );
    }

    #[tokio::test]
    async fn deeper_crawl_follows_links_to_the_depth_bound() {
        let server = MockServer::start().await;
        mount_html(
            &server,
            "/",
            format!(r#"<html><body><a href="{}/a">A</a></body></html>"#, server.uri()),
        )
        .await;
        mount_html(
            &server,
            "/a",
            format!(r#"<html><body><a href="{}/b">B</a></body></html>"#, server.uri()),
        )
        .await;
        mount_html(&server, "/b", "<html><body>end</body></html>".to_string()).await;

        let crawler = Crawler::new().with_max_depth(2);
        let results = crawler
            .crawl(&[format!("{}/", server.uri())], 2)
            .await
            .unwrap();

        // root (depth 0) and /a (depth 1) fetched; /b queued at depth 2, skipped
        let mut fetched: Vec<&str> = results.iter().map(|r| r.url.as_str()).collect();
        fetched.sort_unstable();
        assert_eq!(results.len(), 2);
        assert!(fetched[1].ends_with("/a"));

        // the edge a -> b is still visible to the graph builder
        let a = results.iter().find(|r| r.url.ends_with("/a")).unwrap();
        assert_eq!(a.links_found, vec![format!("{}/b", server.uri())]);
    }

    #[tokio::test]
    async fn page_cap_bounds_the_fetch_count() {
        let server = MockServer::start().await;
        let mut root_html = String::from("<html><body>");
        for i in 1..=10 {
            root_html.push_str(&format!(r#"<a href="{}/p{}">p{}</a>"#, server.uri(), i, i));
        }
        root_html.push_str("</body></html>");
        mount_html(&server, "/", root_html).await;
        for i in 1..=10 {
            mount_html(
                &server,
                &format!("/p{i}"),
                "<html><body>leaf</body></html>".to_string(),
            )
            .await;
        }

        let crawler = Crawler::new().with_max_depth(2).with_max_pages(3);
        let results = crawler
            .crawl(&[format!("{}/", server.uri())], 4)
            .await
            .unwrap();

        assert!(results.len() <= 3, "fetched {}", results.len());
    }

    #[tokio::test]
    async fn non_html_responses_yield_no_links() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "application/json")
                    .set_body_bytes(br#"{"a": "<a href=\"/x\">not a link</a>"}"#.to_vec()),
            )
            .mount(&server)
            .await;

        let crawler = Crawler::new().with_max_depth(1);
        let results = crawler
            .crawl(&[format!("{}/data", server.uri())], 1)
            .await
            .unwrap();

        assert_eq!(results[0].status_code, 200);
        assert!(results[0].links_found.is_empty());
    }

    #[tokio::test]
    async fn invalid_seed_is_rejected_up_front() {
        let crawler = Crawler::new();
        let err = crawler.crawl(&["not a url".to_string()], 1).await;
        assert!(matches!(err, Err(CrawlError::InvalidUrl(_))));
    }
}
