//! Content repository: fetches and caches per-language bundles.
//!
//! The repository is generic over a [`ContentSource`], the transport that
//! turns a resource key into bytes. Bundles are parsed once, wrapped in an
//! `Arc` and cached for the lifetime of the repository; later lookups hand
//! back the same instance without touching the source.

use crate::content::ContentBundle;
use crate::error::ContentError;
use crate::i18n::Language;
use crate::lock;
use crate::metrics::ContentMetrics;
use crate::retry::{with_retry_if, RetryConfig};
use anyhow::Context;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, info};

/// Raw answer from a content source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl FetchResponse {
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    pub fn status(status: u16) -> Self {
        Self {
            status,
            body: Vec::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Rate limiting and server errors may clear up on their own.
    fn is_transient(&self) -> bool {
        self.status == 429 || self.status >= 500
    }
}

/// Transport that fetches a content resource by key.
///
/// An `Err` means no response was obtained at all; a response with a
/// non-success status is still `Ok`.
pub trait ContentSource {
    fn fetch(&self, key: &str) -> impl Future<Output = anyhow::Result<FetchResponse>> + Send;
}

impl<T: ContentSource + Sync> ContentSource for Arc<T> {
    fn fetch(&self, key: &str) -> impl Future<Output = anyhow::Result<FetchResponse>> + Send {
        (**self).fetch(key)
    }
}

// ==================== HTTP Source ====================

/// Fetches `{base_url}/{key}` over HTTP, bypassing intermediary caches.
#[derive(Debug, Clone)]
pub struct HttpContentSource {
    client: reqwest::Client,
    base_url: String,
    retry: RetryConfig,
}

impl HttpContentSource {
    pub fn new(base_url: &str, timeout: Duration, retry: RetryConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            retry,
        })
    }

    pub fn url_for(&self, key: &str) -> String {
        format!("{}/{}", self.base_url, key)
    }
}

/// Outcome of a single HTTP attempt that may deserve another try.
enum AttemptError {
    Transport(anyhow::Error),
    Status(FetchResponse),
}

impl fmt::Display for AttemptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttemptError::Transport(e) => write!(f, "{:#}", e),
            AttemptError::Status(response) => write!(f, "HTTP {}", response.status),
        }
    }
}

impl ContentSource for HttpContentSource {
    async fn fetch(&self, key: &str) -> anyhow::Result<FetchResponse> {
        let url = self.url_for(key);

        let result = with_retry_if(
            &self.retry,
            &format!("Fetch {}", key),
            || async {
                let response = self
                    .client
                    .get(&url)
                    .header(reqwest::header::CACHE_CONTROL, "no-cache")
                    .send()
                    .await
                    .with_context(|| format!("Failed to send request to {}", url))
                    .map_err(AttemptError::Transport)?;

                let status = response.status().as_u16();
                let body = response
                    .bytes()
                    .await
                    .with_context(|| format!("Failed to read body from {}", url))
                    .map_err(AttemptError::Transport)?;

                let fetched = FetchResponse {
                    status,
                    body: body.to_vec(),
                };
                if fetched.is_transient() {
                    return Err(AttemptError::Status(fetched));
                }
                Ok(fetched)
            },
            |_| true,
        )
        .await;

        match result {
            Ok(response) | Err(AttemptError::Status(response)) => Ok(response),
            Err(AttemptError::Transport(e)) => Err(e),
        }
    }
}

// ==================== Directory Source ====================

/// Reads `{root}/{key}` from the local filesystem.
///
/// Missing files answer 404 and unreadable ones 403, so a static site
/// directory behaves like the web server that would normally serve it.
#[derive(Debug, Clone)]
pub struct DirectoryContentSource {
    root: PathBuf,
}

impl DirectoryContentSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ContentSource for DirectoryContentSource {
    async fn fetch(&self, key: &str) -> anyhow::Result<FetchResponse> {
        let path = self.root.join(key);
        match tokio::fs::read(&path).await {
            Ok(body) => Ok(FetchResponse::ok(body)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(FetchResponse::status(404)),
            Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
                Ok(FetchResponse::status(403))
            }
            Err(e) => Err(e).with_context(|| format!("Failed to read {}", path.display())),
        }
    }
}

// ==================== Repository ====================

/// Fetches and caches content bundles keyed by language.
pub struct ContentRepository<S> {
    source: S,
    cache: Mutex<HashMap<Language, Arc<ContentBundle>>>,
    metrics: ContentMetrics,
}

impl<S: ContentSource> ContentRepository<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            cache: Mutex::new(HashMap::new()),
            metrics: ContentMetrics::new(),
        }
    }

    /// Resolve a raw code and load its bundle.
    pub async fn get_by_code(&self, code: &str) -> Result<Arc<ContentBundle>, ContentError> {
        let lang = Language::from_code(code)?;
        self.get(lang).await
    }

    /// Load the bundle for `lang`, from cache when possible.
    pub async fn get(&self, lang: Language) -> Result<Arc<ContentBundle>, ContentError> {
        if let Some(bundle) = self.cached(lang) {
            self.metrics.record_cache_hit();
            debug!("Content cache hit for {}", lang);
            return Ok(bundle);
        }
        self.metrics.record_cache_miss();

        let key = lang.resource_key();
        debug!("Fetching content resource {} for {}", key, lang);
        self.metrics.record_fetch();

        let response = match self.source.fetch(key).await {
            Ok(response) => response,
            Err(e) => {
                self.metrics.record_fetch_failure();
                return Err(ContentError::Transport {
                    lang: lang.code().to_string(),
                    message: format!("{:#}", e),
                });
            }
        };

        if !response.is_success() {
            self.metrics.record_fetch_failure();
            return Err(ContentError::FetchFailed {
                lang: lang.code().to_string(),
                status: response.status,
            });
        }

        let bundle = ContentBundle::from_slice(&response.body).map_err(|source| {
            self.metrics.record_parse_failure();
            ContentError::ParseFailed {
                lang: lang.code().to_string(),
                source,
            }
        })?;

        // A concurrent lookup may have cached this language while we were
        // suspended; keep the first instance so every caller shares it.
        let mut cache = lock(&self.cache);
        let cached = cache.entry(lang).or_insert_with(|| Arc::new(bundle));
        info!("Cached content for {} ({} bytes)", lang, response.body.len());
        Ok(Arc::clone(cached))
    }

    /// The cached bundle for `lang`, without fetching.
    pub fn cached(&self, lang: Language) -> Option<Arc<ContentBundle>> {
        lock(&self.cache).get(&lang).cloned()
    }

    pub fn cached_count(&self) -> usize {
        lock(&self.cache).len()
    }

    pub fn metrics(&self) -> &ContentMetrics {
        &self.metrics
    }

    pub fn source(&self) -> &S {
        &self.source
    }
}

impl<S> fmt::Debug for ContentRepository<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cached: Vec<_> = lock(&self.cache).keys().map(|l| l.code()).collect();
        f.debug_struct("ContentRepository")
            .field("cached", &cached)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use wiremock::{
        matchers::{header, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    /// In-memory source answering from a fixed table and counting fetches.
    #[derive(Default)]
    struct TableSource {
        responses: HashMap<&'static str, FetchResponse>,
        fetches: AtomicUsize,
    }

    impl TableSource {
        fn with(mut self, key: &'static str, response: FetchResponse) -> Self {
            self.responses.insert(key, response);
            self
        }

        fn fetches(&self) -> usize {
            self.fetches.load(Ordering::SeqCst)
        }
    }

    fn json(body: &str) -> FetchResponse {
        FetchResponse::ok(body.as_bytes())
    }

    impl ContentSource for TableSource {
        async fn fetch(&self, key: &str) -> anyhow::Result<FetchResponse> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            self.responses
                .get(key)
                .cloned()
                .ok_or_else(|| anyhow::anyhow!("connection refused"))
        }
    }

    // ==================== Cache Tests ====================

    #[tokio::test]
    async fn test_get_caches_and_returns_same_instance() {
        let source = TableSource::default().with(
            "content.en.json",
            json(r#"{"meta": {"title": "Hello"}}"#),
        );
        let repo = ContentRepository::new(source);

        let first = repo.get(Language::ENGLISH).await.expect("first load");
        let second = repo.get(Language::ENGLISH).await.expect("second load");

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(repo.source().fetches(), 1);
        assert_eq!(repo.metrics().cache_hits(), 1);
        assert_eq!(repo.metrics().cache_misses(), 1);
        assert_eq!(repo.cached_count(), 1);
    }

    #[tokio::test]
    async fn test_languages_are_cached_independently() {
        let source = TableSource::default()
            .with("content.en.json", json("{}"))
            .with("content.ja.json", json("{}"));
        let repo = ContentRepository::new(source);

        let en = repo.get(Language::ENGLISH).await.unwrap();
        let ja = repo.get(Language::JAPANESE).await.unwrap();

        assert!(!Arc::ptr_eq(&en, &ja));
        assert_eq!(repo.cached_count(), 2);
    }

    // ==================== Error Tests ====================

    #[tokio::test]
    async fn test_get_by_code_rejects_unsupported_language() {
        let repo = ContentRepository::new(TableSource::default());

        let err = repo.get_by_code("fr").await.unwrap_err();

        assert!(matches!(err, ContentError::UnsupportedLanguage { .. }));
        assert_eq!(repo.source().fetches(), 0);
    }

    #[tokio::test]
    async fn test_non_success_status_is_fetch_failed() {
        let source = TableSource::default().with("content.ko.json", FetchResponse::status(404));
        let repo = ContentRepository::new(source);

        let err = repo.get(Language::KOREAN).await.unwrap_err();

        assert!(matches!(err, ContentError::FetchFailed { status: 404, .. }));
        assert!(repo.cached(Language::KOREAN).is_none());
        assert_eq!(repo.metrics().fetch_failures(), 1);
    }

    #[tokio::test]
    async fn test_failed_fetch_is_not_cached() {
        let source = TableSource::default().with("content.ko.json", FetchResponse::status(500));
        let repo = ContentRepository::new(source);

        assert!(repo.get(Language::KOREAN).await.is_err());
        assert!(repo.get(Language::KOREAN).await.is_err());
        assert_eq!(repo.source().fetches(), 2);
    }

    #[tokio::test]
    async fn test_malformed_payload_is_parse_failed() {
        let source = TableSource::default().with("content.ja.json", json("{oops"));
        let repo = ContentRepository::new(source);

        let err = repo.get(Language::JAPANESE).await.unwrap_err();

        assert!(matches!(err, ContentError::ParseFailed { .. }));
        assert_eq!(repo.metrics().parse_failures(), 1);
    }

    #[tokio::test]
    async fn test_transport_error() {
        let repo = ContentRepository::new(TableSource::default());

        let err = repo.get(Language::CHINESE).await.unwrap_err();

        match err {
            ContentError::Transport { lang, message } => {
                assert_eq!(lang, "zh");
                assert!(message.contains("connection refused"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_transient_status_classification() {
        assert!(FetchResponse::status(429).is_transient());
        assert!(FetchResponse::status(500).is_transient());
        assert!(FetchResponse::status(503).is_transient());
        assert!(!FetchResponse::status(404).is_transient());
        assert!(!FetchResponse::status(403).is_transient());
        assert!(!FetchResponse::ok("{}").is_transient());
    }

    // ==================== Directory Source Tests ====================

    #[tokio::test]
    async fn test_directory_source_reads_and_maps_missing_to_404() {
        let dir = tempfile::TempDir::new().expect("temp dir");
        std::fs::write(dir.path().join("content.en.json"), r#"{"footer": {}}"#).unwrap();
        let source = DirectoryContentSource::new(dir.path());

        let found = source.fetch("content.en.json").await.expect("read");
        assert!(found.is_success());
        assert_eq!(found.body, br#"{"footer": {}}"#.to_vec());

        let missing = source.fetch("content.ko.json").await.expect("read");
        assert_eq!(missing.status, 404);
    }

    // ==================== HTTP Source Tests ====================

    fn http_source(uri: &str) -> HttpContentSource {
        let retry = RetryConfig::new(3, Duration::from_millis(5));
        HttpContentSource::new(uri, Duration::from_secs(5), retry).expect("client")
    }

    #[tokio::test]
    async fn test_http_source_fetches_with_no_cache_header() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/content.ja.json"))
            .and(header("cache-control", "no-cache"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let source = http_source(&format!("{}/data/", mock_server.uri()));
        let response = source.fetch("content.ja.json").await.expect("fetch");

        assert!(response.is_success());
        assert_eq!(response.body, b"{}".to_vec());
    }

    #[tokio::test]
    async fn test_http_source_retries_server_errors() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/content.en.json"))
            .respond_with(ResponseTemplate::new(503))
            .expect(3)
            .mount(&mock_server)
            .await;

        let source = http_source(&mock_server.uri());
        let response = source.fetch("content.en.json").await.expect("fetch");

        assert_eq!(response.status, 503);
    }

    #[tokio::test]
    async fn test_http_source_does_not_retry_not_found() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/content.en.json"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&mock_server)
            .await;

        let source = http_source(&mock_server.uri());
        let response = source.fetch("content.en.json").await.expect("fetch");

        assert_eq!(response.status, 404);
    }
}
