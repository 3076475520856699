//! Bundle content transport.
//!
//! Fetches raw bundle bytes from a source URL. `file://` sources are read
//! synchronously and fully buffered (used for deterministic fixtures);
//! remote sources go through one pooled HTTP client shared across all
//! bundle refreshes. No retry happens here -- a failed fetch is retried by
//! the next scheduler tick.

use reqwest::Client as HttpClient;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;
use trustsync_core::RefreshOutcome;
use url::Url;

use crate::config::TransportConfig;

/// Download failure, classified per the refresh outcome taxonomy.
#[derive(Error, Debug)]
pub enum FetchError {
    /// Source unreachable or malformed (bad URL, unknown scheme, missing
    /// file, connection failure, non-2xx status)
    #[error("bundle source not found: {0}")]
    NotFound(String),

    /// Transport-level failure after the request was issued
    #[error("bundle download timed out: {0}")]
    Timeout(String),
}

impl FetchError {
    /// The outcome code persisted on the bundle for this failure.
    #[must_use]
    pub const fn outcome(&self) -> RefreshOutcome {
        match self {
            Self::NotFound(_) => RefreshOutcome::NotFound,
            Self::Timeout(_) => RefreshOutcome::DownloadTimeout,
        }
    }
}

/// Fetches raw bundle content over `file://` and `http(s)://`.
#[derive(Clone)]
pub struct BundleTransport {
    inner: Arc<TransportInner>,
}

struct TransportInner {
    http: HttpClient,
}

impl BundleTransport {
    /// Build a transport with a pooled HTTP client configured from `config`.
    pub fn new(config: &TransportConfig) -> trustsync_core::Result<Self> {
        let http = HttpClient::builder()
            .connect_timeout(config.connect_timeout())
            .timeout(config.read_timeout())
            .pool_idle_timeout(config.pool_idle())
            .danger_accept_invalid_certs(config.allow_insecure_tls)
            .user_agent(concat!("trustsync/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| trustsync_core::SyncError::Http(e.to_string()))?;

        Ok(Self {
            inner: Arc::new(TransportInner { http }),
        })
    }

    /// Fetch the raw content behind `raw_url`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::NotFound`] for malformed/unreachable sources and
    /// [`FetchError::Timeout`] for transport failures after the request went out.
    pub async fn fetch(&self, raw_url: &str) -> Result<Vec<u8>, FetchError> {
        let url = Url::parse(raw_url).map_err(|e| FetchError::NotFound(e.to_string()))?;

        match url.scheme() {
            "file" => self.fetch_file(&url).await,
            "http" | "https" => self.fetch_remote(&url).await,
            other => Err(FetchError::NotFound(format!("unsupported scheme: {other}"))),
        }
    }

    /// Read a local file source fully into memory.
    async fn fetch_file(&self, url: &Url) -> Result<Vec<u8>, FetchError> {
        let path = url
            .to_file_path()
            .map_err(|()| FetchError::NotFound(format!("not a file path: {url}")))?;
        debug!(path = %path.display(), "reading local bundle");

        tokio::fs::read(&path)
            .await
            .map_err(|e| FetchError::NotFound(format!("{}: {e}", path.display())))
    }

    /// Fetch a remote source through the pooled client.
    async fn fetch_remote(&self, url: &Url) -> Result<Vec<u8>, FetchError> {
        debug!(url = %url, "downloading bundle");

        let response = self
            .inner
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(|e| classify_request_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::NotFound(format!("{url}: HTTP {status}")));
        }

        // Body read failures happen after the request was issued.
        response
            .bytes()
            .await
            .map(|b| b.to_vec())
            .map_err(|e| FetchError::Timeout(e.to_string()))
    }
}

/// Map a reqwest error onto the download failure taxonomy.
///
/// Connection and request-construction failures mean the source was never
/// reached; anything after that is a transport timeout.
fn classify_request_error(e: &reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout(e.to_string())
    } else if e.is_connect() || e.is_builder() || e.is_request() {
        FetchError::NotFound(e.to_string())
    } else {
        FetchError::Timeout(e.to_string())
    }
}
