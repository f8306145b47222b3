//! Single-URL retrieval with timeout and content-kind classification.
//!
//! Stateless per call: one GET, no retries. Every network, timeout, and
//! non-2xx condition folds into [`WebCorpusError::Fetch`]; nothing raises
//! past this boundary. Retry policy, if ever added, belongs to the engine.

use std::time::Duration;

use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use tracing::debug;
use url::Url;

use webcorpus_shared::{ContentKind, Result, WebCorpusError};

/// User-Agent string for crawl requests.
const USER_AGENT: &str = concat!("webcorpus/", env!("CARGO_PKG_VERSION"));

/// One fetched resource: raw payload plus the media type the server
/// declared and the content kind classified from it.
#[derive(Debug, Clone)]
pub struct FetchedResource {
    /// The requested URL.
    pub url: Url,
    /// Classification derived from the `Content-Type` header.
    pub kind: ContentKind,
    /// The raw `Content-Type` header value, if any.
    pub media_type: Option<String>,
    /// Raw response body.
    pub bytes: Vec<u8>,
}

/// Build the shared HTTP client used by all workers.
pub fn build_http_client(timeout_secs: u64) -> Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .redirect(reqwest::redirect::Policy::limited(5))
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| WebCorpusError::config(format!("failed to build HTTP client: {e}")))
}

/// Fetch one URL.
///
/// Classifies the payload from the declared media type; unknown or missing
/// media types map to [`ContentKind::Binary`].
pub async fn fetch(client: &Client, url: &Url) -> Result<FetchedResource> {
    let response = client
        .get(url.as_str())
        .send()
        .await
        .map_err(|e| WebCorpusError::fetch(url.as_str(), e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        return Err(WebCorpusError::fetch(url.as_str(), format!("HTTP {status}")));
    }

    let media_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let kind = ContentKind::from_media_type(media_type.as_deref());

    let bytes = response
        .bytes()
        .await
        .map_err(|e| WebCorpusError::fetch(url.as_str(), format!("body read failed: {e}")))?;

    debug!(%url, %kind, size = bytes.len(), "fetched");

    Ok(FetchedResource {
        url: url.clone(),
        kind,
        media_type,
        bytes: bytes.to_vec(),
    })
}
