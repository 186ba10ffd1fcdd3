//! Source fetcher: retrieves pages and binary assets over HTTP
//!
//! One `Fetcher` wraps a shared `reqwest::Client` and is cloned freely. No
//! retries happen here; callers decide what a failure means. A successful
//! status does not guarantee the expected page content, so callers verify
//! the content marker independently (see [`has_content_marker`]).

use reqwest::Client;

use crate::error::{PrintError, PrintResult};
use crate::utils::constants::{CHROME_USER_AGENT, CONTENT_MARKER_SELECTOR};
use crate::utils::dom;

/// HTTP client for document and asset retrieval
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
}

impl Default for Fetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Fetcher {
    #[must_use]
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    /// Fetch one page and return its HTML body.
    ///
    /// Fails with [`PrintError::Fetch`] on network errors and non-2xx
    /// statuses.
    pub async fn fetch_document(&self, url: &str) -> PrintResult<String> {
        log::debug!("Fetching page {url}");
        let response = self
            .client
            .get(url)
            .header("User-Agent", CHROME_USER_AGENT)
            .header("Accept", "text/html,application/xhtml+xml,*/*;q=0.8")
            .send()
            .await
            .map_err(|e| PrintError::fetch(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PrintError::fetch(url, format!("status {status}")));
        }

        response.text().await.map_err(|e| PrintError::fetch(url, e))
    }

    /// Fetch a stylesheet or other text asset
    pub async fn fetch_text(&self, url: &str) -> PrintResult<String> {
        self.fetch_document(url).await
    }

    /// Fetch a binary asset, returning its content type and bytes
    pub async fn fetch_bytes(&self, url: &str) -> PrintResult<(String, Vec<u8>)> {
        log::debug!("Fetching asset {url}");
        let response = self
            .client
            .get(url)
            .header("User-Agent", CHROME_USER_AGENT)
            .header("Accept", "image/avif,image/webp,image/apng,image/*,*/*;q=0.8")
            .send()
            .await
            .map_err(|e| PrintError::fetch(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PrintError::fetch(url, format!("status {status}")));
        }

        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("image/jpeg")
            .to_string();

        let bytes = response
            .bytes()
            .await
            .map_err(|e| PrintError::fetch(url, e))?;
        Ok((content_type, bytes.to_vec()))
    }
}

/// Whether a page carries the expected article content marker
#[must_use]
pub fn has_content_marker(html: &str) -> bool {
    let doc = dom::parse_document(html);
    dom::select_first(&doc, CONTENT_MARKER_SELECTOR).is_some()
}
