use crate::types::{DigestError, FetchConfig, Result};
use reqwest::{Client, Response};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// HTTP layer shared by the feed reader and the PDF extractor. Failures come
/// back as plain messages; each caller wraps them in its own error kind.
pub struct Fetcher {
    client: Client,
    config: FetchConfig,
}

impl Fetcher {
    pub fn new(config: FetchConfig) -> Result<Self> {
        let redirect = if config.follow_redirects {
            reqwest::redirect::Policy::limited(config.max_redirects)
        } else {
            reqwest::redirect::Policy::none()
        };

        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_seconds))
            .gzip(true)
            .deflate(true)
            .brotli(true)
            .redirect(redirect)
            .build()
            .map_err(|e| DigestError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    /// Fetch a feed document as text. Non-success statuses and oversized
    /// bodies are errors.
    pub async fn fetch_text(&self, url: &str) -> std::result::Result<String, String> {
        let start_time = Instant::now();
        debug!("Fetching feed: {}", url);

        let response = self.get_checked(url).await?;

        if let Some(content_length) = response.content_length() {
            let size_mb = content_length as usize / (1024 * 1024);
            if size_mb > self.config.max_feed_size_mb {
                return Err(format!("Feed too large: {}MB", size_mb));
            }
        }

        let content = response
            .text()
            .await
            .map_err(|e| format!("Failed to read body of {}: {}", url, e))?;

        info!(
            "Successfully fetched feed: {} ({} bytes, {} ms)",
            url,
            content.len(),
            start_time.elapsed().as_millis()
        );
        Ok(content)
    }

    /// Fetch a binary document such as a PDF.
    pub async fn fetch_bytes(&self, url: &str) -> std::result::Result<Vec<u8>, String> {
        debug!("Fetching document: {}", url);

        let response = self.get_checked(url).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| format!("Failed to read body of {}: {}", url, e))?;

        debug!("Fetched {} bytes from {}", bytes.len(), url);
        Ok(bytes.to_vec())
    }

    async fn get_checked(&self, url: &str) -> std::result::Result<Response, String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| format!("Request to {} failed: {}", url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!(
                "HTTP {}: {} ({})",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown"),
                url
            ));
        }

        Ok(response)
    }
}
