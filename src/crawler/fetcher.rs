//! HTTP fetcher implementation
//!
//! This module handles page fetches for the crawler:
//! - Building the shared HTTP client with a proper user agent string
//! - GET requests returning the full page body as text
//! - Mapping transport failures and non-success statuses to `HarvestError`

use crate::config::UserAgentConfig;
use crate::HarvestError;
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// Builds an HTTP client with proper configuration
///
/// No overall request timeout is set on the client itself: page fetches set
/// their own per-request timeout and downloads are bounded by the pipeline.
///
/// # Example
///
/// ```no_run
/// use doc_harvest::config::UserAgentConfig;
/// use doc_harvest::crawler::build_http_client;
///
/// let client = build_http_client(&UserAgentConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &UserAgentConfig) -> Result<Client, reqwest::Error> {
    // Format: CrawlerName/Version
    let user_agent = format!("{}/{}", config.crawler_name, config.crawler_version);

    Client::builder()
        .user_agent(user_agent)
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a page and returns its body as text
///
/// # Errors
///
/// * `HarvestError::Fetch` - the request could not be sent or the body could not be read
/// * `HarvestError::HttpStatus` - the server answered with a non-success status
pub async fn fetch_page(client: &Client, url: &Url, timeout: Duration) -> Result<String, HarvestError> {
    tracing::debug!("Fetching page {}", url);

    let response = client
        .get(url.clone())
        .timeout(timeout)
        .send()
        .await
        .map_err(|source| HarvestError::Fetch {
            url: url.to_string(),
            source,
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(HarvestError::HttpStatus {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    response.text().await.map_err(|source| HarvestError::Fetch {
        url: url.to_string(),
        source,
    })
}
