// src/wiki/client.rs
use std::time::Duration;
use reqwest::{header, StatusCode, Url};
use scraper::Html;
use crate::utils::error::FetchError;

/// Page listing every Best Picture nominee.
pub const DEFAULT_SOURCE_URL: &str = "https://en.wikipedia.org/wiki/Academy_Award_for_Best_Picture";
/// Base for resolving site-relative article links.
pub const DEFAULT_BASE_URL: &str = "https://en.wikipedia.org";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";
// Be respectful to the servers: one page per second.
pub const DEFAULT_REQUEST_DELAY_MS: u64 = 1000;

/// Fetches wiki pages one at a time with a fixed pause before each request.
pub struct WikiClient {
    http: reqwest::Client,
    delay: Duration,
}

impl WikiClient {
    pub fn new(user_agent: &str, delay: Duration) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self { http, delay })
    }

    /// Downloads a page and returns its body.
    pub async fn fetch_page(&self, url: &str) -> Result<String, FetchError> {
        let url = Url::parse(url).map_err(|e| FetchError::InvalidUrl(url.to_string(), e.to_string()))?;

        // --- Basic Rate Limiting ---
        tokio::time::sleep(self.delay).await;

        tracing::debug!("GET {}", url);
        let response = self.http.get(url.clone())
            .header(header::ACCEPT, "text/html,application/xhtml+xml,*/*")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::error!("HTTP error status: {} for URL: {}", status, url);
            return Err(status_error(status, url.as_str()));
        }

        let body = response.text().await?;
        tracing::debug!("Downloaded {} bytes from {}", body.len(), url);
        Ok(body)
    }

    /// Downloads and parses a page.
    pub async fn fetch_document(&self, url: &str) -> Result<Html, FetchError> {
        let body = self.fetch_page(url).await?;
        Ok(Html::parse_document(&body))
    }
}

fn status_error(status: StatusCode, url: &str) -> FetchError {
    match status {
        StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS => {
            tracing::warn!("Received {} - check User-Agent and request delay.", status);
            FetchError::RateLimited(url.to_string())
        }
        StatusCode::NOT_FOUND => FetchError::PageNotFound(url.to_string()),
        _ => FetchError::Http(status, url.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_map_to_errors() {
        let url = "https://en.wikipedia.org/wiki/X";
        assert!(matches!(status_error(StatusCode::TOO_MANY_REQUESTS, url), FetchError::RateLimited(_)));
        assert!(matches!(status_error(StatusCode::NOT_FOUND, url), FetchError::PageNotFound(_)));
        assert!(matches!(
            status_error(StatusCode::BAD_GATEWAY, url),
            FetchError::Http(StatusCode::BAD_GATEWAY, _)
        ));
    }

    #[test]
    fn invalid_url_is_rejected_before_sending() {
        let client = WikiClient::new(DEFAULT_USER_AGENT, Duration::ZERO).unwrap();
        let result = tokio_test::block_on(client.fetch_page("not a url"));
        assert!(matches!(result, Err(FetchError::InvalidUrl(..))));
    }
}
