use crate::config::AppConfig;
use crate::parser::parse_last_page_number;
use anyhow::{Context, Result};
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use std::time::Duration;
use tracing::{debug, warn};

/// Downloads listing pages for a given year.
#[derive(Debug, Clone)]
pub struct PageFetcher {
    client: Client,
    config: AppConfig,
}

impl PageFetcher {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        for (k, v) in &config.fetch.headers {
            let name = HeaderName::from_bytes(k.as_bytes())
                .with_context(|| format!("invalid header name {k}"))?;
            let value = HeaderValue::from_str(v)
                .with_context(|| format!("invalid header value for {k}"))?;
            headers.insert(name, value);
        }

        if let Some(user_agent) = &config.fetch.user_agent {
            headers.insert(USER_AGENT, HeaderValue::from_str(user_agent)?);
        }

        let mut builder = Client::builder()
            .timeout(Duration::from_secs(config.fetch.timeout_secs))
            .default_headers(headers);
        if !config.fetch.use_system_proxy {
            builder = builder.no_proxy();
        }
        let client = builder.build().context("failed to build reqwest client")?;

        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    pub fn fetch_page(&self, year: i32, page: u32) -> Result<Vec<u8>> {
        let url = self.config.page_url(year, page);
        let bytes = self
            .get_with_retries(&url)
            .with_context(|| format!("failed to download page {page}"))?;

        debug!(year, page, bytes = bytes.len(), url = %url, "fetched page");
        Ok(bytes)
    }

    /// Total number of listing pages for `year`, read from the first page.
    pub fn fetch_page_count(&self, year: i32) -> Result<u32> {
        let url = self.config.page_url(year, 1);
        let body = self.fetch_page(year, 1)?;
        let html = String::from_utf8_lossy(&body);
        parse_last_page_number(&html, &self.config.source.last_page_selector, &url)
            .with_context(|| format!("failed to read page count from {url}"))
    }

    /// GETs `url`, retrying transport errors and non-success statuses up to
    /// `fetch.retry_attempts` times in total.
    fn get_with_retries(&self, url: &str) -> Result<Vec<u8>> {
        let attempts = self.config.fetch.retry_attempts.max(1);
        let backoff = Duration::from_millis(self.config.fetch.retry_backoff_ms);

        let mut attempt = 1;
        loop {
            let outcome = self
                .client
                .get(url)
                .send()
                .and_then(|resp| resp.error_for_status())
                .and_then(|resp| resp.bytes());

            match outcome {
                Ok(bytes) => return Ok(bytes.to_vec()),
                Err(err) if attempt >= attempts => {
                    return Err(err).with_context(|| {
                        format!("request to {url} failed after {attempt} attempts")
                    });
                }
                Err(err) => {
                    warn!(%url, attempt, attempts, error = %err, "request failed; retrying");
                }
            }

            attempt += 1;
            std::thread::sleep(backoff);
        }
    }
}
