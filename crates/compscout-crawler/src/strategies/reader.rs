//! Public reader proxy (r.jina.ai) that renders any URL as markdown.

use std::collections::BTreeMap;

use async_trait::async_trait;
use reqwest::{header, Client, StatusCode, Url};

use super::{build_client, parse_base_url, validate_content, CrawlResult, FetchStrategy};
use crate::error::CrawlerError;
use crate::platform::PlatformInfo;

const DEFAULT_BASE_URL: &str = "https://r.jina.ai/";
const STRATEGY: &str = "jina";

/// Needs no credential, so it is always available.
pub struct ReaderStrategy {
    client: Client,
    base_url: Url,
}

impl ReaderStrategy {
    /// # Errors
    ///
    /// Returns [`CrawlerError::Http`] if the HTTP client cannot be built.
    pub fn new(timeout_secs: u64) -> Result<Self, CrawlerError> {
        Self::with_base_url(timeout_secs, DEFAULT_BASE_URL)
    }

    /// # Errors
    ///
    /// Returns [`CrawlerError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn with_base_url(timeout_secs: u64, base_url: &str) -> Result<Self, CrawlerError> {
        Ok(Self {
            client: build_client(timeout_secs)?,
            base_url: parse_base_url(base_url)?,
        })
    }
}

/// First `# ` heading line, trimmed.
pub(crate) fn first_heading(markdown: &str) -> Option<&str> {
    markdown
        .lines()
        .map(str::trim)
        .find_map(|line| line.strip_prefix("# "))
}

#[async_trait]
impl FetchStrategy for ReaderStrategy {
    fn name(&self) -> &'static str {
        STRATEGY
    }

    async fn fetch(&self, url: &str, platform: &PlatformInfo) -> Result<CrawlResult, CrawlerError> {
        // The target URL is appended verbatim, not joined.
        let reader_url = format!("{}{url}", self.base_url);

        let response = self
            .client
            .get(&reader_url)
            .header(header::ACCEPT, "text/markdown")
            .header(header::USER_AGENT, platform.user_agent)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(CrawlerError::UnexpectedStatus {
                strategy: STRATEGY,
                status: status.as_u16(),
                body,
            });
        }

        let markdown = response.text().await?;
        validate_content(STRATEGY, &markdown, false)?;
        let title = first_heading(&markdown).unwrap_or_default().to_string();

        Ok(CrawlResult {
            success: true,
            markdown,
            title,
            url: url.to_string(),
            platform: platform.kind,
            method: STRATEGY,
            metadata: BTreeMap::from([("api".to_string(), "jina-reader".to_string())]),
        })
    }
}
