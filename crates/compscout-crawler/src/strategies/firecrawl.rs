//! Hosted scraping API (Firecrawl) returning markdown.

use std::collections::BTreeMap;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;

use super::{build_client, parse_base_url, validate_content, CrawlResult, FetchStrategy};
use crate::error::CrawlerError;
use crate::platform::PlatformInfo;

const DEFAULT_BASE_URL: &str = "https://api.firecrawl.dev/";
const STRATEGY: &str = "firecrawl";

#[derive(Debug, Deserialize)]
struct ScrapeResponse {
    #[serde(default)]
    success: bool,
    data: Option<ScrapeData>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ScrapeData {
    markdown: Option<String>,
    metadata: Option<serde_json::Value>,
}

pub struct FirecrawlStrategy {
    client: Client,
    api_key: String,
    endpoint: Url,
}

impl FirecrawlStrategy {
    /// # Errors
    ///
    /// Returns [`CrawlerError::Http`] if the HTTP client cannot be built.
    pub fn new(api_key: &str, timeout_secs: u64) -> Result<Self, CrawlerError> {
        Self::with_base_url(api_key, timeout_secs, DEFAULT_BASE_URL)
    }

    /// # Errors
    ///
    /// Returns [`CrawlerError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn with_base_url(
        api_key: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, CrawlerError> {
        let base = parse_base_url(base_url)?;
        let endpoint = base
            .join("v1/scrape")
            .map_err(|e| CrawlerError::InvalidBaseUrl {
                base_url: base_url.to_string(),
                reason: e.to_string(),
            })?;
        Ok(Self {
            client: build_client(timeout_secs)?,
            api_key: api_key.to_owned(),
            endpoint,
        })
    }
}

#[async_trait]
impl FetchStrategy for FirecrawlStrategy {
    fn name(&self) -> &'static str {
        STRATEGY
    }

    fn is_available(&self) -> bool {
        !self.api_key.is_empty()
    }

    async fn fetch(&self, url: &str, platform: &PlatformInfo) -> Result<CrawlResult, CrawlerError> {
        if self.api_key.is_empty() {
            return Err(CrawlerError::MissingCredential { strategy: STRATEGY });
        }

        let body = serde_json::json!({
            "url": url,
            "formats": ["markdown"],
        });
        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(CrawlerError::UnexpectedStatus {
                strategy: STRATEGY,
                status: status.as_u16(),
                body: text,
            });
        }

        let parsed: ScrapeResponse =
            serde_json::from_str(&text).map_err(|e| CrawlerError::Deserialize {
                context: format!("firecrawl scrape of {url}"),
                source: e,
            })?;

        if !parsed.success {
            return Err(CrawlerError::Unsuccessful {
                strategy: STRATEGY,
                reason: parsed
                    .error
                    .unwrap_or_else(|| "success flag was false".to_string()),
            });
        }

        let data = parsed.data.ok_or_else(|| CrawlerError::Unsuccessful {
            strategy: STRATEGY,
            reason: "response has no data".to_string(),
        })?;
        let markdown = data
            .markdown
            .filter(|m| !m.is_empty())
            .ok_or_else(|| CrawlerError::Unsuccessful {
                strategy: STRATEGY,
                reason: "response has no markdown".to_string(),
            })?;
        let title = data
            .metadata
            .as_ref()
            .and_then(|m| m.get("title"))
            .and_then(serde_json::Value::as_str)
            .unwrap_or_default()
            .to_string();

        validate_content(STRATEGY, &markdown, true)?;

        Ok(CrawlResult {
            success: true,
            markdown,
            title,
            url: url.to_string(),
            platform: platform.kind,
            method: STRATEGY,
            metadata: BTreeMap::from([("api".to_string(), "firecrawl-v2".to_string())]),
        })
    }
}
