//! Bing Web Search v7 adapter.

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;

use super::{build_client, join_endpoint, parse_base_url, rank, send_json, SearchEngine};
use crate::error::DiscoveryError;
use crate::types::SearchResult;

const DEFAULT_BASE_URL: &str = "https://api.bing.microsoft.com/";
const ENGINE: &str = "bing";

#[derive(Debug, Deserialize)]
struct BingResponse {
    #[serde(rename = "webPages")]
    web_pages: Option<BingWebPages>,
}

#[derive(Debug, Deserialize)]
struct BingWebPages {
    value: Option<Vec<BingPage>>,
}

#[derive(Debug, Deserialize)]
struct BingPage {
    #[serde(default)]
    name: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    snippet: String,
}

pub struct BingEngine {
    client: Client,
    api_key: String,
    base_url: Url,
}

impl BingEngine {
    /// # Errors
    ///
    /// Returns [`DiscoveryError::Http`] if the HTTP client cannot be built.
    pub fn new(api_key: &str, timeout_secs: u64) -> Result<Self, DiscoveryError> {
        Self::with_base_url(api_key, timeout_secs, DEFAULT_BASE_URL)
    }

    /// # Errors
    ///
    /// Returns [`DiscoveryError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn with_base_url(
        api_key: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, DiscoveryError> {
        Ok(Self {
            client: build_client(timeout_secs)?,
            api_key: api_key.to_owned(),
            base_url: parse_base_url(base_url)?,
        })
    }
}

#[async_trait]
impl SearchEngine for BingEngine {
    fn name(&self) -> &'static str {
        ENGINE
    }

    async fn search(&self, query: &str, count: usize) -> Result<Vec<SearchResult>, DiscoveryError> {
        if self.api_key.is_empty() {
            return Err(DiscoveryError::MissingCredential { engine: ENGINE });
        }

        let mut url = join_endpoint(&self.base_url, "v7.0/search")?;
        url.query_pairs_mut()
            .append_pair("q", query)
            .append_pair("count", &count.to_string())
            .append_pair("mkt", "zh-CN");

        let request = self
            .client
            .get(url)
            .header("Ocp-Apim-Subscription-Key", &self.api_key);

        let parsed: BingResponse = send_json(ENGINE, request, query).await?;
        let pages = parsed
            .web_pages
            .and_then(|w| w.value)
            .ok_or(DiscoveryError::MalformedResponse {
                engine: ENGINE,
                field: "webPages.value",
            })?;

        Ok(rank(pages.into_iter().map(|p| (p.name, p.url, p.snippet))))
    }
}
