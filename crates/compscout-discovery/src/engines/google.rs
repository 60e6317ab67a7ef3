//! Google Custom Search JSON API adapter.

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;

use super::{build_client, join_endpoint, parse_base_url, rank, send_json, SearchEngine};
use crate::error::DiscoveryError;
use crate::types::SearchResult;

const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/";
const ENGINE: &str = "google";
/// The Custom Search API rejects `num` outside `1..=10`.
const MAX_PAGE_SIZE: usize = 10;

#[derive(Debug, Deserialize)]
struct GoogleResponse {
    items: Option<Vec<GoogleItem>>,
}

#[derive(Debug, Deserialize)]
struct GoogleItem {
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: String,
    #[serde(default)]
    snippet: String,
}

pub struct GoogleEngine {
    client: Client,
    api_key: String,
    engine_id: String,
    base_url: Url,
}

impl GoogleEngine {
    /// # Errors
    ///
    /// Returns [`DiscoveryError::Http`] if the HTTP client cannot be built.
    pub fn new(api_key: &str, engine_id: &str, timeout_secs: u64) -> Result<Self, DiscoveryError> {
        Self::with_base_url(api_key, engine_id, timeout_secs, DEFAULT_BASE_URL)
    }

    /// # Errors
    ///
    /// Returns [`DiscoveryError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn with_base_url(
        api_key: &str,
        engine_id: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, DiscoveryError> {
        Ok(Self {
            client: build_client(timeout_secs)?,
            api_key: api_key.to_owned(),
            engine_id: engine_id.to_owned(),
            base_url: parse_base_url(base_url)?,
        })
    }
}

#[async_trait]
impl SearchEngine for GoogleEngine {
    fn name(&self) -> &'static str {
        ENGINE
    }

    async fn search(&self, query: &str, count: usize) -> Result<Vec<SearchResult>, DiscoveryError> {
        if self.api_key.is_empty() || self.engine_id.is_empty() {
            return Err(DiscoveryError::MissingCredential { engine: ENGINE });
        }

        let mut url = join_endpoint(&self.base_url, "customsearch/v1")?;
        url.query_pairs_mut()
            .append_pair("key", &self.api_key)
            .append_pair("cx", &self.engine_id)
            .append_pair("q", query)
            .append_pair("num", &count.clamp(1, MAX_PAGE_SIZE).to_string());

        let parsed: GoogleResponse = send_json(ENGINE, self.client.get(url), query).await?;
        let items = parsed.items.ok_or(DiscoveryError::MalformedResponse {
            engine: ENGINE,
            field: "items",
        })?;

        Ok(rank(items.into_iter().map(|i| (i.title, i.link, i.snippet))))
    }
}
