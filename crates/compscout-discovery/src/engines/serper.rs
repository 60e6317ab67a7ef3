//! Serper (Google results proxy) adapter.

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;

use super::{build_client, join_endpoint, parse_base_url, rank, send_json, SearchEngine};
use crate::error::DiscoveryError;
use crate::types::SearchResult;

const DEFAULT_BASE_URL: &str = "https://google.serper.dev/";
const ENGINE: &str = "serper";

#[derive(Debug, Deserialize)]
struct SerperResponse {
    organic: Option<Vec<SerperOrganic>>,
}

#[derive(Debug, Deserialize)]
struct SerperOrganic {
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: String,
    #[serde(default)]
    snippet: String,
}

/// Searches via `POST /search`, localised to the Chinese market.
pub struct SerperEngine {
    client: Client,
    api_key: String,
    base_url: Url,
}

impl SerperEngine {
    /// # Errors
    ///
    /// Returns [`DiscoveryError::Http`] if the HTTP client cannot be built.
    pub fn new(api_key: &str, timeout_secs: u64) -> Result<Self, DiscoveryError> {
        Self::with_base_url(api_key, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates an engine pointed at a custom base URL (for wiremock tests).
    ///
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
impl SearchEngine for SerperEngine {
    fn name(&self) -> &'static str {
        ENGINE
    }

    async fn search(&self, query: &str, count: usize) -> Result<Vec<SearchResult>, DiscoveryError> {
        if self.api_key.is_empty() {
            return Err(DiscoveryError::MissingCredential { engine: ENGINE });
        }

        let url = join_endpoint(&self.base_url, "search")?;
        let body = serde_json::json!({
            "q": query,
            "num": count,
            "gl": "cn",
            "hl": "zh-cn",
        });
        let request = self
            .client
            .post(url)
            .header("X-API-KEY", &self.api_key)
            .json(&body);

        let parsed: SerperResponse = send_json(ENGINE, request, query).await?;
        let organic = parsed.organic.ok_or(DiscoveryError::MalformedResponse {
            engine: ENGINE,
            field: "organic",
        })?;

        Ok(rank(
            organic
                .into_iter()
                .take(count)
                .map(|o| (o.title, o.link, o.snippet)),
        ))
    }
}
