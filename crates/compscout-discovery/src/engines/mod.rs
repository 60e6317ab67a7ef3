//! Search engine adapters.
//!
//! Each backend implements [`SearchEngine`]; the manager only ever sees the
//! trait, so engines are swapped at composition time without touching the
//! fan-out logic. A failure in one engine stays local to that engine.

mod bing;
mod google;
mod serper;

pub use bing::BingEngine;
pub use google::GoogleEngine;
pub use serper::SerperEngine;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;

use compscout_core::AppConfig;

use crate::error::DiscoveryError;
use crate::types::SearchResult;

/// A web search backend returning ranked results for a textual query.
#[async_trait]
pub trait SearchEngine: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    /// Runs `query` and returns at most `count` results ranked from 1.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError::MissingCredential`] when the engine has no
    /// API key, and transport/format errors when the backend misbehaves.
    async fn search(&self, query: &str, count: usize) -> Result<Vec<SearchResult>, DiscoveryError>;
}

/// Builds the configured engines in fixed order: Serper, Google, Bing.
///
/// Engines whose credentials are absent are left out entirely.
///
/// # Errors
///
/// Returns [`DiscoveryError::Http`] if an HTTP client cannot be constructed.
pub fn engines_from_config(
    config: &AppConfig,
) -> Result<Vec<Arc<dyn SearchEngine>>, DiscoveryError> {
    let timeout = config.request_timeout_secs;
    let mut engines: Vec<Arc<dyn SearchEngine>> = Vec::new();

    if let Some(key) = &config.serper_api_key {
        engines.push(Arc::new(SerperEngine::new(key, timeout)?));
    }
    if let Some((key, cx)) = config.google_credentials() {
        engines.push(Arc::new(GoogleEngine::new(key, cx, timeout)?));
    }
    if let Some(key) = &config.bing_api_key {
        engines.push(Arc::new(BingEngine::new(key, timeout)?));
    }

    Ok(engines)
}

pub(crate) fn build_client(timeout_secs: u64) -> Result<Client, DiscoveryError> {
    Ok(Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .build()?)
}

/// Normalises `base_url` to end with exactly one slash so relative joins
/// append instead of replacing the last path segment.
pub(crate) fn parse_base_url(base_url: &str) -> Result<Url, DiscoveryError> {
    let normalised = format!("{}/", base_url.trim_end_matches('/'));
    Url::parse(&normalised).map_err(|e| DiscoveryError::InvalidBaseUrl {
        base_url: base_url.to_string(),
        reason: e.to_string(),
    })
}

pub(crate) fn join_endpoint(base: &Url, path: &str) -> Result<Url, DiscoveryError> {
    base.join(path).map_err(|e| DiscoveryError::InvalidBaseUrl {
        base_url: base.to_string(),
        reason: e.to_string(),
    })
}

/// Sends `request`, rejects non-2xx statuses, and decodes the JSON body.
pub(crate) async fn send_json<T: DeserializeOwned>(
    engine: &'static str,
    request: reqwest::RequestBuilder,
    query: &str,
) -> Result<T, DiscoveryError> {
    let response = request.send().await?;
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        return Err(DiscoveryError::UnexpectedStatus {
            engine,
            status: status.as_u16(),
            body,
        });
    }

    serde_json::from_str::<T>(&body).map_err(|e| DiscoveryError::Deserialize {
        context: format!("{engine} response for \"{query}\""),
        source: e,
    })
}

/// Converts provider items into ranked results, numbering from 1 in
/// response order.
pub(crate) fn rank<I>(items: I) -> Vec<SearchResult>
where
    I: IntoIterator<Item = (String, String, String)>,
{
    items
        .into_iter()
        .zip(1u32..)
        .map(|((title, url, description), position)| SearchResult {
            title,
            url,
            description,
            position,
        })
        .collect()
}
