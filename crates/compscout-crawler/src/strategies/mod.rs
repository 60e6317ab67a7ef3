//! Page fetch strategies, consulted in order by the crawler chain.

mod browser;
mod firecrawl;
mod reader;

pub use browser::BrowserStrategy;
pub use firecrawl::FirecrawlStrategy;
pub use reader::ReaderStrategy;

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};

use crate::error::CrawlerError;
use crate::platform::{PlatformInfo, PlatformKind};

/// Pages shorter than this are treated as block or verification pages.
pub const MIN_CONTENT_CHARS: usize = 100;

const VERIFICATION_MARKERS: [&str; 2] = ["验证", "captcha"];

/// Markdown content fetched for one URL.
#[derive(Debug, Clone)]
pub struct CrawlResult {
    pub success: bool,
    pub markdown: String,
    pub title: String,
    pub url: String,
    pub platform: PlatformKind,
    /// Name of the strategy that produced this result.
    pub method: &'static str,
    pub metadata: BTreeMap<String, String>,
}

/// One way of turning a URL into markdown.
#[async_trait]
pub trait FetchStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Whether the strategy's prerequisites (credentials, runtime) are
    /// present. Unavailable strategies are skipped, not attempted.
    fn is_available(&self) -> bool {
        true
    }

    /// # Errors
    ///
    /// Returns a transport error, or a content-validation error when the
    /// fetched page looks like a block or verification page.
    async fn fetch(&self, url: &str, platform: &PlatformInfo) -> Result<CrawlResult, CrawlerError>;
}

pub(crate) fn build_client(timeout_secs: u64) -> Result<Client, CrawlerError> {
    Ok(Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .build()?)
}

pub(crate) fn parse_base_url(base_url: &str) -> Result<Url, CrawlerError> {
    let normalised = format!("{}/", base_url.trim_end_matches('/'));
    Url::parse(&normalised).map_err(|e| CrawlerError::InvalidBaseUrl {
        base_url: base_url.to_string(),
        reason: e.to_string(),
    })
}

/// Rejects short pages and, when `check_markers` is set, pages carrying a
/// verification or CAPTCHA marker.
pub(crate) fn validate_content(
    strategy: &'static str,
    markdown: &str,
    check_markers: bool,
) -> Result<(), CrawlerError> {
    let chars = markdown.chars().count();
    if chars < MIN_CONTENT_CHARS {
        return Err(CrawlerError::ContentTooShort { strategy, chars });
    }
    if check_markers {
        let lowered = markdown.to_lowercase();
        if VERIFICATION_MARKERS.iter().any(|m| lowered.contains(m)) {
            return Err(CrawlerError::VerificationPage { strategy });
        }
    }
    Ok(())
}
