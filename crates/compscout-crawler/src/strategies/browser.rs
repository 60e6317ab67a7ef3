//! Browser-automation tier for login-gated platforms.
//!
//! There is no browser runtime wired in, so this strategy always reports
//! itself unavailable and the chain skips it.

use async_trait::async_trait;

use super::{CrawlResult, FetchStrategy};
use crate::error::CrawlerError;
use crate::platform::PlatformInfo;

const STRATEGY: &str = "browser";

#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserStrategy;

#[async_trait]
impl FetchStrategy for BrowserStrategy {
    fn name(&self) -> &'static str {
        STRATEGY
    }

    fn is_available(&self) -> bool {
        false
    }

    async fn fetch(&self, url: &str, platform: &PlatformInfo) -> Result<CrawlResult, CrawlerError> {
        tracing::debug!(url, platform = %platform.kind, "browser fetch requested but unavailable");
        Err(CrawlerError::Unavailable { strategy: STRATEGY })
    }
}
