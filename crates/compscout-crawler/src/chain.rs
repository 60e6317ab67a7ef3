//! Ordered fallback over fetch strategies.

use std::sync::Arc;

use compscout_core::AppConfig;

use crate::error::CrawlerError;
use crate::platform::identify_platform;
use crate::strategies::{
    BrowserStrategy, CrawlResult, FetchStrategy, FirecrawlStrategy, ReaderStrategy,
};

pub struct CrawlerChain {
    strategies: Vec<Arc<dyn FetchStrategy>>,
}

impl CrawlerChain {
    #[must_use]
    pub fn new(strategies: Vec<Arc<dyn FetchStrategy>>) -> Self {
        Self { strategies }
    }

    /// Builds the standard chain: Firecrawl (only with an API key), the
    /// reader proxy, then the browser tier.
    ///
    /// # Errors
    ///
    /// Returns [`CrawlerError::Http`] if an HTTP client cannot be built.
    pub fn from_config(config: &AppConfig) -> Result<Self, CrawlerError> {
        let timeout = config.request_timeout_secs;
        let mut strategies: Vec<Arc<dyn FetchStrategy>> = Vec::new();

        if let Some(key) = &config.firecrawl_api_key {
            strategies.push(Arc::new(FirecrawlStrategy::new(key, timeout)?));
        }
        strategies.push(Arc::new(ReaderStrategy::new(timeout)?));
        strategies.push(Arc::new(BrowserStrategy));

        Ok(Self::new(strategies))
    }

    #[must_use]
    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Fetches `url` with the first strategy that succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`CrawlerError::InvalidUrl`] for an unparseable URL,
    /// [`CrawlerError::AllStrategiesFailed`] wrapping the last strategy
    /// error when every attempted strategy failed, and
    /// [`CrawlerError::NoStrategySucceeded`] when none produced an error to
    /// report (for example, none were available).
    pub async fn crawl(&self, url: &str) -> Result<CrawlResult, CrawlerError> {
        let platform = identify_platform(url)?;
        let mut last_error: Option<CrawlerError> = None;

        for strategy in &self.strategies {
            if !strategy.is_available() {
                tracing::debug!(strategy = strategy.name(), url, "strategy unavailable, skipping");
                continue;
            }

            match strategy.fetch(url, &platform).await {
                Ok(result) if result.success => {
                    tracing::debug!(
                        strategy = strategy.name(),
                        url,
                        chars = result.markdown.chars().count(),
                        "fetch succeeded"
                    );
                    return Ok(result);
                }
                Ok(_) => {
                    tracing::warn!(strategy = strategy.name(), url, "fetch returned no success");
                }
                Err(e) => {
                    tracing::warn!(strategy = strategy.name(), url, error = %e, "fetch strategy failed");
                    last_error = Some(e);
                }
            }
        }

        Err(match last_error {
            Some(source) => CrawlerError::AllStrategiesFailed {
                source: Box::new(source),
            },
            None => CrawlerError::NoStrategySucceeded,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::platform::PlatformInfo;

    struct Scripted {
        name: &'static str,
        available: bool,
        outcome: fn() -> Result<bool, CrawlerError>,
        calls: AtomicUsize,
    }

    impl Scripted {
        fn new(
            name: &'static str,
            available: bool,
            outcome: fn() -> Result<bool, CrawlerError>,
        ) -> Arc<Self> {
            Arc::new(Self {
                name,
                available,
                outcome,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl FetchStrategy for Scripted {
        fn name(&self) -> &'static str {
            self.name
        }

        fn is_available(&self) -> bool {
            self.available
        }

        async fn fetch(
            &self,
            url: &str,
            platform: &PlatformInfo,
        ) -> Result<CrawlResult, CrawlerError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let success = (self.outcome)()?;
            Ok(CrawlResult {
                success,
                markdown: "body".to_string(),
                title: String::new(),
                url: url.to_string(),
                platform: platform.kind,
                method: self.name,
                metadata: BTreeMap::new(),
            })
        }
    }

    fn chain_of(strategies: &[&Arc<Scripted>]) -> CrawlerChain {
        CrawlerChain::new(
            strategies
                .iter()
                .map(|s| Arc::clone(*s) as Arc<dyn FetchStrategy>)
                .collect(),
        )
    }

    fn too_short() -> Result<bool, CrawlerError> {
        Err(CrawlerError::ContentTooShort {
            strategy: "first",
            chars: 12,
        })
    }

    fn ok() -> Result<bool, CrawlerError> {
        Ok(true)
    }

    fn not_ok() -> Result<bool, CrawlerError> {
        Ok(false)
    }

    fn config() -> AppConfig {
        AppConfig {
            firecrawl_api_key: None,
            serper_api_key: None,
            google_api_key: None,
            google_search_engine_id: None,
            bing_api_key: None,
            storage_path: PathBuf::from("./storage"),
            log_level: "info".to_string(),
            request_timeout_secs: 30,
            batch_concurrency: 1,
        }
    }

    #[tokio::test]
    async fn falls_back_after_validation_failure() {
        let first = Scripted::new("first", true, too_short);
        let second = Scripted::new("second", true, ok);
        let chain = chain_of(&[&first, &second]);

        let result = chain.crawl("https://example.org/a").await.unwrap();
        assert_eq!(result.method, "second");
        assert_eq!(first.calls.load(Ordering::SeqCst), 1);
        assert_eq!(second.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn unavailable_strategy_is_never_called() {
        let first = Scripted::new("first", false, ok);
        let second = Scripted::new("second", true, ok);
        let chain = chain_of(&[&first, &second]);

        let result = chain.crawl("https://example.org/a").await.unwrap();
        assert_eq!(result.method, "second");
        assert_eq!(first.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn total_failure_wraps_last_error() {
        let chain = chain_of(&[
            &Scripted::new("first", true, not_ok),
            &Scripted::new("second", true, too_short),
        ]);
        let err = chain.crawl("https://example.org/a").await.unwrap_err();
        match err {
            CrawlerError::AllStrategiesFailed { source } => {
                assert!(matches!(*source, CrawlerError::ContentTooShort { .. }));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn no_attempted_strategy_is_generic_failure() {
        let chain = chain_of(&[
            &Scripted::new("off", false, ok),
            &Scripted::new("flaky", true, not_ok),
        ]);
        let err = chain.crawl("https://example.org/a").await.unwrap_err();
        assert!(matches!(err, CrawlerError::NoStrategySucceeded));
    }

    #[tokio::test]
    async fn invalid_url_fails_before_any_strategy() {
        let first = Scripted::new("first", true, ok);
        let chain = chain_of(&[&first]);
        assert!(matches!(
            chain.crawl("::nope").await,
            Err(CrawlerError::InvalidUrl { .. })
        ));
        assert_eq!(first.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn from_config_includes_firecrawl_only_with_key() {
        let chain = CrawlerChain::from_config(&config()).unwrap();
        assert_eq!(chain.strategy_names(), ["jina", "browser"]);

        let mut with_key = config();
        with_key.firecrawl_api_key = Some("fc-key".to_string());
        let chain = CrawlerChain::from_config(&with_key).unwrap();
        assert_eq!(chain.strategy_names(), ["firecrawl", "jina", "browser"]);
    }
}
