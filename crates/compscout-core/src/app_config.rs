use std::path::PathBuf;

/// Process-wide settings, built once at startup and handed to each component
/// by value or reference.
#[derive(Clone)]
pub struct AppConfig {
    pub firecrawl_api_key: Option<String>,
    pub serper_api_key: Option<String>,
    pub google_api_key: Option<String>,
    pub google_search_engine_id: Option<String>,
    pub bing_api_key: Option<String>,
    pub storage_path: PathBuf,
    pub log_level: String,
    pub request_timeout_secs: u64,
    pub batch_concurrency: i64,
}

impl AppConfig {
    /// Google Custom Search needs both the key and the engine id; returns
    /// them together only when both are set.
    #[must_use]
    pub fn google_credentials(&self) -> Option<(&str, &str)> {
        match (&self.google_api_key, &self.google_search_engine_id) {
            (Some(key), Some(cx)) => Some((key.as_str(), cx.as_str())),
            _ => None,
        }
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redact = |v: &Option<String>| v.as_ref().map(|_| "[redacted]");
        f.debug_struct("AppConfig")
            .field("firecrawl_api_key", &redact(&self.firecrawl_api_key))
            .field("serper_api_key", &redact(&self.serper_api_key))
            .field("google_api_key", &redact(&self.google_api_key))
            .field("google_search_engine_id", &self.google_search_engine_id)
            .field("bing_api_key", &redact(&self.bing_api_key))
            .field("storage_path", &self.storage_path)
            .field("log_level", &self.log_level)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("batch_concurrency", &self.batch_concurrency)
            .finish()
    }
}
