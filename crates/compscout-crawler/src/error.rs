use thiserror::Error;

#[derive(Debug, Error)]
pub enum CrawlerError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid URL \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("invalid base URL \"{base_url}\": {reason}")]
    InvalidBaseUrl { base_url: String, reason: String },

    #[error("{strategy} is not configured: missing API credential")]
    MissingCredential { strategy: &'static str },

    #[error("{strategy} is not available in this build")]
    Unavailable { strategy: &'static str },

    #[error("unexpected HTTP status {status} from {strategy}: {body}")]
    UnexpectedStatus {
        strategy: &'static str,
        status: u16,
        body: String,
    },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{strategy} reported failure: {reason}")]
    Unsuccessful {
        strategy: &'static str,
        reason: String,
    },

    #[error("{strategy} returned {chars} characters; likely a verification page")]
    ContentTooShort { strategy: &'static str, chars: usize },

    #[error("{strategy} hit a verification or CAPTCHA page")]
    VerificationPage { strategy: &'static str },

    #[error("all fetch strategies failed, last error: {source}")]
    AllStrategiesFailed {
        #[source]
        source: Box<CrawlerError>,
    },

    #[error("all fetch strategies failed")]
    NoStrategySucceeded,

    #[error("I/O error while {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode {context}: {reason}")]
    Encode { context: String, reason: String },
}

impl CrawlerError {
    pub(crate) fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }
}
