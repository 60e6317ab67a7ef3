use thiserror::Error;

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{engine} is not configured: missing API credential")]
    MissingCredential { engine: &'static str },

    #[error("{engine} returned HTTP {status}: {body}")]
    UnexpectedStatus {
        engine: &'static str,
        status: u16,
        body: String,
    },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{engine} response is missing `{field}`")]
    MalformedResponse {
        engine: &'static str,
        field: &'static str,
    },

    #[error("invalid base URL \"{base_url}\": {reason}")]
    InvalidBaseUrl { base_url: String, reason: String },

    #[error("no search results found for \"{topic}\"")]
    NoResults { topic: String },

    #[error("unknown {kind} \"{value}\"")]
    UnknownVariant { kind: &'static str, value: String },
}
