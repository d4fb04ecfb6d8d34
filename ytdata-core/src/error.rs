use thiserror::Error;

/// Raised while building a poller; the middleware must not be registered after this.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("missing 'channel_id' from channel options")]
    MissingChannelId,
    #[error("missing 'api_key' from channel options")]
    MissingApiKey,
    #[error("max_results must be between 1 and 50, got {0}")]
    MaxResultsOutOfRange(u64),
    #[error("interval must be greater than zero")]
    ZeroInterval,
    #[error("unknown sort order '{0}'")]
    UnknownOrder(String),
    #[error("invalid value for {0}: '{1}'")]
    InvalidEnv(&'static str, String),
    #[error("invalid api base url: {0}")]
    InvalidBaseUrl(#[from] url::ParseError),
    #[error("failed to read options file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse options: {0}")]
    Parse(#[from] serde_json::Error),
}

/// A failed call to the YouTube Data API. Never leaves the poller.
#[derive(Debug, Error)]
pub enum RemoteFetchError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("youtube api returned {status}: {message}")]
    Api { status: u16, message: String },
    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("invalid endpoint url: {0}")]
    Url(#[from] url::ParseError),
    #[error("channel '{0}' not found")]
    ChannelNotFound(String),
}

#[derive(Debug, Error)]
pub enum PollerError {
    #[error("poller task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
