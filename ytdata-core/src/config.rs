use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::ConfigurationError;

pub const DEFAULT_INTERVAL_MS: u64 = 3_600_000;
pub const DEFAULT_MAX_RESULTS: u8 = 50;
pub const DEFAULT_API_BASE_URL: &str = "https://www.googleapis.com/youtube/v3/";

/// Ordering of the `search.list` results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortOrder {
    #[default]
    Date,
    Rating,
    Relevance,
    Title,
    VideoCount,
    ViewCount,
}

impl SortOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::Date => "date",
            SortOrder::Rating => "rating",
            SortOrder::Relevance => "relevance",
            SortOrder::Title => "title",
            SortOrder::VideoCount => "videoCount",
            SortOrder::ViewCount => "viewCount",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = ConfigurationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "date" => Ok(SortOrder::Date),
            "rating" => Ok(SortOrder::Rating),
            "relevance" => Ok(SortOrder::Relevance),
            "title" => Ok(SortOrder::Title),
            "videoCount" => Ok(SortOrder::VideoCount),
            "viewCount" => Ok(SortOrder::ViewCount),
            other => Err(ConfigurationError::UnknownOrder(other.to_owned())),
        }
    }
}

/// Raw channel options as supplied by the embedding application.
///
/// Every field is optional here so that a missing credential surfaces as a
/// [`ConfigurationError`] from [`PollerConfig::from_options`] rather than as a
/// deserialization failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelOptions {
    pub api_key: Option<String>,
    pub channel_id: Option<String>,
    /// Refresh interval in milliseconds.
    pub interval: Option<u64>,
    pub max_results: Option<u64>,
    pub order: Option<SortOrder>,
    /// Per-request timeout in milliseconds. No timeout when unset.
    pub request_timeout: Option<u64>,
    pub api_base_url: Option<String>,
    pub fetch_profile: bool,
    pub merge_statistics: bool,
}

impl Default for ChannelOptions {
    fn default() -> Self {
        Self {
            api_key: None,
            channel_id: None,
            interval: None,
            max_results: None,
            order: None,
            request_timeout: None,
            api_base_url: None,
            fetch_profile: false,
            merge_statistics: true,
        }
    }
}

impl ChannelOptions {
    pub fn new(api_key: impl Into<String>, channel_id: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            channel_id: Some(channel_id.into()),
            ..Self::default()
        }
    }

    /// Loads options from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigurationError> {
        let content = std::fs::read_to_string(path)?;
        let options = serde_json::from_str(&content)?;
        Ok(options)
    }

    /// Applies `YTDATA_*` environment variables on top of these options.
    pub fn with_env_overrides(self) -> Result<Self, ConfigurationError> {
        self.with_overrides(|name| std::env::var(name).ok())
    }

    pub fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigurationError> {
        if let Some(key) = lookup("YTDATA_API_KEY") {
            self.api_key = Some(key);
        }
        if let Some(channel) = lookup("YTDATA_CHANNEL_ID") {
            self.channel_id = Some(channel);
        }
        if let Some(raw) = lookup("YTDATA_INTERVAL_MS") {
            let interval = raw
                .parse()
                .map_err(|_| ConfigurationError::InvalidEnv("YTDATA_INTERVAL_MS", raw.clone()))?;
            self.interval = Some(interval);
        }
        if let Some(raw) = lookup("YTDATA_ORDER") {
            self.order = Some(raw.parse()?);
        }
        Ok(self)
    }
}

/// Validated, immutable poller configuration.
#[derive(Debug, Clone)]
pub struct PollerConfig {
    pub api_key: String,
    pub channel_id: String,
    pub interval: Duration,
    pub max_results: u8,
    pub order: SortOrder,
    pub request_timeout: Option<Duration>,
    pub api_base_url: Url,
    pub fetch_profile: bool,
    pub merge_statistics: bool,
}

impl PollerConfig {
    pub fn from_options(options: ChannelOptions) -> Result<Self, ConfigurationError> {
        let channel_id = options
            .channel_id
            .filter(|id| !id.trim().is_empty())
            .ok_or(ConfigurationError::MissingChannelId)?;
        let api_key = options
            .api_key
            .filter(|key| !key.trim().is_empty())
            .ok_or(ConfigurationError::MissingApiKey)?;

        let interval_ms = options.interval.unwrap_or(DEFAULT_INTERVAL_MS);
        if interval_ms == 0 {
            return Err(ConfigurationError::ZeroInterval);
        }

        let max_results = match options.max_results {
            None => DEFAULT_MAX_RESULTS,
            Some(value @ 1..=50) => value as u8,
            Some(value) => return Err(ConfigurationError::MaxResultsOutOfRange(value)),
        };

        // Url::join drops the last path segment unless the base ends with '/'.
        let mut base = options
            .api_base_url
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_owned());
        if !base.ends_with('/') {
            base.push('/');
        }
        let api_base_url = Url::parse(&base)?;

        Ok(Self {
            api_key,
            channel_id,
            interval: Duration::from_millis(interval_ms),
            max_results,
            order: options.order.unwrap_or_default(),
            request_timeout: options.request_timeout.map(Duration::from_millis),
            api_base_url,
            fetch_profile: options.fetch_profile,
            merge_statistics: options.merge_statistics,
        })
    }
}

impl TryFrom<ChannelOptions> for PollerConfig {
    type Error = ConfigurationError;

    fn try_from(options: ChannelOptions) -> Result<Self, Self::Error> {
        Self::from_options(options)
    }
}
