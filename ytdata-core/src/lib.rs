pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod poller;

pub use cache::{CacheReader, ChannelCache, ChannelSnapshot, ChannelVideos};
pub use client::YouTubeClient;
pub use config::{ChannelOptions, PollerConfig, SortOrder};
pub use error::{ConfigurationError, PollerError, RemoteFetchError};
pub use middleware::ChannelDataLayer;
pub use models::{ChannelProfile, VideoRecord, VideoSnippet, VideoStatistics};
pub use poller::{start, ChannelPoller, PollerHandle};
