use std::fmt;
use std::sync::Arc;

use futures_util::future::try_join_all;
use reqwest::Client;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::cache::{CacheReader, ChannelCache, SharedProfile, SharedVideos};
use crate::client::YouTubeClient;
use crate::config::{ChannelOptions, PollerConfig};
use crate::error::{ConfigurationError, PollerError, RemoteFetchError};
use crate::middleware::ChannelDataLayer;
use crate::models::{attach_statistics, Pairing, VideoRecord};

/// Periodically fetches one channel's videos (and optionally its profile) and
/// keeps the latest successful result.
#[derive(Debug, Clone)]
pub struct ChannelPoller {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    config: PollerConfig,
    client: YouTubeClient,
    cache: ChannelCache,
}

impl ChannelPoller {
    pub fn new(config: PollerConfig, http: Client) -> Self {
        let client = YouTubeClient::new(http, &config);
        Self {
            inner: Arc::new(Inner {
                config,
                client,
                cache: ChannelCache::new(),
            }),
        }
    }

    pub fn from_options(
        options: ChannelOptions,
        http: Client,
    ) -> Result<Self, ConfigurationError> {
        let config = PollerConfig::from_options(options)?;
        Ok(Self::new(config, http))
    }

    pub fn config(&self) -> &PollerConfig {
        &self.inner.config
    }

    /// Fetches the listing (and statistics when enabled) and swaps the cached
    /// videos. The cache is left untouched on error.
    pub async fn try_refresh(&self) -> Result<usize, RemoteFetchError> {
        let config = self.config();
        let client = &self.inner.client;

        let listing = client
            .search_videos(&config.channel_id, config.max_results, config.order)
            .await?;
        let mut records: Vec<VideoRecord> = listing
            .into_iter()
            .filter_map(VideoRecord::from_search)
            .collect();

        if config.merge_statistics && !records.is_empty() {
            let ids: Vec<String> = records.iter().map(|record| record.id.clone()).collect();
            let stats = client.video_statistics(&ids).await?;
            if attach_statistics(&mut records, stats) == Pairing::ById {
                warn!(
                    channel = %config.channel_id,
                    "statistics response out of step with listing, paired by video id"
                );
            }
        }

        let count = records.len();
        self.inner.cache.replace_videos(records);
        Ok(count)
    }

    /// Same as [`try_refresh`](Self::try_refresh), but failures are only logged.
    pub async fn refresh(&self) {
        let channel = &self.config().channel_id;
        match self.try_refresh().await {
            Ok(count) => info!(%channel, videos = count, "updated channel videos"),
            Err(err) => error!(%channel, error = %err, "failed to refresh channel videos"),
        }
    }

    pub async fn try_refresh_profile(&self) -> Result<(), RemoteFetchError> {
        let profile = self.inner.client.channel(&self.config().channel_id).await?;
        self.inner.cache.replace_profile(profile);
        Ok(())
    }

    pub async fn refresh_profile(&self) {
        let channel = &self.config().channel_id;
        match self.try_refresh_profile().await {
            Ok(()) => info!(%channel, "updated channel profile"),
            Err(err) => error!(%channel, error = %err, "failed to refresh channel profile"),
        }
    }

    /// Empty until the first successful refresh.
    pub fn current_videos(&self) -> SharedVideos {
        self.inner.cache.videos()
    }

    pub fn current_profile(&self) -> SharedProfile {
        self.inner.cache.profile()
    }

    pub fn reader(&self) -> CacheReader {
        self.inner.cache.reader()
    }

    pub fn subscribe_videos(&self) -> watch::Receiver<SharedVideos> {
        self.reader().watch_videos()
    }

    pub fn middleware(&self) -> ChannelDataLayer {
        ChannelDataLayer::new(self.reader(), self.config().fetch_profile)
    }

    /// Starts the refresh timers. The first tick fires immediately.
    ///
    /// Every tick runs its refresh as a separate task, so a slow fetch never
    /// delays the next one and concurrent fetches finish in any order. Dropping
    /// the returned handle detaches the timers instead of stopping them.
    pub fn spawn(&self) -> PollerHandle {
        let (cancel_tx, _) = broadcast::channel(1);
        let mut tasks = vec![spawn_timer(self.clone(), Job::Videos, cancel_tx.subscribe())];
        if self.config().fetch_profile {
            tasks.push(spawn_timer(self.clone(), Job::Profile, cancel_tx.subscribe()));
        }
        PollerHandle { cancel_tx, tasks }
    }
}

#[derive(Debug, Clone, Copy)]
enum Job {
    Videos,
    Profile,
}

impl fmt::Display for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Job::Videos => f.write_str("videos"),
            Job::Profile => f.write_str("profile"),
        }
    }
}

fn spawn_timer(
    poller: ChannelPoller,
    job: Job,
    mut cancel_rx: broadcast::Receiver<()>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(poller.config().interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut attached = true;

        loop {
            tokio::select! {
                signal = cancel_rx.recv(), if attached => {
                    if let Err(broadcast::error::RecvError::Closed) = signal {
                        debug!(%job, "poller handle dropped, timer detached");
                        attached = false;
                        continue;
                    }
                    info!(channel = %poller.config().channel_id, %job, "poller shutdown requested");
                    break;
                }
                _ = ticker.tick() => {
                    let poller = poller.clone();
                    tokio::spawn(async move {
                        match job {
                            Job::Videos => poller.refresh().await,
                            Job::Profile => poller.refresh_profile().await,
                        }
                    });
                }
            }
        }
    })
}

pub struct PollerHandle {
    cancel_tx: broadcast::Sender<()>,
    tasks: Vec<JoinHandle<()>>,
}

impl PollerHandle {
    /// Stops the timers. Fetches already in flight still complete.
    pub async fn stop(self) -> Result<(), PollerError> {
        let _ = self.cancel_tx.send(());
        try_join_all(self.tasks).await?;
        Ok(())
    }
}

/// Validates `options`, starts polling, and returns the middleware to register.
///
/// Must be called from within a tokio runtime.
pub fn start(
    options: ChannelOptions,
    http: Client,
) -> Result<(ChannelDataLayer, PollerHandle), ConfigurationError> {
    let poller = ChannelPoller::from_options(options, http)?;
    let handle = poller.spawn();
    Ok((poller.middleware(), handle))
}
