use std::sync::Arc;

use serde::Serialize;
use tokio::sync::watch;

use crate::models::{ChannelProfile, VideoRecord};

pub type SharedVideos = Arc<Vec<VideoRecord>>;
pub type SharedProfile = Option<Arc<ChannelProfile>>;

/// Latest successful fetch results. Only the poller holds this; everyone else
/// gets a [`CacheReader`].
#[derive(Debug)]
pub struct ChannelCache {
    videos: watch::Sender<SharedVideos>,
    profile: watch::Sender<SharedProfile>,
}

impl ChannelCache {
    pub fn new() -> Self {
        let (videos, _) = watch::channel(Arc::new(Vec::new()));
        let (profile, _) = watch::channel(None);
        Self { videos, profile }
    }

    pub fn replace_videos(&self, videos: Vec<VideoRecord>) {
        self.videos.send_replace(Arc::new(videos));
    }

    pub fn replace_profile(&self, profile: ChannelProfile) {
        self.profile.send_replace(Some(Arc::new(profile)));
    }

    pub fn videos(&self) -> SharedVideos {
        self.videos.borrow().clone()
    }

    pub fn profile(&self) -> SharedProfile {
        self.profile.borrow().clone()
    }

    pub fn reader(&self) -> CacheReader {
        CacheReader {
            videos: self.videos.subscribe(),
            profile: self.profile.subscribe(),
        }
    }
}

impl Default for ChannelCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Read-only view of a [`ChannelCache`]. Cloning is cheap.
#[derive(Debug, Clone)]
pub struct CacheReader {
    videos: watch::Receiver<SharedVideos>,
    profile: watch::Receiver<SharedProfile>,
}

impl CacheReader {
    pub fn videos(&self) -> SharedVideos {
        self.videos.borrow().clone()
    }

    pub fn profile(&self) -> SharedProfile {
        self.profile.borrow().clone()
    }

    pub fn snapshot(&self) -> ChannelSnapshot {
        ChannelSnapshot {
            profile: self.profile(),
            videos: self.videos(),
        }
    }

    /// Receiver that is notified on every video swap.
    pub fn watch_videos(&self) -> watch::Receiver<SharedVideos> {
        self.videos.clone()
    }

    pub fn watch_profile(&self) -> watch::Receiver<SharedProfile> {
        self.profile.clone()
    }
}

/// Request extension attached when only videos are polled.
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct ChannelVideos(pub SharedVideos);

/// Request extension attached when the channel profile is polled as well.
#[derive(Debug, Clone, Serialize)]
pub struct ChannelSnapshot {
    pub profile: SharedProfile,
    pub videos: SharedVideos,
}
