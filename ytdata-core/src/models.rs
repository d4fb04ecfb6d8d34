use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Thumbnail {
    pub url: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct VideoSnippet {
    pub published_at: Option<DateTime<Utc>>,
    pub channel_id: String,
    pub title: String,
    pub description: String,
    /// Keyed by size name (`default`, `medium`, `high`, ...).
    pub thumbnails: BTreeMap<String, Thumbnail>,
    pub channel_title: String,
    pub live_broadcast_content: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct VideoStatistics {
    #[serde(deserialize_with = "count::deserialize")]
    pub view_count: Option<u64>,
    #[serde(deserialize_with = "count::deserialize")]
    pub like_count: Option<u64>,
    #[serde(deserialize_with = "count::deserialize")]
    pub dislike_count: Option<u64>,
    #[serde(deserialize_with = "count::deserialize")]
    pub favorite_count: Option<u64>,
    #[serde(deserialize_with = "count::deserialize")]
    pub comment_count: Option<u64>,
}

/// One listed video, merged with its statistics when those were fetched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VideoRecord {
    pub id: String,
    pub etag: Option<String>,
    pub snippet: VideoSnippet,
    pub statistics: Option<VideoStatistics>,
}

impl VideoRecord {
    /// Listing results without a video id (channels, playlists) yield `None`.
    pub fn from_search(result: SearchResult) -> Option<Self> {
        let id = result.id.video_id?;
        Some(Self {
            id,
            etag: result.etag,
            snippet: result.snippet,
            statistics: None,
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct ChannelSnippet {
    pub title: String,
    pub description: String,
    pub custom_url: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub thumbnails: BTreeMap<String, Thumbnail>,
    pub country: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct ChannelStatistics {
    #[serde(deserialize_with = "count::deserialize")]
    pub view_count: Option<u64>,
    #[serde(deserialize_with = "count::deserialize")]
    pub subscriber_count: Option<u64>,
    pub hidden_subscriber_count: bool,
    #[serde(deserialize_with = "count::deserialize")]
    pub video_count: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ChannelProfile {
    pub id: String,
    pub etag: Option<String>,
    #[serde(default)]
    pub snippet: ChannelSnippet,
    #[serde(default)]
    pub statistics: ChannelStatistics,
}

// Wire shapes of the three API responses used by the poller.

// `items` is required on the list responses: a 200 body without it is an
// error payload, not an empty listing.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchListResponse {
    pub items: Vec<SearchResult>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchResult {
    pub etag: Option<String>,
    pub id: SearchResultId,
    #[serde(default)]
    pub snippet: VideoSnippet,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResultId {
    pub kind: Option<String>,
    pub video_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VideoListResponse {
    pub items: Vec<VideoStatisticsItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VideoStatisticsItem {
    pub id: String,
    #[serde(default)]
    pub statistics: VideoStatistics,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChannelListResponse {
    #[serde(default)]
    pub items: Vec<ChannelProfile>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorBody,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    pub code: Option<u16>,
    #[serde(default)]
    pub message: String,
}

/// How [`attach_statistics`] lined the two responses up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pairing {
    /// Nth statistics entry went to the Nth record.
    Positional,
    /// The responses were out of step, entries were matched by video id.
    ById,
}

/// Attaches statistics to the listed records.
///
/// The API returns `videos.list` items in the order the ids were requested, so
/// entries are paired by index. When lengths or ids disagree the pairing falls
/// back to an id lookup; records without a match keep `statistics: None`.
pub fn attach_statistics(
    records: &mut [VideoRecord],
    stats: Vec<VideoStatisticsItem>,
) -> Pairing {
    let in_step = records.len() == stats.len()
        && records.iter().zip(&stats).all(|(record, item)| record.id == item.id);

    if in_step {
        for (record, item) in records.iter_mut().zip(stats) {
            record.statistics = Some(item.statistics);
        }
        return Pairing::Positional;
    }

    let mut by_id: HashMap<String, VideoStatistics> = stats
        .into_iter()
        .map(|item| (item.id, item.statistics))
        .collect();
    for record in records.iter_mut() {
        record.statistics = by_id.remove(&record.id);
    }
    Pairing::ById
}

mod count {
    use serde::{de, Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u64),
        Text(String),
    }

    // The API encodes 64-bit counters as decimal strings.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<Raw>::deserialize(deserializer)? {
            None => Ok(None),
            Some(Raw::Number(value)) => Ok(Some(value)),
            Some(Raw::Text(text)) => text.parse().map(Some).map_err(de::Error::custom),
        }
    }
}
