use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use url::Url;

use crate::config::{PollerConfig, SortOrder};
use crate::error::RemoteFetchError;
use crate::models::{
    ApiErrorResponse, ChannelListResponse, ChannelProfile, SearchListResponse, SearchResult,
    VideoListResponse, VideoStatisticsItem,
};

/// Thin wrapper over the three YouTube Data API v3 endpoints the poller needs.
#[derive(Debug, Clone)]
pub struct YouTubeClient {
    http: Client,
    base: Url,
    api_key: String,
    timeout: Option<Duration>,
}

impl YouTubeClient {
    pub fn new(http: Client, config: &PollerConfig) -> Self {
        Self {
            http,
            base: config.api_base_url.clone(),
            api_key: config.api_key.clone(),
            timeout: config.request_timeout,
        }
    }

    /// `search.list` restricted to videos of one channel.
    pub async fn search_videos(
        &self,
        channel_id: &str,
        max_results: u8,
        order: SortOrder,
    ) -> Result<Vec<SearchResult>, RemoteFetchError> {
        let max_results = max_results.to_string();
        let request = self.get("search")?.query(&[
            ("part", "snippet"),
            ("channelId", channel_id),
            ("maxResults", max_results.as_str()),
            ("order", order.as_str()),
            ("type", "video"),
        ]);
        let response: SearchListResponse = self.send(request).await?;
        Ok(response.items)
    }

    /// `videos.list` with `part=statistics` for the given ids, in request order.
    pub async fn video_statistics(
        &self,
        ids: &[String],
    ) -> Result<Vec<VideoStatisticsItem>, RemoteFetchError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let joined = ids.join(",");
        let request = self
            .get("videos")?
            .query(&[("part", "statistics"), ("id", joined.as_str())]);
        let response: VideoListResponse = self.send(request).await?;
        Ok(response.items)
    }

    /// `channels.list` with snippet and statistics for a single channel.
    pub async fn channel(&self, channel_id: &str) -> Result<ChannelProfile, RemoteFetchError> {
        let request = self
            .get("channels")?
            .query(&[("part", "snippet,statistics"), ("id", channel_id)]);
        let response: ChannelListResponse = self.send(request).await?;
        response
            .items
            .into_iter()
            .next()
            .ok_or_else(|| RemoteFetchError::ChannelNotFound(channel_id.to_owned()))
    }

    fn get(&self, endpoint: &str) -> Result<RequestBuilder, RemoteFetchError> {
        let url = self.base.join(endpoint)?;
        let mut request = self.http.get(url).query(&[("key", self.api_key.as_str())]);
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }
        Ok(request)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, RemoteFetchError> {
        let response = request.send().await?;
        let status = response.status().as_u16();
        if !response.status().is_success() {
            return Err(api_error(response).await);
        }
        let bytes = response.bytes().await?;
        match serde_json::from_slice(&bytes) {
            Ok(value) => Ok(value),
            // an error payload delivered with a success status
            Err(err) => match serde_json::from_slice::<ApiErrorResponse>(&bytes) {
                Ok(payload) => Err(RemoteFetchError::Api {
                    status: payload.error.code.unwrap_or(status),
                    message: payload.error.message,
                }),
                Err(_) => Err(RemoteFetchError::Decode(err)),
            },
        }
    }
}

async fn api_error(response: Response) -> RemoteFetchError {
    let status = response.status().as_u16();
    let message = match response.bytes().await {
        Ok(body) => match serde_json::from_slice::<ApiErrorResponse>(&body) {
            Ok(payload) => payload.error.message,
            Err(_) => String::from_utf8_lossy(&body).into_owned(),
        },
        Err(err) => err.to_string(),
    };
    RemoteFetchError::Api { status, message }
}
