use std::time::Duration;

use reqwest::Client;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use ytdata_core::{ChannelOptions, ChannelPoller, ConfigurationError};

fn search_body(id: &str) -> serde_json::Value {
    json!({
        "items": [{
            "id": { "kind": "youtube#video", "videoId": id },
            "snippet": { "title": id }
        }]
    })
}

fn options(server: &MockServer, interval_ms: u64) -> ChannelOptions {
    ChannelOptions {
        api_base_url: Some(server.uri()),
        interval: Some(interval_ms),
        merge_statistics: false,
        ..ChannelOptions::new("K", "C")
    }
}

async fn search_requests(server: &MockServer) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|request| request.url.path() == "/search")
        .count()
}

#[tokio::test]
async fn spawn_refreshes_immediately() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_body("a")))
        .mount(&server)
        .await;

    // an hour-long interval: only the immediate first tick can fill the cache
    let poller = ChannelPoller::from_options(options(&server, 3_600_000), Client::new()).unwrap();
    let mut updates = poller.subscribe_videos();
    let handle = poller.spawn();

    tokio::time::timeout(Duration::from_secs(2), updates.changed())
        .await
        .expect("timed out")
        .expect("cache dropped");
    assert_eq!(poller.current_videos()[0].id, "a");

    handle.stop().await.expect("stop poller");
}

#[tokio::test]
async fn timer_survives_failed_refresh() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_body("b")))
        .mount(&server)
        .await;

    let poller = ChannelPoller::from_options(options(&server, 50), Client::new()).unwrap();
    let mut updates = poller.subscribe_videos();
    let handle = poller.spawn();

    tokio::time::timeout(Duration::from_secs(2), updates.changed())
        .await
        .expect("timed out")
        .expect("cache dropped");
    assert_eq!(poller.current_videos()[0].id, "b");
    assert!(search_requests(&server).await >= 2);

    handle.stop().await.expect("stop poller");
}

#[tokio::test]
async fn profile_timer_runs_alongside_videos() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_body("a")))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/channels"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{ "id": "C", "snippet": { "title": "Channel" } }]
        })))
        .mount(&server)
        .await;

    let poller = ChannelPoller::from_options(
        ChannelOptions {
            fetch_profile: true,
            ..options(&server, 3_600_000)
        },
        Client::new(),
    )
    .unwrap();
    let mut profile_updates = poller.reader().watch_profile();
    let mut video_updates = poller.subscribe_videos();
    let handle = poller.spawn();

    tokio::time::timeout(Duration::from_secs(2), async {
        profile_updates.changed().await.expect("cache dropped");
        video_updates.changed().await.expect("cache dropped");
    })
    .await
    .expect("timed out");

    assert_eq!(poller.current_profile().expect("profile cached").snippet.title, "Channel");
    assert_eq!(poller.current_videos().len(), 1);

    handle.stop().await.expect("stop poller");
}

#[tokio::test]
async fn stop_ends_polling() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_body("a")))
        .mount(&server)
        .await;

    let poller = ChannelPoller::from_options(options(&server, 20), Client::new()).unwrap();
    let handle = poller.spawn();
    tokio::time::sleep(Duration::from_millis(100)).await;
    handle.stop().await.expect("stop poller");

    // let any refresh spawned by the last tick finish
    tokio::time::sleep(Duration::from_millis(100)).await;
    let after_stop = search_requests(&server).await;
    assert!(after_stop >= 1);

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(search_requests(&server).await, after_stop);
}

#[tokio::test]
async fn start_rejects_missing_credentials() {
    let result = ytdata_core::start(ChannelOptions::default(), Client::new());
    assert!(matches!(result, Err(ConfigurationError::MissingChannelId)));

    let result = ytdata_core::start(
        ChannelOptions {
            channel_id: Some("C".into()),
            ..ChannelOptions::default()
        },
        Client::new(),
    );
    assert!(matches!(result, Err(ConfigurationError::MissingApiKey)));
}

#[tokio::test]
async fn start_returns_working_middleware() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_body("a")))
        .mount(&server)
        .await;

    let (layer, handle) = ytdata_core::start(options(&server, 3_600_000), Client::new()).unwrap();

    let mut extensions = actix_web::dev::Extensions::new();
    tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            layer.attach(&mut extensions);
            let filled = extensions
                .get::<ytdata_core::ChannelVideos>()
                .is_some_and(|videos| !videos.0.is_empty());
            if filled {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("middleware never saw the first refresh");

    handle.stop().await.expect("stop poller");
}
