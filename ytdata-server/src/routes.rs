use actix_web::{get, web, HttpResponse};
use ytdata_core::{ChannelSnapshot, ChannelVideos};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(get_videos).service(get_channel);
}

#[get("/videos")]
async fn get_videos(
    videos: Option<web::ReqData<ChannelVideos>>,
    snapshot: Option<web::ReqData<ChannelSnapshot>>,
) -> HttpResponse {
    match (videos, snapshot) {
        (Some(videos), _) => HttpResponse::Ok().json(videos.into_inner()),
        (None, Some(snapshot)) => HttpResponse::Ok().json(&snapshot.videos),
        (None, None) => {
            HttpResponse::ServiceUnavailable().body("channel data middleware is not installed")
        }
    }
}

#[get("/channel")]
async fn get_channel(snapshot: Option<web::ReqData<ChannelSnapshot>>) -> HttpResponse {
    match snapshot {
        Some(snapshot) => HttpResponse::Ok().json(snapshot.into_inner()),
        None => HttpResponse::NotFound().body("channel profile polling is disabled"),
    }
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::{test, App};
    use serde_json::{json, Value};
    use ytdata_core::{ChannelOptions, ChannelPoller};

    use super::configure;

    fn poller(fetch_profile: bool) -> ChannelPoller {
        let options = ChannelOptions {
            fetch_profile,
            ..ChannelOptions::new("K", "C")
        };
        ChannelPoller::from_options(options, reqwest::Client::new()).expect("valid options")
    }

    #[actix_web::test]
    async fn videos_route_renders_attached_videos() {
        let app = test::init_service(
            App::new()
                .wrap(poller(false).middleware())
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::get().uri("/videos").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body, json!([]));
    }

    #[actix_web::test]
    async fn videos_route_reads_snapshot_in_profile_mode() {
        let app = test::init_service(
            App::new()
                .wrap(poller(true).middleware())
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::get().uri("/videos").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body, json!([]));
    }

    #[actix_web::test]
    async fn videos_route_without_middleware_is_unavailable() {
        let app = test::init_service(App::new().configure(configure)).await;

        let req = test::TestRequest::get().uri("/videos").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[actix_web::test]
    async fn channel_route_renders_snapshot() {
        let app = test::init_service(
            App::new()
                .wrap(poller(true).middleware())
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::get().uri("/channel").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body, json!({ "profile": null, "videos": [] }));
    }

    #[actix_web::test]
    async fn channel_route_is_missing_without_profile_polling() {
        let app = test::init_service(
            App::new()
                .wrap(poller(false).middleware())
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::get().uri("/channel").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
