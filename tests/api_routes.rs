//! HTTP contract of the JSON API, driven through the router without a socket.

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use lbl_live::adapters::PageFetcher;
use lbl_live::api::{create_router, AppState};
use lbl_live::config::AppConfig;
use lbl_live::error::{FetchCause, FetchError};
use lbl_live::services::LeagueService;
use mockall::mock;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

const LEAGUE_PAGE: &str = include_str!("fixtures/league_page.html");

mock! {
    pub Fetcher {}

    #[async_trait]
    impl PageFetcher for Fetcher {
        async fn fetch(&self, url: &str, timeout: Duration) -> Result<String, FetchError>;
    }
}

fn league_serving(page: Result<&'static str, FetchCause>) -> LeagueService {
    let mut fetcher = MockFetcher::new();
    fetcher.expect_fetch().returning(move |url, _| match &page {
        Ok(html) => Ok(html.to_string()),
        Err(cause) => Err(FetchError::new(url, cause.clone())),
    });
    LeagueService::from_config(&AppConfig::default(), Arc::new(fetcher))
}

async fn send_json(league: &LeagueService, method: Method, uri: &str) -> (StatusCode, Value) {
    let app = create_router(AppState::new(league.clone()));
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

#[tokio::test]
async fn test_data_routes_unavailable_before_first_refresh() {
    let league = league_serving(Ok(LEAGUE_PAGE));

    for uri in [
        "/api/data",
        "/api/standings",
        "/api/results",
        "/api/upcoming",
        "/api/stats",
        "/api/games/0209_2628_2682",
    ] {
        let (status, body) = send_json(&league, Method::GET, uri).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE, "{uri}");
        assert_eq!(body["error"], "data not yet available", "{uri}");
    }
}

#[tokio::test]
async fn test_data_routes_after_refresh() {
    let league = league_serving(Ok(LEAGUE_PAGE));
    league.refresh_now().await.unwrap();

    let (status, data) = send_json(&league, Method::GET, "/api/data").await;
    assert_eq!(status, StatusCode::OK);
    assert!(data["last_updated"].is_string());
    assert_eq!(data["standings"][0]["team"], "Al Riyadi");
    assert_eq!(data["results"][0]["homeTeam"], "Beirut Club");
    assert_eq!(data["results"][0]["gameId"], "0209_2628_2682");
    assert_eq!(data["upcoming"][0]["venue"], "Ghazir Hall");
    assert!(data["upcoming"][0].get("gameId").is_none());
    assert_eq!(data["stats_leaders"]["ppg"][0]["player"], "Wael Arakji");
    assert_eq!(data["stats_leaders"]["apg"], Value::Array(vec![]));

    let (status, standings) = send_json(&league, Method::GET, "/api/standings").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(standings["standings"].as_array().map(Vec::len), Some(4));
    assert_eq!(standings["last_updated"], data["last_updated"]);

    let (_, stats) = send_json(&league, Method::GET, "/api/stats").await;
    assert_eq!(stats["stats_leaders"]["rpg"][0]["value"], 11.2);
}

#[tokio::test]
async fn test_game_lookup_route() {
    let league = league_serving(Ok(LEAGUE_PAGE));
    league.refresh_now().await.unwrap();

    let (status, body) = send_json(&league, Method::GET, "/api/games/0209_2628_2682").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["kind"], "result");
    assert_eq!(body["game"]["awayScore"], 80);

    let (status, body) = send_json(&league, Method::GET, "/api/games/0101_1_2").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["last_updated"].is_string());
}

#[tokio::test]
async fn test_waited_refresh_reports_failure() {
    let league = league_serving(Err(FetchCause::Status(503)));

    let (status, body) = send_json(&league, Method::POST, "/api/refresh").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("HTTP status 503"));

    let (_, status_body) = send_json(&league, Method::GET, "/api/status").await;
    assert_eq!(status_body["data_available"], false);
    assert_eq!(status_body["phase"], "idle");
    assert_eq!(status_body["refreshing"], false);
    assert_eq!(status_body["refresh"]["cycles_failed"], 1);
    assert_eq!(status_body["refresh"]["last_error"]["stage"], "fetch");
}

#[tokio::test]
async fn test_background_refresh_is_accepted() {
    let league = league_serving(Ok(LEAGUE_PAGE));

    let (status, body) = send_json(&league, Method::POST, "/api/refresh?wait=false").await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body["accepted"], true);

    tokio::time::timeout(Duration::from_secs(5), async {
        while league.get_snapshot().is_err() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("background refresh installs a snapshot");

    let (status, body) = send_json(&league, Method::GET, "/api/status").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data_available"], true);
    assert_eq!(body["refresh_interval_secs"], 300);
}

#[tokio::test]
async fn test_api_info_lists_endpoints() {
    let league = league_serving(Ok(LEAGUE_PAGE));
    let (status, body) = send_json(&league, Method::GET, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "LBL Live Data API");
    assert!(body["endpoints"]["/api/games/:id"].is_string());
}
