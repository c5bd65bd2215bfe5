// Metrics live in the global registry, so this binary holds a single test

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use clap::Parser;
use http_body_util::BodyExt;
use serde_json::json;
use std::sync::Arc;
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use weather_proxy::config::Config;
use weather_proxy::state::AppState;

async fn get(app: &Router, uri: &str, client: &str) -> (StatusCode, String) {
    let request = Request::builder()
        .uri(uri)
        .header("x-forwarded-for", client)
        .body(Body::empty())
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

#[tokio::test]
async fn gauges_and_latency_track_live_traffic() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"temp": 20})))
        .mount(&upstream)
        .await;
    Mock::given(method("GET"))
        .and(path("/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&upstream)
        .await;

    let uri = upstream.uri();
    let config = Config::try_parse_from([
        "weather-proxy",
        "--api-key",
        "test-key",
        "--upstream-url",
        uri.as_str(),
    ])
    .unwrap();
    let app = weather_proxy::app(Arc::new(AppState::new(&config).unwrap()));

    let (status, _) = get(&app, "/weather?city=Oslo&lang=no", "192.0.2.1").await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = get(&app, "/forecast?city=Oslo&lang=no", "192.0.2.2").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    get(&app, "/health", "192.0.2.3").await;

    // entry count is current without waiting for the purge sweep
    let (status, body) = get(&app, "/metrics", "192.0.2.3").await;
    assert_eq!(status, StatusCode::OK);
    assert!(
        body.contains("weather_proxy_rate_limiter_entries 3"),
        "{}",
        body
    );

    // both calls are timed, including the one whose body failed to decode
    assert!(
        body.contains("weather_proxy_upstream_latency_seconds_count 2"),
        "{}",
        body
    );
}
