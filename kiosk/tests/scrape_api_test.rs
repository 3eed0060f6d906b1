use axum::body::Body;
use axum::http::{Request, StatusCode};
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use kiosk::api::{create_router, AppState};
use kiosk::config::Config;

const PAGE: &str = r#"<!doctype html>
<html>
  <head>
    <title>Fixture Page</title>
    <meta name="description" content="A page served by the mock.">
  </head>
  <body>
    <h1>Hello</h1>
    <a href="/first">first link</a>
    <a href="https://example.org/second">second link</a>
  </body>
</html>"#;

fn test_state() -> AppState {
    let mut config = Config::default();
    config.text_api.base_url = "http://127.0.0.1:9".to_string();
    AppState::new(config).unwrap()
}

fn encoded(url: &str) -> String {
    url::form_urlencoded::byte_serialize(url.as_bytes()).collect()
}

async fn get_json(app: axum::Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn scrape_extracts_page_summary() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/page"))
        .respond_with(ResponseTemplate::new(200).set_body_string(PAGE))
        .mount(&server)
        .await;

    let target = format!("{}/page", server.uri());
    let uri = format!("/api/v1/scrape?url={}", encoded(&target));

    let (status, body) = get_json(create_router(test_state()), &uri).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["url"], target);
    assert_eq!(body["title"], "Fixture Page");
    assert_eq!(body["meta_description"], "A page served by the mock.");
    assert_eq!(body["h1_tags"][0], "Hello");
    assert_eq!(body["links"].as_array().unwrap().len(), 2);
    assert_eq!(body["links"][0]["href"], "/first");
    assert_eq!(body["links"][0]["text"], "first link");
}

#[tokio::test]
async fn scrape_of_failing_site_is_bad_gateway() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let target = format!("{}/missing", server.uri());
    let uri = format!("/api/v1/scrape?url={}", encoded(&target));

    let (status, body) = get_json(create_router(test_state()), &uri).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn scrape_of_malformed_url_is_bad_request() {
    let uri = format!("/api/v1/scrape?url={}", encoded("not a url"));
    let (status, _) = get_json(create_router(test_state()), &uri).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
