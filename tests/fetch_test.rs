//! HTTP fetcher behavior against a mock server.

use std::sync::Arc;

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use vine_archive_harvester::fetch::{FetchError, Fetcher};
use vine_archive_harvester::rate_gate::RateGate;

fn test_fetcher() -> Fetcher {
    Fetcher::new(Arc::new(RateGate::new(10_000))).expect("build fetcher")
}

#[tokio::test]
async fn test_fetch_json_decodes_object_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/posts/abc.json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(r#"{"postIdStr":"77","nested":{"n":1}}"#, "application/json"),
        )
        .mount(&server)
        .await;

    let record = test_fetcher()
        .fetch_json(&format!("{}/posts/abc.json", server.uri()))
        .await
        .expect("fetch");

    assert_eq!(record["postIdStr"], "77");
    assert_eq!(record["nested"]["n"], 1);
}

#[tokio::test]
async fn test_fetch_json_reports_non_200_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/posts/gone.json"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = test_fetcher()
        .fetch_json(&format!("{}/posts/gone.json", server.uri()))
        .await
        .expect_err("should fail");

    match err {
        FetchError::Status { status, .. } => assert_eq!(status.as_u16(), 404),
        other => panic!("expected status error, got {other}"),
    }
}

#[tokio::test]
async fn test_fetch_json_reports_malformed_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/posts/bad.json"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("not json {", "application/json"))
        .mount(&server)
        .await;

    let err = test_fetcher()
        .fetch_json(&format!("{}/posts/bad.json", server.uri()))
        .await
        .expect_err("should fail");

    assert!(matches!(err, FetchError::Decode { .. }));
}

#[tokio::test]
async fn test_fetch_json_rejects_non_object_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/posts/list.json"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("[1,2,3]", "application/json"))
        .mount(&server)
        .await;

    let err = test_fetcher()
        .fetch_json(&format!("{}/posts/list.json", server.uri()))
        .await
        .expect_err("should fail");

    assert!(matches!(err, FetchError::Decode { .. }));
}

#[tokio::test]
async fn test_get_media_reports_non_200_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/r/clip.mp4"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let err = test_fetcher()
        .get_media(&format!("{}/r/clip.mp4", server.uri()))
        .await
        .expect_err("should fail");

    assert!(matches!(err, FetchError::Status { .. }));
}

#[tokio::test]
async fn test_get_media_streams_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/r/clip.mp4"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"clip-bytes".to_vec()))
        .mount(&server)
        .await;

    let mut response = test_fetcher()
        .get_media(&format!("{}/r/clip.mp4", server.uri()))
        .await
        .expect("fetch");

    let mut body = Vec::new();
    while let Some(chunk) = response.chunk().await.expect("read chunk") {
        body.extend_from_slice(&chunk);
    }
    assert_eq!(body, b"clip-bytes");
}
