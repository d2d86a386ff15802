//! Media store download semantics.

use std::sync::Arc;

use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use vine_archive_harvester::fetch::Fetcher;
use vine_archive_harvester::media::MediaStore;
use vine_archive_harvester::rate_gate::RateGate;

fn test_fetcher() -> Fetcher {
    Fetcher::new(Arc::new(RateGate::new(10_000))).expect("build fetcher")
}

#[tokio::test]
async fn test_concurrent_downloads_issue_a_single_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/r/clip.mp4"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"clip-bytes".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let out = TempDir::new().expect("tempdir");
    let store = Arc::new(MediaStore::new(out.path().to_path_buf()));
    let fetcher = test_fetcher();
    let url = format!("{}/r/clip.mp4", server.uri());

    let mut handles = Vec::new();
    for _ in 0..8 {
        let store = Arc::clone(&store);
        let fetcher = fetcher.clone();
        let url = url.clone();
        handles.push(tokio::spawn(
            async move { store.download(&fetcher, &url).await },
        ));
    }
    for handle in handles {
        handle.await.expect("join").expect("download");
    }

    let blob = tokio::fs::read(out.path().join("r/clip.mp4"))
        .await
        .expect("read blob");
    assert_eq!(blob, b"clip-bytes");
}

#[tokio::test]
async fn test_existing_file_is_never_refetched() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/r/clip.mp4"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"fresh".to_vec()))
        .expect(0)
        .mount(&server)
        .await;

    let out = TempDir::new().expect("tempdir");
    tokio::fs::create_dir_all(out.path().join("r"))
        .await
        .expect("mkdir");
    tokio::fs::write(out.path().join("r/clip.mp4"), b"original")
        .await
        .expect("seed blob");

    let store = MediaStore::new(out.path().to_path_buf());
    let url = format!("{}/r/clip.mp4", server.uri());
    store.download(&test_fetcher(), &url).await.expect("skip");

    let blob = tokio::fs::read(out.path().join("r/clip.mp4"))
        .await
        .expect("read blob");
    assert_eq!(blob, b"original");
}

#[tokio::test]
async fn test_failed_download_surfaces_error_and_leaves_no_file() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/r/missing.mp4"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let out = TempDir::new().expect("tempdir");
    let store = MediaStore::new(out.path().to_path_buf());
    let url = format!("{}/r/missing.mp4", server.uri());

    let result = store.download(&test_fetcher(), &url).await;
    assert!(result.is_err());
    assert!(!out.path().join("r/missing.mp4").exists());
}
