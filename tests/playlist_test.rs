//! Integration tests for playlist serving and URL rewriting.

mod common;

use common::TestHarness;

#[tokio::test]
async fn playlist_is_served_with_rewritten_segments() {
    let (harness, addr) = TestHarness::with_server().await;

    let url = format!("http://{}{}/videos/video1/index.m3u8", addr, harness.prefix());
    let resp = reqwest::get(&url).await.unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(
        resp.headers()["content-type"],
        "application/vnd.apple.mpegurl"
    );

    let body = resp.text().await.unwrap();
    assert!(body.contains("/api/videolist/videos/video1/index0.ts"));
    assert!(body.contains("/api/videolist/videos/video1/index1.ts"));
    assert!(body.contains("/api/videolist/videos/video1/index2.ts"));
    // Directive lines pass through untouched.
    assert!(body.contains("#EXTM3U"));
    assert!(body.contains("#EXT-X-ENDLIST"));
    // No bare segment references remain.
    assert!(!body.contains("\nindex0.ts"));
}

#[tokio::test]
async fn bare_video_path_serves_the_playlist() {
    let (harness, addr) = TestHarness::with_server().await;

    let url = format!("http://{}{}/videos/video1", addr, harness.prefix());
    let resp = reqwest::get(&url).await.unwrap();
    assert_eq!(resp.status(), 200);

    let body = resp.text().await.unwrap();
    assert!(body.starts_with("#EXTM3U"));
    assert!(body.contains("/api/videolist/videos/video1/index0.ts"));
}

#[tokio::test]
async fn playlist_has_no_cache_headers() {
    let (harness, addr) = TestHarness::with_server().await;

    let url = format!("http://{}{}/videos/video1/index.m3u8", addr, harness.prefix());
    let resp = reqwest::get(&url).await.unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(
        resp.headers()["cache-control"],
        "no-cache, no-store, must-revalidate"
    );
}

#[tokio::test]
async fn unknown_video_is_404() {
    let (harness, addr) = TestHarness::with_server().await;

    let url = format!("http://{}{}/videos/ghost/index.m3u8", addr, harness.prefix());
    let resp = reqwest::get(&url).await.unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn traversal_in_video_id_is_forbidden() {
    let (harness, addr) = TestHarness::with_server().await;

    // reqwest normalizes dot segments, so send the raw path ourselves.
    let url = format!(
        "http://{}{}/videos/%2e%2e/index.m3u8",
        addr,
        harness.prefix()
    );
    let resp = reqwest::get(&url).await.unwrap();
    assert_eq!(resp.status(), 403);
}
