//! Shared test harness for integration tests.
//!
//! Provides [`TestHarness`] which creates a temporary media directory with a
//! fixture video, an in-memory catalog, and the full router. The
//! [`with_server`] constructor starts Axum on a random port for HTTP-level
//! testing.

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use tempfile::TempDir;

use vidserve::catalog::{VideoCatalog, VideoRecord};
use vidserve::config::Config;
use vidserve::server::{build_router, AppContext};

/// A 1000-byte segment body with a recognizable pattern, so range tests can
/// assert on exact slices.
pub fn segment_bytes() -> Vec<u8> {
    (0..1000u16).map(|i| (i % 256) as u8).collect()
}

pub const PLAYLIST_FIXTURE: &str = "#EXTM3U\n\
#EXT-X-VERSION:3\n\
#EXT-X-TARGETDURATION:10\n\
#EXT-X-MEDIA-SEQUENCE:0\n\
#EXTINF:10.0,\n\
index0.ts\n\
#EXTINF:10.0,\n\
index1.ts\n\
#EXTINF:4.2,\n\
index2.ts\n\
#EXT-X-ENDLIST\n";

fn fixture_records() -> Vec<VideoRecord> {
    vec![
        VideoRecord {
            id: "video1".to_string(),
            topic: "rust".to_string(),
            description: "Ownership and borrowing".to_string(),
            duration: 24.2,
            thumbnail: "/thumbnails/video1.png".to_string(),
            url: None,
        },
        VideoRecord {
            id: "video2".to_string(),
            topic: "rust".to_string(),
            description: "Lifetimes in practice".to_string(),
            duration: 31.0,
            thumbnail: "/thumbnails/video2.png".to_string(),
            url: None,
        },
        VideoRecord {
            id: "video3".to_string(),
            topic: "networking".to_string(),
            description: "TCP from the ground up".to_string(),
            duration: 18.5,
            thumbnail: "/thumbnails/video3.png".to_string(),
            url: None,
        },
    ]
}

/// Test harness owning the temporary media root and the app context.
pub struct TestHarness {
    pub ctx: AppContext,
    // Held so the media directory outlives the harness.
    #[allow(dead_code)]
    pub media_dir: TempDir,
}

impl TestHarness {
    /// Create a new harness with a fixture video on disk and default config
    /// pointed at it.
    pub fn new() -> Self {
        let media_dir = TempDir::new().expect("failed to create media dir");
        populate_video(media_dir.path(), "video1");

        let mut config = Config::default();
        config.media.root = media_dir.path().to_path_buf();

        let catalog = VideoCatalog::from_records(fixture_records());

        let ctx = AppContext {
            config: Arc::new(config),
            catalog: Arc::new(catalog),
        };

        Self { ctx, media_dir }
    }

    /// Start an Axum server on a random port and return the harness together
    /// with the bound socket address.
    pub async fn with_server() -> (Self, SocketAddr) {
        let harness = Self::new();
        let app = build_router(harness.ctx.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind random port");
        let addr = listener.local_addr().expect("failed to get local addr");

        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        (harness, addr)
    }

    /// API prefix from the harness config, e.g. `/api/videolist`.
    pub fn prefix(&self) -> &str {
        &self.ctx.config.media.api_prefix
    }
}

fn populate_video(root: &Path, id: &str) {
    let dir = root.join(id);
    std::fs::create_dir_all(&dir).expect("failed to create video dir");
    std::fs::write(dir.join("index.m3u8"), PLAYLIST_FIXTURE).expect("failed to write playlist");
    for n in 0..3 {
        std::fs::write(dir.join(format!("index{n}.ts")), segment_bytes())
            .expect("failed to write segment");
    }
}
