//! HLS streaming module.
//!
//! Serves playlists (with segment references rewritten to absolute API
//! paths) and media segments (with HTTP range support) from the configured
//! media root. Every filesystem access goes through the path guard.
//!
//! # Routes
//!
//! Mounted under `<api_prefix>/videos`:
//! - `GET /{video_id}/index.m3u8` - rewritten playlist
//! - `GET /{video_id}` - extensionless playlist alias
//! - `GET /{video_id}/{file_name}` - segment or nested playlist file

pub mod path_guard;
mod playlist;
mod segments;

pub use playlist::{rewrite_playlist, serve_playlist};
pub use segments::{parse_range, segment_content_type, serve_segment, RangeError, RangeSpec};

use axum::routing::get;
use axum::Router;

use crate::server::AppContext;

/// Content-Type for HLS playlists.
pub const PLAYLIST_CONTENT_TYPE: &str = "application/vnd.apple.mpegurl";

/// Create the streaming router, mounted under `<api_prefix>/videos`.
///
/// The static `index.m3u8` route takes priority over the `{file_name}`
/// capture, so both can coexist.
pub fn videos_router() -> Router<AppContext> {
    Router::new()
        .route("/{video_id}", get(serve_playlist))
        .route("/{video_id}/index.m3u8", get(serve_playlist))
        .route("/{video_id}/{file_name}", get(serve_segment))
}
