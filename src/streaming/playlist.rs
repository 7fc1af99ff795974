//! HLS playlist serving with URL rewriting.
//!
//! Playlists on disk reference their segments by bare filename
//! (`index0.ts`). Players fetch segments over the network, so every local
//! reference is rewritten to an absolute API path before the playlist is
//! sent. Directive and comment lines pass through byte-for-byte.

use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::error::Error;
use crate::server::error::AppError;
use crate::server::AppContext;
use crate::streaming::path_guard;
use crate::streaming::PLAYLIST_CONTENT_TYPE;

const PLAYLIST_FILE: &str = "index.m3u8";

/// GET `<prefix>/videos/{video_id}/index.m3u8` (and the extensionless alias
/// `<prefix>/videos/{video_id}`).
pub async fn serve_playlist(
    State(ctx): State<AppContext>,
    Path(video_id): Path<String>,
) -> Result<Response, AppError> {
    if video_id.trim().is_empty() {
        return Err(Error::Validation("video id required".into()).into());
    }

    let path = path_guard::resolve_under_root(&ctx.config.media.root, &[&video_id, PLAYLIST_FILE])
        .await
        .map_err(|e| match e {
            // The playlist names the video; report the friendlier entity.
            Error::NotFound { .. } => Error::not_found("video", &video_id),
            other => other,
        })?;

    let content = tokio::fs::read_to_string(&path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::not_found("video", &video_id)
        } else {
            tracing::error!("Failed to read playlist for {video_id}: {e}");
            Error::from(e)
        }
    })?;

    let rewritten = rewrite_playlist(&content, &ctx.config.media.api_prefix, &video_id);

    tracing::debug!("Serving playlist for {video_id}");

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE.as_str(), PLAYLIST_CONTENT_TYPE.to_string()),
            (
                header::CACHE_CONTROL.as_str(),
                "no-cache, no-store, must-revalidate".to_string(),
            ),
            (header::PRAGMA.as_str(), "no-cache".to_string()),
            (header::EXPIRES.as_str(), "0".to_string()),
            (header::CONTENT_LENGTH.as_str(), rewritten.len().to_string()),
        ],
        rewritten,
    )
        .into_response())
}

/// Rewrite bare segment and nested-playlist references to absolute API
/// paths. All other lines pass through unchanged, so the transform is
/// idempotent on already-rewritten playlists.
pub fn rewrite_playlist(content: &str, api_prefix: &str, video_id: &str) -> String {
    let mut out = String::with_capacity(content.len() + 64);
    for (i, line) in content.split('\n').enumerate() {
        if i > 0 {
            out.push('\n');
        }
        // Match against the line sans trailing CR, but keep the CR on output.
        let (body, has_cr) = match line.strip_suffix('\r') {
            Some(stripped) => (stripped, true),
            None => (line, false),
        };
        if is_segment_ref(body) || is_nested_playlist_ref(body) {
            out.push_str(api_prefix);
            out.push_str("/videos/");
            out.push_str(video_id);
            out.push('/');
            out.push_str(body);
            if has_cr {
                out.push('\r');
            }
        } else {
            out.push_str(line);
        }
    }
    out
}

/// Whole line is `indexN.ts` with N one or more ASCII digits.
fn is_segment_ref(line: &str) -> bool {
    line.strip_prefix("index")
        .and_then(|rest| rest.strip_suffix(".ts"))
        .is_some_and(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()))
}

/// Whole line is `<stem>.m3u8` with a non-empty word/hyphen stem.
fn is_nested_playlist_ref(line: &str) -> bool {
    line.strip_suffix(".m3u8").is_some_and(|stem| {
        !stem.is_empty()
            && stem
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
    })
}
