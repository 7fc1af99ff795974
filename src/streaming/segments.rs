//! Media segment serving with HTTP range request support.
//!
//! Serves individual playlist and transport-stream files with chunked
//! streaming via `ReaderStream`, so memory stays bounded regardless of
//! segment size. Range requests get 206 Partial Content responses for
//! player seeking.

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio_util::io::ReaderStream;

use crate::error::Error;
use crate::server::error::AppError;
use crate::server::AppContext;
use crate::streaming::path_guard;
use crate::streaming::PLAYLIST_CONTENT_TYPE;

/// Read chunk size for streaming bodies.
const STREAM_CHUNK_SIZE: usize = 64 * 1024;

/// An inclusive byte span within a file, derived from a Range header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeSpec {
    pub start: u64,
    pub end: u64,
}

impl RangeSpec {
    /// Number of bytes covered by the span.
    pub fn length(&self) -> u64 {
        self.end - self.start + 1
    }
}

/// Errors from interpreting a Range header against a concrete file size.
#[derive(Debug, thiserror::Error)]
pub enum RangeError {
    /// Start lies at or past EOF, or start exceeds end.
    #[error("range not satisfiable for file of {file_size} bytes")]
    Unsatisfiable { file_size: u64 },
}

/// Interpret a `Range: bytes=<start>-[<end>]` header against `file_size`.
///
/// Returns `Ok(None)` for a missing or syntactically foreign header (the
/// request is then served as a full 200). An explicit end past EOF is
/// clamped to the last byte per RFC 7233; a start at or past EOF is
/// rejected.
///
/// # Errors
/// [`RangeError::Unsatisfiable`] - `start >= file_size` or `start > end`
pub fn parse_range(value: Option<&str>, file_size: u64) -> Result<Option<RangeSpec>, RangeError> {
    let Some(value) = value else {
        return Ok(None);
    };
    let Some(spec) = value.strip_prefix("bytes=") else {
        return Ok(None);
    };
    let Some((start_str, end_str)) = spec.split_once('-') else {
        return Ok(None);
    };

    let Ok(start) = start_str.trim().parse::<u64>() else {
        return Ok(None);
    };
    let end = if end_str.trim().is_empty() {
        file_size.saturating_sub(1)
    } else {
        let Ok(end) = end_str.trim().parse::<u64>() else {
            return Ok(None);
        };
        end.min(file_size.saturating_sub(1))
    };

    if start >= file_size || start > end {
        return Err(RangeError::Unsatisfiable { file_size });
    }

    Ok(Some(RangeSpec { start, end }))
}

/// GET `<prefix>/videos/{video_id}/{file_name}`
///
/// Streams one playlist or transport-stream file with range support.
pub async fn serve_segment(
    State(ctx): State<AppContext>,
    Path((video_id, file_name)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    if video_id.trim().is_empty() || file_name.trim().is_empty() {
        return Err(Error::Validation("video id and file name required".into()).into());
    }

    let path =
        path_guard::resolve_under_root(&ctx.config.media.root, &[&video_id, &file_name]).await?;

    let metadata = tokio::fs::metadata(&path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            AppError::from(Error::not_found("file", &file_name))
        } else {
            tracing::error!("Failed to stat {video_id}/{file_name}: {e}");
            AppError::from(Error::from(e))
        }
    })?;
    let file_size = metadata.len();

    let content_type = segment_content_type(&file_name);
    let range_header = headers.get(header::RANGE).and_then(|v| v.to_str().ok());

    let range = match parse_range(range_header, file_size) {
        Ok(range) => range,
        Err(RangeError::Unsatisfiable { .. }) => {
            tracing::debug!(
                "Unsatisfiable range {:?} for {video_id}/{file_name} ({file_size} bytes)",
                range_header
            );
            return Ok((
                StatusCode::RANGE_NOT_SATISFIABLE,
                [
                    (header::CONTENT_TYPE.as_str(), content_type.to_string()),
                    (
                        header::CONTENT_RANGE.as_str(),
                        format!("bytes */{file_size}"),
                    ),
                    (header::ACCEPT_RANGES.as_str(), "bytes".to_string()),
                    (
                        header::CACHE_CONTROL.as_str(),
                        "no-cache, no-store, must-revalidate".to_string(),
                    ),
                    (header::PRAGMA.as_str(), "no-cache".to_string()),
                    (header::EXPIRES.as_str(), "0".to_string()),
                ],
                Body::empty(),
            )
                .into_response());
        }
    };

    match range {
        Some(spec) => {
            let length = spec.length();

            let mut file = open_checked(&path, &video_id, &file_name).await?;
            file.seek(std::io::SeekFrom::Start(spec.start))
                .await
                .map_err(|e| Error::Internal(format!("seek failed: {e}")))?;

            // Take limits reads to exactly `length` bytes.
            let stream = ReaderStream::with_capacity(file.take(length), STREAM_CHUNK_SIZE);

            tracing::debug!(
                "Serving bytes {}-{}/{file_size} of {video_id}/{file_name}",
                spec.start,
                spec.end
            );

            Ok((
                StatusCode::PARTIAL_CONTENT,
                [
                    (header::CONTENT_TYPE.as_str(), content_type.to_string()),
                    (
                        header::CONTENT_RANGE.as_str(),
                        format!("bytes {}-{}/{file_size}", spec.start, spec.end),
                    ),
                    (header::CONTENT_LENGTH.as_str(), length.to_string()),
                    (header::ACCEPT_RANGES.as_str(), "bytes".to_string()),
                    (
                        header::CACHE_CONTROL.as_str(),
                        "no-cache, no-store, must-revalidate".to_string(),
                    ),
                    (header::PRAGMA.as_str(), "no-cache".to_string()),
                    (header::EXPIRES.as_str(), "0".to_string()),
                ],
                Body::from_stream(stream),
            )
                .into_response())
        }
        None => {
            let file = open_checked(&path, &video_id, &file_name).await?;
            let stream = ReaderStream::with_capacity(file, STREAM_CHUNK_SIZE);

            tracing::debug!("Serving full {video_id}/{file_name} ({file_size} bytes)");

            Ok((
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE.as_str(), content_type.to_string()),
                    (header::CONTENT_LENGTH.as_str(), file_size.to_string()),
                    (header::ACCEPT_RANGES.as_str(), "bytes".to_string()),
                    (
                        header::CACHE_CONTROL.as_str(),
                        "no-cache, no-store, must-revalidate".to_string(),
                    ),
                    (header::PRAGMA.as_str(), "no-cache".to_string()),
                    (header::EXPIRES.as_str(), "0".to_string()),
                ],
                Body::from_stream(stream),
            )
                .into_response())
        }
    }
}

/// Open a file that already passed the path guard, mapping a vanished file
/// to NotFound rather than Internal.
async fn open_checked(
    path: &std::path::Path,
    video_id: &str,
    file_name: &str,
) -> Result<tokio::fs::File, AppError> {
    tokio::fs::File::open(path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            AppError::from(Error::not_found("file", file_name))
        } else {
            tracing::error!("Failed to open {video_id}/{file_name}: {e}");
            AppError::from(Error::from(e))
        }
    })
}

/// Content type by file extension.
pub fn segment_content_type(file_name: &str) -> &'static str {
    if file_name.ends_with(".ts") {
        "video/mp2t"
    } else if file_name.ends_with(".m3u8") {
        PLAYLIST_CONTENT_TYPE
    } else {
        "application/octet-stream"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_range_closed() {
        let spec = parse_range(Some("bytes=0-99"), 1000).unwrap().unwrap();
        assert_eq!(spec, RangeSpec { start: 0, end: 99 });
        assert_eq!(spec.length(), 100);
    }

    #[test]
    fn parse_range_open_end_defaults_to_last_byte() {
        let spec = parse_range(Some("bytes=500-"), 1000).unwrap().unwrap();
        assert_eq!(spec, RangeSpec { start: 500, end: 999 });
    }

    #[test]
    fn parse_range_absent_header() {
        assert!(parse_range(None, 1000).unwrap().is_none());
    }

    #[test]
    fn parse_range_foreign_syntax_serves_full_file() {
        assert!(parse_range(Some("items=0-10"), 1000).unwrap().is_none());
        assert!(parse_range(Some("bytes=abc-def"), 1000).unwrap().is_none());
        assert!(parse_range(Some("bytes=10"), 1000).unwrap().is_none());
    }

    #[test]
    fn parse_range_start_past_eof_unsatisfiable() {
        assert!(parse_range(Some("bytes=1000-"), 1000).is_err());
        assert!(parse_range(Some("bytes=5000-6000"), 1000).is_err());
    }

    #[test]
    fn parse_range_inverted_unsatisfiable() {
        assert!(parse_range(Some("bytes=200-100"), 1000).is_err());
    }

    #[test]
    fn parse_range_end_past_eof_is_clamped() {
        let spec = parse_range(Some("bytes=0-5000"), 1000).unwrap().unwrap();
        assert_eq!(spec, RangeSpec { start: 0, end: 999 });
    }

    #[test]
    fn parse_range_empty_file_unsatisfiable() {
        assert!(parse_range(Some("bytes=0-"), 0).is_err());
    }

    #[test]
    fn content_types() {
        assert_eq!(segment_content_type("index0.ts"), "video/mp2t");
        assert_eq!(
            segment_content_type("index.m3u8"),
            "application/vnd.apple.mpegurl"
        );
        assert_eq!(segment_content_type("poster.jpg"), "application/octet-stream");
    }
}
