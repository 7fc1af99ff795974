//! JSON metadata route handlers.
//!
//! Thin lookups over the immutable [`VideoCatalog`]; all the interesting
//! work lives in the streaming module.

use axum::extract::{Path, State};
use axum::Json;

use crate::catalog::{VideoRecord, VideoSummary};
use crate::error::Error;
use crate::server::error::AppError;
use crate::server::AppContext;

/// GET `<prefix>/` - all videos as summaries, in data-file order.
pub async fn list_videos(State(ctx): State<AppContext>) -> Json<Vec<VideoSummary>> {
    Json(ctx.catalog.summaries())
}

/// GET `<prefix>/id/{id}` - one full record, 404 when absent.
pub async fn video_by_id(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> Result<Json<VideoRecord>, AppError> {
    ctx.catalog
        .by_id(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| Error::not_found("video", &id).into())
}

/// GET `<prefix>/topic/{topic}` - all records with an exactly matching
/// topic (case-sensitive); 404 when nothing matches.
pub async fn videos_by_topic(
    State(ctx): State<AppContext>,
    Path(topic): Path<String>,
) -> Result<Json<Vec<VideoRecord>>, AppError> {
    let matches: Vec<VideoRecord> = ctx
        .catalog
        .by_topic(&topic)
        .into_iter()
        .cloned()
        .collect();

    if matches.is_empty() {
        return Err(Error::not_found("topic", &topic).into());
    }

    Ok(Json(matches))
}
