//! In-memory video metadata catalog.
//!
//! Records are loaded once from a JSON data file at startup and stay
//! immutable for the process lifetime, so lookups need no locking. Handlers
//! share the catalog behind an `Arc`.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A single video metadata record from the data file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoRecord {
    /// Unique identifier; also names the asset directory under the media root.
    pub id: String,
    /// Category used for topic filtering.
    pub topic: String,
    pub description: String,
    /// Length in seconds.
    pub duration: f64,
    /// Thumbnail image reference (filename or URL).
    pub thumbnail: String,
    /// Optional streaming URL override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Projection of [`VideoRecord`] returned by the list endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoSummary {
    pub id: String,
    pub topic: String,
    pub thumbnail: String,
}

impl From<&VideoRecord> for VideoSummary {
    fn from(record: &VideoRecord) -> Self {
        Self {
            id: record.id.clone(),
            topic: record.topic.clone(),
            thumbnail: record.thumbnail.clone(),
        }
    }
}

/// Read-only collection of video records in data-file order.
#[derive(Debug, Clone, Default)]
pub struct VideoCatalog {
    videos: Vec<VideoRecord>,
}

impl VideoCatalog {
    /// Load the catalog from a JSON data file.
    ///
    /// # Errors
    /// - [`Error::NotFound`] - data file missing
    /// - [`Error::Validation`] - data file is not a JSON array of records
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::not_found("catalog data file", path.display())
            } else {
                Error::from(e)
            }
        })?;

        let videos: Vec<VideoRecord> = serde_json::from_str(&content)
            .map_err(|e| Error::Validation(format!("catalog parse error: {e}")))?;

        tracing::info!("Loaded {} video records", videos.len());
        Ok(Self { videos })
    }

    /// Build a catalog from records already in memory.
    pub fn from_records(videos: Vec<VideoRecord>) -> Self {
        Self { videos }
    }

    /// All records projected to summaries, in load order.
    pub fn summaries(&self) -> Vec<VideoSummary> {
        self.videos.iter().map(VideoSummary::from).collect()
    }

    /// Look up a single record by id.
    pub fn by_id(&self, id: &str) -> Option<&VideoRecord> {
        self.videos.iter().find(|v| v.id == id)
    }

    /// All records with an exactly matching topic (case-sensitive).
    ///
    /// Returns an empty vec when nothing matches; the caller decides how to
    /// surface that.
    pub fn by_topic(&self, topic: &str) -> Vec<&VideoRecord> {
        self.videos.iter().filter(|v| v.topic == topic).collect()
    }

    pub fn len(&self) -> usize {
        self.videos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.videos.is_empty()
    }
}
