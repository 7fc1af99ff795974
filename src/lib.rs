//! Vidserve - HLS video catalog and streaming server
//!
//! Serves a read-only catalog of video metadata as JSON and streams
//! pre-segmented HLS content (playlists + MPEG-TS chunks) with HTTP
//! range request support for seeking.

pub mod catalog;
pub mod config;
pub mod error;
pub mod server;
pub mod streaming;

pub use error::{Error, Result};
