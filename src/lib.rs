//! vidserve - partial-content video streaming server.
//!
//! Serves byte-range chunks of published video assets over HTTP by piping the
//! output of a per-request ffmpeg pass-through (approximate seek, bounded
//! duration, fragmented MP4) straight to the client.
//!
//! This library crate exposes the core functionality for integration testing.

pub mod config;
pub mod error;
pub mod server;
pub mod store;
pub mod streaming;
pub mod tools;

pub use error::{Error, Result};
