//! Partial-content video streaming.
//!
//! Request handling is split into three stages: the range parser turns a
//! `Range` header into a validated byte interval, the chunk planner bounds
//! it to a concrete window, and the pump drives a per-request media
//! transform whose output becomes the response body. Sessions track each
//! in-flight chunk from header commit to completion or abort.

pub mod plan;
pub mod pump;
pub mod range;
pub mod serve;
pub mod sessions;
pub mod transform;

pub use plan::ChunkPlan;
pub use range::RangeSpec;
pub use serve::stream_router;
pub use sessions::{SessionManager, SessionState, StreamSession};
pub use transform::{FfmpegTransform, MediaTransform, TransformRequest, TransformStream};
