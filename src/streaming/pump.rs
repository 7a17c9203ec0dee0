//! Moves transform output into an HTTP response body.
//!
//! The pump waits for the transform's first output chunk before the caller
//! commits response headers, so a transform that dies on startup still gets
//! a proper error status instead of a truncated 206. After the first byte
//! the only remaining failure mode is aborting the connection.

use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use bytes::Bytes;
use futures::{Stream, StreamExt};

use super::plan::ChunkPlan;
use super::sessions::SessionManager;
use super::transform::{MediaTransform, TransformRequest, TransformStream};
use crate::store::MediaAsset;
use crate::{Error, Result};

/// Translate a byte-range plan into the transform's time vocabulary.
///
/// The mapping uses the asset's average bytes-per-second, falling back to
/// `fallback_bytes_per_sec` when the asset carries no usable length or
/// duration. Seek is clamped to the asset duration.
pub fn transform_request(
    asset: &MediaAsset,
    plan: &ChunkPlan,
    fallback_bytes_per_sec: u64,
) -> TransformRequest {
    let bps = asset
        .bytes_per_second()
        .unwrap_or(fallback_bytes_per_sec)
        .max(1) as f64;

    let mut seek_seconds = plan.start as f64 / bps;
    if asset.duration_seconds > 0.0 {
        seek_seconds = seek_seconds.min(asset.duration_seconds);
    }
    let duration_seconds = plan.content_length() as f64 / bps;

    TransformRequest {
        source_location: asset.source_location.clone(),
        seek_seconds,
        duration_seconds,
    }
}

/// A transform stream whose first chunk has already arrived.
pub struct PrimedStream {
    pub first: Bytes,
    pub rest: TransformStream,
}

impl std::fmt::Debug for PrimedStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrimedStream")
            .field("first", &self.first)
            .finish_non_exhaustive()
    }
}

/// Start a transform and wait for its first output chunk.
///
/// # Errors
/// [`Error::Transform`] if the process cannot be spawned, produces nothing
/// within `startup_timeout`, or exits before emitting a byte. The stderr
/// tail is folded into the message when available.
pub async fn pump(
    transform: &dyn MediaTransform,
    request: &TransformRequest,
    startup_timeout: Duration,
) -> Result<PrimedStream> {
    let mut stream = transform.start(request).await?;

    match tokio::time::timeout(startup_timeout, stream.next()).await {
        Ok(Some(Ok(first))) => Ok(PrimedStream { first, rest: stream }),
        Ok(Some(Err(e))) => Err(Error::transform(format!(
            "transform output failed before first byte: {e}"
        ))),
        Ok(None) => {
            let tail = stream.stderr_tail();
            if tail.is_empty() {
                Err(Error::transform(
                    "transform exited without producing output",
                ))
            } else {
                Err(Error::transform(format!(
                    "transform exited without producing output: {tail}"
                )))
            }
        }
        Err(_) => Err(Error::transform(format!(
            "transform produced no output within {}s",
            startup_timeout.as_secs()
        ))),
    }
}

/// Response body that tracks its session through to completion.
///
/// The first chunk is buffered from the priming step; yielding it moves the
/// session to `Streaming`. Stream end finishes the session as completed; an
/// error or dropping the body before the end finishes it as aborted.
pub struct SessionBody {
    first: Option<Bytes>,
    rest: TransformStream,
    sessions: SessionManager,
    session_id: String,
    finished: bool,
}

impl SessionBody {
    pub fn new(primed: PrimedStream, sessions: SessionManager, session_id: String) -> Self {
        Self {
            first: Some(primed.first),
            rest: primed.rest,
            sessions,
            session_id,
            finished: false,
        }
    }
}

impl Stream for SessionBody {
    type Item = std::io::Result<Bytes>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if self.finished {
            return Poll::Ready(None);
        }
        if let Some(first) = self.first.take() {
            self.sessions.mark_streaming(&self.session_id);
            return Poll::Ready(Some(Ok(first)));
        }
        match self.rest.poll_next_unpin(cx) {
            Poll::Ready(Some(Ok(chunk))) => Poll::Ready(Some(Ok(chunk))),
            Poll::Ready(Some(Err(e))) => {
                self.finished = true;
                tracing::warn!(session_id = %self.session_id, "stream failed mid-body: {e}");
                self.sessions.finish(&self.session_id, false);
                Poll::Ready(Some(Err(e)))
            }
            Poll::Ready(None) => {
                self.finished = true;
                self.sessions.finish(&self.session_id, true);
                Poll::Ready(None)
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

impl Drop for SessionBody {
    fn drop(&mut self) {
        // A body dropped before its end is a client disconnect.
        if !self.finished {
            self.sessions.finish(&self.session_id, false);
        }
    }
}
