//! External media transform invocation.
//!
//! Every request spawns one fresh transform process (no pooling, no reuse);
//! its stdout is exposed as an async byte stream and the process is killed
//! when the stream is dropped, so a client disconnect can never leave an
//! orphan behind.

use std::path::PathBuf;
use std::pin::Pin;
use std::process::Stdio;
use std::sync::Arc;
use std::task::{Context, Poll};

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;
use futures::{Stream, StreamExt};
use parking_lot::Mutex;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, Command};
use tokio_util::io::ReaderStream;

use crate::{Error, Result};

/// Read size for forwarding process output. Matches the chunked file-serving
/// read size used elsewhere; keeps memory bounded under backpressure.
const STDOUT_BUF_SIZE: usize = 64 * 1024;

/// Cap on retained stderr output used for failure diagnostics.
const STDERR_TAIL_LIMIT: usize = 4096;

/// What the pump asks the transform to produce: a bounded slice of the
/// source, expressed in the tool's time vocabulary.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformRequest {
    /// URI or path of the source media.
    pub source_location: String,
    /// Seek position. Derived from a byte offset via average bitrate, so it
    /// is approximate, not frame-accurate.
    pub seek_seconds: f64,
    /// Output duration bound.
    pub duration_seconds: f64,
}

/// Spawns one transform per request and hands back its output stream.
#[async_trait]
pub trait MediaTransform: Send + Sync {
    /// Start a transform for the given request.
    ///
    /// # Errors
    /// [`Error::Transform`] if the process cannot be spawned.
    async fn start(&self, request: &TransformRequest) -> Result<TransformStream>;
}

/// Owns the child process for the lifetime of its output stream.
///
/// The drop path is the disconnect path: when the HTTP response body is
/// dropped, this guard goes with it and the child is killed.
struct ProcessGuard {
    child: Child,
}

impl Drop for ProcessGuard {
    fn drop(&mut self) {
        match self.child.try_wait() {
            Ok(Some(status)) => {
                tracing::trace!(%status, "transform process already exited");
            }
            _ => {
                if let Err(e) = self.child.start_kill() {
                    tracing::debug!("failed to signal transform process: {e}");
                } else {
                    tracing::debug!(pid = ?self.child.id(), "terminated transform process");
                }
            }
        }
    }
}

/// A finite, non-restartable stream of transform output bytes.
pub struct TransformStream {
    stream: BoxStream<'static, std::io::Result<Bytes>>,
    pid: Option<u32>,
    stderr_tail: Option<Arc<Mutex<String>>>,
    _guard: Option<ProcessGuard>,
}

impl TransformStream {
    /// Spawn `command` with piped stdio and wrap its stdout.
    ///
    /// The child is configured with `kill_on_drop`; stderr is drained in a
    /// background task (logged at debug, tail retained for diagnostics).
    pub fn spawn(mut command: Command, label: &str) -> Result<Self> {
        command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = command
            .spawn()
            .map_err(|e| Error::transform(format!("failed to spawn {label}: {e}")))?;
        let pid = child.id();

        let stderr_tail = Arc::new(Mutex::new(String::new()));
        if let Some(stderr) = child.stderr.take() {
            let tail = Arc::clone(&stderr_tail);
            let label = label.to_string();
            tokio::spawn(async move {
                let mut lines = BufReader::new(stderr).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    tracing::debug!(tool = %label, "{line}");
                    let mut tail = tail.lock();
                    if tail.len() < STDERR_TAIL_LIMIT {
                        if !tail.is_empty() {
                            tail.push('\n');
                        }
                        tail.push_str(&line);
                    }
                }
            });
        }

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| Error::Internal("child stdout was not captured".into()))?;
        let stream = ReaderStream::with_capacity(stdout, STDOUT_BUF_SIZE);

        Ok(Self {
            stream: stream.boxed(),
            pid,
            stderr_tail: Some(stderr_tail),
            _guard: Some(ProcessGuard { child }),
        })
    }

    /// Wrap an arbitrary byte stream with no backing process.
    ///
    /// Used by transform implementations that do not shell out (tests,
    /// simulations).
    pub fn from_stream<S>(stream: S) -> Self
    where
        S: Stream<Item = std::io::Result<Bytes>> + Send + 'static,
    {
        Self {
            stream: stream.boxed(),
            pid: None,
            stderr_tail: None,
            _guard: None,
        }
    }

    /// OS process id of the backing transform, if there is one.
    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    /// Retained tail of the process's stderr, for failure messages.
    pub fn stderr_tail(&self) -> String {
        self.stderr_tail
            .as_ref()
            .map(|t| t.lock().clone())
            .unwrap_or_default()
    }
}

impl Stream for TransformStream {
    type Item = std::io::Result<Bytes>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.stream.as_mut().poll_next(cx)
    }
}

/// Production transform backed by the ffmpeg binary.
///
/// The invocation stream-copies codecs (no re-encode) and emits a fragmented
/// MP4 layout so playback can begin before the chunk completes.
pub struct FfmpegTransform {
    program: PathBuf,
    scratch_dir: Option<PathBuf>,
}

impl FfmpegTransform {
    /// Create a transform using the given ffmpeg binary. `scratch_dir`, when
    /// set, becomes the child's working directory so any tool side files
    /// land in managed scratch space.
    pub fn new(program: PathBuf, scratch_dir: Option<PathBuf>) -> Self {
        Self {
            program,
            scratch_dir,
        }
    }

    fn build_args(request: &TransformRequest) -> Vec<String> {
        vec![
            "-nostdin".to_string(),
            "-hide_banner".to_string(),
            "-loglevel".to_string(),
            "error".to_string(),
            // Input seeking: fast, keyframe-aligned.
            "-ss".to_string(),
            format!("{:.3}", request.seek_seconds),
            "-i".to_string(),
            request.source_location.clone(),
            "-t".to_string(),
            format!("{:.3}", request.duration_seconds),
            // Stream copy; the container is re-packaged, not re-encoded.
            "-c".to_string(),
            "copy".to_string(),
            // Fragmented MP4 so headers precede the media data.
            "-movflags".to_string(),
            "frag_keyframe+empty_moov+default_base_moof".to_string(),
            "-f".to_string(),
            "mp4".to_string(),
            "pipe:1".to_string(),
        ]
    }
}

#[async_trait]
impl MediaTransform for FfmpegTransform {
    async fn start(&self, request: &TransformRequest) -> Result<TransformStream> {
        let args = Self::build_args(request);
        tracing::debug!(
            source = %request.source_location,
            seek = request.seek_seconds,
            duration = request.duration_seconds,
            "starting ffmpeg transform"
        );

        let mut command = Command::new(&self.program);
        command.args(&args);
        if let Some(ref dir) = self.scratch_dir {
            command.current_dir(dir);
        }

        TransformStream::spawn(command, "ffmpeg")
    }
}
