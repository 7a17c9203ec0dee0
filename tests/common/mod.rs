#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use parking_lot::Mutex;
use uuid::Uuid;

use vidserve::config::Config;
use vidserve::server::{create_router, AppContext};
use vidserve::store::{MediaAsset, MemoryAssetStore};
use vidserve::streaming::{MediaTransform, TransformRequest, TransformStream};
use vidserve::{Error, Result};

/// Scripted stand-in for the ffmpeg transform.
///
/// Each started stream plays out the configured behavior; every request is
/// recorded so tests can assert on the seek/duration mapping.
pub struct ScriptedTransform {
    behavior: Behavior,
    pub requests: Arc<Mutex<Vec<TransformRequest>>>,
}

#[derive(Clone)]
pub enum Behavior {
    /// Emit these chunks, then end cleanly.
    Emit(Vec<Bytes>),
    /// Emit these chunks, then fail mid-stream.
    EmitThenError(Vec<Bytes>),
    /// Emit these chunks, then hang forever.
    EmitThenHang(Vec<Bytes>),
    /// Fail before producing anything.
    FailToStart,
    /// Produce nothing, never end.
    Hang,
}

impl ScriptedTransform {
    pub fn new(behavior: Behavior) -> Arc<Self> {
        Arc::new(Self {
            behavior,
            requests: Arc::new(Mutex::new(Vec::new())),
        })
    }
}

#[async_trait]
impl MediaTransform for ScriptedTransform {
    async fn start(&self, request: &TransformRequest) -> Result<TransformStream> {
        self.requests.lock().push(request.clone());
        match &self.behavior {
            Behavior::Emit(chunks) => {
                let chunks: Vec<std::io::Result<Bytes>> =
                    chunks.iter().cloned().map(Ok).collect();
                Ok(TransformStream::from_stream(futures::stream::iter(chunks)))
            }
            Behavior::EmitThenError(chunks) => {
                let mut items: Vec<std::io::Result<Bytes>> =
                    chunks.iter().cloned().map(Ok).collect();
                items.push(Err(std::io::Error::other("transform crashed")));
                Ok(TransformStream::from_stream(futures::stream::iter(items)))
            }
            Behavior::EmitThenHang(chunks) => {
                use futures::StreamExt;
                let chunks: Vec<std::io::Result<Bytes>> =
                    chunks.iter().cloned().map(Ok).collect();
                let stream = futures::stream::iter(chunks).chain(futures::stream::pending());
                Ok(TransformStream::from_stream(stream))
            }
            Behavior::FailToStart => Err(Error::transform("scripted startup failure")),
            Behavior::Hang => Ok(TransformStream::from_stream(futures::stream::pending())),
        }
    }
}

/// Config tuned for tests: small chunks and a short startup timeout.
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.streaming.chunk_size = 1024;
    config.streaming.startup_timeout_secs = 1;
    config.streaming.fallback_bytes_per_sec = 1000;
    config
}

/// A 100 KB published asset at 1000 bytes/sec (100 s duration).
pub fn seed_asset(store: &MemoryAssetStore, published: bool) -> Uuid {
    let id = Uuid::new_v4();
    store.insert(MediaAsset {
        id,
        title: "test clip".into(),
        source_location: "/media/test-clip.mp4".into(),
        is_published: published,
        owner_id: Uuid::nil(),
        duration_seconds: 100.0,
        content_length: Some(100_000),
        created_at: Utc::now(),
    });
    id
}

pub fn bytes_of_len(len: usize) -> Bytes {
    Bytes::from(vec![0xABu8; len])
}

/// A server running on a random local port, plus handles for assertions.
pub struct TestHarness {
    pub base_url: String,
    pub client: reqwest::Client,
    pub ctx: AppContext,
    pub store: Arc<MemoryAssetStore>,
}

impl TestHarness {
    pub async fn start(config: Config, transform: Arc<dyn MediaTransform>) -> Self {
        let store = Arc::new(MemoryAssetStore::new());
        let ctx = AppContext::new(config, store.clone(), transform);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind test listener");
        let addr = listener.local_addr().expect("local addr");
        let router = create_router(ctx.clone());
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("test server");
        });

        Self {
            base_url: format!("http://{addr}"),
            client: reqwest::Client::new(),
            ctx,
            store,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}
