//! HTTP server assembly: shared state, router, startup and shutdown.

pub mod auth;
pub mod error;
pub mod routes_api;

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context as _;
use axum::extract::State;
use axum::routing::get;
use axum::{middleware, Router};
use tempfile::TempDir;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::store::{AssetStore, MemoryAssetStore};
use crate::streaming::{stream_router, FfmpegTransform, MediaTransform, SessionManager};
use crate::tools;

pub use auth::Identity;
pub use error::AppError;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<Config>,
    pub assets: Arc<dyn AssetStore>,
    pub transform: Arc<dyn MediaTransform>,
    pub sessions: SessionManager,
    /// Scratch space for transform side files; cleaned up when the last
    /// context clone drops.
    pub scratch: Option<Arc<TempDir>>,
}

impl AppContext {
    pub fn new(
        config: Config,
        assets: Arc<dyn AssetStore>,
        transform: Arc<dyn MediaTransform>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            assets,
            transform,
            sessions: SessionManager::new(),
            scratch: None,
        }
    }
}

/// Build the full application router.
///
/// `/videos` and `/health` are public; `/api` sits behind the bearer-token
/// middleware.
pub fn create_router(ctx: AppContext) -> Router {
    let api = routes_api::api_router().layer(middleware::from_fn_with_state(
        ctx.clone(),
        auth::require_bearer,
    ));

    Router::new()
        .route("/health", get(health))
        .nest("/videos", stream_router())
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(ctx)
}

async fn health(State(_ctx): State<AppContext>) -> &'static str {
    "ok"
}

fn create_scratch_dir(configured: Option<&Path>) -> anyhow::Result<TempDir> {
    match configured {
        Some(base) => {
            std::fs::create_dir_all(base)
                .with_context(|| format!("failed to create scratch base {}", base.display()))?;
            TempDir::new_in(base).context("failed to create scratch directory")
        }
        None => TempDir::new().context("failed to create scratch directory"),
    }
}

/// Run the server until ctrl-c or SIGTERM.
pub async fn start_server(config: Config) -> anyhow::Result<()> {
    let ffmpeg = tools::resolve_ffmpeg(&config.tools)?;

    let scratch = create_scratch_dir(config.streaming.scratch_dir.as_deref())?;
    tracing::debug!(path = %scratch.path().display(), "scratch directory ready");

    let store = MemoryAssetStore::from_seeds(&config.assets);
    if store.is_empty() {
        tracing::warn!("no assets configured; streaming requests will all 404");
    } else {
        tracing::info!(count = store.len(), "asset catalog loaded");
    }

    let transform = FfmpegTransform::new(ffmpeg, Some(scratch.path().to_path_buf()));

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("invalid server address")?;

    let mut ctx = AppContext::new(config, Arc::new(store), Arc::new(transform));
    ctx.scratch = Some(Arc::new(scratch));

    let router = create_router(ctx);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!("listening on http://{addr}");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to install ctrl-c handler: {e}");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => tracing::error!("failed to install SIGTERM handler: {e}"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("received ctrl-c, shutting down"),
        _ = terminate => tracing::info!("received SIGTERM, shutting down"),
    }
}
