//! HTTP surface for partial-content streaming.

use std::time::Duration;

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use uuid::Uuid;

use super::plan::ChunkPlan;
use super::pump::{self, SessionBody};
use super::range::parse_range_header;
use crate::server::{AppContext, AppError};
use crate::Error;

/// Routes nested under `/videos`.
pub fn stream_router() -> Router<AppContext> {
    Router::new().route("/:video_id/stream", get(stream_video))
}

/// Serve one chunk of a published video as `206 Partial Content`.
///
/// A request without a `Range` header gets the default-sized chunk from
/// offset zero. The response is always 206 with a `Content-Range`, never a
/// plain 200, so players learn immediately that seeking is available.
async fn stream_video(
    State(ctx): State<AppContext>,
    Path(video_id): Path<String>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let asset_id = Uuid::parse_str(&video_id)
        .map_err(|_| Error::InvalidIdentifier(format!("invalid video id: {video_id}")))?;

    let asset = ctx
        .assets
        .find_asset(asset_id)
        .await?
        .filter(|a| a.is_published)
        .ok_or_else(|| Error::not_found("video", asset_id))?;

    let range = match headers.get(header::RANGE) {
        Some(value) => {
            let raw = value
                .to_str()
                .map_err(|_| Error::MalformedRange("range header is not valid text".into()))?;
            Some(parse_range_header(raw)?)
        }
        None => None,
    };

    let streaming = &ctx.config.streaming;
    let plan = ChunkPlan::plan(range, asset.content_length, streaming.chunk_size)?;

    let request = pump::transform_request(&asset, &plan, streaming.fallback_bytes_per_sec);
    let startup_timeout = Duration::from_secs(streaming.startup_timeout_secs);
    // Prime the first chunk before committing headers; a transform that
    // fails to start must surface as a 502, not a truncated 206.
    let primed = pump::pump(ctx.transform.as_ref(), &request, startup_timeout).await?;

    let session_id = ctx.sessions.register(asset_id, &plan);
    tracing::info!(
        %asset_id,
        session_id = %session_id,
        start = plan.start,
        end = plan.end,
        "streaming chunk"
    );

    let body = SessionBody::new(primed, ctx.sessions.clone(), session_id);

    let response = Response::builder()
        .status(StatusCode::PARTIAL_CONTENT)
        .header(header::CONTENT_TYPE, "video/mp4")
        .header(header::CONTENT_LENGTH, plan.content_length())
        .header(header::CONTENT_RANGE, plan.content_range())
        .header(header::ACCEPT_RANGES, "bytes")
        .body(Body::from_stream(body))
        .map_err(|e| Error::Internal(format!("failed to build response: {e}")))?;

    Ok(response)
}
