//! Management API: asset catalog and live session listing.

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use serde_json::{json, Value};
use uuid::Uuid;

use super::{AppContext, AppError};
use crate::store::MediaAsset;
use crate::streaming::StreamSession;
use crate::Error;

pub fn api_router() -> Router<AppContext> {
    Router::new()
        .route("/assets", get(list_assets))
        .route("/assets/:asset_id", get(get_asset))
        .route("/sessions", get(list_sessions))
}

fn envelope<T: Serialize>(message: &str, data: T) -> Json<Value> {
    Json(json!({
        "success": true,
        "message": message,
        "data": data,
    }))
}

#[derive(Serialize)]
struct AssetDto {
    id: Uuid,
    title: String,
    is_published: bool,
    duration_seconds: f64,
    content_length: Option<u64>,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl From<MediaAsset> for AssetDto {
    fn from(asset: MediaAsset) -> Self {
        Self {
            id: asset.id,
            title: asset.title,
            is_published: asset.is_published,
            duration_seconds: asset.duration_seconds,
            content_length: asset.content_length,
            created_at: asset.created_at,
        }
    }
}

async fn list_assets(State(ctx): State<AppContext>) -> Result<Json<Value>, AppError> {
    let assets: Vec<AssetDto> = ctx
        .assets
        .list_assets()
        .await?
        .into_iter()
        .map(AssetDto::from)
        .collect();
    Ok(envelope("assets fetched", assets))
}

async fn get_asset(
    State(ctx): State<AppContext>,
    Path(asset_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let id = Uuid::parse_str(&asset_id)
        .map_err(|_| Error::InvalidIdentifier(format!("invalid asset id: {asset_id}")))?;
    let asset = ctx
        .assets
        .find_asset(id)
        .await?
        .ok_or_else(|| Error::not_found("asset", id))?;
    Ok(envelope("asset fetched", AssetDto::from(asset)))
}

async fn list_sessions(State(ctx): State<AppContext>) -> Result<Json<Value>, AppError> {
    let sessions: Vec<StreamSession> = ctx.sessions.list_active();
    Ok(envelope("active sessions fetched", sessions))
}
