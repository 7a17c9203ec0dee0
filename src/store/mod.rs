//! Asset metadata store.
//!
//! The document database holding asset records is an external collaborator;
//! this module defines the [`AssetStore`] seam the streaming component reads
//! through, plus the shipped [`MemoryAssetStore`] used by the server (seeded
//! from config) and by tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::Serialize;
use uuid::Uuid;

use crate::config::AssetSeed;
use crate::Result;

/// One stored video asset, as the streaming component sees it.
#[derive(Debug, Clone, Serialize)]
pub struct MediaAsset {
    pub id: Uuid,
    pub title: String,
    /// URI or path resolvable by the transform tool.
    pub source_location: String,
    /// Visibility gate; unpublished assets stream as 404.
    pub is_published: bool,
    pub owner_id: Uuid,
    /// Advisory media duration; 0 means unknown.
    pub duration_seconds: f64,
    /// Total byte length when known.
    pub content_length: Option<u64>,
    pub created_at: DateTime<Utc>,
}

impl MediaAsset {
    /// Average bitrate in bytes per second, when both the total length and
    /// the duration are known and positive.
    pub fn bytes_per_second(&self) -> Option<u64> {
        let total = self.content_length?;
        if total == 0 || self.duration_seconds <= 0.0 {
            return None;
        }
        Some((total as f64 / self.duration_seconds).round().max(1.0) as u64)
    }
}

impl From<&AssetSeed> for MediaAsset {
    fn from(seed: &AssetSeed) -> Self {
        Self {
            id: seed.id,
            title: seed.title.clone(),
            source_location: seed.source.clone(),
            is_published: seed.published,
            owner_id: seed.owner.unwrap_or_else(Uuid::nil),
            duration_seconds: seed.duration_seconds,
            content_length: seed.content_length,
            created_at: Utc::now(),
        }
    }
}

/// Read access to asset records.
#[async_trait]
pub trait AssetStore: Send + Sync {
    /// Look up one asset by id. `Ok(None)` means no such record.
    async fn find_asset(&self, id: Uuid) -> Result<Option<MediaAsset>>;

    /// List all asset records.
    async fn list_assets(&self) -> Result<Vec<MediaAsset>>;
}

/// In-memory asset store backed by a concurrent map.
#[derive(Default)]
pub struct MemoryAssetStore {
    assets: DashMap<Uuid, MediaAsset>,
}

impl MemoryAssetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store pre-populated from config seed entries.
    pub fn from_seeds(seeds: &[AssetSeed]) -> Self {
        let store = Self::new();
        for seed in seeds {
            store.insert(MediaAsset::from(seed));
        }
        store
    }

    /// Insert or replace one asset record.
    pub fn insert(&self, asset: MediaAsset) {
        self.assets.insert(asset.id, asset);
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

#[async_trait]
impl AssetStore for MemoryAssetStore {
    async fn find_asset(&self, id: Uuid) -> Result<Option<MediaAsset>> {
        Ok(self.assets.get(&id).map(|entry| entry.value().clone()))
    }

    async fn list_assets(&self) -> Result<Vec<MediaAsset>> {
        let mut assets: Vec<MediaAsset> = self
            .assets
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        assets.sort_by_key(|a| a.created_at);
        Ok(assets)
    }
}
