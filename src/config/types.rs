use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub streaming: StreamingConfig,

    #[serde(default)]
    pub tools: ToolsConfig,

    /// Assets registered in the in-memory store at startup.
    #[serde(default)]
    pub assets: Vec<AssetSeed>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AuthConfig {
    /// Enable bearer-token authentication for the metadata API.
    /// Streaming routes are always public.
    #[serde(default)]
    pub enabled: bool,

    /// API key for programmatic access (used with `Authorization: Bearer`).
    #[serde(default)]
    pub api_key: Option<String>,

    /// Static per-user tokens resolving to a user identity.
    #[serde(default)]
    pub tokens: Vec<StaticToken>,
}

/// A pre-shared bearer token bound to a user id.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StaticToken {
    pub token: String,
    pub user_id: Uuid,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StreamingConfig {
    /// Bytes served per request when the client gives no explicit end.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: u64,

    /// Assumed average bitrate (bytes/sec) for the byte-to-time seek
    /// conversion when the asset's own length/duration are unknown.
    #[serde(default = "default_fallback_bytes_per_sec")]
    pub fallback_bytes_per_sec: u64,

    /// Maximum seconds between transform spawn and its first output byte.
    #[serde(default = "default_startup_timeout")]
    pub startup_timeout_secs: u64,

    /// Parent directory for the per-process scratch directory.
    /// Defaults to the system temp dir.
    #[serde(default)]
    pub scratch_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ToolsConfig {
    /// Explicit path to the ffmpeg binary (falls back to `PATH` lookup).
    #[serde(default)]
    pub ffmpeg_path: Option<PathBuf>,
}

/// One asset entry in the config file, loaded into the store at startup.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AssetSeed {
    pub id: Uuid,

    pub title: String,

    /// URI or path resolvable by the transform tool.
    pub source: String,

    #[serde(default = "default_published")]
    pub published: bool,

    #[serde(default)]
    pub owner: Option<Uuid>,

    /// Advisory media duration; 0 means unknown.
    #[serde(default)]
    pub duration_seconds: f64,

    /// Total byte length when known. Unknown lengths render as `*` in
    /// `Content-Range`.
    #[serde(default)]
    pub content_length: Option<u64>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_chunk_size() -> u64 {
    1024 * 1024
}

fn default_fallback_bytes_per_sec() -> u64 {
    1024 * 1024
}

fn default_startup_timeout() -> u64 {
    10
}

fn default_published() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            auth: AuthConfig::default(),
        }
    }
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            fallback_bytes_per_sec: default_fallback_bytes_per_sec(),
            startup_timeout_secs: default_startup_timeout(),
            scratch_dir: None,
        }
    }
}
