mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::collections::HashSet;
use std::path::Path;

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    // Try default locations
    let default_paths = [
        "./vidserve.toml",
        "./config.toml",
        "~/.config/vidserve/config.toml",
        "/etc/vidserve/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            return load_config(path);
        }
    }

    Ok(Config::default())
}

/// Validate configuration
fn validate_config(config: &Config) -> Result<()> {
    if config.server.port == 0 {
        anyhow::bail!("Server port cannot be 0");
    }

    if config.streaming.chunk_size == 0 {
        anyhow::bail!("streaming.chunk_size cannot be 0");
    }

    if config.streaming.fallback_bytes_per_sec == 0 {
        anyhow::bail!("streaming.fallback_bytes_per_sec cannot be 0");
    }

    if let Some(ref dir) = config.streaming.scratch_dir {
        if !dir.exists() {
            tracing::warn!("Scratch directory does not exist: {:?}", dir);
        }
    }

    if config.server.auth.enabled
        && config.server.auth.api_key.is_none()
        && config.server.auth.tokens.is_empty()
    {
        anyhow::bail!("Auth is enabled but no api_key or tokens are configured");
    }

    let mut seen = HashSet::new();
    for asset in &config.assets {
        if !seen.insert(asset.id) {
            anyhow::bail!("Duplicate asset id in config: {}", asset.id);
        }
        if asset.source.is_empty() {
            anyhow::bail!("Asset {} has an empty source", asset.id);
        }
    }

    Ok(())
}
