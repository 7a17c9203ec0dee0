//! External tool discovery.

use std::path::PathBuf;

use crate::config::ToolsConfig;
use crate::{Error, Result};

/// Resolve the ffmpeg binary to use.
///
/// A configured path wins if it exists; otherwise falls back to a PATH
/// lookup. Fails with a validation error when nothing is found.
pub fn resolve_ffmpeg(config: &ToolsConfig) -> Result<PathBuf> {
    if let Some(ref configured) = config.ffmpeg_path {
        if configured.exists() {
            return Ok(configured.clone());
        }
        tracing::warn!(
            path = %configured.display(),
            "configured ffmpeg path does not exist, falling back to PATH lookup"
        );
    }

    which::which("ffmpeg").map_err(|_| {
        Error::Validation(
            "ffmpeg not found; install it or set tools.ffmpeg_path in the config".into(),
        )
    })
}

/// Diagnostic view of a tool lookup, for the `check-tools` subcommand.
pub struct ToolInfo {
    pub name: &'static str,
    pub path: Option<PathBuf>,
}

pub fn check_tools(config: &ToolsConfig) -> Vec<ToolInfo> {
    vec![ToolInfo {
        name: "ffmpeg",
        path: resolve_ffmpeg(config).ok(),
    }]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_configured_path_falls_back() {
        let config = ToolsConfig {
            ffmpeg_path: Some(PathBuf::from("/definitely/not/here/ffmpeg")),
        };
        // Result depends on whether ffmpeg is on PATH; either way the
        // configured bogus path must not be returned.
        if let Ok(path) = resolve_ffmpeg(&config) {
            assert_ne!(path, PathBuf::from("/definitely/not/here/ffmpeg"));
        }
    }

    #[test]
    fn configured_existing_path_wins() {
        let dir = tempfile::tempdir().unwrap();
        let fake = dir.path().join("ffmpeg");
        std::fs::write(&fake, "").unwrap();

        let config = ToolsConfig {
            ffmpeg_path: Some(fake.clone()),
        };
        assert_eq!(resolve_ffmpeg(&config).unwrap(), fake);
    }
}
