//! Config file loading.

use crate::schema::GeoclassConfig;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Config file looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "geoclass.yaml";

/// Env var naming an alternative config file.
pub const ENV_CONFIG_PATH: &str = "GEOCLASS_CONFIG";

/// Resolve the config file path.
/// Priority: explicit path > `GEOCLASS_CONFIG` > `./geoclass.yaml`
pub fn config_file_path(explicit: Option<&Path>) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    match std::env::var(ENV_CONFIG_PATH) {
        Ok(path) if !path.is_empty() => PathBuf::from(path),
        _ => PathBuf::from(DEFAULT_CONFIG_FILE),
    }
}

/// Load and parse the config from disk.
///
/// Returns `Ok(Default::default())` if the file doesn't exist, so the
/// service can run on environment variables alone.
pub async fn load_config(path: &Path) -> Result<GeoclassConfig> {
    if !fs::try_exists(path).await.unwrap_or(false) {
        debug!(path = %path.display(), "Config file does not exist; using defaults");
        return Ok(GeoclassConfig::default());
    }

    let raw = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config = parse_config(&raw)
        .with_context(|| format!("Failed to parse config YAML at: {}", path.display()))?;

    info!(path = %path.display(), "Loaded config");
    Ok(config)
}

/// Parse YAML text; an empty document yields the default config.
pub fn parse_config(raw: &str) -> Result<GeoclassConfig> {
    if raw.trim().is_empty() {
        return Ok(GeoclassConfig::default());
    }
    Ok(serde_yaml::from_str(raw)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_file_yields_defaults() {
        let config = load_config(Path::new("/definitely/not/here/geoclass.yaml"))
            .await
            .unwrap();
        assert_eq!(config, GeoclassConfig::default());
    }

    #[tokio::test]
    async fn reads_yaml_from_disk() {
        let path = std::env::temp_dir().join(format!("geoclass-io-{}.yaml", std::process::id()));
        fs::write(&path, "server:\n  port: 7777\n").await.unwrap();
        let config = load_config(&path).await.unwrap();
        let _ = fs::remove_file(&path).await;
        assert_eq!(config.server.port, Some(7777));
    }

    #[test]
    fn empty_and_invalid_documents() {
        assert_eq!(parse_config("  \n").unwrap(), GeoclassConfig::default());
        assert!(parse_config("server: [1, 2").is_err());
    }

    #[test]
    fn explicit_path_wins() {
        assert_eq!(
            config_file_path(Some(Path::new("/etc/geoclass.yaml"))),
            PathBuf::from("/etc/geoclass.yaml")
        );
    }
}
