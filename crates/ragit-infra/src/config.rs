//! Configuration loader for ragit.
//!
//! Reads `ragit.toml` from the data directory (`~/.ragit/` by default) and
//! deserializes it into [`RagitConfig`]. Falls back to defaults when the file
//! is missing or malformed.

use std::path::{Path, PathBuf};

use ragit_types::config::RagitConfig;

/// Config file name inside the data directory.
pub const CONFIG_FILE: &str = "ragit.toml";

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "RAGIT_DATA_DIR";

/// Load configuration from `{data_dir}/ragit.toml`.
///
/// - If the file does not exist, returns [`RagitConfig::default()`].
/// - If the file exists but fails to parse, logs a warning and returns the default.
pub async fn load_config(data_dir: &Path) -> RagitConfig {
    let config_path = data_dir.join(CONFIG_FILE);

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No {CONFIG_FILE} found at {}, using defaults", config_path.display());
            return RagitConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return RagitConfig::default();
        }
    };

    match toml::from_str::<RagitConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            RagitConfig::default()
        }
    }
}

/// Resolve the data directory.
///
/// Priority:
/// 1. Explicit override (the `--data-dir` flag)
/// 2. `RAGIT_DATA_DIR` environment variable
/// 3. `~/.ragit`
/// 4. `./.ragit`
pub fn resolve_data_dir(explicit: Option<PathBuf>) -> PathBuf {
    if let Some(dir) = explicit {
        return dir;
    }

    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        if !dir.is_empty() {
            return PathBuf::from(dir);
        }
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".ragit");
    }

    PathBuf::from(".ragit")
}

/// Where the vector database lives. Relative paths resolve against the data directory.
pub fn resolve_persist_directory(config: &RagitConfig, data_dir: &Path) -> PathBuf {
    if config.persist_directory.is_absolute() {
        config.persist_directory.clone()
    } else {
        data_dir.join(&config.persist_directory)
    }
}
