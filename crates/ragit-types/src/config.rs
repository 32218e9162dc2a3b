//! Configuration types for ragit.
//!
//! `RagitConfig` represents `ragit.toml` in the data directory and controls
//! where collections live, which embedding model is loaded, and the search
//! defaults used by the CLI.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::metric::DistanceMetric;

/// Top-level configuration.
///
/// Loaded from `~/.ragit/ragit.toml`. All fields have sensible defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RagitConfig {
    /// Directory holding the vector database. Relative paths resolve
    /// against the data directory.
    #[serde(default = "default_persist_directory")]
    pub persist_directory: PathBuf,

    /// Name of the embedding model (e.g., "BGESmallENV15", "AllMiniLML6V2").
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,

    /// Where downloaded model files are cached. Defaults to the embedding
    /// library's own cache location when unset.
    #[serde(default)]
    pub model_cache_dir: Option<PathBuf>,

    /// Show a progress bar while model files download.
    #[serde(default = "default_true")]
    pub show_download_progress: bool,

    /// Metric used by `create` when none is given.
    #[serde(default)]
    pub default_metric: DistanceMetric,

    /// Number of neighbours returned by `search` when none is given.
    #[serde(default = "default_k")]
    pub default_k: usize,
}

fn default_persist_directory() -> PathBuf {
    PathBuf::from("vector_db")
}

fn default_embedding_model() -> String {
    "BGESmallENV15".to_string()
}

fn default_true() -> bool {
    true
}

fn default_k() -> usize {
    5
}

impl Default for RagitConfig {
    fn default() -> Self {
        Self {
            persist_directory: default_persist_directory(),
            embedding_model: default_embedding_model(),
            model_cache_dir: None,
            show_download_progress: true,
            default_metric: DistanceMetric::default(),
            default_k: default_k(),
        }
    }
}
