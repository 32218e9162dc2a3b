//! Application state wiring the manager together.
//!
//! `VectorDbManager` is generic over store/embedder/loader traits; AppState
//! pins it to the concrete infra implementations.

use std::path::PathBuf;

use anyhow::Context;

use ragit_core::manager::VectorDbManager;
use ragit_core::vector::box_embedder::BoxEmbedder;
use ragit_infra::config::{load_config, resolve_data_dir, resolve_persist_directory};
use ragit_infra::loader::CsvRecordLoader;
use ragit_infra::vector::collection::LanceCollectionStore;
use ragit_infra::vector::embedder::FastEmbedder;
use ragit_infra::vector::lance::LanceVectorStore;
use ragit_types::config::RagitConfig;

/// Manager pinned to LanceDB storage, a runtime-selected embedder and CSV input.
pub type ConcreteManager = VectorDbManager<LanceCollectionStore, BoxEmbedder, CsvRecordLoader>;

/// Everything a command handler needs.
pub struct AppState {
    pub manager: ConcreteManager,
    pub config: RagitConfig,
    pub data_dir: PathBuf,
}

impl AppState {
    /// Resolve the data directory, load config, open the database and
    /// prepare the embedder.
    pub async fn init(data_dir: Option<PathBuf>) -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir(data_dir);
        tokio::fs::create_dir_all(&data_dir)
            .await
            .with_context(|| format!("Failed to create data directory {}", data_dir.display()))?;

        let config = load_config(&data_dir).await;
        let db_path = resolve_persist_directory(&config, &data_dir);

        let lance = LanceVectorStore::new(db_path.clone())
            .await
            .with_context(|| format!("Failed to open vector database at {}", db_path.display()))?;
        let store = LanceCollectionStore::new(lance);

        let embedder = FastEmbedder::new(
            &config.embedding_model,
            config.model_cache_dir.clone(),
            config.show_download_progress,
        )?;
        tracing::debug!(
            data_dir = %data_dir.display(),
            db = %db_path.display(),
            model = %config.embedding_model,
            "Initialized application state"
        );

        Ok(Self {
            manager: VectorDbManager::new(store, BoxEmbedder::new(embedder), CsvRecordLoader::new()),
            config,
            data_dir,
        })
    }
}
