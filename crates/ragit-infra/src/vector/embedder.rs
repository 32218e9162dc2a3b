//! FastEmbed-based local embedding generator.
//!
//! Implements the `Embedder` trait from `ragit-core` using a fastembed text
//! model with ONNX runtime inference. The model is chosen by name from
//! configuration; model files are loaded (and downloaded if
//! missing) on first use.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};

use ragit_core::vector::embedder::Embedder;
use ragit_types::error::RepositoryError;

/// Models the CLI can load, by canonical name, with their output dimension.
const SUPPORTED_MODELS: &[(&str, &str, usize)] = &[
    ("AllMiniLML6V2", "all-MiniLM-L6-v2", 384),
    ("AllMiniLML12V2", "all-MiniLM-L12-v2", 384),
    ("BGESmallENV15", "bge-small-en-v1.5", 384),
    ("BGEBaseENV15", "bge-base-en-v1.5", 768),
    ("BGELargeENV15", "bge-large-en-v1.5", 1024),
    ("ParaphraseMLMpnetBaseV2", "paraphrase-multilingual-mpnet-base-v2", 768),
    ("NomicEmbedTextV15", "nomic-embed-text-v1.5", 768),
];

/// Resolve a configured model name to its canonical name and dimension.
///
/// Accepts the canonical name or the Hugging Face style alias, ignoring
/// ASCII case.
pub fn lookup_model(name: &str) -> Option<(&'static str, usize)> {
    let name = name.trim();
    SUPPORTED_MODELS
        .iter()
        .find(|(canonical, alias, _)| {
            canonical.eq_ignore_ascii_case(name) || alias.eq_ignore_ascii_case(name)
        })
        .map(|(canonical, _, dim)| (*canonical, *dim))
}

/// Canonical names of every supported model.
pub fn supported_models() -> Vec<&'static str> {
    SUPPORTED_MODELS.iter().map(|(name, _, _)| *name).collect()
}

fn fastembed_model(canonical: &str) -> Option<EmbeddingModel> {
    match canonical {
        "AllMiniLML6V2" => Some(EmbeddingModel::AllMiniLML6V2),
        "AllMiniLML12V2" => Some(EmbeddingModel::AllMiniLML12V2),
        "BGESmallENV15" => Some(EmbeddingModel::BGESmallENV15),
        "BGEBaseENV15" => Some(EmbeddingModel::BGEBaseENV15),
        "BGELargeENV15" => Some(EmbeddingModel::BGELargeENV15),
        "ParaphraseMLMpnetBaseV2" => Some(EmbeddingModel::ParaphraseMLMpnetBaseV2),
        "NomicEmbedTextV15" => Some(EmbeddingModel::NomicEmbedTextV15),
        _ => None,
    }
}

/// Local embedder backed by a fastembed `TextEmbedding`.
///
/// The model loads on the first `embed` call, so commands that never embed
/// do not pay for it. Inference is CPU bound and runs on the blocking pool;
/// the model sits behind a mutex because fastembed needs exclusive access
/// while encoding.
pub struct FastEmbedder {
    model: Arc<Mutex<Option<TextEmbedding>>>,
    settings: Arc<ModelSettings>,
    model_name: &'static str,
    dimension: usize,
}

struct ModelSettings {
    model: EmbeddingModel,
    cache_dir: Option<PathBuf>,
    show_download_progress: bool,
}

impl ModelSettings {
    fn load(&self) -> Result<TextEmbedding, RepositoryError> {
        let mut options = InitOptions::new(self.model.clone())
            .with_show_download_progress(self.show_download_progress);
        if let Some(dir) = &self.cache_dir {
            options = options.with_cache_dir(dir.clone());
        }

        TextEmbedding::try_new(options)
            .map_err(|e| RepositoryError::Embedding(format!("Failed to load model: {e}")))
    }
}

impl FastEmbedder {
    /// Prepare the named model. Model files are fetched into `cache_dir` on
    /// first use.
    pub fn new(
        model_name: &str,
        cache_dir: Option<PathBuf>,
        show_download_progress: bool,
    ) -> Result<Self, RepositoryError> {
        let (canonical, dimension) = lookup_model(model_name).ok_or_else(|| {
            RepositoryError::Embedding(format!(
                "unknown embedding model '{model_name}' (supported: {})",
                supported_models().join(", ")
            ))
        })?;
        let model = fastembed_model(canonical).ok_or_else(|| {
            RepositoryError::Embedding(format!("no fastembed model for '{canonical}'"))
        })?;

        Ok(Self {
            model: Arc::new(Mutex::new(None)),
            settings: Arc::new(ModelSettings {
                model,
                cache_dir,
                show_download_progress,
            }),
            model_name: canonical,
            dimension,
        })
    }
}

impl Embedder for FastEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, RepositoryError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let slot = Arc::clone(&self.model);
        let settings = Arc::clone(&self.settings);
        let model_name = self.model_name;
        let texts = texts.to_vec();
        let count = texts.len();

        let vectors = tokio::task::spawn_blocking(move || {
            let mut guard = slot
                .lock()
                .map_err(|_| RepositoryError::Embedding("embedding model lock poisoned".to_string()))?;
            if guard.is_none() {
                *guard = Some(settings.load()?);
                tracing::info!(model = model_name, "Loaded embedding model");
            }
            let model = guard
                .as_mut()
                .ok_or_else(|| RepositoryError::Embedding("embedding model unavailable".to_string()))?;
            model
                .embed(texts, None)
                .map_err(|e| RepositoryError::Embedding(format!("Embedding failed: {e}")))
        })
        .await
        .map_err(|e| RepositoryError::Embedding(format!("Embedding task failed: {e}")))??;

        tracing::debug!(count, model = self.model_name, "Embedded texts");
        Ok(vectors)
    }

    fn model_name(&self) -> &str {
        self.model_name
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}
