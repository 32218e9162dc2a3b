//! Vector database manager.
//!
//! `VectorDbManager` is the single entry point for collection CRUD and
//! similarity search. It shapes parameters, checks ID membership, and
//! forwards to three collaborators:
//!
//! - a [`RecordLoader`] that reads `id`/`text` rows from tabular input
//! - an [`Embedder`] that turns text into vectors
//! - a [`VectorStore`] that owns collections, persistence and k-NN search
//!
//! Every operation is a single request/response. Nothing is retried and
//! nothing is cached: each call asks the store for the current state.
//! Failures are logged here, once, before being returned.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use ragit_types::collection::{
    CollectionDescriptor, CollectionInfo, CollectionMetadata, default_metadata, merge_metadata,
    metric_from_metadata, validate_collection_name,
};
use ragit_types::error::{ManagerError, RepositoryError};
use ragit_types::metric::DistanceMetric;
use ragit_types::record::{AddStats, NearbyText, Record};

use crate::loader::RecordLoader;
use crate::similarity::{to_percent, to_similarity};
use crate::vector::embedder::Embedder;
use crate::vector::store::{GetFilter, VectorStore};

/// Manager over a vector store, an embedder, and a record loader.
///
/// Generic over the port traits so ragit-core never depends on ragit-infra.
pub struct VectorDbManager<S: VectorStore, E: Embedder, L: RecordLoader> {
    store: S,
    embedder: E,
    loader: L,
}

impl<S: VectorStore, E: Embedder, L: RecordLoader> VectorDbManager<S, E, L> {
    pub fn new(store: S, embedder: E, loader: L) -> Self {
        Self {
            store,
            embedder,
            loader,
        }
    }

    /// Create a collection from a CSV file with `id` and `text` columns.
    ///
    /// Collection metadata starts from `{distance_metric, description}` and
    /// is overlaid with `metadata`; the metric that ends up in the merged
    /// metadata is the one the collection is created with. All texts are
    /// embedded in one batch.
    #[tracing::instrument(skip_all, fields(collection = %collection_name))]
    pub async fn create_database(
        &self,
        csv_path: &Path,
        collection_name: &str,
        distance_metric: DistanceMetric,
        metadata: Option<CollectionMetadata>,
    ) -> Result<CollectionInfo, ManagerError> {
        let result = self
            .create_database_inner(csv_path, collection_name, distance_metric, metadata)
            .await;
        match &result {
            Ok(info) => tracing::info!(
                count = info.count,
                "Successfully created collection '{collection_name}'"
            ),
            Err(e) => log_failure("Error creating database", e),
        }
        result
    }

    async fn create_database_inner(
        &self,
        csv_path: &Path,
        collection_name: &str,
        distance_metric: DistanceMetric,
        metadata: Option<CollectionMetadata>,
    ) -> Result<CollectionInfo, ManagerError> {
        check_name(collection_name)?;

        let records = self.loader.load(csv_path).await?;
        if let Some(duplicate) = first_duplicate_id(&records) {
            return Err(ManagerError::DuplicateId(duplicate.to_string()));
        }

        let metadata = merge_metadata(
            default_metadata(distance_metric, &csv_path.display().to_string()),
            metadata,
        );
        let metric = metric_from_metadata(&metadata).map_err(ManagerError::InvalidMetric)?;

        if self
            .store
            .get_collection(collection_name)
            .await
            .map_err(storage_error)?
            .is_some()
        {
            return Err(ManagerError::CollectionExists(collection_name.to_string()));
        }

        let embeddings = if records.is_empty() {
            Vec::new()
        } else {
            self.embed_records(&records).await?
        };

        self.store
            .create_collection(collection_name, metric, self.embedder.dimension(), &metadata)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => {
                    ManagerError::CollectionExists(collection_name.to_string())
                }
                RepositoryError::UnsupportedMetric(m) => ManagerError::InvalidMetric(format!(
                    "'{m}' is not supported by the vector store"
                )),
                other => storage_error(other),
            })?;

        if !records.is_empty() {
            self.store
                .add(collection_name, &records, &embeddings)
                .await
                .map_err(storage_error)?;
        }

        Ok(CollectionInfo {
            name: collection_name.to_string(),
            count: records.len() as u64,
            metadata,
        })
    }

    /// Add rows from a CSV file to an existing collection, skipping IDs that
    /// are already stored (or repeated within the file).
    ///
    /// Only the new rows are embedded; when there are none, the embedder is
    /// not called at all.
    #[tracing::instrument(skip_all, fields(collection = %collection_name))]
    pub async fn add_values_from_csv(
        &self,
        csv_path: &Path,
        collection_name: &str,
    ) -> Result<AddStats, ManagerError> {
        let result = self.add_values_inner(csv_path, collection_name).await;
        match &result {
            Ok(stats) => tracing::info!(
                skipped = stats.skipped_entries,
                "Added {} new entries to '{collection_name}'",
                stats.new_entries_added
            ),
            Err(e) => log_failure("Error adding values from CSV", e),
        }
        result
    }

    async fn add_values_inner(
        &self,
        csv_path: &Path,
        collection_name: &str,
    ) -> Result<AddStats, ManagerError> {
        self.require_collection(collection_name).await?;

        let records = self.loader.load(csv_path).await?;
        let total = records.len();

        let mut seen = self.existing_ids(collection_name).await?;
        let new_records: Vec<Record> = records
            .into_iter()
            .filter(|r| seen.insert(r.id.clone()))
            .collect();

        if !new_records.is_empty() {
            let embeddings = self.embed_records(&new_records).await?;
            self.store
                .add(collection_name, &new_records, &embeddings)
                .await
                .map_err(storage_error)?;
        }

        Ok(AddStats {
            total_entries: total,
            new_entries_added: new_records.len(),
            skipped_entries: total - new_records.len(),
        })
    }

    /// Add one record. Fails with `DuplicateId` (and inserts nothing) if the
    /// ID is already present.
    #[tracing::instrument(skip_all, fields(collection = %collection_name, id = %id))]
    pub async fn add_single_row(
        &self,
        id: &str,
        text: &str,
        collection_name: &str,
    ) -> Result<(), ManagerError> {
        let result = self.add_single_row_inner(id, text, collection_name).await;
        match &result {
            Ok(()) => tracing::info!("Successfully added entry with ID {id}"),
            Err(e) => log_failure("Error adding single row", e),
        }
        result
    }

    async fn add_single_row_inner(
        &self,
        id: &str,
        text: &str,
        collection_name: &str,
    ) -> Result<(), ManagerError> {
        if id.is_empty() {
            return Err(ManagerError::InvalidInput("ID cannot be empty".to_string()));
        }
        self.require_collection(collection_name).await?;

        if self.contains_id(collection_name, id).await? {
            return Err(ManagerError::DuplicateId(id.to_string()));
        }

        let record = Record::new(id, text);
        let embeddings = self.embed_records(std::slice::from_ref(&record)).await?;
        self.store
            .add(collection_name, &[record], &embeddings)
            .await
            .map_err(storage_error)
    }

    /// Delete one record. Fails with `IdNotFound` (and deletes nothing) if
    /// the ID is absent.
    #[tracing::instrument(skip_all, fields(collection = %collection_name, id = %id))]
    pub async fn delete_entry_by_id(
        &self,
        id: &str,
        collection_name: &str,
    ) -> Result<(), ManagerError> {
        let result = self.delete_entry_inner(id, collection_name).await;
        match &result {
            Ok(()) => tracing::info!("Successfully deleted entry with ID {id}"),
            Err(e) => log_failure("Error deleting entry", e),
        }
        result
    }

    async fn delete_entry_inner(&self, id: &str, collection_name: &str) -> Result<(), ManagerError> {
        self.require_collection(collection_name).await?;

        if !self.contains_id(collection_name, id).await? {
            return Err(ManagerError::IdNotFound(id.to_string()));
        }

        self.store
            .delete(collection_name, &[id.to_string()])
            .await
            .map_err(storage_error)
    }

    /// Delete an entire collection.
    ///
    /// `confirmation` must equal "yes" (any case); anything else is a no-op
    /// that returns `ConfirmationRequired`.
    #[tracing::instrument(skip_all, fields(collection = %collection_name))]
    pub async fn delete_collection(
        &self,
        collection_name: &str,
        confirmation: &str,
    ) -> Result<(), ManagerError> {
        let result = self
            .delete_collection_inner(collection_name, confirmation)
            .await;
        match &result {
            Ok(()) => tracing::info!("Successfully deleted collection '{collection_name}'"),
            Err(e) => log_failure("Error deleting collection", e),
        }
        result
    }

    async fn delete_collection_inner(
        &self,
        collection_name: &str,
        confirmation: &str,
    ) -> Result<(), ManagerError> {
        if !confirmation.eq_ignore_ascii_case("yes") {
            return Err(ManagerError::ConfirmationRequired);
        }
        check_name(collection_name)?;

        self.store
            .delete_collection(collection_name)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => {
                    ManagerError::CollectionNotFound(collection_name.to_string())
                }
                other => storage_error(other),
            })
    }

    /// Name, record count and stored metadata of a collection.
    #[tracing::instrument(skip_all, fields(collection = %collection_name))]
    pub async fn get_collection_info(
        &self,
        collection_name: &str,
    ) -> Result<CollectionInfo, ManagerError> {
        let result: Result<CollectionInfo, ManagerError> = async {
            let descriptor = self.require_collection(collection_name).await?;
            let count = self
                .store
                .count(collection_name)
                .await
                .map_err(storage_error)?;
            Ok(CollectionInfo {
                name: descriptor.name,
                count,
                metadata: descriptor.metadata,
            })
        }
        .await;
        if let Err(e) = &result {
            log_failure("Error getting collection info", e);
        }
        result
    }

    /// Texts for the given IDs, keyed by ID. Unknown IDs are left out.
    #[tracing::instrument(skip_all, fields(collection = %collection_name, requested = ids.len()))]
    pub async fn get_by_ids(
        &self,
        ids: &[String],
        collection_name: &str,
    ) -> Result<BTreeMap<String, String>, ManagerError> {
        let result: Result<BTreeMap<String, String>, ManagerError> = async {
            self.require_collection(collection_name).await?;
            if ids.is_empty() {
                return Ok(BTreeMap::new());
            }
            let records = self
                .store
                .get(collection_name, GetFilter::Ids(ids.to_vec()))
                .await
                .map_err(storage_error)?;
            Ok(records.into_iter().map(|r| (r.id, r.text)).collect())
        }
        .await;
        if let Err(e) = &result {
            log_failure("Error getting texts by IDs", e);
        }
        result
    }

    /// IDs for the given texts, keyed by text. Exact string match only; use
    /// [`find_nearby_texts`](Self::find_nearby_texts) for similar texts.
    #[tracing::instrument(skip_all, fields(collection = %collection_name, requested = texts.len()))]
    pub async fn get_by_texts(
        &self,
        texts: &[String],
        collection_name: &str,
    ) -> Result<BTreeMap<String, String>, ManagerError> {
        let result: Result<BTreeMap<String, String>, ManagerError> = async {
            self.require_collection(collection_name).await?;
            if texts.is_empty() {
                return Ok(BTreeMap::new());
            }
            let records = self
                .store
                .get(collection_name, GetFilter::Documents(texts.to_vec()))
                .await
                .map_err(storage_error)?;
            Ok(records.into_iter().map(|r| (r.text, r.id)).collect())
        }
        .await;
        if let Err(e) = &result {
            log_failure("Error getting IDs by texts", e);
        }
        result
    }

    /// Find the `k` records nearest to `text`, with similarity scores.
    ///
    /// When `search_string` is non-empty only documents containing it are
    /// searched. Entries come back in the order the store returns them.
    #[tracing::instrument(skip_all, fields(collection = %collection_name, k = k))]
    pub async fn find_nearby_texts(
        &self,
        text: &str,
        collection_name: &str,
        search_string: Option<&str>,
        k: usize,
    ) -> Result<Vec<NearbyText>, ManagerError> {
        let result = self
            .find_nearby_inner(text, collection_name, search_string, k)
            .await;
        match &result {
            Ok(found) => tracing::debug!(results = found.len(), "Nearby text search finished"),
            Err(e) => log_failure("Error finding nearby texts", e),
        }
        result
    }

    async fn find_nearby_inner(
        &self,
        text: &str,
        collection_name: &str,
        search_string: Option<&str>,
        k: usize,
    ) -> Result<Vec<NearbyText>, ManagerError> {
        check_name(collection_name)?;
        if k == 0 {
            return Ok(Vec::new());
        }

        let descriptor = self.require_collection(collection_name).await?;
        let metric = descriptor.metric;
        tracing::debug!(%metric, "Querying collection");

        let query_embedding = self
            .embed_texts(&[text.to_string()])
            .await?
            .pop()
            .ok_or_else(|| ManagerError::Embedding("embedder returned no vectors".to_string()))?;

        let contains = search_string.filter(|s| !s.is_empty());
        let results = self
            .store
            .query(collection_name, &query_embedding, k, contains)
            .await
            .map_err(|e| match e {
                RepositoryError::UnsupportedMetric(m) => ManagerError::InvalidMetric(format!(
                    "'{m}' is not supported by the vector store"
                )),
                other => storage_error(other),
            })?;

        let distances: Vec<f32> = results.iter().map(|r| r.distance).collect();
        let similarities = to_similarity(metric, &distances);

        Ok(results
            .into_iter()
            .zip(similarities)
            .map(|(r, similarity)| NearbyText {
                id: r.id,
                text: r.text,
                similarity: to_percent(similarity),
                raw_distance: r.distance,
                metric,
            })
            .collect())
    }

    /// Names of all collections, sorted.
    pub async fn list_collections(&self) -> Result<Vec<String>, ManagerError> {
        let result = self.store.list_collections().await.map_err(storage_error);
        if let Err(e) = &result {
            log_failure("Error listing collections", e);
        }
        result
    }

    // --- Helpers ---

    async fn require_collection(
        &self,
        collection_name: &str,
    ) -> Result<CollectionDescriptor, ManagerError> {
        check_name(collection_name)?;
        self.store
            .get_collection(collection_name)
            .await
            .map_err(storage_error)?
            .ok_or_else(|| ManagerError::CollectionNotFound(collection_name.to_string()))
    }

    async fn existing_ids(&self, collection_name: &str) -> Result<HashSet<String>, ManagerError> {
        let records = self
            .store
            .get(collection_name, GetFilter::All)
            .await
            .map_err(storage_error)?;
        Ok(records.into_iter().map(|r| r.id).collect())
    }

    async fn contains_id(&self, collection_name: &str, id: &str) -> Result<bool, ManagerError> {
        let records = self
            .store
            .get(collection_name, GetFilter::Ids(vec![id.to_string()]))
            .await
            .map_err(storage_error)?;
        Ok(records.iter().any(|r| r.id == id))
    }

    /// Embed the texts of `records` in one batch.
    async fn embed_records(&self, records: &[Record]) -> Result<Vec<Vec<f32>>, ManagerError> {
        let texts: Vec<String> = records.iter().map(|r| r.text.clone()).collect();
        self.embed_texts(&texts).await
    }

    async fn embed_texts(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ManagerError> {
        let embeddings = self
            .embedder
            .embed(texts)
            .await
            .map_err(|e| ManagerError::Embedding(e.to_string()))?;

        if embeddings.len() != texts.len() {
            return Err(ManagerError::Embedding(format!(
                "expected {} vectors, embedder returned {}",
                texts.len(),
                embeddings.len()
            )));
        }
        Ok(embeddings)
    }
}

fn check_name(collection_name: &str) -> Result<(), ManagerError> {
    validate_collection_name(collection_name).map_err(ManagerError::InvalidCollectionName)
}

fn first_duplicate_id(records: &[Record]) -> Option<&str> {
    let mut seen = HashSet::with_capacity(records.len());
    records
        .iter()
        .find(|r| !seen.insert(r.id.as_str()))
        .map(|r| r.id.as_str())
}

fn storage_error(err: RepositoryError) -> ManagerError {
    ManagerError::Storage(err.to_string())
}

/// Rejected input is a warning; collaborator failures are errors.
fn log_failure(context: &str, err: &ManagerError) {
    match err {
        ManagerError::Embedding(_) | ManagerError::Storage(_) => {
            tracing::error!("{context}: {err}");
        }
        _ => tracing::warn!("{context}: {err}"),
    }
}
