//! LanceDB-backed collection store.
//!
//! Implements `VectorStore` from `ragit-core`. Each collection is a Lance
//! table (`id`, `text`, `vector`); the collection's metric, dimension and
//! metadata are kept in the catalog table so they survive restarts.
//!
//! Metric mapping: `l2` -> L2, `cosine` -> Cosine, `ip` -> Dot. LanceDB has
//! no L1 distance, so `l1` collections are rejected up front.

use std::sync::Arc;

use arrow_array::{
    Array, FixedSizeListArray, Float32Array, Int32Array, RecordBatch, RecordBatchIterator,
    StringArray,
};
use arrow_schema::{DataType, Field};
use chrono::{DateTime, Utc};
use futures_util::TryStreamExt;
use lancedb::query::{ExecutableQuery, QueryBase};

use ragit_core::vector::store::{GetFilter, VectorStore};
use ragit_types::collection::{CollectionDescriptor, CollectionMetadata};
use ragit_types::error::RepositoryError;
use ragit_types::metric::DistanceMetric;
use ragit_types::record::{Record, ScoredRecord};

use super::lance::LanceVectorStore;
use super::schema::{CATALOG_TABLE, DISTANCE_COLUMN, catalog_schema, collection_schema};

/// LanceDB-backed store of named collections.
pub struct LanceCollectionStore {
    store: LanceVectorStore,
}

impl LanceCollectionStore {
    /// Create a new LanceCollectionStore backed by the given connection.
    pub fn new(store: LanceVectorStore) -> Self {
        Self { store }
    }

    /// Open the catalog table, creating it on first use.
    async fn catalog(&self) -> Result<lancedb::Table, RepositoryError> {
        self.store
            .ensure_table(CATALOG_TABLE, Arc::new(catalog_schema()))
            .await
            .map_err(|e| RepositoryError::Query(format!("Failed to open catalog: {e}")))
    }

    /// Open a collection's table.
    async fn collection_table(&self, name: &str) -> Result<lancedb::Table, RepositoryError> {
        self.store.open_table(name).await.map_err(|e| match e {
            lancedb::Error::TableNotFound { .. } => RepositoryError::NotFound,
            other => RepositoryError::Query(format!("Failed to open collection '{name}': {other}")),
        })
    }

    /// Look up a collection's descriptor or fail with `NotFound`.
    async fn require_descriptor(&self, name: &str) -> Result<CollectionDescriptor, RepositoryError> {
        self.get_collection(name)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    /// Run a plain (non-vector) query, returning every matching batch.
    ///
    /// The limit is set to the table's row count so no default cap applies.
    async fn scan(
        table: &lancedb::Table,
        filter: Option<String>,
    ) -> Result<Vec<RecordBatch>, RepositoryError> {
        let rows = table
            .count_rows(None)
            .await
            .map_err(|e| RepositoryError::Query(format!("Failed to count rows: {e}")))?;
        if rows == 0 {
            return Ok(Vec::new());
        }

        let mut query = table.query().limit(rows);
        if let Some(filter) = filter {
            query = query.only_if(filter);
        }

        query
            .execute()
            .await
            .map_err(|e| RepositoryError::Query(format!("Query failed: {e}")))?
            .try_collect()
            .await
            .map_err(|e| RepositoryError::Query(format!("Failed to collect results: {e}")))
    }

    /// Build the catalog row for a collection.
    fn descriptor_batch(descriptor: &CollectionDescriptor) -> Result<RecordBatch, RepositoryError> {
        let metadata = serde_json::to_string(&descriptor.metadata)
            .map_err(|e| RepositoryError::Query(format!("Failed to encode metadata: {e}")))?;
        let dimension = i32::try_from(descriptor.dimension).map_err(|_| {
            RepositoryError::Query(format!("dimension {} is too large", descriptor.dimension))
        })?;

        RecordBatch::try_new(
            Arc::new(catalog_schema()),
            vec![
                Arc::new(StringArray::from(vec![descriptor.name.clone()])),
                Arc::new(StringArray::from(vec![descriptor.metric.to_string()])),
                Arc::new(Int32Array::from(vec![dimension])),
                Arc::new(StringArray::from(vec![metadata])),
                Arc::new(StringArray::from(vec![descriptor.created_at.to_rfc3339()])),
            ],
        )
        .map_err(|e| RepositoryError::Query(format!("Failed to build catalog batch: {e}")))
    }

    /// Parse catalog rows back into descriptors.
    fn batch_to_descriptors(batch: &RecordBatch) -> Result<Vec<CollectionDescriptor>, RepositoryError> {
        let names = string_column(batch, "name")?;
        let metrics = string_column(batch, "metric")?;
        let metadata = string_column(batch, "metadata")?;
        let created = string_column(batch, "created_at")?;
        let dimensions = batch
            .column_by_name("dimension")
            .and_then(|c| c.as_any().downcast_ref::<Int32Array>())
            .ok_or_else(|| RepositoryError::Query("catalog has no dimension column".to_string()))?;

        (0..batch.num_rows())
            .map(|i| {
                let metric: DistanceMetric = metrics.value(i).parse().map_err(RepositoryError::Query)?;
                let metadata: CollectionMetadata = serde_json::from_str(metadata.value(i))
                    .map_err(|e| RepositoryError::Query(format!("Corrupt collection metadata: {e}")))?;
                let created_at = DateTime::parse_from_rfc3339(created.value(i))
                    .map(|dt| dt.with_timezone(&Utc))
                    .map_err(|e| RepositoryError::Query(format!("Corrupt collection timestamp: {e}")))?;

                Ok(CollectionDescriptor {
                    name: names.value(i).to_string(),
                    metric,
                    dimension: dimensions.value(i).max(0) as usize,
                    metadata,
                    created_at,
                })
            })
            .collect()
    }

    /// Build an Arrow RecordBatch of records and their embeddings.
    fn records_batch(
        records: &[Record],
        embeddings: &[Vec<f32>],
        dimension: usize,
    ) -> Result<RecordBatch, RepositoryError> {
        if records.len() != embeddings.len() {
            return Err(RepositoryError::Query(format!(
                "{} records but {} embeddings",
                records.len(),
                embeddings.len()
            )));
        }
        if let Some(bad) = embeddings.iter().find(|e| e.len() != dimension) {
            return Err(RepositoryError::Query(format!(
                "embedding has {} dimensions, collection expects {dimension}",
                bad.len()
            )));
        }

        let size = i32::try_from(dimension)
            .map_err(|_| RepositoryError::Query(format!("dimension {dimension} is too large")))?;
        let schema = Arc::new(collection_schema(size));

        let id_array = StringArray::from_iter_values(records.iter().map(|r| r.id.as_str()));
        let text_array = StringArray::from_iter_values(records.iter().map(|r| r.text.as_str()));

        let values = Float32Array::from(embeddings.concat());
        let field = Arc::new(Field::new("item", DataType::Float32, true));
        let vector_array = FixedSizeListArray::try_new(field, size, Arc::new(values), None)
            .map_err(|e| RepositoryError::Query(format!("Failed to build vector column: {e}")))?;

        RecordBatch::try_new(
            schema,
            vec![
                Arc::new(id_array),
                Arc::new(text_array),
                Arc::new(vector_array),
            ],
        )
        .map_err(|e| RepositoryError::Query(format!("Failed to build record batch: {e}")))
    }

    /// Parse `id`/`text` columns into records. The vector column is skipped.
    fn batch_to_records(batch: &RecordBatch) -> Result<Vec<Record>, RepositoryError> {
        let ids = string_column(batch, "id")?;
        let texts = string_column(batch, "text")?;
        Ok((0..batch.num_rows())
            .map(|i| Record::new(ids.value(i), texts.value(i)))
            .collect())
    }
}

impl VectorStore for LanceCollectionStore {
    async fn create_collection(
        &self,
        name: &str,
        metric: DistanceMetric,
        dimension: usize,
        metadata: &CollectionMetadata,
    ) -> Result<CollectionDescriptor, RepositoryError> {
        lance_distance(metric)?;
        if self.get_collection(name).await?.is_some() {
            return Err(RepositoryError::Conflict(format!(
                "collection '{name}' already exists"
            )));
        }

        let descriptor = CollectionDescriptor {
            name: name.to_string(),
            metric,
            dimension,
            metadata: metadata.clone(),
            created_at: Utc::now(),
        };
        let catalog_row = Self::descriptor_batch(&descriptor)?;
        let size = i32::try_from(dimension)
            .map_err(|_| RepositoryError::Query(format!("dimension {dimension} is too large")))?;

        let catalog = self.catalog().await?;
        let schema = Arc::new(collection_schema(size));

        match self.store.create_table(name, schema.clone()).await {
            Ok(_) => {}
            // Unregistered table left behind by an interrupted create or drop.
            Err(lancedb::Error::TableAlreadyExists { .. }) => {
                tracing::warn!(collection = name, "Replacing unregistered collection table");
                self.store
                    .drop_table(name)
                    .await
                    .map_err(|e| RepositoryError::Query(format!("Failed to drop stale table: {e}")))?;
                self.store
                    .create_table(name, schema)
                    .await
                    .map_err(|e| RepositoryError::Query(format!("Failed to create collection: {e}")))?;
            }
            Err(e) => {
                return Err(RepositoryError::Query(format!("Failed to create collection: {e}")));
            }
        }

        let row_schema = catalog_row.schema();
        let reader = RecordBatchIterator::new(vec![Ok(catalog_row)], row_schema);
        if let Err(e) = catalog.add(reader).execute().await {
            if let Err(drop_err) = self.store.drop_table(name).await {
                tracing::error!(collection = name, "Failed to roll back collection table: {drop_err}");
            }
            return Err(RepositoryError::Query(format!("Failed to register collection: {e}")));
        }

        tracing::debug!(collection = name, %metric, dimension, "Created collection table");
        Ok(descriptor)
    }

    async fn get_collection(
        &self,
        name: &str,
    ) -> Result<Option<CollectionDescriptor>, RepositoryError> {
        let catalog = self.catalog().await?;
        let batches = Self::scan(&catalog, Some(format!("name = {}", sql_quote(name)))).await?;

        for batch in &batches {
            if let Some(descriptor) = Self::batch_to_descriptors(batch)?.into_iter().next() {
                return Ok(Some(descriptor));
            }
        }
        Ok(None)
    }

    async fn list_collections(&self) -> Result<Vec<String>, RepositoryError> {
        let catalog = self.catalog().await?;
        let batches = Self::scan(&catalog, None).await?;

        let mut names = Vec::new();
        for batch in &batches {
            let column = string_column(batch, "name")?;
            names.extend((0..batch.num_rows()).map(|i| column.value(i).to_string()));
        }
        names.sort();
        Ok(names)
    }

    async fn delete_collection(&self, name: &str) -> Result<(), RepositoryError> {
        self.require_descriptor(name).await?;

        // Unregister first: a table left behind is reclaimed by the next create.
        self.catalog()
            .await?
            .delete(&format!("name = {}", sql_quote(name)))
            .await
            .map_err(|e| RepositoryError::Query(format!("Failed to unregister collection: {e}")))?;

        self.store
            .drop_table(name)
            .await
            .map_err(|e| RepositoryError::Query(format!("Failed to drop collection: {e}")))?;

        Ok(())
    }

    async fn add(
        &self,
        collection: &str,
        records: &[Record],
        embeddings: &[Vec<f32>],
    ) -> Result<(), RepositoryError> {
        if records.is_empty() {
            return Ok(());
        }
        let descriptor = self.require_descriptor(collection).await?;
        let batch = Self::records_batch(records, embeddings, descriptor.dimension)?;
        let schema = batch.schema();
        let reader = RecordBatchIterator::new(vec![Ok(batch)], schema);

        self.collection_table(collection)
            .await?
            .add(reader)
            .execute()
            .await
            .map_err(|e| RepositoryError::Query(format!("Failed to add records: {e}")))?;

        Ok(())
    }

    async fn get(
        &self,
        collection: &str,
        filter: GetFilter,
    ) -> Result<Vec<Record>, RepositoryError> {
        let predicate = match &filter {
            GetFilter::All => None,
            GetFilter::Ids(ids) if ids.is_empty() => return Ok(Vec::new()),
            GetFilter::Documents(texts) if texts.is_empty() => return Ok(Vec::new()),
            GetFilter::Ids(ids) => Some(format!("id IN ({})", sql_list(ids))),
            GetFilter::Documents(texts) => Some(format!("text IN ({})", sql_list(texts))),
        };

        let table = self.collection_table(collection).await?;
        let batches = Self::scan(&table, predicate).await?;

        let mut records = Vec::new();
        for batch in &batches {
            records.extend(Self::batch_to_records(batch)?);
        }
        Ok(records)
    }

    async fn delete(&self, collection: &str, ids: &[String]) -> Result<(), RepositoryError> {
        if ids.is_empty() {
            return Ok(());
        }
        self.collection_table(collection)
            .await?
            .delete(&format!("id IN ({})", sql_list(ids)))
            .await
            .map_err(|e| RepositoryError::Query(format!("Failed to delete records: {e}")))?;
        Ok(())
    }

    async fn count(&self, collection: &str) -> Result<u64, RepositoryError> {
        let count = self
            .collection_table(collection)
            .await?
            .count_rows(None)
            .await
            .map_err(|e| RepositoryError::Query(format!("Failed to count rows: {e}")))?;
        Ok(count as u64)
    }

    async fn query(
        &self,
        collection: &str,
        embedding: &[f32],
        k: usize,
        contains: Option<&str>,
    ) -> Result<Vec<ScoredRecord>, RepositoryError> {
        let descriptor = self.require_descriptor(collection).await?;
        let distance_type = lance_distance(descriptor.metric)?;
        if embedding.len() != descriptor.dimension {
            return Err(RepositoryError::Query(format!(
                "query has {} dimensions, collection expects {}",
                embedding.len(),
                descriptor.dimension
            )));
        }
        if k == 0 {
            return Ok(Vec::new());
        }

        let table = self.collection_table(collection).await?;
        let mut query = table
            .vector_search(embedding)
            .map_err(|e| RepositoryError::Query(format!("Vector search setup failed: {e}")))?
            .distance_type(distance_type)
            .limit(k);
        if let Some(needle) = contains {
            query = query.only_if(format!(
                "text LIKE '%{}%' ESCAPE '{LIKE_ESCAPE}'",
                escape_like(needle)
            ));
        }

        let batches: Vec<RecordBatch> = query
            .execute()
            .await
            .map_err(|e| RepositoryError::Query(format!("Vector search failed: {e}")))?
            .try_collect()
            .await
            .map_err(|e| RepositoryError::Query(format!("Failed to collect results: {e}")))?;

        let mut scored = Vec::new();
        for batch in &batches {
            if batch.num_rows() == 0 {
                continue;
            }
            let distances = batch
                .column_by_name(DISTANCE_COLUMN)
                .and_then(|c| c.as_any().downcast_ref::<Float32Array>())
                .ok_or_else(|| {
                    RepositoryError::Query("search results have no distance column".to_string())
                })?;

            for (i, record) in Self::batch_to_records(batch)?.into_iter().enumerate() {
                scored.push(ScoredRecord {
                    id: record.id,
                    text: record.text,
                    distance: distances.value(i),
                });
            }
        }

        Ok(scored)
    }
}

/// Map a collection metric to LanceDB's distance type.
fn lance_distance(metric: DistanceMetric) -> Result<lancedb::DistanceType, RepositoryError> {
    match metric {
        DistanceMetric::L2 => Ok(lancedb::DistanceType::L2),
        DistanceMetric::Cosine => Ok(lancedb::DistanceType::Cosine),
        DistanceMetric::Ip => Ok(lancedb::DistanceType::Dot),
        DistanceMetric::L1 => Err(RepositoryError::UnsupportedMetric(metric.to_string())),
    }
}

fn string_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a StringArray, RepositoryError> {
    batch
        .column_by_name(name)
        .and_then(|c| c.as_any().downcast_ref::<StringArray>())
        .ok_or_else(|| RepositoryError::Query(format!("missing string column '{name}'")))
}

/// Quote a value as an SQL string literal.
fn sql_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

fn sql_list(values: &[String]) -> String {
    values
        .iter()
        .map(|v| sql_quote(v))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Escape character declared on every `LIKE` filter. Backslash is a plain
/// character in patterns.
const LIKE_ESCAPE: char = '!';

/// Escape a literal for use inside a `LIKE '%...%' ESCAPE '!'` pattern.
fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            LIKE_ESCAPE | '%' | '_' => {
                escaped.push(LIKE_ESCAPE);
                escaped.push(c);
            }
            '\'' => escaped.push_str("''"),
            other => escaped.push(other),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const DIM: usize = 8;

    /// Deterministic unit vector for a seed.
    fn make_embedding(seed: f32) -> Vec<f32> {
        let mut vec = vec![0.0_f32; DIM];
        for (i, val) in vec.iter_mut().enumerate() {
            *val = ((i as f32 + seed) * 0.7).sin();
        }
        let norm: f32 = vec.iter().map(|v| v * v).sum::<f32>().sqrt();
        for val in vec.iter_mut() {
            *val /= norm;
        }
        vec
    }

    fn metadata(metric: DistanceMetric) -> CollectionMetadata {
        let mut meta = CollectionMetadata::new();
        meta.insert("distance_metric".to_string(), json!(metric.to_string()));
        meta.insert("description".to_string(), json!("test collection"));
        meta
    }

    async fn setup_store() -> (LanceCollectionStore, tempfile::TempDir) {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let lance = LanceVectorStore::new(temp_dir.path().to_path_buf())
            .await
            .expect("Failed to create LanceVectorStore");
        (LanceCollectionStore::new(lance), temp_dir)
    }

    async fn seeded_store(metric: DistanceMetric) -> (LanceCollectionStore, tempfile::TempDir) {
        let (store, tmp) = setup_store().await;
        store
            .create_collection("faq", metric, DIM, &metadata(metric))
            .await
            .unwrap();

        let records = vec![
            Record::new("1", "how do I reset my password"),
            Record::new("2", "where is my invoice"),
            Record::new("3", "it's 100% refundable"),
        ];
        let embeddings: Vec<Vec<f32>> = (0..3).map(|i| make_embedding(i as f32)).collect();
        store.add("faq", &records, &embeddings).await.unwrap();
        (store, tmp)
    }

    #[tokio::test]
    async fn test_create_and_describe_collection() {
        let (store, _tmp) = setup_store().await;
        let created = store
            .create_collection("faq", DistanceMetric::Cosine, DIM, &metadata(DistanceMetric::Cosine))
            .await
            .unwrap();

        let found = store.get_collection("faq").await.unwrap().unwrap();
        assert_eq!(found.name, "faq");
        assert_eq!(found.metric, DistanceMetric::Cosine);
        assert_eq!(found.dimension, DIM);
        assert_eq!(found.metadata["description"], "test collection");
        assert_eq!(found.created_at.timestamp(), created.created_at.timestamp());
        assert_eq!(store.count("faq").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_get_collection_missing_returns_none() {
        let (store, _tmp) = setup_store().await;
        assert!(store.get_collection("ghost").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_collection_twice_conflicts() {
        let (store, _tmp) = seeded_store(DistanceMetric::L2).await;
        let err = store
            .create_collection("faq", DistanceMetric::L2, DIM, &metadata(DistanceMetric::L2))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_l1_collection_is_unsupported() {
        let (store, _tmp) = setup_store().await;
        let err = store
            .create_collection("manhattan", DistanceMetric::L1, DIM, &metadata(DistanceMetric::L1))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::UnsupportedMetric(ref m) if m == "l1"));
        assert!(store.get_collection("manhattan").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_and_delete_collections() {
        let (store, _tmp) = seeded_store(DistanceMetric::L2).await;
        store
            .create_collection("alpha", DistanceMetric::Ip, DIM, &metadata(DistanceMetric::Ip))
            .await
            .unwrap();
        assert_eq!(store.list_collections().await.unwrap(), vec!["alpha", "faq"]);

        store.delete_collection("faq").await.unwrap();
        assert_eq!(store.list_collections().await.unwrap(), vec!["alpha"]);
        assert!(store.store.open_table("faq").await.is_err());

        let err = store.delete_collection("faq").await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound));
    }

    #[tokio::test]
    async fn test_unregistered_table_is_not_a_collection() {
        let (store, _tmp) = setup_store().await;
        store
            .store
            .create_table("faq", Arc::new(collection_schema(4)))
            .await
            .unwrap();

        assert!(store.get_collection("faq").await.unwrap().is_none());
        assert!(store.list_collections().await.unwrap().is_empty());
        let err = store.delete_collection("faq").await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound));
    }

    #[tokio::test]
    async fn test_create_replaces_unregistered_table() {
        let (store, _tmp) = setup_store().await;
        store
            .store
            .create_table("faq", Arc::new(collection_schema(4)))
            .await
            .unwrap();

        let created = store
            .create_collection("faq", DistanceMetric::L2, DIM, &metadata(DistanceMetric::L2))
            .await
            .unwrap();
        assert_eq!(created.dimension, DIM);

        // The new table carries the collection's dimension, not the stale one.
        store
            .add("faq", &[Record::new("1", "hello")], &[make_embedding(0.0)])
            .await
            .unwrap();
        assert_eq!(store.count("faq").await.unwrap(), 1);
        assert_eq!(store.list_collections().await.unwrap(), vec!["faq"]);
    }

    #[tokio::test]
    async fn test_recreate_after_delete() {
        let (store, _tmp) = seeded_store(DistanceMetric::L2).await;
        store.delete_collection("faq").await.unwrap();

        store
            .create_collection("faq", DistanceMetric::Cosine, DIM, &metadata(DistanceMetric::Cosine))
            .await
            .unwrap();
        let found = store.get_collection("faq").await.unwrap().unwrap();
        assert_eq!(found.metric, DistanceMetric::Cosine);
        assert_eq!(store.count("faq").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_corrupt_catalog_timestamp_is_an_error() {
        let (store, _tmp) = setup_store().await;
        let row = RecordBatch::try_new(
            Arc::new(catalog_schema()),
            vec![
                Arc::new(StringArray::from(vec!["faq"])),
                Arc::new(StringArray::from(vec!["l2"])),
                Arc::new(Int32Array::from(vec![DIM as i32])),
                Arc::new(StringArray::from(vec!["{}"])),
                Arc::new(StringArray::from(vec!["not a timestamp"])),
            ],
        )
        .unwrap();
        let schema = row.schema();
        store
            .catalog()
            .await
            .unwrap()
            .add(RecordBatchIterator::new(vec![Ok(row)], schema))
            .execute()
            .await
            .unwrap();

        let err = store.get_collection("faq").await.unwrap_err();
        assert!(matches!(err, RepositoryError::Query(ref msg) if msg.contains("timestamp")));
    }

    #[tokio::test]
    async fn test_get_with_filters() {
        let (store, _tmp) = seeded_store(DistanceMetric::L2).await;

        let all = store.get("faq", GetFilter::All).await.unwrap();
        assert_eq!(all.len(), 3);

        let by_id = store
            .get("faq", GetFilter::Ids(vec!["2".to_string(), "9".to_string()]))
            .await
            .unwrap();
        assert_eq!(by_id, vec![Record::new("2", "where is my invoice")]);

        let by_text = store
            .get(
                "faq",
                GetFilter::Documents(vec!["it's 100% refundable".to_string()]),
            )
            .await
            .unwrap();
        assert_eq!(by_text.len(), 1);
        assert_eq!(by_text[0].id, "3");

        let none = store.get("faq", GetFilter::Ids(Vec::new())).await.unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_get_unknown_collection_is_not_found() {
        let (store, _tmp) = setup_store().await;
        let err = store.get("ghost", GetFilter::All).await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound));
    }

    #[tokio::test]
    async fn test_delete_records() {
        let (store, _tmp) = seeded_store(DistanceMetric::L2).await;
        store.delete("faq", &["1".to_string()]).await.unwrap();
        assert_eq!(store.count("faq").await.unwrap(), 2);

        let remaining = store
            .get("faq", GetFilter::Ids(vec!["1".to_string()]))
            .await
            .unwrap();
        assert!(remaining.is_empty());
    }

    #[tokio::test]
    async fn test_add_rejects_wrong_dimension() {
        let (store, _tmp) = seeded_store(DistanceMetric::L2).await;
        let err = store
            .add("faq", &[Record::new("4", "short")], &[vec![1.0, 2.0]])
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Query(ref m) if m.contains("dimensions")));
        assert_eq!(store.count("faq").await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_query_returns_nearest_first() {
        let (store, _tmp) = seeded_store(DistanceMetric::L2).await;
        let results = store
            .query("faq", &make_embedding(0.0), 3, None)
            .await
            .unwrap();

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].id, "1");
        assert!(results[0].distance.abs() < 1e-4);
        assert!(results.windows(2).all(|w| w[0].distance <= w[1].distance));
    }

    #[tokio::test]
    async fn test_query_cosine_identical_vector_has_zero_distance() {
        let (store, _tmp) = seeded_store(DistanceMetric::Cosine).await;
        let results = store
            .query("faq", &make_embedding(1.0), 1, None)
            .await
            .unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, "2");
        assert!(results[0].distance.abs() < 1e-4);
    }

    #[tokio::test]
    async fn test_query_contains_filter_is_literal() {
        let (store, _tmp) = seeded_store(DistanceMetric::L2).await;

        let results = store
            .query("faq", &make_embedding(0.0), 3, Some("100%"))
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, "3");

        let results = store
            .query("faq", &make_embedding(0.0), 3, Some("it's"))
            .await
            .unwrap();
        assert_eq!(results.len(), 1);

        let results = store
            .query("faq", &make_embedding(0.0), 3, Some("my"))
            .await
            .unwrap();
        assert_eq!(results.len(), 2);
    }

    #[tokio::test]
    async fn test_query_contains_filter_ignores_wildcards() {
        let (store, _tmp) = setup_store().await;
        store
            .create_collection("docs", DistanceMetric::L2, DIM, &metadata(DistanceMetric::L2))
            .await
            .unwrap();
        let records = vec![
            Record::new("1", "axb"),
            Record::new("2", "a_b"),
            Record::new("3", "50 off"),
            Record::new("4", "50% off"),
            Record::new("5", "C:\\dir\\file"),
            Record::new("6", "C:dirfile"),
            Record::new("7", "wow!"),
        ];
        let embeddings: Vec<Vec<f32>> = (0..records.len()).map(|i| make_embedding(i as f32)).collect();
        store.add("docs", &records, &embeddings).await.unwrap();

        let ids = |results: Vec<ScoredRecord>| -> Vec<String> {
            let mut ids: Vec<String> = results.into_iter().map(|r| r.id).collect();
            ids.sort();
            ids
        };
        let query = make_embedding(0.0);

        let underscore = store.query("docs", &query, 7, Some("a_b")).await.unwrap();
        assert_eq!(ids(underscore), vec!["2"]);

        let percent = store.query("docs", &query, 7, Some("50%")).await.unwrap();
        assert_eq!(ids(percent), vec!["4"]);

        let backslash = store.query("docs", &query, 7, Some("\\dir")).await.unwrap();
        assert_eq!(ids(backslash), vec!["5"]);

        let bang = store.query("docs", &query, 7, Some("!")).await.unwrap();
        assert_eq!(ids(bang), vec!["7"]);
    }

    #[tokio::test]
    async fn test_query_respects_k() {
        let (store, _tmp) = seeded_store(DistanceMetric::Ip).await;
        let results = store
            .query("faq", &make_embedding(2.0), 2, None)
            .await
            .unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].id, "3");
    }

    #[tokio::test]
    async fn test_collections_survive_reopen() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        {
            let lance = LanceVectorStore::new(temp_dir.path().to_path_buf())
                .await
                .unwrap();
            let store = LanceCollectionStore::new(lance);
            store
                .create_collection("faq", DistanceMetric::Cosine, DIM, &metadata(DistanceMetric::Cosine))
                .await
                .unwrap();
            store
                .add("faq", &[Record::new("1", "hello")], &[make_embedding(0.0)])
                .await
                .unwrap();
        }

        let lance = LanceVectorStore::new(temp_dir.path().to_path_buf())
            .await
            .unwrap();
        let store = LanceCollectionStore::new(lance);
        let descriptor = store.get_collection("faq").await.unwrap().unwrap();
        assert_eq!(descriptor.metric, DistanceMetric::Cosine);
        assert_eq!(store.count("faq").await.unwrap(), 1);
    }

    #[test]
    fn test_sql_quote_escapes_single_quotes() {
        assert_eq!(sql_quote("it's"), "'it''s'");
        assert_eq!(
            sql_list(&["a".to_string(), "b'c".to_string()]),
            "'a', 'b''c'"
        );
    }

    #[test]
    fn test_escape_like_escapes_wildcards() {
        assert_eq!(escape_like("50%_off!"), "50!%!_off!!");
        assert_eq!(escape_like("a\\b"), "a\\b");
        assert_eq!(escape_like("it's"), "it''s");
    }

    #[test]
    fn test_lance_distance_mapping() {
        assert!(matches!(lance_distance(DistanceMetric::L2), Ok(lancedb::DistanceType::L2)));
        assert!(matches!(
            lance_distance(DistanceMetric::Cosine),
            Ok(lancedb::DistanceType::Cosine)
        ));
        assert!(matches!(lance_distance(DistanceMetric::Ip), Ok(lancedb::DistanceType::Dot)));
        assert!(lance_distance(DistanceMetric::L1).is_err());
    }
}
