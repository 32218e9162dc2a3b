//! Collection types: metadata, descriptors, and name validation.
//!
//! A collection is a named partition of records in the vector store. Its
//! metadata is a free-form JSON object that always carries the distance
//! metric under [`METRIC_KEY`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::metric::DistanceMetric;

/// Free-form collection metadata.
pub type CollectionMetadata = Map<String, Value>;

/// Metadata key holding the collection's distance metric tag.
pub const METRIC_KEY: &str = "distance_metric";

/// Metadata key holding the human-readable description.
pub const DESCRIPTION_KEY: &str = "description";

/// Longest accepted collection name.
pub const MAX_COLLECTION_NAME_LEN: usize = 63;

/// Build the default metadata for a collection created from `source`.
pub fn default_metadata(metric: DistanceMetric, source: &str) -> CollectionMetadata {
    let mut meta = Map::new();
    meta.insert(METRIC_KEY.to_string(), Value::String(metric.to_string()));
    meta.insert(
        DESCRIPTION_KEY.to_string(),
        Value::String(format!("Collection created from {source}")),
    );
    meta
}

/// Merge caller-supplied metadata over the defaults. Caller keys win.
pub fn merge_metadata(
    mut defaults: CollectionMetadata,
    overrides: Option<CollectionMetadata>,
) -> CollectionMetadata {
    if let Some(overrides) = overrides {
        defaults.extend(overrides);
    }
    defaults
}

/// Read the distance metric declared in collection metadata.
pub fn metric_from_metadata(meta: &CollectionMetadata) -> Result<DistanceMetric, String> {
    match meta.get(METRIC_KEY) {
        Some(Value::String(tag)) => tag.parse(),
        Some(other) => Err(format!("distance metric must be a string, got {other}")),
        None => Err(format!("metadata has no '{METRIC_KEY}' key")),
    }
}

/// Check that a collection name is usable as a table name.
///
/// Names are 1-63 characters of `[A-Za-z0-9_.-]` and must start with an
/// alphanumeric character. A leading `_` is reserved for internal tables.
pub fn validate_collection_name(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("collection name cannot be empty".to_string());
    }
    if name.len() > MAX_COLLECTION_NAME_LEN {
        return Err(format!(
            "collection name is longer than {MAX_COLLECTION_NAME_LEN} characters"
        ));
    }
    if !name.starts_with(|c: char| c.is_ascii_alphanumeric()) {
        return Err(format!(
            "collection name '{name}' must start with a letter or digit"
        ));
    }
    if let Some(bad) = name
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-')))
    {
        return Err(format!(
            "collection name '{name}' contains invalid character '{bad}'"
        ));
    }
    Ok(())
}

/// Everything the store knows about a collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionDescriptor {
    pub name: String,
    pub metric: DistanceMetric,
    /// Length of the embedding vectors stored in this collection.
    pub dimension: usize,
    pub metadata: CollectionMetadata,
    pub created_at: DateTime<Utc>,
}

/// Summary returned by `get_collection_info`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionInfo {
    pub name: String,
    pub count: u64,
    pub metadata: CollectionMetadata,
}
