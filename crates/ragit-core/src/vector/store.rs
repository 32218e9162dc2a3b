//! Vector store trait.
//!
//! Defines the named-collection interface the manager forwards to.
//! Implementations (e.g., LanceDB) live in ragit-infra. The store owns all
//! collection state; callers never cache it.

use ragit_types::collection::{CollectionDescriptor, CollectionMetadata};
use ragit_types::error::RepositoryError;
use ragit_types::metric::DistanceMetric;
use ragit_types::record::{Record, ScoredRecord};

/// Which records a `get` call returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GetFilter {
    /// Every record in the collection.
    All,
    /// Records whose ID is in the list.
    Ids(Vec<String>),
    /// Records whose text equals one of the given strings exactly.
    Documents(Vec<String>),
}

/// Trait for a persistent store of named, vector-indexed collections.
///
/// Uses RPITIT (native async fn in traits, Rust 2024 edition).
pub trait VectorStore: Send + Sync {
    /// Create an empty collection.
    ///
    /// Fails with `RepositoryError::Conflict` if the name is taken and with
    /// `RepositoryError::UnsupportedMetric` if the store cannot rank by `metric`.
    fn create_collection(
        &self,
        name: &str,
        metric: DistanceMetric,
        dimension: usize,
        metadata: &CollectionMetadata,
    ) -> impl std::future::Future<Output = Result<CollectionDescriptor, RepositoryError>> + Send;

    /// Look up a collection. Returns `Ok(None)` if it does not exist.
    fn get_collection(
        &self,
        name: &str,
    ) -> impl std::future::Future<Output = Result<Option<CollectionDescriptor>, RepositoryError>> + Send;

    /// Names of all collections, sorted.
    fn list_collections(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<String>, RepositoryError>> + Send;

    /// Delete a collection and all its records.
    ///
    /// Fails with `RepositoryError::NotFound` if it does not exist.
    fn delete_collection(
        &self,
        name: &str,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Insert records with their embeddings. `embeddings[i]` belongs to `records[i]`.
    fn add(
        &self,
        collection: &str,
        records: &[Record],
        embeddings: &[Vec<f32>],
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Fetch records matching `filter`.
    fn get(
        &self,
        collection: &str,
        filter: GetFilter,
    ) -> impl std::future::Future<Output = Result<Vec<Record>, RepositoryError>> + Send;

    /// Delete records by ID. Missing IDs are ignored.
    fn delete(
        &self,
        collection: &str,
        ids: &[String],
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Count the records in a collection.
    fn count(
        &self,
        collection: &str,
    ) -> impl std::future::Future<Output = Result<u64, RepositoryError>> + Send;

    /// k-nearest-neighbour query using the collection's metric.
    ///
    /// When `contains` is set, only documents containing that literal
    /// substring are considered. Results come back nearest first.
    fn query(
        &self,
        collection: &str,
        embedding: &[f32],
        k: usize,
        contains: Option<&str>,
    ) -> impl std::future::Future<Output = Result<Vec<ScoredRecord>, RepositoryError>> + Send;
}
