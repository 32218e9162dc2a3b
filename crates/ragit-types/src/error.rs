use thiserror::Error;

/// Errors from the vector store and embedding adapters.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("distance metric '{0}' is not supported by this store")]
    UnsupportedMetric(String),

    #[error("embedding error: {0}")]
    Embedding(String),
}

/// Errors from loading tabular input.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read input: {0}")]
    Io(String),

    #[error("input is missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("malformed input: {0}")]
    Parse(String),
}

/// Errors surfaced by `VectorDbManager` operations.
#[derive(Debug, Error)]
pub enum ManagerError {
    #[error("CSV must contain 'id' and 'text' columns (missing: {})", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid collection name: {0}")]
    InvalidCollectionName(String),

    #[error("invalid distance metric: {0}")]
    InvalidMetric(String),

    #[error("collection '{0}' already exists")]
    CollectionExists(String),

    #[error("collection '{0}' not found")]
    CollectionNotFound(String),

    #[error("ID {0} already exists in collection")]
    DuplicateId(String),

    #[error("ID {0} not found in collection")]
    IdNotFound(String),

    #[error("deletion cancelled - confirmation not provided")]
    ConfirmationRequired,

    #[error("embedding error: {0}")]
    Embedding(String),

    #[error("storage error: {0}")]
    Storage(String),
}

impl From<LoadError> for ManagerError {
    fn from(err: LoadError) -> Self {
        match err {
            LoadError::MissingColumns(columns) => ManagerError::MissingColumns(columns),
            other => ManagerError::InvalidInput(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_error_display() {
        let err = RepositoryError::Query("syntax error".to_string());
        assert_eq!(err.to_string(), "query error: syntax error");
    }

    #[test]
    fn test_missing_columns_display_lists_columns() {
        let err = LoadError::MissingColumns(vec!["id".to_string(), "text".to_string()]);
        assert_eq!(err.to_string(), "input is missing required columns: id, text");
    }

    #[test]
    fn test_load_error_maps_to_manager_error() {
        let err: ManagerError = LoadError::MissingColumns(vec!["text".to_string()]).into();
        assert!(matches!(err, ManagerError::MissingColumns(ref c) if c == &["text"]));

        let err: ManagerError = LoadError::Io("no such file".to_string()).into();
        assert!(matches!(err, ManagerError::InvalidInput(_)));
    }

    #[test]
    fn test_duplicate_id_display() {
        let err = ManagerError::DuplicateId("42".to_string());
        assert_eq!(err.to_string(), "ID 42 already exists in collection");
    }
}
