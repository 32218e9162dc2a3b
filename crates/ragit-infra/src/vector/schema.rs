//! Arrow schema definitions for LanceDB tables.
//!
//! Each collection is its own table of `id`, `text` and a float32 vector
//! sized to the embedding model. A single catalog table records every
//! collection's metric, dimension and metadata.
//!
//! Arrow versions MUST match lancedb's transitive dependency (57.3 for lancedb 0.26).

use std::sync::Arc;

use arrow_schema::{DataType, Field, Schema};

/// Name of the catalog table. The leading underscore keeps it out of the
/// collection namespace.
pub const CATALOG_TABLE: &str = "_ragit_collections";

/// Name of the distance column LanceDB adds to vector search results.
pub const DISTANCE_COLUMN: &str = "_distance";

/// Schema for a collection table holding `dimension`-length embeddings.
pub fn collection_schema(dimension: i32) -> Schema {
    Schema::new(vec![
        Field::new("id", DataType::Utf8, false),
        Field::new("text", DataType::Utf8, false),
        Field::new(
            "vector",
            DataType::FixedSizeList(
                Arc::new(Field::new("item", DataType::Float32, true)),
                dimension,
            ),
            false,
        ),
    ])
}

/// Schema for the collection catalog.
///
/// `metadata` holds the collection metadata as a JSON object string.
pub fn catalog_schema() -> Schema {
    Schema::new(vec![
        Field::new("name", DataType::Utf8, false),
        Field::new("metric", DataType::Utf8, false),
        Field::new("dimension", DataType::Int32, false),
        Field::new("metadata", DataType::Utf8, false),
        Field::new("created_at", DataType::Utf8, false),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collection_schema_has_correct_fields() {
        let schema = collection_schema(384);
        assert_eq!(schema.fields().len(), 3);
        assert!(schema.field_with_name("id").is_ok());
        assert!(schema.field_with_name("text").is_ok());

        let vector_field = schema.field_with_name("vector").unwrap();
        match vector_field.data_type() {
            DataType::FixedSizeList(_, size) => assert_eq!(*size, 384),
            other => panic!("Expected FixedSizeList, got {:?}", other),
        }
    }

    #[test]
    fn test_collection_schema_follows_dimension() {
        let schema = collection_schema(768);
        let vector_field = schema.field_with_name("vector").unwrap();
        assert!(matches!(vector_field.data_type(), DataType::FixedSizeList(_, 768)));
    }

    #[test]
    fn test_catalog_schema_has_correct_fields() {
        let schema = catalog_schema();
        assert_eq!(schema.fields().len(), 5);
        for name in ["name", "metric", "dimension", "metadata", "created_at"] {
            assert!(schema.field_with_name(name).is_ok(), "missing {name}");
        }
    }

    #[test]
    fn test_catalog_table_is_reserved_name() {
        assert!(ragit_types::collection::validate_collection_name(CATALOG_TABLE).is_err());
    }
}
