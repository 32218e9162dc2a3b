//! Vector database infrastructure for collection embeddings.
//!
//! Provides LanceDB connection management, the LanceDB-backed
//! `VectorStore`, and fastembed-based local embedding generation. Arrow
//! schemas define the table structures.

pub mod collection;
pub mod embedder;
pub mod lance;
pub mod schema;
