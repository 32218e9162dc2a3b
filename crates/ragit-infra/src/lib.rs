//! Infrastructure layer for ragit.
//!
//! Contains implementations of the port traits defined in `ragit-core`:
//! LanceDB collection storage, fastembed local embeddings, and CSV record
//! loading, plus configuration and data directory resolution.

pub mod config;
pub mod loader;
pub mod vector;
