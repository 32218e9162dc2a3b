//! Embedding and vector store ports.

pub mod box_embedder;
pub mod embedder;
pub mod store;
