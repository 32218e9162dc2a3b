//! Business logic and port trait definitions for ragit.
//!
//! This crate defines the "ports" (embedder, vector store, record loader)
//! that the infrastructure layer implements, and the `VectorDbManager` that
//! drives them. It depends only on `ragit-types` -- never on `ragit-infra`
//! or any database/IO crate.

pub mod loader;
pub mod manager;
pub mod similarity;
pub mod vector;
