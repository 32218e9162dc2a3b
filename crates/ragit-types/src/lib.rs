//! Shared domain types for ragit.
//!
//! Records, collections, distance metrics, query results, configuration and
//! the error enums used across the workspace.
//!
//! Zero infrastructure dependencies -- only serde, serde_json, chrono, thiserror.

pub mod collection;
pub mod config;
pub mod error;
pub mod metric;
pub mod record;
