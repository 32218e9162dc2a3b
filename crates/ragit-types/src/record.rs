//! Records and query results.

use serde::{Deserialize, Serialize};

use crate::metric::DistanceMetric;

/// A single row of tabular input: an ID and the text to embed.
///
/// IDs are always strings; numeric IDs from the input are kept in their
/// textual form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    pub text: String,
}

impl Record {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
        }
    }
}

/// A record returned by a nearest-neighbour query, with its raw distance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredRecord {
    pub id: String,
    pub text: String,
    pub distance: f32,
}

/// One entry of a `find_nearby_texts` result.
///
/// `similarity` is on a 0-100 scale, rounded to four decimals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearbyText {
    pub id: String,
    pub text: String,
    pub similarity: f64,
    pub raw_distance: f32,
    pub metric: DistanceMetric,
}

/// Outcome of an incremental CSV import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddStats {
    pub total_entries: usize,
    pub new_entries_added: usize,
    pub skipped_entries: usize,
}
