//! Distance metrics a collection can be declared with.

use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;

/// Distance function used by the store to rank nearest neighbours.
///
/// The metric is fixed when a collection is created and decides how raw
/// distances are turned into similarity scores.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceMetric {
    /// Euclidean distance.
    #[default]
    L2,
    /// Cosine distance (`1 - cosine similarity`).
    Cosine,
    /// Inner product.
    Ip,
    /// Manhattan distance.
    L1,
}

impl DistanceMetric {
    /// All metrics, in declaration order.
    pub const ALL: [DistanceMetric; 4] = [
        DistanceMetric::L2,
        DistanceMetric::Cosine,
        DistanceMetric::Ip,
        DistanceMetric::L1,
    ];

    /// The lowercase tag stored in collection metadata.
    pub fn as_str(&self) -> &'static str {
        match self {
            DistanceMetric::L2 => "l2",
            DistanceMetric::Cosine => "cosine",
            DistanceMetric::Ip => "ip",
            DistanceMetric::L1 => "l1",
        }
    }
}

impl fmt::Display for DistanceMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DistanceMetric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "l2" => Ok(DistanceMetric::L2),
            "cosine" => Ok(DistanceMetric::Cosine),
            "ip" => Ok(DistanceMetric::Ip),
            "l1" => Ok(DistanceMetric::L1),
            other => Err(format!("invalid distance metric: '{other}'")),
        }
    }
}
