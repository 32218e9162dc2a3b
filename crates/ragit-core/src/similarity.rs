//! Conversion of raw query distances into similarity scores.
//!
//! Cosine distances map directly (`1 - d`). For `ip`, `l1` and `l2` there is
//! no natural upper bound, so distances are scaled against the largest
//! distance in the current result batch. Scores are therefore only
//! comparable within a single query.

use ragit_types::metric::DistanceMetric;

/// Convert a batch of distances into similarities on a 0-1 scale.
///
/// - cosine: `1 - d`
/// - ip, l1, l2: `1 - d / max(batch)`, clamped to `[0, 1]`. A batch whose
///   maximum is not positive, or whose maximum equals its minimum, scores
///   1.0 everywhere.
pub fn to_similarity(metric: DistanceMetric, distances: &[f32]) -> Vec<f64> {
    match metric {
        DistanceMetric::Cosine => distances.iter().map(|&d| 1.0 - f64::from(d)).collect(),
        DistanceMetric::Ip | DistanceMetric::L1 | DistanceMetric::L2 => relative(distances),
    }
}

fn relative(distances: &[f32]) -> Vec<f64> {
    let max = distances
        .iter()
        .copied()
        .map(f64::from)
        .fold(f64::NEG_INFINITY, f64::max);
    let min = distances
        .iter()
        .copied()
        .map(f64::from)
        .fold(f64::INFINITY, f64::min);

    if max <= 0.0 || max == min {
        return vec![1.0; distances.len()];
    }

    distances
        .iter()
        .map(|&d| (1.0 - f64::from(d) / max).clamp(0.0, 1.0))
        .collect()
}

/// Scale a 0-1 similarity to a percentage rounded to four decimals.
pub fn to_percent(similarity: f64) -> f64 {
    (similarity * 100.0 * 10_000.0).round() / 10_000.0
}
