// cobuy/core/recommender/src/neighbors.rs

//! Brute-force cosine nearest neighbors over matrix rows.

use crate::matrix::InteractionMatrix;
use crate::types::RecommendError;

/// A matrix row selected as neighbor of the target row
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub row: usize,
    pub distance: f64,
}

/// Cosine distance `1 - cos(a, b)`, clipped to `[0, 2]`.
///
/// A zero vector on either side has similarity 0, so its distance is 1.
pub fn cosine_distance(a: &[u64], b: &[u64]) -> f64 {
    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;

    for (&x, &y) in a.iter().zip(b) {
        let (x, y) = (x as f64, y as f64);
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 1.0;
    }

    // sqrt(n * n) == n exactly, so a row is at distance 0.0 from itself
    let similarity = dot / (norm_a * norm_b).sqrt();
    (1.0 - similarity).clamp(0.0, 2.0)
}

/// The `k` rows closest to `target`, ascending by distance.
///
/// The target row is a candidate like any other. Equal distances keep row
/// order, so the lower row index wins a tie.
pub fn nearest_neighbors(
    matrix: &InteractionMatrix,
    target: usize,
    k: usize,
) -> Result<Vec<Neighbor>, RecommendError> {
    let mut best: Vec<Neighbor> = Vec::with_capacity(k + 1);
    if k == 0 {
        return Ok(best);
    }

    let target_row = matrix.row(target);
    for row in 0..matrix.num_users() {
        let distance = cosine_distance(target_row, matrix.row(row));
        if !distance.is_finite() {
            return Err(RecommendError::NonFiniteDistance {
                user_id: matrix.user_ids()[row],
            });
        }

        if best.len() == k && distance >= best[k - 1].distance {
            continue;
        }

        // Insert after every entry with distance <= ours to keep ties in row order
        let position = best.partition_point(|n| n.distance <= distance);
        best.insert(position, Neighbor { row, distance });
        best.truncate(k);
    }

    Ok(best)
}
