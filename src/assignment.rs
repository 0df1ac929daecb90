// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Greedy one-to-one limb assignment.
//!
//! Each limb type's score matrix is resolved on its own: the highest remaining
//! entry is accepted, its row and column are struck out, and the process
//! repeats until the best entry falls below the link threshold, the matrix is
//! exhausted, or the per-limb cap is reached. Ties go to the first entry in
//! row-major order.
//!
//! This is not an optimal bipartite matching. A Hungarian solver could be
//! dropped in per limb without changing the output contract.

use ndarray::{Array2, ArrayView2};

/// Per limb, the B-candidate matched to each A-candidate.
pub type Connection = Vec<Option<usize>>;

/// Resolve every score matrix into an injective matching.
///
/// # Arguments
///
/// * `score_graphs` - One matrix per limb type, rows are A-candidates.
/// * `link_threshold` - Entries below this value are never accepted.
/// * `max_parts` - Maximum accepted pairs per limb type.
#[must_use]
pub fn assignment(
    score_graphs: &[Array2<f32>],
    link_threshold: f32,
    max_parts: usize,
) -> Vec<Connection> {
    score_graphs
        .iter()
        .map(|scores| assign_limb(scores.view(), link_threshold, max_parts))
        .collect()
}

/// Greedy matching for a single limb type.
#[must_use]
pub fn assign_limb(scores: ArrayView2<'_, f32>, link_threshold: f32, max_pairs: usize) -> Connection {
    let (rows, cols) = scores.dim();
    let mut connection = vec![None; rows];
    let mut col_taken = vec![false; cols];
    let mut accepted = 0;

    while accepted < max_pairs {
        let mut best: Option<(usize, usize, f32)> = None;
        for (r, row) in scores.outer_iter().enumerate() {
            if connection[r].is_some() {
                continue;
            }
            for (c, &score) in row.iter().enumerate() {
                if col_taken[c] || score.is_nan() {
                    continue;
                }
                if best.is_none_or(|(_, _, top)| score > top) {
                    best = Some((r, c, score));
                }
            }
        }

        let Some((r, c, score)) = best else { break };
        if score < link_threshold {
            break;
        }
        connection[r] = Some(c);
        col_taken[c] = true;
        accepted += 1;
    }

    connection
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_greedy_picks_highest_first() {
        let scores = array![[0.9, 0.8], [0.85, 0.1]];
        // 0.9 at (0,0) wins, leaving (1,1) = 0.1
        assert_eq!(assign_limb(scores.view(), 0.1, 2), vec![Some(0), Some(1)]);
        assert_eq!(assign_limb(scores.view(), 0.2, 2), vec![Some(0), None]);
    }

    #[test]
    fn test_cap_limits_pairs() {
        let scores = array![[0.9, 0.0], [0.0, 0.8]];
        assert_eq!(assign_limb(scores.view(), 0.1, 1), vec![Some(0), None]);
        assert_eq!(assign_limb(scores.view(), 0.1, 0), vec![None, None]);
    }

    #[test]
    fn test_ties_prefer_row_major_order() {
        let scores = array![[0.5, 0.5], [0.5, 0.5]];
        assert_eq!(assign_limb(scores.view(), 0.1, 2), vec![Some(0), Some(1)]);
    }

    #[test]
    fn test_nan_entries_skipped() {
        let scores = array![[f32::NAN, 0.4], [0.6, f32::NAN]];
        assert_eq!(assign_limb(scores.view(), 0.1, 2), vec![Some(1), Some(0)]);
    }

    #[test]
    fn test_empty_matrices() {
        let graphs = vec![Array2::<f32>::zeros((0, 3)), Array2::<f32>::zeros((2, 0))];
        assert_eq!(assignment(&graphs, 0.1, 2), vec![vec![], vec![None, None]]);
    }

    #[test]
    fn test_transpose_symmetry() {
        let scores = array![[0.2, 0.7, 0.3], [0.6, 0.65, 0.1], [0.05, 0.4, 0.9]];
        let forward = assign_limb(scores.view(), 0.1, 3);
        let backward = assign_limb(scores.t(), 0.1, 3);
        for (a, b) in forward.iter().enumerate() {
            if let Some(b) = b {
                assert_eq!(backward[*b], Some(a));
            }
        }
        assert_eq!(
            forward.iter().flatten().count(),
            backward.iter().flatten().count()
        );
    }
}
