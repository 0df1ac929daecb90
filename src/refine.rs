// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Sub-cell peak refinement.
//!
//! Every integer peak is moved by a weighted centroid taken along each axis
//! over the detection window, then normalized to `[0, 1]` using cell centres:
//! `(index + 0.5 + offset) / extent`. An axis whose window would leave the
//! tensor keeps a zero offset.

use ndarray::{ArrayView2, ArrayView3, Axis};
use rayon::prelude::*;

use crate::peaks::GridPeak;

/// Largest offset applied along one axis, in cells.
const MAX_OFFSET: f32 = 0.5;

/// Normalized peak location as `[y, x]`.
pub type NormalizedPeak = [f32; 2];

/// Refine the peaks of every channel to normalized coordinates.
///
/// # Arguments
///
/// * `cmap` - Part-confidence heatmap `[C, H, W]`.
/// * `peaks` - Integer peaks per channel, as produced by [`find_peaks`](crate::peaks::find_peaks).
/// * `window_size` - Same window size used for detection.
///
/// # Returns
///
/// Normalized `[y, x]` per peak, indexed identically to `peaks`.
#[must_use]
pub fn refine_peaks(
    cmap: ArrayView3<'_, f32>,
    peaks: &[Vec<GridPeak>],
    window_size: usize,
) -> Vec<Vec<NormalizedPeak>> {
    peaks
        .par_iter()
        .enumerate()
        .map(|(c, channel_peaks)| {
            let map = cmap.index_axis(Axis(0), c);
            channel_peaks
                .iter()
                .map(|&peak| refine_peak(map, peak, window_size))
                .collect()
        })
        .collect()
}

/// Refine one peak of a `[H, W]` channel.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn refine_peak(map: ArrayView2<'_, f32>, peak: GridPeak, window_size: usize) -> NormalizedPeak {
    let (height, width) = map.dim();
    let (i, j) = peak;
    let radius = window_size / 2;

    let dy = axis_offset(radius, i, height, |k| map[[k, j]]);
    let dx = axis_offset(radius, j, width, |k| map[[i, k]]);

    let y = (i as f32 + 0.5 + dy) / height as f32;
    let x = (j as f32 + 0.5 + dx) / width as f32;
    [y.clamp(0.0, 1.0), x.clamp(0.0, 1.0)]
}

/// Weighted centroid offset of the window line through `center`.
#[allow(clippy::cast_precision_loss, clippy::cast_possible_wrap)]
fn axis_offset<F>(radius: usize, center: usize, extent: usize, value_at: F) -> f32
where
    F: Fn(usize) -> f32,
{
    if radius == 0 || center < radius || center + radius >= extent {
        return 0.0;
    }

    let mut weight_sum = 0.0f32;
    let mut moment = 0.0f32;
    for k in center - radius..=center + radius {
        let weight = value_at(k);
        if !weight.is_finite() || weight <= 0.0 {
            continue;
        }
        weight_sum += weight;
        moment += weight * (k as isize - center as isize) as f32;
    }

    if weight_sum > 0.0 {
        (moment / weight_sum).clamp(-MAX_OFFSET, MAX_OFFSET)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array2, Array3};

    #[test]
    fn test_sharp_peak_is_cell_centre() {
        let mut map = Array2::<f32>::zeros((10, 20));
        map[[4, 9]] = 1.0;
        let [y, x] = refine_peak(map.view(), (4, 9), 5);
        assert!((y - 0.45).abs() < 1e-6);
        assert!((x - 0.475).abs() < 1e-6);
    }

    #[test]
    fn test_offset_follows_heavier_neighbour() {
        let mut map = Array2::<f32>::zeros((10, 10));
        map[[5, 5]] = 1.0;
        map[[5, 6]] = 1.0;
        map[[6, 5]] = 0.25;
        let [y, x] = refine_peak(map.view(), (5, 5), 3);
        // x: centroid of {0: 1.0, +1: 1.0} = +0.5
        assert!((x - 0.6).abs() < 1e-6);
        // y: centroid of {0: 1.0, +1: 0.25} = +0.2
        assert!((y - 0.57).abs() < 1e-6);
    }

    #[test]
    fn test_border_falls_back_to_zero_offset() {
        let mut map = Array2::<f32>::zeros((8, 8));
        map[[0, 7]] = 1.0;
        map[[1, 7]] = 0.9;
        map[[0, 6]] = 0.9;
        let [y, x] = refine_peak(map.view(), (0, 7), 3);
        assert!((y - 0.0625).abs() < 1e-6);
        assert!((x - 0.9375).abs() < 1e-6);
    }

    #[test]
    fn test_nan_neighbours_ignored() {
        let mut map = Array2::<f32>::zeros((8, 8));
        map[[4, 4]] = 1.0;
        map[[4, 5]] = f32::NAN;
        map[[3, 4]] = f32::INFINITY;
        let [y, x] = refine_peak(map.view(), (4, 4), 3);
        assert!((y - 0.5625).abs() < 1e-6);
        assert!((x - 0.5625).abs() < 1e-6);
    }

    #[test]
    fn test_refine_keeps_indexing() {
        let mut cmap = Array3::<f32>::zeros((2, 4, 4));
        cmap[[0, 1, 1]] = 1.0;
        cmap[[0, 3, 3]] = 1.0;
        let peaks = vec![vec![(1, 1), (3, 3)], vec![]];
        let refined = refine_peaks(cmap.view(), &peaks, 1);
        assert_eq!(refined.len(), 2);
        assert_eq!(refined[0], vec![[0.375, 0.375], [0.875, 0.875]]);
        assert!(refined[1].is_empty());
    }
}
