// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Peak finding on the part-confidence heatmap.
//!
//! Each heatmap channel is scanned in raster order for cells that exceed the
//! confidence threshold and dominate a square window centred on them. Windows
//! are clipped at the tensor border. When two cells in a window hold the same
//! value the one scanned first wins, so a plateau yields exactly one peak.

use ndarray::{ArrayView2, ArrayView3, Axis};
use rayon::prelude::*;

/// Integer grid location of a peak as `(row, col)`.
pub type GridPeak = (usize, usize);

/// Find peaks in every channel of a `[C, H, W]` heatmap.
///
/// # Arguments
///
/// * `cmap` - Part-confidence heatmap.
/// * `threshold` - A cell must be strictly above this value to qualify.
/// * `window_size` - Side of the local-maximum window (radius `window_size / 2`).
/// * `max_parts` - Per-channel cap; the earliest-scanned peaks are kept.
///
/// # Returns
///
/// One list of peaks per channel, in raster order.
#[must_use]
pub fn find_peaks(
    cmap: ArrayView3<'_, f32>,
    threshold: f32,
    window_size: usize,
    max_parts: usize,
) -> Vec<Vec<GridPeak>> {
    let channels = cmap.len_of(Axis(0));
    (0..channels)
        .into_par_iter()
        .map(|c| find_channel_peaks(cmap.index_axis(Axis(0), c), threshold, window_size, max_parts))
        .collect()
}

/// Find peaks in a single `[H, W]` heatmap channel.
#[must_use]
pub fn find_channel_peaks(
    map: ArrayView2<'_, f32>,
    threshold: f32,
    window_size: usize,
    max_parts: usize,
) -> Vec<GridPeak> {
    let (height, width) = map.dim();
    let radius = window_size / 2;
    let mut peaks = Vec::with_capacity(max_parts.min(height * width));
    if max_parts == 0 {
        return peaks;
    }

    for i in 0..height {
        for j in 0..width {
            let val = map[[i, j]];
            if val.is_nan() || val <= threshold {
                continue;
            }
            if is_window_max(map, i, j, radius) {
                peaks.push((i, j));
                if peaks.len() == max_parts {
                    return peaks;
                }
            }
        }
    }

    peaks
}

/// Whether `(i, j)` wins its clipped window, with raster-order tie-breaking.
fn is_window_max(map: ArrayView2<'_, f32>, i: usize, j: usize, radius: usize) -> bool {
    let (height, width) = map.dim();
    let val = map[[i, j]];
    let i_min = i.saturating_sub(radius);
    let i_max = (i + radius + 1).min(height);
    let j_min = j.saturating_sub(radius);
    let j_max = (j + radius + 1).min(width);

    for ii in i_min..i_max {
        for jj in j_min..j_max {
            let other = map[[ii, jj]];
            let scanned_earlier = (ii, jj) < (i, j);
            if other > val || (scanned_earlier && other == val) {
                return false;
            }
        }
    }
    true
}
