// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Part-affinity scoring.
//!
//! For every limb type a dense score matrix is built between the candidates of
//! its two part types. A pair's score is the mean projection of the limb's
//! vector field onto the unit direction of the segment joining the two peaks,
//! sampled at evenly spaced points that include both endpoints.

use ndarray::{Array2, ArrayView3, Axis};
use rayon::prelude::*;

use crate::refine::NormalizedPeak;
use crate::topology::{Limb, Topology};

/// Segments shorter than this (in grid cells) score zero.
const EPS: f32 = 1e-6;

/// Build one score matrix per limb type.
///
/// # Arguments
///
/// * `paf` - Part affinity field `[2L, H, W]`.
/// * `topology` - Limb table naming part types and field channels.
/// * `peaks` - Refined, normalized peaks per part type.
/// * `num_samples` - Samples along each candidate segment.
///
/// # Returns
///
/// For limb `k`, an array of shape `(peaks[part_a].len(), peaks[part_b].len())`.
///
/// # Panics
///
/// Panics if a limb names a field channel that `paf` does not have.
/// [`PoseDecoder`](crate::PoseDecoder) rules this out when it is built.
#[must_use]
pub fn score_graph(
    paf: ArrayView3<'_, f32>,
    topology: &Topology,
    peaks: &[Vec<NormalizedPeak>],
    num_samples: usize,
) -> Vec<Array2<f32>> {
    topology
        .limbs()
        .par_iter()
        .map(|limb| score_limb(paf, limb, peaks, num_samples))
        .collect()
}

/// Score every candidate pair of a single limb type.
#[must_use]
pub fn score_limb(
    paf: ArrayView3<'_, f32>,
    limb: &Limb,
    peaks: &[Vec<NormalizedPeak>],
    num_samples: usize,
) -> Array2<f32> {
    let empty = Vec::new();
    let peaks_a = peaks.get(limb.part_a).unwrap_or(&empty);
    let peaks_b = peaks.get(limb.part_b).unwrap_or(&empty);
    let mut scores = Array2::zeros((peaks_a.len(), peaks_b.len()));

    let field = FieldPair::new(paf, limb);
    for (a, peak_a) in peaks_a.iter().enumerate() {
        for (b, peak_b) in peaks_b.iter().enumerate() {
            scores[[a, b]] = field.line_integral(*peak_a, *peak_b, num_samples);
        }
    }

    scores
}

/// The two channels of one limb's vector field.
struct FieldPair<'a> {
    paf: ArrayView3<'a, f32>,
    x_channel: usize,
    y_channel: usize,
    height: usize,
    width: usize,
}

impl<'a> FieldPair<'a> {
    fn new(paf: ArrayView3<'a, f32>, limb: &Limb) -> Self {
        Self {
            height: paf.len_of(Axis(1)),
            width: paf.len_of(Axis(2)),
            paf,
            x_channel: limb.paf_x,
            y_channel: limb.paf_y,
        }
    }

    /// Mean of `field · u` over the segment from `a` to `b` (normalized `[y, x]`).
    #[allow(clippy::cast_precision_loss)]
    fn line_integral(&self, a: NormalizedPeak, b: NormalizedPeak, num_samples: usize) -> f32 {
        if num_samples == 0 || self.height == 0 || self.width == 0 {
            return 0.0;
        }
        let (h, w) = (self.height as f32, self.width as f32);
        let (ay, ax) = (a[0] * h, a[1] * w);
        let (by, bx) = (b[0] * h, b[1] * w);
        let (dy, dx) = (by - ay, bx - ax);
        let norm = dy.hypot(dx);
        if !norm.is_finite() || norm < EPS {
            return 0.0;
        }
        let (uy, ux) = (dy / norm, dx / norm);

        let steps = num_samples.saturating_sub(1).max(1) as f32;
        let mut integral = 0.0f32;
        for t in 0..num_samples {
            let progress = t as f32 / steps;
            let row = grid_index(dy.mul_add(progress, ay), self.height);
            let col = grid_index(dx.mul_add(progress, ax), self.width);
            let fx = self.paf[[self.x_channel, row, col]];
            let fy = self.paf[[self.y_channel, row, col]];
            let dot = fx.mul_add(ux, fy * uy);
            if dot.is_finite() {
                integral += dot;
            }
        }

        let score = integral / num_samples as f32;
        if score.is_finite() { score } else { 0.0 }
    }
}

/// Nearest cell containing grid coordinate `p`, clamped to `0..extent`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn grid_index(p: f32, extent: usize) -> usize {
    if p.is_nan() || p <= 0.0 {
        0
    } else {
        (p.floor() as usize).min(extent - 1)
    }
}
