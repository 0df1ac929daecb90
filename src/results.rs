// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Decoder output.
//!
//! [`Poses`] carries the skeletons of one frame together with the refined peak
//! table their slots index into. Coordinates stay normalized; mapping them to
//! a render resolution is left to the consumer, with [`Poses::to_pixels`] as a
//! convenience.

use ndarray::Array3;
use serde::Serialize;

use crate::connect::Skeleton;
use crate::refine::NormalizedPeak;
use crate::topology::Topology;

/// Timing information for each decoder stage (in milliseconds).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DecodeSpeed {
    /// Time spent finding heatmap peaks.
    pub find_peaks: f64,
    /// Time spent refining peaks.
    pub refine: f64,
    /// Time spent scoring candidate pairs.
    pub score: f64,
    /// Time spent on limb assignment.
    pub assign: f64,
    /// Time spent assembling skeletons.
    pub connect: f64,
}

impl DecodeSpeed {
    /// Get total decode time.
    ///
    /// # Returns
    ///
    /// * Sum of all stage timings in milliseconds.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.find_peaks + self.refine + self.score + self.assign + self.connect
    }
}

/// A limb of one skeleton with both endpoints present.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LimbSegment {
    /// Index of the limb type in the topology.
    pub limb: usize,
    /// Normalized `[y, x]` of the limb's first part.
    pub from: NormalizedPeak,
    /// Normalized `[y, x]` of the limb's second part.
    pub to: NormalizedPeak,
}

/// Skeletons decoded from one frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Poses {
    /// One entry per person; slot `p` holds a candidate index of part type `p`.
    pub skeletons: Vec<Skeleton>,
    /// Refined peaks per part type as normalized `[y, x]`.
    pub peaks: Vec<Vec<NormalizedPeak>>,
    /// Stage timings for this frame.
    pub speed: DecodeSpeed,
}

impl Poses {
    /// Create a new Poses instance.
    ///
    /// # Arguments
    ///
    /// * `skeletons` - Assembled skeletons.
    /// * `peaks` - Refined peak table the skeleton slots index into.
    /// * `speed` - Timing information.
    #[must_use]
    pub fn new(
        skeletons: Vec<Skeleton>,
        peaks: Vec<Vec<NormalizedPeak>>,
        speed: DecodeSpeed,
    ) -> Self {
        Self {
            skeletons,
            peaks,
            speed,
        }
    }

    /// Number of skeletons.
    #[must_use]
    pub fn len(&self) -> usize {
        self.skeletons.len()
    }

    /// Check if no skeleton was found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.skeletons.is_empty()
    }

    /// Number of candidates per part type.
    #[must_use]
    pub fn counts(&self) -> Vec<usize> {
        self.peaks.iter().map(Vec::len).collect()
    }

    /// Normalized `[y, x]` of one part of one skeleton, if present.
    #[must_use]
    pub fn keypoint(&self, skeleton: usize, part: usize) -> Option<NormalizedPeak> {
        let candidate = (*self.skeletons.get(skeleton)?.get(part)?)?;
        self.peaks.get(part)?.get(candidate).copied()
    }

    /// Normalized `[y, x]` of every part of one skeleton.
    ///
    /// # Returns
    ///
    /// * One entry per part type, `None` where the slot is empty. Empty when
    ///   `skeleton` is out of range.
    #[must_use]
    pub fn keypoints_for(&self, skeleton: usize) -> Vec<Option<NormalizedPeak>> {
        self.skeletons.get(skeleton).map_or_else(Vec::new, |slots| {
            (0..slots.len())
                .map(|part| self.keypoint(skeleton, part))
                .collect()
        })
    }

    /// Keypoints scaled to a render resolution.
    ///
    /// # Arguments
    ///
    /// * `width` - Target width in pixels.
    /// * `height` - Target height in pixels.
    ///
    /// # Returns
    ///
    /// * Array of shape `(N, C, 3)` holding `[x, y, visible]`, where `visible`
    ///   is `1.0` for filled slots and `0.0` (with zero coordinates) otherwise.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn to_pixels(&self, width: u32, height: u32) -> Array3<f32> {
        self.scaled(width as f32, height as f32)
    }

    /// Normalized keypoints in the same `(N, C, 3)` `[x, y, visible]` layout as
    /// [`Poses::to_pixels`].
    #[must_use]
    pub fn xyn(&self) -> Array3<f32> {
        self.scaled(1.0, 1.0)
    }

    fn scaled(&self, sx: f32, sy: f32) -> Array3<f32> {
        let num_parts = self.peaks.len();
        let mut data = Array3::zeros((self.skeletons.len(), num_parts, 3));
        for n in 0..self.skeletons.len() {
            for part in 0..num_parts {
                if let Some([y, x]) = self.keypoint(n, part) {
                    data[[n, part, 0]] = x * sx;
                    data[[n, part, 1]] = y * sy;
                    data[[n, part, 2]] = 1.0;
                }
            }
        }
        data
    }

    /// Limbs of one skeleton whose two endpoints are both present.
    #[must_use]
    pub fn limb_segments(&self, skeleton: usize, topology: &Topology) -> Vec<LimbSegment> {
        topology
            .limbs()
            .iter()
            .enumerate()
            .filter_map(|(limb, def)| {
                Some(LimbSegment {
                    limb,
                    from: self.keypoint(skeleton, def.part_a)?,
                    to: self.keypoint(skeleton, def.part_b)?,
                })
            })
            .collect()
    }
}
