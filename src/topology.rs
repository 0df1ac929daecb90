// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Skeleton topology: which part types are joined by which limb types.
//!
//! A [`Topology`] is an ordered table of [`Limb`]s. Each limb names the two
//! part types it joins (heatmap channels) and the two field channels holding
//! the x and y components of its affinity field. The order of the table is the
//! order in which the skeleton builder processes limbs, so it is part of the
//! decoder's observable behavior.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{DecodeError, Result};

/// Part names of the 18-keypoint human pose layout (COCO order plus neck).
pub const HUMAN_POSE_PARTS: [&str; 18] = [
    "nose",
    "left_eye",
    "right_eye",
    "left_ear",
    "right_ear",
    "left_shoulder",
    "right_shoulder",
    "left_elbow",
    "right_elbow",
    "left_wrist",
    "right_wrist",
    "left_hip",
    "right_hip",
    "left_knee",
    "right_knee",
    "left_ankle",
    "right_ankle",
    "neck",
];

/// Limb table of the human pose layout as `[part_a, part_b]` (0-based).
/// Limb `i` is scored with field channels `2i` and `2i + 1`.
pub const HUMAN_POSE_SKELETON: [[usize; 2]; 21] = [
    [15, 13], // left ankle to left knee
    [13, 11], // left knee to left hip
    [16, 14], // right ankle to right knee
    [14, 12], // right knee to right hip
    [11, 12], // left hip to right hip
    [5, 7],   // left shoulder to left elbow
    [6, 8],   // right shoulder to right elbow
    [7, 9],   // left elbow to left wrist
    [8, 10],  // right elbow to right wrist
    [1, 2],   // left eye to right eye
    [0, 1],   // nose to left eye
    [0, 2],   // nose to right eye
    [1, 3],   // left eye to left ear
    [2, 4],   // right eye to right ear
    [3, 5],   // left ear to left shoulder
    [4, 6],   // right ear to right shoulder
    [17, 0],  // neck to nose
    [17, 5],  // neck to left shoulder
    [17, 6],  // neck to right shoulder
    [17, 11], // neck to left hip
    [17, 12], // neck to right hip
];

/// One limb type: an edge of the skeleton graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Limb {
    /// Field channel holding the x component of this limb's affinity field.
    pub paf_x: usize,
    /// Field channel holding the y component of this limb's affinity field.
    pub paf_y: usize,
    /// Part type at the start of the limb.
    pub part_a: usize,
    /// Part type at the end of the limb.
    pub part_b: usize,
}

impl Limb {
    /// Create a limb from its `(fieldChannelA, fieldChannelB, partTypeA, partTypeB)` tuple.
    #[must_use]
    pub const fn new(paf_x: usize, paf_y: usize, part_a: usize, part_b: usize) -> Self {
        Self {
            paf_x,
            paf_y,
            part_a,
            part_b,
        }
    }

    /// Limb `index` joining `part_a` and `part_b` with the conventional channel pair.
    #[must_use]
    pub const fn indexed(index: usize, part_a: usize, part_b: usize) -> Self {
        Self::new(2 * index, 2 * index + 1, part_a, part_b)
    }
}

/// The fixed graph schema shared by every frame of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topology {
    parts: Vec<String>,
    limbs: Vec<Limb>,
}

/// On-disk layout of a trt_pose style topology asset (`human_pose.json`).
#[derive(Debug, Deserialize)]
struct TopologyAsset {
    keypoints: Vec<String>,
    /// 1-based part index pairs.
    skeleton: Vec<[usize; 2]>,
}

impl Topology {
    /// Build a topology from an explicit limb table.
    ///
    /// # Arguments
    ///
    /// * `parts` - Part type names, one per heatmap channel.
    /// * `limbs` - Ordered limb table.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::TopologyError`] if a limb references a part type
    /// that does not exist, joins a part to itself, uses the same channel for
    /// both field components, or a field channel outside `0..2 * limbs.len()`.
    pub fn from_limbs(parts: Vec<String>, limbs: Vec<Limb>) -> Result<Self> {
        let num_channels = 2 * limbs.len();
        for (i, limb) in limbs.iter().enumerate() {
            if limb.part_a >= parts.len() || limb.part_b >= parts.len() {
                return Err(DecodeError::TopologyError(format!(
                    "limb {i} joins parts ({}, {}) but only {} part types exist",
                    limb.part_a,
                    limb.part_b,
                    parts.len()
                )));
            }
            if limb.part_a == limb.part_b {
                return Err(DecodeError::TopologyError(format!(
                    "limb {i} joins part {} to itself",
                    limb.part_a
                )));
            }
            if limb.paf_x >= num_channels || limb.paf_y >= num_channels {
                return Err(DecodeError::TopologyError(format!(
                    "limb {i} uses field channels ({}, {}) outside 0..{num_channels}",
                    limb.paf_x, limb.paf_y
                )));
            }
            if limb.paf_x == limb.paf_y {
                return Err(DecodeError::TopologyError(format!(
                    "limb {i} uses field channel {} for both components",
                    limb.paf_x
                )));
            }
        }
        Ok(Self { parts, limbs })
    }

    /// Build a topology from `[part_a, part_b]` pairs (0-based), assigning
    /// field channels `(2i, 2i + 1)` to limb `i`.
    ///
    /// # Errors
    ///
    /// See [`Topology::from_limbs`].
    pub fn from_pairs(parts: Vec<String>, pairs: &[[usize; 2]]) -> Result<Self> {
        let limbs = pairs
            .iter()
            .enumerate()
            .map(|(i, &[a, b])| Limb::indexed(i, a, b))
            .collect();
        Self::from_limbs(parts, limbs)
    }

    /// The 18-part, 21-limb human pose topology.
    #[must_use]
    pub fn human_pose() -> Self {
        Self {
            parts: HUMAN_POSE_PARTS.iter().map(|&s| s.to_string()).collect(),
            limbs: HUMAN_POSE_SKELETON
                .iter()
                .enumerate()
                .map(|(i, &[a, b])| Limb::indexed(i, a, b))
                .collect(),
        }
    }

    /// Parse a topology asset in the trt_pose JSON layout.
    ///
    /// The asset lists part names under `keypoints` and 1-based limb pairs under
    /// `skeleton`; any other keys are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::ParseError`] for malformed JSON or a zero part
    /// index, and [`DecodeError::TopologyError`] for an inconsistent table.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let asset: TopologyAsset = serde_json::from_str(json)?;
        let pairs = asset
            .skeleton
            .iter()
            .map(|&[a, b]| match (a.checked_sub(1), b.checked_sub(1)) {
                (Some(a), Some(b)) => Ok([a, b]),
                _ => Err(DecodeError::ParseError(format!(
                    "skeleton pair [{a}, {b}] is not 1-based"
                ))),
            })
            .collect::<Result<Vec<_>>>()?;
        Self::from_pairs(asset.keypoints, &pairs)
    }

    /// Load a topology asset from disk.
    ///
    /// # Errors
    ///
    /// Returns an IO error if the file cannot be read, otherwise see
    /// [`Topology::from_json_str`].
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|e| {
            DecodeError::IoError(format!("failed to read topology {}: {e}", path.display()))
        })?;
        Self::from_json_str(&json)
    }

    /// Ordered limb table.
    #[must_use]
    pub fn limbs(&self) -> &[Limb] {
        &self.limbs
    }

    /// Part type names, indexed by heatmap channel.
    #[must_use]
    pub fn parts(&self) -> &[String] {
        &self.parts
    }

    /// Name of a part type, if it exists.
    #[must_use]
    pub fn part_name(&self, part: usize) -> Option<&str> {
        self.parts.get(part).map(String::as_str)
    }

    /// Number of part types (heatmap channels).
    #[must_use]
    pub fn num_parts(&self) -> usize {
        self.parts.len()
    }

    /// Number of limb types.
    #[must_use]
    pub fn num_limbs(&self) -> usize {
        self.limbs.len()
    }

    /// Number of field channels the model must produce.
    #[must_use]
    pub fn num_field_channels(&self) -> usize {
        2 * self.limbs.len()
    }
}

impl Default for Topology {
    fn default() -> Self {
        Self::human_pose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_human_pose_shape() {
        let topology = Topology::human_pose();
        assert_eq!(topology.num_parts(), 18);
        assert_eq!(topology.num_limbs(), 21);
        assert_eq!(topology.num_field_channels(), 42);
        assert_eq!(topology.limbs()[0], Limb::new(0, 1, 15, 13));
        assert_eq!(topology.limbs()[20], Limb::new(40, 41, 17, 12));
        assert_eq!(topology.part_name(17), Some("neck"));
        assert_eq!(topology.part_name(18), None);
    }

    #[test]
    fn test_human_pose_is_valid() {
        let topology = Topology::human_pose();
        let rebuilt =
            Topology::from_limbs(topology.parts().to_vec(), topology.limbs().to_vec()).unwrap();
        assert_eq!(rebuilt, topology);
    }

    #[test]
    fn test_from_json_str() {
        let json = r#"{
            "supercategory": "person",
            "id": 1,
            "name": "person",
            "keypoints": ["a", "b", "c"],
            "skeleton": [[1, 2], [2, 3]]
        }"#;
        let topology = Topology::from_json_str(json).unwrap();
        assert_eq!(topology.num_parts(), 3);
        assert_eq!(topology.limbs(), &[Limb::new(0, 1, 0, 1), Limb::new(2, 3, 1, 2)]);
    }

    #[test]
    fn test_from_json_rejects_zero_index() {
        let json = r#"{"keypoints": ["a", "b"], "skeleton": [[0, 1]]}"#;
        assert!(matches!(
            Topology::from_json_str(json),
            Err(DecodeError::ParseError(_))
        ));
    }

    #[test]
    fn test_from_limbs_rejects_bad_tables() {
        let parts = vec!["a".to_string(), "b".to_string()];
        assert!(Topology::from_limbs(parts.clone(), vec![Limb::new(0, 1, 0, 2)]).is_err());
        assert!(Topology::from_limbs(parts.clone(), vec![Limb::new(0, 1, 1, 1)]).is_err());
        assert!(Topology::from_limbs(parts.clone(), vec![Limb::new(0, 2, 0, 1)]).is_err());
        assert!(Topology::from_limbs(parts.clone(), vec![Limb::new(1, 1, 0, 1)]).is_err());
        assert!(Topology::from_limbs(parts, vec![Limb::new(1, 0, 1, 0)]).is_ok());
    }
}
