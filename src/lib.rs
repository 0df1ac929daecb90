// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

#![allow(clippy::multiple_crate_versions)]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! # PAF Pose Decoder
//!
//! Bottom-up multi-person pose decoding for networks that emit a
//! part-confidence heatmap and a part-affinity field (OpenPose / trt_pose
//! style models). Each frame, the decoder turns the two raw output tensors
//! into a list of skeletons, each a set of labelled 2D keypoints grouped by
//! person.
//!
//! ## Pipeline
//!
//! 1. **Peak finding** - local maxima above a confidence threshold per heatmap channel.
//! 2. **Peak refinement** - sub-cell, normalized `[y, x]` coordinates.
//! 3. **Affinity scoring** - line integral of each limb's vector field between
//!    every candidate pair.
//! 4. **Limb assignment** - greedy one-to-one matching per limb type.
//! 5. **Skeleton assembly** - matchings stitched into people, each candidate
//!    claimed at most once.
//!
//! Output is deterministic for identical inputs and no state survives a call.
//!
//! ## Quick Start
//!
//! ```rust
//! use ndarray::Array3;
//! use paf_decoder::{DecoderConfig, PoseDecoder, Topology};
//!
//! # fn main() -> paf_decoder::Result<()> {
//! let topology = Topology::human_pose();
//! let config = DecoderConfig::new().with_confidence(0.15).with_max_objects(10);
//! let decoder = PoseDecoder::new(config, topology, 18, 42)?;
//!
//! // Tensors come from the inference runtime; zeros here.
//! let cmap = Array3::<f32>::zeros((18, 56, 56));
//! let paf = Array3::<f32>::zeros((42, 56, 56));
//!
//! let poses = decoder.decode(cmap.view(), paf.view())?;
//! for n in 0..poses.len() {
//!     for (part, keypoint) in poses.keypoints_for(n).iter().enumerate() {
//!         if let Some([y, x]) = keypoint {
//!             println!("person {n} part {part}: ({x:.3}, {y:.3})");
//!         }
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`decoder`] | [`PoseDecoder`], the five-stage pipeline |
//! | [`config`] | [`DecoderConfig`] thresholds and caps |
//! | [`topology`] | [`Topology`] limb tables and asset loading |
//! | [`peaks`] | Heatmap peak finding |
//! | [`refine`] | Sub-cell peak refinement |
//! | [`paf`] | Part-affinity score graphs |
//! | [`assignment`] | Greedy limb matching |
//! | [`connect`] | Skeleton assembly |
//! | [`results`] | Output types ([`Poses`], [`DecodeSpeed`]) |
//! | [`error`] | Error types ([`DecodeError`], [`Result`]) |

// Modules
pub mod assignment;
pub mod config;
pub mod connect;
pub mod decoder;
pub mod error;
pub mod paf;
pub mod peaks;
pub mod refine;
pub mod results;
pub mod topology;

// Re-export main types for convenience
pub use assignment::Connection;
pub use config::DecoderConfig;
pub use connect::Skeleton;
pub use decoder::{PoseDecoder, tensor_dims};
pub use error::{DecodeError, Result};
pub use refine::NormalizedPeak;
pub use results::{DecodeSpeed, LimbSegment, Poses};
pub use topology::{Limb, Topology};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(VERSION.contains('.'));
    }

    #[test]
    fn test_name() {
        assert_eq!(NAME, "paf-decoder");
    }

    #[test]
    fn test_decoder_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PoseDecoder>();
    }
}
