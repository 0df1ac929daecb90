// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! The pose decoder.
//!
//! [`PoseDecoder`] binds a [`Topology`] and a [`DecoderConfig`] to the tensor
//! layout of one model and runs the five decoding stages on each frame:
//! peak finding, peak refinement, affinity scoring, limb assignment and
//! skeleton assembly. Layout mismatches are rejected when the decoder is
//! built; per-frame content problems never produce an error.

use std::time::Instant;

use ndarray::ArrayView3;

use crate::assignment::assignment;
use crate::config::DecoderConfig;
use crate::connect::connect_parts;
use crate::error::{DecodeError, Result};
use crate::paf::score_graph;
use crate::peaks::find_peaks;
use crate::refine::refine_peaks;
use crate::results::{DecodeSpeed, Poses};
use crate::topology::Topology;

/// Decoder for heatmap + part-affinity-field model outputs.
///
/// Holds no per-frame state, so one instance can decode frames from several
/// threads at once.
///
/// # Example
///
/// ```rust
/// use ndarray::Array3;
/// use paf_decoder::{DecoderConfig, PoseDecoder, Topology};
///
/// let topology = Topology::human_pose();
/// let decoder = PoseDecoder::new(DecoderConfig::default(), topology, 18, 42)?;
///
/// let cmap = Array3::<f32>::zeros((18, 56, 56));
/// let paf = Array3::<f32>::zeros((42, 56, 56));
/// let poses = decoder.decode(cmap.view(), paf.view())?;
/// assert!(poses.is_empty());
/// # Ok::<(), paf_decoder::DecodeError>(())
/// ```
#[derive(Debug, Clone)]
pub struct PoseDecoder {
    config: DecoderConfig,
    topology: Topology,
}

impl PoseDecoder {
    /// Create a decoder for a model with the given output channel counts.
    ///
    /// # Arguments
    ///
    /// * `config` - Decoder constants.
    /// * `topology` - Limb table for the model.
    /// * `cmap_channels` - Channels of the model's heatmap output.
    /// * `paf_channels` - Channels of the model's affinity-field output.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::ConfigError`] for an invalid configuration and
    /// [`DecodeError::TopologyError`] when the channel counts disagree with the
    /// topology (`cmap_channels` must equal the part count and `paf_channels`
    /// twice the limb count).
    pub fn new(
        config: DecoderConfig,
        topology: Topology,
        cmap_channels: usize,
        paf_channels: usize,
    ) -> Result<Self> {
        config.validate()?;
        if cmap_channels != topology.num_parts() {
            return Err(DecodeError::TopologyError(format!(
                "heatmap has {cmap_channels} channels but topology defines {} part types",
                topology.num_parts()
            )));
        }
        if paf_channels != topology.num_field_channels() {
            return Err(DecodeError::TopologyError(format!(
                "field has {paf_channels} channels but topology needs {} (2 x {} limb types)",
                topology.num_field_channels(),
                topology.num_limbs()
            )));
        }
        Ok(Self { config, topology })
    }

    /// Decoder configuration.
    #[must_use]
    pub const fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Topology this decoder was built for.
    #[must_use]
    pub const fn topology(&self) -> &Topology {
        &self.topology
    }

    /// Decode one frame.
    ///
    /// # Arguments
    ///
    /// * `cmap` - Heatmap `[C, H, W]`.
    /// * `paf` - Affinity field `[2L, H, W]` on the same grid.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::ShapeMismatch`] if the channel counts differ from
    /// the topology or the two tensors are on different grids.
    pub fn decode(&self, cmap: ArrayView3<'_, f32>, paf: ArrayView3<'_, f32>) -> Result<Poses> {
        self.check_frame(cmap, paf)?;
        let config = &self.config;

        let start = Instant::now();
        let peaks = find_peaks(
            cmap,
            config.confidence_threshold,
            config.window_size,
            config.max_parts,
        );
        let find_ms = elapsed_ms(start);

        let start = Instant::now();
        let refined = refine_peaks(cmap, &peaks, config.window_size);
        let refine_ms = elapsed_ms(start);
        let counts: Vec<usize> = refined.iter().map(Vec::len).collect();

        let start = Instant::now();
        let graphs = score_graph(paf, &self.topology, &refined, config.num_samples);
        let score_ms = elapsed_ms(start);

        let start = Instant::now();
        let connections = assignment(&graphs, config.link_threshold, config.max_parts);
        let assign_ms = elapsed_ms(start);

        let start = Instant::now();
        let skeletons = connect_parts(&connections, &self.topology, &counts, config.max_objects);
        let connect_ms = elapsed_ms(start);

        let speed = DecodeSpeed {
            find_peaks: find_ms,
            refine: refine_ms,
            score: score_ms,
            assign: assign_ms,
            connect: connect_ms,
        };
        Ok(Poses::new(skeletons, refined, speed))
    }

    /// Decode one frame from flat buffers as handed back by an inference runtime.
    ///
    /// Shapes may be `[C, H, W]` or `[1, C, H, W]`.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::ShapeMismatch`] if a shape is not 3-D (after
    /// dropping a unit batch dimension), does not match its buffer length, or
    /// fails the checks of [`PoseDecoder::decode`].
    pub fn decode_raw(
        &self,
        cmap: &[f32],
        cmap_shape: &[usize],
        paf: &[f32],
        paf_shape: &[usize],
    ) -> Result<Poses> {
        let cmap = ArrayView3::from_shape(tensor_dims(cmap_shape)?, cmap)?;
        let paf = ArrayView3::from_shape(tensor_dims(paf_shape)?, paf)?;
        self.decode(cmap, paf)
    }

    fn check_frame(&self, cmap: ArrayView3<'_, f32>, paf: ArrayView3<'_, f32>) -> Result<()> {
        let (c, h, w) = cmap.dim();
        let (l2, ph, pw) = paf.dim();
        if c != self.topology.num_parts() {
            return Err(DecodeError::ShapeMismatch(format!(
                "heatmap has {c} channels, decoder expects {}",
                self.topology.num_parts()
            )));
        }
        if l2 != self.topology.num_field_channels() {
            return Err(DecodeError::ShapeMismatch(format!(
                "field has {l2} channels, decoder expects {}",
                self.topology.num_field_channels()
            )));
        }
        if (h, w) != (ph, pw) {
            return Err(DecodeError::ShapeMismatch(format!(
                "heatmap grid {h}x{w} differs from field grid {ph}x{pw}"
            )));
        }
        Ok(())
    }
}

/// Interpret a runtime output shape as `(channels, height, width)`.
///
/// Accepts `[C, H, W]` and `[1, C, H, W]`.
///
/// # Errors
///
/// Returns [`DecodeError::ShapeMismatch`] for any other rank or batch size.
pub fn tensor_dims(shape: &[usize]) -> Result<(usize, usize, usize)> {
    match *shape {
        [c, h, w] | [1, c, h, w] => Ok((c, h, w)),
        _ => Err(DecodeError::ShapeMismatch(format!(
            "expected [C, H, W] or [1, C, H, W], got {shape:?}"
        ))),
    }
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    fn two_part_topology() -> Topology {
        Topology::from_pairs(vec!["a".to_string(), "b".to_string()], &[[0, 1]]).unwrap()
    }

    #[test]
    fn test_new_rejects_channel_mismatch() {
        let config = DecoderConfig::default();
        assert!(PoseDecoder::new(config.clone(), Topology::human_pose(), 18, 42).is_ok());
        assert!(matches!(
            PoseDecoder::new(config.clone(), Topology::human_pose(), 17, 42),
            Err(DecodeError::TopologyError(_))
        ));
        assert!(matches!(
            PoseDecoder::new(config, Topology::human_pose(), 18, 38),
            Err(DecodeError::TopologyError(_))
        ));
    }

    #[test]
    fn test_new_rejects_bad_config() {
        let config = DecoderConfig::new().with_num_samples(0);
        assert!(matches!(
            PoseDecoder::new(config, two_part_topology(), 2, 2),
            Err(DecodeError::ConfigError(_))
        ));
    }

    #[test]
    fn test_decode_rejects_mismatched_frames() {
        let decoder = PoseDecoder::new(DecoderConfig::default(), two_part_topology(), 2, 2).unwrap();
        let cmap = Array3::<f32>::zeros((2, 8, 8));
        let paf = Array3::<f32>::zeros((2, 8, 6));
        assert!(matches!(
            decoder.decode(cmap.view(), paf.view()),
            Err(DecodeError::ShapeMismatch(_))
        ));
        let cmap = Array3::<f32>::zeros((3, 8, 8));
        let paf = Array3::<f32>::zeros((2, 8, 8));
        assert!(decoder.decode(cmap.view(), paf.view()).is_err());
    }

    #[test]
    fn test_tensor_dims() {
        assert_eq!(tensor_dims(&[18, 56, 56]).unwrap(), (18, 56, 56));
        assert_eq!(tensor_dims(&[1, 42, 56, 56]).unwrap(), (42, 56, 56));
        assert!(tensor_dims(&[2, 42, 56, 56]).is_err());
        assert!(tensor_dims(&[56, 56]).is_err());
    }

    #[test]
    fn test_decode_raw_checks_length() {
        let decoder = PoseDecoder::new(DecoderConfig::default(), two_part_topology(), 2, 2).unwrap();
        let cmap = vec![0.0; 2 * 4 * 4];
        let paf = vec![0.0; 2 * 4 * 4 - 1];
        assert!(matches!(
            decoder.decode_raw(&cmap, &[1, 2, 4, 4], &paf, &[1, 2, 4, 4]),
            Err(DecodeError::ShapeMismatch(_))
        ));
        let paf = vec![0.0; 2 * 4 * 4];
        let poses = decoder.decode_raw(&cmap, &[1, 2, 4, 4], &paf, &[2, 4, 4]).unwrap();
        assert!(poses.is_empty());
        assert_eq!(poses.counts(), vec![0, 0]);
    }
}
