// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Decoder configuration.
//!
//! This module defines the [`DecoderConfig`] struct, which holds the constants that
//! steer every stage of the decoder: peak detection, peak refinement, affinity
//! sampling, limb assignment and skeleton assembly. The values are fixed when a
//! [`PoseDecoder`](crate::PoseDecoder) is built and never change per frame.

use crate::error::{DecodeError, Result};

/// Configuration for the pose decoder.
///
/// Uses a builder pattern for convenient construction.
///
/// # Example
///
/// ```rust
/// use paf_decoder::DecoderConfig;
///
/// let config = DecoderConfig::new()
///     .with_confidence(0.15)
///     .with_window_size(5)
///     .with_link_threshold(0.1)
///     .with_max_objects(20);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct DecoderConfig {
    /// Heatmap confidence a cell must exceed to become a peak candidate.
    pub confidence_threshold: f32,
    /// Side length of the square local-maximum window, also used for refinement.
    /// Even values behave like the next odd value (radius is `window_size / 2`).
    pub window_size: usize,
    /// Maximum number of candidates kept per part type.
    /// Also caps the number of accepted pairs per limb type.
    pub max_parts: usize,
    /// Number of field samples taken along each candidate segment.
    pub num_samples: usize,
    /// Minimum affinity score for a candidate pair to be linked.
    pub link_threshold: f32,
    /// Maximum number of skeletons returned per frame.
    pub max_objects: usize,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.1,
            window_size: 5,
            max_parts: 2,
            num_samples: 7,
            link_threshold: 0.1,
            max_objects: 100,
        }
    }
}

impl DecoderConfig {
    /// Create a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the heatmap confidence threshold.
    ///
    /// # Arguments
    ///
    /// * `threshold` - Cells at or below this value are never peaks.
    #[must_use]
    pub const fn with_confidence(mut self, threshold: f32) -> Self {
        self.confidence_threshold = threshold;
        self
    }

    /// Set the local-maximum window size.
    #[must_use]
    pub const fn with_window_size(mut self, window_size: usize) -> Self {
        self.window_size = window_size;
        self
    }

    /// Set the per-part-type candidate cap.
    #[must_use]
    pub const fn with_max_parts(mut self, max_parts: usize) -> Self {
        self.max_parts = max_parts;
        self
    }

    /// Set the number of samples for the affinity line integral.
    #[must_use]
    pub const fn with_num_samples(mut self, num_samples: usize) -> Self {
        self.num_samples = num_samples;
        self
    }

    /// Set the link-acceptance threshold.
    ///
    /// # Arguments
    ///
    /// * `threshold` - Pairs scoring below this value are never connected.
    #[must_use]
    pub const fn with_link_threshold(mut self, threshold: f32) -> Self {
        self.link_threshold = threshold;
        self
    }

    /// Set the maximum number of skeletons per frame.
    #[must_use]
    pub const fn with_max_objects(mut self, max_objects: usize) -> Self {
        self.max_objects = max_objects;
        self
    }

    /// Check that the configuration can drive the decoder.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::ConfigError`] when the window is empty, fewer than
    /// two samples are requested, or a threshold is not a finite number.
    pub fn validate(&self) -> Result<()> {
        if self.window_size == 0 {
            return Err(DecodeError::ConfigError(
                "window_size must be at least 1".to_string(),
            ));
        }
        if self.num_samples < 2 {
            return Err(DecodeError::ConfigError(format!(
                "num_samples must be at least 2, got {}",
                self.num_samples
            )));
        }
        if !self.confidence_threshold.is_finite() {
            return Err(DecodeError::ConfigError(format!(
                "confidence_threshold must be finite, got {}",
                self.confidence_threshold
            )));
        }
        if !self.link_threshold.is_finite() {
            return Err(DecodeError::ConfigError(format!(
                "link_threshold must be finite, got {}",
                self.link_threshold
            )));
        }
        Ok(())
    }
}
