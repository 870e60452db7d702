use thiserror::Error;

use crate::constants::*;

#[derive(Debug, Error, PartialEq)]
pub enum RingError {
    #[error("segment count {0} is below the minimum of {MIN_SEGMENTS}")]
    TooFewSegments(usize),
    #[error("inner radius must be positive, got {0}")]
    NonPositiveRadius(f32),
    #[error("wall width must be positive, got {0}")]
    NonPositiveWallWidth(f32),
    #[error("amplitude source returned {got} samples, expected {expected}")]
    SampleCountMismatch { expected: usize, got: usize },
}

/// Immutable ring description plus the tunables a frontend may expose.
///
/// Geometry fields are validated once by [`RingConfig::new`]; out-of-range
/// values are rejected rather than coerced. The runtime tunables
/// (`sensitivity`, `lerp_rate`, `clamp_smoothing`) are copied into the
/// deformer at construction and adjusted there, not here.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RingConfig {
    pub segments: usize,
    pub inner_radius: f32,
    pub wall_width: f32,
    pub weighting_power: f32,
    pub sensitivity: f32,
    pub lerp_rate: f32,
    /// Which stream of the amplitude source this ring listens to.
    pub source_index: usize,
    /// Clamp the smoothing factor to [0, 1]. When disabled the factor can
    /// exceed 1 at low frame rates and overshoot the target.
    pub clamp_smoothing: bool,
}

impl RingConfig {
    pub fn new(
        segments: usize,
        inner_radius: f32,
        wall_width: f32,
        weighting_power: f32,
    ) -> Result<Self, RingError> {
        if segments < MIN_SEGMENTS {
            return Err(RingError::TooFewSegments(segments));
        }
        if !(inner_radius > 0.0) {
            return Err(RingError::NonPositiveRadius(inner_radius));
        }
        if !(wall_width > 0.0) {
            return Err(RingError::NonPositiveWallWidth(wall_width));
        }
        Ok(Self {
            segments,
            inner_radius,
            wall_width,
            weighting_power,
            sensitivity: DEFAULT_SENSITIVITY,
            lerp_rate: DEFAULT_LERP_RATE,
            source_index: 0,
            clamp_smoothing: true,
        })
    }
}

impl Default for RingConfig {
    fn default() -> Self {
        Self {
            segments: DEFAULT_SEGMENTS,
            inner_radius: DEFAULT_INNER_RADIUS,
            wall_width: DEFAULT_WALL_WIDTH,
            weighting_power: DEFAULT_WEIGHTING_POWER,
            sensitivity: DEFAULT_SENSITIVITY,
            lerp_rate: DEFAULT_LERP_RATE,
            source_index: 0,
            clamp_smoothing: true,
        }
    }
}
