//! Per-frame driver: shape, smooth, and write amplitudes into the ring.

use glam::Vec3;
use std::time::Duration;

use crate::config::{RingConfig, RingError};
use crate::curve::ResponseCurve;
use crate::source::AmplitudeSource;
use crate::topology::{segment_angle, segment_direction, RingTopology};

/// Collapse NaN and exact zero to the canonical zero. A value that is
/// neither above nor below zero has no usable sign.
#[inline]
fn canonical_zero(v: f32) -> f32 {
    if !(v > 0.0) && !(v < 0.0) {
        0.0
    } else {
        v
    }
}

/// Owns the live vertex buffer and the per-segment response state.
///
/// The host calls [`RingDeformer::update`] (or [`RingDeformer::update_from`])
/// once per rendered frame, then uploads [`RingDeformer::vertices`] to its
/// rendering backend. Index buffers never change after construction and are
/// kept by the caller.
pub struct RingDeformer {
    config: RingConfig,
    curves: Vec<ResponseCurve>,
    smoothed: Vec<f32>,
    vertices: Vec<Vec3>,
    sensitivity: f32,
    lerp_rate: f32,
    clamp_smoothing: bool,
}

impl RingDeformer {
    /// Take the initial vertex layout from `topology` and the per-segment
    /// curves. Mismatched lengths are construction contract violations.
    pub fn new(config: RingConfig, topology: &RingTopology, curves: Vec<ResponseCurve>) -> Self {
        assert_eq!(
            curves.len(),
            config.segments,
            "one response curve per segment"
        );
        assert_eq!(
            topology.vertices.len(),
            config.segments * 4,
            "topology was built for a different segment count"
        );
        Self {
            smoothed: vec![0.0; config.segments],
            vertices: topology.vertices.clone(),
            sensitivity: config.sensitivity,
            lerp_rate: config.lerp_rate,
            clamp_smoothing: config.clamp_smoothing,
            config,
            curves,
        }
    }

    pub fn config(&self) -> &RingConfig {
        &self.config
    }

    /// The live vertex buffer, `4 * segments` points.
    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    /// Smoothed per-segment sample state, mostly useful for inspection.
    pub fn smoothed(&self) -> &[f32] {
        &self.smoothed
    }

    pub fn set_sensitivity(&mut self, sensitivity: f32) {
        self.sensitivity = sensitivity;
    }

    pub fn set_lerp_rate(&mut self, lerp_rate: f32) {
        self.lerp_rate = lerp_rate;
    }

    pub fn set_clamp_smoothing(&mut self, clamp: bool) {
        self.clamp_smoothing = clamp;
    }

    /// Pull a frame of samples from `source` and run [`RingDeformer::update`].
    pub fn update_from<S: AmplitudeSource + ?Sized>(
        &mut self,
        dt: Duration,
        source: &mut S,
    ) -> Result<(), RingError> {
        let global = source.global_sensitivity();
        let samples = source.samples(self.config.source_index, self.config.segments);
        self.update(dt, &samples, global)
    }

    /// One frame: guard, shape, smooth, and write every segment.
    ///
    /// The only error is the audio collaborator breaking its length
    /// contract; numeric anomalies in the samples are absorbed.
    pub fn update(
        &mut self,
        dt: Duration,
        samples: &[f32],
        global_sensitivity: f32,
    ) -> Result<(), RingError> {
        let n = self.config.segments;
        if samples.len() != n {
            return Err(RingError::SampleCountMismatch {
                expected: n,
                got: samples.len(),
            });
        }

        let mut alpha = dt.as_secs_f32() * self.lerp_rate;
        if self.clamp_smoothing {
            alpha = alpha.clamp(0.0, 1.0);
        }

        for i in 0..n {
            let raw = canonical_zero(samples[i]);
            let shaped = self.curves[i].evaluate(raw);
            let smoothed = self.smoothed[i] + alpha * (shaped - self.smoothed[i]);
            self.smoothed[i] = canonical_zero(smoothed);
        }

        for i in 0..n {
            let displacement = self.smoothed[i].abs() * self.sensitivity * global_sensitivity;
            self.apply_displacement(i, displacement);
        }
        Ok(())
    }

    /// Recompute segment `i`'s four slots with the inner edge pulled in and
    /// the outer edge pushed out by `displacement`, then mirror the start
    /// pair into the previous segment's end slots and the end pair into the
    /// next segment's start slots. The mirror writes are what keep the two
    /// independently indexed sub-topologies seamless.
    pub fn apply_displacement(&mut self, i: usize, displacement: f32) {
        let n = self.config.segments;
        let inner_r = self.config.inner_radius - displacement;
        let outer_r = self.config.inner_radius + self.config.wall_width + displacement;

        let dir_start = segment_direction(segment_angle(i, n));
        let dir_end = segment_direction(segment_angle(i + 1, n));
        let inner_start = dir_start * inner_r;
        let outer_start = dir_start * outer_r;
        let inner_end = dir_end * inner_r;
        let outer_end = dir_end * outer_r;

        let prev = if i == 0 { n - 1 } else { i - 1 };
        let next = if i + 1 >= n { 0 } else { i + 1 };

        self.vertices[i * 4] = inner_start;
        self.vertices[prev * 4 + 2] = inner_start;
        self.vertices[i * 4 + 1] = outer_start;
        self.vertices[prev * 4 + 3] = outer_start;
        self.vertices[i * 4 + 2] = inner_end;
        self.vertices[next * 4] = inner_end;
        self.vertices[i * 4 + 3] = outer_end;
        self.vertices[next * 4 + 1] = outer_end;
    }
}
