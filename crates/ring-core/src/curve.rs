//! Per-segment randomized response curves.

use glam::Vec3;
use rand::Rng;

use crate::config::RingConfig;
use crate::constants::CURVE_KEY_COUNT;
use crate::topology::{segment_angle, segment_direction};

/// One control point of a response curve. `time` is the raw-amplitude axis
/// in [0, 1]; `value` is the shaped output at that point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Keyframe {
    pub time: f32,
    pub value: f32,
}

/// A sampled 1-D response function, immutable once generated.
///
/// Evaluation clamps the input to [0, 1] and blends between the bracketing
/// keyframes with a zero-tangent cubic step, so the curve is
/// tangent-continuous at every key and monotonic between neighbors.
#[derive(Clone, Debug)]
pub struct ResponseCurve {
    keys: Vec<Keyframe>,
}

/// How strongly a segment facing `direction` responds, given the ring's
/// weighting exponent. Segments pointing away from +Y are silenced.
pub fn angular_weight(direction: Vec3, power: f32) -> f32 {
    direction.dot(Vec3::Y).clamp(0.0, 1.0).powf(power)
}

impl ResponseCurve {
    /// Wrap keyframes sorted by ascending `time`. At least one key is required.
    pub fn from_keys(keys: Vec<Keyframe>) -> Self {
        assert!(!keys.is_empty(), "a response curve needs at least one key");
        Self { keys }
    }

    pub fn keys(&self) -> &[Keyframe] {
        &self.keys
    }

    /// Draw a fresh curve capped at `weight`. The first key is pinned to
    /// zero so that silence maps back to the undisplaced ring.
    pub fn generate<R: Rng>(weight: f32, rng: &mut R) -> Self {
        let mut keys = Vec::with_capacity(CURVE_KEY_COUNT);
        for j in 0..CURVE_KEY_COUNT {
            let time = j as f32 / (CURVE_KEY_COUNT - 1) as f32;
            let value = if j == 0 {
                0.0
            } else {
                rng.gen::<f32>() * weight
            };
            keys.push(Keyframe { time, value });
        }
        Self { keys }
    }

    /// One curve per segment, weighted by each segment's start-angle
    /// direction relative to +Y.
    pub fn generate_set<R: Rng>(config: &RingConfig, rng: &mut R) -> Vec<ResponseCurve> {
        let n = config.segments;
        (0..n)
            .map(|i| {
                let dir = segment_direction(segment_angle(i, n));
                let weight = angular_weight(dir, config.weighting_power);
                ResponseCurve::generate(weight, rng)
            })
            .collect()
    }

    pub fn evaluate(&self, x: f32) -> f32 {
        let x = x.clamp(0.0, 1.0);
        let keys = &self.keys;
        if x <= keys[0].time {
            return keys[0].value;
        }
        if let Some(last) = keys.last() {
            if x >= last.time {
                return last.value;
            }
        }
        for pair in keys.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if x <= b.time {
                let span = b.time - a.time;
                if span <= f32::EPSILON {
                    return b.value;
                }
                let t = (x - a.time) / span;
                let s = t * t * (3.0 - 2.0 * t);
                return a.value + (b.value - a.value) * s;
            }
        }
        keys[keys.len() - 1].value
    }
}
