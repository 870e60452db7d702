//! Static ring topology: one shared vertex buffer, two index buffers.
//!
//! The ring lies in the XY plane. Each segment owns four vertex slots
//! (innerStart, outerStart, innerEnd, outerEnd); a segment's end edge
//! duplicates the next segment's start edge so the wireframe and the fill
//! can be indexed independently. Keeping those duplicates coordinate-equal
//! is the deformer's job, not the topology's.

use glam::{Quat, Vec3};
use std::f32::consts::TAU;

use crate::config::RingConfig;

/// Start angle of segment `index` on a ring of `segments` slices, in radians.
#[inline]
pub fn segment_angle(index: usize, segments: usize) -> f32 {
    (index % segments) as f32 / segments as f32 * TAU
}

/// Unit direction for `angle`: the +X reference rotated around the ring axis (+Z).
#[inline]
pub fn segment_direction(angle: f32) -> Vec3 {
    Quat::from_rotation_z(angle) * Vec3::X
}

#[derive(Clone, Debug)]
pub struct RingTopology {
    /// `4 * segments` points, slots `[4i..4i+4]` owned by segment `i`.
    pub vertices: Vec<Vec3>,
    /// Line-list indices, 8 per segment: start edge, inner arc, outer arc, end edge.
    pub wire_indices: Vec<u32>,
    /// Triangle-list indices, 6 per segment forming the quad between the edges.
    pub triangle_indices: Vec<u32>,
}

impl RingTopology {
    /// Build the undisplaced ring for a validated config.
    pub fn build(config: &RingConfig) -> Self {
        let n = config.segments;
        let r = config.inner_radius;
        let w = config.wall_width;

        let mut vertices = Vec::with_capacity(n * 4);
        let mut wire_indices = Vec::with_capacity(n * 8);
        let mut triangle_indices = Vec::with_capacity(n * 6);

        for i in 0..n {
            let dir_start = segment_direction(segment_angle(i, n));
            let dir_end = segment_direction(segment_angle(i + 1, n));
            vertices.push(dir_start * r);
            vertices.push(dir_start * (r + w));
            vertices.push(dir_end * r);
            vertices.push(dir_end * (r + w));

            let v = (i * 4) as u32;
            wire_indices.extend_from_slice(&[v, v + 1, v, v + 2, v + 1, v + 3, v + 2, v + 3]);
            triangle_indices.extend_from_slice(&[v, v + 1, v + 2, v + 3, v + 2, v + 1]);
        }

        Self {
            vertices,
            wire_indices,
            triangle_indices,
        }
    }

    pub fn segment_count(&self) -> usize {
        self.vertices.len() / 4
    }
}
