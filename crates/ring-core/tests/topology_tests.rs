use glam::Vec3;
use ring_core::{segment_angle, segment_direction, RingConfig, RingError, RingTopology};

fn config(segments: usize) -> RingConfig {
    RingConfig::new(segments, 10.0, 1.0, 2.0).expect("valid config")
}

#[test]
fn buffer_sizes_scale_with_segment_count() {
    for n in [3, 4, 5, 12, 48] {
        let topo = RingTopology::build(&config(n));
        assert_eq!(topo.vertices.len(), 4 * n, "vertex count for {n} segments");
        assert_eq!(
            topo.wire_indices.len(),
            8 * n,
            "wireframe index count for {n} segments"
        );
        assert_eq!(
            topo.triangle_indices.len(),
            6 * n,
            "triangle index count for {n} segments"
        );
        assert_eq!(topo.segment_count(), n);
    }
}

#[test]
fn indices_reference_only_owning_segment_slots() {
    let n = 12;
    let topo = RingTopology::build(&config(n));
    for i in 0..n {
        let lo = (i * 4) as u32;
        let hi = lo + 4;
        for &idx in &topo.wire_indices[i * 8..(i + 1) * 8] {
            assert!(
                idx >= lo && idx < hi,
                "wire index {idx} of segment {i} escapes its slots"
            );
        }
        for &idx in &topo.triangle_indices[i * 6..(i + 1) * 6] {
            assert!(
                idx >= lo && idx < hi,
                "triangle index {idx} of segment {i} escapes its slots"
            );
        }
    }
}

#[test]
fn initial_ring_is_continuous_including_wraparound() {
    for n in [3, 4, 12] {
        let topo = RingTopology::build(&config(n));
        for i in 0..n {
            let next = (i + 1) % n;
            assert_eq!(
                topo.vertices[i * 4 + 2],
                topo.vertices[next * 4],
                "inner seam between segments {i} and {next} of {n}"
            );
            assert_eq!(
                topo.vertices[i * 4 + 3],
                topo.vertices[next * 4 + 1],
                "outer seam between segments {i} and {next} of {n}"
            );
        }
    }
}

#[test]
fn vertices_sit_on_the_configured_radii() {
    let cfg = config(12);
    let topo = RingTopology::build(&cfg);
    for (slot, v) in topo.vertices.iter().enumerate() {
        let expected = if slot % 2 == 0 {
            cfg.inner_radius
        } else {
            cfg.inner_radius + cfg.wall_width
        };
        assert!(
            (v.length() - expected).abs() < 1e-4,
            "slot {slot} at radius {} expected {expected}",
            v.length()
        );
        assert_eq!(v.z, 0.0, "ring must stay in the XY plane");
    }
}

#[test]
fn segment_directions_are_unit_and_wrap() {
    let n = 12;
    for i in 0..n {
        let dir = segment_direction(segment_angle(i, n));
        assert!((dir.length() - 1.0).abs() < 1e-6);
    }
    assert_eq!(segment_angle(n, n), segment_angle(0, n));
    let top = segment_direction(segment_angle(3, 12));
    assert!((top - Vec3::Y).length() < 1e-6, "segment 3 of 12 points up");
}

#[test]
fn config_rejects_contract_violations() {
    assert_eq!(
        RingConfig::new(2, 10.0, 1.0, 2.0),
        Err(RingError::TooFewSegments(2))
    );
    assert_eq!(
        RingConfig::new(12, 0.0, 1.0, 2.0),
        Err(RingError::NonPositiveRadius(0.0))
    );
    assert_eq!(
        RingConfig::new(12, -1.0, 1.0, 2.0),
        Err(RingError::NonPositiveRadius(-1.0))
    );
    assert_eq!(
        RingConfig::new(12, 10.0, 0.0, 2.0),
        Err(RingError::NonPositiveWallWidth(0.0))
    );
    assert!(RingConfig::new(12, f32::NAN, 1.0, 2.0).is_err());
    assert!(RingConfig::new(3, 0.1, 0.1, 0.0).is_ok());
}
