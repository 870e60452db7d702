use rand::rngs::StdRng;
use rand::SeedableRng;
use ring_core::{
    AmplitudeSource, Keyframe, ResponseCurve, RingConfig, RingDeformer, RingError, RingTopology,
};
use std::time::Duration;

fn config(segments: usize) -> RingConfig {
    RingConfig::new(segments, 10.0, 1.0, 2.0).expect("valid config")
}

fn deformer(cfg: RingConfig, seed: u64) -> RingDeformer {
    let topo = RingTopology::build(&cfg);
    let curves = ResponseCurve::generate_set(&cfg, &mut StdRng::seed_from_u64(seed));
    RingDeformer::new(cfg, &topo, curves)
}

/// A linear identity curve for every segment, handy when a test needs to
/// know the shaped value exactly.
fn identity_curves(segments: usize) -> Vec<ResponseCurve> {
    let curve = ResponseCurve::from_keys(vec![
        Keyframe {
            time: 0.0,
            value: 0.0,
        },
        Keyframe {
            time: 1.0,
            value: 1.0,
        },
    ]);
    vec![curve; segments]
}

fn assert_continuous(d: &RingDeformer) {
    let n = d.config().segments;
    let v = d.vertices();
    for i in 0..n {
        let next = (i + 1) % n;
        assert_eq!(
            v[i * 4 + 2],
            v[next * 4],
            "inner seam broken between {i} and {next}"
        );
        assert_eq!(
            v[i * 4 + 3],
            v[next * 4 + 1],
            "outer seam broken between {i} and {next}"
        );
    }
}

#[test]
fn displacement_preserves_continuity_for_all_segments() {
    for n in [3, 4, 12] {
        let mut d = deformer(config(n), 42);
        for i in 0..n {
            d.apply_displacement(i, 0.25 + i as f32 * 0.1);
            assert_continuous(&d);
        }
        // wraparound pair specifically
        d.apply_displacement(n - 1, 2.0);
        assert_continuous(&d);
        d.apply_displacement(0, 1.0);
        assert_continuous(&d);
    }
}

#[test]
fn update_keeps_the_ring_continuous() {
    let mut d = deformer(config(12), 9);
    let samples: Vec<f32> = (0..12).map(|i| (i as f32 * 0.37).sin()).collect();
    for _ in 0..10 {
        d.update(Duration::from_millis(16), &samples, 1.0)
            .expect("matching sample count");
        assert_continuous(&d);
    }
}

#[test]
fn full_alpha_snaps_smoothed_to_shaped() {
    let cfg = config(4);
    let topo = RingTopology::build(&cfg);
    let curves = ResponseCurve::generate_set(&cfg, &mut StdRng::seed_from_u64(5));
    let expected = curves[1].evaluate(1.0);
    let mut d = RingDeformer::new(cfg, &topo, curves);
    d.set_lerp_rate(20.0);
    // dt * lerp_rate = 2, clamped to 1: one frame lands exactly on target.
    d.update(Duration::from_millis(100), &[0.0, 1.0, 0.0, 0.0], 1.0)
        .unwrap();
    assert_eq!(d.smoothed()[1], expected);
}

#[test]
fn zero_alpha_leaves_smoothed_untouched() {
    let mut d = deformer(config(4), 5);
    d.update(Duration::from_millis(50), &[0.0, 1.0, 0.0, 0.0], 1.0)
        .unwrap();
    let before = d.smoothed().to_vec();
    d.set_lerp_rate(0.0);
    d.update(Duration::from_millis(50), &[0.0, 0.3, 0.9, 0.0], 1.0)
        .unwrap();
    assert_eq!(d.smoothed(), before.as_slice());
}

#[test]
fn unclamped_smoothing_overshoots_the_target() {
    let cfg = config(4);
    let topo = RingTopology::build(&cfg);
    let mut d = RingDeformer::new(cfg, &topo, identity_curves(4));
    d.set_clamp_smoothing(false);
    d.set_lerp_rate(20.0);
    // dt * lerp_rate = 1.5: an unclamped factor shoots past the target.
    d.update(Duration::from_millis(75), &[1.0, 1.0, 1.0, 1.0], 1.0)
        .unwrap();
    for (i, &s) in d.smoothed().iter().enumerate() {
        assert!(
            (s - 1.5).abs() < 1e-6,
            "segment {i} expected overshoot to 1.5, got {s}"
        );
    }
}

#[test]
fn non_finite_samples_never_reach_the_vertex_buffer() {
    let mut d = deformer(config(4), 21);
    let samples = [f32::NAN, f32::INFINITY, f32::NEG_INFINITY, 0.5];
    for _ in 0..3 {
        d.update(Duration::from_millis(16), &samples, 1.0).unwrap();
        for (slot, v) in d.vertices().iter().enumerate() {
            assert!(v.is_finite(), "slot {slot} went non-finite: {v:?}");
        }
        for (i, s) in d.smoothed().iter().enumerate() {
            assert!(s.is_finite(), "smoothed[{i}] went non-finite: {s}");
        }
    }
}

#[test]
fn wrong_sample_count_is_rejected() {
    let mut d = deformer(config(12), 1);
    let err = d
        .update(Duration::from_millis(16), &[0.0; 11], 1.0)
        .unwrap_err();
    assert_eq!(
        err,
        RingError::SampleCountMismatch {
            expected: 12,
            got: 11
        }
    );
    // A rejected frame must not have touched the smoothed state.
    assert!(d.smoothed().iter().all(|&s| s == 0.0));
}

#[test]
fn silence_converges_back_to_the_undisplaced_ring() {
    let cfg = config(4);
    let mut d = deformer(cfg, 77);
    // Kick the ring, then feed silence for 100 frames at 60 Hz.
    d.update(Duration::from_millis(16), &[1.0, 1.0, 1.0, 1.0], 1.0)
        .unwrap();
    let silent = [0.0f32; 4];
    for _ in 0..100 {
        d.update(Duration::from_secs_f32(1.0 / 60.0), &silent, 1.0)
            .unwrap();
    }
    for &s in d.smoothed() {
        assert!(s.abs() < 1e-5, "smoothed state failed to decay: {s}");
    }
    for (slot, v) in d.vertices().iter().enumerate() {
        let expected = if slot % 2 == 0 { 10.0 } else { 11.0 };
        assert!(
            (v.length() - expected).abs() < 1e-3,
            "slot {slot} at radius {} expected {expected}",
            v.length()
        );
    }
}

struct FixedSource {
    values: Vec<f32>,
    gain: f32,
}

impl AmplitudeSource for FixedSource {
    fn samples(&mut self, _source_index: usize, count: usize) -> Vec<f32> {
        self.values.iter().copied().take(count).collect()
    }

    fn global_sensitivity(&self) -> f32 {
        self.gain
    }
}

#[test]
fn update_from_pulls_samples_and_global_sensitivity() {
    let cfg = config(4);
    let topo = RingTopology::build(&cfg);
    let mut d = RingDeformer::new(cfg, &topo, identity_curves(4));
    d.set_sensitivity(1.0);
    d.set_lerp_rate(20.0);
    let mut source = FixedSource {
        values: vec![1.0; 4],
        gain: 0.5,
    };
    // alpha clamps to 1, so smoothed == shaped == 1 and displacement == 0.5.
    d.update_from(Duration::from_millis(100), &mut source)
        .unwrap();
    let inner = d.vertices()[0].length();
    let outer = d.vertices()[1].length();
    assert!((inner - 9.5).abs() < 1e-4, "inner radius {inner}");
    assert!((outer - 11.5).abs() < 1e-4, "outer radius {outer}");
}

#[test]
fn short_source_reply_is_surfaced_not_masked() {
    let mut d = deformer(config(12), 2);
    let mut source = FixedSource {
        values: vec![0.1; 5],
        gain: 1.0,
    };
    let err = d
        .update_from(Duration::from_millis(16), &mut source)
        .unwrap_err();
    assert!(matches!(err, RingError::SampleCountMismatch { .. }));
}
