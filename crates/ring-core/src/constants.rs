// Ring construction and response tuning defaults shared by frontends.

// Geometry
pub const MIN_SEGMENTS: usize = 3;
pub const DEFAULT_SEGMENTS: usize = 12;
pub const DEFAULT_INNER_RADIUS: f32 = 10.0;
pub const DEFAULT_WALL_WIDTH: f32 = 1.0;

// Response shaping
pub const DEFAULT_WEIGHTING_POWER: f32 = 2.0; // angular falloff away from the top
pub const CURVE_KEY_COUNT: usize = 10; // control points per response curve

// Per-frame response
pub const DEFAULT_SENSITIVITY: f32 = 2.0; // multiplies shaped amplitude into displacement
pub const DEFAULT_LERP_RATE: f32 = 20.0; // smoothing speed (1/sec)
