pub mod config;
pub mod constants;
pub mod curve;
pub mod deformer;
pub mod source;
pub mod topology;
pub static RING_WGSL: &str = include_str!("../shaders/ring.wgsl");

pub use config::*;
pub use constants::*;
pub use curve::*;
pub use deformer::*;
pub use source::*;
pub use topology::*;
