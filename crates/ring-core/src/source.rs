/// Streaming amplitude collaborator consumed by the deformer.
///
/// Implementations return one value per ring segment, nominally in [-1, 1]
/// and in segment order. Non-finite values are tolerated here; the deformer
/// guards against them. Returning a slice of the wrong length is a contract
/// violation and is rejected by the deformer rather than truncated.
pub trait AmplitudeSource {
    /// Pull `count` fresh amplitude values from stream `source_index`.
    fn samples(&mut self, source_index: usize, count: usize) -> Vec<f32>;

    /// Host-wide gain applied on top of the ring's own sensitivity.
    fn global_sensitivity(&self) -> f32 {
        1.0
    }
}
