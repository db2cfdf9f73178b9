use crate::{error::InferenceError, preprocess::NormalizedTensor};

/// A loaded binary classifier. Implementations must be safe to share between
/// concurrent callers.
pub trait ModelService: Send + Sync + 'static {
    /// Runs one forward pass and returns the raw output values.
    fn run(&self, input: &NormalizedTensor) -> Result<Vec<f32>, InferenceError>;
}
