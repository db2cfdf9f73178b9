use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelLoadError {
    #[error("Model file not found: {0:?}")]
    NotFound(PathBuf),
    #[error("Invalid model configuration: {0}")]
    InvalidConfig(String),
    #[error("Failed to build inference session from {path:?}: {message}")]
    Engine { path: PathBuf, message: String },
}

#[derive(Error, Debug)]
pub enum ImageDecodeError {
    #[error("Failed to read image: {0}")]
    Io(#[from] std::io::Error),
    #[error("Error decoding image: {0}")]
    Decode(#[from] image::ImageError),
    #[error("Image has no pixels ({width}x{height})")]
    Empty { width: u32, height: u32 },
}

#[derive(Error, Debug)]
pub enum InferenceError {
    #[error("Failed to build input tensor: {0}")]
    InvalidInput(String),
    #[error("Inference engine failure: {0}")]
    Engine(String),
    #[error("Expected {expected} output values, got {actual}")]
    UnexpectedOutputShape { expected: usize, actual: usize },
    #[error("Model produced non-finite scores: {0:?}")]
    NonFiniteOutput([f32; 2]),
    #[error("Session mutex poisoned: {0}")]
    Poisoned(String),
}

/// Failure of a single `classify` call. The underlying cause is kept as the
/// error source.
#[derive(Error, Debug)]
pub enum ClassificationError {
    #[error("Classification failed: {0}")]
    Decode(#[from] ImageDecodeError),
    #[error("Classification failed: {0}")]
    Inference(#[from] InferenceError),
}
