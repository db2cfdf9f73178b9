mod model_service;
mod ort_service;
mod pipeline;
mod preprocess;
mod types;

pub mod config;
pub mod error;

pub use error::{ClassificationError, ImageDecodeError, InferenceError, ModelLoadError};
pub use model_service::ModelService;
pub use ort_service::{load_model, OrtModelService};
pub use pipeline::{infer, interpret, ClassificationPipeline};
pub use preprocess::{
    normalize, preprocess, preprocess_image, ImageSource, NormalizedTensor, INPUT_SIZE, TENSOR_LEN,
};
pub use types::{ClassificationResult, Label, OutputVector};
