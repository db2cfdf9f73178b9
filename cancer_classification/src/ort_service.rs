use crate::{
    config::ModelConfig,
    error::{InferenceError, ModelLoadError},
    model_service::ModelService,
    preprocess::NormalizedTensor,
};
use ort::{
    session::{builder::GraphOptimizationLevel, Session},
    value::TensorRef,
};
use std::{
    path::Path,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
};

/// Loads the classifier at `path` with a single session.
pub fn load_model(path: impl AsRef<Path>) -> Result<OrtModelService, ModelLoadError> {
    OrtModelService::new(&ModelConfig::from_path(path.as_ref()))
}

fn build_session(path: &Path, intra_threads: usize) -> ort::Result<Session> {
    Session::builder()?
        .with_optimization_level(GraphOptimizationLevel::Level3)?
        .with_intra_threads(intra_threads)?
        .commit_from_file(path)
}

/// ONNX Runtime sessions over the same model file, handed out round-robin.
#[derive(Clone)]
pub struct OrtModelService {
    sessions: Arc<Vec<Arc<Mutex<Session>>>>,
    counter: Arc<AtomicUsize>,
}

impl OrtModelService {
    pub fn new(model_config: &ModelConfig) -> Result<Self, ModelLoadError> {
        model_config.validate()?;

        let path = model_config.get_path();
        let num_instances = model_config.num_instances;
        let sessions = (0..num_instances)
            .map(|_| {
                let session = build_session(&path, model_config.intra_threads)?;
                Ok(Arc::new(Mutex::new(session)))
            })
            .collect::<Result<Vec<_>, ort::Error>>()
            .map_err(|e| ModelLoadError::Engine {
                path: path.clone(),
                message: e.to_string(),
            })?;

        tracing::info!("Created {} ONNX sessions from {:?}", num_instances, path);

        Ok(Self {
            sessions: Arc::new(sessions),
            counter: Arc::new(AtomicUsize::new(0)),
        })
    }

    pub fn num_sessions(&self) -> usize {
        self.sessions.len()
    }
}

impl ModelService for OrtModelService {
    fn run(&self, input: &NormalizedTensor) -> Result<Vec<f32>, InferenceError> {
        let index = self.counter.fetch_add(1, Ordering::SeqCst) % self.sessions.len();
        let mut session = self.sessions[index]
            .lock()
            .map_err(|e| InferenceError::Poisoned(e.to_string()))?;

        tracing::debug!("Handling request with session {}", index);
        let output_name = session
            .outputs
            .first()
            .map(|output| output.name.clone())
            .ok_or_else(|| InferenceError::Engine("model declares no outputs".to_string()))?;

        let tensor_ref = TensorRef::from_array_view(input.view())
            .map_err(|e| InferenceError::InvalidInput(e.to_string()))?;

        let outputs = session
            .run(ort::inputs![tensor_ref])
            .map_err(|e| InferenceError::Engine(e.to_string()))?;

        let (_shape, data) = outputs[output_name.as_str()]
            .try_extract_tensor::<f32>()
            .map_err(|e| InferenceError::Engine(format!("failed to extract tensor: {}", e)))?;

        let values = data.to_vec();
        Ok(values)
    }
}
