use crate::error::ModelLoadError;
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_MODEL_FILE: &str = "cancer_classification.onnx";

#[derive(Debug, Deserialize, Clone)]
pub struct ModelConfig {
    pub model_dir: PathBuf,
    #[serde(default = "default_model_file")]
    pub model_file: String,
    #[serde(default = "default_model_instances")]
    pub num_instances: usize,
    #[serde(default = "default_intra_threads")]
    pub intra_threads: usize,
}

fn default_model_file() -> String {
    DEFAULT_MODEL_FILE.to_string()
}

fn default_model_instances() -> usize {
    1
}

fn default_intra_threads() -> usize {
    1
}

impl ModelConfig {
    /// Single-session config pointing straight at a model file.
    pub fn from_path(path: &Path) -> Self {
        Self {
            model_dir: path.parent().map(Path::to_path_buf).unwrap_or_default(),
            model_file: path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default(),
            num_instances: default_model_instances(),
            intra_threads: default_intra_threads(),
        }
    }

    pub fn get_path(&self) -> PathBuf {
        self.model_dir.join(&self.model_file)
    }

    pub fn validate(&self) -> Result<(), ModelLoadError> {
        if self.num_instances == 0 {
            return Err(ModelLoadError::InvalidConfig(
                "num_instances must be at least 1".to_string(),
            ));
        }
        if self.intra_threads == 0 {
            return Err(ModelLoadError::InvalidConfig(
                "intra_threads must be at least 1".to_string(),
            ));
        }
        let path = self.get_path();
        if !path.is_file() {
            return Err(ModelLoadError::NotFound(path));
        }
        Ok(())
    }
}
