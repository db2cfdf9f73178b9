use crate::server::SharedState;
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use cancer_classification::{
    ClassificationError, ClassificationResult, ImageSource, ModelService,
};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use thiserror::Error;
use tracing::instrument;

#[derive(Error, Debug)]
pub enum ClassifyImageError {
    #[error("Please select an image first")]
    MissingImage,
    #[error("{0}")]
    Classification(#[from] ClassificationError),
    #[error("Classification task failed: {0}")]
    Task(String),
}

impl ClassifyImageError {
    fn status_code(&self) -> StatusCode {
        match self {
            ClassifyImageError::MissingImage => StatusCode::BAD_REQUEST,
            ClassifyImageError::Classification(ClassificationError::Decode(_)) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ClassifyImageError::Classification(ClassificationError::Inference(_))
            | ClassifyImageError::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ErrorBody {
    pub error: String,
}

impl IntoResponse for ClassifyImageError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Failed to analyze image: {}", self);
        } else {
            tracing::warn!("Rejected image: {}", self);
        }

        (
            status,
            Json(ErrorBody {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ClassificationResponse {
    pub label: String,
    pub confidence: f32,
    pub confidence_percent: String,
}

impl From<ClassificationResult> for ClassificationResponse {
    fn from(result: ClassificationResult) -> Self {
        Self {
            label: result.label.to_string(),
            confidence: result.confidence,
            confidence_percent: format!("{:.2}%", result.confidence_percent()),
        }
    }
}

#[instrument(skip(state, image_data))]
pub async fn classify_image<M: ModelService>(
    State(state): State<SharedState<M>>,
    image_data: Bytes,
) -> Result<Json<ClassificationResponse>, ClassifyImageError> {
    state.metrics.record_request("/classify");
    if image_data.is_empty() {
        return Err(ClassifyImageError::MissingImage);
    }

    let pipeline = state.pipeline.clone();
    let source = ImageSource::Bytes(image_data.to_vec());
    let start = Instant::now();
    let result = tokio::task::spawn_blocking(move || pipeline.classify(&source))
        .await
        .map_err(|e| ClassifyImageError::Task(e.to_string()))??;
    let elapsed = start.elapsed();

    state
        .metrics
        .record_classification_duration(elapsed.as_millis() as u64, "/classify");
    state.metrics.record_label(result.label);
    tracing::info!("{} in {:?}", result, elapsed);

    Ok(Json(result.into()))
}
