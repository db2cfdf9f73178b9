mod classify;
mod health;
mod metrics;

use crate::server::SharedState;
use axum::{
    routing::{get, post},
    Router,
};
use cancer_classification::ModelService;

pub use classify::{classify_image, ClassificationResponse, ClassifyImageError, ErrorBody};
pub use health::healthcheck;
pub use metrics::metrics_handler;

pub fn api_routes<M: ModelService>() -> Router<SharedState<M>> {
    Router::new()
        .route("/health", get(healthcheck))
        .route("/classify", post(classify_image::<M>))
        .route("/metrics", get(metrics_handler::<M>))
}
