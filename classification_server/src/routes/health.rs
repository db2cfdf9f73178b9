use axum::{response::IntoResponse, response::Json};
use cancer_classification::INPUT_SIZE;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug)]
pub struct Health {
    pub status: String,
    pub input_size: u32,
}

pub async fn healthcheck() -> impl IntoResponse {
    Json(Health {
        status: "Available".into(),
        input_size: INPUT_SIZE,
    })
}
