use crate::{config::ServerConfig, routes::api_routes, telemetry::Metrics};
use axum::{extract::DefaultBodyLimit, Router};
use axum_otel_metrics::HttpMetricsLayerBuilder;
use cancer_classification::{ClassificationPipeline, ModelService};
use std::sync::Arc;
use tokio::{net::TcpListener, sync::broadcast::Receiver, task::JoinHandle};

pub struct SharedState<M: ModelService> {
    pub pipeline: ClassificationPipeline<M>,
    pub metrics: Arc<Metrics>,
}

impl<M: ModelService> Clone for SharedState<M> {
    fn clone(&self) -> Self {
        Self {
            pipeline: self.pipeline.clone(),
            metrics: Arc::clone(&self.metrics),
        }
    }
}

pub fn build_router<M: ModelService>(
    pipeline: ClassificationPipeline<M>,
    metrics: Arc<Metrics>,
    max_upload_bytes: usize,
) -> Router {
    let metrics_layer = HttpMetricsLayerBuilder::new().build();
    let app_state = SharedState { pipeline, metrics };

    api_routes::<M>()
        .with_state(app_state)
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(metrics_layer)
}

pub struct HttpServer {
    router: Router,
    listener: TcpListener,
}

impl HttpServer {
    pub async fn new<M: ModelService>(
        pipeline: ClassificationPipeline<M>,
        config: &ServerConfig,
    ) -> anyhow::Result<Self> {
        let metrics = Arc::new(Metrics::new()?);
        let router = build_router(pipeline, metrics, config.max_upload_bytes);
        let listener = TcpListener::bind(config.get_address()).await?;

        Ok(Self { router, listener })
    }

    pub async fn run(
        self,
        mut shutdown_rx: Receiver<()>,
    ) -> anyhow::Result<JoinHandle<anyhow::Result<()>>> {
        tracing::info!("Starting app on {}", self.listener.local_addr()?);

        let listener = self.listener;
        let router = self.router;
        let server_handle = tokio::spawn(async move {
            axum::serve(listener, router)
                .with_graceful_shutdown(async move {
                    shutdown_rx.recv().await.ok();
                })
                .await?;
            Ok::<(), anyhow::Error>(())
        });

        Ok(server_handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::{ClassificationResponse, ErrorBody};
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        response::Response,
    };
    use cancer_classification::{InferenceError, NormalizedTensor};
    use image::{DynamicImage, Rgb, RgbImage};
    use std::io::Cursor;
    use tokio::sync::broadcast;
    use tower::ServiceExt;

    struct StubModel {
        output: Vec<f32>,
    }

    impl ModelService for StubModel {
        fn run(&self, _input: &NormalizedTensor) -> Result<Vec<f32>, InferenceError> {
            Ok(self.output.clone())
        }
    }

    struct BrokenModel;

    impl ModelService for BrokenModel {
        fn run(&self, _input: &NormalizedTensor) -> Result<Vec<f32>, InferenceError> {
            Err(InferenceError::Engine("session crashed".to_string()))
        }
    }

    fn test_router<M: ModelService>(model: M, max_upload_bytes: usize) -> Router {
        let metrics = Arc::new(Metrics::new().unwrap());
        build_router(ClassificationPipeline::new(model), metrics, max_upload_bytes)
    }

    fn stub_router(output: &[f32]) -> Router {
        let model = StubModel {
            output: output.to_vec(),
        };
        test_router(model, 1024 * 1024)
    }

    fn png_bytes() -> Vec<u8> {
        let image =
            DynamicImage::ImageRgb8(RgbImage::from_pixel(120, 80, Rgb([180, 120, 90])));
        let mut image_data: Vec<u8> = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut image_data), image::ImageFormat::Png)
            .unwrap();
        image_data
    }

    fn classify_request(body: Vec<u8>) -> Request<Body> {
        Request::post("/classify")
            .header("content-type", "application/octet-stream")
            .body(Body::from(body))
            .unwrap()
    }

    async fn json_body<T: serde::de::DeserializeOwned>(response: Response) -> T {
        let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body_bytes).unwrap()
    }

    #[tokio::test]
    async fn test_healthcheck() {
        let app = stub_router(&[0.5, 0.5]);

        let request = Request::get("/health").body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let payload: serde_json::Value = json_body(response).await;
        assert_eq!(payload["status"], "Available");
        assert_eq!(payload["input_size"], 224);
    }

    #[tokio::test]
    async fn test_classify_cancer() {
        let app = stub_router(&[0.3, 0.7]);

        let response = app.oneshot(classify_request(png_bytes())).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let payload: ClassificationResponse = json_body(response).await;
        assert_eq!(payload.label, "Cancer");
        assert_eq!(payload.confidence, 0.7);
        assert_eq!(payload.confidence_percent, "70.00%");
    }

    #[tokio::test]
    async fn test_classify_non_cancer() {
        let app = stub_router(&[0.9, 0.1]);

        let response = app.oneshot(classify_request(png_bytes())).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let payload: ClassificationResponse = json_body(response).await;
        assert_eq!(payload.label, "Non-Cancer");
        assert_eq!(payload.confidence, 0.9);
    }

    #[tokio::test]
    async fn test_classify_without_image() {
        let app = stub_router(&[0.3, 0.7]);

        let response = app.oneshot(classify_request(Vec::new())).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let payload: ErrorBody = json_body(response).await;
        assert_eq!(payload.error, "Please select an image first");
    }

    #[tokio::test]
    async fn test_classify_undecodable_image() {
        let app = stub_router(&[0.3, 0.7]);

        let response = app
            .oneshot(classify_request(b"definitely not a png".to_vec()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_classify_inference_failure() {
        let app = test_router(BrokenModel, 1024 * 1024);

        let response = app.oneshot(classify_request(png_bytes())).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let payload: ErrorBody = json_body(response).await;
        assert!(payload.error.contains("session crashed"));
    }

    #[tokio::test]
    async fn test_classify_rejects_oversized_upload() {
        let app = test_router(
            StubModel {
                output: vec![0.3, 0.7],
            },
            16,
        );

        let response = app.oneshot(classify_request(png_bytes())).await.unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_metrics_after_classify() {
        let app = stub_router(&[0.3, 0.7]);

        let response = app
            .clone()
            .oneshot(classify_request(png_bytes()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let request = Request::get("/metrics").body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let text = String::from_utf8(body_bytes.to_vec()).unwrap();
        assert!(text.contains("requests_total"));
        assert!(text.contains("route=\"/classify\""));
        assert!(text.contains("classification_duration_ms"));
        assert!(text.contains("label=\"Cancer\""));
    }

    #[tokio::test]
    async fn test_server_shuts_down_on_signal() {
        let config = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            max_upload_bytes: 1024,
        };
        let pipeline = ClassificationPipeline::new(StubModel {
            output: vec![0.9, 0.1],
        });
        let server = HttpServer::new(pipeline, &config).await.unwrap();

        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
        let handle = server.run(shutdown_rx).await.unwrap();
        shutdown_tx.send(()).unwrap();

        assert!(handle.await.unwrap().is_ok());
    }
}
