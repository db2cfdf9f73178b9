use crate::config::Config;
use crate::server::HttpServer;
use cancer_classification::{ClassificationPipeline, OrtModelService};

use std::error::Error;
use tokio::{signal, sync::broadcast};

pub async fn start_app(config: Config) -> Result<(), Box<dyn Error>> {
    let model = match OrtModelService::new(&config.model) {
        Ok(model) => model,
        Err(e) => {
            tracing::error!("Failed to load classification model: {:?}", e);
            return Err(Box::new(e));
        }
    };
    tracing::info!(
        "Loaded {:?} with {} session(s)",
        config.model.get_path(),
        model.num_sessions()
    );

    let pipeline = ClassificationPipeline::new(model);
    let server = HttpServer::new(pipeline, &config.server).await?;

    let (shutdown_tx, _) = broadcast::channel(1);
    let server_handle = server.run(shutdown_tx.subscribe()).await?;

    shutdown_signal().await;
    tracing::info!("Shutdown signal received, starting graceful shutdown.");

    let _ = shutdown_tx.send(());
    if let Err(e) = server_handle.await? {
        tracing::error!("Server exited with error: {:?}", e);
        return Err(e.into());
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
