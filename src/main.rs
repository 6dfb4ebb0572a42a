use std::sync::Arc;

use anyhow::{anyhow, Result};
use dotenvy::dotenv;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod app;
mod common;
mod config;
mod docs;
mod infrastructure;
mod modules;
mod routes;
mod state;
mod workers;

use crate::config::settings::AppConfig;
use crate::infrastructure::db::pool::{connect_to_db, run_migrations};
use crate::infrastructure::queue::rabbitmq::RabbitMqService;
use crate::infrastructure::storage::s3::StorageService;
use crate::modules::image::pipeline::TransformPipeline;
use crate::modules::image::repository::{ImageRepository, PgImageRepository};
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting image transformer...");

    let config = AppConfig::new().map_err(|e| anyhow!("Missing configuration: {}", e))?;

    let db = connect_to_db(&config.database_url).await?;
    run_migrations(&db).await?;

    let storage = Arc::new(
        StorageService::new(
            &config.minio_url,
            &config.minio_bucket,
            &config.minio_access_key,
            &config.minio_secret_key,
        )
        .await,
    );
    let images: Arc<dyn ImageRepository> = Arc::new(PgImageRepository::new(db));

    // Producer and consumer use separate connections.
    let producer = RabbitMqService::new(&config.rabbitmq_url).await?;
    let consumer = RabbitMqService::new(&config.rabbitmq_url).await?;

    let cancel = CancellationToken::new();
    let pipeline = TransformPipeline::new(storage.clone(), images.clone());
    let worker = tokio::spawn(workers::transformer::start_transformer_worker(
        consumer.clone(),
        pipeline,
        config.clone(),
        cancel.clone(),
    ));

    let state = AppState::new(config.clone(), images, storage, Arc::new(producer.clone()));
    let app = app::create_app(state);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.server_port)).await?;
    info!("Server running on http://0.0.0.0:{}", config.server_port);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cancel.clone()))
        .await?;

    cancel.cancel();
    match worker.await {
        Ok(Ok(_)) => {}
        Ok(Err(e)) => error!("Transformer worker failed: {}", e),
        Err(e) => error!("Transformer worker panicked: {}", e),
    }

    if let Err(e) = consumer.close().await {
        error!("{}", e);
    }
    if let Err(e) = producer.close().await {
        error!("{}", e);
    }

    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal(cancel: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => error!("Failed to listen for SIGTERM: {}", e),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
    cancel.cancel();
}
