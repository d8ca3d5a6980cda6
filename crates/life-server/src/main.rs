//! Upload sink and static file server for the Life snapshot demo.

mod api;
mod telemetry;
mod upload;

use anyhow::Result;
use life_core::ServerConfig;
use std::sync::Arc;
use tokio::signal;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = ServerConfig::from_env()?;

    // Initialize telemetry
    telemetry::init_telemetry(config.otel_endpoint.as_deref())?;

    info!("Starting Life snapshot server on {}:{}", config.bind_address, config.port);

    let uploads = upload::UploadStore::new(&config.upload_dir);
    uploads.ensure_dir().await?;
    info!("Uploads stored in {:?}, static files from {}", uploads.dir(), config.static_dir);

    let app = api::router(
        api::AppState {
            uploads: Arc::new(uploads),
        },
        &config.static_dir,
    );

    // Start server
    let addr = format!("{}:{}", config.bind_address, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("Server is running on http://localhost:{}", config.port);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Shutdown telemetry
    telemetry::shutdown_telemetry();

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
