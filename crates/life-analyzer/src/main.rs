//! Lists the snapshot images in blob storage and runs each one through the
//! computer vision service.

mod batch;
mod sas;
mod storage;
mod telemetry;
mod vision;

use life_core::AnalyzerConfig;
use reqwest::Client;
use std::process::ExitCode;
use std::time::Duration;
use storage::BlobServiceClient;
use tracing::{error, info};
use vision::VisionClient;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<ExitCode> {
    let config = AnalyzerConfig::from_env()?;

    telemetry::init_telemetry(config.otel_endpoint.as_deref())?;

    let code = match run(&config).await {
        Ok(report) => {
            info!("Analyzed {} images", report.len());
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Error analyzing images: {}", e);
            if let Some(details) = e.response_details() {
                error!("Error details: {}", details);
            }
            ExitCode::FAILURE
        }
    };

    telemetry::shutdown_telemetry();

    Ok(code)
}

async fn run(config: &AnalyzerConfig) -> life_core::Result<Vec<batch::BlobAnalysis>> {
    let http_client = Client::builder()
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .build()
        .map_err(|e| life_core::Error::Network(e.to_string()))?;

    let connection_string = config.storage_connection_string.as_deref().ok_or_else(|| {
        life_core::Error::InvalidConfig("AZURE_STORAGE_CONNECTION_STRING is not set".to_string())
    })?;
    let store = BlobServiceClient::from_connection_string(
        connection_string,
        http_client.clone(),
        chrono::Duration::seconds(config.sas_ttl_secs),
    )?;
    info!("Using storage account {}", store.account_name());

    let analyzer = VisionClient::new(
        http_client,
        config.vision_endpoint.clone(),
        config.vision_subscription_key.clone(),
    );

    batch::analyze_container(&store, &analyzer, &config.container_name).await
}
