//! Sequential analysis of every image in a storage container.

use crate::storage::BlobServiceClient;
use crate::vision::{ImageAnalysis, VisionClient};
use life_core::{Error, Result};
use reqwest::Url;
use serde::Serialize;
use tracing::{info, instrument};

/// Where the images live
pub trait ImageStore {
    async fn list_containers(&self) -> Result<Vec<String>>;
    async fn list_blobs(&self, container: &str) -> Result<Vec<String>>;
    fn signed_blob_url(&self, container: &str, blob: &str) -> Result<Url>;
}

/// What looks at them
pub trait ImageAnalyzer {
    async fn analyze_image(&self, image_url: &str) -> Result<ImageAnalysis>;
}

impl ImageStore for BlobServiceClient {
    async fn list_containers(&self) -> Result<Vec<String>> {
        BlobServiceClient::list_containers(self).await
    }

    async fn list_blobs(&self, container: &str) -> Result<Vec<String>> {
        BlobServiceClient::list_blobs(self, container).await
    }

    fn signed_blob_url(&self, container: &str, blob: &str) -> Result<Url> {
        BlobServiceClient::signed_blob_url(self, container, blob)
    }
}

impl ImageAnalyzer for VisionClient {
    async fn analyze_image(&self, image_url: &str) -> Result<ImageAnalysis> {
        VisionClient::analyze_image(self, image_url).await
    }
}

/// Analysis result for one blob
#[derive(Debug, Clone, Serialize)]
pub struct BlobAnalysis {
    pub blob: String,
    pub analysis: ImageAnalysis,
}

/// Analyze each blob of `container` in listing order, one request at a time.
/// The first failure aborts the batch.
#[instrument(skip(store, analyzer))]
pub async fn analyze_container<S, A>(store: &S, analyzer: &A, container: &str) -> Result<Vec<BlobAnalysis>>
where
    S: ImageStore,
    A: ImageAnalyzer,
{
    let containers = store.list_containers().await?;
    info!("Containers in the storage account: {:?}", containers);

    if !containers.iter().any(|c| c == container) {
        return Err(Error::NotFound(format!(
            "The specified container \"{}\" does not exist.",
            container
        )));
    }

    let blobs = store.list_blobs(container).await?;
    let mut report = Vec::with_capacity(blobs.len());

    for blob in blobs {
        let url = store.signed_blob_url(container, &blob)?;

        info!("Analyzing {}...", blob);
        let analysis = analyzer.analyze_image(url.as_str()).await?;

        let captions = analysis
            .description
            .as_ref()
            .map(|d| d.captions.as_slice())
            .unwrap_or_default();
        info!("Analysis for {}:", blob);
        info!("Categories: {}", serde_json::to_string(&analysis.categories)?);
        info!("Description: {}", serde_json::to_string(captions)?);
        info!("Color: {}", serde_json::to_string(&analysis.color)?);

        report.push(BlobAnalysis { blob, analysis });
    }

    info!(analyzed = report.len(), "Container analysis complete");
    Ok(report)
}
