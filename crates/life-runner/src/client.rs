//! Snapshot delivery: upload to the server or write to a local directory.

use anyhow::Result;
use life_core::RunnerConfig;
use life_world::Snapshot;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Multipart field the upload server reads the file from
const FILE_FIELD: &str = "file";

/// Posts snapshots to the server's `/save-image` endpoint
pub struct UploadClient {
    http_client: Client,
    url: String,
}

impl UploadClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http_client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http_client,
            url: url.into(),
        })
    }

    #[instrument(skip(self, snapshot), fields(file_name = %snapshot.file_name))]
    pub async fn upload(&self, snapshot: &Snapshot) -> Result<()> {
        debug!("Uploading {} bytes to {}", snapshot.png.len(), self.url);

        let part = Part::bytes(snapshot.png.clone())
            .file_name(snapshot.file_name.clone())
            .mime_str("image/png")?;
        let form = Form::new().part(FILE_FIELD, part);

        let response = self
            .http_client
            .post(&self.url)
            .multipart(form)
            .send()
            .await?;

        if response.status().is_success() {
            info!("Snapshot uploaded to {}", self.url);
            Ok(())
        } else {
            let status = response.status();
            let error_text = response.text().await?;
            Err(anyhow::anyhow!(
                "Failed to upload snapshot: {} - {}",
                status,
                error_text
            ))
        }
    }
}

/// Where exported snapshots end up
pub enum SnapshotSink {
    Upload(UploadClient),
    Directory(PathBuf),
}

impl SnapshotSink {
    /// Upload when an upload URL is configured, otherwise write to `output_dir`
    pub fn from_config(config: &RunnerConfig) -> Result<Self> {
        match &config.upload_url {
            Some(url) => Ok(SnapshotSink::Upload(UploadClient::new(
                url.clone(),
                Duration::from_secs(config.upload_timeout_secs),
            )?)),
            None => Ok(SnapshotSink::Directory(PathBuf::from(&config.output_dir))),
        }
    }

    pub async fn deliver(&self, snapshot: &Snapshot) -> Result<()> {
        match self {
            SnapshotSink::Upload(client) => client.upload(snapshot).await,
            SnapshotSink::Directory(dir) => {
                tokio::fs::create_dir_all(dir).await?;
                let path = dir.join(&snapshot.file_name);
                tokio::fs::write(&path, &snapshot.png).await?;
                info!("Snapshot written to {:?}", path);
                Ok(())
            }
        }
    }

    pub fn describe(&self) -> String {
        match self {
            SnapshotSink::Upload(client) => format!("upload to {}", client.url),
            SnapshotSink::Directory(dir) => format!("directory {:?}", dir),
        }
    }
}
