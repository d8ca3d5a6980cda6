//! Local storage for uploaded files.

use life_core::Result;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Writes uploads into one directory, keyed by their original file name.
///
/// Existing files with the same name are overwritten.
pub struct UploadStore {
    dir: PathBuf,
}

impl UploadStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create the upload directory if it does not exist yet
    pub async fn ensure_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.dir).await?;
        debug!("Upload directory ready: {:?}", self.dir);
        Ok(())
    }

    /// Where a file uploaded as `original_name` is stored.
    ///
    /// Directory components are dropped; `None` when nothing usable is left.
    pub fn target_path(&self, original_name: &str) -> Option<PathBuf> {
        let name = Path::new(original_name).file_name()?;
        Some(self.dir.join(name))
    }

    /// Write `bytes` to a path obtained from [`Self::target_path`]
    pub async fn save(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        fs::write(path, bytes).await?;
        info!("Stored upload {:?} ({} bytes)", path, bytes.len());
        Ok(())
    }
}
