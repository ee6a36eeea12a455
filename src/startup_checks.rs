use crate::Config;
use crate::imaging::{ImagingError, inspect};
use crate::messaging::MessagingError;
use crate::store::StoreError;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{error, info, warn};

#[derive(Debug, Error)]
pub enum StartupCheckError {
    #[error("Failed to create storage directory: {0}")]
    StorageDirectoryCreationFailed(#[from] std::io::Error),

    #[error("Static files directory does not exist")]
    StaticDirectoryMissing,

    #[error("Watermark template missing: {0:?}")]
    WatermarkMissing(PathBuf),

    #[error("Watermark template {0:?} is unreadable: {1}")]
    WatermarkUnreadable(PathBuf, #[source] ImagingError),

    #[error("Invalid storage location: {0}")]
    InvalidStorage(#[from] StoreError),

    #[error("Messaging client could not be created: {0}")]
    Messaging(#[from] MessagingError),
}

impl StartupCheckError {
    /// Whether the service cannot run at all with this problem.
    pub fn is_critical(&self) -> bool {
        !matches!(self, StartupCheckError::StaticDirectoryMissing)
    }
}

pub async fn perform_startup_checks(config: &Config) -> Result<(), Vec<StartupCheckError>> {
    let mut errors = Vec::new();

    info!("Performing startup checks...");

    let storage_dir = Path::new(&config.storage.directory);
    if !storage_dir.exists() {
        info!(
            "Storage directory does not exist, creating: {:?}",
            storage_dir
        );
        if let Err(e) = tokio::fs::create_dir_all(storage_dir).await {
            error!("Failed to create storage directory: {}", e);
            errors.push(StartupCheckError::StorageDirectoryCreationFailed(e));
        } else {
            info!("Storage directory created successfully");
        }
    } else {
        info!("Storage directory exists: {:?}", storage_dir);
    }

    let static_dir = Path::new(&config.static_files.directory);
    if !static_dir.exists() {
        warn!("Static files directory does not exist: {:?}", static_dir);
        errors.push(StartupCheckError::StaticDirectoryMissing);
    } else {
        info!("Static files directory exists: {:?}", static_dir);
    }

    let watermark = &config.imaging.watermark;
    if !watermark.exists() {
        error!("Watermark template missing: {:?}", watermark);
        errors.push(StartupCheckError::WatermarkMissing(watermark.clone()));
    } else {
        match inspect(watermark) {
            Ok(dimensions) => info!("Watermark template {:?} is {}", watermark, dimensions),
            Err(e) => {
                error!("Watermark template {:?} is unreadable: {}", watermark, e);
                errors.push(StartupCheckError::WatermarkUnreadable(watermark.clone(), e));
            }
        }
    }

    if errors.is_empty() {
        info!("All startup checks passed");
        Ok(())
    } else {
        error!("Startup checks failed with {} errors", errors.len());
        Err(errors)
    }
}
