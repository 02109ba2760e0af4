//! Sink writing artifacts through a [`StorageBackend`]

use super::{ArtifactSink, DeliveryError};
use crate::config::Platform;
use crate::export::ExportArtifact;
use crate::storage::{StorageBackend, StorageError};
use async_trait::async_trait;
use tracing::debug;

/// Directory mobile shells save exports into
pub const MOBILE_DOWNLOAD_DIR: &str = "Download";

pub struct FileSystemSink<B: StorageBackend> {
    backend: B,
    directory: Option<String>,
}

impl<B: StorageBackend> FileSystemSink<B> {
    /// Writes artifacts at the backend root
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            directory: None,
        }
    }

    /// Writes artifacts under `Download/`, creating it on permission request
    pub fn mobile(backend: B) -> Self {
        Self {
            backend,
            directory: Some(MOBILE_DOWNLOAD_DIR.to_string()),
        }
    }

    pub fn for_platform(backend: B, platform: Platform) -> Self {
        match platform {
            Platform::Browser => Self::new(backend),
            Platform::Mobile => Self::mobile(backend),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn path_for(&self, filename: &str) -> String {
        match &self.directory {
            Some(dir) => format!("{}/{}", dir, filename),
            None => filename.to_string(),
        }
    }
}

#[async_trait(?Send)]
impl<B: StorageBackend> ArtifactSink for FileSystemSink<B> {
    async fn request_write_permission(&self) -> Result<(), DeliveryError> {
        let Some(dir) = &self.directory else {
            return Ok(());
        };
        if !self.backend.dir_exists(dir).await? {
            debug!(directory = %dir, "Creating download directory");
            self.backend.create_dir(dir).await.map_err(|e| match e {
                StorageError::PermissionDenied(msg) => DeliveryError::PermissionDenied(msg),
                other => DeliveryError::Storage(other),
            })?;
        }
        Ok(())
    }

    async fn save(&self, artifact: &ExportArtifact) -> Result<String, DeliveryError> {
        let path = self.path_for(&artifact.filename);
        self.backend
            .write_file(&path, &artifact.bytes)
            .await
            .map_err(|e| match e {
                StorageError::PermissionDenied(msg) => DeliveryError::PermissionDenied(msg),
                other => DeliveryError::Storage(other),
            })?;
        Ok(path)
    }
}
