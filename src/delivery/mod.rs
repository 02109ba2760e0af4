//! Delivery of finished export artifacts
//!
//! A sink persists an [`ExportArtifact`] under its suggested file name.
//! Mobile-style sinks ask for write permission before the first write;
//! the browser sink triggers a download.

use crate::export::ExportArtifact;
use crate::storage::StorageError;
use async_trait::async_trait;
use tracing::info;

#[cfg(all(target_arch = "wasm32", feature = "wasm"))]
pub mod browser;
pub mod filesystem;

pub use filesystem::FileSystemSink;

/// Error delivering an artifact
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("Write permission denied: {0}")]
    PermissionDenied(String),
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("Browser error: {0}")]
    Browser(String),
}

/// Destination for export artifacts
#[async_trait(?Send)]
pub trait ArtifactSink {
    /// Ask the platform for write access. Sinks without a permission model
    /// grant it immediately.
    async fn request_write_permission(&self) -> Result<(), DeliveryError> {
        Ok(())
    }

    /// Persist the artifact, returning where it went
    async fn save(&self, artifact: &ExportArtifact) -> Result<String, DeliveryError>;
}

/// Request permission, then save
pub async fn deliver(
    sink: &dyn ArtifactSink,
    artifact: &ExportArtifact,
) -> Result<String, DeliveryError> {
    sink.request_write_permission().await?;
    let location = sink.save(artifact).await?;
    info!(location = %location, bytes = artifact.bytes.len(), "Delivered export");
    Ok(location)
}
