//! Storage backend abstraction
//!
//! Defines the StorageBackend trait used to read local image assets and to
//! write finished export artifacts:
//! - FileSystemStorageBackend: Native file system (for native and mobile shells)

use async_trait::async_trait;

/// Error type for storage operations
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("File not found: {0}")]
    FileNotFound(String),
    #[error("Directory not found: {0}")]
    DirectoryNotFound(String),
    #[error("IO error: {0}")]
    IoError(String),
    #[error("Permission denied: {0}")]
    PermissionDenied(String),
    #[error("Storage backend error: {0}")]
    BackendError(String),
}

/// Trait for storage backends
///
/// Paths are relative to the backend's root and use `/` separators.
#[async_trait(?Send)]
pub trait StorageBackend {
    /// Read a file from storage
    async fn read_file(&self, path: &str) -> Result<Vec<u8>, StorageError>;

    /// Write a file to storage, creating parent directories
    async fn write_file(&self, path: &str, content: &[u8]) -> Result<(), StorageError>;

    /// Check if a file exists
    async fn file_exists(&self, path: &str) -> Result<bool, StorageError>;

    /// Create a directory
    async fn create_dir(&self, path: &str) -> Result<(), StorageError>;

    /// Check if a directory exists
    async fn dir_exists(&self, path: &str) -> Result<bool, StorageError>;
}

#[cfg(feature = "native-fs")]
pub mod filesystem;
