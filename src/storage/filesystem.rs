//! File system storage backend
//!
//! Implements StorageBackend on the native file system. Used to read local
//! image assets referenced by tiles and to write finished export artifacts.
//!
//! ## Security
//!
//! Paths containing ".." are rejected, and existing paths are canonicalized
//! and checked to remain within the base directory.

use super::{StorageBackend, StorageError};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// File system storage backend
pub struct FileSystemStorageBackend {
    base_path: PathBuf,
}

impl FileSystemStorageBackend {
    /// Create a new file system storage backend rooted at `base_path`
    ///
    /// # Example
    ///
    /// ```rust
    /// use board_export_sdk::storage::filesystem::FileSystemStorageBackend;
    ///
    /// let backend = FileSystemStorageBackend::new("/sdcard");
    /// ```
    pub fn new(base_path: impl AsRef<Path>) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
        }
    }

    /// Base directory all paths resolve against
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Resolve a relative path against the base path, rejecting anything that
    /// could escape it.
    fn resolve_path(&self, path: &str) -> Result<PathBuf, StorageError> {
        let relative = Path::new(path.trim_start_matches('/'));

        if path.contains("..")
            || relative
                .components()
                .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
        {
            return Err(StorageError::PermissionDenied(format!(
                "Path escapes base directory: {}",
                path
            )));
        }

        let full = self.base_path.join(relative);

        // Symlinks inside the base can still point outside it
        let existing = if full.exists() {
            Some(full.as_path())
        } else {
            full.parent().filter(|parent| parent.exists())
        };
        if let Some(existing) = existing {
            let base = self
                .base_path
                .canonicalize()
                .unwrap_or_else(|_| self.base_path.clone());
            let canonical = existing
                .canonicalize()
                .map_err(|e| StorageError::IoError(format!("Failed to resolve {}: {}", path, e)))?;
            if !canonical.starts_with(&base) {
                return Err(StorageError::PermissionDenied(format!(
                    "Path escapes base directory: {}",
                    path
                )));
            }
        }

        Ok(full)
    }
}

fn io_error(path: &str, action: &str, e: std::io::Error) -> StorageError {
    match e.kind() {
        ErrorKind::NotFound => StorageError::FileNotFound(path.to_string()),
        ErrorKind::PermissionDenied => StorageError::PermissionDenied(path.to_string()),
        _ => StorageError::IoError(format!("Failed to {} {}: {}", action, path, e)),
    }
}

#[async_trait(?Send)]
impl StorageBackend for FileSystemStorageBackend {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>, StorageError> {
        let full_path = self.resolve_path(path)?;
        fs::read(&full_path)
            .await
            .map_err(|e| io_error(path, "read", e))
    }

    async fn write_file(&self, path: &str, content: &[u8]) -> Result<(), StorageError> {
        let full_path = self.resolve_path(path)?;

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| io_error(path, "create directory for", e))?;
        }

        debug!(path, bytes = content.len(), "Writing file");
        fs::write(&full_path, content)
            .await
            .map_err(|e| io_error(path, "write", e))
    }

    async fn file_exists(&self, path: &str) -> Result<bool, StorageError> {
        let full_path = self.resolve_path(path)?;
        match fs::metadata(&full_path).await {
            Ok(metadata) => Ok(metadata.is_file()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(io_error(path, "stat", e)),
        }
    }

    async fn create_dir(&self, path: &str) -> Result<(), StorageError> {
        let full_path = self.resolve_path(path)?;
        fs::create_dir_all(&full_path)
            .await
            .map_err(|e| match io_error(path, "create directory", e) {
                StorageError::FileNotFound(p) => StorageError::DirectoryNotFound(p),
                other => other,
            })
    }

    async fn dir_exists(&self, path: &str) -> Result<bool, StorageError> {
        let full_path = self.resolve_path(path)?;
        match fs::metadata(&full_path).await {
            Ok(metadata) => Ok(metadata.is_dir()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(io_error(path, "stat", e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_path_traversal_blocked() {
        let temp = TempDir::new().unwrap();
        let backend = FileSystemStorageBackend::new(temp.path());

        let result = backend.resolve_path("../etc/passwd");
        assert!(matches!(result, Err(StorageError::PermissionDenied(_))));

        let result = backend.resolve_path("/images/../../../etc/passwd");
        assert!(matches!(result, Err(StorageError::PermissionDenied(_))));
    }

    #[test]
    fn test_valid_paths_allowed() {
        let temp = TempDir::new().unwrap();
        let backend = FileSystemStorageBackend::new(temp.path());

        assert!(backend.resolve_path("board.obf").is_ok());
        assert!(
            backend
                .resolve_path("Download/2024-01-01_10-00-00-Home board.obz")
                .is_ok()
        );
        // Application-relative references carry a leading slash
        assert!(backend.resolve_path("/symbols/mulberry/yes.svg").is_ok());
        assert!(backend.resolve_path("./symbols/mulberry/yes.svg").is_ok());
    }

    #[tokio::test]
    async fn test_write_creates_parent_directories() {
        let temp = TempDir::new().unwrap();
        let backend = FileSystemStorageBackend::new(temp.path());

        backend
            .write_file("Download/nested/board.json", b"[]")
            .await
            .unwrap();
        assert!(backend.dir_exists("Download/nested").await.unwrap());
        assert!(backend.file_exists("Download/nested/board.json").await.unwrap());
        assert_eq!(
            backend.read_file("Download/nested/board.json").await.unwrap(),
            b"[]"
        );
    }

    #[tokio::test]
    async fn test_missing_file() {
        let temp = TempDir::new().unwrap();
        let backend = FileSystemStorageBackend::new(temp.path());

        let result = backend.read_file("images/missing.png").await;
        assert!(matches!(result, Err(StorageError::FileNotFound(_))));
        assert!(!backend.file_exists("images/missing.png").await.unwrap());
    }
}
