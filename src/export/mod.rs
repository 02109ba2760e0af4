//! Export functionality
//!
//! Provides exporters for:
//! - OBF (Open Board Format), one board per JSON document
//! - OBZ, a zip of OBF documents, images and a manifest
//! - Native JSON (the stored records as-is)
//! - PDF

pub mod filename;
pub mod grid;
pub mod image;
pub mod native;
pub mod obf;
pub mod obz;
#[cfg(feature = "pdf-export")]
pub mod pdf;
pub mod service;

use serde::Serialize;

/// A finished export, ready to hand to a delivery sink
#[derive(Debug, Clone, PartialEq)]
pub struct ExportArtifact {
    /// Suggested file name
    pub filename: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// Error during export
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("Serialization error: {0}")]
    SerializationError(String),
    #[error("Archive error: {0}")]
    ArchiveError(String),
    #[error("PDF error: {0}")]
    PdfError(String),
    #[error("IO error: {0}")]
    IoError(String),
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
    #[error("Invalid export config: {0}")]
    InvalidConfig(String),
}

impl From<crate::config::ConfigError> for ExportError {
    fn from(err: crate::config::ConfigError) -> Self {
        ExportError::InvalidConfig(err.to_string())
    }
}

impl From<serde_json::Error> for ExportError {
    fn from(err: serde_json::Error) -> Self {
        ExportError::SerializationError(err.to_string())
    }
}

/// Pretty-printed JSON with two-space indentation
pub(crate) fn to_pretty_json<T: Serialize>(value: &T) -> Result<Vec<u8>, ExportError> {
    Ok(serde_json::to_vec_pretty(value)?)
}

// Re-export for convenience
pub use self::filename::{ArtifactKind, Clock, FixedClock, SystemClock};
pub use self::image::{ImageArtifact, ImageError, ImageFetcher, ImageResolver, OfflineImageFetcher};
#[cfg(feature = "http-fetch")]
pub use self::image::HttpImageFetcher;
pub use obf::{MappedBoard, ObfBoard, ObfButton, ObfMapper};
pub use obz::{Manifest, ObzArchive, ObzAssembler};
#[cfg(feature = "pdf-export")]
pub use pdf::PdfExporter;
pub use service::{BoardExporter, ExportFormat, ExportRequest};
