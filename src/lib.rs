//! Board Export SDK - export AAC communication boards for sharing and printing
//!
//! Provides:
//! - OBF documents (one board, images embedded)
//! - OBZ archives (linked board sets with shared images and a manifest)
//! - Native JSON dumps of the stored boards
//! - Printable PDF grids
//! - Delivery of finished artifacts to a file system or a browser download

pub mod config;
pub mod delivery;
pub mod export;
pub mod i18n;
pub mod models;
pub mod storage;

#[cfg(feature = "cli")]
pub mod cli;

// Re-export commonly used types
pub use config::{ConfigError, ExportConfig, LabelPosition, PageSize, Platform};
pub use delivery::{ArtifactSink, DeliveryError, FileSystemSink, deliver};
#[cfg(all(target_arch = "wasm32", feature = "wasm"))]
pub use delivery::browser::BrowserDownloadSink;
pub use export::{
    BoardExporter, ExportArtifact, ExportError, ExportFormat, ExportRequest, ImageError,
    ImageFetcher, ObzAssembler, ObfMapper,
};
pub use i18n::Translations;
pub use models::{Board, Tile};
pub use storage::{StorageBackend, StorageError};
#[cfg(feature = "native-fs")]
pub use storage::filesystem::FileSystemStorageBackend;
