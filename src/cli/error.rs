//! CLI error type

use crate::config::ConfigError;
use crate::delivery::DeliveryError;
use crate::export::ExportError;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Failed to read {0}: {1}")]
    FileReadError(PathBuf, String),
    #[error("Failed to parse boards: {0}")]
    BoardParseError(String),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Export failed: {0}")]
    Export(#[from] ExportError),
    #[error("Delivery failed: {0}")]
    Delivery(#[from] DeliveryError),
    #[error("Nothing to export: {0}")]
    NothingToExport(String),
}
