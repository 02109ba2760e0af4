//! Native export: the stored board records as a JSON array, unchanged

use super::ExportError;
use crate::models::Board;

pub fn export_native(boards: &[Board]) -> Result<Vec<u8>, ExportError> {
    serde_json::to_vec(boards).map_err(|e| ExportError::SerializationError(e.to_string()))
}

/// Inverse of [`export_native`], for re-importing a dump
pub fn import_native(content: &[u8]) -> Result<Vec<Board>, ExportError> {
    serde_json::from_slice(content).map_err(|e| ExportError::SerializationError(e.to_string()))
}
