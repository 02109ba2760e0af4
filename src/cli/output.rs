//! Output formatting for CLI

use crate::export::ExportArtifact;

/// Human-readable size, e.g. `12.3 KiB`
pub fn format_size(bytes: usize) -> String {
    const UNITS: [&str; 3] = ["KiB", "MiB", "GiB"];
    if bytes < 1024 {
        return format!("{} B", bytes);
    }
    let mut size = bytes as f64 / 1024.0;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", size, UNITS[unit])
}

/// One-line summary of a delivered artifact
pub fn format_export_summary(artifact: &ExportArtifact, location: &str) -> String {
    format!(
        "✅ Exported {} ({}, {}) to {}",
        artifact.filename,
        artifact.mime_type,
        format_size(artifact.bytes.len()),
        location
    )
}
