//! Export configuration
//!
//! All fields have defaults matching the application's built-in export
//! constants, so an empty TOML file (or no file) yields a usable config.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Error loading configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {message}")]
    ReadError { path: String, message: String },
    #[error("Invalid config: {0}")]
    ParseError(String),
    #[error("Invalid value: {0}")]
    InvalidValue(String),
}

/// Where tile labels are drawn relative to their image in PDF exports
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LabelPosition {
    Above,
    #[default]
    Below,
    /// No label; a blank spacer keeps rows apart
    Hidden,
}

/// Platform the export runs on. Controls image path normalization and
/// where artifacts are delivered.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    #[default]
    Browser,
    /// Sandboxed mobile shell: no absolute paths, files go to `Download/`
    Mobile,
}

/// Paper size for PDF exports. Pages are always landscape.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PageSize {
    /// A4 paper size (210 x 297 mm)
    #[default]
    A4,
    /// US Letter size (8.5 x 11 inches)
    Letter,
}

impl PageSize {
    /// Portrait dimensions in millimeters (width, height)
    pub fn dimensions_mm(&self) -> (f64, f64) {
        match self {
            PageSize::A4 => (210.0, 297.0),
            PageSize::Letter => (215.9, 279.4),
        }
    }

    /// Landscape dimensions in points (width, height)
    pub fn landscape_points(&self) -> (f64, f64) {
        let (width, height) = self.dimensions_mm();
        (height * MM_TO_POINTS, width * MM_TO_POINTS)
    }
}

const MM_TO_POINTS: f64 = 2.834_645_67;

/// License block embedded in every OBF document
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ObfLicense {
    #[serde(rename = "type")]
    pub license_type: String,
    pub copyright_notice_url: String,
    pub author_name: String,
    pub author_url: String,
    pub author_email: String,
}

impl Default for ObfLicense {
    fn default() -> Self {
        Self {
            license_type: "CC-By".to_string(),
            copyright_notice_url: "https://creativecommons.org/licenses/by/4.0/".to_string(),
            author_name: "Cboard".to_string(),
            author_url: "https://www.cboard.io".to_string(),
            author_email: "support@cboard.io".to_string(),
        }
    }
}

/// Configuration shared by every exporter
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExportConfig {
    /// Fixed grid column count
    pub columns: usize,
    /// Grid rows per PDF page before a page break
    pub rows_per_page: usize,
    /// Width and height written for every OBF image record
    pub image_size: u32,
    /// Prefix for the canonical board URL
    pub board_url_base: String,
    pub license: ObfLicense,
    /// Prefix for vendor extension keys
    pub ext_prefix: String,
    /// Stored keys copied into vendor extension keys
    pub ext_properties: Vec<String>,
    pub label_position: LabelPosition,
    pub page_size: PageSize,
    pub platform: Platform,
    /// Base URL for application-relative image references
    pub asset_base_url: Option<String>,
    /// Deflate level for OBZ archives
    pub zip_compression_level: i64,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            columns: 6,
            rows_per_page: 4,
            image_size: 300,
            board_url_base: "https://app.cboard.io/board/".to_string(),
            license: ObfLicense::default(),
            ext_prefix: "ext_cboard_".to_string(),
            ext_properties: ["labelKey", "nameKey", "linkedBoard", "hidden"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            label_position: LabelPosition::default(),
            page_size: PageSize::default(),
            platform: Platform::default(),
            asset_base_url: None,
            zip_compression_level: 6,
        }
    }
}

impl ExportConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.columns == 0 {
            return Err(ConfigError::InvalidValue(
                "columns must be greater than zero".to_string(),
            ));
        }
        if self.rows_per_page == 0 {
            return Err(ConfigError::InvalidValue(
                "rows_per_page must be greater than zero".to_string(),
            ));
        }
        if !(0..=9).contains(&self.zip_compression_level) {
            return Err(ConfigError::InvalidValue(format!(
                "zip_compression_level must be between 0 and 9, got {}",
                self.zip_compression_level
            )));
        }
        Ok(())
    }

    pub fn with_columns(mut self, columns: usize) -> Self {
        self.columns = columns;
        self
    }

    pub fn with_rows_per_page(mut self, rows: usize) -> Self {
        self.rows_per_page = rows;
        self
    }

    pub fn with_label_position(mut self, position: LabelPosition) -> Self {
        self.label_position = position;
        self
    }

    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    pub fn with_asset_base_url(mut self, url: impl Into<String>) -> Self {
        self.asset_base_url = Some(url.into());
        self
    }

    /// Canonical URL for a board
    pub fn board_url(&self, board_id: &str) -> String {
        format!("{}{}", self.board_url_base, board_id)
    }
}
