//! Image resolution for tile images
//!
//! A tile's image reference is either an inline `data:` URI or a path/URL.
//! Inline images are decoded in place; everything else goes through an
//! [`ImageFetcher`]. Resolution never panics and never retries: callers get a
//! `Result` and decide how to degrade.

use crate::config::Platform;
use crate::storage::{StorageBackend, StorageError};
use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose};
use tracing::debug;

const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// Error resolving an image reference
#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("Invalid data URI: {0}")]
    InvalidDataUri(String),
    #[error("Failed to fetch {reference}: {message}")]
    FetchFailed { reference: String, message: String },
    #[error("Fetching {reference} returned HTTP {status}")]
    HttpStatus { reference: String, status: u16 },
    #[error("Cannot resolve relative reference without a base: {0}")]
    Unresolvable(String),
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Raw bytes returned by a fetcher
#[derive(Debug, Clone)]
pub struct FetchedImage {
    pub bytes: Vec<u8>,
    /// Content type reported by the source, if any
    pub content_type: Option<String>,
}

/// A resolved image: raw bytes, MIME type and a data URI encoding
#[derive(Debug, Clone, PartialEq)]
pub struct ImageArtifact {
    pub bytes: Vec<u8>,
    pub content_type: String,
    pub data_uri: String,
}

impl ImageArtifact {
    /// Preferred file extension for this artifact's content type
    pub fn extension(&self) -> Option<&'static str> {
        extension_for(&self.content_type)
    }
}

/// Source of image bytes for non-inline references
#[async_trait(?Send)]
pub trait ImageFetcher {
    async fn fetch(&self, reference: &str) -> Result<FetchedImage, ImageError>;
}

/// Fetcher for exports that must not touch the network or disk.
/// Every fetch fails, so only inline images survive.
pub struct OfflineImageFetcher;

#[async_trait(?Send)]
impl ImageFetcher for OfflineImageFetcher {
    async fn fetch(&self, reference: &str) -> Result<FetchedImage, ImageError> {
        Err(ImageError::Unresolvable(reference.to_string()))
    }
}

/// Fetches images over HTTP(S). Relative references are joined onto
/// `base_url`.
#[cfg(feature = "http-fetch")]
pub struct HttpImageFetcher {
    client: reqwest::Client,
    base_url: Option<String>,
}

#[cfg(feature = "http-fetch")]
impl HttpImageFetcher {
    pub fn new(base_url: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
        }
    }

    fn url_for(&self, reference: &str) -> Result<String, ImageError> {
        if is_absolute_url(reference) {
            return Ok(reference.to_string());
        }
        let base = self
            .base_url
            .as_deref()
            .ok_or_else(|| ImageError::Unresolvable(reference.to_string()))?;
        Ok(format!(
            "{}/{}",
            base.trim_end_matches('/'),
            strip_relative_prefix(reference)
        ))
    }
}

#[cfg(feature = "http-fetch")]
#[async_trait(?Send)]
impl ImageFetcher for HttpImageFetcher {
    async fn fetch(&self, reference: &str) -> Result<FetchedImage, ImageError> {
        let url = self.url_for(reference)?;
        let fetch_error = |e: reqwest::Error| ImageError::FetchFailed {
            reference: reference.to_string(),
            message: e.to_string(),
        };

        let response = self.client.get(&url).send().await.map_err(fetch_error)?;
        if !response.status().is_success() {
            return Err(ImageError::HttpStatus {
                reference: reference.to_string(),
                status: response.status().as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(mime_essence);
        let bytes = response.bytes().await.map_err(fetch_error)?.to_vec();

        Ok(FetchedImage {
            bytes,
            content_type,
        })
    }
}

/// Reads image references as paths inside a storage backend
pub struct StorageImageFetcher<B: StorageBackend> {
    backend: B,
}

impl<B: StorageBackend> StorageImageFetcher<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }
}

#[async_trait(?Send)]
impl<B: StorageBackend> ImageFetcher for StorageImageFetcher<B> {
    async fn fetch(&self, reference: &str) -> Result<FetchedImage, ImageError> {
        let path = archive_path_for(reference);
        let bytes = self.backend.read_file(&path).await?;
        Ok(FetchedImage {
            bytes,
            content_type: guess_content_type(&path).map(str::to_string),
        })
    }
}

/// Turns image references into [`ImageArtifact`]s
pub struct ImageResolver<'a> {
    fetcher: &'a dyn ImageFetcher,
    platform: Platform,
}

impl<'a> ImageResolver<'a> {
    pub fn new(fetcher: &'a dyn ImageFetcher, platform: Platform) -> Self {
        Self { fetcher, platform }
    }

    pub async fn resolve(&self, reference: &str) -> Result<ImageArtifact, ImageError> {
        if is_data_uri(reference) {
            return decode_data_uri(reference);
        }

        let reference = normalize_reference(reference, self.platform);
        debug!(reference = %reference, "Fetching image");
        let fetched = self.fetcher.fetch(&reference).await?;
        let content_type = fetched
            .content_type
            .or_else(|| guess_content_type(&reference).map(str::to_string))
            .unwrap_or_else(|| FALLBACK_CONTENT_TYPE.to_string());

        Ok(ImageArtifact {
            data_uri: encode_data_uri(&content_type, &fetched.bytes),
            bytes: fetched.bytes,
            content_type,
        })
    }
}

pub fn is_data_uri(reference: &str) -> bool {
    reference.starts_with("data:")
}

fn is_absolute_url(reference: &str) -> bool {
    reference.contains("://")
}

/// Sandboxed mobile shells reject absolute paths; rewrite `/x` to `./x`.
pub fn normalize_reference(reference: &str, platform: Platform) -> String {
    if platform == Platform::Mobile && reference.starts_with('/') {
        format!(".{}", reference)
    } else {
        reference.to_string()
    }
}

#[cfg(feature = "http-fetch")]
fn strip_relative_prefix(reference: &str) -> &str {
    let mut rest = reference;
    loop {
        if let Some(stripped) = rest.strip_prefix("./") {
            rest = stripped;
        } else if let Some(stripped) = rest.strip_prefix('/') {
            rest = stripped;
        } else {
            return rest;
        }
    }
}

/// Relative path for a remote or local reference: scheme, host and query
/// removed. Empty, `.` and `..` segments are dropped, so the result never
/// climbs out of the directory it is joined onto.
pub fn archive_path_for(reference: &str) -> String {
    let without_host = match reference.split_once("://") {
        Some((_, rest)) => rest.split_once('/').map(|(_, path)| path).unwrap_or(""),
        None => reference,
    };
    let without_query = without_host
        .split(['?', '#'])
        .next()
        .unwrap_or(without_host);
    without_query
        .split(['/', '\\'])
        .filter(|segment| !matches!(*segment, "" | "." | ".."))
        .collect::<Vec<_>>()
        .join("/")
}

fn mime_essence(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or(content_type)
        .trim()
        .to_ascii_lowercase()
}

pub fn encode_data_uri(content_type: &str, bytes: &[u8]) -> String {
    format!(
        "data:{};base64,{}",
        content_type,
        general_purpose::STANDARD.encode(bytes)
    )
}

/// Decode a `data:` URI. Base64 payloads are decoded, anything else is
/// percent-decoded.
pub fn decode_data_uri(uri: &str) -> Result<ImageArtifact, ImageError> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| ImageError::InvalidDataUri("missing data: scheme".to_string()))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| ImageError::InvalidDataUri("missing ',' separator".to_string()))?;

    let mut params = header.split(';');
    let media_type = params.next().map(str::trim).unwrap_or_default();
    let is_base64 = params.any(|p| p.trim().eq_ignore_ascii_case("base64"));
    let content_type = if media_type.is_empty() {
        "text/plain".to_string()
    } else {
        media_type.to_ascii_lowercase()
    };

    let bytes = if is_base64 {
        let compact: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
        general_purpose::STANDARD
            .decode(compact)
            .map_err(|e| ImageError::InvalidDataUri(e.to_string()))?
    } else {
        urlencoding::decode_binary(payload.as_bytes()).into_owned()
    };

    Ok(ImageArtifact {
        bytes,
        content_type,
        data_uri: uri.to_string(),
    })
}

pub fn guess_content_type(path: &str) -> Option<&'static str> {
    let extension = path.rsplit_once('.')?.1.to_ascii_lowercase();
    let content_type = match extension.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "ico" => "image/x-icon",
        "tif" | "tiff" => "image/tiff",
        _ => return None,
    };
    Some(content_type)
}

pub fn extension_for(content_type: &str) -> Option<&'static str> {
    let extension = match mime_essence(content_type).as_str() {
        "image/png" => "png",
        "image/jpeg" | "image/jpg" => "jpeg",
        "image/gif" => "gif",
        "image/svg+xml" => "svg",
        "image/webp" => "webp",
        "image/bmp" => "bmp",
        "image/x-icon" | "image/vnd.microsoft.icon" => "ico",
        "image/tiff" => "tif",
        _ => return None,
    };
    Some(extension)
}
