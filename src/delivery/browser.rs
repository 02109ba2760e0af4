//! Browser download sink
//!
//! Wraps the artifact in a Blob, points a temporary anchor at an object URL
//! and clicks it, which hands the file to the browser's download manager.

use super::{ArtifactSink, DeliveryError};
use crate::export::ExportArtifact;
use async_trait::async_trait;
use wasm_bindgen::JsCast;
use web_sys::{Blob, BlobPropertyBag, HtmlAnchorElement, Url};

/// Triggers a browser download for each artifact
#[derive(Default)]
pub struct BrowserDownloadSink;

impl BrowserDownloadSink {
    pub fn new() -> Self {
        Self
    }
}

fn js_error(context: &str, err: wasm_bindgen::JsValue) -> DeliveryError {
    DeliveryError::Browser(format!("{}: {:?}", context, err))
}

#[async_trait(?Send)]
impl ArtifactSink for BrowserDownloadSink {
    async fn save(&self, artifact: &ExportArtifact) -> Result<String, DeliveryError> {
        let window = web_sys::window()
            .ok_or_else(|| DeliveryError::Browser("Window not available".to_string()))?;
        let document = window
            .document()
            .ok_or_else(|| DeliveryError::Browser("Document not available".to_string()))?;

        let parts = js_sys::Array::new();
        parts.push(&js_sys::Uint8Array::from(artifact.bytes.as_slice()));
        let options = BlobPropertyBag::new();
        options.set_type(&artifact.mime_type);
        let blob = Blob::new_with_u8_array_sequence_and_options(&parts, &options)
            .map_err(|e| js_error("Failed to create blob", e))?;
        let url = Url::create_object_url_with_blob(&blob)
            .map_err(|e| js_error("Failed to create object URL", e))?;

        let anchor = document
            .create_element("a")
            .map_err(|e| js_error("Failed to create anchor", e))?
            .dyn_into::<HtmlAnchorElement>()
            .map_err(|_| DeliveryError::Browser("Element is not an anchor".to_string()))?;
        anchor.set_href(&url);
        anchor.set_download(&artifact.filename);
        anchor.click();

        Url::revoke_object_url(&url).map_err(|e| js_error("Failed to revoke object URL", e))?;
        Ok(artifact.filename.clone())
    }
}
