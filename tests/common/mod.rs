//! Shared test fixtures

#![allow(dead_code)]

use async_trait::async_trait;
use board_export_sdk::export::image::{FetchedImage, ImageError, ImageFetcher};
use chrono::{NaiveDate, NaiveDateTime};
use std::cell::RefCell;
use std::collections::HashMap;

/// 1x1 transparent GIF
pub const GIF_PIXEL: &[u8] = &[
    0x47, 0x49, 0x46, 0x38, 0x39, 0x61, 0x01, 0x00, 0x01, 0x00, 0x80, 0x00, 0x00, 0x00, 0x00,
    0x00, 0xff, 0xff, 0xff, 0x21, 0xf9, 0x04, 0x01, 0x00, 0x00, 0x00, 0x00, 0x2c, 0x00, 0x00,
    0x00, 0x00, 0x01, 0x00, 0x01, 0x00, 0x00, 0x02, 0x02, 0x44, 0x01, 0x00, 0x3b,
];

pub const GIF_DATA_URI: &str = "data:image/gif;base64,R0lGODlhAQABAIAAAAAAAP///yH5BAEAAAAALAAAAAABAAEAAAICRAEAOw==";

/// In-memory image source that records every fetch
#[derive(Default)]
pub struct FakeFetcher {
    images: HashMap<String, (Vec<u8>, Option<String>)>,
    pub fetched: RefCell<Vec<String>>,
}

impl FakeFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_image(mut self, reference: &str, bytes: &[u8], content_type: Option<&str>) -> Self {
        self.images.insert(
            reference.to_string(),
            (bytes.to_vec(), content_type.map(str::to_string)),
        );
        self
    }

    pub fn fetch_count(&self, reference: &str) -> usize {
        self.fetched
            .borrow()
            .iter()
            .filter(|r| r.as_str() == reference)
            .count()
    }
}

#[async_trait(?Send)]
impl ImageFetcher for FakeFetcher {
    async fn fetch(&self, reference: &str) -> Result<FetchedImage, ImageError> {
        self.fetched.borrow_mut().push(reference.to_string());
        match self.images.get(reference) {
            Some((bytes, content_type)) => Ok(FetchedImage {
                bytes: bytes.clone(),
                content_type: content_type.clone(),
            }),
            None => Err(ImageError::HttpStatus {
                reference: reference.to_string(),
                status: 404,
            }),
        }
    }
}

pub fn fixed_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, 9)
        .unwrap()
        .and_hms_opt(7, 5, 2)
        .unwrap()
}
