//! Request types for the snapshot endpoint

use page_capture::CaptureOptions;
use serde::Deserialize;
use snapshot_cache::CacheKey;
use std::str::FromStr;

/// Raw path segments of `/get/width/.../url/{url}`
#[derive(Debug, Clone, Deserialize)]
pub struct SnapshotPath {
    pub width: String,
    pub height: String,
    pub quality: String,
    pub scale: String,
    pub page_type: String,
    pub url: String,
}

/// A parsed snapshot request
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureRequest {
    pub width: u32,
    /// `0` requests a full-page capture
    pub height: u32,
    pub quality: u32,
    pub scale: f64,
    /// Lower-cased page type
    pub page_type: String,
    /// Host with optional path and query, no scheme
    pub url: String,
}

impl CaptureRequest {
    pub fn cache_key(&self) -> CacheKey {
        CacheKey::new(
            self.width,
            self.height,
            self.quality,
            self.scale,
            &self.page_type,
            &self.url,
        )
    }

    pub fn capture_options(&self) -> CaptureOptions {
        CaptureOptions {
            width: self.width,
            height: self.height,
            quality: self.quality,
            scale: self.scale,
            page_type: self.page_type.clone(),
        }
    }
}

impl TryFrom<SnapshotPath> for CaptureRequest {
    type Error = String;

    fn try_from(path: SnapshotPath) -> Result<Self, Self::Error> {
        Ok(Self {
            width: parse_segment("width", &path.width)?,
            height: parse_segment("height", &path.height)?,
            quality: parse_segment("quality", &path.quality)?,
            scale: parse_segment("scale", &path.scale)?,
            page_type: path.page_type.to_lowercase(),
            url: path.url,
        })
    }
}

fn parse_segment<T: FromStr>(name: &str, value: &str) -> Result<T, String> {
    value
        .trim()
        .parse()
        .map_err(|_| format!("Invalid {}: {:?}", name, value))
}
