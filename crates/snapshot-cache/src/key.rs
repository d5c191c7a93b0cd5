//! Deterministic cache keys derived from capture parameters

use std::fmt;

/// File extension used for every cached snapshot
pub const SNAPSHOT_EXTENSION: &str = "jpg";

/// A cache key of the form `<width>*<height>_<quality>_<scale>_<page>_<url>`.
///
/// The page type is case-folded and the url is percent-encoded so the key is
/// always a single, filesystem-safe path component. Keys are write-only: they
/// are never parsed back into parameters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn new(
        width: u32,
        height: u32,
        quality: u32,
        scale: f64,
        page_type: &str,
        url: &str,
    ) -> Self {
        Self(format!(
            "{}*{}_{}_{}_{}_{}",
            width,
            height,
            quality,
            scale,
            page_type.to_lowercase(),
            urlencoding::encode(url)
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Name of the file this key is stored under
    pub fn file_name(&self) -> String {
        format!("{}.{}", self.0, SNAPSHOT_EXTENSION)
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
