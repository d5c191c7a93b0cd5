//! Post-capture resizing and JPEG re-encoding

use crate::error::{CaptureError, Result};
use crate::options::Viewport;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::GenericImageView;

/// Output size of the resize step
///
/// `height` is `None` for full-page captures, where the height follows the
/// source aspect ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetSize {
    pub width: u32,
    pub height: Option<u32>,
}

impl TargetSize {
    /// Scale a viewport. Fails when a scaled side rounds below one pixel or
    /// the scale is not a finite number.
    pub fn scaled(viewport: Viewport, scale: f64, full_page: bool) -> Result<Self> {
        let width = (f64::from(viewport.width) * scale).round();
        let height = (!full_page).then(|| (f64::from(viewport.height) * scale).round());

        let invalid = || CaptureError::InvalidDimensions { width, height };

        let width = to_pixels(width).ok_or_else(invalid)?;
        let height = match height {
            Some(h) => Some(to_pixels(h).ok_or_else(invalid)?),
            None => None,
        };

        Ok(Self { width, height })
    }
}

fn to_pixels(value: f64) -> Option<u32> {
    if value.is_finite() && value >= 1.0 && value <= f64::from(u32::MAX) {
        Some(value as u32)
    } else {
        None
    }
}

/// Height that keeps the source aspect ratio at `target_width`
fn proportional_height(source: (u32, u32), target_width: u32) -> Result<u32> {
    let (src_width, src_height) = source;
    let height = (f64::from(src_height) * f64::from(target_width) / f64::from(src_width)).round();

    to_pixels(height).ok_or(CaptureError::InvalidDimensions {
        width: f64::from(target_width),
        height: Some(height),
    })
}

/// JPEG encoder quality. The encoder only accepts 1..=100.
fn encoder_quality(quality: u32) -> u8 {
    quality.clamp(1, 100) as u8
}

/// Decode a screenshot, resize it to `target` and re-encode it as JPEG
pub fn resize_jpeg(data: &[u8], target: TargetSize, quality: u32) -> Result<Vec<u8>> {
    let source = image::load_from_memory(data).map_err(|e| CaptureError::Decode(Box::new(e)))?;

    let height = match target.height {
        Some(height) => height,
        None => proportional_height(source.dimensions(), target.width)?,
    };

    let resized = if source.dimensions() == (target.width, height) {
        source
    } else {
        source.resize_exact(target.width, height, FilterType::Lanczos3)
    };

    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut out, encoder_quality(quality))
        .encode_image(&resized.to_rgb8())
        .map_err(|e| CaptureError::Encode(Box::new(e)))?;

    Ok(out)
}
