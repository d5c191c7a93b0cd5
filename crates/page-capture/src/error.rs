//! Error types for page capture

use std::fmt;

#[derive(Debug)]
pub enum CaptureError {
    /// Browser process or tab could not be started
    Launch(String),
    /// Page failed to load or never went network-idle before the timeout
    Navigation(String),
    /// Screenshot could not be taken
    Screenshot(String),
    /// Screenshot bytes could not be decoded
    Decode(Box<image::ImageError>),
    /// Scale produced a target size that cannot be rendered
    InvalidDimensions { width: f64, height: Option<f64> },
    /// Resized image could not be encoded
    Encode(Box<image::ImageError>),
    /// Blocking render task panicked or was cancelled
    Join(String),
}

impl fmt::Display for CaptureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureError::Launch(msg) => write!(f, "Browser launch error: {}", msg),
            CaptureError::Navigation(msg) => write!(f, "Navigation error: {}", msg),
            CaptureError::Screenshot(msg) => write!(f, "Screenshot error: {}", msg),
            CaptureError::Decode(err) => write!(f, "Image decode error: {}", err),
            CaptureError::InvalidDimensions {
                width,
                height: Some(height),
            } => write!(f, "Invalid resize dimensions: {}x{}", width, height),
            CaptureError::InvalidDimensions {
                width,
                height: None,
            } => write!(f, "Invalid resize dimensions: {}xauto", width),
            CaptureError::Encode(err) => write!(f, "Image encode error: {}", err),
            CaptureError::Join(msg) => write!(f, "Render task failed: {}", msg),
        }
    }
}

impl std::error::Error for CaptureError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CaptureError::Decode(err) | CaptureError::Encode(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl From<tokio::task::JoinError> for CaptureError {
    fn from(err: tokio::task::JoinError) -> Self {
        CaptureError::Join(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CaptureError>;
