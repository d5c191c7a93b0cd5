//! Capture options and viewport sizing

/// Viewport height used when a full-page capture is requested
pub const FULL_PAGE_VIEWPORT_HEIGHT: u32 = 1080;

/// Parameters for a single capture
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureOptions {
    /// Viewport width in pixels
    pub width: u32,
    /// Viewport height in pixels, `0` captures the full scrollable page
    pub height: u32,
    /// JPEG quality handed to the browser and the encoder
    pub quality: u32,
    /// Output scale factor applied to the viewport dimensions
    pub scale: f64,
    /// Lower-cased page type. Carried along but not interpreted.
    pub page_type: String,
}

impl CaptureOptions {
    pub fn is_full_page(&self) -> bool {
        self.height == 0
    }

    /// Browser viewport for these options
    pub fn viewport(&self) -> Viewport {
        Viewport {
            width: self.width,
            height: if self.is_full_page() {
                FULL_PAGE_VIEWPORT_HEIGHT
            } else {
                self.height
            },
        }
    }
}

/// Browser viewport dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}
