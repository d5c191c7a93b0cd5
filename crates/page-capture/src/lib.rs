//! Page capture
//!
//! Renders a page in a fresh headless Chrome session, screenshots it as JPEG
//! and scales the result. The browser step sits behind [`PageRenderer`] so the
//! pipeline can run against any renderer.

pub mod capture;
pub mod error;
pub mod options;
pub mod renderer;
pub mod resize;

pub use capture::Capturer;
pub use error::{CaptureError, Result};
pub use options::{CaptureOptions, Viewport, FULL_PAGE_VIEWPORT_HEIGHT};
pub use renderer::{ChromeConfig, ChromeRenderer, PageRenderer, ScreenshotJob};
pub use resize::{resize_jpeg, TargetSize};
