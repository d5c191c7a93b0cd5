//! Headless Chrome rendering
//!
//! Every screenshot runs in its own browser process. The process is torn down
//! when the `Browser` handle drops, so it is released on every return path.

use crate::error::{CaptureError, Result};
use crate::options::{CaptureOptions, Viewport};
use base64::Engine as _;
use headless_chrome::protocol::cdp::{Emulation, Page};
use headless_chrome::{Browser, LaunchOptions, Tab};
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

/// Script returning the full scrollable height of the document
const SCROLL_HEIGHT_SCRIPT: &str = "Math.max(\
    document.body ? document.body.scrollHeight : 0, \
    document.documentElement ? document.documentElement.scrollHeight : 0)";

/// Everything a renderer needs to take one screenshot
#[derive(Debug, Clone, PartialEq)]
pub struct ScreenshotJob {
    /// Fully qualified page URL
    pub url: String,
    pub viewport: Viewport,
    pub quality: u32,
    /// Capture the whole scrollable page instead of the viewport
    pub full_page: bool,
}

impl ScreenshotJob {
    /// Build a job for `url`, which is always fetched over plain HTTP
    pub fn new(url: &str, options: &CaptureOptions) -> Self {
        Self {
            url: format!("http://{}", url),
            viewport: options.viewport(),
            quality: options.quality,
            full_page: options.is_full_page(),
        }
    }
}

/// Produces raw JPEG screenshots. Implementations block the calling thread.
pub trait PageRenderer: Send + Sync {
    fn screenshot(&self, job: &ScreenshotJob) -> Result<Vec<u8>>;
}

/// Browser launch settings
#[derive(Debug, Clone)]
pub struct ChromeConfig {
    /// Chrome binary, auto-detected when `None`
    pub chrome_path: Option<PathBuf>,
    /// Navigation and network-idle wait timeout
    pub navigation_timeout: Duration,
    /// Run Chrome with its sandbox enabled
    pub sandbox: bool,
}

impl Default for ChromeConfig {
    fn default() -> Self {
        Self {
            chrome_path: None,
            navigation_timeout: Duration::from_secs(30),
            sandbox: false,
        }
    }
}

/// [`PageRenderer`] backed by a fresh headless Chrome per screenshot
pub struct ChromeRenderer {
    config: ChromeConfig,
}

impl ChromeRenderer {
    pub fn new(config: ChromeConfig) -> Self {
        Self { config }
    }

    fn launch(&self, viewport: Viewport) -> Result<Browser> {
        let options = LaunchOptions::default_builder()
            .headless(true)
            .sandbox(self.config.sandbox)
            .window_size(Some((viewport.width, viewport.height)))
            .path(self.config.chrome_path.clone())
            // Keep the DevTools connection alive for at least one full navigation
            .idle_browser_timeout(self.config.navigation_timeout * 2)
            .build()
            .map_err(|e| CaptureError::Launch(format!("Invalid launch options: {}", e)))?;

        Browser::new(options).map_err(|e| CaptureError::Launch(format!("{:#}", e)))
    }

    fn capture(&self, browser: &Browser, job: &ScreenshotJob) -> Result<Vec<u8>> {
        let tab = browser
            .new_tab()
            .map_err(|e| CaptureError::Launch(format!("Failed to open tab: {:#}", e)))?;
        tab.set_default_timeout(self.config.navigation_timeout);

        // The window size passed at launch includes browser chrome; pin the
        // layout viewport to exactly the requested size.
        tab.call_method(device_metrics(job.viewport))
            .map_err(|e| CaptureError::Launch(format!("Failed to set viewport: {:#}", e)))?;

        // wait_until_navigated resolves on Chrome's networkAlmostIdle lifecycle
        // event: at most two open connections for 500ms.
        tab.navigate_to(&job.url)
            .and_then(|tab| tab.wait_until_navigated())
            .map_err(|e| CaptureError::Navigation(format!("{}: {:#}", job.url, e)))?;
        debug!(url = %job.url, "Page settled");

        let clip = if job.full_page {
            Some(full_page_clip(&tab, job.viewport)?)
        } else {
            None
        };

        let data = tab
            .call_method(screenshot_params(job, clip))
            .map_err(|e| CaptureError::Screenshot(format!("{:#}", e)))?
            .data;

        base64::engine::general_purpose::STANDARD
            .decode(data)
            .map_err(|e| CaptureError::Screenshot(format!("Invalid screenshot payload: {}", e)))
    }
}

impl PageRenderer for ChromeRenderer {
    fn screenshot(&self, job: &ScreenshotJob) -> Result<Vec<u8>> {
        let browser = self.launch(job.viewport)?;
        debug!(
            url = %job.url,
            width = job.viewport.width,
            height = job.viewport.height,
            "Browser launched"
        );

        let result = self.capture(&browser, job);

        drop(browser);
        debug!(url = %job.url, ok = result.is_ok(), "Browser closed");

        result
    }
}

/// Device metrics pinning the layout viewport to `viewport`
fn device_metrics(viewport: Viewport) -> Emulation::SetDeviceMetricsOverride {
    Emulation::SetDeviceMetricsOverride {
        width: viewport.width,
        height: viewport.height,
        device_scale_factor: 1.0,
        mobile: false,
        scale: None,
        screen_width: None,
        screen_height: None,
        position_x: None,
        position_y: None,
        dont_set_visible_size: None,
        screen_orientation: None,
        viewport: None,
        display_feature: None,
        device_posture: None,
    }
}

/// JPEG screenshot command. Full-page jobs render content below the fold
/// instead of clipping to what the viewport has painted.
fn screenshot_params(
    job: &ScreenshotJob,
    clip: Option<Page::Viewport>,
) -> Page::CaptureScreenshot {
    Page::CaptureScreenshot {
        format: Some(Page::CaptureScreenshotFormatOption::Jpeg),
        quality: Some(job.quality),
        clip,
        from_surface: Some(true),
        capture_beyond_viewport: Some(job.full_page),
        optimize_for_speed: None,
    }
}

/// Clip rectangle covering the whole scrollable document
fn full_page_clip(tab: &Tab, viewport: Viewport) -> Result<Page::Viewport> {
    let remote = tab
        .evaluate(SCROLL_HEIGHT_SCRIPT, false)
        .map_err(|e| CaptureError::Screenshot(format!("Failed to measure page: {:#}", e)))?;

    let scroll_height = remote
        .value
        .as_ref()
        .and_then(|v| v.as_f64())
        .ok_or_else(|| CaptureError::Screenshot("Page height is not a number".to_string()))?;

    Ok(page_clip(viewport, scroll_height))
}

fn page_clip(viewport: Viewport, scroll_height: f64) -> Page::Viewport {
    Page::Viewport {
        x: 0.0,
        y: 0.0,
        width: f64::from(viewport.width),
        height: scroll_height.max(f64::from(viewport.height)),
        scale: 1.0,
    }
}
