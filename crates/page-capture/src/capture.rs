//! Render → resize pipeline

use crate::error::{CaptureError, Result};
use crate::options::CaptureOptions;
use crate::renderer::{PageRenderer, ScreenshotJob};
use crate::resize::{resize_jpeg, TargetSize};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tracing::{debug, info};

/// Runs captures against a [`PageRenderer`] off the async executor
pub struct Capturer {
    renderer: Arc<dyn PageRenderer>,
    /// Optional cap on concurrently running renders
    limit: Option<Arc<Semaphore>>,
}

impl Capturer {
    /// Create a capturer with no limit on concurrent renders
    pub fn new(renderer: Arc<dyn PageRenderer>) -> Self {
        Self {
            renderer,
            limit: None,
        }
    }

    /// Allow at most `max` renders at a time; further captures wait for a slot
    pub fn with_render_limit(mut self, max: usize) -> Self {
        self.limit = Some(Arc::new(Semaphore::new(max)));
        self
    }

    /// Render `url` and scale the screenshot. Returns JPEG bytes.
    pub async fn capture(&self, url: &str, options: &CaptureOptions) -> Result<Vec<u8>> {
        let job = ScreenshotJob::new(url, options);
        let target = TargetSize::scaled(job.viewport, options.scale, job.full_page);

        let started = Instant::now();
        let screenshot = self.render(job.clone()).await?;
        debug!(
            url = %job.url,
            size = screenshot.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Screenshot taken"
        );

        // A bad scale is a resize failure, reported after the render.
        let target = target?;
        let quality = options.quality;
        let resized =
            tokio::task::spawn_blocking(move || resize_jpeg(&screenshot, target, quality))
                .await??;

        info!(
            url = %job.url,
            width = target.width,
            height = ?target.height,
            size = resized.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Captured page"
        );

        Ok(resized)
    }

    async fn render(&self, job: ScreenshotJob) -> Result<Vec<u8>> {
        let permit = match &self.limit {
            Some(limit) => Some(
                Arc::clone(limit)
                    .acquire_owned()
                    .await
                    .map_err(|e| CaptureError::Launch(format!("Render limiter closed: {}", e)))?,
            ),
            None => None,
        };

        let renderer = Arc::clone(&self.renderer);
        // The permit lives in the blocking task: a cancelled caller must not
        // free the slot while its browser is still running.
        tokio::task::spawn_blocking(move || {
            let _permit = permit;
            renderer.screenshot(&job)
        })
        .await?
    }
}
