//! Webshot Server - renders web pages to cached JPEG snapshots
//!
//! Each request launches a headless Chrome, screenshots the page, scales the
//! result and stores it in a flat cache directory for later requests.

use page_capture::{Capturer, ChromeConfig, ChromeRenderer};
use snapshot_cache::SnapshotCache;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{prelude::*, EnvFilter};
use webshot_server::{start_server, Config, Result, ServerState, SharedState};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let env_filter =
        EnvFilter::from_default_env().add_directive("webshot_server=info".parse()?);

    // Use JSON format for GCP Cloud Logging when LOG_FORMAT=json
    if std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false)
    {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_stackdriver::layer())
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    };

    info!("Starting Webshot Server...");

    // Load configuration from environment
    let config = Config::from_env()?;
    info!("Port: {}", config.port);
    info!("Cache dir: {:?}", config.cache_dir);
    info!("Navigation timeout: {:?}", config.navigation_timeout);
    match config.max_concurrent_renders {
        Some(max) => info!("Max concurrent renders: {}", max),
        None => info!("Max concurrent renders: unbounded"),
    }

    // Provision the cache directory before accepting requests
    let cache = SnapshotCache::new(config.cache_dir.clone());
    cache.init().await?;

    let renderer = ChromeRenderer::new(ChromeConfig {
        chrome_path: config.chrome_path.clone(),
        navigation_timeout: config.navigation_timeout,
        ..ChromeConfig::default()
    });
    let mut capturer = Capturer::new(Arc::new(renderer));
    if let Some(max) = config.max_concurrent_renders {
        capturer = capturer.with_render_limit(max);
    }

    // Create shared state
    let state: SharedState = Arc::new(ServerState::new(cache, capturer));

    // Start HTTP server (blocking)
    start_server(state, config.port).await?;

    Ok(())
}
