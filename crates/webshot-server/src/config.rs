use crate::error::{Result, WebshotError};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Name of the cache directory created next to the executable
pub const CACHE_DIR_NAME: &str = "cached_images";

/// Service configuration parsed from environment variables
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub port: u16,
    pub cache_dir: PathBuf,
    pub chrome_path: Option<PathBuf>,
    pub navigation_timeout: Duration,
    /// Cap on concurrent browser sessions, unbounded when `None`
    pub max_concurrent_renders: Option<usize>,
}

impl Config {
    /// Parse configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Parse configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = lookup("PORT")
            .and_then(|p| p.parse().ok())
            .unwrap_or(5000);

        let cache_dir = match lookup("CACHE_DIR") {
            Some(dir) => PathBuf::from(dir),
            None => default_cache_dir()?,
        };

        let chrome_path = lookup("CHROME_PATH").map(PathBuf::from);

        let navigation_timeout = lookup("NAVIGATION_TIMEOUT_SECS")
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(30));

        let max_concurrent_renders = lookup("MAX_CONCURRENT_RENDERS")
            .and_then(|s| s.parse::<usize>().ok())
            .filter(|&n| n > 0);

        Ok(Self {
            port,
            cache_dir,
            chrome_path,
            navigation_timeout,
            max_concurrent_renders,
        })
    }
}

/// `cached_images` next to the running executable
fn default_cache_dir() -> Result<PathBuf> {
    let exe = env::current_exe()
        .map_err(|e| WebshotError::Config(format!("Cannot locate executable: {}", e)))?;

    exe.parent()
        .map(|dir| dir.join(CACHE_DIR_NAME))
        .ok_or_else(|| WebshotError::Config(format!("Executable has no parent: {:?}", exe)))
}
