//! File-based snapshot storage

use crate::error::Result;
use crate::key::CacheKey;
use crate::types::CacheStats;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::fs;
use tracing::{debug, info, warn};

/// Suffix of in-progress writes. Never matches a key's file name.
const TEMP_SUFFIX: &str = "tmp";

/// Per-process counter making concurrent temp file names unique
static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// A snapshot cache backed by a single flat directory
///
/// Every key has two observable states, absent and present. A key becomes
/// present on its first successful `put` and stays present for the lifetime
/// of the directory.
pub struct SnapshotCache {
    /// Directory where snapshots are stored
    cache_dir: PathBuf,
    /// Cache hit counter
    hits: AtomicU64,
    /// Cache miss counter
    misses: AtomicU64,
}

impl SnapshotCache {
    /// Create a new snapshot cache rooted at `cache_dir`
    pub fn new(cache_dir: PathBuf) -> Self {
        Self {
            cache_dir,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Ensure the cache directory exists. Called once before serving traffic.
    pub async fn init(&self) -> Result<()> {
        fs::create_dir_all(&self.cache_dir).await?;
        info!(cache_dir = ?self.cache_dir, "Cache initialized");
        Ok(())
    }

    /// Path of the file a key is stored under
    pub fn path_for(&self, key: &CacheKey) -> PathBuf {
        self.cache_dir.join(key.file_name())
    }

    /// Whether a snapshot for `key` is present on disk
    pub async fn contains(&self, key: &CacheKey) -> Result<bool> {
        Ok(fs::try_exists(self.path_for(key)).await?)
    }

    /// Read a cached snapshot, `None` when the key is absent
    pub async fn get(&self, key: &CacheKey) -> Result<Option<Vec<u8>>> {
        if !self.contains(key).await? {
            self.misses.fetch_add(1, Ordering::Relaxed);
            debug!(key = %key, "Cache miss");
            return Ok(None);
        }

        let data = fs::read(self.path_for(key)).await?;
        self.hits.fetch_add(1, Ordering::Relaxed);
        debug!(key = %key, size = data.len(), "Cache hit");
        Ok(Some(data))
    }

    /// Store a snapshot, replacing any file already written for `key`.
    ///
    /// Bytes go to a temp file in the cache directory which is then renamed
    /// onto the key's path, so readers see either no file or the whole file.
    pub async fn put(&self, key: &CacheKey, data: &[u8]) -> Result<PathBuf> {
        let path = self.path_for(key);
        let temp_path = self.temp_path_for(key);

        if let Err(e) = fs::write(&temp_path, data).await {
            self.discard_temp(&temp_path).await;
            return Err(e.into());
        }
        if let Err(e) = fs::rename(&temp_path, &path).await {
            self.discard_temp(&temp_path).await;
            return Err(e.into());
        }

        debug!(key = %key, size = data.len(), "Cached snapshot");
        Ok(path)
    }

    /// `<key>.jpg.<pid>-<n>.tmp` next to the final file
    fn temp_path_for(&self, key: &CacheKey) -> PathBuf {
        let n = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
        self.cache_dir.join(format!(
            "{}.{}-{}.{}",
            key.file_name(),
            std::process::id(),
            n,
            TEMP_SUFFIX
        ))
    }

    async fn discard_temp(&self, temp_path: &Path) {
        if let Err(e) = fs::remove_file(temp_path).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(path = ?temp_path, error = %e, "Failed to remove temp file");
            }
        }
    }

    /// Get current cache statistics
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn key() -> CacheKey {
        CacheKey::new(800, 600, 80, 1.0, "desktop", "example.com")
    }

    #[tokio::test]
    async fn test_init_creates_missing_directory() {
        let dir = tempdir().unwrap();
        let cache_dir = dir.path().join("nested").join("cached_images");
        let cache = SnapshotCache::new(cache_dir.clone());

        cache.init().await.unwrap();
        assert!(cache_dir.is_dir());

        // Second init on an existing directory is fine
        cache.init().await.unwrap();
    }

    #[tokio::test]
    async fn test_cache_miss() {
        let dir = tempdir().unwrap();
        let cache = SnapshotCache::new(dir.path().to_path_buf());
        cache.init().await.unwrap();

        assert!(!cache.contains(&key()).await.unwrap());
        assert!(cache.get(&key()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_cache_put_and_get() {
        let dir = tempdir().unwrap();
        let cache = SnapshotCache::new(dir.path().to_path_buf());
        cache.init().await.unwrap();

        let path = cache.put(&key(), b"jpeg bytes").await.unwrap();
        assert_eq!(
            path,
            dir.path().join("800*600_80_1_desktop_example.com.jpg")
        );

        assert!(cache.contains(&key()).await.unwrap());
        assert_eq!(cache.get(&key()).await.unwrap().unwrap(), b"jpeg bytes");
    }

    #[tokio::test]
    async fn test_put_overwrites_existing_entry() {
        let dir = tempdir().unwrap();
        let cache = SnapshotCache::new(dir.path().to_path_buf());
        cache.init().await.unwrap();

        cache.put(&key(), b"first").await.unwrap();
        cache.put(&key(), b"second").await.unwrap();

        assert_eq!(cache.get(&key()).await.unwrap().unwrap(), b"second");
    }

    #[tokio::test]
    async fn test_cache_hit_miss_counters() {
        let dir = tempdir().unwrap();
        let cache = SnapshotCache::new(dir.path().to_path_buf());
        cache.init().await.unwrap();

        cache.get(&key()).await.unwrap();
        assert_eq!(cache.stats(), CacheStats { hits: 0, misses: 1 });

        cache.put(&key(), b"data").await.unwrap();
        cache.get(&key()).await.unwrap();
        assert_eq!(cache.stats(), CacheStats { hits: 1, misses: 1 });
    }

    #[tokio::test]
    async fn test_put_into_missing_directory_fails() {
        let dir = tempdir().unwrap();
        let cache = SnapshotCache::new(dir.path().join("never-created"));

        assert!(cache.put(&key(), b"data").await.is_err());
        assert!(!dir.path().join("never-created").exists());
    }

    #[tokio::test]
    async fn test_put_leaves_only_the_final_file() {
        let dir = tempdir().unwrap();
        let cache = SnapshotCache::new(dir.path().to_path_buf());
        cache.init().await.unwrap();

        cache.put(&key(), b"first").await.unwrap();
        cache.put(&key(), b"second").await.unwrap();

        let names: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["800*600_80_1_desktop_example.com.jpg"]);
    }

    #[tokio::test]
    async fn test_failed_rename_cleans_up_temp_file() {
        let dir = tempdir().unwrap();
        let cache = SnapshotCache::new(dir.path().to_path_buf());
        cache.init().await.unwrap();

        // A directory squatting on the final path makes the rename fail
        std::fs::create_dir(cache.path_for(&key())).unwrap();
        std::fs::write(cache.path_for(&key()).join("occupied"), b"x").unwrap();

        assert!(cache.put(&key(), b"data").await.is_err());

        let leftovers: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .filter(|name| name.ends_with(TEMP_SUFFIX))
            .collect();
        assert!(leftovers.is_empty(), "{:?}", leftovers);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_get_never_sees_partial_snapshot() {
        let dir = tempdir().unwrap();
        let cache = std::sync::Arc::new(SnapshotCache::new(dir.path().to_path_buf()));
        cache.init().await.unwrap();

        let data = vec![0xAB_u8; 64 * 1024 * 1024];
        let expected_len = data.len();
        let done = std::sync::Arc::new(std::sync::atomic::AtomicBool::new(false));

        let reader = {
            let cache = std::sync::Arc::clone(&cache);
            let done = std::sync::Arc::clone(&done);
            tokio::spawn(async move {
                let mut short_reads = Vec::new();
                loop {
                    let finished = done.load(Ordering::SeqCst);
                    if let Some(found) = cache.get(&key()).await.unwrap() {
                        if found.len() != expected_len {
                            short_reads.push(found.len());
                        }
                    }
                    if finished {
                        break;
                    }
                    tokio::task::yield_now().await;
                }
                short_reads
            })
        };

        cache.put(&key(), &data).await.unwrap();
        done.store(true, Ordering::SeqCst);

        let short_reads = reader.await.unwrap();
        assert!(short_reads.is_empty(), "partial hits: {:?}", short_reads);
        assert_eq!(cache.get(&key()).await.unwrap().unwrap().len(), expected_len);
    }
}
