//! Flat-directory snapshot cache
//!
//! Stores rendered JPEG snapshots on disk under a file name derived from the
//! capture parameters. Entries are only ever added: there is no expiry,
//! eviction or invalidation.

mod cache;
mod error;
mod key;
mod types;

pub use cache::SnapshotCache;
pub use error::{CacheError, Result};
pub use key::{CacheKey, SNAPSHOT_EXTENSION};
pub use types::CacheStats;
