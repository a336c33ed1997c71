//! Persistent cache of synthesized targets keyed by [`CacheKey`] hash.
//!
//! [`CacheKey`]: crate::hash::CacheKey

use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::target::TargetSet;

/// File name of the targets cache inside the cache directory.
pub const CACHE_FILE_NAME: &str = "cypress.hash";

/// What the cache stores per hash.
pub type CacheEntry = TargetSet;

#[derive(Debug, Default)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Entries computed or reused during one run, flushed once at the end.
#[derive(Debug, Default)]
pub struct TargetsAccumulator {
    entries: IndexMap<String, CacheEntry>,
}

impl TargetsAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, hash: impl Into<String>, entry: CacheEntry) {
        self.entries.insert(hash.into(), entry);
    }

    pub fn get(&self, hash: &str) -> Option<&CacheEntry> {
        self.entries.get(hash)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &IndexMap<String, CacheEntry> {
        &self.entries
    }
}

/// Targets cache read at the start of a run.
///
/// Reads fail open: a missing or malformed file is an empty cache.
pub struct TargetsCache {
    path: PathBuf,
    entries: IndexMap<String, CacheEntry>,
    stats: CacheStats,
}

impl TargetsCache {
    /// An empty cache that flushes into `cache_dir`.
    pub fn new(cache_dir: impl AsRef<Path>) -> Self {
        Self {
            path: cache_dir.as_ref().join(CACHE_FILE_NAME),
            entries: IndexMap::new(),
            stats: CacheStats::default(),
        }
    }

    /// Loads the cache file in `cache_dir`.
    pub fn load(cache_dir: impl AsRef<Path>) -> Self {
        let mut cache = Self::new(cache_dir);

        let content = match fs::read_to_string(&cache.path) {
            Ok(content) => content,
            Err(_) => {
                debug!(path = %cache.path.display(), "no targets cache on disk");
                return cache;
            }
        };

        match serde_json::from_str::<IndexMap<String, CacheEntry>>(&content) {
            Ok(entries) => {
                debug!(path = %cache.path.display(), entries = entries.len(), "loaded targets cache");
                cache.entries = entries;
            }
            Err(err) => {
                warn!(path = %cache.path.display(), error = %err, "ignoring malformed targets cache");
            }
        }

        cache
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Looks up `hash`, counting the hit or miss.
    pub fn get(&mut self, hash: &str) -> Option<&CacheEntry> {
        match self.entries.get(hash) {
            Some(entry) => {
                self.stats.hits += 1;
                Some(entry)
            }
            None => {
                self.stats.misses += 1;
                None
            }
        }
    }

    /// Overwrites the cache file with the accumulated entries.
    ///
    /// Entries not touched during the run are dropped.
    pub fn flush(&self, accumulator: &TargetsAccumulator) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_vec_pretty(accumulator.entries())?;
        fs::write(&self.path, content)?;

        info!(
            path = %self.path.display(),
            entries = accumulator.len(),
            "flushed targets cache"
        );
        Ok(())
    }

    /// Removes the cache file.
    pub fn clear(&self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}
