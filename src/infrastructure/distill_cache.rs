/// Distillation Result Cache
///
/// Report renderers re-read the same proof repeatedly; distilling a large
/// log each time is wasted work. Results are cached per proof id and
/// validated against the log's modification time and the prune flag.
///
/// Storage layout (one sled db per data directory):
/// - tree `results` - proof id -> bincode `DistillationResult`
/// - tree `meta`    - proof id -> bincode `CacheMetadata`

use std::fs;
use std::path::Path;
use std::time::SystemTime;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::domain::distill::DistillationResult;

/// Validation record stored alongside each cached result.
#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct CacheMetadata {
    /// Version of the cache format (for future compatibility)
    pub version: u32,
    /// Modification time of the source log, unix seconds.
    pub log_mtime: u64,
    /// Whether the cached result was produced with pruning on.
    pub prune: bool,
}

impl CacheMetadata {
    pub const CURRENT_VERSION: u32 = 1;
}

pub struct DistillCache {
    _db: sled::Db,
    results: sled::Tree,
    meta: sled::Tree,
}

impl DistillCache {
    /// Open (or create) the cache db under the given data directory.
    pub fn open(data_dir: &Path) -> Result<Self> {
        let db = sled::open(data_dir.join(".tracesift_cache"))
            .context("Failed to open distillation cache")?;
        let results = db.open_tree("results")?;
        let meta = db.open_tree("meta")?;
        Ok(Self {
            _db: db,
            results,
            meta,
        })
    }

    /// Fetch a cached result if it is still valid for the given log mtime
    /// and prune flag. Any decode failure is treated as a miss.
    pub fn get(&self, proof_id: &str, log_mtime: u64, prune: bool) -> Option<DistillationResult> {
        let meta_bytes = self.meta.get(proof_id.as_bytes()).ok().flatten()?;
        let meta: CacheMetadata = bincode::deserialize(&meta_bytes).ok()?;

        if meta.version != CacheMetadata::CURRENT_VERSION
            || meta.log_mtime != log_mtime
            || meta.prune != prune
        {
            return None;
        }

        let result_bytes = self.results.get(proof_id.as_bytes()).ok().flatten()?;
        bincode::deserialize(&result_bytes).ok()
    }

    /// Store a result with its validation metadata.
    pub fn put(
        &self,
        proof_id: &str,
        log_mtime: u64,
        prune: bool,
        result: &DistillationResult,
    ) -> Result<()> {
        let meta = CacheMetadata {
            version: CacheMetadata::CURRENT_VERSION,
            log_mtime,
            prune,
        };
        self.results.insert(
            proof_id.as_bytes(),
            bincode::serialize(result).context("Failed to encode cached result")?,
        )?;
        self.meta.insert(
            proof_id.as_bytes(),
            bincode::serialize(&meta).context("Failed to encode cache metadata")?,
        )?;
        Ok(())
    }

    /// Drop the cached entry for one proof.
    pub fn invalidate(&self, proof_id: &str) -> Result<()> {
        self.results.remove(proof_id.as_bytes())?;
        self.meta.remove(proof_id.as_bytes())?;
        Ok(())
    }
}

/// Modification time of a file as unix seconds, for cache validation.
pub fn file_mtime(path: &Path) -> Result<u64> {
    let metadata = fs::metadata(path)
        .with_context(|| format!("Failed to stat {}", path.display()))?;
    let mtime = metadata.modified()?;
    Ok(mtime.duration_since(SystemTime::UNIX_EPOCH)?.as_secs())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::distill::PrunedGraph;
    use std::collections::HashMap;
    use tempfile::tempdir;

    fn sample_result() -> DistillationResult {
        DistillationResult {
            init: "n0".to_string(),
            target: None,
            finished: vec!["n3".to_string()],
            pruned: PrunedGraph {
                edges: HashMap::new(),
                reduction_ratio: 100,
            },
            steps: vec!["r1".to_string()],
            rule_debug: HashMap::new(),
        }
    }

    #[test]
    fn test_miss_on_empty_cache() {
        let dir = tempdir().unwrap();
        let cache = DistillCache::open(dir.path()).unwrap();
        assert!(cache.get("p1", 100, true).is_none());
    }

    #[test]
    fn test_hit_after_put() {
        let dir = tempdir().unwrap();
        let cache = DistillCache::open(dir.path()).unwrap();
        cache.put("p1", 100, true, &sample_result()).unwrap();

        let hit = cache.get("p1", 100, true).unwrap();
        assert_eq!(hit, sample_result());
    }

    #[test]
    fn test_miss_when_log_mtime_changes() {
        let dir = tempdir().unwrap();
        let cache = DistillCache::open(dir.path()).unwrap();
        cache.put("p1", 100, true, &sample_result()).unwrap();
        assert!(cache.get("p1", 101, true).is_none());
    }

    #[test]
    fn test_miss_when_prune_flag_differs() {
        let dir = tempdir().unwrap();
        let cache = DistillCache::open(dir.path()).unwrap();
        cache.put("p1", 100, true, &sample_result()).unwrap();
        assert!(cache.get("p1", 100, false).is_none());
    }

    #[test]
    fn test_explicit_invalidation() {
        let dir = tempdir().unwrap();
        let cache = DistillCache::open(dir.path()).unwrap();
        cache.put("p1", 100, true, &sample_result()).unwrap();
        cache.invalidate("p1").unwrap();
        assert!(cache.get("p1", 100, true).is_none());
    }
}
