// Infrastructure implementations for TraceSift: filesystem adapters behind
// the TraceSource/RuleStore ports, plus parsing, caching and concurrency.

pub mod concurrency;
pub mod config_loader;
pub mod distill_cache;
pub mod log_parser;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use dashmap::DashMap;
use memmap2::Mmap;

use crate::domain::steps::RuleDefinition;
use crate::ports::{RuleStore, TraceSource};

/// Reads `<data_dir>/<proof_id>.k.log` and splits it into non-empty lines.
/// Proof logs can run to hundreds of megabytes, so the file is memory-mapped
/// with a plain read as fallback.
pub struct FsTraceSource {
    data_dir: PathBuf,
}

impl FsTraceSource {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            data_dir: data_dir.to_path_buf(),
        }
    }

    pub fn trace_path(&self, proof_id: &str) -> PathBuf {
        self.data_dir.join(format!("{}.k.log", proof_id))
    }
}

impl TraceSource for FsTraceSource {
    fn load_trace(&self, proof_id: &str) -> Result<Vec<String>> {
        let path = self.trace_path(proof_id);
        let file = fs::File::open(&path)
            .with_context(|| format!("Failed to open trace log {}", path.display()))?;

        // SAFETY: the mapping is read-only and dropped before returning;
        // a concurrent writer would at worst corrupt this one read.
        let text = match unsafe { Mmap::map(&file) } {
            Ok(mmap) => String::from_utf8_lossy(&mmap).into_owned(),
            Err(_) => fs::read_to_string(&path)
                .with_context(|| format!("Failed to read trace log {}", path.display()))?,
        };

        Ok(text
            .lines()
            .filter(|l| !l.trim().is_empty())
            .map(|l| l.to_string())
            .collect())
    }
}

/// Loads rule-definition blobs from `<data_dir>/<proof_id>.k_blobs/<rule>.json`,
/// caching parsed definitions for the parallel step-classification pass.
pub struct FsRuleStore {
    data_dir: PathBuf,
    cache: DashMap<(String, String), RuleDefinition>,
}

impl FsRuleStore {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            data_dir: data_dir.to_path_buf(),
            cache: DashMap::new(),
        }
    }

    pub fn blob_path(&self, proof_id: &str, rule_id: &str) -> PathBuf {
        self.data_dir
            .join(format!("{}.k_blobs", proof_id))
            .join(format!("{}.json", rule_id))
    }
}

impl RuleStore for FsRuleStore {
    fn load_rule(&self, proof_id: &str, rule_id: &str) -> Result<RuleDefinition> {
        let key = (proof_id.to_string(), rule_id.to_string());
        if let Some(hit) = self.cache.get(&key) {
            return Ok(hit.clone());
        }

        let path = self.blob_path(proof_id, rule_id);
        let raw = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read rule blob {}", path.display()))?;
        let definition: RuleDefinition = serde_json::from_str(&raw)
            .with_context(|| format!("Bad JSON in rule blob {}", path.display()))?;

        self.cache.insert(key, definition.clone());
        Ok(definition)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_trace_source_reads_non_empty_lines() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("p1.k.log"),
            "1 EXECINIT n0\n\n2 RULE n0 n1 r1\n",
        )
        .unwrap();

        let source = FsTraceSource::new(dir.path());
        let lines = source.load_trace("p1").unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "1 EXECINIT n0");
    }

    #[test]
    fn test_trace_source_missing_log_is_an_error() {
        let dir = tempdir().unwrap();
        let source = FsTraceSource::new(dir.path());
        assert!(source.load_trace("nope").is_err());
    }

    #[test]
    fn test_rule_store_parses_blob_json() {
        let dir = tempdir().unwrap();
        let blobs = dir.path().join("p1.k_blobs");
        fs::create_dir(&blobs).unwrap();
        fs::write(
            blobs.join("r1.json"),
            r#"{"term": {"att": "label(SPEC.step)"}, "name": "r1"}"#,
        )
        .unwrap();

        let store = FsRuleStore::new(dir.path());
        let definition = store.load_rule("p1", "r1").unwrap();
        assert_eq!(definition.term.att, "label(SPEC.step)");

        // Second load hits the cache even if the file disappears.
        fs::remove_file(blobs.join("r1.json")).unwrap();
        assert!(store.load_rule("p1", "r1").is_ok());
    }

    #[test]
    fn test_rule_store_bad_json_is_an_error() {
        let dir = tempdir().unwrap();
        let blobs = dir.path().join("p1.k_blobs");
        fs::create_dir(&blobs).unwrap();
        fs::write(blobs.join("r1.json"), "not json").unwrap();

        let store = FsRuleStore::new(dir.path());
        assert!(store.load_rule("p1", "r1").is_err());
    }
}
