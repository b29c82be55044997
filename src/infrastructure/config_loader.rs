//! Configuration file loading.
//!
//! Distillation takes an explicit `Config` value; this module only resolves
//! one from an optional `tracesift.toml` so the CLI can merge it with flags.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Optional settings read from `tracesift.toml`.
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    /// Directory holding `<proof>.k.log` files and `<proof>.k_blobs/` dirs.
    pub data_dir: Option<String>,
    /// Frontier iteration bound.
    pub max_iterations: Option<usize>,
}

/// Load a config file. Missing file yields the default (empty) config;
/// a present but malformed file is an error.
pub fn load_file_config(path: &Path) -> Result<FileConfig> {
    if !path.exists() {
        return Ok(FileConfig::default());
    }
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    toml::from_str(&raw).with_context(|| format!("Invalid toml in {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_config_is_default() {
        let dir = tempdir().unwrap();
        let config = load_file_config(&dir.path().join("tracesift.toml")).unwrap();
        assert!(config.data_dir.is_none());
        assert!(config.max_iterations.is_none());
    }

    #[test]
    fn test_config_fields_are_read() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tracesift.toml");
        fs::write(&path, "data_dir = \"out/data\"\nmax_iterations = 500\n").unwrap();

        let config = load_file_config(&path).unwrap();
        assert_eq!(config.data_dir.as_deref(), Some("out/data"));
        assert_eq!(config.max_iterations, Some(500));
    }

    #[test]
    fn test_malformed_config_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tracesift.toml");
        fs::write(&path, "data_dir = [broken").unwrap();
        assert!(load_file_config(&path).is_err());
    }
}
