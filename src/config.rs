// Runtime configuration: JSON file, then environment, then CLI flags

use crate::RenderOptions;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment variable that overrides the saved-plot directory
pub const STORE_DIR_ENV: &str = "SRPLOT_STORE_DIR";

pub const DEFAULT_STORE_DIR: &str = "srplot-store";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub render: RenderOptions,
    pub store_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            render: RenderOptions::default(),
            store_dir: PathBuf::from(DEFAULT_STORE_DIR),
        }
    }
}

impl Config {
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).context("Invalid configuration JSON")
    }

    /// Read `path` if given, then apply `SRPLOT_STORE_DIR`
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read config {}", path.display()))?;
                Self::from_json(&text)?
            }
            None => Self::default(),
        };
        Ok(config.with_store_override(std::env::var(STORE_DIR_ENV).ok()))
    }

    /// Replace the store directory when an override is present and non-empty
    pub fn with_store_override(mut self, store_dir: Option<String>) -> Self {
        if let Some(dir) = store_dir.filter(|d| !d.trim().is_empty()) {
            self.store_dir = PathBuf::from(dir);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::OutputFormat;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.store_dir, PathBuf::from("srplot-store"));
        assert_eq!(config.render.width, 1200);
        assert_eq!(config.render.scale, 2);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = Config::from_json(r#"{"render": {"width": 640, "type": "svg"}}"#).unwrap();
        assert_eq!(config.render.width, 640);
        assert_eq!(config.render.height, 800);
        assert_eq!(config.render.format, OutputFormat::Svg);
        assert_eq!(config.store_dir, PathBuf::from(DEFAULT_STORE_DIR));
    }

    #[test]
    fn test_store_override() {
        let config = Config::default().with_store_override(Some("/tmp/plots".to_string()));
        assert_eq!(config.store_dir, PathBuf::from("/tmp/plots"));
        let config = Config::default().with_store_override(Some("  ".to_string()));
        assert_eq!(config.store_dir, PathBuf::from(DEFAULT_STORE_DIR));
    }

    #[test]
    fn test_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("srplot.json");
        std::fs::write(&path, r#"{"store_dir": "saved"}"#).unwrap();
        let config = Config::load(Some(&path)).unwrap();
        // env may override in CI; the file value applies otherwise
        if std::env::var(STORE_DIR_ENV).is_err() {
            assert_eq!(config.store_dir, PathBuf::from("saved"));
        }
        assert!(Config::load(Some(&dir.path().join("missing.json"))).is_err());
        assert!(Config::from_json("{").is_err());
    }
}
