//! Stub-generation configuration.
//!
//! An optional `moonbind.toml` supplies defaults; command-line flags win.
//!
//! ```toml
//! source = "src"
//! out = "stubs"
//! ```

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

const DEFAULT_CONFIG_FILE: &str = "moonbind.toml";

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StubgenConfig {
    /// Source directory to scan.
    #[serde(default)]
    pub source: Option<PathBuf>,
    /// Output directory for generated stubs.
    #[serde(default)]
    pub out: Option<PathBuf>,
}

impl StubgenConfig {
    /// Load configuration. An explicitly given path must exist; the default
    /// path is optional.
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        let (path, explicit) = match path {
            Some(path) => (path, true),
            None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        };

        if !path.exists() {
            if explicit {
                bail!("config file not found: {}", path.display());
            }
            return Ok(Self::default());
        }

        Self::parse_file(&path)
    }

    fn parse_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("failed to parse {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("moonbind.toml");
        std::fs::write(&path, "source = \"lua-api\"\nout = \"stubs\"\n").unwrap();

        let config = StubgenConfig::load(Some(path)).unwrap();
        assert_eq!(config.source, Some(PathBuf::from("lua-api")));
        assert_eq!(config.out, Some(PathBuf::from("stubs")));
    }

    #[test]
    fn test_missing_explicit_config_is_an_error() {
        let err = StubgenConfig::load(Some(PathBuf::from("/nonexistent/moonbind.toml")));
        assert!(err.is_err());
    }

    #[test]
    fn test_unknown_key_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("moonbind.toml");
        std::fs::write(&path, "bogus = true\n").unwrap();
        assert!(StubgenConfig::load(Some(path)).is_err());
    }
}
