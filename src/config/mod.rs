//! Runtime configuration and platform paths.
//!
//! The config file is optional; every field has a default so a fresh
//! install works with nothing on disk but a credential in the environment.
//! Credential storage itself is external - this module only resolves the
//! environment variables the external mechanism populates.

use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{Error, Result};

pub const DEFAULT_MODEL: &str = "claude-haiku-4-5-20251001";
pub const DEFAULT_CACHE_TTL_SECS: u64 = 86_400;

/// Environment variables checked for the API credential, in order.
const CREDENTIAL_VARS: &[&str] = &["GREENLIGHT_API_KEY", "ANTHROPIC_API_KEY"];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub enabled: bool,
    pub profile: String,
    pub model: String,
    pub cache_ttl: u64,
    pub logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            enabled: true,
            profile: "balanced".to_string(),
            model: DEFAULT_MODEL.to_string(),
            cache_ttl: DEFAULT_CACHE_TTL_SECS,
            logging: false,
        }
    }
}

impl Config {
    /// Load from a config file, falling back to defaults when the file is
    /// missing or unreadable. A broken config must not take the hook down.
    pub fn load(path: &Path) -> Self {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(_) => return Self::default(),
        };
        serde_json::from_str(&text).unwrap_or_else(|err| {
            warn!(path = %path.display(), error = %err, "corrupt config, using defaults");
            Self::default()
        })
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let text = serde_json::to_string_pretty(self)?;
        fs::write(path, text)?;
        Ok(())
    }

    /// Resolve the API credential from the environment, if present.
    pub fn credential() -> Option<SecretString> {
        for var in CREDENTIAL_VARS {
            if let Ok(value) = std::env::var(var)
                && !value.is_empty()
            {
                return Some(SecretString::from(value));
            }
        }
        None
    }

    pub fn require_credential() -> Result<SecretString> {
        Self::credential().ok_or(Error::MissingCredential)
    }
}

/// Filesystem layout: config, custom profiles, decision cache, and the
/// optional side log all live under one per-user directory.
#[derive(Debug, Clone)]
pub struct Paths {
    root: PathBuf,
}

impl Paths {
    /// Resolve the per-user directory. `None` only on systems with no
    /// resolvable home directory.
    pub fn discover() -> Option<Self> {
        ProjectDirs::from("", "", "greenlight").map(|dirs| Self {
            root: dirs.config_dir().to_path_buf(),
        })
    }

    /// Pin the layout to an explicit root. Used by tests.
    pub fn from_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn config_file(&self) -> PathBuf {
        self.root.join("config.json")
    }

    pub fn profiles_dir(&self) -> PathBuf {
        self.root.join("profiles")
    }

    pub fn cache_dir(&self) -> PathBuf {
        self.root.join("cache")
    }

    pub fn log_file(&self) -> PathBuf {
        self.root.join("greenlight.log")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert!(config.enabled);
        assert_eq!(config.profile, "balanced");
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.cache_ttl, DEFAULT_CACHE_TTL_SECS);
        assert!(!config.logging);
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load(&dir.path().join("nope.json"));
        assert_eq!(config.profile, "balanced");
    }

    #[test]
    fn test_corrupt_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "}{").unwrap();
        let config = Config::load(&path);
        assert!(config.enabled);
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"profile": "strict", "logging": true}"#).unwrap();

        let config = Config::load(&path);
        assert_eq!(config.profile, "strict");
        assert!(config.logging);
        assert_eq!(config.model, DEFAULT_MODEL);
    }

    #[test]
    fn test_save_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let mut config = Config::default();
        config.enabled = false;
        config.cache_ttl = 60;
        config.save(&path).unwrap();

        let loaded = Config::load(&path);
        assert!(!loaded.enabled);
        assert_eq!(loaded.cache_ttl, 60);
    }

    #[test]
    fn test_paths_layout() {
        let paths = Paths::from_root("/tmp/gl");
        assert_eq!(paths.config_file(), PathBuf::from("/tmp/gl/config.json"));
        assert_eq!(paths.profiles_dir(), PathBuf::from("/tmp/gl/profiles"));
        assert_eq!(paths.cache_dir(), PathBuf::from("/tmp/gl/cache"));
        assert_eq!(paths.log_file(), PathBuf::from("/tmp/gl/greenlight.log"));
    }
}
