//! Policy profiles and the on-disk profile store.

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use super::Rule;
use super::builtin;

/// Expected outcome of a fixture scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Expectation {
    /// The profile should auto-approve this operation.
    Allow,
    /// The profile should fall through to the interactive prompt.
    Ask,
}

/// One named scenario a profile can be exercised against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fixture {
    pub name: String,
    pub tool: String,
    pub input: Value,
    pub expect: Expectation,
}

/// A named policy posture: ordered deny/allow rules, the judge prompt, and
/// fixture scenarios for the `test` collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub deny: Vec<Rule>,
    #[serde(default)]
    pub allow: Vec<Rule>,
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub fixtures: Vec<Fixture>,
}

/// Loads profiles by name, preferring custom profiles on disk over the
/// built-ins. A missing or corrupt custom file falls back to the built-in
/// of the same name (or the default profile for unknown names) so a bad
/// profile file can never take the hook down.
pub struct ProfileStore {
    dir: PathBuf,
}

impl ProfileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.json"))
    }

    pub fn load(&self, name: &str) -> Profile {
        match self.load_custom(name) {
            Ok(Some(profile)) => profile,
            Ok(None) => builtin::find_builtin(name).unwrap_or_else(builtin::default_profile),
            Err(err) => {
                warn!(profile = name, error = %err, "corrupt custom profile, using built-in");
                builtin::find_builtin(name).unwrap_or_else(builtin::default_profile)
            }
        }
    }

    /// Read a custom profile file. `Ok(None)` when no file exists.
    pub fn load_custom(&self, name: &str) -> crate::Result<Option<Profile>> {
        let path = self.path(name);
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        let mut profile: Profile = serde_json::from_str(&text)?;
        profile.name = name.to_string();
        Ok(Some(profile))
    }

    pub fn save(&self, profile: &Profile) -> crate::Result<()> {
        fs::create_dir_all(&self.dir)?;
        let text = serde_json::to_string_pretty(profile)?;
        fs::write(self.path(&profile.name), text)?;
        Ok(())
    }

    /// Names of all custom profiles on disk, in directory order.
    pub fn list(&self) -> crate::Result<Vec<String>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                continue;
            }
            let file_name = entry.file_name();
            if let Some(name) = file_name.to_str().and_then(|n| n.strip_suffix(".json")) {
                names.push(name.to_string());
            }
        }
        Ok(names)
    }
}
