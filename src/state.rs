//! Persisted per-repository settings (`state.toml`).
//!
//! Color overrides, ordering nudges and manual branch pins, keyed by the
//! repository path recorded in the snapshot. The engine reads these once per
//! pass; only the CLI writes them, between passes.
//!
//! Writes are atomic: the new contents go to a temporary file in the target
//! directory, which is fsynced and then renamed over the old file.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::error::StateError;

// ---------------------------------------------------------------------------
// BranchOrder
// ---------------------------------------------------------------------------

/// A manual layout nudge: `left` is laid out before `right`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BranchOrder {
    pub left: String,
    pub right: String,
}

// ---------------------------------------------------------------------------
// RepoSettings
// ---------------------------------------------------------------------------

/// Settings for one repository.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RepoSettings {
    /// `primary_base_name` → palette index.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub colors: BTreeMap<String, usize>,

    /// Ordering nudges, applied in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub orders: Vec<BranchOrder>,

    /// Commit id → branch name chosen by the user.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub pins: BTreeMap<String, String>,
}

impl RepoSettings {
    /// `true` when nothing has been customized.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty() && self.orders.is_empty() && self.pins.is_empty()
    }

    /// Record a nudge, replacing any earlier nudge over the same pair.
    pub fn set_order(&mut self, left: &str, right: &str) {
        self.orders.retain(|o| {
            !(o.left == left && o.right == right || o.left == right && o.right == left)
        });
        self.orders.push(BranchOrder {
            left: left.to_owned(),
            right: right.to_owned(),
        });
    }
}

// ---------------------------------------------------------------------------
// StateStore
// ---------------------------------------------------------------------------

/// Every repository's settings.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StateStore {
    #[serde(default)]
    pub repos: BTreeMap<String, RepoSettings>,
}

impl StateStore {
    /// Read the store. A missing file is an empty store.
    ///
    /// # Errors
    /// Returns [`StateError::Io`] when the file exists but cannot be read and
    /// [`StateError::Parse`] when it is not a valid store.
    pub fn load(path: &Path) -> Result<Self, StateError> {
        let contents = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(StateError::Io {
                    path: path.to_owned(),
                    source,
                });
            }
        };
        toml::from_str(&contents).map_err(|e| StateError::Parse {
            path: path.to_owned(),
            message: e.message().to_owned(),
        })
    }

    /// Write the store atomically, creating the parent directory if needed.
    ///
    /// # Errors
    /// Returns [`StateError`] on encoding or I/O failure. On failure the
    /// previous file is left untouched.
    pub fn save(&self, path: &Path) -> Result<(), StateError> {
        let body = toml::to_string_pretty(self)?;
        let io = |source| StateError::Io {
            path: path.to_owned(),
            source,
        };

        let dir = match path.parent() {
            Some(d) if !d.as_os_str().is_empty() => d,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir).map_err(io)?;

        let mut tmp = NamedTempFile::new_in(dir).map_err(io)?;
        tmp.write_all(body.as_bytes()).map_err(io)?;
        tmp.as_file().sync_all().map_err(io)?;
        tmp.persist(path).map_err(|e| io(e.error))?;
        Ok(())
    }

    /// Settings for `repo`, or the empty default.
    #[must_use]
    pub fn repo(&self, repo: &str) -> RepoSettings {
        self.repos.get(repo).cloned().unwrap_or_default()
    }

    /// Mutable settings for `repo`, created on first use.
    pub fn repo_mut(&mut self, repo: &str) -> &mut RepoSettings {
        self.repos.entry(repo.to_owned()).or_default()
    }

    /// Drop repositories with no remaining customization.
    pub fn prune(&mut self) {
        self.repos.retain(|_, settings| !settings.is_empty());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = StateStore::load(&dir.path().join("state.toml")).unwrap();
        assert!(store.repos.is_empty());
    }

    #[test]
    fn save_then_load_keeps_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("state.toml");

        let mut store = StateStore::default();
        let settings = store.repo_mut("/src/app");
        settings.colors.insert("feature".to_owned(), 4);
        settings.set_order("a", "b");
        settings.pins.insert("abc123".to_owned(), "topic".to_owned());
        store.save(&path).unwrap();

        let loaded = StateStore::load(&path).unwrap();
        assert_eq!(loaded, store);
        assert_eq!(loaded.repo("/src/app").colors["feature"], 4);
        assert!(loaded.repo("/elsewhere").is_empty());
    }

    #[test]
    fn parses_hand_written_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.toml");
        fs::write(
            &path,
            r#"
[repos."/src/app".colors]
main = 2

[[repos."/src/app".orders]]
left = "feature"
right = "bugfix"
"#,
        )
        .unwrap();
        let store = StateStore::load(&path).unwrap();
        let settings = store.repo("/src/app");
        assert_eq!(settings.colors["main"], 2);
        assert_eq!(
            settings.orders,
            [BranchOrder {
                left: "feature".to_owned(),
                right: "bugfix".to_owned(),
            }]
        );
        assert!(settings.pins.is_empty());
    }

    #[test]
    fn unknown_key_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.toml");
        fs::write(&path, "[repos.\"/x\"]\nfavourite = 1\n").unwrap();
        let err = StateStore::load(&path).unwrap_err();
        assert!(matches!(err, StateError::Parse { .. }), "{err}");
        assert!(err.to_string().contains("state.toml"));
    }

    #[test]
    fn set_order_replaces_pair_in_either_direction() {
        let mut settings = RepoSettings::default();
        settings.set_order("a", "b");
        settings.set_order("c", "d");
        settings.set_order("b", "a");
        assert_eq!(settings.orders.len(), 2);
        assert_eq!(settings.orders[1].left, "b");
    }

    #[test]
    fn prune_drops_empty_repos() {
        let mut store = StateStore::default();
        store.repo_mut("/empty");
        store.repo_mut("/kept").pins.insert("c".to_owned(), "b".to_owned());
        store.prune();
        assert_eq!(store.repos.keys().collect::<Vec<_>>(), ["/kept"]);
    }
}
