//! Error types for gitlane.
//!
//! Only snapshot defects that make inference meaningless are errors. Ref and
//! commit oddities the engine can route around (missing tips, octopus merges,
//! unknown glyph combinations) are logged instead and never surface here.

use std::path::PathBuf;

use thiserror::Error;

// ---------------------------------------------------------------------------
// SnapshotError
// ---------------------------------------------------------------------------

/// A repository snapshot that cannot be augmented.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// The same commit id appears twice in the commit list.
    #[error("duplicate commit `{id}` in snapshot")]
    DuplicateCommit {
        /// The repeated commit id.
        id: String,
    },

    /// A loaded parent is listed as newer than (or equal to) its child.
    ///
    /// Commits must be ordered oldest→newest so every parent precedes its
    /// children.
    #[error("commit `{child}` precedes its parent `{parent}`; snapshot is not topologically ordered")]
    UnorderedHistory {
        /// The child commit id.
        child: String,
        /// The parent commit id that appears after it.
        parent: String,
    },

    /// The snapshot document could not be decoded.
    #[error("invalid snapshot: {0}")]
    Decode(#[from] serde_json::Error),
}

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// An error loading or validating `gitlane.toml`.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{}{message}", path.as_ref().map(|p| format!("{}: ", p.display())).unwrap_or_default())]
pub struct ConfigError {
    /// Path to the config file, when loaded from disk.
    pub path: Option<PathBuf>,
    /// Human-readable description, including the line when known.
    pub message: String,
}

impl ConfigError {
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            path: None,
            message: message.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// StateError
// ---------------------------------------------------------------------------

/// An error reading or writing the persisted per-repository state.
#[derive(Debug, Error)]
pub enum StateError {
    /// The state file exists but could not be read or written.
    #[error("state file {}: {source}", path.display())]
    Io {
        /// Path to the state file.
        path: PathBuf,
        /// Underlying I/O failure.
        source: std::io::Error,
    },

    /// The state file is not valid TOML for [`crate::state::StateStore`].
    #[error("state file {}: {message}", path.display())]
    Parse {
        /// Path to the state file.
        path: PathBuf,
        /// Parser message.
        message: String,
    },

    /// The state could not be encoded.
    #[error("could not encode state: {0}")]
    Encode(#[from] toml::ser::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_display_with_path() {
        let err = ConfigError {
            path: Some(PathBuf::from("/tmp/gitlane.toml")),
            message: "line 3: unknown field `foo`".to_owned(),
        };
        assert_eq!(
            err.to_string(),
            "/tmp/gitlane.toml: line 3: unknown field `foo`"
        );
    }

    #[test]
    fn config_error_display_without_path() {
        let err = ConfigError::new("palette must not be empty");
        assert_eq!(err.to_string(), "palette must not be empty");
    }

    #[test]
    fn unordered_history_names_both_commits() {
        let err = SnapshotError::UnorderedHistory {
            child: "bbb".to_owned(),
            parent: "aaa".to_owned(),
        };
        let msg = err.to_string();
        assert!(msg.contains("bbb"));
        assert!(msg.contains("aaa"));
    }
}
