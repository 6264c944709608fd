//! Raw repository snapshot, as handed over by the git-access layer.
//!
//! A [`Snapshot`] is the only input of the engine. It is an immutable value:
//! augmenting it never mutates it, so a refresh can drop an in-flight pass and
//! start over from a newer snapshot at any time.

use serde::{Deserialize, Serialize};

/// Commit id of the synthetic "uncommitted changes" commit.
pub const UNCOMMITTED_ID: &str = "0000000000000000000000000000000000000000";

/// One repository snapshot: commits, refs and working-copy status.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Repository path; keys the persisted per-repository state.
    #[serde(default)]
    pub repo_path: String,

    /// Commits ordered oldest→newest. Every loaded parent must precede its
    /// children.
    #[serde(default)]
    pub commits: Vec<RawCommit>,

    /// Local and remote branch refs.
    #[serde(default)]
    pub branches: Vec<RawBranch>,

    /// Working-copy status of the checkout.
    #[serde(default)]
    pub status: WorkingStatus,
}

impl Snapshot {
    /// Decode a snapshot from its JSON form.
    ///
    /// # Errors
    /// Returns [`serde_json::Error`] when the document is malformed.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// A commit as read from git.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawCommit {
    /// Full commit id.
    pub id: String,
    /// Parent ids, first parent first. More than two is out of contract.
    #[serde(default)]
    pub parents: Vec<String>,
    /// First line of the message.
    #[serde(default)]
    pub subject: String,
    /// Full message.
    #[serde(default)]
    pub message: String,
    /// Author name.
    #[serde(default)]
    pub author: String,
    /// Author time, seconds since the Unix epoch.
    #[serde(default)]
    pub author_time: i64,
    /// Ref and tag names pointing at this commit (display only).
    #[serde(default)]
    pub refs: Vec<String>,
}

/// A branch ref as read from git.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawBranch {
    /// Short ref name, e.g. `main` or `origin/main`.
    pub name: String,
    /// Commit the ref points at.
    pub tip_id: String,
    /// `true` for remote-tracking refs.
    #[serde(default)]
    pub is_remote: bool,
    /// The local (for a remote ref) or remote (for a local ref) counterpart.
    #[serde(default)]
    pub counterpart: Option<String>,
    /// `true` for the checked-out branch.
    #[serde(default)]
    pub is_current: bool,
}

/// Working-copy status counts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkingStatus {
    /// Modified tracked files.
    #[serde(default)]
    pub modified: usize,
    /// Added (including untracked) files.
    #[serde(default)]
    pub added: usize,
    /// Deleted files.
    #[serde(default)]
    pub deleted: usize,
    /// Files with unresolved conflicts.
    #[serde(default)]
    pub conflicted: usize,
}

impl WorkingStatus {
    /// Total number of changed paths.
    #[must_use]
    pub const fn changes(&self) -> usize {
        self.modified + self.added + self.deleted + self.conflicted
    }

    /// `true` when the working copy differs from `HEAD`.
    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        self.changes() > 0
    }

    /// Subject line used for the uncommitted pseudo-commit.
    #[must_use]
    pub fn subject(&self) -> String {
        if self.conflicted > 0 {
            format!(
                "CONFLICTS: {}, {} uncommitted changes",
                self.conflicted,
                self.changes()
            )
        } else {
            format!("{} uncommitted changes", self.changes())
        }
    }
}
