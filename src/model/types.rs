//! Augmented commit and branch types.
//!
//! Commits live in an arena indexed by row: row 0 is the newest commit and
//! rows grow toward history. Every edge (parents, children, owning branch,
//! parent branch) is an index into the arena, so a [`Repo`] has no shared
//! mutable graph and is cheap to rebuild from a fresh snapshot.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use super::snapshot::WorkingStatus;

/// Length of abbreviated commit ids.
pub const SHORT_ID_LEN: usize = 7;

/// Abbreviate a commit id for display and synthetic branch names.
#[must_use]
pub fn short_id(id: &str) -> &str {
    id.get(..SHORT_ID_LEN).unwrap_or(id)
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// Which inference step decided a commit's branch.
///
/// The variants after [`Resolution::UserPinned`] mirror the ordered rule
/// chain in [`crate::augment`]; the first rule that applies wins.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Resolution {
    /// Not decided yet.
    #[default]
    Pending,
    /// Manually pinned by the user.
    UserPinned,
    /// More than two parents; parked on its own branch.
    Unsupported,
    /// Rule 1: exactly one candidate branch.
    SingleCandidate,
    /// Rule 2: a local/remote pair, the remote wins.
    LocalRemotePair,
    /// Backbone: a first-parent child sits on a priority branch.
    Backbone,
    /// Rule 3: no candidates, two children on the same branch.
    TwoChildrenSameBranch,
    /// Rule 4: tip of a deleted branch merged into its only merge child.
    DeletedBranchMergeTip,
    /// Rule 5: no candidates and no children.
    Orphan,
    /// Rule 6: no candidates, exactly one child.
    SingleChild,
    /// Rule 7: exactly one child and it is likely.
    LikelyOnlyChild,
    /// Rule 8: one candidate is on the priority list.
    PriorityBranch,
    /// Rule 9: branch name parsed from the commit's own subject.
    SubjectName,
    /// Rule 10: single child with the same candidate set.
    Continuation,
    /// Rule 11: among several children exactly one is likely.
    LikelyChild,
    /// Rule 12: a child is ambiguous; ambiguity flows down.
    AmbiguousChild,
    /// Rule 13: genuine ambiguity, most likely candidate displayed.
    Ambiguous,
    /// Reassigned after the fact by a subject-name repair walk.
    Repaired,
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Pending => "pending",
            Self::UserPinned => "user-pinned",
            Self::Unsupported => "unsupported",
            Self::SingleCandidate => "single-candidate",
            Self::LocalRemotePair => "local-remote-pair",
            Self::Backbone => "backbone",
            Self::TwoChildrenSameBranch => "two-children-same-branch",
            Self::DeletedBranchMergeTip => "deleted-branch-merge-tip",
            Self::Orphan => "orphan",
            Self::SingleChild => "single-child",
            Self::LikelyOnlyChild => "likely-only-child",
            Self::PriorityBranch => "priority-branch",
            Self::SubjectName => "subject-name",
            Self::Continuation => "continuation",
            Self::LikelyChild => "likely-child",
            Self::AmbiguousChild => "ambiguous-child",
            Self::Ambiguous => "ambiguous",
            Self::Repaired => "repaired",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Commit
// ---------------------------------------------------------------------------

/// A commit with its inferred branch.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Commit {
    /// Full commit id.
    pub id: String,
    /// Arena index; row 0 is the newest commit.
    pub row: usize,
    /// First line of the message.
    pub subject: String,
    /// Full message.
    pub message: String,
    /// Author name.
    pub author: String,
    /// Author time, seconds since the Unix epoch.
    pub author_time: i64,
    /// Parent ids as read from git, including parents outside the snapshot.
    pub parent_ids: Vec<String>,
    /// Ref and tag names pointing here.
    pub refs: Vec<String>,

    /// Row of the first parent, if loaded.
    pub first_parent: Option<usize>,
    /// Row of the merge (second) parent, if loaded.
    pub merge_parent: Option<usize>,
    /// Rows of commits having this one as first parent, newest first.
    pub children: Vec<usize>,
    /// Rows of commits having this one as merge parent, newest first.
    pub merge_children: Vec<usize>,

    /// Candidate branches collected from refs and first-parent children.
    pub candidates: Vec<usize>,
    /// Owning branch index. Exactly one after inference.
    pub branch: usize,
    /// More than one branch could own this commit.
    pub is_ambiguous: bool,
    /// Alternative branch names when ambiguous.
    pub ambiguous_branch_names: Vec<String>,
    /// The branch was decided on evidence rather than a fallback.
    pub is_likely: bool,
    /// The branch was pinned by the user.
    pub is_branch_set_by_user: bool,
    /// The synthetic "uncommitted changes" commit.
    pub is_uncommitted: bool,
    /// Had more than two parents.
    pub is_unsupported: bool,
    /// Pull merge whose parents were swapped.
    pub is_pull_merge: bool,
    /// Rule that decided `branch`.
    pub resolution: Resolution,
}

impl Commit {
    /// Abbreviated id.
    #[must_use]
    pub fn short_id(&self) -> &str {
        short_id(&self.id)
    }

    /// `true` when the commit has two parents (loaded or not).
    #[must_use]
    pub fn is_merge(&self) -> bool {
        self.parent_ids.len() == 2
    }

    /// `true` when a parent id is known but absent from the snapshot.
    #[must_use]
    pub fn has_unloaded_merge_parent(&self) -> bool {
        self.is_merge() && self.merge_parent.is_none()
    }
}

// ---------------------------------------------------------------------------
// Branch
// ---------------------------------------------------------------------------

/// A branch, real (backed by a ref) or synthesized during inference.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Branch {
    /// Unique branch name (`origin/main`, `main`, `login-fix`, ...).
    pub name: String,
    /// Newest commit of the branch.
    pub tip_id: String,
    /// Oldest commit owned by the branch.
    pub bottom_id: String,
    /// Row of `tip_id`.
    pub tip: usize,
    /// Row of `bottom_id`; never smaller than `tip`.
    pub bottom: usize,
    /// Remote-tracking ref.
    pub is_remote: bool,
    /// Remote counterpart of a local branch.
    pub remote_name: Option<String>,
    /// Local counterpart of a remote branch.
    pub local_name: Option<String>,
    /// Parent branch in the hierarchy; `None` only for the root.
    pub parent: Option<usize>,
    /// Backed by a real ref (not synthesized).
    pub is_git_branch: bool,
    /// The root branch or its counterpart.
    pub is_main: bool,
    /// The checked-out branch.
    pub is_current: bool,
    /// Local side of a pull merge, laid out next to its parent.
    pub is_pull_merge_part: bool,
    /// Holds a commit with more than two parents.
    pub is_unsupported: bool,
    /// Newest ambiguous commit owned by the branch.
    pub ambiguous_tip_id: Option<String>,
    /// Candidate names of `ambiguous_tip_id`.
    pub ambiguous_branch_names: Vec<String>,
    /// Name without remote prefix; stable across local/remote renames.
    pub primary_base_name: String,
}

impl Branch {
    /// A branch backed by a git ref.
    #[must_use]
    pub fn from_ref(name: &str, tip_id: &str, is_remote: bool) -> Self {
        Self {
            name: name.to_owned(),
            tip_id: tip_id.to_owned(),
            bottom_id: tip_id.to_owned(),
            is_remote,
            is_git_branch: true,
            primary_base_name: primary_base_name(name, is_remote).to_owned(),
            ..Self::default()
        }
    }

    /// A branch synthesized from a subject or commit id.
    #[must_use]
    pub fn synthetic(name: &str, tip_id: &str) -> Self {
        Self {
            name: name.to_owned(),
            tip_id: tip_id.to_owned(),
            bottom_id: tip_id.to_owned(),
            primary_base_name: name.to_owned(),
            ..Self::default()
        }
    }

    /// `true` if `other` is this branch's local or remote counterpart.
    #[must_use]
    pub fn is_counterpart_of(&self, other: &Self) -> bool {
        self.remote_name.as_deref() == Some(other.name.as_str())
            || self.local_name.as_deref() == Some(other.name.as_str())
    }
}

/// Strip the remote segment (`origin/feature` → `feature`) from remote names.
#[must_use]
pub fn primary_base_name(name: &str, is_remote: bool) -> &str {
    if is_remote {
        name.split_once('/').map_or(name, |(_, rest)| rest)
    } else {
        name
    }
}

// ---------------------------------------------------------------------------
// Repo
// ---------------------------------------------------------------------------

/// An augmented repository: every commit owned by exactly one branch and the
/// branches arranged in a single-rooted forest.
#[derive(Clone, Debug, Default)]
pub struct Repo {
    /// Repository path from the snapshot.
    pub repo_path: String,
    /// Commits by row, newest first.
    pub commits: Vec<Commit>,
    /// Branches; refs first in snapshot order, then synthesized ones.
    pub branches: Vec<Branch>,
    /// Working-copy status from the snapshot.
    pub status: WorkingStatus,
    commit_index: HashMap<String, usize>,
    branch_index: HashMap<String, usize>,
}

impl Repo {
    /// Assemble a repo and its lookup tables.
    #[must_use]
    pub fn new(
        repo_path: String,
        commits: Vec<Commit>,
        branches: Vec<Branch>,
        status: WorkingStatus,
    ) -> Self {
        let commit_index = commits
            .iter()
            .map(|c| (c.id.clone(), c.row))
            .collect();
        let branch_index = branches
            .iter()
            .enumerate()
            .map(|(i, b)| (b.name.clone(), i))
            .collect();
        Self {
            repo_path,
            commits,
            branches,
            status,
            commit_index,
            branch_index,
        }
    }

    /// Row of the commit with `id`.
    #[must_use]
    pub fn commit_row(&self, id: &str) -> Option<usize> {
        self.commit_index.get(id).copied()
    }

    /// The commit with `id`.
    #[must_use]
    pub fn commit(&self, id: &str) -> Option<&Commit> {
        self.commit_row(id).map(|row| &self.commits[row])
    }

    /// Index of the branch named `name`.
    #[must_use]
    pub fn branch_index(&self, name: &str) -> Option<usize> {
        self.branch_index.get(name).copied()
    }

    /// The branch named `name`.
    #[must_use]
    pub fn branch(&self, name: &str) -> Option<&Branch> {
        self.branch_index(name).map(|i| &self.branches[i])
    }

    /// The branch owning the commit with `id`.
    #[must_use]
    pub fn branch_of(&self, id: &str) -> Option<&Branch> {
        self.commit(id).map(|c| &self.branches[c.branch])
    }

    /// Name of the parent branch of `branch`.
    #[must_use]
    pub fn parent_name(&self, branch: usize) -> Option<&str> {
        self.branches[branch]
            .parent
            .map(|p| self.branches[p].name.as_str())
    }

    /// Index of the root branch (the one without a parent).
    #[must_use]
    pub fn root(&self) -> Option<usize> {
        self.branches.iter().position(|b| b.parent.is_none())
    }

    /// Rows of all commits owned by `branch`, newest first.
    pub fn commits_of(&self, branch: usize) -> impl Iterator<Item = &Commit> {
        self.commits.iter().filter(move |c| c.branch == branch)
    }
}
