//! Commit arena construction.
//!
//! Turns a [`Snapshot`] into rows (newest first) with index edges, and turns
//! its refs into the initial branch list. Children and merge children are
//! built here, once, in a single forward pass.

use std::collections::{HashMap, HashSet};

use tracing::{debug, warn};

use crate::error::SnapshotError;
use crate::model::{Branch, Commit, RawBranch, Snapshot, UNCOMMITTED_ID};

use super::subject::MergeSubject;

/// Marker for a commit whose branch has not been decided yet.
pub const UNASSIGNED: usize = usize::MAX;

/// Commits and ref-backed branches ready for inference.
#[derive(Debug, Default)]
pub struct Arena {
    pub commits: Vec<Commit>,
    pub branches: Vec<Branch>,
    pub index: HashMap<String, usize>,
}

/// Build the arena for `snapshot`.
///
/// # Errors
/// Returns [`SnapshotError`] for duplicate commit ids or a parent listed
/// after its child.
pub fn build(snapshot: &Snapshot) -> Result<Arena, SnapshotError> {
    let current_tip = snapshot
        .branches
        .iter()
        .find(|b| b.is_current)
        .map(|b| b.tip_id.as_str());

    let mut commits: Vec<Commit> = Vec::with_capacity(snapshot.commits.len() + 1);
    let mut uncommitted_parent = None;
    if snapshot.status.is_dirty()
        && let Some(tip) = current_tip
        && snapshot.commits.iter().any(|c| c.id == tip)
    {
        uncommitted_parent = Some(tip.to_owned());
        commits.push(Commit {
            id: UNCOMMITTED_ID.to_owned(),
            subject: snapshot.status.subject(),
            parent_ids: vec![tip.to_owned()],
            author_time: snapshot
                .commits
                .iter()
                .map(|c| c.author_time)
                .max()
                .unwrap_or_default(),
            is_uncommitted: true,
            ..Commit::default()
        });
    }

    for raw in snapshot.commits.iter().rev() {
        commits.push(Commit {
            id: raw.id.clone(),
            subject: raw.subject.clone(),
            message: raw.message.clone(),
            author: raw.author.clone(),
            author_time: raw.author_time,
            parent_ids: raw.parents.clone(),
            refs: raw.refs.clone(),
            ..Commit::default()
        });
    }

    let mut index = HashMap::with_capacity(commits.len());
    for (row, commit) in commits.iter_mut().enumerate() {
        commit.row = row;
        commit.branch = UNASSIGNED;
        if index.insert(commit.id.clone(), row).is_some() {
            return Err(SnapshotError::DuplicateCommit {
                id: commit.id.clone(),
            });
        }
    }

    link_parents(&mut commits, &index)?;
    link_children(&mut commits);

    let branches = branches_from_refs(&snapshot.branches, &index, uncommitted_parent.is_some());
    debug!(
        commits = commits.len(),
        branches = branches.len(),
        "arena built"
    );
    Ok(Arena {
        commits,
        branches,
        index,
    })
}

fn link_parents(commits: &mut [Commit], index: &HashMap<String, usize>) -> Result<(), SnapshotError> {
    for row in 0..commits.len() {
        let commit = &commits[row];
        let mut loaded = Vec::with_capacity(2);
        for parent_id in &commit.parent_ids {
            let parent = index.get(parent_id).copied();
            if let Some(parent) = parent
                && parent <= row
            {
                return Err(SnapshotError::UnorderedHistory {
                    child: commit.id.clone(),
                    parent: parent_id.clone(),
                });
            }
            loaded.push(parent);
        }

        let commit = &mut commits[row];
        if commit.parent_ids.len() > 2 {
            warn!(
                commit = %commit.id,
                parents = commit.parent_ids.len(),
                "commit has more than two parents; not assigning a branch"
            );
            commit.is_unsupported = true;
            commit.first_parent = loaded.first().copied().flatten();
            continue;
        }

        commit.first_parent = loaded.first().copied().flatten();
        commit.merge_parent = loaded.get(1).copied().flatten();

        if let (Some(first), Some(merge)) = (commit.first_parent, commit.merge_parent)
            && MergeSubject::parse(&commit.subject).is_some_and(|m| m.is_pull())
        {
            commit.first_parent = Some(merge);
            commit.merge_parent = Some(first);
            commit.is_pull_merge = true;
        }
    }
    Ok(())
}

fn link_children(commits: &mut [Commit]) {
    for row in 0..commits.len() {
        if let Some(parent) = commits[row].first_parent {
            commits[parent].children.push(row);
        }
        if let Some(parent) = commits[row].merge_parent {
            commits[parent].merge_children.push(row);
        }
    }
}

/// Create branches for the usable refs, dropping malformed ones.
fn branches_from_refs(
    refs: &[RawBranch],
    index: &HashMap<String, usize>,
    has_uncommitted: bool,
) -> Vec<Branch> {
    let mut seen = HashSet::new();
    let mut branches: Vec<Branch> = Vec::with_capacity(refs.len());
    for raw in refs {
        if raw.is_remote && raw.name.ends_with("/HEAD") {
            debug!(name = %raw.name, "skipping symbolic remote HEAD");
            continue;
        }
        if !index.contains_key(&raw.tip_id) {
            warn!(
                name = %raw.name,
                tip = %raw.tip_id,
                "dropping ref whose tip is not in the snapshot"
            );
            continue;
        }
        if !seen.insert(raw.name.clone()) {
            warn!(name = %raw.name, "dropping duplicate ref");
            continue;
        }
        let mut branch = Branch::from_ref(&raw.name, &raw.tip_id, raw.is_remote);
        branch.is_current = raw.is_current;
        if raw.is_current && has_uncommitted {
            branch.tip_id = UNCOMMITTED_ID.to_owned();
            branch.bottom_id = UNCOMMITTED_ID.to_owned();
        }
        if raw.is_remote {
            branch.local_name.clone_from(&raw.counterpart);
        } else {
            branch.remote_name.clone_from(&raw.counterpart);
        }
        branches.push(branch);
    }
    pair_counterparts(&mut branches);
    branches
}

/// Validate declared counterparts and infer missing ones by name.
fn pair_counterparts(branches: &mut [Branch]) {
    let names: HashMap<String, usize> = branches
        .iter()
        .enumerate()
        .map(|(i, b)| (b.name.clone(), i))
        .collect();

    for i in 0..branches.len() {
        let branch = &branches[i];
        let declared = if branch.is_remote {
            branch.local_name.clone()
        } else {
            branch.remote_name.clone()
        };
        let counterpart = match declared {
            Some(name) => names.get(&name).copied().filter(|&j| {
                branches[j].is_remote != branch.is_remote
            }),
            None if branch.is_remote => names
                .get(branch.primary_base_name.as_str())
                .copied()
                .filter(|&j| !branches[j].is_remote),
            None => None,
        };

        let Some(j) = counterpart else {
            branches[i].local_name = None;
            branches[i].remote_name = None;
            continue;
        };
        let (remote, local) = if branches[i].is_remote { (i, j) } else { (j, i) };
        let remote_name = branches[remote].name.clone();
        let local_name = branches[local].name.clone();
        branches[remote].local_name = Some(local_name);
        branches[local].remote_name = Some(remote_name);
    }

    // A local pairing can be undone above when its remote is processed later
    // with a different declared counterpart; keep only symmetric pairs.
    for i in 0..branches.len() {
        let other = branches[i]
            .remote_name
            .as_ref()
            .or(branches[i].local_name.as_ref())
            .and_then(|n| names.get(n).copied());
        let symmetric = other.is_some_and(|j| branches[j].is_counterpart_of(&branches[i]));
        if !symmetric {
            branches[i].local_name = None;
            branches[i].remote_name = None;
        }
    }
}
