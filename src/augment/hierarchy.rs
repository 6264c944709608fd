//! Parent assignment between branches.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::model::{Branch, Commit};

/// Give every branch a parent so that exactly one root remains, and flag the
/// root and its counterpart as main.
pub fn assign(branches: &mut [Branch], commits: &[Commit], priority: &[String]) {
    if branches.is_empty() {
        return;
    }
    let names: HashMap<String, usize> = branches
        .iter()
        .enumerate()
        .map(|(i, b)| (b.name.clone(), i))
        .collect();

    let structural: Vec<Option<usize>> = branches
        .iter()
        .enumerate()
        .map(|(i, b)| structural_parent(i, b, commits))
        .collect();
    let mut parents: Vec<Option<usize>> = branches
        .iter()
        .zip(&structural)
        .map(|(b, &fallback)| {
            let remote = (!b.is_remote)
                .then(|| b.remote_name.as_ref().and_then(|r| names.get(r).copied()))
                .flatten();
            remote.or(fallback)
        })
        .collect();

    break_cycles(&mut parents, &structural);

    let roots: Vec<usize> = (0..branches.len())
        .filter(|&i| parents[i].is_none())
        .collect();
    let root = choose_root(&roots, branches, priority);
    for &orphan in &roots {
        if orphan != root {
            debug!(
                branch = %branches[orphan].name,
                root = %branches[root].name,
                "attaching parentless branch to root"
            );
            parents[orphan] = Some(root);
        }
    }

    for (branch, parent) in branches.iter_mut().zip(parents) {
        branch.parent = parent;
        branch.is_main = false;
    }
    branches[root].is_main = true;
    let counterpart = branches[root]
        .remote_name
        .as_ref()
        .or(branches[root].local_name.as_ref())
        .and_then(|n| names.get(n).copied());
    if let Some(c) = counterpart {
        branches[c].is_main = true;
    }
}

/// The branch owning the bottom commit when that is someone else
/// (pointer-only), otherwise the owner of the bottom's first parent.
fn structural_parent(index: usize, branch: &Branch, commits: &[Commit]) -> Option<usize> {
    let bottom = commits.get(branch.bottom)?;
    if bottom.branch != index {
        return Some(bottom.branch);
    }
    let owner = commits.get(bottom.first_parent?)?.branch;
    (owner != index).then_some(owner)
}

/// `true` when following parents from `start` leads back to `start`.
fn on_cycle(parents: &[Option<usize>], start: usize) -> bool {
    let mut seen = vec![false; parents.len()];
    let mut current = parents[start];
    while let Some(p) = current {
        if p == start {
            return true;
        }
        if std::mem::replace(&mut seen[p], true) {
            return false;
        }
        current = parents[p];
    }
    false
}

fn break_cycles(parents: &mut [Option<usize>], structural: &[Option<usize>]) {
    for start in 0..parents.len() {
        if !on_cycle(parents, start) {
            continue;
        }
        parents[start] = structural[start];
        if on_cycle(parents, start) {
            warn!(branch = start, "breaking branch parent cycle");
            parents[start] = None;
        }
    }
}

/// Highest-priority parentless branch, else the one reaching furthest back.
fn choose_root(roots: &[usize], branches: &[Branch], priority: &[String]) -> usize {
    let ranked = roots
        .iter()
        .filter_map(|&r| {
            priority
                .iter()
                .position(|p| *p == branches[r].name)
                .map(|rank| (rank, r))
        })
        .min()
        .map(|(_, r)| r);
    ranked
        .or_else(|| {
            roots
                .iter()
                .copied()
                .reduce(|best, r| if branches[r].bottom > branches[best].bottom { r } else { best })
        })
        .unwrap_or(0)
}
