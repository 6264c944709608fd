//! Branch visibility, processing order and column assignment.

use std::collections::BTreeSet;

use tracing::debug;

use crate::model::Repo;
use crate::state::BranchOrder;

/// A branch's first and last view row, inclusive.
pub type Span = (usize, usize);

/// Which branches are drawn: the shown names closed over their parents,
/// plus the root. `None` shows everything.
pub fn visible_branches(repo: &Repo, shown: Option<&BTreeSet<String>>) -> Vec<bool> {
    let n = repo.branches.len();
    let Some(shown) = shown else {
        return vec![true; n];
    };
    let mut visible = vec![false; n];
    for name in shown {
        match repo.branch_index(name) {
            Some(b) => visible[b] = true,
            None => debug!(branch = %name, "ignoring unknown shown branch"),
        }
    }
    if let Some(root) = repo.root() {
        visible[root] = true;
    }
    for b in 0..n {
        if !visible[b] {
            continue;
        }
        let mut parent = repo.branches[b].parent;
        while let Some(p) = parent {
            if visible[p] {
                break;
            }
            visible[p] = true;
            parent = repo.branches[p].parent;
        }
    }
    visible
}

/// View rows: commit rows owned by visible branches, newest first, and the
/// reverse mapping from commit row to view row.
pub fn view_rows(repo: &Repo, visible: &[bool]) -> (Vec<usize>, Vec<Option<usize>>) {
    let mut rows = Vec::with_capacity(repo.commits.len());
    let mut row_of = vec![None; repo.commits.len()];
    for c in &repo.commits {
        if visible.get(c.branch).copied().unwrap_or(false) {
            row_of[c.row] = Some(rows.len());
            rows.push(c.row);
        }
    }
    (rows, row_of)
}

/// The view rows covered by `branch`, or `None` when nothing of it is shown.
pub fn span(repo: &Repo, branch: usize, rows: &[usize]) -> Option<Span> {
    let b = &repo.branches[branch];
    let tip = rows.partition_point(|&r| r < b.tip);
    if tip >= rows.len() {
        return None;
    }
    let bottom = rows
        .partition_point(|&r| r <= b.bottom)
        .checked_sub(1)
        .map_or(tip, |bottom| bottom.max(tip));
    Some((tip, bottom))
}

/// Visible branches in layout order: snapshot order with the ordering
/// nudges applied, then every branch preceded by its ancestors.
pub fn processing_order(repo: &Repo, visible: &[bool], orders: &[BranchOrder]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..repo.branches.len()).filter(|&b| visible[b]).collect();

    for nudge in orders {
        let (Some(left), Some(right)) = (
            repo.branch_index(&nudge.left),
            repo.branch_index(&nudge.right),
        ) else {
            continue;
        };
        if left == right {
            continue;
        }
        let Some(from) = order.iter().position(|&b| b == right) else {
            continue;
        };
        if !order.contains(&left) {
            continue;
        }
        order.remove(from);
        let to = order.iter().position(|&b| b == left).map_or(order.len(), |i| i + 1);
        order.insert(to, right);
    }

    let mut placed = vec![false; repo.branches.len()];
    let mut result = Vec::with_capacity(order.len());
    let mut chain = Vec::new();
    for b in order {
        let mut current = Some(b);
        while let Some(c) = current {
            if placed[c] || !visible[c] {
                break;
            }
            chain.push(c);
            current = repo.branches[c].parent;
        }
        while let Some(c) = chain.pop() {
            placed[c] = true;
            result.push(c);
        }
    }
    result
}

/// `true` when `branch` nests tightly next to its parent: a local branch
/// under its remote, or a pull-merge sub-branch.
fn is_tight(repo: &Repo, branch: usize, parent: usize) -> bool {
    let b = &repo.branches[branch];
    let p = &repo.branches[parent];
    b.is_pull_merge_part || (!b.is_remote && b.remote_name.as_deref() == Some(p.name.as_str()))
}

/// `true` when the spans, each widened by one row on both sides, meet.
pub const fn overlaps(a: Span, b: Span) -> bool {
    a.0 <= b.1 + 2 && b.0 <= a.1 + 2
}

/// Greedy column assignment in `order`. Returns the column per branch index.
pub fn assign_columns(repo: &Repo, order: &[usize], spans: &[Option<Span>]) -> Vec<Option<usize>> {
    let mut columns: Vec<Option<usize>> = vec![None; repo.branches.len()];
    let mut placed: Vec<usize> = Vec::with_capacity(order.len());
    for &b in order {
        let Some(own) = spans[b] else {
            continue;
        };
        let mut x = match repo.branches[b].parent.and_then(|p| columns[p].map(|px| (p, px))) {
            Some((p, px)) if is_tight(repo, b, p) => px + 1,
            Some((_, px)) => px + 2,
            None => 0,
        };
        while placed.iter().any(|&o| {
            columns[o] == Some(x) && spans[o].is_some_and(|other| overlaps(own, other))
        }) {
            x += 1;
        }
        columns[b] = Some(x);
        placed.push(b);
    }
    columns
}
