//! Branch inference.
//!
//! [`augment`] turns a raw [`Snapshot`] into a [`Repo`] in which every commit
//! is owned by exactly one branch:
//!
//! 1. build the arena (rows newest first, index edges),
//! 2. seed each ref's tip with the ref as a candidate,
//! 3. walk rows newest to oldest, so every child is decided before its
//!    parent, applying pins, then the ordered rule chain,
//! 4. compute tips and bottoms, drop empty synthetic branches,
//! 5. arrange branches into a single-rooted hierarchy.

mod arena;
mod hierarchy;
mod rules;
pub mod subject;

use std::collections::{BTreeMap, HashMap};

use tracing::{debug, instrument, warn};

use crate::error::SnapshotError;
use crate::model::{Branch, Commit, Repo, Resolution, Snapshot, short_id};

use arena::UNASSIGNED;
use rules::Decision;

pub use subject::MergeSubject;

/// Branch names tried first when a commit could belong to several branches.
pub const DEFAULT_PRIORITY: &[&str] = &["origin/main", "main", "origin/master", "master"];

/// Inputs to inference besides the snapshot itself.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AugmentOptions {
    /// Ordered priority branch names (earlier wins).
    pub priority: Vec<String>,
    /// Commit id → branch name set by the user.
    pub pins: BTreeMap<String, String>,
}

impl Default for AugmentOptions {
    fn default() -> Self {
        Self {
            priority: DEFAULT_PRIORITY.iter().map(|&s| s.to_owned()).collect(),
            pins: BTreeMap::new(),
        }
    }
}

/// Infer branch ownership for every commit in `snapshot`.
///
/// # Errors
/// Returns [`SnapshotError`] when the snapshot contains duplicate commits or
/// lists a parent after its child.
#[instrument(skip_all, fields(commits = snapshot.commits.len(), refs = snapshot.branches.len()))]
pub fn augment(snapshot: &Snapshot, options: &AugmentOptions) -> Result<Repo, SnapshotError> {
    let arena = arena::build(snapshot)?;
    let mut inference = Inference::new(arena.commits, arena.branches, &options.priority);
    inference.seed(&arena.index);
    inference.run(&options.pins);
    let (commits, mut branches) = inference.finish(&arena.index);
    hierarchy::assign(&mut branches, &commits, &options.priority);

    debug!(
        commits = commits.len(),
        branches = branches.len(),
        ambiguous = commits.iter().filter(|c| c.is_ambiguous).count(),
        "inference complete"
    );
    Ok(Repo::new(
        snapshot.repo_path.clone(),
        commits,
        branches,
        snapshot.status,
    ))
}

// ---------------------------------------------------------------------------
// Inference state
// ---------------------------------------------------------------------------

/// Mutable state of one inference pass.
pub(crate) struct Inference<'a> {
    commits: Vec<Commit>,
    branches: Vec<Branch>,
    /// Highest-priority branch among each row's first-parent children.
    backbone: Vec<Option<usize>>,
    names: HashMap<String, usize>,
    priority: &'a [String],
}

impl<'a> Inference<'a> {
    fn new(commits: Vec<Commit>, branches: Vec<Branch>, priority: &'a [String]) -> Self {
        let names = branches
            .iter()
            .enumerate()
            .map(|(i, b)| (b.name.clone(), i))
            .collect();
        Self {
            backbone: vec![None; commits.len()],
            commits,
            branches,
            names,
            priority,
        }
    }

    fn seed(&mut self, index: &HashMap<String, usize>) {
        for (b, branch) in self.branches.iter().enumerate() {
            if let Some(&row) = index.get(&branch.tip_id) {
                push_unique(&mut self.commits[row].candidates, b);
            }
        }
    }

    fn run(&mut self, pins: &BTreeMap<String, String>) {
        for row in 0..self.commits.len() {
            let decision = if let Some(name) = pins.get(&self.commits[row].id) {
                let branch = self.branch_named(name, row);
                self.commits[row].is_branch_set_by_user = true;
                Decision {
                    branch,
                    resolution: Resolution::UserPinned,
                    likely: true,
                    ambiguous: None,
                }
            } else if self.commits[row].is_unsupported {
                let name = format!("unsupported@{}", short_id(&self.commits[row].id));
                let branch = self.synthesize(Some(&name), row);
                self.branches[branch].is_unsupported = true;
                Decision {
                    branch,
                    resolution: Resolution::Unsupported,
                    likely: true,
                    ambiguous: None,
                }
            } else {
                rules::decide(self, row)
            };
            self.apply(row, decision);
            self.propagate(row);
        }
    }

    fn apply(&mut self, row: usize, decision: Decision) {
        let commit = &mut self.commits[row];
        commit.branch = decision.branch;
        commit.resolution = decision.resolution;
        commit.is_likely = decision.likely;
        match decision.ambiguous {
            Some(names) if names.len() > 1 => {
                commit.is_ambiguous = true;
                commit.ambiguous_branch_names = names;
            }
            _ => {
                commit.is_ambiguous = false;
                commit.ambiguous_branch_names.clear();
            }
        }
    }

    /// Hand `row`'s candidates to its first parent, plus its own branch when
    /// that branch is a priority branch.
    fn propagate(&mut self, row: usize) {
        let Some(parent) = self.commits[row].first_parent else {
            return;
        };
        let candidates = self.commits[row].candidates.clone();
        for b in candidates {
            push_unique(&mut self.commits[parent].candidates, b);
        }

        let branch = self.commits[row].branch;
        let Some(rank) = self.priority_rank(branch) else {
            return;
        };
        push_unique(&mut self.commits[parent].candidates, branch);
        let better = self.backbone[parent]
            .is_none_or(|current| self.priority_rank(current).is_none_or(|r| rank < r));
        if better {
            self.backbone[parent] = Some(branch);
        }
    }

    // ---------------------------------------------------------------------------
    // Helpers used by the rules
    // ---------------------------------------------------------------------------

    fn priority_rank(&self, branch: usize) -> Option<usize> {
        let name = &self.branches[branch].name;
        self.priority.iter().position(|p| p == name)
    }

    /// An already synthesized branch named exactly `name`.
    fn synthetic_named(&self, name: &str) -> Option<usize> {
        self.names
            .get(name)
            .copied()
            .filter(|&b| !self.branches[b].is_git_branch)
    }

    /// The branch named `name`, created when it does not exist.
    fn branch_named(&mut self, name: &str, row: usize) -> usize {
        match self.names.get(name) {
            Some(&b) => b,
            None => self.synthesize(Some(name), row),
        }
    }

    /// Create a synthetic branch with its tip at `row`. Names are made unique
    /// by appending the short id of the tip.
    fn synthesize(&mut self, name: Option<&str>, row: usize) -> usize {
        let id = self.commits[row].id.clone();
        let short = short_id(&id);
        let base = name.map_or_else(|| format!("branch@{short}"), str::to_owned);

        let mut unique = base.clone();
        if self.names.contains_key(&unique) {
            unique = format!("{base}@{short}");
        }
        let mut n = 2;
        while self.names.contains_key(&unique) {
            unique = format!("{base}@{short}-{n}");
            n += 1;
        }

        let mut branch = Branch::synthetic(&unique, &id);
        branch.primary_base_name = base;
        let index = self.branches.len();
        debug!(name = %unique, tip = %short, "synthesized branch");
        self.names.insert(unique, index);
        self.branches.push(branch);
        index
    }

    /// After `row` was placed on `target` by its own subject, walk up through
    /// first-parent children and settle ambiguous commits that listed
    /// `target` as an alternative.
    fn repair_upward(&mut self, row: usize, target: usize) {
        let target_name = self.branches[target].name.clone();
        let target_base = self.branches[target].primary_base_name.clone();
        let mut stack = vec![row];
        while let Some(current) = stack.pop() {
            for child in self.commits[current].children.clone() {
                let c = &self.commits[child];
                if !c.is_ambiguous || c.is_branch_set_by_user {
                    continue;
                }
                let listed = c.ambiguous_branch_names.iter().any(|n| {
                    *n == target_name
                        || self
                            .names
                            .get(n)
                            .is_some_and(|&b| self.branches[b].primary_base_name == target_base)
                });
                if !listed {
                    continue;
                }
                let c = &mut self.commits[child];
                c.branch = target;
                c.is_ambiguous = false;
                c.ambiguous_branch_names.clear();
                c.is_likely = true;
                c.resolution = Resolution::Repaired;
                stack.push(child);
            }
        }
    }

    // ---------------------------------------------------------------------------
    // Finishing
    // ---------------------------------------------------------------------------

    /// Compute tips and bottoms and drop synthetic branches that own nothing.
    fn finish(self, index: &HashMap<String, usize>) -> (Vec<Commit>, Vec<Branch>) {
        let Self {
            mut commits,
            mut branches,
            ..
        } = self;

        if let Some(stray) = commits.iter().find(|c| c.branch == UNASSIGNED) {
            warn!(commit = %stray.id, "commit left without a branch");
        }

        let mut owns = vec![false; branches.len()];
        for c in &commits {
            if let Some(o) = owns.get_mut(c.branch) {
                *o = true;
            }
        }
        let keep: Vec<bool> = branches
            .iter()
            .zip(&owns)
            .map(|(b, &owns)| b.is_git_branch || owns)
            .collect();
        if keep.contains(&false) {
            let mut remap = vec![UNASSIGNED; branches.len()];
            let mut next = 0;
            for (old, _) in keep.iter().enumerate().filter(|(_, k)| **k) {
                remap[old] = next;
                next += 1;
            }
            let mut kept = keep.iter();
            branches.retain(|_| kept.next().copied().unwrap_or(true));
            for c in &mut commits {
                c.branch = remap.get(c.branch).copied().unwrap_or(UNASSIGNED);
                c.candidates = c
                    .candidates
                    .iter()
                    .map(|&b| remap[b])
                    .filter(|&b| b != UNASSIGNED)
                    .collect();
            }
        }

        let mut newest: Vec<Option<usize>> = vec![None; branches.len()];
        let mut oldest: Vec<Option<usize>> = vec![None; branches.len()];
        for c in &commits {
            if let Some(slot) = newest.get_mut(c.branch) {
                slot.get_or_insert(c.row);
                oldest[c.branch] = Some(c.row);
            }
        }

        for (i, branch) in branches.iter_mut().enumerate() {
            let ref_tip = branch
                .is_git_branch
                .then(|| index.get(&branch.tip_id).copied())
                .flatten();
            let tip = match (ref_tip, newest[i]) {
                (Some(t), Some(o)) => t.min(o),
                (Some(t), None) => t,
                (None, Some(o)) => o,
                (None, None) => 0,
            };
            let bottom = oldest[i].map_or(tip, |o| o.max(tip));
            branch.tip = tip;
            branch.bottom = bottom;
            if !branch.is_git_branch
                && let Some(c) = commits.get(tip)
            {
                branch.tip_id.clone_from(&c.id);
            }
            if let Some(c) = commits.get(bottom) {
                branch.bottom_id.clone_from(&c.id);
            }
        }

        // Rows ascend, so the first ambiguous commit seen is the newest.
        for c in commits.iter().filter(|c| c.is_ambiguous) {
            if let Some(branch) = branches.get_mut(c.branch)
                && branch.ambiguous_tip_id.is_none()
            {
                branch.ambiguous_tip_id = Some(c.id.clone());
                branch.ambiguous_branch_names.clone_from(&c.ambiguous_branch_names);
            }
        }

        (commits, branches)
    }
}

fn push_unique(list: &mut Vec<usize>, value: usize) {
    if !list.contains(&value) {
        list.push(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{RawBranch, RawCommit, UNCOMMITTED_ID, WorkingStatus};

    fn commit(id: &str, parents: &[&str]) -> RawCommit {
        RawCommit {
            id: id.to_owned(),
            parents: parents.iter().map(|p| (*p).to_owned()).collect(),
            subject: format!("commit {id}"),
            ..RawCommit::default()
        }
    }

    fn branch(name: &str, tip: &str) -> RawBranch {
        RawBranch {
            name: name.to_owned(),
            tip_id: tip.to_owned(),
            ..RawBranch::default()
        }
    }

    #[test]
    fn every_commit_gets_exactly_one_branch() {
        let snapshot = Snapshot {
            commits: vec![
                commit("c1", &[]),
                commit("c2", &["c1"]),
                commit("f1", &["c1"]),
                commit("o1", &[]),
            ],
            branches: vec![branch("main", "c2"), branch("feature", "f1")],
            ..Snapshot::default()
        };
        let repo = augment(&snapshot, &AugmentOptions::default()).unwrap();
        for c in &repo.commits {
            assert!(c.branch < repo.branches.len(), "{}", c.id);
            assert_ne!(c.resolution, Resolution::Pending);
        }
    }

    #[test]
    fn tips_and_bottoms_span_owned_rows() {
        let snapshot = Snapshot {
            commits: vec![
                commit("c1", &[]),
                commit("c2", &["c1"]),
                commit("f1", &["c2"]),
                commit("f2", &["f1"]),
                commit("c3", &["c2"]),
            ],
            branches: vec![branch("main", "c3"), branch("feature", "f2")],
            ..Snapshot::default()
        };
        let repo = augment(&snapshot, &AugmentOptions::default()).unwrap();
        let feature = repo.branch("feature").unwrap();
        assert_eq!(feature.tip_id, "f2");
        assert_eq!(feature.bottom_id, "f1");
        let main = repo.branch("main").unwrap();
        assert_eq!(main.tip_id, "c3");
        assert_eq!(main.bottom_id, "c1");
        assert!(main.tip <= main.bottom);
    }

    #[test]
    fn pointer_only_branch_collapses_to_its_tip() {
        let snapshot = Snapshot {
            commits: vec![commit("c1", &[]), commit("c2", &["c1"])],
            branches: vec![branch("main", "c2"), branch("old", "c1")],
            ..Snapshot::default()
        };
        let repo = augment(&snapshot, &AugmentOptions::default()).unwrap();
        let old = repo.branch("old").unwrap();
        assert_eq!(repo.commits_of(repo.branch_index("old").unwrap()).count(), 0);
        assert_eq!(old.tip, old.bottom);
        assert_eq!(old.bottom_id, "c1");
    }

    #[test]
    fn synthesized_names_are_unique() {
        let snapshot = Snapshot {
            commits: vec![
                commit("c1", &[]),
                commit("c2", &["c1"]),
            ],
            branches: vec![branch("main", "c2")],
            ..Snapshot::default()
        };
        let arena = arena::build(&snapshot).unwrap();
        let priority = Vec::new();
        let mut inference = Inference::new(arena.commits, arena.branches, &priority);
        let a = inference.synthesize(Some("main"), 1);
        let b = inference.synthesize(Some("main"), 1);
        let c = inference.synthesize(None, 0);
        assert_eq!(inference.branches[a].name, "main@c1");
        assert_eq!(inference.branches[b].name, "main@c1-2");
        assert_eq!(inference.branches[c].name, "branch@c2");
        assert_eq!(inference.branches[a].primary_base_name, "main");
    }

    #[test]
    fn empty_synthetic_branches_are_dropped() {
        let snapshot = Snapshot {
            commits: vec![commit("c1", &[])],
            branches: vec![branch("main", "c1")],
            ..Snapshot::default()
        };
        let arena = arena::build(&snapshot).unwrap();
        let priority = Vec::new();
        let mut inference = Inference::new(arena.commits, arena.branches, &priority);
        inference.seed(&arena.index);
        let unused = inference.synthesize(Some("scratch"), 0);
        inference.run(&BTreeMap::new());
        assert_eq!(inference.branches[unused].name, "scratch");
        let (commits, branches) = inference.finish(&arena.index);
        assert_eq!(branches.len(), 1);
        assert_eq!(commits[0].branch, 0);
    }

    #[test]
    fn ambiguous_tip_is_recorded_on_branch() {
        let snapshot = Snapshot {
            commits: vec![commit("c1", &[]), commit("c2", &["c1"])],
            branches: vec![branch("a", "c2"), branch("b", "c2")],
            ..Snapshot::default()
        };
        let repo = augment(&snapshot, &AugmentOptions::default()).unwrap();
        let owner = repo.branch_of("c2").unwrap();
        assert_eq!(owner.ambiguous_tip_id.as_deref(), Some("c2"));
        assert_eq!(owner.ambiguous_branch_names, ["a", "b"]);
    }

    #[test]
    fn uncommitted_changes_join_current_branch() {
        let mut main = branch("main", "c1");
        main.is_current = true;
        let snapshot = Snapshot {
            commits: vec![commit("c1", &[])],
            branches: vec![main],
            status: WorkingStatus {
                added: 1,
                ..WorkingStatus::default()
            },
            ..Snapshot::default()
        };
        let repo = augment(&snapshot, &AugmentOptions::default()).unwrap();
        let main = repo.branch("main").unwrap();
        assert_eq!(main.tip_id, UNCOMMITTED_ID);
        assert_eq!(repo.branch_of(UNCOMMITTED_ID).unwrap().name, "main");
        assert_eq!(repo.branch_of("c1").unwrap().name, "main");
    }

    #[test]
    fn pin_to_unknown_name_creates_branch() {
        let mut pins = BTreeMap::new();
        pins.insert("c1".to_owned(), "archive".to_owned());
        let snapshot = Snapshot {
            commits: vec![commit("c1", &[]), commit("c2", &["c1"])],
            branches: vec![branch("main", "c2")],
            ..Snapshot::default()
        };
        let options = AugmentOptions {
            pins,
            ..AugmentOptions::default()
        };
        let repo = augment(&snapshot, &options).unwrap();
        let archive = repo.branch("archive").unwrap();
        assert!(!archive.is_git_branch);
        assert_eq!(archive.tip_id, "c1");
        assert_eq!(repo.commit("c1").unwrap().resolution, Resolution::UserPinned);
    }
}
