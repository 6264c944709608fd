//! The ordered branch-decision rules.
//!
//! Each rule pairs a precondition with a resolver. [`RULES`] is evaluated top
//! to bottom for every commit that is neither pinned nor unsupported, and the
//! first rule returning a [`Decision`] wins. The order is the tie-break
//! policy: reordering entries changes which branch owns ambiguous history.
//!
//! All rules look only at the commit's candidate set and at its children,
//! which were decided earlier in the pass.

use crate::model::{Resolution, short_id};

use super::Inference;
use super::subject::MergeSubject;

/// The outcome of a rule for one commit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Decision {
    pub branch: usize,
    pub resolution: Resolution,
    pub likely: bool,
    /// Candidate names when the decision is ambiguous.
    pub ambiguous: Option<Vec<String>>,
}

impl Decision {
    const fn certain(branch: usize, resolution: Resolution) -> Self {
        Self {
            branch,
            resolution,
            likely: true,
            ambiguous: None,
        }
    }

    /// Take over `child`'s branch together with its confidence and ambiguity.
    fn inherit(inf: &Inference<'_>, child: usize, resolution: Resolution) -> Self {
        let c = &inf.commits[child];
        Self {
            branch: c.branch,
            resolution,
            likely: c.is_likely,
            ambiguous: c
                .is_ambiguous
                .then(|| c.ambiguous_branch_names.clone()),
        }
    }
}

/// A predicate/resolver pair.
pub struct Rule {
    pub resolution: Resolution,
    pub resolve: fn(&mut Inference<'_>, usize) -> Option<Decision>,
}

/// The rule chain, in evaluation order.
pub const RULES: &[Rule] = &[
    Rule {
        resolution: Resolution::SingleCandidate,
        resolve: single_candidate,
    },
    Rule {
        resolution: Resolution::LocalRemotePair,
        resolve: local_remote_pair,
    },
    Rule {
        resolution: Resolution::Backbone,
        resolve: backbone,
    },
    Rule {
        resolution: Resolution::TwoChildrenSameBranch,
        resolve: two_children_same_branch,
    },
    Rule {
        resolution: Resolution::DeletedBranchMergeTip,
        resolve: deleted_branch_merge_tip,
    },
    Rule {
        resolution: Resolution::Orphan,
        resolve: orphan,
    },
    Rule {
        resolution: Resolution::SingleChild,
        resolve: single_child,
    },
    Rule {
        resolution: Resolution::LikelyOnlyChild,
        resolve: likely_only_child,
    },
    Rule {
        resolution: Resolution::PriorityBranch,
        resolve: priority_branch,
    },
    Rule {
        resolution: Resolution::SubjectName,
        resolve: subject_name,
    },
    Rule {
        resolution: Resolution::Continuation,
        resolve: continuation,
    },
    Rule {
        resolution: Resolution::LikelyChild,
        resolve: likely_child,
    },
    Rule {
        resolution: Resolution::AmbiguousChild,
        resolve: ambiguous_child,
    },
    Rule {
        resolution: Resolution::Ambiguous,
        resolve: fallback,
    },
];

/// Run the chain for `row`.
pub fn decide(inf: &mut Inference<'_>, row: usize) -> Decision {
    for rule in RULES {
        if let Some(decision) = (rule.resolve)(inf, row) {
            debug_assert_eq!(decision.resolution, rule.resolution);
            return decision;
        }
    }
    // `fallback` always decides; this only guards against a reordered table.
    let branch = inf.synthesize(None, row);
    Decision::certain(branch, Resolution::Orphan)
}

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

/// 1. Exactly one candidate branch.
fn single_candidate(inf: &mut Inference<'_>, row: usize) -> Option<Decision> {
    match inf.commits[row].candidates.as_slice() {
        [only] => Some(Decision::certain(*only, Resolution::SingleCandidate)),
        _ => None,
    }
}

/// 2. Two candidates forming a local/remote pair: the remote wins.
fn local_remote_pair(inf: &mut Inference<'_>, row: usize) -> Option<Decision> {
    let &[a, b] = inf.commits[row].candidates.as_slice() else {
        return None;
    };
    if !inf.branches[a].is_counterpart_of(&inf.branches[b]) {
        return None;
    }
    let remote = if inf.branches[a].is_remote { a } else { b };
    Some(Decision::certain(remote, Resolution::LocalRemotePair))
}

/// Backbone: a first-parent child on a priority branch pulls its parent onto
/// the same branch, overriding every later rule.
fn backbone(inf: &mut Inference<'_>, row: usize) -> Option<Decision> {
    let branch = inf.backbone[row]?;
    inf.commits[row]
        .candidates
        .contains(&branch)
        .then(|| Decision::certain(branch, Resolution::Backbone))
}

/// 3. No candidates; exactly two children sharing one branch.
fn two_children_same_branch(inf: &mut Inference<'_>, row: usize) -> Option<Decision> {
    let c = &inf.commits[row];
    if !c.candidates.is_empty() {
        return None;
    }
    let &[a, b] = c.children.as_slice() else {
        return None;
    };
    let (ca, cb) = (&inf.commits[a], &inf.commits[b]);
    if ca.branch != cb.branch {
        return None;
    }
    let ambiguous = (ca.is_ambiguous || cb.is_ambiguous).then(|| {
        let mut names = ca.ambiguous_branch_names.clone();
        for name in &cb.ambiguous_branch_names {
            if !names.contains(name) {
                names.push(name.clone());
            }
        }
        names
    });
    Some(Decision {
        branch: ca.branch,
        resolution: Resolution::TwoChildrenSameBranch,
        likely: ca.is_likely || cb.is_likely,
        ambiguous,
    })
}

/// 4. No candidates, no children, one merge child: the tip of a deleted
/// branch that was merged. Named from the merge subject when possible.
fn deleted_branch_merge_tip(inf: &mut Inference<'_>, row: usize) -> Option<Decision> {
    let c = &inf.commits[row];
    if !c.candidates.is_empty() || !c.children.is_empty() {
        return None;
    }
    let &[merge_child] = c.merge_children.as_slice() else {
        return None;
    };

    let m = &inf.commits[merge_child];
    let merged_into = m.branch;
    if m.is_pull_merge {
        let name = format!(
            "{}@{}",
            inf.branches[merged_into].primary_base_name,
            short_id(&inf.commits[row].id)
        );
        let branch = inf.synthesize(Some(&name), row);
        inf.branches[branch].is_pull_merge_part = true;
        return Some(Decision::certain(branch, Resolution::DeletedBranchMergeTip));
    }

    let parsed = MergeSubject::parse(&m.subject).map(|s| s.from_local().to_owned());
    if let Some(name) = &parsed {
        let target = &inf.branches[merged_into];
        if target.name == *name || target.primary_base_name == *name {
            return Some(Decision::certain(
                merged_into,
                Resolution::DeletedBranchMergeTip,
            ));
        }
    }
    let likely = parsed.is_some();
    let branch = inf.synthesize(parsed.as_deref(), row);
    Some(Decision {
        likely,
        ..Decision::certain(branch, Resolution::DeletedBranchMergeTip)
    })
}

/// 5. No candidates and no children at all: a fresh synthetic branch.
fn orphan(inf: &mut Inference<'_>, row: usize) -> Option<Decision> {
    let c = &inf.commits[row];
    if !c.candidates.is_empty() || !c.children.is_empty() {
        return None;
    }
    let parsed = c
        .merge_children
        .iter()
        .find_map(|&m| MergeSubject::parse(&inf.commits[m].subject))
        .map(|s| s.from_local().to_owned());
    let likely = parsed.is_some();
    let branch = inf.synthesize(parsed.as_deref(), row);
    Some(Decision {
        likely,
        ..Decision::certain(branch, Resolution::Orphan)
    })
}

/// 6. No candidates, exactly one child: continue the child's branch.
fn single_child(inf: &mut Inference<'_>, row: usize) -> Option<Decision> {
    let c = &inf.commits[row];
    if !c.candidates.is_empty() {
        return None;
    }
    match c.children.as_slice() {
        [child] => Some(Decision::inherit(inf, *child, Resolution::SingleChild)),
        _ => None,
    }
}

/// 7. Exactly one child, and that child is likely.
fn likely_only_child(inf: &mut Inference<'_>, row: usize) -> Option<Decision> {
    match inf.commits[row].children.as_slice() {
        [child] if inf.commits[*child].is_likely => {
            Some(Decision::inherit(inf, *child, Resolution::LikelyOnlyChild))
        }
        _ => None,
    }
}

/// 8. Several candidates, one on the priority list (best rank wins).
fn priority_branch(inf: &mut Inference<'_>, row: usize) -> Option<Decision> {
    let candidates = &inf.commits[row].candidates;
    if candidates.len() < 2 {
        return None;
    }
    candidates
        .iter()
        .filter_map(|&b| inf.priority_rank(b).map(|rank| (rank, b)))
        .min()
        .map(|(_, b)| Decision::certain(b, Resolution::PriorityBranch))
}

/// 9. The commit's own subject names its branch. Adopts or synthesizes that
/// branch, then repairs ambiguous guesses above it.
fn subject_name(inf: &mut Inference<'_>, row: usize) -> Option<Decision> {
    let subject = MergeSubject::parse(&inf.commits[row].subject)?;
    let name = subject.own_branch()?.to_owned();

    let matching: Vec<usize> = inf.commits[row]
        .candidates
        .iter()
        .copied()
        .filter(|&b| {
            let branch = &inf.branches[b];
            branch.name == name || branch.primary_base_name == name
        })
        .collect();
    let target = matching
        .iter()
        .copied()
        .find(|&b| inf.branches[b].is_remote)
        .or_else(|| matching.first().copied())
        .or_else(|| inf.synthetic_named(&name))
        .unwrap_or_else(|| inf.synthesize(Some(&name), row));

    inf.repair_upward(row, target);
    Some(Decision::certain(target, Resolution::SubjectName))
}

/// 10. Exactly one child, no merge children, identical candidate sets.
fn continuation(inf: &mut Inference<'_>, row: usize) -> Option<Decision> {
    let c = &inf.commits[row];
    let &[child] = c.children.as_slice() else {
        return None;
    };
    if !c.merge_children.is_empty() {
        return None;
    }
    let theirs = &inf.commits[child].candidates;
    let same = theirs.len() == c.candidates.len() && theirs.iter().all(|b| c.candidates.contains(b));
    same.then(|| Decision::inherit(inf, child, Resolution::Continuation))
}

/// 11. Several children, exactly one of them likely.
fn likely_child(inf: &mut Inference<'_>, row: usize) -> Option<Decision> {
    let children = &inf.commits[row].children;
    if children.len() < 2 {
        return None;
    }
    let mut likely = children.iter().filter(|&&c| inf.commits[c].is_likely);
    match (likely.next(), likely.next()) {
        (Some(&child), None) => Some(Decision {
            branch: inf.commits[child].branch,
            resolution: Resolution::LikelyChild,
            likely: true,
            ambiguous: None,
        }),
        _ => None,
    }
}

/// 12. A child is ambiguous: inherit its branch and its ambiguity.
fn ambiguous_child(inf: &mut Inference<'_>, row: usize) -> Option<Decision> {
    let c = &inf.commits[row];
    let child = c
        .children
        .iter()
        .copied()
        .find(|&ch| inf.commits[ch].is_ambiguous)?;
    let mut names = inf.commits[child].ambiguous_branch_names.clone();
    for &b in &c.candidates {
        let name = &inf.branches[b].name;
        if !names.contains(name) {
            names.push(name.clone());
        }
    }
    Some(Decision {
        branch: inf.commits[child].branch,
        resolution: Resolution::AmbiguousChild,
        likely: false,
        ambiguous: Some(names),
    })
}

/// 13. Genuine ambiguity. Displays the most likely candidate and records all
/// of them for the user to resolve.
fn fallback(inf: &mut Inference<'_>, row: usize) -> Option<Decision> {
    let c = &inf.commits[row];
    let mut pool = c.candidates.clone();
    for &child in &c.children {
        let b = inf.commits[child].branch;
        if !pool.contains(&b) {
            pool.push(b);
        }
    }
    let first = *pool.first()?;

    let chosen = if c.children.is_empty() {
        pool.iter()
            .copied()
            .find(|&b| inf.branches[b].is_remote)
            .unwrap_or(first)
    } else if let Some(&child) = c.children.iter().find(|&&ch| inf.commits[ch].is_likely) {
        inf.commits[child].branch
    } else {
        let newest = c
            .children
            .iter()
            .copied()
            .reduce(|best, ch| {
                if inf.commits[ch].author_time > inf.commits[best].author_time {
                    ch
                } else {
                    best
                }
            })
            .unwrap_or(c.children[0]);
        inf.commits[newest].branch
    };

    let ambiguous = (pool.len() > 1).then(|| {
        pool.iter()
            .map(|&b| inf.branches[b].name.clone())
            .collect()
    });
    Some(Decision {
        branch: chosen,
        resolution: Resolution::Ambiguous,
        likely: false,
        ambiguous,
    })
}
