//! Property tests over random commit DAGs.
//!
//! Histories are generated oldest first, so every parent index is smaller
//! than its child's. Refs come from a fixed pool of local and remote names
//! and land on random commits; merge subjects are drawn from a small set so
//! the subject-driven rules get exercised too.

#![allow(clippy::all, clippy::pedantic, clippy::nursery)]

use std::collections::BTreeMap;

use gitlane::augment::{AugmentOptions, augment};
use gitlane::color::{BranchColors, ColorSlot};
use gitlane::config::Theme;
use gitlane::graph::{Graph, LayoutOptions};
use gitlane::graph::layout::overlaps;
use gitlane::model::{RawBranch, RawCommit, Repo, Snapshot};
use gitlane::render::{PLACEHOLDER, row_text};
use proptest::prelude::*;

// ---------------------------------------------------------------------------
// Generators
// ---------------------------------------------------------------------------

const REF_POOL: &[(&str, bool)] = &[
    ("main", false),
    ("origin/main", true),
    ("feature", false),
    ("origin/feature", true),
    ("topic", false),
    ("release", false),
    ("origin/hotfix", true),
];

const SUBJECTS: &[&str] = &[
    "work",
    "Merge branch 'feature' into main",
    "Merge branch 'gone'",
    "Merge branch 'topic' into release",
    "Merge remote-tracking branch 'origin/main' into main",
    "Merge pull request #7 from someone/feature",
];

/// Per commit: whether it has a first parent, its distance back, an optional
/// merge distance and a subject index.
type CommitShape = (bool, usize, Option<usize>, usize);

fn shapes() -> impl Strategy<Value = Vec<CommitShape>> {
    prop::collection::vec(
        (
            prop::bool::weighted(0.95),
            1usize..6,
            prop::option::weighted(0.2, 1usize..12),
            0..SUBJECTS.len(),
        ),
        1..60,
    )
}

fn ref_tips() -> impl Strategy<Value = Vec<Option<usize>>> {
    prop::collection::vec(prop::option::weighted(0.6, 0usize..1000), REF_POOL.len())
}

fn snapshot(shapes: &[CommitShape], tips: &[Option<usize>]) -> Snapshot {
    let id = |i: usize| format!("{i:040x}");
    let commits = shapes
        .iter()
        .enumerate()
        .map(|(i, &(has_parent, back, merge, subject))| {
            let mut parents = Vec::new();
            if has_parent && i > 0 {
                let first = i.saturating_sub(back);
                parents.push(id(first));
                if let Some(m) = merge {
                    let second = i.saturating_sub(m);
                    if second != first && second < i {
                        parents.push(id(second));
                    }
                }
            }
            let subject = if parents.len() == 2 { SUBJECTS[subject] } else { "work" };
            RawCommit {
                id: id(i),
                parents,
                subject: subject.to_owned(),
                author_time: i as i64,
                ..RawCommit::default()
            }
        })
        .collect();
    let branches = REF_POOL
        .iter()
        .zip(tips)
        .filter_map(|(&(name, is_remote), tip)| {
            tip.map(|t| RawBranch {
                name: name.to_owned(),
                tip_id: id(t % shapes.len()),
                is_remote,
                ..RawBranch::default()
            })
        })
        .collect();
    Snapshot {
        commits,
        branches,
        ..Snapshot::default()
    }
}

fn build(snapshot: &Snapshot) -> (Repo, Graph) {
    let repo = augment(snapshot, &AugmentOptions::default()).unwrap();
    let theme = Theme::default();
    let overrides = BTreeMap::new();
    let graph = Graph::build(
        &repo,
        &BranchColors::new(&theme, &overrides),
        &LayoutOptions::default(),
    );
    (repo, graph)
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn every_commit_has_exactly_one_branch(shapes in shapes(), tips in ref_tips()) {
        let (repo, _) = build(&snapshot(&shapes, &tips));
        prop_assert_eq!(repo.commits.len(), shapes.len());
        for c in &repo.commits {
            prop_assert!(c.branch < repo.branches.len(), "{} unassigned", c.id);
        }
    }

    #[test]
    fn exactly_one_root_and_it_is_main(shapes in shapes(), tips in ref_tips()) {
        let (repo, _) = build(&snapshot(&shapes, &tips));
        let roots: Vec<usize> = (0..repo.branches.len())
            .filter(|&b| repo.branches[b].parent.is_none())
            .collect();
        prop_assert_eq!(roots.len(), 1);
        prop_assert!(repo.branches[roots[0]].is_main);
    }

    #[test]
    fn tips_precede_bottoms(shapes in shapes(), tips in ref_tips()) {
        let (repo, graph) = build(&snapshot(&shapes, &tips));
        for b in &repo.branches {
            prop_assert!(b.tip <= b.bottom, "{}", b.name);
        }
        for b in graph.branches() {
            prop_assert!(b.tip <= b.bottom && b.bottom < graph.height(), "{}", b.name);
        }
    }

    #[test]
    fn branches_sharing_a_column_never_overlap(shapes in shapes(), tips in ref_tips()) {
        let (_, graph) = build(&snapshot(&shapes, &tips));
        let placed = graph.branches();
        for (i, a) in placed.iter().enumerate() {
            for b in &placed[i + 1..] {
                if a.x == b.x {
                    prop_assert!(
                        !overlaps((a.tip, a.bottom), (b.tip, b.bottom)),
                        "{} and {} collide in column {}", a.name, b.name, a.x
                    );
                }
            }
        }
    }

    #[test]
    fn colors_are_stable_and_differ_from_parent(shapes in shapes(), tips in ref_tips()) {
        let (repo, _) = build(&snapshot(&shapes, &tips));
        let theme = Theme::default();
        let overrides = BTreeMap::new();
        let colors = BranchColors::new(&theme, &overrides);
        let first = colors.slots(&repo);
        prop_assert_eq!(&first, &colors.slots(&repo));
        for (b, branch) in repo.branches.iter().enumerate() {
            // The main pair shares the main color by construction.
            if branch.is_main {
                prop_assert_eq!(first[b], ColorSlot::Main);
                continue;
            }
            if let Some(p) = branch.parent {
                prop_assert_ne!(first[b], first[p], "{} matches its parent", branch.name);
            }
        }
    }

    #[test]
    fn inference_is_deterministic(shapes in shapes(), tips in ref_tips()) {
        let snapshot = snapshot(&shapes, &tips);
        let (a, ga) = build(&snapshot);
        let (b, gb) = build(&snapshot);
        let owners = |r: &Repo| -> Vec<String> {
            r.commits.iter().map(|c| r.branches[c.branch].name.clone()).collect()
        };
        prop_assert_eq!(owners(&a), owners(&b));
        prop_assert_eq!(ga.branches(), gb.branches());
    }

    #[test]
    fn engine_built_graphs_never_render_placeholders(shapes in shapes(), tips in ref_tips()) {
        let (_, graph) = build(&snapshot(&shapes, &tips));
        for row in 0..graph.height() {
            let text = row_text(&graph, row);
            prop_assert!(!text.contains(PLACEHOLDER), "row {}: {:?}", row, text);
            prop_assert_eq!(text.chars().count(), graph.width() * 2);
        }
    }
}
