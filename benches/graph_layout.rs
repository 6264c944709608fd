//! Inference and layout benchmarks.
//!
//! A synthetic history: a main line with a feature branch forking off every
//! few commits, half of them merged back with git's default merge subject.
//! Some features are deleted after merging so their commits have no ref.
//!
//! # Running
//!
//! ```bash
//! cargo bench --bench graph_layout
//! # Only the largest history:
//! cargo bench --bench graph_layout -- 20000
//! ```

use std::collections::BTreeMap;
use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};

use gitlane::augment::{AugmentOptions, augment};
use gitlane::color::BranchColors;
use gitlane::config::Theme;
use gitlane::graph::{Graph, LayoutOptions};
use gitlane::model::{RawBranch, RawCommit, Snapshot};
use gitlane::render::row_text;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const FEATURE_LEN: usize = 3;
const FORK_EVERY: usize = 8;

/// A history of roughly `n` commits, oldest first.
fn history(n: usize) -> Snapshot {
    let mut commits: Vec<RawCommit> = Vec::with_capacity(n);
    let mut branches = Vec::new();
    let mut main_tip: Option<String> = None;
    let mut feature = 0;

    let push = |commits: &mut Vec<RawCommit>, parents: Vec<String>, subject: String| {
        let id = format!("{:040x}", commits.len());
        commits.push(RawCommit {
            id: id.clone(),
            parents,
            subject,
            author_time: commits.len() as i64,
            ..RawCommit::default()
        });
        id
    };

    while commits.len() < n {
        let parents = main_tip.iter().cloned().collect();
        let id = push(&mut commits, parents, "work on main".to_owned());
        main_tip = Some(id.clone());

        if commits.len() % FORK_EVERY != 0 {
            continue;
        }
        feature += 1;
        let name = format!("feature-{feature}");
        let mut tip = id;
        for _ in 0..FEATURE_LEN {
            tip = push(&mut commits, vec![tip], format!("work on {name}"));
        }
        if feature % 2 == 0 {
            let base = main_tip.clone().unwrap_or_default();
            let merge = push(
                &mut commits,
                vec![base, tip.clone()],
                format!("Merge branch '{name}'"),
            );
            main_tip = Some(merge);
            if feature % 4 == 0 {
                continue;
            }
        }
        branches.push(RawBranch {
            name,
            tip_id: tip,
            ..RawBranch::default()
        });
    }

    branches.push(RawBranch {
        name: "main".to_owned(),
        tip_id: main_tip.unwrap_or_default(),
        is_current: true,
        ..RawBranch::default()
    });
    Snapshot {
        commits,
        branches,
        ..Snapshot::default()
    }
}

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

const SIZES: &[usize] = &[1_000, 5_000, 20_000];

fn bench_augment(c: &mut Criterion) {
    let mut group = c.benchmark_group("augment");
    let options = AugmentOptions::default();
    for &n in SIZES {
        let snapshot = history(n);
        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::new("commits", n), &snapshot, |b, s| {
            b.iter(|| augment(black_box(s), &options));
        });
    }
    group.finish();
}

fn bench_layout(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout");
    let theme = Theme::default();
    let overrides = BTreeMap::new();
    let colors = BranchColors::new(&theme, &overrides);
    let layout = LayoutOptions::default();
    for &n in SIZES {
        let Ok(repo) = augment(&history(n), &AugmentOptions::default()) else {
            continue;
        };
        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::new("commits", n), &repo, |b, r| {
            b.iter(|| Graph::build(black_box(r), &colors, &layout));
        });
    }
    group.finish();
}

/// Full refresh: inference, layout and rendering one screen of rows.
fn bench_refresh(c: &mut Criterion) {
    let mut group = c.benchmark_group("refresh");
    group.sample_size(20);
    let theme = Theme::default();
    let overrides = BTreeMap::new();
    let colors = BranchColors::new(&theme, &overrides);
    let snapshot = history(20_000);
    group.throughput(Throughput::Elements(20_000));
    group.bench_function("20000", |b| {
        b.iter(|| {
            let Ok(repo) = augment(black_box(&snapshot), &AugmentOptions::default()) else {
                return 0;
            };
            let graph = Graph::build(&repo, &colors, &LayoutOptions::default());
            (0..graph.height().min(60))
                .map(|row| row_text(&graph, row).len())
                .sum::<usize>()
        });
    });
    group.finish();
}

// ---------------------------------------------------------------------------
// Registration
// ---------------------------------------------------------------------------

criterion_group!(benches, bench_augment, bench_layout, bench_refresh);
criterion_main!(benches);
