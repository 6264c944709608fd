//! Shared helpers for gitlane integration tests.
//!
//! Snapshots are built in memory; nothing touches a real repository.

#![allow(dead_code)]

use std::collections::BTreeMap;

use gitlane::augment::{AugmentOptions, augment};
use gitlane::color::BranchColors;
use gitlane::config::Theme;
use gitlane::graph::{Graph, LayoutOptions};
use gitlane::model::{RawBranch, RawCommit, Repo, Snapshot};
use gitlane::render::row_text;

/// Builds a [`Snapshot`] commit by commit, oldest first.
#[derive(Default)]
pub struct SnapshotBuilder {
    snapshot: Snapshot,
}

impl SnapshotBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a commit with a generated subject.
    pub fn commit(self, id: &str, parents: &[&str]) -> Self {
        let subject = format!("commit {id}");
        self.commit_with(id, parents, &subject)
    }

    /// Add a commit with an explicit subject.
    pub fn commit_with(mut self, id: &str, parents: &[&str], subject: &str) -> Self {
        let time = i64::try_from(self.snapshot.commits.len()).unwrap_or(i64::MAX);
        self.snapshot.commits.push(RawCommit {
            id: id.to_owned(),
            parents: parents.iter().map(|p| (*p).to_owned()).collect(),
            subject: subject.to_owned(),
            message: subject.to_owned(),
            author: "Test Author".to_owned(),
            author_time: 1_700_000_000 + time * 60,
            refs: Vec::new(),
        });
        self
    }

    /// Add a local branch ref.
    pub fn local(mut self, name: &str, tip: &str) -> Self {
        self.snapshot.branches.push(RawBranch {
            name: name.to_owned(),
            tip_id: tip.to_owned(),
            ..RawBranch::default()
        });
        self
    }

    /// Add a remote branch ref.
    pub fn remote(mut self, name: &str, tip: &str) -> Self {
        self.snapshot.branches.push(RawBranch {
            name: name.to_owned(),
            tip_id: tip.to_owned(),
            is_remote: true,
            ..RawBranch::default()
        });
        self
    }

    /// Mark the most recently added ref as checked out.
    pub fn current(mut self) -> Self {
        if let Some(b) = self.snapshot.branches.last_mut() {
            b.is_current = true;
        }
        self
    }

    pub fn build(self) -> Snapshot {
        self.snapshot
    }
}

/// Augment with default options.
pub fn infer(snapshot: &Snapshot) -> Repo {
    augment(snapshot, &AugmentOptions::default()).unwrap()
}

/// Augment with pins.
pub fn infer_pinned(snapshot: &Snapshot, pins: &[(&str, &str)]) -> Repo {
    let options = AugmentOptions {
        pins: pins
            .iter()
            .map(|(c, b)| ((*c).to_owned(), (*b).to_owned()))
            .collect(),
        ..AugmentOptions::default()
    };
    augment(snapshot, &options).unwrap()
}

/// Lay out with the default theme and no overrides.
pub fn layout(repo: &Repo, options: &LayoutOptions) -> Graph {
    let theme = Theme::default();
    let overrides = BTreeMap::new();
    Graph::build(repo, &BranchColors::new(&theme, &overrides), options)
}

/// Name of the branch owning commit `id`.
pub fn owner<'a>(repo: &'a Repo, id: &str) -> &'a str {
    &repo.branch_of(id).unwrap().name
}

/// Every view row as plain text.
pub fn rendered(graph: &Graph) -> Vec<String> {
    (0..graph.height()).map(|r| row_text(graph, r)).collect()
}
