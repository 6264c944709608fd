//! CLI subcommands.
//!
//! Every command reads the same inputs: the config file, the state file and
//! one snapshot. [`Session`] loads them and runs inference once.

pub mod branches;
pub mod graph;
pub mod settings;

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use gitlane::augment::{AugmentOptions, augment};
use gitlane::color::BranchColors;
use gitlane::config::{GraphConfig, Theme};
use gitlane::graph::{Graph, LayoutOptions};
use gitlane::model::{Repo, Snapshot};
use gitlane::state::{RepoSettings, StateStore};
use tracing::debug;

/// File locations shared by all commands.
pub struct Paths {
    pub config: PathBuf,
    pub state: PathBuf,
}

/// Loaded inputs and the augmented repository.
pub struct Session {
    pub theme: Theme,
    pub store: StateStore,
    pub settings: RepoSettings,
    pub repo: Repo,
}

impl Session {
    pub fn load(paths: &Paths, snapshot: &Path) -> Result<Self> {
        let config = GraphConfig::load(&paths.config)?;
        let theme = config.theme()?;
        let store = StateStore::load(&paths.state)?;

        let text = fs::read_to_string(snapshot)
            .with_context(|| format!("Failed to read snapshot {}", snapshot.display()))?;
        let snapshot = Snapshot::from_json(&text)
            .with_context(|| format!("Failed to parse snapshot {}", snapshot.display()))?;

        let settings = store.repo(&snapshot.repo_path);
        let options = AugmentOptions {
            priority: config.branches.priority,
            pins: settings.pins.clone(),
        };
        let repo = augment(&snapshot, &options).context("Failed to infer branches")?;
        debug!(
            repo = %repo.repo_path,
            commits = repo.commits.len(),
            branches = repo.branches.len(),
            "session loaded"
        );

        Ok(Self {
            theme,
            store,
            settings,
            repo,
        })
    }

    pub fn colors(&self) -> BranchColors<'_> {
        BranchColors::new(&self.theme, &self.settings.colors)
    }

    /// Lay out the repo, restricted to `shown` when it is non-empty.
    pub fn graph(&self, shown: &[String]) -> Graph {
        let options = LayoutOptions {
            shown: (!shown.is_empty()).then(|| shown.iter().cloned().collect::<BTreeSet<_>>()),
            orders: self.settings.orders.clone(),
        };
        Graph::build(&self.repo, &self.colors(), &options)
    }

    /// Index of the branch named `name`, or an error listing what exists.
    pub fn branch_index(&self, name: &str) -> Result<usize> {
        self.repo.branch_index(name).with_context(|| {
            let known: Vec<&str> = self.repo.branches.iter().map(|b| b.name.as_str()).collect();
            format!("Unknown branch '{name}'. Known branches: {}", known.join(", "))
        })
    }

    /// Store `settings` back under this repo and write the state file.
    pub fn save(mut self, paths: &Paths) -> Result<()> {
        *self.store.repo_mut(&self.repo.repo_path) = self.settings;
        self.store.prune();
        self.store
            .save(&paths.state)
            .with_context(|| format!("Failed to save state to {}", paths.state.display()))
    }
}
