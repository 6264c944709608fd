//! Commands that change persisted per-repository settings.

use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::Args;
use gitlane::model::Repo;
use tracing::info;

use super::{Paths, Session};

/// Cycle a branch's color
#[derive(Args, Debug)]
pub struct ColorArgs {
    /// Snapshot JSON file
    pub snapshot: PathBuf,
    /// Branch name
    pub branch: String,
}

/// Assign a commit to a branch
#[derive(Args, Debug)]
pub struct PinArgs {
    /// Snapshot JSON file
    pub snapshot: PathBuf,
    /// Commit id or unique prefix
    pub commit: String,
    /// Branch name; an unknown name creates a new branch
    pub branch: String,
}

/// Remove a manual assignment
#[derive(Args, Debug)]
pub struct UnpinArgs {
    /// Snapshot JSON file
    pub snapshot: PathBuf,
    /// Commit id or unique prefix
    pub commit: String,
}

/// Store an ordering nudge
#[derive(Args, Debug)]
pub struct OrderArgs {
    /// Snapshot JSON file
    pub snapshot: PathBuf,
    /// Branch laid out first
    pub left: String,
    /// Branch laid out after `left`
    pub right: String,
}

pub fn color(paths: &Paths, args: &ColorArgs) -> Result<()> {
    let mut session = Session::load(paths, &args.snapshot)?;
    let b = session.branch_index(&args.branch)?;
    let next = session.colors().next_override(&session.repo, b);
    let base = session.repo.branches[b].primary_base_name.clone();
    session.settings.colors.insert(base.clone(), next);
    info!(branch = %args.branch, base = %base, index = next, "color override set");
    println!("{base}: palette[{next}]");
    session.save(paths)
}

pub fn pin(paths: &Paths, args: &PinArgs) -> Result<()> {
    let mut session = Session::load(paths, &args.snapshot)?;
    let id = resolve_commit(&session.repo, &args.commit)?;
    session.settings.pins.insert(id.clone(), args.branch.clone());
    println!("{} → {}", short(&id), args.branch);
    session.save(paths)
}

pub fn unpin(paths: &Paths, args: &UnpinArgs) -> Result<()> {
    let mut session = Session::load(paths, &args.snapshot)?;
    let id = match resolve_commit(&session.repo, &args.commit) {
        Ok(id) => id,
        // The commit may have left the loaded window; match stored pins.
        Err(_) => args.commit.clone(),
    };
    if session.settings.pins.remove(&id).is_none() {
        bail!("Commit '{}' is not pinned", args.commit);
    }
    println!("{} unpinned", short(&id));
    session.save(paths)
}

pub fn order(paths: &Paths, args: &OrderArgs) -> Result<()> {
    let mut session = Session::load(paths, &args.snapshot)?;
    session.branch_index(&args.left)?;
    session.branch_index(&args.right)?;
    if args.left == args.right {
        bail!("Cannot order '{}' against itself", args.left);
    }
    session.settings.set_order(&args.left, &args.right);
    println!("{} before {}", args.left, args.right);
    session.save(paths)
}

fn short(id: &str) -> &str {
    gitlane::model::short_id(id)
}

/// The full id of the commit matching `prefix`, which must be unique.
fn resolve_commit(repo: &Repo, prefix: &str) -> Result<String> {
    if repo.commit(prefix).is_some() {
        return Ok(prefix.to_owned());
    }
    let matches: Vec<&str> = repo
        .commits
        .iter()
        .filter(|c| c.id.starts_with(prefix))
        .map(|c| c.id.as_str())
        .collect();
    match matches.as_slice() {
        [id] => Ok((*id).to_owned()),
        [] => bail!("No commit matches '{prefix}'"),
        _ => bail!("Commit prefix '{prefix}' is ambiguous ({} matches)", matches.len()),
    }
}

#[cfg(test)]
mod tests {
    use gitlane::augment::{AugmentOptions, augment};
    use gitlane::model::{RawBranch, RawCommit, Snapshot};

    use super::*;

    fn repo() -> Repo {
        let commit = |id: &str, parents: &[&str]| RawCommit {
            id: id.to_owned(),
            parents: parents.iter().map(|p| (*p).to_owned()).collect(),
            ..RawCommit::default()
        };
        let snapshot = Snapshot {
            commits: vec![
                commit("aaa111", &[]),
                commit("aab222", &["aaa111"]),
                commit("bbb333", &["aab222"]),
            ],
            branches: vec![RawBranch {
                name: "main".to_owned(),
                tip_id: "bbb333".to_owned(),
                ..RawBranch::default()
            }],
            ..Snapshot::default()
        };
        augment(&snapshot, &AugmentOptions::default()).unwrap()
    }

    #[test]
    fn resolves_unique_prefix() {
        let repo = repo();
        assert_eq!(resolve_commit(&repo, "bbb").unwrap(), "bbb333");
        assert_eq!(resolve_commit(&repo, "aab222").unwrap(), "aab222");
    }

    #[test]
    fn rejects_ambiguous_or_unknown_prefix() {
        let repo = repo();
        let err = resolve_commit(&repo, "aa").unwrap_err();
        assert!(err.to_string().contains("ambiguous"));
        assert!(resolve_commit(&repo, "zzz").is_err());
    }
}
