use std::fmt::Write as _;
use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use gitlane::graph::Graph;
use gitlane::model::Repo;
use gitlane::render::row_text;

use super::{Paths, Session};

/// Print the commit graph
#[derive(Args, Debug)]
pub struct GraphArgs {
    /// Snapshot JSON file
    pub snapshot: PathBuf,

    /// Only draw these branches (plus their ancestors and the root)
    #[arg(long = "show", value_name = "NAME")]
    pub show: Vec<String>,
}

pub fn run(paths: &Paths, args: &GraphArgs) -> Result<()> {
    let session = Session::load(paths, &args.snapshot)?;
    let graph = session.graph(&args.show);
    print!("{}", render(&session.repo, &graph));
    Ok(())
}

/// One line per view row: graph, short id, ref labels, ambiguity marker and
/// subject.
fn render(repo: &Repo, graph: &Graph) -> String {
    let mut out = String::new();
    for row in 0..graph.height() {
        let Some(commit) = graph.commit_row(row).map(|r| &repo.commits[r]) else {
            continue;
        };
        let _ = write!(out, "{} {}", row_text(graph, row), commit.short_id());

        let labels: Vec<&str> = repo
            .branches
            .iter()
            .filter(|b| b.is_git_branch && b.tip_id == commit.id)
            .map(|b| b.name.as_str())
            .chain(commit.refs.iter().map(String::as_str))
            .collect();
        if !labels.is_empty() {
            let _ = write!(out, " ({})", labels.join(", "));
        }
        if commit.is_ambiguous {
            let _ = write!(out, " ?[{}]", commit.ambiguous_branch_names.join("|"));
        }
        let _ = writeln!(out, " {}", commit.subject);
    }
    out
}

#[cfg(test)]
mod tests {
    use gitlane::augment::{AugmentOptions, augment};
    use gitlane::color::BranchColors;
    use gitlane::config::Theme;
    use gitlane::graph::LayoutOptions;
    use gitlane::model::{RawBranch, RawCommit, Snapshot};

    use super::*;

    #[test]
    fn rows_carry_labels_and_subjects() {
        let commit = |id: &str, parents: &[&str], subject: &str| RawCommit {
            id: id.to_owned(),
            parents: parents.iter().map(|p| (*p).to_owned()).collect(),
            subject: subject.to_owned(),
            ..RawCommit::default()
        };
        let snapshot = Snapshot {
            commits: vec![commit("c1", &[], "init"), commit("c2", &["c1"], "more")],
            branches: vec![RawBranch {
                name: "main".to_owned(),
                tip_id: "c2".to_owned(),
                ..RawBranch::default()
            }],
            ..Snapshot::default()
        };
        let repo = augment(&snapshot, &AugmentOptions::default()).unwrap();
        let theme = Theme::default();
        let overrides = std::collections::BTreeMap::new();
        let graph = Graph::build(
            &repo,
            &BranchColors::new(&theme, &overrides),
            &LayoutOptions::default(),
        );
        let text = render(&repo, &graph);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, ["┏    c2 (main) more", "┗    c1 init"]);
    }
}
