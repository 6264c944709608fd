use std::fmt::Write as _;
use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use gitlane::graph::Graph;
use gitlane::model::Repo;
use serde::Serialize;

use super::{Paths, Session};
use crate::format::OutputFormat;

/// List branches with their layout
#[derive(Args, Debug)]
pub struct BranchesArgs {
    /// Snapshot JSON file
    pub snapshot: PathBuf,

    /// Output format: text or json
    #[arg(long, default_value = "text")]
    pub format: OutputFormat,
}

/// One row of the branch table.
#[derive(Debug, Serialize)]
struct BranchEntry {
    name: String,
    x: usize,
    tip: usize,
    bottom: usize,
    parent: Option<String>,
    color: String,
    slot: String,
    is_main: bool,
    is_remote: bool,
    is_git_branch: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    ambiguous_tip: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    ambiguous_names: Vec<String>,
}

pub fn run(paths: &Paths, args: &BranchesArgs) -> Result<()> {
    let session = Session::load(paths, &args.snapshot)?;
    let graph = session.graph(&[]);
    let entries = entries(&session.repo, &graph);
    match args.format {
        OutputFormat::Text => print!("{}", text(&entries)),
        OutputFormat::Json => println!("{}", args.format.serialize(&entries)?),
    }
    Ok(())
}

fn entries(repo: &Repo, graph: &Graph) -> Vec<BranchEntry> {
    graph
        .branches()
        .iter()
        .map(|gb| {
            let b = &repo.branches[gb.branch];
            BranchEntry {
                name: gb.name.clone(),
                x: gb.x,
                tip: gb.tip,
                bottom: gb.bottom,
                parent: gb.parent.clone(),
                color: gb.color.to_string(),
                slot: gb.slot.to_string(),
                is_main: b.is_main,
                is_remote: b.is_remote,
                is_git_branch: b.is_git_branch,
                ambiguous_tip: b.ambiguous_tip_id.clone(),
                ambiguous_names: b.ambiguous_branch_names.clone(),
            }
        })
        .collect()
}

fn text(entries: &[BranchEntry]) -> String {
    let width = entries.iter().map(|e| e.name.len()).max().unwrap_or(0);
    let mut out = String::new();
    for e in entries {
        let _ = write!(
            out,
            "{:<width$}  x={:<3} rows {}..{}  {}",
            e.name, e.x, e.tip, e.bottom, e.slot
        );
        if let Some(parent) = &e.parent {
            let _ = write!(out, "  parent={parent}");
        }
        if e.is_main {
            out.push_str("  [main]");
        }
        if !e.ambiguous_names.is_empty() {
            let _ = write!(out, "  ambiguous: {}", e.ambiguous_names.join(", "));
        }
        out.push('\n');
    }
    out
}
