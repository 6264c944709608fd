use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod format;
mod telemetry;

/// Branch-aware commit graph for the terminal
///
/// gitlane reads a repository snapshot (commits oldest→newest, refs and
/// working-copy status, as JSON), works out which branch owns every commit
/// and lays the branches out as columns.
///
/// Ambiguous commits are flagged rather than hidden. Use 'pin' to settle
/// them by hand and 'color' / 'order' to adjust how branches are drawn.
/// Those choices are kept per repository in the state file.
///
/// LOGGING:
///
///   GITLANE_LOG=debug          # EnvFilter directives, default "warn"
///   GITLANE_LOG_FORMAT=json    # JSON events on stderr
#[derive(Parser)]
#[command(name = "gitlane")]
#[command(version, about)]
#[command(propagate_version = true)]
#[command(after_help = "See 'gitlane <command> --help' for more information on a specific command.")]
struct Cli {
    /// Configuration file (palette, branch priority)
    #[arg(long, global = true, env = "GITLANE_CONFIG", default_value = "gitlane.toml")]
    config: PathBuf,

    /// Per-repository state file (color overrides, pins, ordering)
    #[arg(long, global = true, env = "GITLANE_STATE", default_value = ".gitlane/state.toml")]
    state: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the commit graph
    Graph(commands::graph::GraphArgs),

    /// List branches with their column, rows, parent and color
    Branches(commands::branches::BranchesArgs),

    /// Cycle a branch to the next palette color
    ///
    /// The override is keyed by the branch's base name, so a local branch
    /// and its remote change together.
    Color(commands::settings::ColorArgs),

    /// Assign a commit to a branch by hand
    Pin(commands::settings::PinArgs),

    /// Remove a manual branch assignment
    Unpin(commands::settings::UnpinArgs),

    /// Lay out one branch before another
    Order(commands::settings::OrderArgs),
}

fn main() -> Result<()> {
    telemetry::init();
    let cli = Cli::parse();
    let paths = commands::Paths {
        config: cli.config,
        state: cli.state,
    };

    match cli.command {
        Commands::Graph(ref args) => commands::graph::run(&paths, args),
        Commands::Branches(ref args) => commands::branches::run(&paths, args),
        Commands::Color(ref args) => commands::settings::color(&paths, args),
        Commands::Pin(ref args) => commands::settings::pin(&paths, args),
        Commands::Unpin(ref args) => commands::settings::unpin(&paths, args),
        Commands::Order(ref args) => commands::settings::order(&paths, args),
    }
}
