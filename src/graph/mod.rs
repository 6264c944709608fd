//! Graph layout: branch columns and the per-cell sign grid.
//!
//! A [`Graph`] is rebuilt from scratch for every augmented [`Repo`]. It holds
//! one [`GraphBranch`] per drawn branch and a `rows × width` grid of
//! [`Cell`]s. Column `c` of a row is drawn as two terminal cells: the stem of
//! any branch placed at `c`, then the connector half-column to its right.

mod draw;
pub mod layout;
pub mod sign;

use std::collections::BTreeSet;

use ratatui::style::Color;
use tracing::{debug, instrument};

use crate::color::{BranchColors, ColorSlot};
use crate::model::Repo;
use crate::state::BranchOrder;

use draw::Canvas;
use layout::Span;
pub use sign::{BranchSign, ConnectSign};

/// One grid cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Cell {
    pub branch: BranchSign,
    pub branch_color: Option<Color>,
    pub connect: ConnectSign,
    pub connect_color: Option<Color>,
}

/// Placement of one branch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GraphBranch {
    /// Index into `Repo::branches`.
    pub branch: usize,
    pub name: String,
    /// Column.
    pub x: usize,
    /// First view row.
    pub tip: usize,
    /// Last view row.
    pub bottom: usize,
    pub color: Color,
    pub slot: ColorSlot,
    /// Name of the parent branch.
    pub parent: Option<String>,
}

impl GraphBranch {
    /// `true` when `row` lies within the branch's span.
    #[must_use]
    pub const fn covers(&self, row: usize) -> bool {
        self.tip <= row && row <= self.bottom
    }
}

/// Inputs that shape the layout but not the inference.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LayoutOptions {
    /// Branch names to show; `None` shows all branches.
    pub shown: Option<BTreeSet<String>>,
    /// Manual ordering nudges.
    pub orders: Vec<BranchOrder>,
}

/// A fully laid out graph.
#[derive(Clone, Debug, Default)]
pub struct Graph {
    width: usize,
    branches: Vec<GraphBranch>,
    /// `Repo::branches` index → index into `branches`.
    by_branch: Vec<Option<usize>>,
    /// View row → commit row.
    rows: Vec<usize>,
    /// Commit row → view row.
    row_of: Vec<Option<usize>>,
    cells: Vec<Cell>,
}

impl Graph {
    /// Lay out `repo`.
    #[must_use]
    #[instrument(skip_all, fields(commits = repo.commits.len(), branches = repo.branches.len()))]
    pub fn build(repo: &Repo, colors: &BranchColors<'_>, options: &LayoutOptions) -> Self {
        let visible = layout::visible_branches(repo, options.shown.as_ref());
        let (rows, row_of) = layout::view_rows(repo, &visible);
        let spans: Vec<Option<Span>> = (0..repo.branches.len())
            .map(|b| {
                if visible[b] {
                    layout::span(repo, b, &rows)
                } else {
                    None
                }
            })
            .collect();
        let order = layout::processing_order(repo, &visible, &options.orders);
        let columns = layout::assign_columns(repo, &order, &spans);

        let width = columns.iter().flatten().max().map_or(0, |&x| x + 2);
        let slots = colors.slots(repo);

        let mut branches = Vec::with_capacity(order.len());
        let mut by_branch = vec![None; repo.branches.len()];
        for b in 0..repo.branches.len() {
            let (Some(x), Some((tip, bottom))) = (columns[b], spans[b]) else {
                continue;
            };
            by_branch[b] = Some(branches.len());
            branches.push(GraphBranch {
                branch: b,
                name: repo.branches[b].name.clone(),
                x,
                tip,
                bottom,
                color: colors.color_of(slots[b]),
                slot: slots[b],
                parent: repo.parent_name(b).map(str::to_owned),
            });
        }

        let mut graph = Self {
            width,
            branches,
            by_branch,
            rows,
            row_of,
            cells: Vec::new(),
        };
        let mut canvas = Canvas::new(width, graph.rows.len(), colors.theme().neutral);
        for gb in &graph.branches {
            graph.draw_branch(repo, gb, colors.theme().ambiguous, &mut canvas);
        }
        graph.cells = canvas.into_cells();

        debug!(
            width = graph.width,
            rows = graph.rows.len(),
            shown = graph.branches.len(),
            "graph laid out"
        );
        graph
    }

    fn placed(&self, branch: usize) -> Option<&GraphBranch> {
        self.by_branch
            .get(branch)
            .copied()
            .flatten()
            .map(|i| &self.branches[i])
    }

    fn draw_branch(&self, repo: &Repo, gb: &GraphBranch, ambiguous: Color, canvas: &mut Canvas) {
        let branch = &repo.branches[gb.branch];
        let x = gb.x;
        for v in gb.tip..=gb.bottom {
            let commit = &repo.commits[self.rows[v]];

            if commit.branch != gb.branch {
                if v == gb.tip && commit.id == branch.tip_id {
                    // Several refs on one commit: reach over to the owner.
                    // A ref that still owns older commits opens its stem
                    // here, so only a single-row span closes with BOTTOM.
                    let sign = if v == gb.bottom {
                        BranchSign::BOTTOM
                    } else {
                        BranchSign::TIP
                    };
                    canvas.stem(v, x, sign | BranchSign::PASS, gb.color);
                    if let Some(owner) = self.placed(commit.branch) {
                        canvas.horizontal(v, owner.x, x, gb.color);
                    }
                } else {
                    let listed = commit.is_ambiguous
                        && commit.ambiguous_branch_names.iter().any(|n| *n == gb.name);
                    let color = if listed { ambiguous } else { gb.color };
                    canvas.stem(v, x, BranchSign::LINE, color);
                }
                continue;
            }

            let mut sign = BranchSign::empty();
            if v == gb.tip {
                sign |= BranchSign::TIP;
                if branch.is_git_branch {
                    sign |= BranchSign::ACTIVE_TIP;
                }
            }
            if v == gb.bottom {
                sign |= BranchSign::BOTTOM;
            }
            if sign.is_empty() {
                sign = BranchSign::COMMIT;
            }
            canvas.stem(v, x, sign, gb.color);

            if commit.is_merge() {
                let target = commit.merge_parent.and_then(|p| {
                    let pv = self.row_of[p]?;
                    let owner = self.placed(repo.commits[p].branch)?;
                    Some((pv, owner))
                });
                match target {
                    Some((pv, owner)) => canvas.link(v, x, pv, owner.x, owner.color),
                    None => canvas.connect(v, x, ConnectSign::MORE_MERGE_IN, gb.color),
                }
            }

            let hidden_child = commit
                .children
                .iter()
                .chain(&commit.merge_children)
                .any(|&c| self.row_of[c].is_none());
            if hidden_child {
                canvas.connect(v, x, ConnectSign::MORE_BRANCH_OUT, gb.color);
            }

            if v == gb.bottom
                && let Some(fp) = commit.first_parent
                && repo.commits[fp].branch != gb.branch
                && let Some(pv) = self.row_of[fp]
                && let Some(parent) = self.placed(repo.commits[fp].branch)
            {
                canvas.link(v, x, pv, parent.x, gb.color);
            }
        }
    }

    // ---------------------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------------------

    /// Number of columns (`max x + 2`).
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Number of view rows.
    #[must_use]
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Placed branches, in `Repo::branches` order.
    #[must_use]
    pub fn branches(&self) -> &[GraphBranch] {
        &self.branches
    }

    /// Placement of the repo branch `branch`, if drawn.
    #[must_use]
    pub fn branch(&self, branch: usize) -> Option<&GraphBranch> {
        self.placed(branch)
    }

    /// Commit row shown at view row `row`.
    #[must_use]
    pub fn commit_row(&self, row: usize) -> Option<usize> {
        self.rows.get(row).copied()
    }

    /// View row of the commit at `commit_row`, if shown.
    #[must_use]
    pub fn view_row(&self, commit_row: usize) -> Option<usize> {
        self.row_of.get(commit_row).copied().flatten()
    }

    /// The cell at (`row`, `col`).
    #[must_use]
    pub fn cell(&self, row: usize, col: usize) -> Option<&Cell> {
        if col >= self.width {
            return None;
        }
        self.cells.get(row * self.width + col)
    }

    /// Cells of one view row.
    #[must_use]
    pub fn row(&self, row: usize) -> &[Cell] {
        let start = row * self.width;
        self.cells.get(start..start + self.width).unwrap_or(&[])
    }

    /// The branch drawn at column `x` on view row `row`, for hit testing.
    #[must_use]
    pub fn try_get_branch_by_pos(&self, x: usize, row: usize) -> Option<&GraphBranch> {
        self.branches
            .iter()
            .find(|b| b.x == x && b.covers(row))
    }
}
