//! Sign painting.
//!
//! Every drawing operation ORs bits into cells and unions colors; nothing is
//! ever overwritten, so the order in which branches are drawn does not
//! matter.

use ratatui::style::Color;
use tracing::warn;

use super::Cell;
use super::sign::{BranchSign, ConnectSign};

/// The cell grid under construction.
pub struct Canvas {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
    neutral: Color,
}

/// Union `color` into `slot`; two different colors become `neutral`.
fn blend(slot: &mut Option<Color>, color: Color, neutral: Color) {
    *slot = match *slot {
        None => Some(color),
        Some(existing) if existing == color => Some(existing),
        Some(_) => Some(neutral),
    };
}

impl Canvas {
    pub fn new(width: usize, height: usize, neutral: Color) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::default(); width * height],
            neutral,
        }
    }

    pub fn into_cells(self) -> Vec<Cell> {
        self.cells
    }

    fn cell_mut(&mut self, row: usize, col: usize) -> Option<&mut Cell> {
        if row >= self.height || col >= self.width {
            warn!(row, col, "sign outside the graph grid");
            return None;
        }
        self.cells.get_mut(row * self.width + col)
    }

    pub fn stem(&mut self, row: usize, col: usize, sign: BranchSign, color: Color) {
        let neutral = self.neutral;
        if let Some(cell) = self.cell_mut(row, col) {
            cell.branch |= sign;
            blend(&mut cell.branch_color, color, neutral);
        }
    }

    pub fn connect(&mut self, row: usize, col: usize, sign: ConnectSign, color: Color) {
        let neutral = self.neutral;
        if let Some(cell) = self.cell_mut(row, col) {
            cell.connect |= sign;
            blend(&mut cell.connect_color, color, neutral);
        }
    }

    /// A horizontal run on `row` between stems `a` and `b`: connectors on
    /// the half-columns between them and `PASS` on the stems strictly
    /// inside.
    pub fn horizontal(&mut self, row: usize, a: usize, b: usize, color: Color) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        for col in lo..hi {
            self.connect(row, col, ConnectSign::HORIZONTAL, color);
        }
        for col in lo + 1..hi {
            self.stem(row, col, BranchSign::PASS, color);
        }
    }

    /// Connect the stem at (`upper`, `ux`) to the stem at (`lower`, `lx`),
    /// running down the connector lane beside the lower column.
    pub fn link(&mut self, upper: usize, ux: usize, lower: usize, lx: usize, color: Color) {
        if lower <= upper {
            warn!(upper, lower, "link does not point down; skipping");
            return;
        }
        let (lane, top, bottom) = match lx.cmp(&ux) {
            std::cmp::Ordering::Less => {
                // Lane is the right half of the lower column.
                for col in lx + 1..ux {
                    self.connect(upper, col, ConnectSign::HORIZONTAL, color);
                    self.stem(upper, col, BranchSign::PASS, color);
                }
                (lx, ConnectSign::DOWN_RIGHT, ConnectSign::UP_LEFT)
            }
            std::cmp::Ordering::Greater => {
                // Lane is the half-column just left of the lower column.
                let lane = lx - 1;
                for col in ux..lane {
                    self.connect(upper, col, ConnectSign::HORIZONTAL, color);
                }
                for col in ux + 1..lx {
                    self.stem(upper, col, BranchSign::PASS, color);
                }
                (lane, ConnectSign::DOWN_LEFT, ConnectSign::UP_RIGHT)
            }
            std::cmp::Ordering::Equal => (ux, ConnectSign::DOWN_LEFT, ConnectSign::UP_LEFT),
        };
        self.connect(upper, lane, top, color);
        for row in upper + 1..lower {
            self.connect(row, lane, ConnectSign::VERTICAL, color);
        }
        self.connect(lower, lane, bottom, color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canvas() -> Canvas {
        Canvas::new(6, 4, Color::DarkGray)
    }

    fn at(cells: &[Cell], row: usize, col: usize) -> Cell {
        cells[row * 6 + col]
    }

    #[test]
    fn link_to_left_column() {
        let mut c = canvas();
        c.link(0, 2, 2, 0, Color::Red);
        let cells = c.into_cells();
        assert_eq!(at(&cells, 0, 0).connect, ConnectSign::DOWN_RIGHT);
        assert_eq!(at(&cells, 0, 1).connect, ConnectSign::HORIZONTAL);
        assert_eq!(at(&cells, 0, 1).branch, BranchSign::PASS);
        assert_eq!(at(&cells, 0, 2).branch, BranchSign::empty());
        assert_eq!(at(&cells, 1, 0).connect, ConnectSign::VERTICAL);
        assert_eq!(at(&cells, 2, 0).connect, ConnectSign::UP_LEFT);
    }

    #[test]
    fn link_to_right_column() {
        let mut c = canvas();
        c.link(1, 0, 3, 2, Color::Red);
        let cells = c.into_cells();
        assert_eq!(at(&cells, 1, 0).connect, ConnectSign::HORIZONTAL);
        assert_eq!(at(&cells, 1, 1).connect, ConnectSign::DOWN_LEFT);
        assert_eq!(at(&cells, 1, 1).branch, BranchSign::PASS);
        assert_eq!(at(&cells, 2, 1).connect, ConnectSign::VERTICAL);
        assert_eq!(at(&cells, 3, 1).connect, ConnectSign::UP_RIGHT);
    }

    #[test]
    fn link_in_same_column_bulges_right() {
        let mut c = canvas();
        c.link(0, 1, 1, 1, Color::Red);
        let cells = c.into_cells();
        assert_eq!(at(&cells, 0, 1).connect, ConnectSign::DOWN_LEFT);
        assert_eq!(at(&cells, 1, 1).connect, ConnectSign::UP_LEFT);
    }

    #[test]
    fn upward_link_is_ignored() {
        let mut c = canvas();
        c.link(2, 0, 2, 1, Color::Red);
        assert!(c.into_cells().iter().all(|cell| *cell == Cell::default()));
    }

    #[test]
    fn colors_blend_to_neutral() {
        let mut c = canvas();
        c.stem(0, 0, BranchSign::LINE, Color::Red);
        c.stem(0, 0, BranchSign::PASS, Color::Red);
        c.stem(1, 0, BranchSign::LINE, Color::Red);
        c.stem(1, 0, BranchSign::PASS, Color::Blue);
        let cells = c.into_cells();
        assert_eq!(at(&cells, 0, 0).branch_color, Some(Color::Red));
        assert_eq!(at(&cells, 1, 0).branch_color, Some(Color::DarkGray));
        assert_eq!(at(&cells, 1, 0).branch, BranchSign::LINE | BranchSign::PASS);
    }

    #[test]
    fn out_of_grid_signs_are_dropped() {
        let mut c = canvas();
        c.stem(9, 9, BranchSign::TIP, Color::Red);
        assert!(c.into_cells().iter().all(|cell| *cell == Cell::default()));
    }
}
