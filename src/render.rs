//! Glyphs for graph cells.
//!
//! Two closed tables, one for stems and one for connectors, each listing the
//! combinations layout can produce. A combination outside the tables is a
//! layout defect; it renders as [`PLACEHOLDER`] and logs a warning instead
//! of failing the frame.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Widget;
use tracing::warn;

use crate::graph::{BranchSign, Cell, ConnectSign, Graph};

/// Drawn for sign combinations that layout should never produce.
pub const PLACEHOLDER: char = '?';

const TIP: u8 = BranchSign::TIP.bits();
const ACTIVE: u8 = BranchSign::ACTIVE_TIP.bits();
const BOTTOM: u8 = BranchSign::BOTTOM.bits();
const COMMIT: u8 = BranchSign::COMMIT.bits();
const LINE: u8 = BranchSign::LINE.bits();
const PASS: u8 = BranchSign::PASS.bits();

/// The stem glyph for `sign`, or `None` for an unreachable combination.
#[must_use]
pub const fn stem_glyph(sign: BranchSign) -> Option<char> {
    const TIP_ACTIVE: u8 = TIP | ACTIVE;
    const TIP_BOTTOM: u8 = TIP | BOTTOM;
    const TIP_BOTTOM_ACTIVE: u8 = TIP | BOTTOM | ACTIVE;
    const LINE_PASS: u8 = LINE | PASS;
    const BOTTOM_PASS: u8 = BOTTOM | PASS;
    const TIP_PASS: u8 = TIP | PASS;

    let glyph = match sign.bits() {
        0 => ' ',
        TIP_ACTIVE => '┏',
        TIP => '╻',
        BOTTOM => '┗',
        TIP_BOTTOM_ACTIVE => '━',
        TIP_BOTTOM => '╍',
        COMMIT => '┣',
        LINE => '┃',
        PASS => '─',
        LINE_PASS => '╂',
        BOTTOM_PASS => '┺',
        TIP_PASS => '┲',
        _ => return None,
    };
    Some(glyph)
}

const H: u8 = ConnectSign::HORIZONTAL.bits();
const V: u8 = ConnectSign::VERTICAL.bits();
const DR: u8 = ConnectSign::DOWN_RIGHT.bits();
const DL: u8 = ConnectSign::DOWN_LEFT.bits();
const UR: u8 = ConnectSign::UP_RIGHT.bits();
const UL: u8 = ConnectSign::UP_LEFT.bits();

/// Corners that reach left; the only corners a marker can share a cell with.
const LEFT_REACHING: ConnectSign = ConnectSign::DOWN_LEFT.union(ConnectSign::UP_LEFT);
const MARKERS: ConnectSign = ConnectSign::MORE_MERGE_IN.union(ConnectSign::MORE_BRANCH_OUT);

/// The connector glyph for `sign`, or `None` for an unreachable combination.
///
/// On any row, `DOWN_RIGHT` and `UP_RIGHT` land strictly left of the commit's
/// column while `DOWN_LEFT`, `UP_LEFT` and the markers land at or right of
/// it, so the two corner families never meet in one cell. Lanes of other
/// links add only `VERTICAL`; horizontal runs add only `HORIZONTAL`.
#[must_use]
pub fn connect_glyph(sign: ConnectSign) -> Option<char> {
    const H_V: u8 = H | V;
    const DL_H: u8 = DL | H;
    const DL_V: u8 = DL | V;
    const DL_H_V: u8 = DL | H | V;
    const UL_H: u8 = UL | H;
    const UL_V: u8 = UL | V;
    const UL_H_V: u8 = UL | H | V;
    const DL_UL: u8 = DL | UL;
    const DL_UL_H: u8 = DL | UL | H;
    const DL_UL_V: u8 = DL | UL | V;
    const DL_UL_H_V: u8 = DL | UL | H | V;
    const DR_H: u8 = DR | H;
    const DR_V: u8 = DR | V;
    const DR_H_V: u8 = DR | H | V;
    const UR_H: u8 = UR | H;
    const UR_V: u8 = UR | V;
    const UR_H_V: u8 = UR | H | V;
    const DR_UR: u8 = DR | UR;
    const DR_UR_H: u8 = DR | UR | H;
    const DR_UR_V: u8 = DR | UR | V;
    const DR_UR_H_V: u8 = DR | UR | H | V;

    if sign.intersects(MARKERS) {
        return marker_glyph(sign);
    }
    let glyph = match sign.bits() {
        0 => ' ',
        H => '─',
        V => '│',
        H_V => '┼',

        DL => '╮',
        UL => '╯',
        DL_H => '┬',
        UL_H => '┴',
        DL_V | UL_V | DL_UL | DL_UL_V => '┤',
        DL_H_V | UL_H_V | DL_UL_H | DL_UL_H_V => '┼',

        DR => '╭',
        UR => '╰',
        DR_H => '┬',
        UR_H => '┴',
        DR_V | UR_V | DR_UR | DR_UR_V => '├',
        DR_H_V | UR_H_V | DR_UR_H | DR_UR_H_V => '┼',

        _ => return None,
    };
    Some(glyph)
}

/// Markers sit beside the commit's own stem. They outrank the lines through
/// that cell; the lines resume on the neighbouring rows.
fn marker_glyph(sign: ConnectSign) -> Option<char> {
    let lines = sign.difference(MARKERS);
    if !LEFT_REACHING
        .union(ConnectSign::HORIZONTAL | ConnectSign::VERTICAL)
        .contains(lines)
    {
        return None;
    }
    let merge_in = sign.contains(ConnectSign::MORE_MERGE_IN);
    let branch_out = sign.contains(ConnectSign::MORE_BRANCH_OUT);
    Some(match (merge_in, branch_out) {
        (true, true) => '≷',
        (true, false) => '<',
        _ => '>',
    })
}

/// The two terminal characters of one graph cell with their colors.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RenderedCell {
    pub stem: char,
    pub stem_color: Option<Color>,
    pub connect: char,
    pub connect_color: Option<Color>,
}

/// Render one cell, substituting [`PLACEHOLDER`] for unknown combinations.
#[must_use]
pub fn render_cell(cell: &Cell) -> RenderedCell {
    let stem = stem_glyph(cell.branch).unwrap_or_else(|| {
        warn!(bits = cell.branch.bits(), "unrecognized branch sign combination");
        PLACEHOLDER
    });
    let connect = connect_glyph(cell.connect).unwrap_or_else(|| {
        warn!(bits = cell.connect.bits(), "unrecognized connector sign combination");
        PLACEHOLDER
    });
    RenderedCell {
        stem,
        stem_color: cell.branch_color,
        connect,
        connect_color: cell.connect_color,
    }
}

/// Plain text of one view row, two characters per column.
#[must_use]
pub fn row_text(graph: &Graph, row: usize) -> String {
    let mut text = String::with_capacity(graph.width() * 2);
    for cell in graph.row(row) {
        let r = render_cell(cell);
        text.push(r.stem);
        text.push(r.connect);
    }
    text
}

fn styled(ch: char, color: Option<Color>) -> Span<'static> {
    let style = color.map_or_else(Style::default, |c| Style::default().fg(c));
    Span::styled(ch.to_string(), style)
}

/// One view row as styled spans.
#[must_use]
pub fn row_line(graph: &Graph, row: usize) -> Line<'static> {
    let spans: Vec<Span<'static>> = graph
        .row(row)
        .iter()
        .flat_map(|cell| {
            let r = render_cell(cell);
            [styled(r.stem, r.stem_color), styled(r.connect, r.connect_color)]
        })
        .collect();
    Line::from(spans)
}

/// Paints graph rows starting at `offset` into a buffer area.
#[derive(Clone, Copy, Debug)]
pub struct GraphWidget<'a> {
    graph: &'a Graph,
    offset: usize,
}

impl<'a> GraphWidget<'a> {
    #[must_use]
    pub const fn new(graph: &'a Graph) -> Self {
        Self { graph, offset: 0 }
    }

    /// First view row to paint.
    #[must_use]
    pub const fn offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }
}

impl Widget for GraphWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let rows = (self.offset..self.graph.height()).take(usize::from(area.height));
        for (y, row) in (area.y..).zip(rows) {
            let line = row_line(self.graph, row);
            buf.set_line(area.x, y, &line, area.width);
        }
    }
}
