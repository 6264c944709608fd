//! Per-cell sign bitmasks.
//!
//! Each graph cell carries two independent masks: the branch stem drawn in
//! the branch's own column and the connector drawn in the half-column to its
//! right. Layout only ever ORs bits in; [`crate::render`] turns the final
//! combination into a glyph.

bitflags::bitflags! {
    /// Stem marks in a branch column.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct BranchSign: u8 {
        /// Newest commit of the branch.
        const TIP = 1 << 0;
        /// The tip belongs to a real git ref.
        const ACTIVE_TIP = 1 << 1;
        /// Oldest commit of the branch.
        const BOTTOM = 1 << 2;
        /// Any other commit owned by the branch.
        const COMMIT = 1 << 3;
        /// The branch passes a row owned by another branch.
        const LINE = 1 << 4;
        /// A horizontal connector crosses the stem.
        const PASS = 1 << 5;
    }
}

bitflags::bitflags! {
    /// Connector marks between columns.
    ///
    /// The four corner bits name the curve drawn in the cell: `DOWN_RIGHT` is
    /// `╭` (arms down and right), `DOWN_LEFT` is `╮`, `UP_RIGHT` is `╰` and
    /// `UP_LEFT` is `╯`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ConnectSign: u8 {
        const HORIZONTAL = 1 << 0;
        const VERTICAL = 1 << 1;
        const DOWN_RIGHT = 1 << 2;
        const DOWN_LEFT = 1 << 3;
        const UP_RIGHT = 1 << 4;
        const UP_LEFT = 1 << 5;
        /// A merge whose parent is hidden or not loaded.
        const MORE_MERGE_IN = 1 << 6;
        /// A child that is not shown.
        const MORE_BRANCH_OUT = 1 << 7;
    }
}
