//! Deterministic branch colors.
//!
//! A branch's color depends only on the theme, the override table and the
//! branch's place in the hierarchy. Unparented branches hash their
//! `primary_base_name`; a child whose hash lands on its parent's color moves
//! to the next palette slot so it never blends into the branch it came from.

use std::collections::BTreeMap;
use std::fmt;

use ratatui::style::Color;
use sha2::{Digest, Sha256};

use crate::config::Theme;
use crate::model::Repo;

/// Where a branch's color comes from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ColorSlot {
    /// The distinguished main color.
    Main,
    /// An index into the palette.
    Palette(usize),
}

impl fmt::Display for ColorSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Main => f.write_str("main"),
            Self::Palette(i) => write!(f, "palette[{i}]"),
        }
    }
}

/// Palette index for `name`: the first four bytes of its SHA-256 digest,
/// big-endian, modulo `len`.
#[must_use]
pub fn hash_index(name: &str, len: usize) -> usize {
    let digest = Sha256::digest(name.as_bytes());
    let h = u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]]);
    h as usize % len.max(1)
}

/// Color assignment over one theme and one override table.
#[derive(Clone, Copy, Debug)]
pub struct BranchColors<'a> {
    theme: &'a Theme,
    overrides: &'a BTreeMap<String, usize>,
}

impl<'a> BranchColors<'a> {
    #[must_use]
    pub const fn new(theme: &'a Theme, overrides: &'a BTreeMap<String, usize>) -> Self {
        Self { theme, overrides }
    }

    #[must_use]
    pub const fn theme(&self) -> &'a Theme {
        self.theme
    }

    fn palette_len(&self) -> usize {
        self.theme.palette.len().max(1)
    }

    /// The slot of `branch` in `repo`.
    #[must_use]
    pub fn slot(&self, repo: &Repo, branch: usize) -> ColorSlot {
        let b = &repo.branches[branch];
        let len = self.palette_len();
        if let Some(&index) = self.overrides.get(&b.primary_base_name) {
            return ColorSlot::Palette(index.min(len - 1));
        }
        if b.is_main {
            return ColorSlot::Main;
        }
        let own = hash_index(&b.primary_base_name, len);
        match b.parent {
            Some(parent) if self.slot(repo, parent) == ColorSlot::Palette(own) => {
                ColorSlot::Palette((own + 1) % len)
            }
            _ => ColorSlot::Palette(own),
        }
    }

    /// Slots for every branch, indexed like `repo.branches`.
    #[must_use]
    pub fn slots(&self, repo: &Repo) -> Vec<ColorSlot> {
        (0..repo.branches.len()).map(|b| self.slot(repo, b)).collect()
    }

    /// The terminal color of a slot.
    #[must_use]
    pub fn color_of(&self, slot: ColorSlot) -> Color {
        match slot {
            ColorSlot::Main => self.theme.main,
            ColorSlot::Palette(i) => self
                .theme
                .palette
                .get(i)
                .copied()
                .unwrap_or(self.theme.main),
        }
    }

    /// The terminal color of `branch`.
    #[must_use]
    pub fn color(&self, repo: &Repo, branch: usize) -> Color {
        self.color_of(self.slot(repo, branch))
    }

    /// The override index that cycles `branch` to the next palette color.
    /// The main color counts as index 0.
    #[must_use]
    pub fn next_override(&self, repo: &Repo, branch: usize) -> usize {
        let current = match self.slot(repo, branch) {
            ColorSlot::Main => 0,
            ColorSlot::Palette(i) => i,
        };
        (current + 1) % self.palette_len()
    }
}
