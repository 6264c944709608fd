//! gitlane library crate.
//!
//! The engine behind the `gitlane` binary: branch inference over a commit
//! snapshot, hierarchy and color assignment, column layout and glyph
//! rendering. Exposed as a library so integration tests and other front
//! ends can drive it without the CLI.

pub mod augment;
pub mod color;
pub mod config;
pub mod error;
pub mod graph;
pub mod model;
pub mod render;
pub mod state;
