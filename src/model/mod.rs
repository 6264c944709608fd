//! Commit and branch model: raw snapshot input and augmented output.

pub mod snapshot;
pub mod types;

pub use snapshot::{RawBranch, RawCommit, Snapshot, UNCOMMITTED_ID, WorkingStatus};
pub use types::{Branch, Commit, Repo, Resolution, short_id};
