//! State container: snapshots, patches, change-sets.
//!
//! - [`Snapshot`] — immutable named-field state, shared on clone.
//! - [`Patch`] — partial-field mapping; later writes win.
//! - [`ChangeSet`] — per-field "did it change" flags between two snapshots.

pub mod changes;
pub mod snapshot;

pub use changes::ChangeSet;
pub use snapshot::{Patch, Snapshot};
