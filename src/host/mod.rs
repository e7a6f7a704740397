//! Host-side plumbing: element arena, lifecycle records, event collection.
//!
//! - [`Host`] — owns elements in a slotmap arena and drains their flushes.
//! - [`LifecycleEvent`] — Mount / Render / Unmount records kept by the host.

pub mod registry;

pub use registry::{Host, LifecycleEvent};

slotmap::new_key_type! {
    /// Stable handle to an element owned by a [`Host`].
    pub struct ElementId;
}
