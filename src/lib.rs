//! # reactive-element
//!
//! The host-independent core of a reactive component library: batched state
//! updates, change detection, and behaviors composed into elements.
//!
//! An element owns an immutable state snapshot. Callers request partial
//! updates; the element coalesces every request made in one synchronous turn,
//! lets its behaviors refine the merged state until it stops changing, commits
//! the result, and renders once with the set of fields that changed.
//!
//! ```
//! use reactive_element::prelude::*;
//!
//! let queue = MicrotaskQueue::new();
//! let el = Element::builder("counter")
//!     .scheduler(queue.clone())
//!     .field("count", 0)
//!     .build()
//!     .unwrap();
//!
//! el.request_update(patch! { "count" => 1 });
//! el.request_update(patch! { "count" => 1 });
//! assert_eq!(el.state().int("count"), Some(0));
//!
//! queue.run_until_idle();
//! assert_eq!(el.state().int("count"), Some(1));
//! ```
//!
//! ## Core Systems
//!
//! - **[`value`]** — Field values, compared by identity for composites
//! - **[`state`]** — Snapshots, patches, change-sets
//! - **[`element`]** — Element, builder, behavior trait, update pipeline
//! - **[`runtime`]** — Microtask queue and tokio `spawn_local` scheduling
//! - **[`behaviors`]** — Selection behaviors
//! - **[`event`]** — Events raised by render behaviors
//! - **[`host`]** — Element arena with lifecycle and event collection
//! - **[`testing`]** — Render recording for tests

// Foundation
pub mod value;
pub mod state;

// Update pipeline
pub mod element;
pub mod runtime;

// Composition
pub mod behaviors;
pub mod event;

// Hosting
pub mod host;
pub mod testing;

/// Commonly used types.
pub mod prelude {
    pub use crate::behaviors::{ItemSelection, SelectedIndex};
    pub use crate::element::{
        Behavior, Element, ElementBuilder, FlushOutcome, Phase, RenderContext, RenderError,
        UpdateConfig, UpdateError,
    };
    pub use crate::event::{Custom, Envelope, Event, SelectedIndexChanged};
    pub use crate::host::{ElementId, Host, LifecycleEvent};
    pub use crate::patch;
    pub use crate::runtime::{MicrotaskQueue, Schedule, TokioScheduler};
    pub use crate::state::{ChangeSet, Patch, Snapshot};
    pub use crate::value::Value;
}
