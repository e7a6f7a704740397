//! Test helpers for elements and behaviors.
//!
//! Attach a [`RenderRecorder`] to an element to capture what each render pass
//! saw, then assert on the [`Recording`].

pub mod recorder;

pub use recorder::{Recording, RenderRecord, RenderRecorder};
