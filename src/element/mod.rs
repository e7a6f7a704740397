//! Reactive elements: state container, update scheduler, behaviors.
//!
//! - [`Element`] — handle owning a snapshot, a pending queue, and behaviors.
//! - [`ElementBuilder`] — declares defaults and behaviors, then builds.
//! - [`Behavior`] — composable unit contributing defaults, refinement, render.
//! - [`UpdateConfig`] — refinement cap and change-event switch.

pub mod behavior;
pub mod config;
pub mod error;
pub mod update;

pub use behavior::{Behavior, RefineFn, RenderContext, RenderFn};
pub use config::{UpdateConfig, DEFAULT_MAX_REFINEMENT_ROUNDS};
pub use error::{RenderError, UpdateError};
pub use update::{Element, ElementBuilder, ErrorHandler, FlushOutcome, Phase};
