//! Behavior trait: the unit of composition for elements.
//!
//! An element is an ordered list of behaviors. Each behavior may contribute
//! default fields, a refinement step, and a render step; the element calls
//! them in order. Capabilities a behavior does not need keep their no-op
//! defaults.

use crate::event::Event;
use crate::state::{ChangeSet, Patch, Snapshot};

use super::error::RenderError;

// ---------------------------------------------------------------------------
// Behavior trait
// ---------------------------------------------------------------------------

/// A reusable piece of element logic.
pub trait Behavior {
    /// Name used in logs and error reports.
    fn name(&self) -> &str {
        let full = std::any::type_name::<Self>();
        full.rsplit("::").next().unwrap_or(full)
    }

    /// Fields this behavior declares, with their initial values.
    fn default_state(&self) -> Patch {
        Patch::new()
    }

    /// Inspect a proposed state and return further overrides, or `None`.
    ///
    /// `changed` holds only the fields that changed in the round being
    /// refined. Returning values equal to the current ones is fine: they are
    /// not counted as changes.
    fn refine(&self, state: &Snapshot, changed: &ChangeSet) -> Option<Patch> {
        let _ = (state, changed);
        None
    }

    /// Translate state into host-visible effects.
    fn render(&mut self, cx: &mut RenderContext<'_>) -> Result<(), RenderError> {
        let _ = cx;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// RenderContext
// ---------------------------------------------------------------------------

/// What a render step can see and do.
pub struct RenderContext<'a> {
    element: &'a str,
    state: &'a Snapshot,
    previous: &'a Snapshot,
    changed: &'a ChangeSet,
    first_render: bool,
    raise_change_events: bool,
    follow_ups: Vec<Patch>,
    events: Vec<Box<dyn Event>>,
}

impl<'a> RenderContext<'a> {
    pub(crate) fn new(
        element: &'a str,
        state: &'a Snapshot,
        previous: &'a Snapshot,
        changed: &'a ChangeSet,
    ) -> Self {
        Self {
            element,
            state,
            previous,
            changed,
            first_render: previous.is_empty(),
            raise_change_events: false,
            follow_ups: Vec::new(),
            events: Vec::new(),
        }
    }

    pub(crate) fn with_first_render(mut self, first: bool) -> Self {
        self.first_render = first;
        self
    }

    pub(crate) fn with_change_events(mut self, raise: bool) -> Self {
        self.raise_change_events = raise;
        self
    }

    /// Name of the element being rendered.
    pub fn element_name(&self) -> &str {
        self.element
    }

    /// The committed snapshot being rendered.
    pub fn state(&self) -> &Snapshot {
        self.state
    }

    /// The snapshot at the previous render.
    pub fn previous(&self) -> &Snapshot {
        self.previous
    }

    /// Fields changed since the previous render.
    pub fn changed(&self) -> &ChangeSet {
        self.changed
    }

    /// True for the element's first render pass.
    ///
    /// Its change-set holds every declared field, so behaviors that announce
    /// changes usually skip it.
    pub fn is_first_render(&self) -> bool {
        self.first_render
    }

    /// Whether this pass applies an update made inside
    /// [`Element::raising_change_events`](super::Element::raising_change_events).
    pub fn raise_change_events(&self) -> bool {
        self.raise_change_events
    }

    /// Queue a state change for the next flush.
    pub fn request_update(&mut self, patch: Patch) {
        self.follow_ups.push(patch);
    }

    /// Raise an event for the host.
    pub fn emit(&mut self, event: impl Event) {
        self.events.push(Box::new(event));
    }

    pub(crate) fn into_parts(self) -> (Vec<Patch>, Vec<Box<dyn Event>>) {
        (self.follow_ups, self.events)
    }
}

// ---------------------------------------------------------------------------
// Closure adapters
// ---------------------------------------------------------------------------

/// A behavior made from a refinement closure.
pub struct RefineFn<F> {
    name: String,
    f: F,
}

impl<F> RefineFn<F>
where
    F: Fn(&Snapshot, &ChangeSet) -> Option<Patch>,
{
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self { name: name.into(), f }
    }
}

impl<F> Behavior for RefineFn<F>
where
    F: Fn(&Snapshot, &ChangeSet) -> Option<Patch>,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn refine(&self, state: &Snapshot, changed: &ChangeSet) -> Option<Patch> {
        (self.f)(state, changed)
    }
}

/// A behavior made from a render closure.
pub struct RenderFn<F> {
    name: String,
    f: F,
}

impl<F> RenderFn<F>
where
    F: FnMut(&mut RenderContext<'_>) -> Result<(), RenderError>,
{
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self { name: name.into(), f }
    }
}

impl<F> Behavior for RenderFn<F>
where
    F: FnMut(&mut RenderContext<'_>) -> Result<(), RenderError>,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn render(&mut self, cx: &mut RenderContext<'_>) -> Result<(), RenderError> {
        (self.f)(cx)
    }
}

// ===========================================================================
// Tests
// ===========================================================================
