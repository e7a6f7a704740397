//! Element: state container plus update scheduler.
//!
//! `request_update` never applies a change inline. The first request in an
//! idle period schedules one flush; later requests only append to the pending
//! queue. The flush merges every pending update in request order, lets the
//! behaviors refine the result until it stops changing, commits the new
//! snapshot, and renders once if anything changed.
//!
//! ```text
//! Idle --request--> Pending --flush--> Merging --settled--> Rendering --> Idle
//!                                          \--nothing changed------------> Idle
//! ```
//!
//! Code that reads [`Element::state`] between a request and its flush sees the
//! pre-update snapshot.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use tokio::sync::watch;

use crate::event::Event;
use crate::runtime::{current_queue, Schedule};
use crate::state::{ChangeSet, Patch, Snapshot};
use crate::value::Value;

use super::behavior::{Behavior, RefineFn, RenderContext, RenderFn};
use super::config::UpdateConfig;
use super::error::{RenderError, UpdateError};

const TARGET: &str = "reactive_element::element";

/// Receives errors from flushes that run on the scheduler.
pub type ErrorHandler = Rc<dyn Fn(UpdateError)>;

// ---------------------------------------------------------------------------
// Phase / FlushOutcome
// ---------------------------------------------------------------------------

/// Where an element is in its update cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Nothing pending.
    Idle,
    /// A flush is scheduled.
    Pending,
    /// Merging and refining pending updates.
    Merging,
    /// Running render behaviors.
    Rendering,
}

/// What a flush did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlushOutcome {
    /// The element was destroyed; nothing ran.
    Skipped,
    /// No field changed and there was nothing left to render.
    Unchanged,
    /// The snapshot changed but the element is not mounted, so no render.
    Committed(ChangeSet),
    /// Render behaviors ran with this change-set.
    Rendered(ChangeSet),
}

enum PendingUpdate {
    Patch(Patch),
    Derive(Box<dyn FnOnce(&Snapshot) -> Patch>),
}

struct QueuedUpdate {
    update: PendingUpdate,
    /// Requested inside [`Element::raising_change_events`].
    raise: bool,
}

// ---------------------------------------------------------------------------
// Element
// ---------------------------------------------------------------------------

struct Inner {
    name: String,
    config: UpdateConfig,
    scheduler: Rc<dyn Schedule>,
    on_error: Option<ErrorHandler>,
    state: RefCell<Snapshot>,
    last_rendered: RefCell<Snapshot>,
    unrendered: RefCell<ChangeSet>,
    unrendered_raise: Cell<bool>,
    pending: RefCell<Vec<QueuedUpdate>>,
    behaviors: RefCell<Vec<Box<dyn Behavior>>>,
    outbox: RefCell<Vec<Box<dyn Event>>>,
    phase: Cell<Phase>,
    scheduled: Cell<bool>,
    raise_scope: Cell<bool>,
    alive: Cell<bool>,
    mounted: Cell<bool>,
    render_count: Cell<u64>,
    settled: watch::Sender<u64>,
}

/// Handle to a reactive element. Clones share the same element.
#[derive(Clone)]
pub struct Element {
    inner: Rc<Inner>,
}

impl Element {
    /// Start building an element.
    pub fn builder(name: impl Into<String>) -> ElementBuilder {
        ElementBuilder::new(name)
    }

    /// Name used in logs and error reports.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// The update configuration this element was built with.
    pub fn config(&self) -> &UpdateConfig {
        &self.inner.config
    }

    /// The last fully merged snapshot.
    pub fn state(&self) -> Snapshot {
        self.inner.state.borrow().clone()
    }

    /// A single field of the current snapshot.
    pub fn get(&self, name: &str) -> Option<Value> {
        self.inner.state.borrow().get(name).cloned()
    }

    /// Where the element is in its update cycle.
    pub fn phase(&self) -> Phase {
        self.inner.phase.get()
    }

    /// False once [`destroy`](Self::destroy) has run.
    pub fn is_alive(&self) -> bool {
        self.inner.alive.get()
    }

    /// Whether the element renders on flush.
    pub fn is_mounted(&self) -> bool {
        self.inner.mounted.get()
    }

    /// Number of queued, not yet flushed updates.
    pub fn pending_len(&self) -> usize {
        self.inner.pending.borrow().len()
    }

    /// Number of render passes so far.
    pub fn render_count(&self) -> u64 {
        self.inner.render_count.get()
    }

    /// Names of the attached behaviors, in call order.
    pub fn behavior_names(&self) -> Vec<String> {
        self.inner
            .behaviors
            .borrow()
            .iter()
            .map(|b| b.name().to_owned())
            .collect()
    }

    /// Whether both handles refer to the same element.
    pub fn ptr_eq(&self, other: &Element) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    // ── Updates ──────────────────────────────────────────────────────

    /// Queue a partial update. It is applied at the next flush.
    pub fn request_update(&self, patch: Patch) {
        self.enqueue(PendingUpdate::Patch(patch));
    }

    /// Queue an update computed at flush time from the state merged so far.
    ///
    /// Use this when the new value depends on the old one and several
    /// requests may land in the same turn.
    pub fn request_update_with(&self, f: impl FnOnce(&Snapshot) -> Patch + 'static) {
        self.enqueue(PendingUpdate::Derive(Box::new(f)));
    }

    /// Run `f` with change events enabled for the updates it requests.
    ///
    /// Hosts wrap user-initiated changes (a key press, a click) in this so
    /// render behaviors announce them. Updates requested anywhere else are
    /// applied silently.
    pub fn raising_change_events<R>(&self, f: impl FnOnce(&Element) -> R) -> R {
        let outer = self.inner.raise_scope.replace(true);
        let result = f(self);
        self.inner.raise_scope.set(outer);
        result
    }

    fn enqueue(&self, update: PendingUpdate) {
        let inner = &self.inner;
        if !inner.alive.get() {
            tracing::debug!(target: TARGET, element = %inner.name, "ignoring update on destroyed element");
            return;
        }
        inner.pending.borrow_mut().push(QueuedUpdate {
            update,
            raise: inner.raise_scope.get(),
        });
        match inner.phase.get() {
            // A pending element may have lost its task; `schedule_flush` is
            // a no-op while one is still queued.
            Phase::Idle | Phase::Pending => {
                inner.phase.set(Phase::Pending);
                self.schedule_flush();
            }
            // `flush` reschedules once the current pass ends.
            Phase::Merging | Phase::Rendering => {}
        }
    }

    fn schedule_flush(&self) {
        let inner = &self.inner;
        if inner.scheduled.replace(true) {
            return;
        }
        tracing::trace!(target: TARGET, element = %inner.name, "flush scheduled");
        let task = FlushTask {
            inner: Rc::downgrade(&self.inner),
        };
        inner.scheduler.schedule(Box::new(move || task.run()));
    }

    fn report(&self, err: UpdateError) {
        match &self.inner.on_error {
            Some(handler) => handler(err),
            None => {
                tracing::error!(target: TARGET, element = %self.inner.name, error = %err, "unhandled update error");
            }
        }
    }

    /// Apply every pending update now.
    ///
    /// Scheduled flushes call this; hosts may also call it directly. Calling
    /// it from inside a render is a no-op: requests made there are picked up
    /// by the next scheduled flush.
    pub fn flush(&self) -> Result<FlushOutcome, UpdateError> {
        let inner = &self.inner;
        if !inner.alive.get() {
            inner.pending.borrow_mut().clear();
            if !matches!(inner.phase.get(), Phase::Merging | Phase::Rendering) {
                self.set_idle();
            }
            return Ok(FlushOutcome::Skipped);
        }
        if matches!(inner.phase.get(), Phase::Merging | Phase::Rendering) {
            tracing::trace!(target: TARGET, element = %inner.name, "re-entrant flush deferred");
            return Ok(FlushOutcome::Unchanged);
        }

        inner.phase.set(Phase::Merging);
        let result = self.merge_and_render();

        // Requests made while merging or rendering start a new turn.
        if inner.alive.get() && !inner.pending.borrow().is_empty() {
            inner.phase.set(Phase::Pending);
            self.schedule_flush();
        } else {
            self.set_idle();
        }
        result
    }

    fn set_idle(&self) {
        self.inner.phase.set(Phase::Idle);
        self.inner.settled.send_modify(|n| *n += 1);
    }

    fn merge_and_render(&self) -> Result<FlushOutcome, UpdateError> {
        let inner = &self.inner;
        let pending = std::mem::take(&mut *inner.pending.borrow_mut());
        let current = inner.state.borrow().clone();
        let (merged, raise) = merge_pending(&inner.name, &current, pending);

        let next = {
            let behaviors = inner.behaviors.borrow();
            settle(
                &inner.name,
                &behaviors,
                inner.config.max_refinement_rounds,
                &current,
                merged,
            )?
        };

        let changed = ChangeSet::diff(&current, &next);
        let committed = changed.any();
        if committed {
            tracing::debug!(target: TARGET, element = %inner.name, changed = %changed, "state committed");
            *inner.state.borrow_mut() = next;
            inner.unrendered.borrow_mut().union(&changed);
            if raise {
                inner.unrendered_raise.set(true);
            }
        }

        if !inner.mounted.get() || !inner.unrendered.borrow().any() {
            return Ok(if committed {
                FlushOutcome::Committed(changed)
            } else {
                FlushOutcome::Unchanged
            });
        }
        self.render()
    }

    fn render(&self) -> Result<FlushOutcome, UpdateError> {
        let inner = &self.inner;
        inner.phase.set(Phase::Rendering);

        let changed = std::mem::take(&mut *inner.unrendered.borrow_mut());
        let raise = inner.unrendered_raise.replace(false);
        let state = inner.state.borrow().clone();
        let previous = inner.last_rendered.replace(state.clone());
        let first_render = inner.render_count.get() == 0;
        inner.render_count.set(inner.render_count.get() + 1);

        let mut follow_ups = Vec::new();
        let mut result = Ok(());
        {
            let mut behaviors = inner.behaviors.borrow_mut();
            for behavior in behaviors.iter_mut() {
                let mut cx = RenderContext::new(&inner.name, &state, &previous, &changed)
                    .with_first_render(first_render)
                    .with_change_events(raise);
                let outcome = behavior.render(&mut cx);
                let (patches, events) = cx.into_parts();
                follow_ups.extend(patches);
                inner.outbox.borrow_mut().extend(events);
                if let Err(source) = outcome {
                    result = Err(UpdateError::Render {
                        element: inner.name.clone(),
                        behavior: behavior.name().to_owned(),
                        source,
                    });
                    break;
                }
            }
        }
        tracing::trace!(target: TARGET, element = %inner.name, changed = %changed, "rendered");

        for patch in follow_ups {
            self.request_update(patch);
        }
        result.map(|()| FlushOutcome::Rendered(changed))
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Connect the element so it renders.
    ///
    /// The first render receives every field changed since construction,
    /// which includes all default fields.
    pub fn mount(&self) {
        let inner = &self.inner;
        if !inner.alive.get() || inner.mounted.replace(true) {
            return;
        }
        tracing::debug!(target: TARGET, element = %inner.name, "mounted");
        if inner.unrendered.borrow().any() && inner.phase.get() == Phase::Idle {
            inner.phase.set(Phase::Pending);
            self.schedule_flush();
        }
    }

    /// Disconnect the element. Updates still merge but do not render until
    /// the next [`mount`](Self::mount).
    pub fn unmount(&self) {
        if self.inner.mounted.replace(false) {
            tracing::debug!(target: TARGET, element = %self.inner.name, "unmounted");
        }
    }

    /// Tear the element down. Pending updates are dropped, a flush that is
    /// already scheduled becomes a no-op, and later requests are ignored.
    pub fn destroy(&self) {
        let inner = &self.inner;
        if !inner.alive.replace(false) {
            return;
        }
        inner.mounted.set(false);
        inner.pending.borrow_mut().clear();
        inner.unrendered_raise.set(false);
        if inner.phase.get() == Phase::Pending {
            self.set_idle();
        }
        tracing::debug!(target: TARGET, element = %inner.name, "destroyed");
    }

    /// Resolve once the element is idle.
    ///
    /// Someone else must drive the scheduler (drain the microtask queue, or
    /// run the tokio `LocalSet`) for this to make progress.
    pub async fn settled(&self) {
        let mut rx = self.inner.settled.subscribe();
        while self.inner.phase.get() != Phase::Idle {
            if rx.changed().await.is_err() {
                break;
            }
        }
    }

    /// Drain events raised by render behaviors.
    pub fn take_events(&self) -> Vec<Box<dyn Event>> {
        std::mem::take(&mut *self.inner.outbox.borrow_mut())
    }
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Element")
            .field("name", &self.inner.name)
            .field("phase", &self.inner.phase.get())
            .field("alive", &self.inner.alive.get())
            .field("mounted", &self.inner.mounted.get())
            .field("state", &*self.inner.state.borrow())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Merge / settle
// ---------------------------------------------------------------------------

fn drop_undeclared(element: &str, patch: &mut Patch, declared: &Snapshot) {
    for field in patch.retain_declared(declared) {
        tracing::warn!(
            target: "reactive_element::state",
            element,
            field = %field,
            "ignoring update to undeclared field"
        );
    }
}

/// Fold pending updates into one patch, in request order. The flag is set
/// when any of them asked for change events.
fn merge_pending(element: &str, current: &Snapshot, pending: Vec<QueuedUpdate>) -> (Patch, bool) {
    let mut merged = Patch::new();
    let mut raise = false;
    let mut working = current.clone();
    for queued in pending {
        let mut patch = match queued.update {
            PendingUpdate::Patch(p) => p,
            PendingUpdate::Derive(f) => f(&working),
        };
        drop_undeclared(element, &mut patch, current);
        working = working.with_patch(&patch);
        raise |= queued.raise;
        merged.extend(patch);
    }
    (merged, raise)
}

/// The scheduled half of a flush.
///
/// Holds the element weakly. If the scheduler drops the task without running
/// it, the element may schedule again.
struct FlushTask {
    inner: Weak<Inner>,
}

impl FlushTask {
    fn run(mut self) {
        let Some(inner) = std::mem::take(&mut self.inner).upgrade() else {
            return;
        };
        inner.scheduled.set(false);
        let element = Element { inner };
        if let Err(err) = element.flush() {
            element.report(err);
        }
    }
}

impl Drop for FlushTask {
    fn drop(&mut self) {
        // Empty after `run`; only a task dropped unrun gets here with a target.
        if let Some(inner) = self.inner.upgrade() {
            tracing::trace!(target: TARGET, element = %inner.name, "scheduled flush dropped");
            inner.scheduled.set(false);
        }
    }
}

/// Apply `first`, then refinement rounds until a round changes nothing.
fn settle(
    element: &str,
    behaviors: &[Box<dyn Behavior>],
    max_rounds: usize,
    current: &Snapshot,
    first: Patch,
) -> Result<Snapshot, UpdateError> {
    let mut next = current.clone();
    let mut round = first;
    // Rounds applied so far; round 0 is the merged request.
    let mut applied = 0usize;
    loop {
        let round_changes = ChangeSet::of_patch(&next, &round);
        if !round_changes.any() {
            return Ok(next);
        }
        if applied > max_rounds {
            let fields: Vec<String> = round_changes.changed_fields().map(str::to_owned).collect();
            tracing::warn!(target: TARGET, element, rounds = max_rounds, "refinement did not settle");
            return Err(UpdateError::RefinementDiverged {
                element: element.to_owned(),
                rounds: max_rounds,
                fields,
            });
        }
        next = next.with_patch(&round);
        applied += 1;

        let mut refined = Patch::new();
        for behavior in behaviors {
            if let Some(patch) = behavior.refine(&next, &round_changes) {
                refined.extend(patch);
            }
        }
        drop_undeclared(element, &mut refined, &next);
        round = refined;
    }
}

// ---------------------------------------------------------------------------
// ElementBuilder
// ---------------------------------------------------------------------------

/// Builder for [`Element`].
pub struct ElementBuilder {
    name: String,
    config: UpdateConfig,
    scheduler: Option<Rc<dyn Schedule>>,
    on_error: Option<ErrorHandler>,
    behaviors: Vec<Box<dyn Behavior>>,
    defaults: Patch,
}

impl ElementBuilder {
    /// Start a builder with no fields and no behaviors.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            config: UpdateConfig::default(),
            scheduler: None,
            on_error: None,
            behaviors: Vec::new(),
            defaults: Patch::new(),
        }
    }

    /// Replace the update configuration.
    pub fn config(mut self, config: UpdateConfig) -> Self {
        self.config = config;
        self
    }

    /// Run flushes on `scheduler` instead of the thread's default queue.
    pub fn scheduler(mut self, scheduler: impl Schedule + 'static) -> Self {
        self.scheduler = Some(Rc::new(scheduler));
        self
    }

    /// Receive errors from scheduled flushes instead of logging them.
    pub fn on_error(mut self, handler: impl Fn(UpdateError) + 'static) -> Self {
        self.on_error = Some(Rc::new(handler));
        self
    }

    /// Append a behavior. Behaviors run in the order they were added.
    pub fn behavior(mut self, behavior: impl Behavior + 'static) -> Self {
        self.behaviors.push(Box::new(behavior));
        self
    }

    /// Declare element-level default fields. These override behavior defaults.
    pub fn default_state(mut self, patch: Patch) -> Self {
        self.defaults.extend(patch);
        self
    }

    /// Declare a single default field.
    pub fn field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.defaults.set(name, value);
        self
    }

    /// Append a refinement closure as a behavior.
    pub fn refine_with(
        self,
        f: impl Fn(&Snapshot, &ChangeSet) -> Option<Patch> + 'static,
    ) -> Self {
        let name = format!("{}::refine", self.name);
        self.behavior(RefineFn::new(name, f))
    }

    /// Append a render closure as a behavior.
    pub fn on_render(
        self,
        f: impl FnMut(&mut RenderContext<'_>) -> Result<(), RenderError> + 'static,
    ) -> Self {
        let name = format!("{}::render", self.name);
        self.behavior(RenderFn::new(name, f))
    }

    /// Assemble the default snapshot, settle it, and create the element.
    ///
    /// Fails only if the refinement of the defaults does not settle.
    pub fn build(self) -> Result<Element, UpdateError> {
        let mut defaults = Patch::new();
        for behavior in &self.behaviors {
            defaults.extend(behavior.default_state());
        }
        defaults.extend(self.defaults);

        let initial = settle(
            &self.name,
            &self.behaviors,
            self.config.max_refinement_rounds,
            &Snapshot::default(),
            defaults,
        )?;
        let scheduler = self
            .scheduler
            .unwrap_or_else(|| Rc::new(current_queue()) as Rc<dyn Schedule>);
        let (settled, _) = watch::channel(0);

        tracing::debug!(target: TARGET, element = %self.name, fields = initial.len(), "element created");
        Ok(Element {
            inner: Rc::new(Inner {
                name: self.name,
                config: self.config,
                scheduler,
                on_error: self.on_error,
                unrendered: RefCell::new(ChangeSet::all(&initial)),
                unrendered_raise: Cell::new(false),
                state: RefCell::new(initial),
                last_rendered: RefCell::new(Snapshot::default()),
                pending: RefCell::new(Vec::new()),
                behaviors: RefCell::new(self.behaviors),
                outbox: RefCell::new(Vec::new()),
                phase: Cell::new(Phase::Idle),
                scheduled: Cell::new(false),
                raise_scope: Cell::new(false),
                alive: Cell::new(true),
                mounted: Cell::new(false),
                render_count: Cell::new(0),
                settled,
            }),
        })
    }
}

impl fmt::Debug for ElementBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElementBuilder")
            .field("name", &self.name)
            .field("behaviors", &self.behaviors.len())
            .field("defaults", &self.defaults)
            .finish()
    }
}

// ===========================================================================
// Tests
// ===========================================================================
