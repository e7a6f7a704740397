//! Host: owns elements, drives their flushes, and collects what they emit.

use std::cell::RefCell;
use std::rc::Rc;

use slotmap::SlotMap;

use crate::element::{Element, ElementBuilder, UpdateConfig, UpdateError};
use crate::event::{Envelope, EventDispatcher};
use crate::runtime::MicrotaskQueue;

use super::ElementId;

const TARGET: &str = "reactive_element::host";

/// What happened to an element while the host owned it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// Inserted and mounted.
    Mount { id: ElementId },
    /// Finished a render pass.
    Render { id: ElementId },
    /// Removed and destroyed.
    Unmount { id: ElementId },
}

struct Entry {
    element: Element,
    seen_renders: u64,
}

/// Single-threaded element host.
///
/// Elements built with [`Host::builder`] schedule their flushes on the host's
/// queue and report scheduled-flush errors to the host. Nothing runs until
/// [`Host::run_until_idle`] drains the queue.
pub struct Host {
    queue: MicrotaskQueue,
    config: UpdateConfig,
    elements: SlotMap<ElementId, Entry>,
    lifecycle: Vec<LifecycleEvent>,
    dispatcher: EventDispatcher,
    errors: Rc<RefCell<Vec<UpdateError>>>,
}

impl Host {
    /// Create an empty host with the default configuration.
    pub fn new() -> Self {
        Self::with_config(UpdateConfig::default())
    }

    /// A host whose elements use `config`.
    pub fn with_config(config: UpdateConfig) -> Self {
        Self {
            queue: MicrotaskQueue::new(),
            config,
            elements: SlotMap::with_key(),
            lifecycle: Vec::new(),
            dispatcher: EventDispatcher::new(),
            errors: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// The queue this host drains.
    pub fn queue(&self) -> &MicrotaskQueue {
        &self.queue
    }

    /// Configuration given to elements from [`builder`](Self::builder).
    pub fn config(&self) -> &UpdateConfig {
        &self.config
    }

    /// An element builder wired to this host's queue, config and error sink.
    pub fn builder(&self, name: impl Into<String>) -> ElementBuilder {
        let errors = Rc::clone(&self.errors);
        Element::builder(name)
            .scheduler(self.queue.clone())
            .config(self.config.clone())
            .on_error(move |err| {
                tracing::warn!(target: TARGET, element = err.element(), error = %err, "update failed");
                errors.borrow_mut().push(err);
            })
    }

    /// Take ownership of `element` and mount it.
    pub fn insert(&mut self, element: Element) -> ElementId {
        element.mount();
        let seen_renders = element.render_count();
        let name = element.name().to_owned();
        let id = self.elements.insert(Entry {
            element,
            seen_renders,
        });
        self.lifecycle.push(LifecycleEvent::Mount { id });
        tracing::debug!(target: TARGET, ?id, element = %name, "inserted");
        id
    }

    /// The element stored under `id`, if it is still in the host.
    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(id).map(|e| &e.element)
    }

    /// Remove and destroy an element. Events it already raised are kept.
    pub fn remove(&mut self, id: ElementId) -> Option<Element> {
        let entry = self.elements.remove(id)?;
        for event in entry.element.take_events() {
            self.dispatcher.push(Envelope::new(event, id));
        }
        entry.element.destroy();
        self.lifecycle.push(LifecycleEvent::Unmount { id });
        tracing::debug!(target: TARGET, ?id, element = %entry.element.name(), "removed");
        Some(entry.element)
    }

    /// Number of elements in the host.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Whether the host holds no elements.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Run queued flushes until none remain, then collect render passes and
    /// events. Returns the number of tasks run.
    pub fn run_until_idle(&mut self) -> usize {
        let ran = self.queue.run_until_idle();
        for (id, entry) in self.elements.iter_mut() {
            let renders = entry.element.render_count();
            for _ in entry.seen_renders..renders {
                self.lifecycle.push(LifecycleEvent::Render { id });
            }
            entry.seen_renders = renders;
            for event in entry.element.take_events() {
                self.dispatcher.push(Envelope::new(event, id));
            }
        }
        if ran > 0 {
            tracing::trace!(target: TARGET, tasks = ran, events = self.dispatcher.pending_count(), "host idle");
        }
        ran
    }

    /// Errors reported by scheduled flushes since the last call.
    pub fn take_errors(&mut self) -> Vec<UpdateError> {
        std::mem::take(&mut *self.errors.borrow_mut())
    }

    /// Events raised by elements, tagged with their source, oldest first.
    pub fn drain_events(&mut self) -> Vec<Envelope> {
        self.dispatcher.drain()
    }

    /// Mount, render and unmount records since the last call, oldest first.
    pub fn lifecycle_events(&mut self) -> Vec<LifecycleEvent> {
        std::mem::take(&mut self.lifecycle)
    }
}

impl Default for Host {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Host {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Host")
            .field("elements", &self.elements.len())
            .field("queued", &self.queue.len())
            .field("events", &self.dispatcher.pending_count())
            .finish()
    }
}

// ===========================================================================
// Tests
// ===========================================================================
