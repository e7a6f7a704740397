//! RenderRecorder: a behavior that records every render it sees.

use std::cell::RefCell;
use std::rc::Rc;

use crate::element::{Behavior, RenderContext, RenderError};
use crate::state::Snapshot;

/// One observed render pass.
#[derive(Debug, Clone)]
pub struct RenderRecord {
    /// Changed field names, in name order.
    pub changed: Vec<String>,
    /// The snapshot that was rendered.
    pub state: Snapshot,
}

/// Shared view of what a [`RenderRecorder`] saw.
#[derive(Debug, Clone, Default)]
pub struct Recording {
    records: Rc<RefCell<Vec<RenderRecord>>>,
}

impl Recording {
    /// Number of renders recorded.
    pub fn len(&self) -> usize {
        self.records.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.borrow().is_empty()
    }

    pub fn records(&self) -> Vec<RenderRecord> {
        self.records.borrow().clone()
    }

    pub fn last(&self) -> Option<RenderRecord> {
        self.records.borrow().last().cloned()
    }

    /// Changed field names of the most recent render.
    pub fn last_changed(&self) -> Vec<String> {
        self.last().map(|r| r.changed).unwrap_or_default()
    }

    pub fn clear(&self) {
        self.records.borrow_mut().clear();
    }
}

/// Behavior that appends a [`RenderRecord`] on every render.
#[derive(Debug)]
pub struct RenderRecorder {
    recording: Recording,
}

impl RenderRecorder {
    /// Create a recorder and the handle for reading its records.
    pub fn new() -> (Self, Recording) {
        let recording = Recording::default();
        (
            Self {
                recording: recording.clone(),
            },
            recording,
        )
    }
}

impl Behavior for RenderRecorder {
    fn name(&self) -> &str {
        "RenderRecorder"
    }

    fn render(&mut self, cx: &mut RenderContext<'_>) -> Result<(), RenderError> {
        self.recording.records.borrow_mut().push(RenderRecord {
            changed: cx.changed().changed_fields().map(str::to_owned).collect(),
            state: cx.state().clone(),
        });
        Ok(())
    }
}
