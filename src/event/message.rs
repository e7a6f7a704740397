//! Event trait, envelope, and built-in events.
//!
//! Render behaviors emit events through the render context; the element keeps
//! them in an outbox until the host drains them. [`Envelope`] tags an event
//! with the element that raised it.

use std::any::Any;

use crate::host::ElementId;
use crate::value::Value;

// ---------------------------------------------------------------------------
// Event trait
// ---------------------------------------------------------------------------

/// Object-safe event trait with downcasting.
pub trait Event: 'static {
    /// Upcast to `&dyn Any` for downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Event name, in the kebab-case style hosts usually expose.
    fn event_name(&self) -> &str;
}

impl std::fmt::Debug for dyn Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Event({})", self.event_name())
    }
}

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

/// An event plus the element it came from.
pub struct Envelope {
    pub event: Box<dyn Event>,
    pub source: ElementId,
}

impl Envelope {
    pub fn new(event: Box<dyn Event>, source: ElementId) -> Self {
        Self { event, source }
    }

    /// Attempt to downcast the event to a concrete type.
    pub fn downcast_ref<T: Event>(&self) -> Option<&T> {
        self.event.as_any().downcast_ref::<T>()
    }

    pub fn event_name(&self) -> &str {
        self.event.event_name()
    }
}

impl std::fmt::Debug for Envelope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Envelope")
            .field("event_name", &self.event.event_name())
            .field("source", &self.source)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Built-in events
// ---------------------------------------------------------------------------

/// The selected index of a selection behavior changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectedIndexChanged {
    pub selected_index: i64,
}

impl Event for SelectedIndexChanged {
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn event_name(&self) -> &str {
        "selected-index-changed"
    }
}

/// User-defined event with a name and a payload.
#[derive(Debug, Clone)]
pub struct Custom {
    pub name: String,
    pub detail: Value,
}

impl Custom {
    pub fn new(name: impl Into<String>, detail: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            detail: detail.into(),
        }
    }
}

impl Event for Custom {
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn event_name(&self) -> &str {
        &self.name
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    fn make_id(sm: &mut SlotMap<ElementId, ()>) -> ElementId {
        sm.insert(())
    }

    #[test]
    fn selected_index_changed_name() {
        let e = SelectedIndexChanged { selected_index: 2 };
        assert_eq!(e.event_name(), "selected-index-changed");
    }

    #[test]
    fn custom_event_uses_its_name() {
        let e = Custom::new("opened", true);
        assert_eq!(e.event_name(), "opened");
        assert_eq!(e.detail.as_bool(), Some(true));
    }

    #[test]
    fn envelope_downcast() {
        let mut sm = SlotMap::with_key();
        let source = make_id(&mut sm);
        let env = Envelope::new(Box::new(SelectedIndexChanged { selected_index: 1 }), source);
        assert_eq!(env.source, source);
        assert_eq!(
            env.downcast_ref::<SelectedIndexChanged>(),
            Some(&SelectedIndexChanged { selected_index: 1 })
        );
        assert!(env.downcast_ref::<Custom>().is_none());
    }

    #[test]
    fn envelope_debug_format() {
        let mut sm = SlotMap::with_key();
        let source = make_id(&mut sm);
        let env = Envelope::new(Box::new(Custom::new("ping", Value::Null)), source);
        let dbg = format!("{env:?}");
        assert!(dbg.contains("Envelope"));
        assert!(dbg.contains("ping"));
    }
}
