//! Event dispatcher: FIFO queue of envelopes awaiting the host.

use std::collections::VecDeque;

use super::message::Envelope;

/// Queue-based event dispatcher.
///
/// Envelopes are enqueued via `push` and drained via `drain`. Routing is the
/// host's business.
#[derive(Debug, Default)]
pub struct EventDispatcher {
    queue: VecDeque<Envelope>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, envelope: Envelope) {
        self.queue.push_back(envelope);
    }

    /// Drain all pending envelopes in arrival order.
    pub fn drain(&mut self) -> Vec<Envelope> {
        self.queue.drain(..).collect()
    }

    pub fn pending_count(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::message::{Custom, SelectedIndexChanged};
    use crate::host::ElementId;
    use slotmap::SlotMap;

    #[test]
    fn drain_preserves_order_and_empties() {
        let mut sm: SlotMap<ElementId, ()> = SlotMap::with_key();
        let id = sm.insert(());
        let mut d = EventDispatcher::new();
        d.push(Envelope::new(Box::new(Custom::new("a", 1)), id));
        d.push(Envelope::new(
            Box::new(SelectedIndexChanged { selected_index: 0 }),
            id,
        ));
        assert_eq!(d.pending_count(), 2);

        let drained = d.drain();
        let names: Vec<_> = drained.iter().map(Envelope::event_name).collect();
        assert_eq!(names, vec!["a", "selected-index-changed"]);
        assert!(d.is_empty());
    }
}
