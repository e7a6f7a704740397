//! SelectedIndex: single selection with optional index bounds.
//!
//! Declares `selectedIndex` (default 0) and the optional bounds `minIndex` /
//! `maxIndex` (default null = unbounded). Whenever any of the three changes,
//! refinement clamps `selectedIndex` into the bounds.

use crate::element::{Behavior, Element, RenderContext, RenderError};
use crate::event::SelectedIndexChanged;
use crate::patch;
use crate::state::{ChangeSet, Patch, Snapshot};
use crate::value::Value;

pub const SELECTED_INDEX: &str = "selectedIndex";
pub const MIN_INDEX: &str = "minIndex";
pub const MAX_INDEX: &str = "maxIndex";

/// Single-selection behavior.
#[derive(Debug, Clone, Copy, Default)]
pub struct SelectedIndex;

impl SelectedIndex {
    pub fn new() -> Self {
        Self
    }

    /// Clamp `index` into the bounds declared by `state`.
    pub fn validate(index: i64, state: &Snapshot) -> i64 {
        let min = state.int(MIN_INDEX);
        let max = state.int(MAX_INDEX);
        match (min, max) {
            (Some(min), Some(max)) => index.min(max).max(min),
            (Some(min), None) => index.max(min),
            (None, Some(max)) => index.min(max),
            (None, None) => index,
        }
    }

    pub fn selected_index(state: &Snapshot) -> i64 {
        state.int(SELECTED_INDEX).unwrap_or(0)
    }

    /// False only when a `maxIndex` exists and the selection is on it.
    pub fn can_select_next(state: &Snapshot) -> bool {
        state
            .int(MAX_INDEX)
            .is_none_or(|max| Self::selected_index(state) < max)
    }

    /// False only when a `minIndex` exists and the selection is on it.
    pub fn can_select_previous(state: &Snapshot) -> bool {
        state
            .int(MIN_INDEX)
            .is_none_or(|min| Self::selected_index(state) > min)
    }

    /// Move the selection forward by one.
    ///
    /// Returns whether the move changes the selection relative to the
    /// current snapshot; at `i64::MAX` it cannot. Several calls in one turn
    /// accumulate.
    pub fn select_next(element: &Element) -> bool {
        Self::step(element, 1)
    }

    /// Move the selection back by one. See [`select_next`](Self::select_next).
    pub fn select_previous(element: &Element) -> bool {
        Self::step(element, -1)
    }

    /// Request a specific index; refinement clamps it.
    pub fn set_selected_index(element: &Element, index: i64) {
        element.request_update(patch! { SELECTED_INDEX => index });
    }

    /// The index one `delta` away, or `None` past the ends of `i64`.
    fn stepped(state: &Snapshot, delta: i64) -> Option<i64> {
        Self::selected_index(state)
            .checked_add(delta)
            .map(|index| Self::validate(index, state))
    }

    fn step(element: &Element, delta: i64) -> bool {
        let state = element.state();
        let current = Self::selected_index(&state);
        let changed = Self::stepped(&state, delta).is_some_and(|index| index != current);
        if changed {
            element.request_update_with(move |s| match Self::stepped(s, delta) {
                Some(index) => patch! { SELECTED_INDEX => index },
                None => Patch::new(),
            });
        }
        changed
    }
}

impl Behavior for SelectedIndex {
    fn name(&self) -> &str {
        "SelectedIndex"
    }

    fn default_state(&self) -> Patch {
        patch! {
            SELECTED_INDEX => 0,
            MIN_INDEX => Value::Null,
            MAX_INDEX => Value::Null,
        }
    }

    fn refine(&self, state: &Snapshot, changed: &ChangeSet) -> Option<Patch> {
        if !changed.any_of(&[SELECTED_INDEX, MIN_INDEX, MAX_INDEX]) {
            return None;
        }
        let index = Self::selected_index(state);
        let validated = Self::validate(index, state);
        (validated != index).then(|| patch! { SELECTED_INDEX => validated })
    }

    fn render(&mut self, cx: &mut RenderContext<'_>) -> Result<(), RenderError> {
        if cx.raise_change_events()
            && !cx.is_first_render()
            && cx.changed().is_changed(SELECTED_INDEX)
        {
            let selected_index = Self::selected_index(cx.state());
            cx.emit(SelectedIndexChanged { selected_index });
        }
        Ok(())
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::MicrotaskQueue;

    fn fixture(queue: &MicrotaskQueue) -> Element {
        let el = Element::builder("selected-index-test")
            .scheduler(queue.clone())
            .behavior(SelectedIndex::new())
            .build()
            .unwrap();
        el.mount();
        queue.run_until_idle();
        el
    }

    #[test]
    fn initial_index_is_zero() {
        let queue = MicrotaskQueue::new();
        let el = fixture(&queue);
        assert_eq!(el.state().int(SELECTED_INDEX), Some(0));
        assert!(el.take_events().is_empty());
    }

    #[test]
    fn advance_without_bounds() {
        let queue = MicrotaskQueue::new();
        let el = fixture(&queue);
        assert!(SelectedIndex::select_next(&el));
        queue.run_until_idle();
        assert_eq!(el.state().int(SELECTED_INDEX), Some(1));
        assert!(SelectedIndex::select_next(&el));
        queue.run_until_idle();
        assert_eq!(el.state().int(SELECTED_INDEX), Some(2));
    }

    #[test]
    fn move_back_without_bounds_goes_negative() {
        let queue = MicrotaskQueue::new();
        let el = fixture(&queue);
        assert!(SelectedIndex::select_previous(&el));
        queue.run_until_idle();
        assert_eq!(el.state().int(SELECTED_INDEX), Some(-1));
        assert!(SelectedIndex::select_previous(&el));
        queue.run_until_idle();
        assert_eq!(el.state().int(SELECTED_INDEX), Some(-2));
    }

    #[test]
    fn steps_in_one_turn_accumulate() {
        let queue = MicrotaskQueue::new();
        let el = fixture(&queue);
        SelectedIndex::select_next(&el);
        SelectedIndex::select_next(&el);
        SelectedIndex::select_next(&el);
        queue.run_until_idle();
        assert_eq!(el.state().int(SELECTED_INDEX), Some(3));
    }

    #[test]
    fn bounds_clamp_selection() {
        let queue = MicrotaskQueue::new();
        let el = fixture(&queue);
        el.request_update(patch! { MIN_INDEX => 0, MAX_INDEX => 2 });
        SelectedIndex::set_selected_index(&el, 10);
        queue.run_until_idle();
        assert_eq!(el.state().int(SELECTED_INDEX), Some(2));
        assert!(!SelectedIndex::can_select_next(&el.state()));
        assert!(!SelectedIndex::select_next(&el));
        assert!(SelectedIndex::can_select_previous(&el.state()));
    }

    #[test]
    fn shrinking_bounds_moves_selection() {
        let queue = MicrotaskQueue::new();
        let el = fixture(&queue);
        SelectedIndex::set_selected_index(&el, 5);
        queue.run_until_idle();
        el.request_update(patch! { MAX_INDEX => 3 });
        queue.run_until_idle();
        assert_eq!(el.state().int(SELECTED_INDEX), Some(3));
    }

    #[test]
    fn emits_change_event() {
        let queue = MicrotaskQueue::new();
        let el = fixture(&queue);
        el.raising_change_events(SelectedIndex::select_next);
        queue.run_until_idle();
        let events = el.take_events();
        assert_eq!(events.len(), 1);
        let event = events[0]
            .as_any()
            .downcast_ref::<SelectedIndexChanged>()
            .unwrap();
        assert_eq!(event.selected_index, 1);
    }

    #[test]
    fn programmatic_changes_are_silent() {
        let queue = MicrotaskQueue::new();
        let el = fixture(&queue);
        SelectedIndex::set_selected_index(&el, 3);
        queue.run_until_idle();
        SelectedIndex::select_next(&el);
        queue.run_until_idle();
        assert_eq!(el.state().int(SELECTED_INDEX), Some(4));
        assert!(el.take_events().is_empty());

        // Mixed into the same flush as a raising update, the change is announced.
        SelectedIndex::set_selected_index(&el, 0);
        el.raising_change_events(|el| SelectedIndex::set_selected_index(el, 1));
        queue.run_until_idle();
        let events = el.take_events();
        assert_eq!(events.len(), 1);
        assert_eq!(
            events[0].as_any().downcast_ref::<SelectedIndexChanged>(),
            Some(&SelectedIndexChanged { selected_index: 1 })
        );
    }

    #[test]
    fn raising_scope_ends_with_the_closure() {
        let queue = MicrotaskQueue::new();
        let el = fixture(&queue);
        el.raising_change_events(|el| {
            SelectedIndex::select_next(el);
        });
        SelectedIndex::select_next(&el);
        queue.run_until_idle();
        el.take_events();

        SelectedIndex::select_next(&el);
        queue.run_until_idle();
        assert_eq!(el.state().int(SELECTED_INDEX), Some(3));
        assert!(el.take_events().is_empty());
    }

    #[test]
    fn stepping_stops_at_integer_limits() {
        let queue = MicrotaskQueue::new();
        let el = fixture(&queue);
        SelectedIndex::set_selected_index(&el, i64::MAX);
        queue.run_until_idle();
        assert!(!SelectedIndex::select_next(&el));
        assert!(SelectedIndex::select_previous(&el));
        queue.run_until_idle();
        assert_eq!(el.state().int(SELECTED_INDEX), Some(i64::MAX - 1));

        SelectedIndex::set_selected_index(&el, i64::MIN);
        queue.run_until_idle();
        assert!(!SelectedIndex::select_previous(&el));
        assert_eq!(el.pending_len(), 0);
        assert!(SelectedIndex::select_next(&el));
        queue.run_until_idle();
        assert_eq!(el.state().int(SELECTED_INDEX), Some(i64::MIN + 1));
    }

    #[test]
    fn queued_step_past_the_limit_is_dropped() {
        let queue = MicrotaskQueue::new();
        let el = fixture(&queue);
        SelectedIndex::set_selected_index(&el, i64::MAX - 1);
        queue.run_until_idle();
        // Both see MAX - 1 now; the second would overflow at flush time.
        assert!(SelectedIndex::select_next(&el));
        assert!(SelectedIndex::select_next(&el));
        queue.run_until_idle();
        assert_eq!(el.state().int(SELECTED_INDEX), Some(i64::MAX));
    }

    #[test]
    fn validate_respects_each_bound() {
        let both = Snapshot::new([(MIN_INDEX, 1), (MAX_INDEX, 4)]);
        assert_eq!(SelectedIndex::validate(0, &both), 1);
        assert_eq!(SelectedIndex::validate(9, &both), 4);
        let min_only = Snapshot::new([(MIN_INDEX, 1)]);
        assert_eq!(SelectedIndex::validate(-3, &min_only), 1);
        assert_eq!(SelectedIndex::validate(30, &min_only), 30);
        let max_only = Snapshot::new([(MAX_INDEX, 2)]);
        assert_eq!(SelectedIndex::validate(30, &max_only), 2);
    }
}
