//! ItemSelection: single selection over a list of items.
//!
//! The list length lives in `itemCount` and stays null until the host knows
//! it. `selectedIndex` is -1 when nothing is selected. Refinement keeps the
//! index valid for the current count and flags, then derives
//! `canSelectNext` / `canSelectPrevious` from the validated index, so one
//! update can cascade through two refinement rounds.

use crate::element::{Behavior, Element, RenderContext, RenderError};
use crate::event::SelectedIndexChanged;
use crate::patch;
use crate::state::{ChangeSet, Patch, Snapshot};
use crate::value::Value;

pub const ITEM_COUNT: &str = "itemCount";
pub const SELECTED_INDEX: &str = "selectedIndex";
pub const SELECTION_REQUIRED: &str = "selectionRequired";
pub const SELECTION_WRAPS: &str = "selectionWraps";
pub const CAN_SELECT_NEXT: &str = "canSelectNext";
pub const CAN_SELECT_PREVIOUS: &str = "canSelectPrevious";

const INPUTS: [&str; 4] = [ITEM_COUNT, SELECTED_INDEX, SELECTION_REQUIRED, SELECTION_WRAPS];

/// List-selection behavior.
#[derive(Debug, Clone, Copy, Default)]
pub struct ItemSelection;

/// The fields that drive selection, read from a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Selection {
    count: Option<i64>,
    index: i64,
    required: bool,
    wraps: bool,
}

impl Selection {
    fn read(state: &Snapshot) -> Self {
        Self {
            count: state.int(ITEM_COUNT),
            index: state.int(SELECTED_INDEX).unwrap_or(-1),
            required: state.bool(SELECTION_REQUIRED).unwrap_or(false),
            wraps: state.bool(SELECTION_WRAPS).unwrap_or(false),
        }
    }

    /// A usable item count, if there is at least one item.
    fn items(&self) -> Option<i64> {
        self.count.filter(|&c| c > 0)
    }

    fn validate(&self, index: i64) -> i64 {
        match self.count {
            // Unknown length: leave the index alone.
            None => index,
            Some(c) if c <= 0 => -1,
            Some(c) if self.wraps && index != -1 => index.rem_euclid(c),
            Some(c) => {
                let min = if self.required { 0 } else { -1 };
                index.clamp(min, c - 1)
            }
        }
    }

    fn can_select_next(&self) -> bool {
        self.items()
            .is_some_and(|c| self.wraps || self.index < 0 || self.index < c - 1)
    }

    fn can_select_previous(&self) -> bool {
        self.items()
            .is_some_and(|_| self.wraps || self.index < 0 || self.index > 0)
    }

    fn next(&self) -> Option<i64> {
        let c = self.items()?;
        Some(if self.index < 0 {
            0
        } else if self.wraps {
            self.index.saturating_add(1) % c
        } else {
            self.index.saturating_add(1).min(c - 1)
        })
    }

    fn previous(&self) -> Option<i64> {
        let c = self.items()?;
        Some(if self.index < 0 {
            c - 1
        } else if self.wraps {
            (self.index - 1).rem_euclid(c)
        } else {
            (self.index - 1).max(0)
        })
    }
}

impl ItemSelection {
    pub fn new() -> Self {
        Self
    }

    pub fn selected_index(state: &Snapshot) -> i64 {
        Selection::read(state).index
    }

    /// Validate `index` against the count and flags in `state`.
    pub fn validate(index: i64, state: &Snapshot) -> i64 {
        Selection::read(state).validate(index)
    }

    /// Select the first item. Returns whether the selection changes.
    pub fn select_first(element: &Element) -> bool {
        Self::select_with(element, |s| s.items().map(|_| 0))
    }

    /// Select the last item. Returns whether the selection changes.
    pub fn select_last(element: &Element) -> bool {
        Self::select_with(element, |s| s.items().map(|c| c - 1))
    }

    /// Select the next item; with nothing selected this picks the first.
    pub fn select_next(element: &Element) -> bool {
        Self::select_with(element, Selection::next)
    }

    /// Select the previous item; with nothing selected this picks the last.
    pub fn select_previous(element: &Element) -> bool {
        Self::select_with(element, Selection::previous)
    }

    /// Tell the behavior how many items the list holds.
    pub fn set_item_count(element: &Element, count: Option<i64>) {
        element.request_update(patch! { ITEM_COUNT => count });
    }

    // The target index is worked out again at flush time so that several
    // moves in one turn build on each other.
    fn select_with(element: &Element, target: fn(&Selection) -> Option<i64>) -> bool {
        let current = Selection::read(&element.state());
        let changes = target(&current).is_some_and(|i| i != current.index);
        if changes {
            element.request_update_with(move |s| match target(&Selection::read(s)) {
                Some(index) => patch! { SELECTED_INDEX => index },
                None => Patch::new(),
            });
        }
        changes
    }
}

impl Behavior for ItemSelection {
    fn name(&self) -> &str {
        "ItemSelection"
    }

    fn default_state(&self) -> Patch {
        patch! {
            ITEM_COUNT => Value::Null,
            SELECTED_INDEX => -1,
            SELECTION_REQUIRED => false,
            SELECTION_WRAPS => false,
            CAN_SELECT_NEXT => false,
            CAN_SELECT_PREVIOUS => false,
        }
    }

    fn refine(&self, state: &Snapshot, changed: &ChangeSet) -> Option<Patch> {
        if !changed.any_of(&INPUTS) {
            return None;
        }
        let selection = Selection::read(state);
        let validated = selection.validate(selection.index);
        if validated != selection.index {
            // Derived flags follow in the next round.
            return Some(patch! { SELECTED_INDEX => validated });
        }
        Some(patch! {
            CAN_SELECT_NEXT => selection.can_select_next(),
            CAN_SELECT_PREVIOUS => selection.can_select_previous(),
        })
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
