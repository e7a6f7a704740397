//! Reusable behaviors.
//!
//! - [`SelectedIndex`]: bounded single selection.
//! - [`ItemSelection`]: selection over a list with a known item count.
//!
//! The selection helpers (`select_next` and friends) queue their change with
//! [`Element::request_update_with`](crate::element::Element::request_update_with)
//! and report whether the move changes the selection as seen right now.

pub mod item_selection;
pub mod selected_index;

pub use item_selection::ItemSelection;
pub use selected_index::SelectedIndex;
