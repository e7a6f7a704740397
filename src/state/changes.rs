//! Change-set calculation between snapshots.
//!
//! Comparison is shallow: one [`Value::same`](crate::value::Value::same) call per field, so a diff costs
//! O(number of fields) regardless of how large composite values are.

use std::collections::BTreeMap;
use std::fmt;

use super::snapshot::{Patch, Snapshot};

/// Boolean-per-field record of what differs between two snapshots.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    fields: BTreeMap<String, bool>,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compare every field present in either snapshot.
    pub fn diff(previous: &Snapshot, current: &Snapshot) -> Self {
        let mut fields = BTreeMap::new();
        for (name, value) in current.iter() {
            let changed = previous.get(name).is_none_or(|old| !old.same(value));
            fields.insert(name.clone(), changed);
        }
        for name in previous.field_names() {
            if !current.contains(name) {
                fields.insert(name.to_owned(), true);
            }
        }
        Self { fields }
    }

    /// Fields of `patch` whose values differ from `state`.
    ///
    /// Only changed fields get an entry.
    pub fn of_patch(state: &Snapshot, patch: &Patch) -> Self {
        let fields = patch
            .iter()
            .filter(|(name, value)| !state.get(name).is_some_and(|old| old.same(value)))
            .map(|(name, _)| (name.clone(), true))
            .collect();
        Self { fields }
    }

    /// A change-set marking every field of `snapshot` as changed.
    pub fn all(snapshot: &Snapshot) -> Self {
        Self {
            fields: snapshot.field_names().map(|n| (n.to_owned(), true)).collect(),
        }
    }

    /// Whether `name` changed. Unknown names report `false`.
    pub fn is_changed(&self, name: &str) -> bool {
        self.fields.get(name).copied().unwrap_or(false)
    }

    /// Whether any of `names` changed.
    pub fn any_of(&self, names: &[&str]) -> bool {
        names.iter().any(|n| self.is_changed(n))
    }

    /// At least one field changed.
    pub fn any(&self) -> bool {
        self.fields.values().any(|changed| *changed)
    }

    /// Names of the changed fields, in name order.
    pub fn changed_fields(&self) -> impl Iterator<Item = &str> {
        self.fields
            .iter()
            .filter(|(_, changed)| **changed)
            .map(|(name, _)| name.as_str())
    }

    /// Number of changed fields.
    pub fn count(&self) -> usize {
        self.changed_fields().count()
    }

    /// Number of compared fields (changed or not).
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// OR `other` into `self`.
    pub fn union(&mut self, other: &ChangeSet) {
        for (name, changed) in &other.fields {
            let entry = self.fields.entry(name.clone()).or_insert(false);
            *entry |= *changed;
        }
    }

    /// Iterate `(name, changed)` entries.
    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> {
        self.fields.iter().map(|(n, c)| (n.as_str(), *c))
    }
}

impl fmt::Display for ChangeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, name) in self.changed_fields().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(name)?;
        }
        f.write_str("}")
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patch;
    use crate::value::Value;
    use pretty_assertions::assert_eq;

    #[test]
    fn identical_snapshots_have_no_changes() {
        let s = Snapshot::new([("a", 1), ("b", 2)]);
        let c = ChangeSet::diff(&s, &s.clone());
        assert!(!c.any());
        assert_eq!(c.len(), 2);
    }

    #[test]
    fn diff_marks_changed_fields() {
        let old = Snapshot::new([("a", 1), ("b", 2)]);
        let new = old.with_patch(&patch! { "b" => 3 });
        let c = ChangeSet::diff(&old, &new);
        assert!(!c.is_changed("a"));
        assert!(c.is_changed("b"));
        assert_eq!(c.changed_fields().collect::<Vec<_>>(), vec!["b"]);
    }

    #[test]
    fn diff_covers_keys_in_either_snapshot() {
        let old = Snapshot::new([("a", 1)]);
        let new = Snapshot::new([("b", 1)]);
        let c = ChangeSet::diff(&old, &new);
        assert!(c.is_changed("a"));
        assert!(c.is_changed("b"));
    }

    #[test]
    fn composite_compared_by_identity() {
        let list = Value::list([1, 2]);
        let old = Snapshot::new([("items", list.clone())]);

        // Same list, mutated in place: no change.
        list.as_list().unwrap().borrow_mut().push(Value::from(3));
        let same = old.with_patch(&patch! { "items" => list.clone() });
        assert!(!ChangeSet::diff(&old, &same).any());

        // Equal contents, new list: change.
        let replaced = old.with_patch(&patch! { "items" => Value::list([1, 2, 3]) });
        assert!(ChangeSet::diff(&old, &replaced).is_changed("items"));
    }

    #[test]
    fn of_patch_lists_only_differences() {
        let s = Snapshot::new([("a", 1), ("b", 2)]);
        let c = ChangeSet::of_patch(&s, &patch! { "a" => 1, "b" => 5 });
        assert_eq!(c.changed_fields().collect::<Vec<_>>(), vec!["b"]);
        assert_eq!(c.len(), 1);
    }

    #[test]
    fn union_ors_entries() {
        let mut a = ChangeSet::of_patch(&Snapshot::default(), &patch! { "x" => 1 });
        let b = ChangeSet::of_patch(&Snapshot::default(), &patch! { "y" => 1 });
        a.union(&b);
        assert_eq!(a.to_string(), "{x, y}");
        assert!(a.any_of(&["y", "z"]));
    }

    #[test]
    fn unknown_field_is_unchanged() {
        assert!(!ChangeSet::new().is_changed("anything"));
    }
}
