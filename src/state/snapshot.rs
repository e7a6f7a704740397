//! Snapshot and Patch: immutable state and partial updates.

use std::collections::btree_map;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use crate::value::Value;

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// Immutable named-field state of an element at a point in time.
///
/// Cloning a snapshot is cheap: the field map is shared. A new snapshot is
/// produced for every committed update; existing snapshots never change.
#[derive(Clone, Default)]
pub struct Snapshot {
    fields: Rc<BTreeMap<String, Value>>,
}

impl Snapshot {
    /// Create a snapshot from `(name, value)` pairs.
    pub fn new<K, V>(fields: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        Self {
            fields: Rc::new(
                fields
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate `(name, value)` pairs in name order.
    pub fn iter(&self) -> btree_map::Iter<'_, String, Value> {
        self.fields.iter()
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// The field as an integer, if present and an `Int`.
    pub fn int(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(Value::as_int)
    }

    /// The field as a bool, if present and a `Bool`.
    pub fn bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(Value::as_bool)
    }

    /// The field as a string slice, if present and a `Str`.
    pub fn str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    /// Whether both snapshots share the same field map.
    pub fn ptr_eq(&self, other: &Snapshot) -> bool {
        Rc::ptr_eq(&self.fields, &other.fields)
    }

    /// Copy-on-write merge: a new snapshot with `patch` applied.
    ///
    /// Returns a clone of `self` (same map) when the patch is empty.
    pub fn with_patch(&self, patch: &Patch) -> Snapshot {
        if patch.is_empty() {
            return self.clone();
        }
        let mut fields = (*self.fields).clone();
        for (name, value) in patch.iter() {
            fields.insert(name.clone(), value.clone());
        }
        Snapshot {
            fields: Rc::new(fields),
        }
    }
}

impl fmt::Debug for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.fields.iter()).finish()
    }
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (name, value)) in self.fields.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{name}: {value}")?;
        }
        f.write_str("}")
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Snapshot {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Snapshot::new(iter)
    }
}

// ---------------------------------------------------------------------------
// Patch
// ---------------------------------------------------------------------------

/// A partial-field mapping to merge into a snapshot.
///
/// Setting the same field twice keeps the later value.
#[derive(Clone, Default)]
pub struct Patch {
    fields: BTreeMap<String, Value>,
}

impl Patch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field (builder).
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    /// Set a field, replacing any earlier value for it.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(name.into(), value.into());
    }

    /// Merge `other` into `self`; `other` wins on conflicts.
    pub fn extend(&mut self, other: Patch) {
        self.fields.extend(other.fields);
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, Value> {
        self.fields.iter()
    }

    /// Drop every field that `snapshot` does not declare.
    ///
    /// Returns the names that were removed.
    pub fn retain_declared(&mut self, snapshot: &Snapshot) -> Vec<String> {
        let undeclared: Vec<String> = self
            .fields
            .keys()
            .filter(|name| !snapshot.contains(name))
            .cloned()
            .collect();
        for name in &undeclared {
            self.fields.remove(name);
        }
        undeclared
    }
}

impl fmt::Debug for Patch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.fields.iter()).finish()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Patch {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl IntoIterator for Patch {
    type Item = (String, Value);
    type IntoIter = btree_map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}

/// Build a [`Patch`] inline.
///
/// ```ignore
/// let p = patch! { "count" => 1, "label" => "one" };
/// ```
#[macro_export]
macro_rules! patch {
    () => {
        $crate::state::Patch::new()
    };
    ($($name:expr => $value:expr),+ $(,)?) => {{
        let mut p = $crate::state::Patch::new();
        $( p.set($name, $value); )+
        p
    }};
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_getters() {
        let s = Snapshot::new([("count", Value::from(2)), ("open", Value::from(true))]);
        assert_eq!(s.int("count"), Some(2));
        assert_eq!(s.bool("open"), Some(true));
        assert_eq!(s.str("count"), None);
        assert!(s.contains("open"));
        assert!(!s.contains("missing"));
        assert_eq!(s.len(), 2);
    }

    #[test]
    fn with_patch_leaves_original_untouched() {
        let s = Snapshot::new([("count", 0)]);
        let next = s.with_patch(&patch! { "count" => 1 });
        assert_eq!(s.int("count"), Some(0));
        assert_eq!(next.int("count"), Some(1));
        assert!(!s.ptr_eq(&next));
    }

    #[test]
    fn empty_patch_shares_map() {
        let s = Snapshot::new([("count", 0)]);
        assert!(s.ptr_eq(&s.with_patch(&Patch::new())));
    }

    #[test]
    fn later_set_wins() {
        let mut p = patch! { "x" => 1 };
        p.set("x", 2);
        assert_eq!(p.get("x").and_then(Value::as_int), Some(2));

        let mut a = patch! { "x" => 1, "y" => 1 };
        a.extend(patch! { "x" => 3 });
        assert_eq!(a.get("x").and_then(Value::as_int), Some(3));
        assert_eq!(a.get("y").and_then(Value::as_int), Some(1));
    }

    #[test]
    fn retain_declared_reports_unknown_fields() {
        let s = Snapshot::new([("count", 0)]);
        let mut p = patch! { "count" => 1, "bogus" => true };
        let removed = p.retain_declared(&s);
        assert_eq!(removed, vec![String::from("bogus")]);
        assert_eq!(p.len(), 1);
        assert!(p.contains("count"));
    }

    #[test]
    fn display_lists_fields_in_name_order() {
        let s = Snapshot::new([("b", Value::from("x")), ("a", Value::from(1))]);
        insta::assert_snapshot!(s.to_string(), @r#"{a: 1, b: "x"}"#);
    }
}
