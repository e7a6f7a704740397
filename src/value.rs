//! Field values: the dynamically typed contents of a state snapshot.
//!
//! Scalars (`Null`, `Bool`, `Int`, `Float`, `Str`) compare by value. Composite
//! values (`List`, `Record`, `Opaque`) live behind shared pointers and compare
//! by reference identity, so producers of composite state must build a new
//! value to signal a change. Mutating a shared list in place and submitting
//! the same value again is deliberately invisible to change detection.

use std::any::Any;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

/// Shared, mutable list storage.
pub type SharedList = Rc<RefCell<Vec<Value>>>;

/// Shared, mutable record storage.
pub type SharedRecord = Rc<RefCell<BTreeMap<String, Value>>>;

// ---------------------------------------------------------------------------
// Value
// ---------------------------------------------------------------------------

/// A single field value inside a [`Snapshot`](crate::state::Snapshot).
#[derive(Clone, Default)]
pub enum Value {
    /// Absent / not yet known.
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(Rc<str>),
    /// A list, compared by identity.
    List(SharedList),
    /// A string-keyed record, compared by identity.
    Record(SharedRecord),
    /// Any host value (an item handle, a callback table), compared by identity.
    Opaque(Rc<dyn Any>),
}

impl Value {
    /// Build a fresh list value.
    pub fn list(items: impl IntoIterator<Item = impl Into<Value>>) -> Self {
        Value::List(Rc::new(RefCell::new(
            items.into_iter().map(Into::into).collect(),
        )))
    }

    /// Build a fresh record value.
    pub fn record<K, V>(fields: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        Value::Record(Rc::new(RefCell::new(
            fields
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )))
    }

    /// Wrap an arbitrary host value.
    pub fn opaque<T: Any>(value: T) -> Self {
        Value::Opaque(Rc::new(value))
    }

    /// Strict-equality test used by change detection.
    ///
    /// Scalars compare by value (NaN equals NaN), composites by identity.
    pub fn same(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b || (a.is_nan() && b.is_nan()),
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::List(a), Value::List(b)) => Rc::ptr_eq(a, b),
            (Value::Record(a), Value::Record(b)) => Rc::ptr_eq(a, b),
            (Value::Opaque(a), Value::Opaque(b)) => std::ptr::addr_eq(Rc::as_ptr(a), Rc::as_ptr(b)),
            _ => false,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Numeric view: ints widen to floats.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(n) => Some(*n),
            Value::Int(n) => Some(*n as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&SharedList> {
        match self {
            Value::List(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&SharedRecord> {
        match self {
            Value::Record(r) => Some(r),
            _ => None,
        }
    }

    /// Downcast an [`Value::Opaque`] payload.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match self {
            Value::Opaque(any) => any.downcast_ref::<T>(),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(i64::from(n))
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Int(i64::from(n))
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(Rc::from(s))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(Rc::from(s))
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

impl From<SharedList> for Value {
    fn from(l: SharedList) -> Self {
        Value::List(l)
    }
}

impl From<SharedRecord> for Value {
    fn from(r: SharedRecord) -> Self {
        Value::Record(r)
    }
}

// ---------------------------------------------------------------------------
// Formatting
// ---------------------------------------------------------------------------

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("Null"),
            Value::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            Value::Int(n) => f.debug_tuple("Int").field(n).finish(),
            Value::Float(n) => f.debug_tuple("Float").field(n).finish(),
            Value::Str(s) => f.debug_tuple("Str").field(&&**s).finish(),
            Value::List(l) => f.debug_tuple("List").field(&l.borrow()).finish(),
            Value::Record(r) => f.debug_tuple("Record").field(&r.borrow()).finish(),
            Value::Opaque(any) => write!(f, "Opaque({:p})", Rc::as_ptr(any)),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(n) => write!(f, "{n}"),
            Value::Str(s) => write!(f, "{s:?}"),
            Value::List(l) => {
                f.write_str("[")?;
                for (i, item) in l.borrow().iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Value::Record(r) => {
                f.write_str("{")?;
                for (i, (k, v)) in r.borrow().iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{k}: {v}")?;
                }
                f.write_str("}")
            }
            Value::Opaque(_) => f.write_str("<opaque>"),
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================
