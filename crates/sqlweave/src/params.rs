//! Literal values and the parameter table.
//!
//! The table assigns 1-based ordinals to literals in first-seen order. Equal
//! literals share one ordinal, so a value bound at several positions shows up
//! once in the output. Array literals are keyed by the identity of the node
//! that carries them rather than by content.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A literal bound to a placeholder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// SQL NULL
    Null,
    /// Boolean literal
    Bool(bool),
    /// Integer literal, widened to 64 bits
    Int(i64),
    /// Floating point literal
    Float(f64),
    /// Text literal
    Text(String),
    /// Array literal (Postgres `ANY($n)` style binds)
    Array(Vec<Value>),
}

impl Value {
    /// Short name of the variant, used in type mismatch messages
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Text(_) => "text",
            Self::Array(_) => "array",
        }
    }

    /// Whether this is SQL NULL
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("NULL"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Text(s) => write!(f, "'{s}'"),
            Self::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
        }
    }
}

macro_rules! impl_from_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Self::Int(i64::from(v))
                }
            }
        )*
    };
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Self::Float(f64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Self::Array(v.into_iter().map(Into::into).collect())
    }
}

/// Lookup equality: floats compare by bit pattern so a NaN matches itself.
fn same_literal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Float(x), Value::Float(y)) => x.to_bits() == y.to_bits(),
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| same_literal(x, y))
        }
        _ => a == b,
    }
}

/// How an entry in the [`ParamTable`] is looked up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKey {
    /// Keyed by the value itself (equality lookup)
    Literal,
    /// Keyed by the identity of the node that owns the value
    Node(u64),
}

/// Insertion-ordered registry mapping literals to placeholder ordinals.
///
/// Lookups are linear. Parameter counts per query are small and this keeps
/// values that cannot be hashed (floats, arrays) as ordinary entries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParamTable {
    entries: Vec<(ParamKey, Value)>,
}

impl ParamTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a literal and return its 1-based ordinal.
    ///
    /// An equal literal registered earlier keeps its ordinal.
    pub fn add(&mut self, value: impl Into<Value>) -> usize {
        let value = value.into();
        if let Some(ordinal) = self.ordinal_of(&value) {
            return ordinal;
        }
        self.entries.push((ParamKey::Literal, value));
        self.entries.len()
    }

    /// Register a value owned by node `id` and return its 1-based ordinal.
    ///
    /// Two nodes with equal content get separate ordinals.
    pub fn add_node(&mut self, id: u64, value: impl Into<Value>) -> usize {
        if let Some(pos) = self
            .entries
            .iter()
            .position(|(key, _)| *key == ParamKey::Node(id))
        {
            return pos + 1;
        }
        self.entries.push((ParamKey::Node(id), value.into()));
        self.entries.len()
    }

    /// Ordinal of a literal registered by value, if present
    pub fn ordinal_of(&self, value: &Value) -> Option<usize> {
        self.entries
            .iter()
            .position(|(key, v)| *key == ParamKey::Literal && same_literal(v, value))
            .map(|pos| pos + 1)
    }

    /// Append every entry of `other` not already present.
    ///
    /// Existing ordinals never move; new entries follow `other`'s own order.
    pub fn merge_from(&mut self, other: &ParamTable) {
        for (key, value) in &other.entries {
            match key {
                ParamKey::Literal => {
                    self.add(value.clone());
                }
                ParamKey::Node(id) => {
                    self.add_node(*id, value.clone());
                }
            }
        }
    }

    /// Number of distinct parameters
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no parameters were registered
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Values ordered by ordinal
    pub fn to_ordered_vec(&self) -> Vec<Value> {
        self.entries.iter().map(|(_, v)| v.clone()).collect()
    }

    /// Consume the table, yielding values ordered by ordinal
    pub fn into_values(self) -> Vec<Value> {
        self.entries.into_iter().map(|(_, v)| v).collect()
    }

    /// Iterate `(ordinal, value)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (usize, &Value)> {
        self.entries.iter().enumerate().map(|(i, (_, v))| (i + 1, v))
    }
}
