//! Core value types for validation
//!
//! This module defines the closed input domain every schema validates against,
//! and the numeric bound type used by range constraints.

use std::cmp::Ordering;
use std::fmt;

// ============================================================================
// Value Enum - Runtime values to be validated
// ============================================================================

/// Runtime value that can be validated
///
/// Input is decoded into this variant ahead of validation (from JSON, form
/// data, ...), so every type check is an exhaustive match.
///
/// Equality is strict: `Int(1)` and `Float(1.0)` differ. Objects compare as
/// maps, regardless of key order.
#[derive(Debug, Clone)]
pub enum Value {
    /// Null value
    Null,
    /// Boolean value
    Bool(bool),
    /// Integer value (i64)
    Int(i64),
    /// Float value (f64)
    Float(f64),
    /// String value
    String(String),
    /// String-keyed map, in insertion order
    Object(Vec<(String, Value)>),
}

impl Value {
    /// Build an object from key/value pairs; a repeated key keeps its first
    /// position and its last value
    pub fn object<K, I>(pairs: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Self::Object(unique_keys(pairs.into_iter().map(|(k, v)| (k.into(), v))))
    }

    /// Check if value is null
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Numeric view of the value, if it is an int or a float
    pub fn as_number(&self) -> Option<Number> {
        match self {
            Self::Int(i) => Some(Number::Int(*i)),
            Self::Float(f) => Some(Number::Float(*f)),
            _ => None,
        }
    }

    /// Look up a key of an object value; the last entry wins when a key repeats
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Self::Object(pairs) => lookup(pairs, key),
            _ => None,
        }
    }

    /// Set a key of an object value, keeping the original position of an existing key.
    ///
    /// Later entries repeating the key are removed. Non-object values are left untouched.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        let Self::Object(pairs) = self else {
            return;
        };
        let key = key.into();
        match pairs.iter().position(|(k, _)| *k == key) {
            Some(at) => {
                pairs[at].1 = value;
                let mut index = 0;
                pairs.retain(|(k, _)| {
                    let keep = index <= at || *k != key;
                    index += 1;
                    keep
                });
            }
            None => pairs.push((key, value)),
        }
    }
}

/// Collapse repeated keys: first position, last value
pub(crate) fn unique_keys(pairs: impl IntoIterator<Item = (String, Value)>) -> Vec<(String, Value)> {
    let mut unique: Vec<(String, Value)> = Vec::new();
    for (key, value) in pairs {
        match unique.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => *slot = value,
            None => unique.push((key, value)),
        }
    }
    unique
}

fn lookup<'a>(pairs: &'a [(String, Value)], key: &str) -> Option<&'a Value> {
    pairs.iter().rev().find(|(k, _)| k == key).map(|(_, v)| v)
}

/// Whether every key of `a` maps to the same value in `b`, under last-wins lookup
fn covers(a: &[(String, Value)], b: &[(String, Value)]) -> bool {
    a.iter().all(|(k, _)| match (lookup(a, k), lookup(b, k)) {
        (Some(x), Some(y)) => x == y,
        _ => false,
    })
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Object(a), Self::Object(b)) => covers(a, b) && covers(b, a),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Bool(b) => write!(f, "{}", b),
            Self::Int(i) => write!(f, "{}", i),
            Self::Float(x) => write!(f, "{}", format_float(*x)),
            Self::String(s) => write!(f, "{}", s),
            Self::Object(pairs) => {
                write!(f, "{{")?;
                for (i, (k, v)) in pairs.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", k, v)?;
                }
                write!(f, "}}")
            }
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Self::Int(i64::from(i))
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

// ============================================================================
// Number - numeric bounds
// ============================================================================

/// A numeric bound, kept in the precision it was declared with
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    /// Integer bound
    Int(i64),
    /// Float bound
    Float(f64),
}

impl Number {
    /// Widen to f64
    pub fn as_f64(self) -> f64 {
        match self {
            Self::Int(i) => i as f64,
            Self::Float(f) => f,
        }
    }

    /// Compare two numbers; integers compare exactly, mixed pairs compare as f64.
    ///
    /// Returns `None` when a NaN is involved.
    pub fn compare(self, other: Number) -> Option<Ordering> {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => Some(a.cmp(&b)),
            (a, b) => a.as_f64().partial_cmp(&b.as_f64()),
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(i) => write!(f, "{}", i),
            Self::Float(x) => write!(f, "{}", format_float(*x)),
        }
    }
}

impl From<i32> for Number {
    fn from(i: i32) -> Self {
        Self::Int(i64::from(i))
    }
}

impl From<i64> for Number {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<u32> for Number {
    fn from(i: u32) -> Self {
        Self::Int(i64::from(i))
    }
}

impl From<f32> for Number {
    fn from(f: f32) -> Self {
        Self::Float(f64::from(f))
    }
}

impl From<f64> for Number {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

/// Decimal rendering of a float; integral values drop the fractional part (`1.0` -> `"1"`).
pub(crate) fn format_float(f: f64) -> String {
    if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 {
        format!("{}", f as i64)
    } else {
        format!("{}", f)
    }
}

// ============================================================================
// Conversions
// ============================================================================

#[cfg(feature = "serde")]
impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::String(s),
            // Lists are treated as maps keyed by position
            serde_json::Value::Array(items) => Value::Object(
                items
                    .into_iter()
                    .enumerate()
                    .map(|(i, v)| (i.to_string(), v.into()))
                    .collect(),
            ),
            serde_json::Value::Object(fields) => {
                Value::Object(fields.into_iter().map(|(k, v)| (k, v.into())).collect())
            }
        }
    }
}

#[cfg(feature = "serde")]
impl From<Value> for serde_json::Value {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(b),
            Value::Int(i) => serde_json::Value::Number(i.into()),
            Value::Float(f) => serde_json::Number::from_f64(f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::String(s) => serde_json::Value::String(s),
            Value::Object(fields) => {
                serde_json::Value::Object(fields.into_iter().map(|(k, v)| (k, v.into())).collect())
            }
        }
    }
}
