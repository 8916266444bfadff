//! Value type definitions for Rivulet.
//!
//! This module defines the `Value` enum which represents any scalar a backend
//! child can carry in one of its fields.

use crate::types::ValueKind;
use alloc::string::{String, ToString};
use core::cmp::Ordering;

/// A field value delivered by the backend.
#[derive(Clone, Debug, Default)]
pub enum Value {
    /// Null or missing value
    #[default]
    Null,
    /// Boolean value
    Bool(bool),
    /// Numeric value (integers are widened to f64)
    Number(f64),
    /// UTF-8 string
    String(String),
}

impl Value {
    /// Returns the kind of this value, or None if it's Null.
    pub fn kind(&self) -> Option<ValueKind> {
        match self {
            Value::Null => None,
            Value::Bool(_) => Some(ValueKind::Bool),
            Value::Number(_) => Some(ValueKind::Number),
            Value::String(_) => Some(ValueKind::String),
        }
    }

    /// Returns true if this value is Null.
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns the boolean value if this is a Bool, None otherwise.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the number if this is a Number, None otherwise.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the number truncated to i64 if this is an integral Number.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Number(v) if v.is_finite() && libm::trunc(*v) == *v => Some(*v as i64),
            _ => None,
        }
    }

    /// Returns a reference to the string if this is a String, None otherwise.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(v) => Some(v.as_str()),
            _ => None,
        }
    }

    /// Compares two values of the same kind.
    ///
    /// Returns `None` when the kinds differ or either side is Null. NaN sorts
    /// after every other number so the result stays a total order.
    pub fn compare_same_kind(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            // false sorts before true
            (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
            (Value::Number(a), Value::Number(b)) => Some(match (a.is_nan(), b.is_nan()) {
                (true, true) => Ordering::Equal,
                (true, false) => Ordering::Greater,
                (false, true) => Ordering::Less,
                (false, false) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
            }),
            (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => {
                // Handle NaN comparison
                if a.is_nan() && b.is_nan() {
                    true
                } else {
                    a == b
                }
            }
            (Value::String(a), Value::String(b)) => a == b,
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Number(v as f64)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Number(v as f64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Number(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl<T> From<Option<T>> for Value
where
    T: Into<Value>,
{
    fn from(v: Option<T>) -> Self {
        match v {
            Some(val) => val.into(),
            None => Value::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_kind() {
        assert_eq!(Value::Number(42.0).kind(), Some(ValueKind::Number));
        assert_eq!(Value::Bool(true).kind(), Some(ValueKind::Bool));
        assert_eq!(Value::Null.kind(), None);
        assert!(Value::Null.is_null());
    }

    #[test]
    fn test_value_accessors() {
        assert_eq!(Value::Bool(true).as_bool(), Some(true));
        assert_eq!(Value::Number(3.5).as_f64(), Some(3.5));
        assert_eq!(Value::Number(7.0).as_i64(), Some(7));
        assert_eq!(Value::Number(7.5).as_i64(), None);
        assert_eq!(Value::String("hello".into()).as_str(), Some("hello"));
        assert_eq!(Value::Null.as_str(), None);
    }

    #[test]
    fn test_as_i64_only_for_integral_numbers() {
        assert_eq!(Value::Number(2.0).as_i64(), Some(2));
        assert_eq!(Value::Number(-3.0).as_i64(), Some(-3));
        assert_eq!(Value::Number(2.5).as_i64(), None);
        assert_eq!(Value::Number(f64::NAN).as_i64(), None);
        assert_eq!(Value::Number(f64::INFINITY).as_i64(), None);
        assert_eq!(Value::Number(f64::NEG_INFINITY).as_i64(), None);
        assert_eq!(Value::String("2".into()).as_i64(), None);
    }

    #[test]
    fn test_value_equality() {
        assert_eq!(Value::Number(42.0), Value::from(42i64));
        assert_ne!(Value::Number(1.0), Value::Bool(true));
        assert_eq!(Value::Null, Value::Null);
        assert_eq!(Value::Number(f64::NAN), Value::Number(f64::NAN));
    }

    #[test]
    fn test_compare_same_kind() {
        assert_eq!(
            Value::Bool(false).compare_same_kind(&Value::Bool(true)),
            Some(Ordering::Less)
        );
        assert_eq!(
            Value::from(2i64).compare_same_kind(&Value::from(1i64)),
            Some(Ordering::Greater)
        );
        assert_eq!(
            Value::from("a").compare_same_kind(&Value::from("a")),
            Some(Ordering::Equal)
        );
        assert_eq!(Value::from("a").compare_same_kind(&Value::from(1i64)), None);
        assert_eq!(Value::Null.compare_same_kind(&Value::Null), None);
        assert_eq!(
            Value::Number(f64::NAN).compare_same_kind(&Value::Number(1.0)),
            Some(Ordering::Greater)
        );
    }

    #[test]
    fn test_value_from_impls() {
        let v: Value = 42i32.into();
        assert_eq!(v.as_f64(), Some(42.0));

        let v: Value = "hello".into();
        assert_eq!(v.as_str(), Some("hello"));

        let v: Value = Some(true).into();
        assert_eq!(v.as_bool(), Some(true));

        let v: Value = None::<i32>.into();
        assert!(v.is_null());
    }
}
