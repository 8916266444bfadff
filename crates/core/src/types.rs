//! Field value kinds.
//!
//! This module defines the kinds of scalar values a backend field can hold.

/// The kind of a non-null field value.
///
/// Mirrors the scalar types a JSON-like backend delivers for a child's fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// Boolean (true/false)
    Bool,
    /// Numeric value; integers and floats share one kind
    Number,
    /// UTF-8 string
    String,
}

impl ValueKind {
    /// Returns the rank used to order values of different kinds.
    ///
    /// Booleans sort before numbers, numbers before strings.
    pub fn rank(&self) -> u8 {
        match self {
            ValueKind::Bool => 1,
            ValueKind::Number => 2,
            ValueKind::String => 3,
        }
    }

    /// Returns a short lowercase name for this kind.
    pub fn name(&self) -> &'static str {
        match self {
            ValueKind::Bool => "bool",
            ValueKind::Number => "number",
            ValueKind::String => "string",
        }
    }
}
