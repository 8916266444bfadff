//! Comparators for ordering stream items.
//!
//! A stream is sorted by its key or by one named field, ascending or
//! descending. Field ordering falls back to the key for equal values, so the
//! result is a strict total order over items with distinct keys even when field
//! values are missing or of mixed kinds. Binary search over a stream relies on
//! this.
//!
//! Field values of different kinds are ordered by kind (null, bool, number,
//! string) rather than by falling back to the key. A key fallback across kinds
//! is not transitive: with `a: 1`, `b: "x"` and `c: 0`, key order puts a before
//! b and b before c while the numbers put c before a. Sorting and binary search
//! need a transitive order, so the kind rank is deliberate.

use alloc::string::String;
use core::cmp::Ordering;
use rivulet_core::{StreamItem, Value};

/// Sort direction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Order {
    /// Ascending order (smallest first)
    #[default]
    Asc,
    /// Descending order (largest first)
    Desc,
}

impl Order {
    /// Applies this order to a comparison result.
    #[inline]
    pub fn apply(&self, ord: Ordering) -> Ordering {
        match self {
            Order::Asc => ord,
            Order::Desc => ord.reverse(),
        }
    }

    /// Returns true for ascending order.
    #[inline]
    pub fn is_ascending(&self) -> bool {
        matches!(self, Order::Asc)
    }
}

/// What a stream is sorted by.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum OrderBy {
    /// The item key
    #[default]
    Key,
    /// The value of a named field
    Field(String),
}

impl OrderBy {
    /// Creates a field ordering.
    pub fn field(name: impl Into<String>) -> Self {
        OrderBy::Field(name.into())
    }
}

/// Trait for comparing values of one type.
pub trait Comparator<K: ?Sized> {
    /// Compares two values according to the comparator's ordering.
    fn compare(&self, a: &K, b: &K) -> Ordering;

    /// Returns true if a < b according to this comparator.
    fn is_less(&self, a: &K, b: &K) -> bool {
        self.compare(a, b) == Ordering::Less
    }

    /// Returns true if a <= b according to this comparator.
    fn is_less_or_equal(&self, a: &K, b: &K) -> bool {
        self.compare(a, b) != Ordering::Greater
    }

    /// Returns true if a > b according to this comparator.
    fn is_greater(&self, a: &K, b: &K) -> bool {
        self.compare(a, b) == Ordering::Greater
    }
}

/// The comparator streams sort with.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ItemComparator {
    order_by: OrderBy,
    order: Order,
}

impl ItemComparator {
    /// Creates a comparator for the given ordering and direction.
    pub fn new(order_by: OrderBy, order: Order) -> Self {
        Self { order_by, order }
    }

    /// Creates an ascending key comparator.
    pub fn by_key() -> Self {
        Self::new(OrderBy::Key, Order::Asc)
    }

    /// Creates an ascending comparator on a named field.
    pub fn by_field(name: impl Into<String>) -> Self {
        Self::new(OrderBy::field(name), Order::Asc)
    }

    /// Returns the same ordering in the opposite direction.
    pub fn reversed(&self) -> Self {
        let order = match self.order {
            Order::Asc => Order::Desc,
            Order::Desc => Order::Asc,
        };
        Self::new(self.order_by.clone(), order)
    }

    /// Returns what this comparator orders by.
    pub fn order_by(&self) -> &OrderBy {
        &self.order_by
    }

    /// Returns the direction of this comparator.
    pub fn order(&self) -> Order {
        self.order
    }

    fn compare_ascending<T: StreamItem>(&self, a: &T, b: &T) -> Ordering {
        match &self.order_by {
            OrderBy::Key => a.key().cmp(b.key()),
            OrderBy::Field(name) => {
                let av = a.field(name);
                let bv = b.field(name);
                compare_field_values(&av, &bv).then_with(|| a.key().cmp(b.key()))
            }
        }
    }
}

impl<T: StreamItem> Comparator<T> for ItemComparator {
    fn compare(&self, a: &T, b: &T) -> Ordering {
        // Descending swaps the arguments, so the key tie-break flips too.
        match self.order {
            Order::Asc => self.compare_ascending(a, b),
            Order::Desc => self.compare_ascending(b, a),
        }
    }
}

/// Compares two field values with the cross-kind rules.
///
/// Null sorts before any non-null value. Values of the same kind compare by
/// value (false before true). Values of different kinds order by kind: bool,
/// then number, then string. Two nulls and equal values are `Equal` so the
/// caller falls back to the key.
pub fn compare_field_values(a: &Value, b: &Value) -> Ordering {
    match (a.kind(), b.kind()) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(ak), Some(bk)) if ak != bk => ak.rank().cmp(&bk.rank()),
        _ => a.compare_same_kind(b).unwrap_or(Ordering::Equal),
    }
}
