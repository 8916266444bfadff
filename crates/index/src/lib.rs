//! Rivulet Index - Ordered, keyed storage and item ordering.
//!
//! This crate provides the two building blocks every stream is made of:
//!
//! - `KeyedCollection`: O(1) lookup by key, O(1) append, binary-search helpers
//! - `ItemComparator`: sorting by key or by a named field, ascending or descending
//!
//! # Example
//!
//! ```rust
//! use rivulet_core::{Item, StreamItem};
//! use rivulet_index::{Comparator, ItemComparator, KeyedCollection};
//!
//! let mut items = KeyedCollection::new();
//! items.append(Item::with_key("b")).unwrap();
//! items.append(Item::with_key("a")).unwrap();
//! assert_eq!(items.find("a"), Some(1));
//!
//! let cmp = ItemComparator::by_key();
//! assert!(cmp.is_less(&items[1], &items[0]));
//! ```

#![no_std]

extern crate alloc;

pub mod comparator;
pub mod keyed;

pub use comparator::{compare_field_values, Comparator, ItemComparator, Order, OrderBy};
pub use keyed::KeyedCollection;
