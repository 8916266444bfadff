//! Rivulet Core - Core types for the Rivulet stream synchronization engine.
//!
//! This crate provides the foundational types shared by every other crate:
//!
//! - `Value`: Scalar field values (null, bool, number, string)
//! - `Item`: A keyed record with a field map
//! - `Keyed` / `StreamItem`: The materialization contract streams rely on
//! - `Error`: Invariant violations; `FetchError`: transport failures
//!
//! # Example
//!
//! ```rust
//! use rivulet_core::{field_map, Item, Keyed, StreamItem, Value};
//!
//! let mut item = Item::with_key("msg-1");
//! item.update(&field_map([("text", Value::from("hello")), ("likes", Value::from(3i64))]));
//!
//! assert_eq!(item.key(), "msg-1");
//! assert_eq!(item.field("likes").as_f64(), Some(3.0));
//! ```

#![no_std]

extern crate alloc;

mod error;
mod item;
mod types;
mod value;

pub use error::{Error, FetchError, Result};
pub use item::{field_map, FieldMap, Item, Keyed, StreamItem};
pub use types::ValueKind;
pub use value::Value;
