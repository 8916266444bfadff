//! Rivulet Incremental - Incremental maintenance of sorted, keyed snapshots.
//!
//! A stream never rebuilds its observers' view from scratch. Mutations are
//! staged into a scratch copy of the committed collection, and at flush time the
//! scratch copy is sorted, truncated and compared with the committed one. The
//! comparison yields an edit script that index-based consumers can replay.
//!
//! # Core Concepts
//!
//! - `EditScript`: delete positions (against the old snapshot) and add
//!   positions (against the new one)
//! - `diff`: key-set difference between two sorted snapshots
//! - `BatchState`: the scratch collection a batch accumulates into
//! - `apply_batch`: sort, truncate, diff and commit in one step
//! - `reposition`: re-sort one changed item and report the move
//! - `diff_reordered`: `diff` that also reports kept keys that changed places
//!
//! # Example
//!
//! ```rust
//! use rivulet_core::{Item, Keyed, StreamItem};
//! use rivulet_incremental::{apply_batch, BatchState};
//! use rivulet_index::KeyedCollection;
//!
//! let mut committed = KeyedCollection::new();
//! let mut batch = BatchState::new();
//!
//! let scratch = batch.begin(&committed);
//! scratch.append(Item::with_key("b")).unwrap();
//! scratch.append(Item::with_key("a")).unwrap();
//!
//! let next = batch.take().unwrap();
//! let script = apply_batch(&mut committed, next, |a, b| a.key().cmp(b.key()), None);
//!
//! assert_eq!(script.adds, vec![0, 1]);
//! assert_eq!(committed[0].key(), "a");
//! ```

#![no_std]

extern crate alloc;

pub mod batch;
pub mod edit_script;

pub use batch::{apply_batch, reposition, BatchState};
pub use edit_script::{diff, diff_reordered, EditScript};
