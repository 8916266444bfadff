//! Rivulet Reactive - Live, batched, composable streams.
//!
//! This crate turns a backend's per-child events into sorted, filtered
//! collections that report their changes as notification cycles observers can
//! apply directly to a list or table view.
//!
//! # Core Concepts
//!
//! - `Stream`: A live view of one backend collection, with batching, a
//!   client-side predicate, a result limit and pagination
//! - `TransientStream`: The same, filled by hand instead of by a backend
//! - `PartitionedView`: Splits a source into labeled sections
//! - `UnionView`: Merges several sources, deduplicated by key
//! - `StreamSource`: The read-and-observe interface all of the above share
//! - `Scheduler`: Injected timers; `ManualScheduler` drives virtual time
//!
//! # Example
//!
//! ```rust
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use rivulet_core::{Item, Keyed, StreamItem};
//! use rivulet_reactive::{PartitionedView, StreamEvent, StreamSource, TransientStream};
//!
//! let stream = TransientStream::new();
//! let view = PartitionedView::new(
//!     stream.clone(),
//!     vec!["a-m".to_string(), "n-z".to_string()],
//!     |item: &Item| usize::from(item.key() >= "n"),
//! )
//! .unwrap();
//!
//! let events = Rc::new(RefCell::new(Vec::new()));
//! let sink = events.clone();
//! view.subscribe(move |event| sink.borrow_mut().push(event.clone()));
//!
//! stream.add(vec![Item::with_key("zebra"), Item::with_key("apple")]).unwrap();
//! assert_eq!(view.section_len(0), 1);
//! assert_eq!(view.section_len(1), 1);
//! assert!(matches!(events.borrow().last(), Some(StreamEvent::DidChange)));
//! ```

#![no_std]

extern crate alloc;

pub mod event;
pub mod partition;
pub mod scheduler;
pub mod source;
pub mod stream;
pub mod subscription;
pub mod transient;
pub mod union;

pub use event::{dispatch, IndexPath, StreamDelegate, StreamEvent};
pub use partition::{Classifier, PartitionedView};
pub use scheduler::{ManualScheduler, Scheduler, Task, TimerId};
pub use source::StreamSource;
pub use stream::{
    FeedEvent, FetchDone, PageCallback, PageRequest, PageResult, Pager, Predicate, Stream,
    StreamConfig, StreamPhase, DEFAULT_BATCH_DELAY,
};
pub use subscription::{EventCallback, SubscriptionId, SubscriptionManager};
pub use transient::TransientStream;
pub use union::{UnionView, UNION_DEBOUNCE};

// Re-export commonly used types from dependencies
pub use rivulet_core::{FetchError, Item, StreamItem};
pub use rivulet_index::{ItemComparator, Order, OrderBy};
