//! Streams with no backend.
//!
//! A `TransientStream` is filled directly by the application. It flushes
//! synchronously and reports its initial load as finished to every subscriber
//! as soon as it subscribes.

use crate::event::IndexPath;
use crate::scheduler::ManualScheduler;
use crate::source::StreamSource;
use crate::stream::{Stream, StreamConfig};
use crate::subscription::{EventCallback, SubscriptionId};
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::ops::Deref;
use rivulet_core::{Result, StreamItem};
use rivulet_index::{ItemComparator, Order, OrderBy};

/// A stream the application fills by hand.
///
/// Dereferences to `Stream`, so predicates, lookups and subscriptions work the
/// same way.
pub struct TransientStream<T: StreamItem + 'static> {
    stream: Stream<T>,
}

impl<T: StreamItem + 'static> Clone for TransientStream<T> {
    fn clone(&self) -> Self {
        Self {
            stream: self.stream.clone(),
        }
    }
}

impl<T: StreamItem + 'static> TransientStream<T> {
    /// Creates an empty transient stream sorted by key, ascending.
    pub fn new() -> Self {
        Self::build(OrderBy::Key, Order::Asc)
    }

    /// Creates an empty transient stream with the given ordering.
    pub fn with_ordering(order_by: OrderBy, order: Order) -> Result<Self> {
        let transient = Self::build(order_by, order);
        transient.stream.config().validate()?;
        Ok(transient)
    }

    fn build(order_by: OrderBy, order: Order) -> Self {
        let config = StreamConfig::new()
            .order_by(order_by)
            .order(order)
            .batch_delay(None)
            .fetch_limit(Some(0));
        // Synchronous flushes never schedule a timer.
        let stream = Stream::build(config, Rc::new(ManualScheduler::new()), None);
        Self { stream }
    }

    /// Replaces the contents with exactly these items.
    ///
    /// Fails with `DuplicateKey`, changing nothing, if `items` repeats a key.
    pub fn reset(&self, items: Vec<T>) -> Result<()> {
        self.stream.reset_items(items)
    }

    /// Adds items. Fails with `DuplicateKey`, changing nothing, if any key is
    /// already present or repeats.
    pub fn add(&self, items: Vec<T>) -> Result<()> {
        self.stream.insert_items(items)
    }

    /// Removes the items with the given keys. Unknown keys are ignored.
    pub fn remove(&self, keys: &[&str]) {
        self.stream.remove_keys(keys);
    }

    /// Returns the underlying stream handle.
    pub fn stream(&self) -> &Stream<T> {
        &self.stream
    }
}

impl<T: StreamItem + 'static> Default for TransientStream<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: StreamItem + 'static> StreamSource<T> for TransientStream<T> {
    fn len(&self) -> usize {
        self.stream.len()
    }

    fn get(&self, row: usize) -> Option<Rc<T>> {
        self.stream.get(row)
    }

    fn get_at(&self, path: IndexPath) -> Option<Rc<T>> {
        self.stream.get_at(path)
    }

    fn find(&self, key: &str) -> Option<Rc<T>> {
        self.stream.find(key)
    }

    fn find_index_path(&self, key: &str) -> Option<IndexPath> {
        self.stream.find_index_path(key)
    }

    fn comparator(&self) -> ItemComparator {
        self.stream.comparator()
    }

    fn subscribe_events(&self, callback: EventCallback) -> SubscriptionId {
        self.stream.subscribe_events(callback)
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.stream.unsubscribe(id)
    }
}

impl<T: StreamItem + 'static> Deref for TransientStream<T> {
    type Target = Stream<T>;

    fn deref(&self) -> &Stream<T> {
        &self.stream
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::StreamEvent;
    use alloc::string::{String, ToString};
    use alloc::vec;
    use core::cell::RefCell;
    use rivulet_core::{Item, Keyed};

    fn keys(stream: &TransientStream<Item>) -> Vec<String> {
        stream.items().iter().map(|i| i.key().to_string()).collect()
    }

    fn items(keys: &[&str]) -> Vec<Item> {
        keys.iter().map(|k| Item::with_key(k)).collect()
    }

    #[test]
    fn test_reset_add_remove() {
        let stream = TransientStream::new();
        stream.reset(items(&["c", "a"])).unwrap();
        assert_eq!(keys(&stream), vec!["a", "c"]);

        stream.add(items(&["b"])).unwrap();
        assert_eq!(keys(&stream), vec!["a", "b", "c"]);
        assert!(stream.add(items(&["a"])).is_err());
        assert!(stream.add(items(&["x", "x"])).is_err());
        assert_eq!(stream.len(), 3);

        stream.remove(&["a", "zz"]);
        assert_eq!(keys(&stream), vec!["b", "c"]);

        stream.reset(Vec::new()).unwrap();
        assert!(stream.is_empty());
    }

    #[test]
    fn test_initial_load_on_subscribe() {
        let stream: TransientStream<Item> = TransientStream::default();
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = events.clone();
        stream.subscribe(move |event| sink.borrow_mut().push(event.clone()));

        assert_eq!(*events.borrow(), vec![StreamEvent::InitialLoadFinished(None)]);

        stream.add(items(&["a"])).unwrap();
        assert_eq!(events.borrow().len(), 4);
    }

    #[test]
    fn test_descending() {
        let stream = TransientStream::with_ordering(OrderBy::Key, Order::Desc).unwrap();
        stream.add(items(&["a", "c", "b"])).unwrap();
        assert_eq!(keys(&stream), vec!["c", "b", "a"]);

        let invalid = TransientStream::<Item>::with_ordering(OrderBy::field(""), Order::Asc);
        assert!(invalid.is_err());
    }
}
