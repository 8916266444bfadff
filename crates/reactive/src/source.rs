//! The read-and-observe interface shared by streams and composed views.

use crate::event::{dispatch, IndexPath, StreamDelegate};
use crate::subscription::{EventCallback, SubscriptionId};
use crate::StreamEvent;
use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::RefCell;
use rivulet_index::ItemComparator;

/// Something that holds a sorted sequence of items and reports changes to it.
///
/// Implemented by `Stream`, `TransientStream`, `PartitionedView` and
/// `UnionView`, so views compose over each other. Rows are linear positions
/// in the source's sort order; `get_at` resolves a path as reported in the
/// source's own events.
pub trait StreamSource<T> {
    /// Returns the number of visible items.
    fn len(&self) -> usize;

    /// Returns true if no items are visible.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the item at a linear row.
    fn get(&self, row: usize) -> Option<Rc<T>>;

    /// Returns the item at a path as reported in this source's events.
    fn get_at(&self, path: IndexPath) -> Option<Rc<T>>;

    /// Returns the visible item with the given key.
    fn find(&self, key: &str) -> Option<Rc<T>>;

    /// Returns the path of the visible item with the given key.
    fn find_index_path(&self, key: &str) -> Option<IndexPath>;

    /// Returns the comparator this source sorts with.
    fn comparator(&self) -> ItemComparator;

    /// Subscribes a boxed callback to this source's events.
    fn subscribe_events(&self, callback: EventCallback) -> SubscriptionId;

    /// Removes a subscription. Returns false if it was not active.
    fn unsubscribe(&self, id: SubscriptionId) -> bool;

    /// Subscribes a closure to this source's events.
    fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        Self: Sized,
        F: FnMut(&StreamEvent) + 'static,
    {
        self.subscribe_events(Box::new(callback))
    }

    /// Subscribes a delegate to this source's events.
    fn subscribe_delegate<D>(&self, delegate: Rc<RefCell<D>>) -> SubscriptionId
    where
        Self: Sized,
        D: StreamDelegate + 'static,
    {
        self.subscribe(move |event| dispatch(&mut *delegate.borrow_mut(), event))
    }

    /// Returns every visible item in order.
    fn items(&self) -> Vec<Rc<T>> {
        (0..self.len()).filter_map(|row| self.get(row)).collect()
    }
}
