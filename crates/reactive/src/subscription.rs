//! Subscription management for stream observers.
//!
//! This module provides subscription IDs and a manager that delivers events to
//! every active subscription. Delivery is never re-entrant: an event emitted
//! while another is being delivered is queued and delivered once the current
//! one has reached every subscriber, so observers always see events in
//! emission order.

use crate::event::StreamEvent;
use alloc::boxed::Box;
use alloc::collections::{BTreeMap, VecDeque};
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};

/// Unique identifier for a subscription.
pub type SubscriptionId = u64;

/// Callback type for event notifications.
pub type EventCallback = Box<dyn FnMut(&StreamEvent)>;

type SharedCallback = Rc<RefCell<EventCallback>>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Target {
    All,
    One(SubscriptionId),
}

/// Manages subscriptions for one stream-like source.
///
/// All methods take `&self` so callbacks may subscribe, unsubscribe or emit on
/// the manager that is currently delivering to them.
pub struct SubscriptionManager {
    /// Active subscriptions, delivered in subscription order
    subscriptions: RefCell<BTreeMap<SubscriptionId, SharedCallback>>,
    /// Events waiting for the current delivery to finish
    queue: RefCell<VecDeque<(Target, StreamEvent)>>,
    dispatching: Cell<bool>,
    /// Next subscription ID to assign
    next_id: Cell<SubscriptionId>,
}

impl Default for SubscriptionManager {
    fn default() -> Self {
        Self::new()
    }
}

impl SubscriptionManager {
    /// Creates a new subscription manager.
    pub fn new() -> Self {
        Self {
            subscriptions: RefCell::new(BTreeMap::new()),
            queue: RefCell::new(VecDeque::new()),
            dispatching: Cell::new(false),
            next_id: Cell::new(1),
        }
    }

    /// Subscribes to events with the given callback.
    ///
    /// Returns the subscription ID that can be used to unsubscribe.
    pub fn subscribe(&self, callback: EventCallback) -> SubscriptionId {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.subscriptions
            .borrow_mut()
            .insert(id, Rc::new(RefCell::new(callback)));
        id
    }

    /// Unsubscribes by ID.
    ///
    /// Returns true if the subscription was found and removed. Events already
    /// queued are not delivered to a removed subscription.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.subscriptions.borrow_mut().remove(&id).is_some()
    }

    /// Delivers an event to every active subscription.
    pub fn emit(&self, event: StreamEvent) {
        self.enqueue(Target::All, event);
    }

    /// Delivers an event to a single subscription.
    pub fn emit_to(&self, id: SubscriptionId, event: StreamEvent) {
        self.enqueue(Target::One(id), event);
    }

    /// Delivers a sequence of events to every active subscription.
    pub fn emit_all<I>(&self, events: I)
    where
        I: IntoIterator<Item = StreamEvent>,
    {
        for event in events {
            self.emit(event);
        }
    }

    /// Returns the number of active subscriptions.
    #[inline]
    pub fn len(&self) -> usize {
        self.subscriptions.borrow().len()
    }

    /// Returns true if there are no subscriptions.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.subscriptions.borrow().is_empty()
    }

    /// Returns all subscription IDs.
    pub fn subscription_ids(&self) -> Vec<SubscriptionId> {
        self.subscriptions.borrow().keys().copied().collect()
    }

    /// Clears all subscriptions.
    pub fn clear(&self) {
        self.subscriptions.borrow_mut().clear();
    }

    fn enqueue(&self, target: Target, event: StreamEvent) {
        self.queue.borrow_mut().push_back((target, event));
        if self.dispatching.get() {
            return;
        }

        let _guard = DispatchGuard::enter(&self.dispatching);
        loop {
            let next = self.queue.borrow_mut().pop_front();
            let Some((target, event)) = next else {
                break;
            };
            for (id, callback) in self.recipients(target) {
                // Skip subscriptions removed by an earlier callback.
                if !self.subscriptions.borrow().contains_key(&id) {
                    continue;
                }
                let mut callback = callback.borrow_mut();
                (&mut **callback)(&event);
            }
        }
    }

    fn recipients(&self, target: Target) -> Vec<(SubscriptionId, SharedCallback)> {
        let subscriptions = self.subscriptions.borrow();
        match target {
            Target::All => subscriptions
                .iter()
                .map(|(id, callback)| (*id, Rc::clone(callback)))
                .collect(),
            Target::One(id) => subscriptions
                .get(&id)
                .map(|callback| (id, Rc::clone(callback)))
                .into_iter()
                .collect(),
        }
    }
}

/// Clears the dispatching flag even if a callback panics.
struct DispatchGuard<'a> {
    flag: &'a Cell<bool>,
}

impl<'a> DispatchGuard<'a> {
    fn enter(flag: &'a Cell<bool>) -> Self {
        flag.set(true);
        Self { flag }
    }
}

impl Drop for DispatchGuard<'_> {
    fn drop(&mut self) {
        self.flag.set(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::IndexPath;
    use alloc::vec;

    fn changed(row: usize) -> StreamEvent {
        StreamEvent::ItemsChanged(vec![IndexPath::row(row)])
    }

    #[test]
    fn test_subscription_manager_subscribe() {
        let manager = SubscriptionManager::new();

        let id1 = manager.subscribe(Box::new(|_| {}));
        let id2 = manager.subscribe(Box::new(|_| {}));

        assert_eq!(id1, 1);
        assert_eq!(id2, 2);
        assert_eq!(manager.len(), 2);
        assert_eq!(manager.subscription_ids(), vec![1, 2]);
    }

    #[test]
    fn test_subscription_manager_unsubscribe() {
        let manager = SubscriptionManager::new();

        let id = manager.subscribe(Box::new(|_| {}));
        assert_eq!(manager.len(), 1);

        assert!(manager.unsubscribe(id));
        assert_eq!(manager.len(), 0);

        assert!(!manager.unsubscribe(id)); // Already removed
    }

    #[test]
    fn test_subscription_manager_emit() {
        let manager = SubscriptionManager::new();

        let count = Rc::new(Cell::new(0));
        let count1 = count.clone();
        let count2 = count.clone();

        manager.subscribe(Box::new(move |_| count1.set(count1.get() + 1)));
        manager.subscribe(Box::new(move |_| count2.set(count2.get() + 1)));

        manager.emit(StreamEvent::DidChange);

        assert_eq!(count.get(), 2);
    }

    #[test]
    fn test_subscription_manager_emit_to() {
        let manager = SubscriptionManager::new();

        let count = Rc::new(Cell::new(0));
        let count1 = count.clone();
        let count2 = count.clone();

        let id1 = manager.subscribe(Box::new(move |_| count1.set(count1.get() + 1)));
        let _id2 = manager.subscribe(Box::new(move |_| count2.set(count2.get() + 10)));

        manager.emit_to(id1, StreamEvent::WillChange);
        manager.emit_to(99, StreamEvent::WillChange);

        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_nested_emit_is_queued() {
        let manager = Rc::new(SubscriptionManager::new());
        let log = Rc::new(RefCell::new(Vec::new()));

        let inner = Rc::downgrade(&manager);
        let log1 = log.clone();
        manager.subscribe(Box::new(move |event| {
            log1.borrow_mut().push((1, event.clone()));
            if *event == changed(0) {
                if let Some(manager) = inner.upgrade() {
                    manager.emit(changed(1));
                }
            }
        }));
        let log2 = log.clone();
        manager.subscribe(Box::new(move |event| {
            log2.borrow_mut().push((2, event.clone()));
        }));

        manager.emit(changed(0));

        // Subscriber 2 sees the first event before anyone sees the second.
        assert_eq!(
            *log.borrow(),
            vec![(1, changed(0)), (2, changed(0)), (1, changed(1)), (2, changed(1))]
        );
    }

    #[test]
    fn test_unsubscribe_during_dispatch() {
        let manager = Rc::new(SubscriptionManager::new());
        let count = Rc::new(Cell::new(0));

        let inner = Rc::downgrade(&manager);
        manager.subscribe(Box::new(move |_| {
            if let Some(manager) = inner.upgrade() {
                manager.unsubscribe(2);
            }
        }));
        let count2 = count.clone();
        manager.subscribe(Box::new(move |_| count2.set(count2.get() + 1)));

        manager.emit(StreamEvent::DidChange);
        assert_eq!(count.get(), 0);
        assert_eq!(manager.len(), 1);
    }

    #[test]
    fn test_subscription_manager_clear() {
        let manager = SubscriptionManager::new();

        manager.subscribe(Box::new(|_| {}));
        manager.subscribe(Box::new(|_| {}));

        assert_eq!(manager.len(), 2);
        manager.clear();
        assert!(manager.is_empty());
    }
}
