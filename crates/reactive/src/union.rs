//! Merged views over several sources.
//!
//! A `UnionView` shows every key present in any of its sources, once, sorted
//! with the first source's comparator. When two sources hold the same key the
//! copy from the earlier source wins. Structural changes in the sources are
//! coalesced with a debounce and then diffed against the previous snapshot,
//! reporting kept keys that changed places as moves. In-place changes are
//! forwarded at once.

use crate::event::{IndexPath, StreamEvent};
use crate::scheduler::{Scheduler, TimerId};
use crate::source::StreamSource;
use crate::subscription::{EventCallback, SubscriptionId, SubscriptionManager};
use alloc::boxed::Box;
use alloc::rc::{Rc, Weak};
use alloc::vec::Vec;
use core::cell::RefCell;
use core::mem;
use core::time::Duration;
use log::{debug, trace, warn};
use rivulet_core::{Error, FetchError, Keyed, Result, StreamItem};
use rivulet_incremental::{diff_reordered, reposition};
use rivulet_index::{Comparator, ItemComparator, KeyedCollection};

/// Debounce applied to source changes before the union recomputes.
pub const UNION_DEBOUNCE: Duration = Duration::from_millis(100);

struct UnionState<T> {
    items: KeyedCollection<Rc<T>>,
    timer: Option<TimerId>,
    /// Sources that have reported their initial load
    finished: usize,
    first_error: Option<FetchError>,
    initial_load: Option<Option<FetchError>>,
}

struct UnionInner<T: StreamItem + 'static> {
    sources: Vec<Box<dyn StreamSource<T>>>,
    comparator: ItemComparator,
    scheduler: Rc<dyn Scheduler>,
    delay: Duration,
    state: RefCell<UnionState<T>>,
    subscriptions: SubscriptionManager,
    source_subscriptions: RefCell<Vec<(usize, SubscriptionId)>>,
}

impl<T: StreamItem + 'static> UnionInner<T> {
    /// Collects every source's items, earlier sources winning on key clashes.
    fn merge(&self) -> KeyedCollection<Rc<T>> {
        let mut merged = KeyedCollection::new();
        for (index, source) in self.sources.iter().enumerate() {
            for item in source.items() {
                if merged.has(item.key()) {
                    trace!("union source {} repeats key {}", index, item.key());
                    continue;
                }
                if let Err(err) = merged.append(item) {
                    trace!("union merge: {}", err);
                }
            }
        }
        merged
    }

    /// Index of the first source that holds `key`.
    fn first_holder(&self, key: &str) -> Option<usize> {
        self.sources.iter().position(|source| source.find(key).is_some())
    }

    fn on_source_event(self: &Rc<Self>, index: usize, event: &StreamEvent) {
        match event {
            StreamEvent::DidChange => self.schedule_recompute(),
            StreamEvent::ItemsChanged(paths) => self.forward_changes(index, paths),
            StreamEvent::InitialLoadFinished(result) => {
                {
                    let mut state = self.state.borrow_mut();
                    state.finished += 1;
                    if let Some(error) = result {
                        warn!("union source {} failed to load: {}", index, error);
                        if state.first_error.is_none() {
                            state.first_error = Some(error.clone());
                        }
                    }
                }
                self.schedule_recompute();
            }
            StreamEvent::WillChange
            | StreamEvent::ItemsDeleted(_)
            | StreamEvent::ItemsAdded(_) => {}
        }
    }

    /// Forwards in-place changes from the source that holds the shown copy.
    ///
    /// An item that now sorts elsewhere among the other sources' items is
    /// moved and reported as a delete plus an add.
    fn forward_changes(&self, index: usize, paths: &[IndexPath]) {
        let source = &self.sources[index];
        let mut events = Vec::new();
        let mut changed = Vec::new();
        for path in paths {
            let Some(item) = source.get_at(*path) else {
                continue;
            };
            if self.first_holder(item.key()) != Some(index) {
                continue;
            }
            let mut state = self.state.borrow_mut();
            let Some(row) = state.items.find(item.key()) else {
                continue;
            };
            let _ = state.items.replace(item);
            let comparator = &self.comparator;
            match reposition(&mut state.items, row, |a, b| comparator.compare(&**a, &**b)) {
                Some(script) => {
                    if !changed.is_empty() {
                        events.push(StreamEvent::ItemsChanged(mem::take(&mut changed)));
                    }
                    events.extend(StreamEvent::cycle(&script, 0));
                }
                None => changed.push(IndexPath::row(row)),
            }
        }
        if !changed.is_empty() {
            events.push(StreamEvent::ItemsChanged(changed));
        }
        self.subscriptions.emit_all(events);
    }

    fn schedule_recompute(self: &Rc<Self>) {
        let previous = self.state.borrow_mut().timer.take();
        if let Some(id) = previous {
            self.scheduler.cancel(id);
        }
        let weak: Weak<Self> = Rc::downgrade(self);
        let id = self.scheduler.schedule(
            self.delay,
            Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.recompute();
                }
            }),
        );
        self.state.borrow_mut().timer = Some(id);
    }

    fn recompute(&self) {
        let merged = self.merge();
        let events = {
            let mut state = self.state.borrow_mut();
            state.timer = None;
            let comparator = &self.comparator;
            let mut next = merged;
            next.sort_by(|a, b| comparator.compare(&**a, &**b));
            // A key can change places when its shown copy changed or another
            // source's copy took over.
            let script = diff_reordered(state.items.as_slice(), next.as_slice());
            state.items = next;
            debug!(
                "union flush: {} deleted, {} added, {} visible",
                script.deletes.len(),
                script.adds.len(),
                state.items.len()
            );

            let mut events = StreamEvent::cycle(&script, 0);
            if state.initial_load.is_none() && state.finished >= self.sources.len() {
                let result = state.first_error.clone();
                state.initial_load = Some(result.clone());
                events.push(StreamEvent::InitialLoadFinished(result));
            }
            events
        };
        self.subscriptions.emit_all(events);
    }
}

impl<T: StreamItem + 'static> Drop for UnionInner<T> {
    fn drop(&mut self) {
        if let Some(id) = self.state.get_mut().timer.take() {
            self.scheduler.cancel(id);
        }
        for (index, id) in self.source_subscriptions.get_mut().drain(..) {
            self.sources[index].unsubscribe(id);
        }
    }
}

/// The deduplicated union of several sources.
///
/// `UnionView` is a cheap handle; clones share the same state. It reports
/// its initial load once every source has reported one, carrying the first
/// error any source reported.
pub struct UnionView<T: StreamItem + 'static> {
    inner: Rc<UnionInner<T>>,
}

impl<T: StreamItem + 'static> Clone for UnionView<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: StreamItem + 'static> UnionView<T> {
    /// Creates a union with the default debounce.
    pub fn new(sources: Vec<Box<dyn StreamSource<T>>>, scheduler: Rc<dyn Scheduler>) -> Result<Self> {
        Self::with_delay(sources, scheduler, UNION_DEBOUNCE)
    }

    /// Creates a union that recomputes `delay` after the last source change.
    ///
    /// The union starts out holding the sources' current contents, without
    /// reporting them. Fails with `NoSources` if `sources` is empty.
    pub fn with_delay(
        sources: Vec<Box<dyn StreamSource<T>>>,
        scheduler: Rc<dyn Scheduler>,
        delay: Duration,
    ) -> Result<Self> {
        let Some(first) = sources.first() else {
            return Err(Error::NoSources);
        };
        let comparator = first.comparator();
        let inner = Rc::new(UnionInner {
            comparator,
            scheduler,
            delay,
            state: RefCell::new(UnionState {
                items: KeyedCollection::new(),
                timer: None,
                finished: 0,
                first_error: None,
                initial_load: None,
            }),
            subscriptions: SubscriptionManager::new(),
            source_subscriptions: RefCell::new(Vec::with_capacity(sources.len())),
            sources,
        });

        let mut seed = inner.merge();
        let comparator = inner.comparator.clone();
        seed.sort_by(|a, b| comparator.compare(&**a, &**b));
        inner.state.borrow_mut().items = seed;

        for index in 0..inner.sources.len() {
            let weak = Rc::downgrade(&inner);
            let id = inner.sources[index].subscribe_events(Box::new(move |event| {
                if let Some(inner) = weak.upgrade() {
                    inner.on_source_event(index, event);
                }
            }));
            inner.source_subscriptions.borrow_mut().push((index, id));
        }
        Ok(Self { inner })
    }

    /// Recomputes now instead of waiting for the debounce.
    pub fn flush(&self) {
        let timer = self.inner.state.borrow_mut().timer.take();
        if let Some(id) = timer {
            self.inner.scheduler.cancel(id);
            self.inner.recompute();
        }
    }

    /// Returns true if a recompute is scheduled.
    pub fn is_pending(&self) -> bool {
        self.inner.state.borrow().timer.is_some()
    }

    /// Returns the number of sources.
    pub fn num_sources(&self) -> usize {
        self.inner.sources.len()
    }
}

impl<T: StreamItem + 'static> StreamSource<T> for UnionView<T> {
    fn len(&self) -> usize {
        self.inner.state.borrow().items.len()
    }

    fn get(&self, row: usize) -> Option<Rc<T>> {
        self.inner.state.borrow().items.get(row).cloned()
    }

    fn get_at(&self, path: IndexPath) -> Option<Rc<T>> {
        if path.section != 0 {
            return None;
        }
        self.get(path.row)
    }

    fn find(&self, key: &str) -> Option<Rc<T>> {
        self.inner.state.borrow().items.get_by_key(key).cloned()
    }

    fn find_index_path(&self, key: &str) -> Option<IndexPath> {
        self.inner.state.borrow().items.find(key).map(IndexPath::row)
    }

    fn comparator(&self) -> ItemComparator {
        self.inner.comparator.clone()
    }

    fn subscribe_events(&self, callback: EventCallback) -> SubscriptionId {
        let id = self.inner.subscriptions.subscribe(callback);
        let replay = self.inner.state.borrow().initial_load.clone();
        if let Some(result) = replay {
            self.inner
                .subscriptions
                .emit_to(id, StreamEvent::InitialLoadFinished(result));
        }
        id
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.inner.subscriptions.unsubscribe(id)
    }
}
