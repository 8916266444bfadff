//! Live, sorted, filtered streams.
//!
//! A `Stream` ingests child events from a backend feed and keeps every known
//! item in a superset collection. The items that pass its predicate are
//! exposed in comparator order. Mutations are staged into a batch; once the
//! batch delay elapses (or at once when batching is disabled) the batch is
//! sorted, truncated, diffed against the committed collection and reported to
//! observers as one notification cycle.
//!
//! # Example
//!
//! ```rust
//! use std::rc::Rc;
//! use std::time::Duration;
//! use rivulet_core::{field_map, Item};
//! use rivulet_reactive::{ManualScheduler, StreamConfig, Stream, StreamSource};
//!
//! let scheduler = Rc::new(ManualScheduler::new());
//! let stream: Stream<Item> = Stream::new(StreamConfig::new(), scheduler.clone()).unwrap();
//!
//! stream.child_added("b", &field_map([("n", 2i64)])).unwrap();
//! stream.child_added("a", &field_map([("n", 1i64)])).unwrap();
//! assert_eq!(stream.len(), 0); // still batching
//!
//! scheduler.advance(Duration::from_millis(100));
//! assert_eq!(stream.find_index_path("a").map(|p| p.row), Some(0));
//! ```

use crate::event::{IndexPath, StreamEvent};
use crate::scheduler::{Scheduler, TimerId};
use crate::source::StreamSource;
use crate::subscription::{EventCallback, SubscriptionId, SubscriptionManager};
use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::string::{String, ToString};
use alloc::vec;
use alloc::vec::Vec;
use core::cell::RefCell;
use core::time::Duration;
use hashbrown::HashSet;
use log::{debug, trace, warn};
use rivulet_core::{Error, FetchError, FieldMap, Result, StreamItem};
use rivulet_incremental::{apply_batch, reposition, BatchState};
use rivulet_index::{Comparator, ItemComparator, KeyedCollection, Order, OrderBy};

/// Batch delay used when none is configured.
pub const DEFAULT_BATCH_DELAY: Duration = Duration::from_millis(100);

/// Client-side membership test for a stream.
///
/// Evaluated while the stream is being mutated, so it must not call back
/// into the stream.
pub type Predicate<T> = Rc<dyn Fn(&T) -> bool>;

/// Stream configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StreamConfig {
    /// What items are sorted by
    pub order_by: OrderBy,
    /// Sort direction
    pub order: Order,
    /// Debounce window for batches; `None` or zero flushes synchronously
    pub batch_delay: Option<Duration>,
    /// Maximum number of items the backend query fetches
    pub fetch_limit: Option<usize>,
    /// Maximum number of visible items after the predicate
    pub post_predicate_limit: Option<usize>,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            order_by: OrderBy::Key,
            order: Order::Asc,
            batch_delay: Some(DEFAULT_BATCH_DELAY),
            fetch_limit: None,
            post_predicate_limit: None,
        }
    }
}

impl StreamConfig {
    /// Creates the default configuration: by key, ascending, 100ms batches.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn order_by(mut self, order_by: OrderBy) -> Self {
        self.order_by = order_by;
        self
    }

    pub fn order(mut self, order: Order) -> Self {
        self.order = order;
        self
    }

    pub fn batch_delay(mut self, delay: Option<Duration>) -> Self {
        self.batch_delay = delay;
        self
    }

    pub fn fetch_limit(mut self, limit: Option<usize>) -> Self {
        self.fetch_limit = limit;
        self
    }

    pub fn post_predicate_limit(mut self, limit: Option<usize>) -> Self {
        self.post_predicate_limit = limit;
        self
    }

    /// Returns the comparator described by this configuration.
    pub fn comparator(&self) -> ItemComparator {
        ItemComparator::new(self.order_by.clone(), self.order)
    }

    /// Checks the configuration for values no stream can honor.
    pub fn validate(&self) -> Result<()> {
        if let OrderBy::Field(name) = &self.order_by {
            if name.is_empty() {
                return Err(Error::invalid_config("order_by field name is empty"));
            }
        }
        Ok(())
    }

    fn flush_delay(&self) -> Option<Duration> {
        self.batch_delay.filter(|delay| !delay.is_zero())
    }
}

/// Coarse lifecycle state of a stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StreamPhase {
    /// The initial fetch has not been reported yet
    Loading,
    /// `InitialLoadFinished` has been delivered
    Ready,
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum InitialLoad {
    Waiting,
    /// Delivered after the next flush
    Flushing,
    /// Replayed to every later subscriber
    Delivered(Option<FetchError>),
}

/// One child event from a backend feed.
#[derive(Clone, Debug, PartialEq)]
pub enum FeedEvent {
    Added { key: String, fields: FieldMap },
    Removed { key: String },
    Changed { key: String, fields: FieldMap },
    /// The initial value load finished, with an error if it failed
    Loaded(Option<FetchError>),
}

/// A bounded fetch beyond the current page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageRequest {
    /// Key to start at, inclusive
    pub start: String,
    /// Key to end at, inclusive
    pub end: Option<String>,
    /// Maximum number of children to return
    pub limit: usize,
    pub order_by: OrderBy,
    pub order: Order,
}

/// The children a page fetch returned, or why it failed.
pub type PageResult = core::result::Result<Vec<(String, FieldMap)>, FetchError>;

/// Completion of a page fetch.
pub type PageCallback = Box<dyn FnOnce(PageResult)>;

/// Completion of `Stream::fetch_more`.
pub type FetchDone = Box<dyn FnOnce(core::result::Result<(), FetchError>)>;

/// The transport that serves pagination requests.
///
/// `fetch` may complete synchronously or later, but must invoke `done` exactly
/// once.
pub trait Pager {
    fn fetch(&self, request: PageRequest, done: PageCallback);
}

struct StreamCore<T> {
    config: StreamConfig,
    comparator: ItemComparator,
    predicate: Option<Predicate<T>>,
    /// Every known item, before the predicate
    superset: KeyedCollection<Rc<T>>,
    /// What observers currently see
    committed: KeyedCollection<Rc<T>>,
    batch: BatchState<Rc<T>>,
    timer: Option<TimerId>,
    initial_load: InitialLoad,
    fetching_more: bool,
}

impl<T: StreamItem> StreamCore<T> {
    fn is_visible(&self, item: &T) -> bool {
        self.predicate.as_ref().map_or(true, |predicate| predicate(item))
    }

    fn begin_batch(&mut self) -> &mut KeyedCollection<Rc<T>> {
        self.batch.begin(&self.committed)
    }

    fn stage_append(&mut self, item: Rc<T>) {
        if let Err(err) = self.begin_batch().append(item) {
            trace!("already staged: {}", err);
        }
    }

    /// Stages the removal of a visible key. Returns false if it is not visible.
    fn stage_remove(&mut self, key: &str) -> bool {
        let present = match self.batch.scratch() {
            Some(scratch) => scratch.has(key),
            None => self.committed.has(key),
        };
        if present {
            self.begin_batch().remove_key(key);
        }
        present
    }

    /// Replaces the item with the same key in every collection holding it.
    fn replace(&mut self, item: Rc<T>) {
        let _ = self.committed.replace(Rc::clone(&item));
        if let Some(scratch) = self.batch.scratch_mut() {
            let _ = scratch.replace(Rc::clone(&item));
        }
        let _ = self.superset.replace(item);
    }

    /// Adds materialized items to the superset and stages the visible ones.
    ///
    /// Fails without changing anything if a key is already known or repeats.
    fn ingest(&mut self, items: Vec<T>) -> Result<bool> {
        {
            let mut seen = HashSet::with_capacity(items.len());
            for item in &items {
                if self.superset.has(item.key()) || !seen.insert(item.key()) {
                    warn!("duplicate add for key {}", item.key());
                    return Err(Error::duplicate_key(item.key()));
                }
            }
        }

        let mut staged = false;
        for item in items {
            let item = Rc::new(item);
            self.superset.append(Rc::clone(&item))?;
            if self.is_visible(&item) {
                self.stage_append(item);
                staged = true;
            }
        }
        Ok(staged)
    }

    fn flush(&mut self) -> Vec<StreamEvent> {
        let Some(next) = self.batch.take() else {
            return Vec::new();
        };
        let comparator = &self.comparator;
        let script = apply_batch(
            &mut self.committed,
            next,
            |a, b| comparator.compare(&**a, &**b),
            self.config.post_predicate_limit,
        );
        debug!(
            "stream flush: {} deleted, {} added, {} visible",
            script.deletes.len(),
            script.adds.len(),
            self.committed.len()
        );

        let mut events = StreamEvent::cycle(&script, 0);
        if self.initial_load == InitialLoad::Flushing {
            self.initial_load = InitialLoad::Delivered(None);
            events.push(StreamEvent::InitialLoadFinished(None));
        }
        events
    }
}

fn materialize<T: StreamItem>(key: &str, fields: &FieldMap) -> T {
    let mut item = T::with_key(key);
    item.update(fields);
    item
}

struct StreamShared<T: StreamItem + 'static> {
    core: RefCell<StreamCore<T>>,
    subscriptions: SubscriptionManager,
    scheduler: Rc<dyn Scheduler>,
    pager: Option<Rc<dyn Pager>>,
}

impl<T: StreamItem + 'static> StreamShared<T> {
    /// Cancels the debounce timer and flushes any pending batch now.
    fn finish_outstanding_batch(&self) {
        let (events, timer) = {
            let mut core = self.core.borrow_mut();
            let timer = core.timer.take();
            (core.flush(), timer)
        };
        if let Some(id) = timer {
            self.scheduler.cancel(id);
        }
        self.subscriptions.emit_all(events);
    }
}

impl<T: StreamItem + 'static> Drop for StreamShared<T> {
    fn drop(&mut self) {
        self.finish_outstanding_batch();
    }
}

/// A live, sorted, filtered view of a backend collection.
///
/// `Stream` is a cheap handle; clones share the same state. The stream lives
/// until its last handle is dropped, at which point any pending batch is
/// flushed.
pub struct Stream<T: StreamItem + 'static> {
    shared: Rc<StreamShared<T>>,
}

impl<T: StreamItem + 'static> Clone for Stream<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Rc::clone(&self.shared),
        }
    }
}

impl<T: StreamItem + 'static> Stream<T> {
    /// Creates a stream without pagination support.
    pub fn new(config: StreamConfig, scheduler: Rc<dyn Scheduler>) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config, scheduler, None))
    }

    /// Creates a stream whose `fetch_more` requests go to `pager`.
    pub fn with_pager(
        config: StreamConfig,
        scheduler: Rc<dyn Scheduler>,
        pager: Rc<dyn Pager>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config, scheduler, Some(pager)))
    }

    pub(crate) fn build(
        config: StreamConfig,
        scheduler: Rc<dyn Scheduler>,
        pager: Option<Rc<dyn Pager>>,
    ) -> Self {
        // Nothing to load: every subscriber is told at once.
        let initial_load = if config.fetch_limit == Some(0) {
            InitialLoad::Delivered(None)
        } else {
            InitialLoad::Waiting
        };
        let core = StreamCore {
            comparator: config.comparator(),
            config,
            predicate: None,
            superset: KeyedCollection::new(),
            committed: KeyedCollection::new(),
            batch: BatchState::new(),
            timer: None,
            initial_load,
            fetching_more: false,
        };
        Self {
            shared: Rc::new(StreamShared {
                core: RefCell::new(core),
                subscriptions: SubscriptionManager::new(),
                scheduler,
                pager,
            }),
        }
    }

    /// Applies one backend feed event.
    pub fn apply(&self, event: FeedEvent) -> Result<()> {
        match event {
            FeedEvent::Added { key, fields } => return self.child_added(&key, &fields),
            FeedEvent::Removed { key } => self.child_removed(&key),
            FeedEvent::Changed { key, fields } => self.child_changed(&key, &fields),
            FeedEvent::Loaded(error) => self.initial_load_complete(error),
        }
        Ok(())
    }

    /// Materializes a new child and stages it if it passes the predicate.
    ///
    /// Fails with `DuplicateKey`, changing nothing, if the key is already
    /// known.
    pub fn child_added(&self, key: &str, fields: &FieldMap) -> Result<()> {
        self.insert_items(vec![materialize(key, fields)])
    }

    /// Forgets a child. Unknown keys are ignored.
    pub fn child_removed(&self, key: &str) {
        self.remove_keys(&[key]);
    }

    /// Rehydrates a known child and re-evaluates its membership.
    ///
    /// Unknown keys are ignored.
    pub fn child_changed(&self, key: &str, fields: &FieldMap) {
        self.modify(key, |item| item.update(fields));
    }

    /// Applies a local mutation to a known item and re-evaluates its
    /// membership, like a backend change would.
    ///
    /// Returns false if the key is unknown.
    pub fn modify<F>(&self, key: &str, mutate: F) -> bool
    where
        F: FnOnce(&mut T),
    {
        if !self.shared.core.borrow().superset.has(key) {
            trace!("ignoring change for unknown key {}", key);
            return false;
        }
        // Positions must refer to committed state before the item changes.
        self.shared.finish_outstanding_batch();

        let updated = {
            let core = self.shared.core.borrow();
            core.superset.get_by_key(key).map(|current| {
                let mut next = T::clone(current);
                mutate(&mut next);
                Rc::new(next)
            })
        };
        match updated {
            Some(item) => {
                self.shared.core.borrow_mut().replace(item);
                self.handle_item_changed(key);
                true
            }
            None => {
                trace!("ignoring change for unknown key {}", key);
                false
            }
        }
    }

    /// Re-evaluates the predicate for a known item after it changed.
    ///
    /// A pending batch is flushed first so the reported position is against
    /// committed state. An item that stays visible and keeps its place is
    /// reported as changed in place. One that now sorts elsewhere is moved at
    /// once and reported as a delete at its old row plus an add at its new
    /// one. One that enters or leaves the visible set is staged into a new
    /// batch.
    pub fn handle_item_changed(&self, key: &str) {
        if !self.shared.core.borrow().superset.has(key) {
            trace!("ignoring change for unknown key {}", key);
            return;
        }
        self.shared.finish_outstanding_batch();

        let (row, visible) = {
            let core = self.shared.core.borrow();
            let visible = core
                .superset
                .get_by_key(key)
                .map_or(false, |item| core.is_visible(item));
            (core.committed.find(key), visible)
        };
        match (row, visible) {
            (Some(row), true) => {
                let moved = {
                    let mut guard = self.shared.core.borrow_mut();
                    let core = &mut *guard;
                    let comparator = &core.comparator;
                    reposition(&mut core.committed, row, |a, b| {
                        comparator.compare(&**a, &**b)
                    })
                };
                match moved {
                    Some(script) => {
                        debug!("stream moved {} out of row {}", key, row);
                        self.shared
                            .subscriptions
                            .emit_all(StreamEvent::cycle(&script, 0));
                    }
                    None => self
                        .shared
                        .subscriptions
                        .emit(StreamEvent::ItemsChanged(vec![IndexPath::row(row)])),
                }
            }
            (Some(_), false) => {
                if self.shared.core.borrow_mut().stage_remove(key) {
                    self.schedule_flush();
                }
            }
            (None, true) => {
                {
                    let mut core = self.shared.core.borrow_mut();
                    if let Some(item) = core.superset.get_by_key(key).cloned() {
                        core.stage_append(item);
                    }
                }
                self.schedule_flush();
            }
            (None, false) => {}
        }
    }

    /// Reports the end of the initial value load.
    ///
    /// An error is delivered at once. Success is delivered after the next
    /// flush, which is scheduled here so it happens even with no pending
    /// changes. Only the first report counts.
    pub fn initial_load_complete(&self, error: Option<FetchError>) {
        let mut core = self.shared.core.borrow_mut();
        if core.initial_load != InitialLoad::Waiting {
            trace!("initial load already reported");
            return;
        }
        match error {
            Some(error) => {
                core.initial_load = InitialLoad::Delivered(Some(error.clone()));
                drop(core);
                warn!("initial load failed: {}", error);
                self.shared
                    .subscriptions
                    .emit(StreamEvent::InitialLoadFinished(Some(error)));
            }
            None => {
                core.initial_load = InitialLoad::Flushing;
                core.begin_batch();
                drop(core);
                self.schedule_flush();
            }
        }
    }

    /// Replaces the predicate and re-derives the visible set from the superset.
    ///
    /// Any pending batch is flushed first.
    pub fn set_predicate(&self, predicate: Option<Predicate<T>>) {
        self.shared.finish_outstanding_batch();
        {
            let mut core = self.shared.core.borrow_mut();
            let mut next = core.superset.clone();
            if let Some(predicate) = &predicate {
                next.retain(|item| predicate(&**item));
            }
            core.predicate = predicate;
            core.batch.restage(next);
        }
        self.schedule_flush();
    }

    /// Flushes any pending batch now.
    pub fn flush(&self) {
        self.shared.finish_outstanding_batch();
    }

    /// Fetches up to `count` more items starting at key `start`.
    ///
    /// Issues no fetch when the stream has no pager, when nothing has been
    /// loaded yet, or when a fetch is already outstanding; `done` is still
    /// invoked, exactly once, in every case. Keys already known are skipped.
    pub fn fetch_more(&self, count: usize, start: &str, end: Option<&str>, done: FetchDone) {
        let Some(pager) = self.shared.pager.clone() else {
            trace!("fetch_more without a pager");
            done(Ok(()));
            return;
        };
        let request = {
            let mut core = self.shared.core.borrow_mut();
            if core.superset.is_empty() || core.fetching_more {
                drop(core);
                trace!("fetch_more skipped");
                done(Ok(()));
                return;
            }
            core.fetching_more = true;
            PageRequest {
                start: start.to_string(),
                end: end.map(ToString::to_string),
                // The start key is inclusive, so ask for one extra.
                limit: count + 1,
                order_by: core.config.order_by.clone(),
                order: core.config.order,
            }
        };

        let weak = Rc::downgrade(&self.shared);
        pager.fetch(
            request,
            Box::new(move |result| match weak.upgrade() {
                Some(shared) => Stream { shared }.finish_fetch(result, done),
                None => done(result.map(|_| ())),
            }),
        );
    }

    fn finish_fetch(&self, result: PageResult, done: FetchDone) {
        self.shared.core.borrow_mut().fetching_more = false;
        let children = match result {
            Ok(children) => children,
            Err(error) => {
                warn!("fetch_more failed: {}", error);
                done(Err(error));
                return;
            }
        };

        let staged = {
            let mut core = self.shared.core.borrow_mut();
            let mut staged = false;
            for (key, fields) in children {
                let item: Rc<T> = Rc::new(materialize(&key, &fields));
                if core.superset.append(Rc::clone(&item)).is_err() {
                    trace!("fetch_more skipping known key {}", key);
                    continue;
                }
                if core.is_visible(&item) {
                    core.stage_append(item);
                    staged = true;
                }
            }
            staged
        };
        if staged {
            self.schedule_flush();
        }
        done(Ok(()));
    }

    /// Returns the first visible position whose item sorts after `exemplar`.
    ///
    /// `exemplar` need not be in the stream.
    pub fn find_index_after(&self, exemplar: &T) -> Option<IndexPath> {
        let core = self.shared.core.borrow();
        let comparator = &core.comparator;
        core.committed
            .find_first_where(|item| comparator.is_less(exemplar, &**item))
            .map(IndexPath::row)
    }

    /// Returns the last visible position whose item sorts before `exemplar`.
    pub fn find_index_before(&self, exemplar: &T) -> Option<IndexPath> {
        let core = self.shared.core.borrow();
        let comparator = &core.comparator;
        core.committed
            .find_last_where(|item| comparator.is_less(&**item, exemplar))
            .map(IndexPath::row)
    }

    /// Returns the lifecycle phase.
    pub fn phase(&self) -> StreamPhase {
        match self.shared.core.borrow().initial_load {
            InitialLoad::Delivered(_) => StreamPhase::Ready,
            InitialLoad::Waiting | InitialLoad::Flushing => StreamPhase::Loading,
        }
    }

    /// Returns true if a batch is waiting to be flushed.
    pub fn is_batching(&self) -> bool {
        self.shared.core.borrow().batch.is_active()
    }

    /// Returns true if a `fetch_more` request is outstanding.
    pub fn is_fetching_more(&self) -> bool {
        self.shared.core.borrow().fetching_more
    }

    /// Returns the number of known items, visible or not.
    pub fn superset_len(&self) -> usize {
        self.shared.core.borrow().superset.len()
    }

    /// Returns the known item with the given key, visible or not.
    pub fn find_known(&self, key: &str) -> Option<Rc<T>> {
        self.shared.core.borrow().superset.get_by_key(key).cloned()
    }

    /// Returns the configuration this stream was built with.
    pub fn config(&self) -> StreamConfig {
        self.shared.core.borrow().config.clone()
    }

    /// Adds materialized items, failing on known or repeated keys.
    pub(crate) fn insert_items(&self, items: Vec<T>) -> Result<()> {
        let staged = self.shared.core.borrow_mut().ingest(items)?;
        if staged {
            self.schedule_flush();
        }
        Ok(())
    }

    /// Forgets the given keys. Unknown keys are ignored.
    pub(crate) fn remove_keys(&self, keys: &[&str]) {
        let staged = {
            let mut core = self.shared.core.borrow_mut();
            let mut staged = false;
            for key in keys {
                let known = core.superset.remove_key(key).is_some();
                let removed = core.stage_remove(key);
                if !known && !removed {
                    trace!("ignoring removal of unknown key {}", key);
                }
                staged |= removed;
            }
            staged
        };
        if staged {
            self.schedule_flush();
        }
    }

    /// Replaces every known item at once, failing on repeated keys.
    pub(crate) fn reset_items(&self, items: Vec<T>) -> Result<()> {
        let superset = KeyedCollection::from_vec(items.into_iter().map(Rc::new).collect())?;
        {
            let mut core = self.shared.core.borrow_mut();
            let mut next = superset.clone();
            if let Some(predicate) = core.predicate.clone() {
                next.retain(|item| predicate(&**item));
            }
            core.superset = superset;
            core.batch.restage(next);
        }
        self.schedule_flush();
        Ok(())
    }

    /// Restarts the debounce window, or flushes at once if batching is off.
    fn schedule_flush(&self) {
        let delay = self.shared.core.borrow().config.flush_delay();
        let Some(delay) = delay else {
            self.shared.finish_outstanding_batch();
            return;
        };

        let previous = self.shared.core.borrow_mut().timer.take();
        if let Some(id) = previous {
            self.shared.scheduler.cancel(id);
        }
        let weak = Rc::downgrade(&self.shared);
        let id = self.shared.scheduler.schedule(
            delay,
            Box::new(move || {
                if let Some(shared) = weak.upgrade() {
                    shared.finish_outstanding_batch();
                }
            }),
        );
        self.shared.core.borrow_mut().timer = Some(id);
    }
}

impl<T: StreamItem + 'static> StreamSource<T> for Stream<T> {
    fn len(&self) -> usize {
        self.shared.core.borrow().committed.len()
    }

    fn get(&self, row: usize) -> Option<Rc<T>> {
        self.shared.core.borrow().committed.get(row).cloned()
    }

    fn get_at(&self, path: IndexPath) -> Option<Rc<T>> {
        if path.section != 0 {
            return None;
        }
        self.get(path.row)
    }

    fn find(&self, key: &str) -> Option<Rc<T>> {
        self.shared.core.borrow().committed.get_by_key(key).cloned()
    }

    fn find_index_path(&self, key: &str) -> Option<IndexPath> {
        self.shared
            .core
            .borrow()
            .committed
            .find(key)
            .map(IndexPath::row)
    }

    fn comparator(&self) -> ItemComparator {
        self.shared.core.borrow().comparator.clone()
    }

    /// Subscribers that arrive after the initial load was reported receive
    /// the same `InitialLoadFinished` at once.
    fn subscribe_events(&self, callback: EventCallback) -> SubscriptionId {
        let id = self.shared.subscriptions.subscribe(callback);
        let replay = match &self.shared.core.borrow().initial_load {
            InitialLoad::Delivered(result) => Some(result.clone()),
            InitialLoad::Waiting | InitialLoad::Flushing => None,
        };
        if let Some(result) = replay {
            self.shared
                .subscriptions
                .emit_to(id, StreamEvent::InitialLoadFinished(result));
        }
        id
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.shared.subscriptions.unsubscribe(id)
    }
}
