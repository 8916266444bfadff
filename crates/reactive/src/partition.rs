//! Sectioned views over a flat source.
//!
//! A `PartitionedView` splits a source into labeled sections with a classifier.
//! Each section stays sorted with the source's comparator. A partition map
//! records, for every linear position in the source, where that item lives as
//! a (section, row) pair, so the source's linear events can be translated into
//! section events.
//!
//! Inserting into the middle of a section and removing from it are O(n) in the
//! size of the section; appending in sort order is O(1).

use crate::event::{IndexPath, StreamEvent};
use crate::source::StreamSource;
use crate::subscription::{EventCallback, SubscriptionId, SubscriptionManager};
use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};
use log::{trace, warn};
use rivulet_core::{Error, FetchError, Result, StreamItem};
use rivulet_index::{Comparator, ItemComparator};

/// Maps an item to the index of the section it belongs in.
pub type Classifier<T> = Box<dyn Fn(&T) -> usize>;

struct PartitionState<T> {
    sections: Vec<Vec<Rc<T>>>,
    /// Linear source position to section path
    map: Vec<IndexPath>,
    classifier: Classifier<T>,
    comparator: ItemComparator,
    initial_load: Option<Option<FetchError>>,
}

impl<T: StreamItem> PartitionState<T> {
    fn classify(&self, item: &T) -> Result<usize> {
        let section = (self.classifier)(item);
        if section >= self.sections.len() {
            return Err(Error::SectionOutOfRange {
                section,
                sections: self.sections.len(),
            });
        }
        Ok(section)
    }

    fn classify_or_panic(&self, item: &T) -> usize {
        match self.classify(item) {
            Ok(section) => section,
            Err(err) => panic!("classifier failed for key {}: {}", item.key(), err),
        }
    }

    /// Inserts `item` into `section` and records it at linear `position`.
    fn add(&mut self, section: usize, item: Rc<T>, position: usize) -> IndexPath {
        let comparator = &self.comparator;
        let rows = &mut self.sections[section];
        let row = match rows.last() {
            None => 0,
            Some(last) if comparator.is_less(&**last, &*item) => rows.len(),
            Some(_) => rows.partition_point(|p| !comparator.is_less(&*item, &**p)),
        };
        rows.insert(row, item);

        let path = IndexPath::new(section, row);
        let position = position.min(self.map.len());
        self.map.insert(position, path);
        for (i, entry) in self.map.iter_mut().enumerate() {
            if i != position && entry.section == section && entry.row >= row {
                entry.row += 1;
            }
        }
        path
    }

    /// Removes the item at linear `position`, returning where it was.
    fn delete(&mut self, position: usize) -> Option<IndexPath> {
        if position >= self.map.len() {
            warn!("partition delete at {} beyond map of {}", position, self.map.len());
            return None;
        }
        let path = self.map.remove(position);
        for entry in self.map.iter_mut() {
            if entry.section == path.section && entry.row > path.row {
                entry.row -= 1;
            }
        }
        self.sections[path.section].remove(path.row);
        Some(path)
    }

    fn handle(&mut self, event: &StreamEvent, source: &dyn StreamSource<T>) -> Vec<StreamEvent> {
        match event {
            StreamEvent::WillChange => alloc::vec![StreamEvent::WillChange],
            StreamEvent::DidChange => alloc::vec![StreamEvent::DidChange],
            StreamEvent::ItemsDeleted(paths) => {
                let mut rows: Vec<usize> = paths.iter().map(|p| p.row).collect();
                // Highest first, so every row still refers to the old layout.
                rows.sort_unstable_by(|a, b| b.cmp(a));
                let mut deleted: Vec<IndexPath> =
                    rows.into_iter().filter_map(|row| self.delete(row)).collect();
                deleted.sort_unstable();
                alloc::vec![StreamEvent::ItemsDeleted(deleted)]
            }
            StreamEvent::ItemsAdded(paths) => {
                let mut rows: Vec<usize> = paths.iter().map(|p| p.row).collect();
                rows.sort_unstable();
                let mut added = Vec::with_capacity(rows.len());
                for row in rows {
                    let Some(item) = source.get(row) else {
                        warn!("partition source has no item at row {}", row);
                        continue;
                    };
                    let section = self.classify_or_panic(&item);
                    added.push(self.add(section, item, row));
                }
                alloc::vec![StreamEvent::ItemsAdded(added)]
            }
            StreamEvent::ItemsChanged(paths) => self.handle_changed(paths, source),
            StreamEvent::InitialLoadFinished(result) => {
                self.initial_load = Some(result.clone());
                alloc::vec![StreamEvent::InitialLoadFinished(result.clone())]
            }
        }
    }

    fn handle_changed(
        &mut self,
        paths: &[IndexPath],
        source: &dyn StreamSource<T>,
    ) -> Vec<StreamEvent> {
        let mut changed = Vec::new();
        let mut deleted = Vec::new();
        let mut added = Vec::new();
        for path in paths {
            let (Some(&current), Some(item)) = (self.map.get(path.row), source.get(path.row)) else {
                trace!("partition ignoring change at row {}", path.row);
                continue;
            };
            let section = self.classify_or_panic(&item);
            if section == current.section {
                self.sections[current.section][current.row] = item;
                changed.push(current);
            } else if let Some(old) = self.delete(path.row) {
                deleted.push(old);
                added.push(self.add(section, item, path.row));
            }
        }
        assert_eq!(
            added.len(),
            deleted.len(),
            "partition move produced unequal adds and deletes"
        );

        let mut events = Vec::new();
        if deleted.is_empty() {
            if !changed.is_empty() {
                events.push(StreamEvent::ItemsChanged(changed));
            }
            return events;
        }
        events.push(StreamEvent::WillChange);
        if !changed.is_empty() {
            events.push(StreamEvent::ItemsChanged(changed));
        }
        events.push(StreamEvent::ItemsDeleted(deleted));
        events.push(StreamEvent::ItemsAdded(added));
        events.push(StreamEvent::DidChange);
        events
    }
}

struct PartitionInner<T: StreamItem + 'static> {
    source: Box<dyn StreamSource<T>>,
    titles: Vec<String>,
    state: RefCell<PartitionState<T>>,
    subscriptions: SubscriptionManager,
    source_subscription: Cell<Option<SubscriptionId>>,
}

impl<T: StreamItem + 'static> PartitionInner<T> {
    fn on_source_event(&self, event: &StreamEvent) {
        let events = self.state.borrow_mut().handle(event, &*self.source);
        self.subscriptions.emit_all(events);
    }
}

impl<T: StreamItem + 'static> Drop for PartitionInner<T> {
    fn drop(&mut self) {
        if let Some(id) = self.source_subscription.take() {
            self.source.unsubscribe(id);
        }
    }
}

/// A flat source split into labeled, individually sorted sections.
///
/// The source must report flat positions (section 0), as `Stream`,
/// `TransientStream` and `UnionView` do. Events from this view use
/// (section, row) paths. A classifier that returns a section index out of
/// range is a bug in the caller and panics.
pub struct PartitionedView<T: StreamItem + 'static> {
    inner: Rc<PartitionInner<T>>,
}

impl<T: StreamItem + 'static> Clone for PartitionedView<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: StreamItem + 'static> PartitionedView<T> {
    /// Partitions `source` into one section per title.
    ///
    /// The view is seeded from the source's current contents. Fails with
    /// `InvalidConfig` if `titles` is empty, or with `SectionOutOfRange` if
    /// the classifier rejects a current item.
    pub fn new<S, F>(source: S, titles: Vec<String>, classifier: F) -> Result<Self>
    where
        S: StreamSource<T> + 'static,
        F: Fn(&T) -> usize + 'static,
    {
        if titles.is_empty() {
            return Err(Error::invalid_config("a partition needs at least one section"));
        }
        let mut state = PartitionState {
            sections: titles.iter().map(|_| Vec::new()).collect(),
            map: Vec::with_capacity(source.len()),
            classifier: Box::new(classifier),
            comparator: source.comparator(),
            initial_load: None,
        };
        for (row, item) in source.items().into_iter().enumerate() {
            let section = state.classify(&item)?;
            state.add(section, item, row);
        }

        let inner = Rc::new(PartitionInner {
            source: Box::new(source),
            titles,
            state: RefCell::new(state),
            subscriptions: SubscriptionManager::new(),
            source_subscription: Cell::new(None),
        });
        let weak = Rc::downgrade(&inner);
        let id = inner.source.subscribe_events(Box::new(move |event| {
            if let Some(inner) = weak.upgrade() {
                inner.on_source_event(event);
            }
        }));
        inner.source_subscription.set(Some(id));
        Ok(Self { inner })
    }

    /// Returns the section titles.
    pub fn titles(&self) -> &[String] {
        &self.inner.titles
    }

    /// Returns the number of sections.
    pub fn num_sections(&self) -> usize {
        self.inner.titles.len()
    }

    /// Returns the items of one section in order, or None if out of range.
    pub fn section(&self, section: usize) -> Option<Vec<Rc<T>>> {
        self.inner.state.borrow().sections.get(section).cloned()
    }

    /// Returns the number of items in one section.
    pub fn section_len(&self, section: usize) -> usize {
        self.inner
            .state
            .borrow()
            .sections
            .get(section)
            .map_or(0, Vec::len)
    }

    /// Returns the item at a section and row.
    pub fn get_item(&self, section: usize, row: usize) -> Option<Rc<T>> {
        self.get_at(IndexPath::new(section, row))
    }

    /// Returns a copy of the partition map, one path per source position.
    pub fn partition_map(&self) -> Vec<IndexPath> {
        self.inner.state.borrow().map.clone()
    }
}

impl<T: StreamItem + 'static> StreamSource<T> for PartitionedView<T> {
    fn len(&self) -> usize {
        self.inner.state.borrow().map.len()
    }

    /// Rows here are linear positions in the source.
    fn get(&self, row: usize) -> Option<Rc<T>> {
        self.inner.source.get(row)
    }

    fn get_at(&self, path: IndexPath) -> Option<Rc<T>> {
        self.inner
            .state
            .borrow()
            .sections
            .get(path.section)
            .and_then(|rows| rows.get(path.row))
            .cloned()
    }

    fn find(&self, key: &str) -> Option<Rc<T>> {
        self.inner.source.find(key)
    }

    fn find_index_path(&self, key: &str) -> Option<IndexPath> {
        let linear = self.inner.source.find_index_path(key)?;
        self.inner.state.borrow().map.get(linear.row).copied()
    }

    fn comparator(&self) -> ItemComparator {
        self.inner.state.borrow().comparator.clone()
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
