//! Shared helpers for the stream scenario tests.

#![allow(dead_code)]

use rivulet_core::{field_map, FetchError, FieldMap, Item, Keyed};
use rivulet_reactive::{IndexPath, StreamDelegate, StreamEvent, StreamSource};
use std::cell::RefCell;
use std::rc::Rc;

/// A delegate that logs every event it receives.
#[derive(Debug, Default)]
pub struct Recorder {
    pub events: Vec<StreamEvent>,
}

impl Recorder {
    /// Subscribes a new recorder to `source`.
    pub fn attach<S: StreamSource<Item>>(source: &S) -> Rc<RefCell<Recorder>> {
        let recorder = Rc::new(RefCell::new(Recorder::default()));
        source.subscribe_delegate(recorder.clone());
        recorder
    }

    /// Returns and clears the recorded events.
    pub fn take(&mut self) -> Vec<StreamEvent> {
        std::mem::take(&mut self.events)
    }

    /// Number of completed notification cycles.
    pub fn cycles(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, StreamEvent::DidChange))
            .count()
    }

    /// Every row reported as added, in order.
    pub fn added_rows(&self) -> Vec<usize> {
        self.events
            .iter()
            .filter_map(|e| match e {
                StreamEvent::ItemsAdded(paths) => Some(paths.iter().map(|p| p.row)),
                _ => None,
            })
            .flatten()
            .collect()
    }

    /// Every initial load result delivered.
    pub fn initial_loads(&self) -> Vec<Option<FetchError>> {
        self.events
            .iter()
            .filter_map(|e| match e {
                StreamEvent::InitialLoadFinished(result) => Some(result.clone()),
                _ => None,
            })
            .collect()
    }
}

impl StreamDelegate for Recorder {
    fn will_change(&mut self) {
        self.events.push(StreamEvent::WillChange);
    }

    fn items_deleted(&mut self, paths: &[IndexPath]) {
        self.events.push(StreamEvent::ItemsDeleted(paths.to_vec()));
    }

    fn items_added(&mut self, paths: &[IndexPath]) {
        self.events.push(StreamEvent::ItemsAdded(paths.to_vec()));
    }

    fn items_changed(&mut self, paths: &[IndexPath]) {
        self.events.push(StreamEvent::ItemsChanged(paths.to_vec()));
    }

    fn did_change(&mut self) {
        self.events.push(StreamEvent::DidChange);
    }

    fn initial_load_finished(&mut self, error: Option<&FetchError>) {
        self.events
            .push(StreamEvent::InitialLoadFinished(error.cloned()));
    }
}

/// Keys of every visible item, in order.
pub fn keys<S: StreamSource<Item>>(source: &S) -> Vec<String> {
    source.items().iter().map(|i| i.key().to_string()).collect()
}

/// Keeps a list of keys in step with `source` by replaying each cycle as it
/// is delivered, the way an index-based table would.
pub fn mirror<S>(source: &S) -> Rc<RefCell<Vec<String>>>
where
    S: StreamSource<Item> + Clone + 'static,
{
    let model = Rc::new(RefCell::new(keys(source)));
    let sink = model.clone();
    let reader = source.clone();
    source.subscribe(move |event| {
        let mut model = sink.borrow_mut();
        match event {
            StreamEvent::ItemsDeleted(paths) => {
                for path in paths.iter().rev() {
                    model.remove(path.row);
                }
            }
            StreamEvent::ItemsAdded(paths) => {
                for path in paths {
                    if let Some(item) = reader.get(path.row) {
                        model.insert(path.row, item.key().to_string());
                    }
                }
            }
            _ => {}
        }
    });
    model
}

/// Field map with a single integer field `n`.
pub fn n(value: i64) -> FieldMap {
    field_map([("n", value)])
}

/// Flat paths for the given rows.
pub fn rows(rows: &[usize]) -> Vec<IndexPath> {
    rows.iter().map(|&r| IndexPath::row(r)).collect()
}
