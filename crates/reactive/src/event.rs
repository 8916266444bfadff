//! Observer events.
//!
//! Every stream-like type reports changes with the same event sequence: a
//! `WillChange`, deletes by pre-flush position, adds by post-flush position,
//! then a `DidChange`. `ItemsChanged` may arrive on its own, outside any
//! will/did pair, and `InitialLoadFinished` arrives exactly once.

use alloc::vec::Vec;
use rivulet_core::FetchError;
use rivulet_incremental::EditScript;

/// A position in a stream: a row within a section.
///
/// Flat streams always use section 0.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IndexPath {
    pub section: usize,
    pub row: usize,
}

impl IndexPath {
    /// Creates a path from a section and a row.
    #[inline]
    pub fn new(section: usize, row: usize) -> Self {
        Self { section, row }
    }

    /// Creates a path to a row of a flat stream.
    #[inline]
    pub fn row(row: usize) -> Self {
        Self { section: 0, row }
    }
}

/// A notification delivered to stream observers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StreamEvent {
    /// A batch of deletes and adds is about to be reported
    WillChange,
    /// Items removed, by position before the batch
    ItemsDeleted(Vec<IndexPath>),
    /// Items inserted, by position after the batch
    ItemsAdded(Vec<IndexPath>),
    /// Items whose contents changed in place, by current position
    ItemsChanged(Vec<IndexPath>),
    /// The batch announced by `WillChange` is complete
    DidChange,
    /// The initial load completed, successfully or not
    InitialLoadFinished(Option<FetchError>),
}

impl StreamEvent {
    /// Expands an edit script into the notification cycle that reports it.
    ///
    /// Returns no events for an empty script.
    pub fn cycle(script: &EditScript, section: usize) -> Vec<StreamEvent> {
        if script.is_empty() {
            return Vec::new();
        }
        let paths = |rows: &[usize]| -> Vec<IndexPath> {
            rows.iter().map(|&row| IndexPath::new(section, row)).collect()
        };
        let mut events = Vec::with_capacity(4);
        events.push(StreamEvent::WillChange);
        if !script.deletes.is_empty() {
            events.push(StreamEvent::ItemsDeleted(paths(&script.deletes)));
        }
        if !script.adds.is_empty() {
            events.push(StreamEvent::ItemsAdded(paths(&script.adds)));
        }
        events.push(StreamEvent::DidChange);
        events
    }
}

/// Adapter-style observer with one method per event.
///
/// Every method defaults to doing nothing, so implementations only override
/// what they care about.
pub trait StreamDelegate {
    fn will_change(&mut self) {}

    fn items_deleted(&mut self, _paths: &[IndexPath]) {}

    fn items_added(&mut self, _paths: &[IndexPath]) {}

    fn items_changed(&mut self, _paths: &[IndexPath]) {}

    fn did_change(&mut self) {}

    fn initial_load_finished(&mut self, _error: Option<&FetchError>) {}
}

/// Routes one event to the matching delegate method.
pub fn dispatch<D: StreamDelegate + ?Sized>(delegate: &mut D, event: &StreamEvent) {
    match event {
        StreamEvent::WillChange => delegate.will_change(),
        StreamEvent::ItemsDeleted(paths) => delegate.items_deleted(paths),
        StreamEvent::ItemsAdded(paths) => delegate.items_added(paths),
        StreamEvent::ItemsChanged(paths) => delegate.items_changed(paths),
        StreamEvent::DidChange => delegate.did_change(),
        StreamEvent::InitialLoadFinished(error) => delegate.initial_load_finished(error.as_ref()),
    }
}
