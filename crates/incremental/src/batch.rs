//! Batch staging and application.
//!
//! A batch starts as a copy of the committed collection. Staged mutations edit
//! the copy in any order; appending is always fine because the copy is sorted
//! again when the batch is applied.

use crate::edit_script::{diff, EditScript};
use alloc::vec;
use core::cmp::Ordering;
use core::mem;
use log::trace;
use rivulet_core::Keyed;
use rivulet_index::KeyedCollection;

/// The scratch state of a batch between its first mutation and its flush.
#[derive(Clone, Debug)]
pub struct BatchState<T> {
    scratch: KeyedCollection<T>,
    active: bool,
}

impl<T> Default for BatchState<T> {
    fn default() -> Self {
        Self {
            scratch: KeyedCollection::default(),
            active: false,
        }
    }
}

impl<T: Keyed + Clone> BatchState<T> {
    /// Creates an inactive batch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if a batch is pending.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Starts a batch if none is pending and returns the scratch collection.
    ///
    /// A fresh batch mirrors `committed`; a pending one is returned as is.
    pub fn begin(&mut self, committed: &KeyedCollection<T>) -> &mut KeyedCollection<T> {
        if !self.active {
            self.scratch = committed.clone();
            self.active = true;
        }
        &mut self.scratch
    }

    /// Replaces the scratch collection wholesale, starting a batch if needed.
    pub fn restage(&mut self, next: KeyedCollection<T>) {
        self.scratch = next;
        self.active = true;
    }

    /// Returns the scratch collection of the pending batch.
    pub fn scratch(&self) -> Option<&KeyedCollection<T>> {
        self.active.then_some(&self.scratch)
    }

    /// Returns the scratch collection of the pending batch for mutation.
    pub fn scratch_mut(&mut self) -> Option<&mut KeyedCollection<T>> {
        if self.active {
            Some(&mut self.scratch)
        } else {
            None
        }
    }

    /// Ends the pending batch and hands back its scratch collection.
    pub fn take(&mut self) -> Option<KeyedCollection<T>> {
        if !self.active {
            return None;
        }
        self.active = false;
        Some(mem::take(&mut self.scratch))
    }

    /// Ends the pending batch, dropping its staged mutations.
    pub fn discard(&mut self) {
        self.active = false;
        self.scratch.clear();
    }
}

/// Sorts `next`, truncates it to `limit` and commits it over `committed`.
///
/// Truncation keeps the lowest-sorted prefix and only happens when `next` is
/// longer than the limit. Returns the edit script from the previous committed
/// state to the new one.
pub fn apply_batch<T, F>(
    committed: &mut KeyedCollection<T>,
    mut next: KeyedCollection<T>,
    compare: F,
    limit: Option<usize>,
) -> EditScript
where
    T: Keyed,
    F: FnMut(&T, &T) -> Ordering,
{
    next.sort_by(compare);
    if let Some(limit) = limit {
        if next.len() > limit {
            trace!("truncating batch of {} items to {}", next.len(), limit);
            next.truncate(limit);
        }
    }
    let script = diff(committed.as_slice(), next.as_slice());
    *committed = next;
    script
}

/// Moves the item at `position` to where `compare` sorts it, if it is out of
/// order with its neighbours.
///
/// Every other item in `committed` must already be sorted. Returns the
/// one-delete, one-add script of the move, or None if the item stays put.
pub fn reposition<T, F>(
    committed: &mut KeyedCollection<T>,
    position: usize,
    mut compare: F,
) -> Option<EditScript>
where
    T: Keyed,
    F: FnMut(&T, &T) -> Ordering,
{
    let items = committed.as_slice();
    let item = items.get(position)?;
    let after_next = items
        .get(position + 1)
        .map_or(false, |next| compare(item, next) == Ordering::Greater);
    let before_previous = position
        .checked_sub(1)
        .and_then(|previous| items.get(previous))
        .map_or(false, |previous| compare(previous, item) == Ordering::Greater);
    if !after_next && !before_previous {
        return None;
    }

    let item = committed.remove_at(position).ok()?;
    let target = committed
        .as_slice()
        .partition_point(|other| compare(other, &item) != Ordering::Greater);
    trace!("moving {} from {} to {}", item.key(), position, target);
    committed.insert(item, target).ok()?;
    Some(EditScript {
        deletes: vec![position],
        adds: vec![target],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use alloc::vec::Vec;
    use rivulet_core::{Item, StreamItem};

    fn item(key: &str) -> Item {
        Item::with_key(key)
    }

    fn by_key(a: &Item, b: &Item) -> Ordering {
        a.key().cmp(b.key())
    }

    fn keys(c: &KeyedCollection<Item>) -> Vec<&str> {
        c.iter().map(|i| i.key()).collect()
    }

    #[test]
    fn test_begin_mirrors_committed() {
        let committed = KeyedCollection::from_vec(vec![item("a"), item("b")]).unwrap();
        let mut batch = BatchState::new();
        assert!(!batch.is_active());
        assert!(batch.scratch().is_none());

        batch.begin(&committed).append(item("c")).unwrap();
        assert!(batch.is_active());
        assert_eq!(keys(batch.scratch().unwrap()), vec!["a", "b", "c"]);

        // A second begin keeps the staged mutation.
        let other = KeyedCollection::new();
        assert_eq!(batch.begin(&other).len(), 3);
        assert_eq!(committed.len(), 2);
    }

    #[test]
    fn test_take_and_discard() {
        let committed = KeyedCollection::new();
        let mut batch = BatchState::new();
        batch.begin(&committed).append(item("x")).unwrap();

        let taken = batch.take().unwrap();
        assert_eq!(keys(&taken), vec!["x"]);
        assert!(!batch.is_active());
        assert!(batch.take().is_none());

        batch.restage(KeyedCollection::from_vec(vec![item("z")]).unwrap());
        assert!(batch.is_active());
        assert_eq!(keys(batch.scratch().unwrap()), vec!["z"]);

        batch.begin(&committed).append(item("y")).unwrap();
        batch.discard();
        assert!(!batch.is_active());
        assert!(batch.begin(&committed).is_empty());
    }

    #[test]
    fn test_apply_batch_sorts_and_diffs() {
        let mut committed = KeyedCollection::from_vec(vec![item("a"), item("c")]).unwrap();
        let next = KeyedCollection::from_vec(vec![item("d"), item("c"), item("b")]).unwrap();

        let script = apply_batch(&mut committed, next, by_key, None);
        assert_eq!(keys(&committed), vec!["b", "c", "d"]);
        assert_eq!(script.deletes, vec![0]);
        assert_eq!(script.adds, vec![0, 2]);
    }

    #[test]
    fn test_apply_batch_limit_keeps_prefix() {
        let mut committed = KeyedCollection::new();
        let next = KeyedCollection::from_vec(vec![item("c"), item("a"), item("b")]).unwrap();

        let script = apply_batch(&mut committed, next, by_key, Some(2));
        assert_eq!(keys(&committed), vec!["a", "b"]);
        assert_eq!(script.adds, vec![0, 1]);

        let next = KeyedCollection::from_vec(vec![item("a")]).unwrap();
        let script = apply_batch(&mut committed, next, by_key, Some(2));
        assert_eq!(keys(&committed), vec!["a"]);
        assert_eq!(script.deletes, vec![1]);
        assert!(committed.find("b").is_none());
    }

    #[test]
    fn test_apply_batch_no_change() {
        let mut committed = KeyedCollection::from_vec(vec![item("a")]).unwrap();
        let next = committed.clone();
        assert!(apply_batch(&mut committed, next, by_key, Some(5)).is_empty());
    }

    fn ranked(key: &str, n: i64) -> Item {
        Item::with_key(key).with_field("n", n)
    }

    fn by_rank(a: &Item, b: &Item) -> Ordering {
        let rank = |item: &Item| item.field("n").as_i64().unwrap_or(0);
        rank(a).cmp(&rank(b)).then_with(|| a.key().cmp(b.key()))
    }

    #[test]
    fn test_reposition_moves_out_of_order_item() {
        let mut committed = KeyedCollection::from_vec(vec![
            ranked("a", 5),
            ranked("b", 2),
            ranked("c", 3),
        ])
        .unwrap();

        let script = reposition(&mut committed, 0, by_rank).unwrap();
        assert_eq!(script.deletes, vec![0]);
        assert_eq!(script.adds, vec![2]);
        assert_eq!(keys(&committed), vec!["b", "c", "a"]);
        assert_eq!(committed.find("a"), Some(2));

        let mut committed = KeyedCollection::from_vec(vec![
            ranked("a", 1),
            ranked("b", 2),
            ranked("c", 0),
        ])
        .unwrap();
        let script = reposition(&mut committed, 2, by_rank).unwrap();
        assert_eq!((script.deletes, script.adds), (vec![2], vec![0]));
        assert_eq!(keys(&committed), vec!["c", "a", "b"]);
    }

    #[test]
    fn test_reposition_leaves_sorted_item() {
        let mut committed =
            KeyedCollection::from_vec(vec![ranked("a", 1), ranked("b", 2), ranked("c", 3)]).unwrap();
        assert!(reposition(&mut committed, 1, by_rank).is_none());
        assert!(reposition(&mut committed, 7, by_rank).is_none());
        assert_eq!(keys(&committed), vec!["a", "b", "c"]);
    }
}
