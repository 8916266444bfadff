//! Keyed ordered collection.
//!
//! `KeyedCollection` wraps a vector and a key-to-position index. Lookup by key
//! and append are O(1); insert and remove at an arbitrary position are O(n)
//! because every following position has to be reindexed.

use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::ops::Index;
use core::slice;
use hashbrown::{HashMap, HashSet};
use rivulet_core::{Error, Keyed, Result};

/// An ordered sequence of keyed objects with O(1) key lookup.
///
/// Keys are unique within a collection. After any mutating call returns, the
/// index maps every key to its exact position in the sequence.
#[derive(Clone, Debug)]
pub struct KeyedCollection<T> {
    items: Vec<T>,
    index: HashMap<String, usize>,
}

impl<T> Default for KeyedCollection<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<T: Keyed> KeyedCollection<T> {
    /// Creates an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a collection from a vector, failing on duplicate keys.
    pub fn from_vec(items: Vec<T>) -> Result<Self> {
        let mut collection = Self::new();
        collection.reset(items)?;
        Ok(collection)
    }

    /// Returns the number of items.
    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if the collection is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the position of the given key.
    #[inline]
    pub fn find(&self, key: &str) -> Option<usize> {
        self.index.get(key).copied()
    }

    /// Returns true if the key is present.
    #[inline]
    pub fn has(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Returns the item at a position.
    #[inline]
    pub fn get(&self, position: usize) -> Option<&T> {
        self.items.get(position)
    }

    /// Returns the item with the given key.
    pub fn get_by_key(&self, key: &str) -> Option<&T> {
        self.find(key).map(|pos| &self.items[pos])
    }

    /// Returns the items as a slice.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    /// Returns an iterator over the items in order.
    pub fn iter(&self) -> slice::Iter<'_, T> {
        self.items.iter()
    }

    /// Appends an item. O(1) amortized.
    pub fn append(&mut self, item: T) -> Result<()> {
        if self.has(item.key()) {
            return Err(Error::duplicate_key(item.key()));
        }
        self.index.insert(item.key().to_string(), self.items.len());
        self.items.push(item);
        Ok(())
    }

    /// Inserts an item at a position, shifting everything after it. O(n)
    pub fn insert(&mut self, item: T, position: usize) -> Result<()> {
        if self.has(item.key()) {
            return Err(Error::duplicate_key(item.key()));
        }
        if position > self.items.len() {
            return Err(Error::out_of_bounds(position, self.items.len()));
        }
        self.items.insert(position, item);
        self.reindex_from(position);
        Ok(())
    }

    /// Removes and returns the item at a position. O(n)
    pub fn remove_at(&mut self, position: usize) -> Result<T> {
        if position >= self.items.len() {
            return Err(Error::out_of_bounds(position, self.items.len()));
        }
        let item = self.items.remove(position);
        self.index.remove(item.key());
        self.reindex_from(position);
        Ok(item)
    }

    /// Removes the item with the given key, if present.
    pub fn remove_key(&mut self, key: &str) -> Option<T> {
        let position = self.find(key)?;
        self.remove_at(position).ok()
    }

    /// Replaces the item that has the same key as `item`, keeping its position.
    ///
    /// Returns the previous item, or gives `item` back unchanged in `Err` if
    /// its key is not present.
    pub fn replace(&mut self, item: T) -> core::result::Result<T, T> {
        match self.find(item.key()) {
            Some(position) => Ok(core::mem::replace(&mut self.items[position], item)),
            None => Err(item),
        }
    }

    /// Removes every item.
    pub fn clear(&mut self) {
        self.items.clear();
        self.index.clear();
    }

    /// Replaces the entire contents, rebuilding the index.
    ///
    /// Fails with `DuplicateKey` if `items` repeats a key; the collection is
    /// left untouched in that case.
    pub fn reset(&mut self, items: Vec<T>) -> Result<()> {
        let mut index = HashMap::with_capacity(items.len());
        for (position, item) in items.iter().enumerate() {
            if index.insert(item.key().to_string(), position).is_some() {
                return Err(Error::duplicate_key(item.key()));
            }
        }
        self.items = items;
        self.index = index;
        Ok(())
    }

    /// Keeps only the items for which `keep` returns true, preserving order.
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&T) -> bool,
    {
        self.items.retain(|item| keep(item));
        self.index.clear();
        self.reindex_from(0);
    }

    /// Sorts the items with a comparison function and rebuilds positions.
    ///
    /// The sort is stable.
    pub fn sort_by<F>(&mut self, compare: F)
    where
        F: FnMut(&T, &T) -> core::cmp::Ordering,
    {
        self.items.sort_by(compare);
        self.reindex_from(0);
    }

    /// Keeps the first `len` items and drops the rest.
    ///
    /// Has no effect if `len` is greater than or equal to the current length.
    pub fn truncate(&mut self, len: usize) {
        if len >= self.items.len() {
            return;
        }
        for item in self.items.drain(len..) {
            self.index.remove(item.key());
        }
    }

    /// Consumes the collection, returning the items in order.
    pub fn into_vec(self) -> Vec<T> {
        self.items
    }

    /// Returns the set of keys in this collection.
    pub fn key_set(&self) -> HashSet<&str> {
        self.items.iter().map(|item| item.key()).collect()
    }

    /// Finds the first position whose item satisfies `predicate`.
    ///
    /// Binary search. The predicate must be monotonic over the collection,
    /// either false..false,true..true or true..true,false..false; the result is
    /// unspecified otherwise.
    pub fn find_first_where<F>(&self, predicate: F) -> Option<usize>
    where
        F: Fn(&T) -> bool,
    {
        let first = self.items.first()?;
        if predicate(first) {
            return Some(0);
        }
        let position = self.items.partition_point(|item| !predicate(item));
        (position < self.items.len()).then_some(position)
    }

    /// Finds the last position whose item satisfies `predicate`.
    ///
    /// Same monotonicity precondition as `find_first_where`.
    pub fn find_last_where<F>(&self, predicate: F) -> Option<usize>
    where
        F: Fn(&T) -> bool,
    {
        let last = self.items.last()?;
        if predicate(last) {
            return Some(self.items.len() - 1);
        }
        let position = self.items.partition_point(|item| predicate(item));
        position.checked_sub(1)
    }

    fn reindex_from(&mut self, position: usize) {
        for (offset, item) in self.items[position..].iter().enumerate() {
            if let Some(slot) = self.index.get_mut(item.key()) {
                *slot = position + offset;
            } else {
                self.index.insert(item.key().to_string(), position + offset);
            }
        }
    }
}

impl<T> Index<usize> for KeyedCollection<T> {
    type Output = T;

    fn index(&self, position: usize) -> &T {
        &self.items[position]
    }
}

impl<'a, T> IntoIterator for &'a KeyedCollection<T> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
