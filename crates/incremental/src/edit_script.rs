//! Edit scripts between two sorted snapshots.
//!
//! The diff is a key-set difference rather than a minimal edit distance. A key
//! present in both snapshots is never reported, even if its relative position
//! changed; its new position is simply wherever the new snapshot puts it.
//! Consumers apply deletes against the old positions first, then adds against
//! the new positions.
//!
//! `diff_reordered` is the variant for snapshots whose kept items may have
//! changed places; it reports the minimum number of kept keys as moves.

use alloc::vec;
use alloc::vec::Vec;
use hashbrown::{HashMap, HashSet};
use rivulet_core::Keyed;

/// The positions that transform one snapshot into another.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EditScript {
    /// Ascending positions in the old snapshot whose keys are gone
    pub deletes: Vec<usize>,
    /// Ascending positions in the new snapshot whose keys are new
    pub adds: Vec<usize>,
}

impl EditScript {
    /// Creates an empty edit script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the script neither deletes nor adds anything.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.deletes.is_empty() && self.adds.is_empty()
    }

    /// Returns the total number of deletes and adds.
    #[inline]
    pub fn len(&self) -> usize {
        self.deletes.len() + self.adds.len()
    }
}

/// Computes the deletes (indexed in `from`) and adds (indexed in `to`) needed
/// to turn `from` into `to`.
///
/// Both inputs are expected to be sorted with the same comparator and to hold
/// unique keys; the result is still well defined if they are not sorted, but
/// then it no longer describes a useful UI update.
pub fn diff<T: Keyed>(from: &[T], to: &[T]) -> EditScript {
    let from_keys: HashSet<&str> = from.iter().map(|item| item.key()).collect();
    let to_keys: HashSet<&str> = to.iter().map(|item| item.key()).collect();

    let deletes = from
        .iter()
        .enumerate()
        .filter(|(_, item)| !to_keys.contains(item.key()))
        .map(|(position, _)| position)
        .collect();
    let adds = to
        .iter()
        .enumerate()
        .filter(|(_, item)| !from_keys.contains(item.key()))
        .map(|(position, _)| position)
        .collect();

    EditScript { deletes, adds }
}

/// Like `diff`, but also reports kept keys whose relative order changed.
///
/// Every kept key outside one longest run that keeps its relative order in
/// both snapshots is reported as a delete at its old position and an add at
/// its new one. Replaying the script over `from` yields exactly `to`.
pub fn diff_reordered<T: Keyed>(from: &[T], to: &[T]) -> EditScript {
    let mut script = diff(from, to);
    let to_positions: HashMap<&str, usize> = to
        .iter()
        .enumerate()
        .map(|(position, item)| (item.key(), position))
        .collect();
    // (old, new) position of every kept key, in old order
    let kept: Vec<(usize, usize)> = from
        .iter()
        .enumerate()
        .filter_map(|(old, item)| to_positions.get(item.key()).map(|&new| (old, new)))
        .collect();

    let stable = longest_increasing(&kept);
    let mut moved = false;
    for (&(old, new), keep) in kept.iter().zip(stable) {
        if !keep {
            script.deletes.push(old);
            script.adds.push(new);
            moved = true;
        }
    }
    if moved {
        script.deletes.sort_unstable();
        script.adds.sort_unstable();
    }
    script
}

/// Marks one longest subsequence of `pairs` whose second components increase.
fn longest_increasing(pairs: &[(usize, usize)]) -> Vec<bool> {
    // tails[k] indexes the smallest tail of an increasing run of length k + 1
    let mut tails: Vec<usize> = Vec::new();
    let mut parent: Vec<Option<usize>> = vec![None; pairs.len()];
    for (i, &(_, value)) in pairs.iter().enumerate() {
        let length = tails.partition_point(|&t| pairs[t].1 < value);
        parent[i] = length.checked_sub(1).map(|k| tails[k]);
        if length == tails.len() {
            tails.push(i);
        } else {
            tails[length] = i;
        }
    }

    let mut marks = vec![false; pairs.len()];
    let mut next = tails.last().copied();
    while let Some(i) = next {
        marks[i] = true;
        next = parent[i];
    }
    marks
}
