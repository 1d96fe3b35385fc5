use crate::data::quake::Quake;
use crate::prelude::HashSet;
use std::hash::Hash;

/// Markers to take off and put on the map to get from one batch to the next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetDelta<T = Quake> {
    /// In `next` but not in `previous`, in `next` order
    pub added: Vec<T>,
    /// In `previous` but not in `next`, in `previous` order
    pub removed: Vec<T>,
}

impl<T> SetDelta<T> {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

impl<T> Default for SetDelta<T> {
    fn default() -> Self {
        Self {
            added: Vec::new(),
            removed: Vec::new(),
        }
    }
}

/// Computes `next − previous` and `previous − next` by identity.
///
/// Entries present on both sides produce nothing, even when their other
/// fields differ. Both inputs are treated as sets: a duplicate identity is
/// reported at most once.
pub fn diff<T>(previous: &[T], next: &[T]) -> SetDelta<T>
where
    T: Eq + Hash + Clone,
{
    let previous_set: HashSet<&T> = previous.iter().collect();
    let next_set: HashSet<&T> = next.iter().collect();

    SetDelta {
        added: difference(next, &previous_set),
        removed: difference(previous, &next_set),
    }
}

fn difference<T>(from: &[T], exclude: &HashSet<&T>) -> Vec<T>
where
    T: Eq + Hash + Clone,
{
    let mut seen: HashSet<&T> = HashSet::default();
    from.iter()
        .filter(|item| !exclude.contains(item) && seen.insert(*item))
        .cloned()
        .collect()
}
