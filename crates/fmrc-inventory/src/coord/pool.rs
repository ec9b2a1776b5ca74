//! Per-run deduplicated coordinate storage.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

use tracing::trace;

use super::Coordinate;

/// Handle to a coordinate stored in a [`CoordPool`].
///
/// Two variables of the same run share a coordinate exactly when they hold
/// the same handle. Handles are only meaningful for the pool that issued
/// them.
pub struct CoordId<C> {
    index: usize,
    _kind: PhantomData<fn() -> C>,
}

impl<C> CoordId<C> {
    fn new(index: usize) -> Self {
        Self {
            index,
            _kind: PhantomData,
        }
    }

    /// Position in pool insertion order.
    pub fn index(self) -> usize {
        self.index
    }
}

// Manual impls: derives would require `C` itself to be Copy/Eq/...
impl<C> Clone for CoordId<C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C> Copy for CoordId<C> {}

impl<C> PartialEq for CoordId<C> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
    }
}

impl<C> Eq for CoordId<C> {}

impl<C> PartialOrd for CoordId<C> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<C> Ord for CoordId<C> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.index.cmp(&other.index)
    }
}

impl<C> Hash for CoordId<C> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.index.hash(state);
    }
}

impl<C: Coordinate> fmt::Debug for CoordId<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CoordId<{}>({})", C::AXIS, self.index)
    }
}

/// Deduplicated list of coordinates of one kind, owned by one run.
#[derive(Debug, Clone)]
pub struct CoordPool<C> {
    entries: Vec<C>,
}

impl<C> Default for CoordPool<C> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<C: Coordinate> CoordPool<C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the entry data-equal to `candidate`, adding it if there is none.
    ///
    /// Linear search; a run holds tens of coordinates per axis at most. When
    /// an equal entry exists the candidate is dropped.
    pub fn find_or_add(&mut self, candidate: C) -> CoordId<C> {
        if let Some(index) = self
            .entries
            .iter()
            .position(|entry| entry.equals_data(&candidate))
        {
            trace!(axis = C::AXIS, index, "Reusing pooled coordinate");
            return CoordId::new(index);
        }

        self.entries.push(candidate);
        let index = self.entries.len() - 1;
        trace!(axis = C::AXIS, index, "Pooled new coordinate");
        CoordId::new(index)
    }

    pub fn get(&self, id: CoordId<C>) -> Option<&C> {
        self.entries.get(id.index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries with their handles, in insertion order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (CoordId<C>, &C)> + '_ {
        self.entries
            .iter()
            .enumerate()
            .map(|(index, entry)| (CoordId::new(index), entry))
    }

    pub fn as_slice(&self) -> &[C] {
        &self.entries
    }

    pub(crate) fn entries_mut(&mut self) -> &mut [C] {
        &mut self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::{EnsCoord, VertCoord};

    #[test]
    fn test_find_or_add_dedups() {
        let mut pool = CoordPool::new();
        let a = pool.find_or_add(VertCoord::from_values("level", [0.0, 10.0]));
        let b = pool.find_or_add(VertCoord::from_values("other", [0.0, 10.0]));
        let c = pool.find_or_add(VertCoord::from_values("level", [0.0, 5.0, 10.0]));

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(pool.len(), 2);
        // the candidate is discarded, the pooled entry keeps its name
        assert_eq!(pool.get(b).unwrap().name(), "level");
    }

    #[test]
    fn test_iter_in_insertion_order() {
        let mut pool = CoordPool::new();
        pool.find_or_add(EnsCoord::new("ens", [0, 1]));
        pool.find_or_add(EnsCoord::new("ens", [0, 1, 2]));

        let indices: Vec<usize> = pool.iter().map(|(id, _)| id.index()).collect();
        assert_eq!(indices, vec![0, 1]);
        assert_eq!(pool.as_slice()[1].len(), 3);
    }

    #[test]
    fn test_debug_names_axis() {
        let mut pool = CoordPool::new();
        let id = pool.find_or_add(EnsCoord::new("ens", [0]));
        assert_eq!(format!("{:?}", id), "CoordId<ensemble>(0)");
    }

    #[test]
    fn test_empty_pool() {
        let pool: CoordPool<VertCoord> = CoordPool::new();
        assert!(pool.is_empty());
        assert!(pool.get(CoordId::new(0)).is_none());
    }
}
