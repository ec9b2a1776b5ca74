//! Coordinate sets for the time, vertical and ensemble axes.
//!
//! The three kinds share one capability: structural comparison of their
//! values ([`Coordinate::equals_data`]), which is what [`CoordPool`] uses to
//! deduplicate them within a run. Vertical and ensemble coordinates merge
//! pairwise into a base ([`UnionCoordinate::union_into`]); time coordinates
//! instead use a flat union that records which grid supplied each
//! offset ([`TimeCoord::make_union`]).

pub mod ens;
pub mod pool;
pub mod time;
pub mod vert;

pub use ens::EnsCoord;
pub use pool::{CoordId, CoordPool};
pub use time::{TimeCoord, TimeUnion};
pub use vert::{VertCoord, VertLevel};

/// Capability shared by every coordinate kind.
pub trait Coordinate: Clone {
    /// Axis label, used in logs and debug output.
    const AXIS: &'static str;

    /// Display name.
    fn name(&self) -> &str;

    /// Number of coordinate values.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Structural comparison of the ordered values. Name and id are ignored.
    fn equals_data(&self, other: &Self) -> bool;
}

/// Coordinates that can absorb the values of other coordinates of the same kind.
pub trait UnionCoordinate: Coordinate {
    /// Add every value of `extras` that `self` lacks.
    ///
    /// The result is sorted ascending and holds each value once. An empty
    /// `extras` leaves `self` untouched, including its order.
    fn union_into(&mut self, extras: &[&Self]);
}

/// Union of several coordinates using the first one as base.
///
/// The first coordinate is cloned; every later one that is not data-equal
/// to it is merged in. Returns `None` when the iterator is empty, which is
/// distinct from a coordinate with zero values.
pub fn union_with_base<'a, C, I>(coords: I) -> Option<C>
where
    C: UnionCoordinate + 'a,
    I: IntoIterator<Item = &'a C>,
{
    let mut coords = coords.into_iter();
    let mut base = coords.next()?.clone();

    let extras: Vec<&C> = coords.filter(|c| !base.equals_data(c)).collect();
    if !extras.is_empty() {
        base.union_into(&extras);
    }

    Some(base)
}

/// Sort `values` ascending and merge runs of equal keys with `merge`.
pub(crate) fn sort_and_coalesce<T, K, F, M>(values: &mut Vec<T>, key: F, mut merge: M)
where
    F: Fn(&T) -> K,
    M: FnMut(&mut T, T),
    K: Into<f64> + Copy,
{
    values.sort_by(|a, b| key(a).into().total_cmp(&key(b).into()));

    // same total order as the sort, so equal NaNs coalesce too
    let mut merged: Vec<T> = Vec::with_capacity(values.len());
    for value in values.drain(..) {
        match merged.last_mut() {
            Some(last) if key(&*last).into().total_cmp(&key(&value).into()).is_eq() => {
                merge(last, value)
            }
            _ => merged.push(value),
        }
    }
    *values = merged;
}
