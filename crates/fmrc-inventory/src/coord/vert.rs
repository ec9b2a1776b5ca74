//! Vertical coordinates (levels, optionally with layer bounds).

use serde::{Deserialize, Serialize};

use super::{sort_and_coalesce, Coordinate, UnionCoordinate};

/// One vertical level.
///
/// Layers carry `[min, max]` bounds in addition to their nominal value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VertLevel {
    pub value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounds: Option<(f64, f64)>,
}

impl VertLevel {
    pub fn new(value: f64) -> Self {
        Self {
            value,
            bounds: None,
        }
    }

    /// A layer at `value` spanning `a..b` (in either order).
    pub fn layer(value: f64, a: f64, b: f64) -> Self {
        Self {
            value,
            bounds: Some((a.min(b), a.max(b))),
        }
    }

    fn is_nan(&self) -> bool {
        self.value.is_nan() || self.bounds.map_or(false, |(lo, hi)| lo.is_nan() || hi.is_nan())
    }

    /// Equality under the `total_cmp` order, so NaN matches NaN.
    fn same_as(&self, other: &VertLevel) -> bool {
        let bounds_eq = match (self.bounds, other.bounds) {
            (Some((lo1, hi1)), Some((lo2, hi2))) => {
                lo1.total_cmp(&lo2).is_eq() && hi1.total_cmp(&hi2).is_eq()
            }
            (None, None) => true,
            _ => false,
        };
        self.value.total_cmp(&other.value).is_eq() && bounds_eq
    }

    /// Widen this level's bounds to cover `other`'s.
    fn absorb(&mut self, other: VertLevel) {
        self.bounds = match (self.bounds, other.bounds) {
            (Some((lo1, hi1)), Some((lo2, hi2))) => Some((lo1.min(lo2), hi1.max(hi2))),
            (Some(b), None) | (None, Some(b)) => Some(b),
            (None, None) => None,
        };
    }
}

/// A vertical coordinate: an ordered list of levels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VertCoord {
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    units: Option<String>,
    levels: Vec<VertLevel>,
}

impl VertCoord {
    pub fn new(name: impl Into<String>, levels: Vec<VertLevel>) -> Self {
        Self {
            name: name.into(),
            units: None,
            levels,
        }
    }

    /// Levels without bounds.
    pub fn from_values(name: impl Into<String>, values: impl IntoIterator<Item = f64>) -> Self {
        Self::new(name, values.into_iter().map(VertLevel::new).collect())
    }

    pub fn with_units(mut self, units: impl Into<String>) -> Self {
        self.units = Some(units.into());
        self
    }

    pub fn units(&self) -> Option<&str> {
        self.units.as_deref()
    }

    pub fn levels(&self) -> &[VertLevel] {
        &self.levels
    }

    /// Nominal level values.
    pub fn values(&self) -> Vec<f64> {
        self.levels.iter().map(|l| l.value).collect()
    }

    /// True if any level carries bounds.
    pub fn is_layer(&self) -> bool {
        self.levels.iter().any(|l| l.bounds.is_some())
    }

    pub fn has_nan(&self) -> bool {
        self.levels.iter().any(VertLevel::is_nan)
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }
}

impl Coordinate for VertCoord {
    const AXIS: &'static str = "vertical";

    fn name(&self) -> &str {
        &self.name
    }

    fn len(&self) -> usize {
        self.levels.len()
    }

    fn equals_data(&self, other: &Self) -> bool {
        self.levels.len() == other.levels.len()
            && self
                .levels
                .iter()
                .zip(&other.levels)
                .all(|(a, b)| a.same_as(b))
    }
}

impl UnionCoordinate for VertCoord {
    fn union_into(&mut self, extras: &[&Self]) {
        if extras.is_empty() {
            return;
        }

        self.levels
            .extend(extras.iter().flat_map(|c| c.levels.iter().copied()));
        sort_and_coalesce(&mut self.levels, |l| l.value, VertLevel::absorb);
    }
}
