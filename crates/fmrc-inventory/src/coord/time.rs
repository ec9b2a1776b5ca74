//! Time coordinates: forecast offsets relative to a run date.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::{sort_and_coalesce, Coordinate};
use crate::dataset::GridRef;
use crate::error::{InventoryError, Result};

/// A time coordinate.
///
/// Values are forecast offsets in hours from `run_date`, so two time
/// coordinates can only be combined when they share a run date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeCoord {
    name: String,
    run_date: DateTime<Utc>,
    offsets: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<usize>,
}

impl TimeCoord {
    /// Create a time coordinate. Offsets are sorted and deduplicated.
    pub fn new(run_date: DateTime<Utc>, offsets: impl IntoIterator<Item = f64>) -> Self {
        let mut offsets: Vec<f64> = offsets.into_iter().collect();
        sort_and_coalesce(&mut offsets, |o| *o, |_, _| {});
        Self {
            name: "time".to_string(),
            run_date,
            offsets,
            id: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn run_date(&self) -> DateTime<Utc> {
        self.run_date
    }

    /// Offsets in hours from the run date, ascending.
    pub fn offsets(&self) -> &[f64] {
        &self.offsets
    }

    /// Sequence number within the owning run, assigned when the run is finalized.
    pub fn id(&self) -> Option<usize> {
        self.id
    }

    pub(crate) fn set_id(&mut self, id: usize) {
        self.id = Some(id);
    }

    pub fn position(&self, offset: f64) -> Option<usize> {
        self.offsets.iter().position(|o| *o == offset)
    }

    /// Absolute valid time of `offset` hours; `None` if out of range.
    pub fn valid_time(&self, offset: f64) -> Option<DateTime<Utc>> {
        if !offset.is_finite() {
            return None;
        }
        let seconds = (offset * 3600.0).round();
        if seconds.abs() >= i64::MAX as f64 {
            return None;
        }
        Duration::try_seconds(seconds as i64).and_then(|d| self.run_date.checked_add_signed(d))
    }

    /// Absolute valid times (run date + offset); `None` if any is out of range.
    pub fn valid_times(&self) -> Option<Vec<DateTime<Utc>>> {
        self.offsets.iter().map(|o| self.valid_time(*o)).collect()
    }

    pub fn has_nan(&self) -> bool {
        self.offsets.iter().any(|o| o.is_nan())
    }

    /// Union of several time coordinates sharing `run_date`.
    ///
    /// Each contributor is tagged with the grid it came from. The result
    /// holds every distinct offset once, ascending, and for each offset the
    /// grids that have data there, in contributor order.
    pub fn make_union<'a, I>(contributors: I, run_date: DateTime<Utc>) -> Result<TimeUnion>
    where
        I: IntoIterator<Item = (GridRef, &'a TimeCoord)>,
    {
        let mut name = None;
        let mut tagged: Vec<(f64, Vec<GridRef>)> = Vec::new();

        for (grid, tc) in contributors {
            if tc.run_date != run_date {
                return Err(InventoryError::TimeUnionMismatch {
                    grid,
                    expected: run_date,
                    found: tc.run_date,
                });
            }
            name.get_or_insert_with(|| tc.name.clone());
            tagged.extend(tc.offsets.iter().map(|o| (*o, vec![grid])));
        }

        sort_and_coalesce(
            &mut tagged,
            |(offset, _)| *offset,
            |(_, kept), (_, more)| {
                for grid in more {
                    if !kept.contains(&grid) {
                        kept.push(grid);
                    }
                }
            },
        );

        let (offsets, sources) = tagged.into_iter().unzip();
        Ok(TimeUnion {
            coord: TimeCoord {
                name: name.unwrap_or_else(|| "time".to_string()),
                run_date,
                offsets,
                id: None,
            },
            sources,
        })
    }
}

impl Coordinate for TimeCoord {
    const AXIS: &'static str = "time";

    fn name(&self) -> &str {
        &self.name
    }

    fn len(&self) -> usize {
        self.offsets.len()
    }

    fn equals_data(&self, other: &Self) -> bool {
        self.run_date == other.run_date
            && self.offsets.len() == other.offsets.len()
            && self
                .offsets
                .iter()
                .zip(&other.offsets)
                .all(|(a, b)| a.total_cmp(b).is_eq())
    }
}

/// Result of [`TimeCoord::make_union`].
#[derive(Debug, Clone, PartialEq)]
pub struct TimeUnion {
    pub coord: TimeCoord,
    /// `sources[i]` lists the grids with data at `coord.offsets()[i]`.
    pub sources: Vec<Vec<GridRef>>,
}

impl TimeUnion {
    /// Grids with data at `offset`; empty if the offset is not in the union.
    pub fn grids_at(&self, offset: f64) -> &[GridRef] {
        self.coord
            .position(offset)
            .map(|i| self.sources[i].as_slice())
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn run() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap()
    }

    fn gref(dataset: usize) -> GridRef {
        GridRef::new(dataset, 0)
    }

    #[test]
    fn test_new_sorts_offsets() {
        let tc = TimeCoord::new(run(), [12.0, 0.0, 6.0, 6.0]);
        assert_eq!(tc.offsets(), &[0.0, 6.0, 12.0]);
        assert_eq!(tc.name(), "time");
        assert_eq!(tc.id(), None);
    }

    #[test]
    fn test_equals_data_includes_run_date() {
        let a = TimeCoord::new(run(), [0.0, 6.0]);
        let b = TimeCoord::new(run(), [0.0, 6.0]).with_name("time1");
        let c = TimeCoord::new(run() + Duration::hours(6), [0.0, 6.0]);
        assert!(a.equals_data(&b));
        assert!(!a.equals_data(&c));
    }

    #[test]
    fn test_make_union_with_provenance() {
        let a = TimeCoord::new(run(), [0.0, 6.0, 12.0]);
        let b = TimeCoord::new(run(), [0.0, 6.0, 12.0, 18.0]);

        let union = TimeCoord::make_union([(gref(0), &a), (gref(1), &b)], run()).unwrap();

        assert_eq!(union.coord.offsets(), &[0.0, 6.0, 12.0, 18.0]);
        assert_eq!(union.grids_at(18.0), &[gref(1)]);
        assert_eq!(union.grids_at(6.0), &[gref(0), gref(1)]);
        assert!(union.grids_at(24.0).is_empty());
    }

    #[test]
    fn test_make_union_rejects_other_run() {
        let a = TimeCoord::new(run(), [0.0]);
        let b = TimeCoord::new(run() + Duration::hours(6), [0.0]);
        let err = TimeCoord::make_union([(gref(0), &a), (gref(1), &b)], run()).unwrap_err();
        assert_eq!(
            err,
            InventoryError::TimeUnionMismatch {
                grid: gref(1),
                expected: run(),
                found: run() + Duration::hours(6),
            }
        );
    }

    #[test]
    fn test_make_union_empty() {
        let union = TimeCoord::make_union(std::iter::empty(), run()).unwrap();
        assert!(union.coord.is_empty());
        assert!(union.sources.is_empty());
    }

    #[test]
    fn test_valid_times() {
        let tc = TimeCoord::new(run(), [0.0, 1.5]);
        assert_eq!(
            tc.valid_times(),
            Some(vec![run(), Utc.with_ymd_and_hms(2024, 1, 15, 13, 30, 0).unwrap()])
        );
    }

    #[test]
    fn test_valid_times_out_of_range() {
        let tc = TimeCoord::new(run(), [0.0, 1.0e15]);
        assert_eq!(tc.valid_time(0.0), Some(run()));
        assert_eq!(tc.valid_time(1.0e15), None);
        assert_eq!(tc.valid_time(f64::INFINITY), None);
        assert_eq!(tc.valid_times(), None);
    }

    #[test]
    fn test_nan_offsets_compare_equal() {
        let a = TimeCoord::new(run(), [0.0, f64::NAN, f64::NAN]);
        let b = TimeCoord::new(run(), [f64::NAN, 0.0]);
        assert_eq!(a.len(), 2);
        assert!(a.has_nan());
        assert!(a.equals_data(&b));
    }
}
