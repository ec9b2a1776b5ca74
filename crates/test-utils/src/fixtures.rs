//! Common test fixtures for run inventory tests.
//!
//! This module provides pre-defined run dates and coordinates that represent
//! common scenarios in forecast model run aggregation.

use chrono::{DateTime, Duration, TimeZone, Utc};
use fmrc_inventory::{EnsCoord, Grid, GridDatasetInv, TimeCoord, VertCoord, VertLevel};

/// A fixed run date for tests (2024-01-15T12:00:00Z).
pub fn run_date() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap()
}

/// The run `hours` after [`run_date`].
pub fn run_date_plus(hours: i64) -> DateTime<Utc> {
    run_date() + Duration::hours(hours)
}

/// Common forecast hour sets.
pub mod hours {
    /// GFS-like 6-hourly steps out to a day
    pub const SIX_HOURLY: [f64; 5] = [0.0, 6.0, 12.0, 18.0, 24.0];

    /// HRRR-like hourly steps
    pub const HOURLY: [f64; 7] = [0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
}

/// Common vertical level sets.
pub mod levels {
    /// Mandatory isobaric levels (hPa)
    pub const MANDATORY_ISOBARIC: [f64; 6] = [1000.0, 850.0, 700.0, 500.0, 300.0, 250.0];

    /// Heights above ground (m)
    pub const HEIGHT_ABOVE_GROUND: [f64; 2] = [2.0, 10.0];
}

/// Time coordinate of the fixed run.
pub fn time(offsets: &[f64]) -> TimeCoord {
    TimeCoord::new(run_date(), offsets.iter().copied())
}

/// Vertical coordinate without bounds.
pub fn vert(name: &str, values: &[f64]) -> VertCoord {
    VertCoord::from_values(name, values.iter().copied())
}

/// Vertical coordinate of layers given as `(value, lower, upper)`.
pub fn layers(name: &str, layers: &[(f64, f64, f64)]) -> VertCoord {
    VertCoord::new(
        name,
        layers
            .iter()
            .map(|(value, lo, hi)| VertLevel::layer(*value, *lo, *hi))
            .collect(),
    )
}

pub fn ens(members: &[i32]) -> EnsCoord {
    EnsCoord::new("ens", members.iter().copied())
}

/// A grid of the fixed run with a time axis.
pub fn timed_grid(name: &str, offsets: &[f64]) -> Grid {
    Grid::new(name)
        .with_time(time(offsets))
        .with_count(offsets.len())
}

/// A dataset inventory of the fixed run.
pub fn dataset(location: &str, grids: Vec<Grid>) -> GridDatasetInv {
    grids
        .into_iter()
        .fold(GridDatasetInv::new(location, run_date()), GridDatasetInv::with_grid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fmrc_inventory::Coordinate;

    #[test]
    fn test_fixed_run_date() {
        assert_eq!(run_date().to_rfc3339(), "2024-01-15T12:00:00+00:00");
        assert_eq!(run_date_plus(-12).to_rfc3339(), "2024-01-15T00:00:00+00:00");
    }

    #[test]
    fn test_timed_grid_count() {
        let grid = timed_grid("TMP", &hours::SIX_HOURLY);
        assert_eq!(grid.count, 5);
        assert_eq!(grid.time.unwrap().len(), 5);
    }

    #[test]
    fn test_dataset_keeps_grid_order() {
        let inv = dataset("a.grib2", vec![Grid::new("B"), Grid::new("A")]);
        let names: Vec<&str> = inv.grids.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["B", "A"]);
    }

    #[test]
    fn test_layers() {
        let coord = layers("depth", &[(5.0, 10.0, 0.0)]);
        assert_eq!(coord.levels()[0].bounds, Some((0.0, 10.0)));
    }
}
