//! Generators for synthetic forecast runs.
//!
//! These generators create predictable, verifiable inventories that mimic
//! how operational models split a run across files.

use chrono::{DateTime, Utc};
use fmrc_inventory::{Grid, GridDatasetInv, TimeCoord, VertCoord};

/// Creates one dataset inventory per forecast hour.
///
/// Every file holds each of `variables` at a single time step on the given
/// isobaric `levels`, the way GFS and HRRR publish one file per forecast
/// hour. File names follow `{model}_f{hour:03}.grib2`.
///
/// # Example
///
/// ```
/// use test_utils::{per_hour_files, run_date};
///
/// let files = per_hour_files("gfs", run_date(), &["TMP", "RH"], &[0.0, 6.0], &[500.0]);
/// assert_eq!(files.len(), 2);
/// assert_eq!(files[1].location.as_str(), "gfs_f006.grib2");
/// assert_eq!(files[1].grids.len(), 2);
/// ```
pub fn per_hour_files(
    model: &str,
    run_date: DateTime<Utc>,
    variables: &[&str],
    hours: &[f64],
    levels: &[f64],
) -> Vec<GridDatasetInv> {
    hours
        .iter()
        .map(|hour| {
            let location = format!("{}_f{:03}.grib2", model, *hour as u32);
            variables.iter().fold(
                GridDatasetInv::new(location, run_date),
                |inv, name| {
                    inv.with_grid(
                        Grid::new(*name)
                            .with_time(TimeCoord::new(run_date, [*hour]))
                            .with_vert(VertCoord::from_values("isobaric", levels.iter().copied()))
                            .with_count(levels.len()),
                    )
                },
            )
        })
        .collect()
}

/// Creates one dataset inventory per variable, each holding all hours.
///
/// This mimics post-processed archives that write one file per parameter.
pub fn per_variable_files(
    run_date: DateTime<Utc>,
    variables: &[&str],
    hours: &[f64],
) -> Vec<GridDatasetInv> {
    variables
        .iter()
        .map(|name| {
            GridDatasetInv::new(format!("{}.nc", name.to_lowercase()), run_date).with_grid(
                Grid::new(*name)
                    .with_time(TimeCoord::new(run_date, hours.iter().copied()))
                    .with_count(hours.len()),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::run_date;

    #[test]
    fn test_per_hour_files() {
        let files = per_hour_files("hrrr", run_date(), &["TMP"], &[0.0, 1.0, 2.0], &[850.0, 500.0]);
        assert_eq!(files.len(), 3);
        assert_eq!(files[2].location.as_str(), "hrrr_f002.grib2");
        assert_eq!(files[0].grids[0].count, 2);
    }

    #[test]
    fn test_per_variable_files() {
        let files = per_variable_files(run_date(), &["TMP", "APCP"], &[0.0, 6.0]);
        assert_eq!(files[1].location.as_str(), "apcp.nc");
        assert_eq!(files[1].grids[0].time.as_ref().unwrap().offsets(), &[0.0, 6.0]);
    }
}
