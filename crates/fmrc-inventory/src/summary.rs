//! Serializable summaries of finalized runs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::coord::Coordinate;
use crate::run::RunInventory;

/// Overview of one run, suitable for JSON output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub run_date: DateTime<Utc>,
    pub files: Vec<String>,
    pub time_coords: Vec<TimeCoordSummary>,
    pub vert_coords: Vec<CoordSummary>,
    pub ens_coords: Vec<CoordSummary>,
    pub variables: Vec<VariableSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeCoordSummary {
    pub id: Option<usize>,
    pub name: String,
    pub offsets: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoordSummary {
    pub name: String,
    pub size: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableSummary {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vert: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ens: Option<String>,
    pub grids: usize,
    pub files: usize,
    pub count: usize,
    pub expected: usize,
}

impl RunSummary {
    pub fn from_run(run: &RunInventory) -> Self {
        let time_coords = run
            .time_coords()
            .as_slice()
            .iter()
            .map(|tc| TimeCoordSummary {
                id: tc.id(),
                name: tc.name().to_string(),
                offsets: tc.offsets().to_vec(),
            })
            .collect();

        let variables = run
            .variables()
            .map(|v| VariableSummary {
                name: v.name().to_string(),
                time: v.time_coord().and_then(|tc| tc.id()),
                vert: v.vert_coord().map(|vc| vc.name().to_string()),
                ens: v.ens_coord().map(|ec| ec.name().to_string()),
                grids: v.variable().grid_refs().len(),
                files: v.files().len(),
                count: v.count_total(),
                expected: v.expected_count(),
            })
            .collect();

        Self {
            run_date: run.run_date(),
            files: run.files().into_iter().map(|f| f.to_string()).collect(),
            time_coords,
            vert_coords: summarize(run.vert_coords().as_slice()),
            ens_coords: summarize(run.ens_coords().as_slice()),
            variables,
        }
    }
}

fn summarize<C: Coordinate>(coords: &[C]) -> Vec<CoordSummary> {
    coords
        .iter()
        .map(|c| CoordSummary {
            name: c.name().to_string(),
            size: c.len(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::{TimeCoord, VertCoord};
    use crate::dataset::{Grid, GridDatasetInv};
    use crate::run::RunInventoryBuilder;
    use chrono::TimeZone;

    #[test]
    fn test_summary_of_run() {
        let run = Utc.with_ymd_and_hms(2024, 1, 15, 6, 0, 0).unwrap();
        let mut builder = RunInventoryBuilder::new(run);
        builder
            .add(
                GridDatasetInv::new("hrrr_f01.grib2", run)
                    .with_grid(
                        Grid::new("TMP")
                            .with_time(TimeCoord::new(run, [1.0]))
                            .with_vert(VertCoord::from_values("height_above_ground", [2.0]))
                            .with_count(1),
                    )
                    .with_grid(Grid::new("REFC").with_time(TimeCoord::new(run, [1.0]))),
            )
            .unwrap();
        let summary = builder.finalize().unwrap().summary();

        assert_eq!(summary.files, vec!["hrrr_f01.grib2".to_string()]);
        assert_eq!(summary.time_coords.len(), 1);
        assert_eq!(summary.time_coords[0].id, Some(0));
        assert_eq!(summary.vert_coords[0].size, 1);
        assert!(summary.ens_coords.is_empty());

        let names: Vec<&str> = summary.variables.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, vec!["REFC", "TMP"]);
        assert_eq!(summary.variables[0].vert, None);
        assert_eq!(summary.variables[1].count, 1);

        let json = serde_json::to_value(&summary).unwrap();
        assert!(json["variables"][0].get("vert").is_none());
    }
}
