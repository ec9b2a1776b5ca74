//! Per-file dataset inventories, as produced by the format parsers.
//!
//! A [`GridDatasetInv`] describes one source file of a run: which variables
//! it holds and, for each, the time/vertical/ensemble coordinates found in
//! that file. Parsing files into these records happens elsewhere; this
//! crate only consumes them.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::coord::{EnsCoord, TimeCoord, VertCoord};

/// Opaque identity of a source file (path, URL or archive member).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileId(String);

impl FileId {
    pub fn new(location: impl Into<String>) -> Self {
        Self(location.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FileId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for FileId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Address of a grid within a run: which dataset inventory, which grid in it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridRef {
    pub dataset: usize,
    pub grid: usize,
}

impl GridRef {
    pub fn new(dataset: usize, grid: usize) -> Self {
        Self { dataset, grid }
    }
}

impl fmt::Display for GridRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.dataset, self.grid)
    }
}

/// One variable as stored in one source file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<TimeCoord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vert: Option<VertCoord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ens: Option<EnsCoord>,
    /// Number of stored records (2D fields) for this variable in the file.
    #[serde(default)]
    pub count: usize,
}

impl Grid {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            time: None,
            vert: None,
            ens: None,
            count: 0,
        }
    }

    pub fn with_time(mut self, time: TimeCoord) -> Self {
        self.time = Some(time);
        self
    }

    pub fn with_vert(mut self, vert: VertCoord) -> Self {
        self.vert = Some(vert);
        self
    }

    pub fn with_ens(mut self, ens: EnsCoord) -> Self {
        self.ens = Some(ens);
        self
    }

    pub fn with_count(mut self, count: usize) -> Self {
        self.count = count;
        self
    }
}

/// Inventory of one source file belonging to one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridDatasetInv {
    pub location: FileId,
    pub run_date: DateTime<Utc>,
    #[serde(default)]
    pub grids: Vec<Grid>,
}

impl GridDatasetInv {
    pub fn new(location: impl Into<FileId>, run_date: DateTime<Utc>) -> Self {
        Self {
            location: location.into(),
            run_date,
            grids: Vec::new(),
        }
    }

    pub fn with_grid(mut self, grid: Grid) -> Self {
        self.grids.push(grid);
        self
    }

    pub fn grid(&self, index: usize) -> Option<&Grid> {
        self.grids.get(index)
    }

    /// Distinct time coordinates used by this file's grids, in grid order.
    pub fn time_coords(&self) -> Vec<&TimeCoord> {
        let mut coords: Vec<&TimeCoord> = Vec::new();
        for tc in self.grids.iter().filter_map(|g| g.time.as_ref()) {
            if !coords.iter().any(|c| c == &tc) {
                coords.push(tc);
            }
        }
        coords
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_builder() {
        let run = Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap();
        let tc = TimeCoord::new(run, [0.0, 6.0]);
        let inv = GridDatasetInv::new("gfs_f000.grib2", run)
            .with_grid(Grid::new("TMP").with_time(tc.clone()).with_count(2))
            .with_grid(Grid::new("PRMSL").with_time(tc));

        assert_eq!(inv.location.as_str(), "gfs_f000.grib2");
        assert_eq!(inv.grid(0).map(|g| g.count), Some(2));
        assert!(inv.grid(2).is_none());
        assert_eq!(inv.time_coords().len(), 1);
    }

    #[test]
    fn test_deserialize_minimal_grid() {
        let grid: Grid = serde_json::from_str(r#"{"name": "APCP"}"#).unwrap();
        assert_eq!(grid.name, "APCP");
        assert!(grid.time.is_none());
        assert_eq!(grid.count, 0);
    }

    #[test]
    fn test_grid_ref_display() {
        assert_eq!(GridRef::new(3, 1).to_string(), "3/1");
        assert_eq!(FileId::from("a.nc").to_string(), "a.nc");
    }
}
