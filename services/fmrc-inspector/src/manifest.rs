//! Inventory description files.
//!
//! Each YAML or JSON file describes one dataset, or a list of datasets, in a
//! compact form: time offsets are given per grid and inherit the run date of
//! their dataset.
//!
//! ```yaml
//! location: gfs_f006.grib2
//! run_date: 2024-01-15T00:00:00Z
//! grids:
//!   - name: TMP
//!     time: { offsets: [6] }
//!     vert: { name: isobaric, levels: [{ value: 500 }, { value: 850 }] }
//! ```

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

use fmrc_inventory::{Coordinate, EnsCoord, Grid, GridDatasetInv, TimeCoord, VertCoord};

const EXTENSIONS: &[&str] = &["yaml", "yml", "json"];

#[derive(Debug, Clone, Deserialize)]
pub struct DatasetDescription {
    pub location: String,
    pub run_date: DateTime<Utc>,
    #[serde(default)]
    pub grids: Vec<GridDescription>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GridDescription {
    pub name: String,
    /// Stored record count; when omitted the grid is assumed complete.
    #[serde(default)]
    pub count: Option<usize>,
    #[serde(default)]
    pub time: Option<TimeDescription>,
    #[serde(default)]
    pub vert: Option<VertCoord>,
    #[serde(default)]
    pub ens: Option<EnsCoord>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TimeDescription {
    #[serde(default)]
    pub name: Option<String>,
    pub offsets: Vec<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DescriptionFile {
    Many(Vec<DatasetDescription>),
    One(DatasetDescription),
}

impl DatasetDescription {
    pub fn into_inventory(self) -> GridDatasetInv {
        let run_date = self.run_date;
        self.grids
            .into_iter()
            .fold(GridDatasetInv::new(self.location, run_date), |inv, grid| {
                inv.with_grid(grid.into_grid(run_date))
            })
    }
}

impl GridDescription {
    fn into_grid(self, run_date: DateTime<Utc>) -> Grid {
        let time = self.time.map(|t| {
            let tc = TimeCoord::new(run_date, t.offsets);
            match t.name {
                Some(name) => tc.with_name(name),
                None => tc,
            }
        });

        let count = self.count.unwrap_or_else(|| {
            axis_len(time.as_ref()) * axis_len(self.vert.as_ref()) * axis_len(self.ens.as_ref())
        });

        let mut grid = Grid::new(self.name).with_count(count);
        grid.time = time;
        grid.vert = self.vert;
        grid.ens = self.ens;
        grid
    }
}

/// Absent axes count as one entry, empty ones as zero, as in the run's
/// expected count.
fn axis_len<C: Coordinate>(coord: Option<&C>) -> usize {
    coord.map_or(1, Coordinate::len)
}

/// Expand inputs into description files; directories are walked recursively.
pub fn collect_paths(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for input in inputs {
        if input.is_dir() {
            let mut found = Vec::new();
            for entry in WalkDir::new(input).follow_links(true) {
                let entry = entry
                    .with_context(|| format!("Failed to walk directory: {}", input.display()))?;
                if entry.file_type().is_file() && has_description_extension(entry.path()) {
                    found.push(entry.into_path());
                }
            }
            found.sort();
            debug!(dir = %input.display(), files = found.len(), "Scanned directory");
            paths.extend(found);
        } else if input.exists() {
            paths.push(input.clone());
        } else {
            anyhow::bail!("Input not found: {}", input.display());
        }
    }
    Ok(paths)
}

fn has_description_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Parse one description file into dataset inventories.
pub fn load_file(path: &Path) -> Result<Vec<GridDatasetInv>> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read description file: {}", path.display()))?;

    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let parsed: DescriptionFile = if is_json {
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse JSON description: {}", path.display()))?
    } else {
        serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse YAML description: {}", path.display()))?
    };

    let descriptions = match parsed {
        DescriptionFile::Many(many) => many,
        DescriptionFile::One(one) => vec![one],
    };

    Ok(descriptions
        .into_iter()
        .map(DatasetDescription::into_inventory)
        .collect())
}

/// Load every dataset inventory reachable from `inputs`.
pub fn load_inventories(inputs: &[PathBuf]) -> Result<Vec<GridDatasetInv>> {
    let paths = collect_paths(inputs)?;
    let mut inventories = Vec::new();
    for path in &paths {
        inventories.extend(load_file(path)?);
    }
    info!(
        files = paths.len(),
        datasets = inventories.len(),
        "Loaded dataset descriptions"
    );
    Ok(inventories)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const SINGLE: &str = r#"
location: gfs_f006.grib2
run_date: 2024-01-15T00:00:00Z
grids:
  - name: TMP
    time: { offsets: [6] }
    vert: { name: isobaric, levels: [{ value: 500 }, { value: 850 }] }
  - name: PRMSL
    time: { name: time1, offsets: [6] }
    count: 0
"#;

    fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_load_single_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "f006.yaml", SINGLE);

        let invs = load_file(&path).unwrap();
        assert_eq!(invs.len(), 1);

        let inv = &invs[0];
        let run = Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap();
        assert_eq!(inv.run_date, run);
        assert_eq!(inv.location.as_str(), "gfs_f006.grib2");

        let tmp = inv.grid(0).unwrap();
        assert_eq!(tmp.time.as_ref().unwrap().run_date(), run);
        assert_eq!(tmp.time.as_ref().unwrap().name(), "time");
        assert_eq!(tmp.count, 2);

        let prmsl = inv.grid(1).unwrap();
        assert_eq!(prmsl.time.as_ref().unwrap().name(), "time1");
        assert_eq!(prmsl.count, 0);
        assert!(prmsl.vert.is_none());
    }

    #[test]
    fn test_load_json_list() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            dir.path(),
            "run.json",
            r#"[
                {"location": "a.nc", "run_date": "2024-01-15T00:00:00Z",
                 "grids": [{"name": "TMP", "ens": {"name": "ens", "members": [0, 1, 2]}}]},
                {"location": "b.nc", "run_date": "2024-01-15T06:00:00Z"}
            ]"#,
        );

        let invs = load_file(&path).unwrap();
        assert_eq!(invs.len(), 2);
        assert_eq!(invs[0].grid(0).unwrap().count, 3);
        assert!(invs[1].grids.is_empty());
    }

    #[test]
    fn test_walks_directories() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("nested");
        fs::create_dir(&nested).unwrap();
        write(dir.path(), "b.yaml", SINGLE);
        write(&nested, "a.yml", SINGLE);
        write(dir.path(), "notes.txt", "ignored");

        let paths = collect_paths(&[dir.path().to_path_buf()]).unwrap();
        assert_eq!(paths.len(), 2);
        assert!(paths.iter().all(|p| has_description_extension(p)));

        let invs = load_inventories(&[dir.path().to_path_buf()]).unwrap();
        assert_eq!(invs.len(), 2);
    }

    #[test]
    fn test_empty_axis_counts_zero() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            dir.path(),
            "empty.yaml",
            r#"
location: a.grib2
run_date: 2024-01-15T00:00:00Z
grids:
  - name: TMP
    time: { offsets: [0, 6] }
    vert: { name: isobaric, levels: [] }
  - name: PRMSL
    time: { offsets: [0, 6] }
"#,
        );

        let invs = load_file(&path).unwrap();
        assert_eq!(invs[0].grid(0).unwrap().count, 0);
        assert_eq!(invs[0].grid(1).unwrap().count, 2);
    }

    #[cfg(unix)]
    #[test]
    fn test_walk_error_surfaces() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.yaml", SINGLE);
        std::os::unix::fs::symlink(dir.path().join("missing.yaml"), dir.path().join("b.yaml"))
            .unwrap();

        let err = collect_paths(&[dir.path().to_path_buf()]).unwrap_err();
        assert!(err.to_string().contains("Failed to walk directory"));
        assert!(load_inventories(&[dir.path().to_path_buf()]).is_err());
    }

    #[test]
    fn test_missing_input() {
        let err = collect_paths(&[PathBuf::from("/nonexistent/run")]).unwrap_err();
        assert!(err.to_string().contains("Input not found"));
    }

    #[test]
    fn test_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "bad.yaml", "location: [unterminated");
        let err = load_file(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse YAML description"));
    }
}
