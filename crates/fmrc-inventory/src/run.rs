//! Run inventories: everything known about one forecast model run.
//!
//! A run is built in two phases. [`RunInventoryBuilder`] accepts dataset
//! inventories (one per source file) and groups their grids by variable
//! name. [`RunInventoryBuilder::finalize`] consumes the builder, unions the
//! coordinates of every variable, deduplicates them into the run's pools
//! and returns an immutable [`RunInventory`]. Since the builder is consumed,
//! adding after finalizing, or finalizing twice, cannot be expressed.

use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::config::InventoryConfig;
use crate::coord::{CoordPool, Coordinate, EnsCoord, TimeCoord, VertCoord};
use crate::dataset::{FileId, Grid, GridDatasetInv, GridRef};
use crate::error::{InventoryError, Result};
use crate::summary::RunSummary;
use crate::variable::{resolve, CoordPools, GridVariable, VariableAccumulator};

/// Mutable inventory of a run that is still receiving dataset inventories.
#[derive(Debug, Clone)]
pub struct RunInventoryBuilder {
    run_date: DateTime<Utc>,
    config: InventoryConfig,
    inventories: Vec<GridDatasetInv>,
    variables: HashMap<String, VariableAccumulator>,
}

impl RunInventoryBuilder {
    pub fn new(run_date: DateTime<Utc>) -> Self {
        Self::with_config(run_date, InventoryConfig::default())
    }

    pub fn with_config(run_date: DateTime<Utc>, config: InventoryConfig) -> Self {
        Self {
            run_date,
            config,
            inventories: Vec::new(),
            variables: HashMap::new(),
        }
    }

    pub fn run_date(&self) -> DateTime<Utc> {
        self.run_date
    }

    /// Number of dataset inventories added so far.
    pub fn len(&self) -> usize {
        self.inventories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inventories.is_empty()
    }

    /// Add the inventory of one source file.
    ///
    /// Each grid is appended to the variable of the same name. Addition order
    /// is the union tie-break: for each axis, the first-added grid carrying it
    /// is the base the others are merged into.
    ///
    /// The inventory is checked before anything is recorded, so a rejected
    /// inventory leaves the builder unchanged.
    pub fn add(&mut self, inv: GridDatasetInv) -> Result<()> {
        if inv.run_date != self.run_date {
            return Err(InventoryError::RunDateMismatch {
                location: inv.location.to_string(),
                expected: self.run_date,
                found: inv.run_date,
            });
        }

        for (index, grid) in inv.grids.iter().enumerate() {
            self.check_grid(&inv.location, index, grid)?;
        }

        let dataset = self.inventories.len();
        for (index, grid) in inv.grids.iter().enumerate() {
            self.variables
                .entry(grid.name.clone())
                .or_insert_with(|| VariableAccumulator::new(grid.name.clone()))
                .grids
                .push(GridRef::new(dataset, index));
        }

        debug!(
            run_date = %self.run_date,
            location = %inv.location,
            grids = inv.grids.len(),
            "Added dataset inventory"
        );
        self.inventories.push(inv);
        Ok(())
    }

    fn check_grid(&self, location: &FileId, index: usize, grid: &Grid) -> Result<()> {
        if grid.name.trim().is_empty() {
            return Err(InventoryError::MissingVariableName {
                location: location.clone(),
                index,
            });
        }

        if let Some(tc) = &grid.time {
            if tc.run_date() != self.run_date {
                return Err(InventoryError::TimeReferenceMismatch {
                    variable: grid.name.clone(),
                    location: location.clone(),
                    expected: self.run_date,
                    found: tc.run_date(),
                });
            }
        }

        let nan_axis = if grid.time.as_ref().map_or(false, TimeCoord::has_nan) {
            Some(TimeCoord::AXIS)
        } else if grid.vert.as_ref().map_or(false, VertCoord::has_nan) {
            Some(VertCoord::AXIS)
        } else {
            None
        };
        if let Some(axis) = nan_axis {
            return Err(InventoryError::NanCoordinate {
                variable: grid.name.clone(),
                location: location.clone(),
                axis,
            });
        }

        Ok(())
    }

    /// Union and deduplicate all coordinates, producing the published run.
    ///
    /// Variables are finished in name order, so pool order (and with it
    /// time ids and vertical name suffixes) is deterministic.
    pub fn finalize(self) -> Result<RunInventory> {
        self.config.validate()?;

        let mut accumulators: Vec<VariableAccumulator> = self.variables.into_values().collect();
        accumulators.sort_by(|a, b| a.name.cmp(&b.name));

        let mut pools = CoordPools::default();
        let variables = accumulators
            .into_iter()
            .map(|acc| acc.finish(self.run_date, &self.inventories, &mut pools))
            .collect::<Result<Vec<_>>>()?;

        for (seq, tc) in pools.time.entries_mut().iter_mut().enumerate() {
            tc.set_id(seq);
        }
        rename_vert_collisions(&mut pools.vert, &self.config);

        info!(
            run_date = %self.run_date,
            datasets = self.inventories.len(),
            variables = variables.len(),
            time_coords = pools.time.len(),
            vert_coords = pools.vert.len(),
            ens_coords = pools.ens.len(),
            "Run inventory finalized"
        );

        Ok(RunInventory {
            run_date: self.run_date,
            pools,
            variables,
            inventories: self.inventories,
        })
    }
}

/// Give later vertical coordinates that share a name a numeric suffix.
///
/// Within each group of equal names the first pool entry keeps its name and
/// the following ones become `name1`, `name2`, ... in pool order.
fn rename_vert_collisions(pool: &mut CoordPool<VertCoord>, config: &InventoryConfig) {
    let mut seen: HashMap<String, usize> = HashMap::new();
    for vc in pool.entries_mut() {
        let count = seen.entry(vc.name().to_string()).or_insert(0);
        if *count > 0 {
            let renamed = config.suffixed_name(vc.name(), *count);
            debug!(from = %vc.name(), to = %renamed, "Renaming colliding vertical coordinate");
            vc.set_name(renamed);
        }
        *count += 1;
    }
}

/// Finalized, read-only inventory of one run.
///
/// Runs order and compare by run date only.
#[derive(Debug, Clone)]
pub struct RunInventory {
    run_date: DateTime<Utc>,
    pools: CoordPools,
    variables: Vec<GridVariable>,
    inventories: Vec<GridDatasetInv>,
}

impl RunInventory {
    pub fn run_date(&self) -> DateTime<Utc> {
        self.run_date
    }

    /// Unique time coordinates, ids matching their position.
    pub fn time_coords(&self) -> &CoordPool<TimeCoord> {
        &self.pools.time
    }

    pub fn vert_coords(&self) -> &CoordPool<VertCoord> {
        &self.pools.vert
    }

    pub fn ens_coords(&self) -> &CoordPool<EnsCoord> {
        &self.pools.ens
    }

    /// Contributing dataset inventories in addition order.
    pub fn inventories(&self) -> &[GridDatasetInv] {
        &self.inventories
    }

    /// Variables sorted by name.
    pub fn variables(&self) -> impl ExactSizeIterator<Item = VariableView<'_>> + '_ {
        self.variables
            .iter()
            .map(move |variable| VariableView { run: self, variable })
    }

    pub fn variable(&self, name: &str) -> Option<VariableView<'_>> {
        self.variables
            .binary_search_by(|v| v.name().cmp(name))
            .ok()
            .map(|i| VariableView {
                run: self,
                variable: &self.variables[i],
            })
    }

    pub fn grid(&self, gref: GridRef) -> Option<&Grid> {
        resolve(&self.inventories, gref).ok()
    }

    pub fn file(&self, gref: GridRef) -> Option<&FileId> {
        self.inventories.get(gref.dataset).map(|inv| &inv.location)
    }

    /// Distinct source files touched by any variable of this run.
    pub fn files(&self) -> BTreeSet<&FileId> {
        self.variables().flat_map(|v| v.files()).collect()
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary::from_run(self)
    }
}

impl PartialEq for RunInventory {
    fn eq(&self, other: &Self) -> bool {
        self.run_date == other.run_date
    }
}

impl Eq for RunInventory {}

impl PartialOrd for RunInventory {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RunInventory {
    fn cmp(&self, other: &Self) -> Ordering {
        self.run_date.cmp(&other.run_date)
    }
}

/// A variable of a finalized run, with its coordinates resolved.
#[derive(Debug, Clone, Copy)]
pub struct VariableView<'a> {
    run: &'a RunInventory,
    variable: &'a GridVariable,
}

impl<'a> VariableView<'a> {
    pub fn name(&self) -> &'a str {
        self.variable.name()
    }

    pub fn run_date(&self) -> DateTime<Utc> {
        self.run.run_date
    }

    pub fn variable(&self) -> &'a GridVariable {
        self.variable
    }

    pub fn time_coord(&self) -> Option<&'a TimeCoord> {
        self.variable.time_id().and_then(|id| self.run.pools.time.get(id))
    }

    pub fn vert_coord(&self) -> Option<&'a VertCoord> {
        self.variable.vert_id().and_then(|id| self.run.pools.vert.get(id))
    }

    pub fn ens_coord(&self) -> Option<&'a EnsCoord> {
        self.variable.ens_id().and_then(|id| self.run.pools.ens.get(id))
    }

    /// Contributing grids in addition order.
    pub fn grids(&self) -> impl Iterator<Item = (GridRef, &'a Grid)> + 'a {
        let run = self.run;
        self.variable
            .grid_refs()
            .iter()
            .filter_map(move |gref| run.grid(*gref).map(|grid| (*gref, grid)))
    }

    /// Distinct source files this variable's grids come from.
    pub fn files(&self) -> BTreeSet<&'a FileId> {
        let run = self.run;
        self.variable
            .grid_refs()
            .iter()
            .filter_map(|gref| run.file(*gref))
            .collect()
    }

    /// Grids with data at `offset` hours; empty if the offset is not covered.
    pub fn grids_at_offset(&self, offset: f64) -> &'a [GridRef] {
        match self.time_coord().and_then(|tc| tc.position(offset)) {
            Some(index) => self.variable.time_sources(index),
            None => &[],
        }
    }

    /// Files holding data at `offset` hours.
    pub fn files_at_offset(&self, offset: f64) -> BTreeSet<&'a FileId> {
        let run = self.run;
        self.grids_at_offset(offset)
            .iter()
            .filter_map(|gref| run.file(*gref))
            .collect()
    }

    /// Total stored records over all contributing grids.
    pub fn count_total(&self) -> usize {
        self.grids().map(|(_, grid)| grid.count).sum()
    }

    pub fn n_times(&self) -> usize {
        self.time_coord().map_or(1, Coordinate::len)
    }

    /// Number of levels; 1 when the variable has no vertical axis.
    pub fn n_verts(&self) -> usize {
        self.vert_coord().map_or(1, Coordinate::len)
    }

    pub fn n_ens(&self) -> usize {
        self.ens_coord().map_or(1, Coordinate::len)
    }

    /// Records a complete `time x ens x level` array would hold.
    pub fn expected_count(&self) -> usize {
        self.n_times() * self.n_ens() * self.n_verts()
    }

    /// True when fewer records are stored than the full cross product.
    pub fn is_sparse(&self) -> bool {
        self.count_total() < self.expected_count()
    }
}
