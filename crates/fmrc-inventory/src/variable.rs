//! Grid variables: one variable name across all files of a run.
//!
//! Each contributing file may expose the variable with different time,
//! vertical and ensemble coordinates. Finishing a variable unions them into
//! one canonical coordinate per axis and stores it in the run's pools, so
//! that the variable can be treated as a rectangular, possibly sparse,
//! `var(time, ens, level)` array.

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::coord::{
    union_with_base, CoordId, CoordPool, Coordinate, EnsCoord, TimeCoord, TimeUnion, VertCoord,
};
use crate::dataset::{Grid, GridDatasetInv, GridRef};
use crate::error::{InventoryError, Result};

/// The three coordinate pools of one run.
#[derive(Debug, Clone, Default)]
pub(crate) struct CoordPools {
    pub time: CoordPool<TimeCoord>,
    pub vert: CoordPool<VertCoord>,
    pub ens: CoordPool<EnsCoord>,
}

/// A variable collecting grids while its run is still being built.
#[derive(Debug, Clone)]
pub(crate) struct VariableAccumulator {
    pub name: String,
    pub grids: Vec<GridRef>,
}

impl VariableAccumulator {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            grids: Vec::new(),
        }
    }

    /// Compute the canonical coordinates and pool them.
    ///
    /// Grids are visited in the order they were added to the run, so the
    /// first-added grid carrying an axis is the union base for that axis.
    pub fn finish(
        self,
        run_date: DateTime<Utc>,
        datasets: &[GridDatasetInv],
        pools: &mut CoordPools,
    ) -> Result<GridVariable> {
        let grids = self
            .grids
            .iter()
            .map(|gref| resolve(datasets, *gref).map(|grid| (*gref, grid)))
            .collect::<Result<Vec<_>>>()?;

        if let [(gref, grid)] = grids.as_slice() {
            // Single contributor: adopt its coordinates as they are.
            let time_sources = grid
                .time
                .as_ref()
                .map(|tc| vec![vec![*gref]; tc.len()])
                .unwrap_or_default();
            let variable = GridVariable {
                time: grid.time.clone().map(|tc| pools.time.find_or_add(tc)),
                vert: grid.vert.clone().map(|vc| pools.vert.find_or_add(vc)),
                ens: grid.ens.clone().map(|ec| pools.ens.find_or_add(ec)),
                time_sources,
                name: self.name,
                grids: self.grids,
            };
            debug!(variable = %variable.name, "Single-grid variable, coordinates adopted");
            return Ok(variable);
        }

        let ens = union_with_base(grids.iter().filter_map(|(_, g)| g.ens.as_ref()))
            .map(|ec| pools.ens.find_or_add(ec));

        let vert = union_with_base(grids.iter().filter_map(|(_, g)| g.vert.as_ref()))
            .map(|vc| pools.vert.find_or_add(vc));

        let timed: Vec<(GridRef, &TimeCoord)> = grids
            .iter()
            .filter_map(|(gref, g)| g.time.as_ref().map(|tc| (*gref, tc)))
            .collect();
        if timed.len() < grids.len() {
            warn!(
                variable = %self.name,
                without_time = grids.len() - timed.len(),
                "Grids without a time axis left out of the time union"
            );
        }

        let (time, time_sources) = if timed.is_empty() {
            (None, Vec::new())
        } else {
            let TimeUnion { coord, sources } = TimeCoord::make_union(timed, run_date)?;
            (Some(pools.time.find_or_add(coord)), sources)
        };

        debug!(
            variable = %self.name,
            grids = self.grids.len(),
            has_time = time.is_some(),
            has_vert = vert.is_some(),
            has_ens = ens.is_some(),
            "Variable coordinates unioned"
        );

        Ok(GridVariable {
            name: self.name,
            grids: self.grids,
            time,
            vert,
            ens,
            time_sources,
        })
    }
}

pub(crate) fn resolve(datasets: &[GridDatasetInv], gref: GridRef) -> Result<&Grid> {
    datasets
        .get(gref.dataset)
        .and_then(|inv| inv.grid(gref.grid))
        .ok_or(InventoryError::UnknownGrid(gref))
}

/// A finished variable of a run.
///
/// Coordinates are handles into the owning run's pools; resolve them through
/// [`crate::RunInventory`] or a [`crate::VariableView`].
#[derive(Debug, Clone)]
pub struct GridVariable {
    name: String,
    grids: Vec<GridRef>,
    time: Option<CoordId<TimeCoord>>,
    vert: Option<CoordId<VertCoord>>,
    ens: Option<CoordId<EnsCoord>>,
    /// Parallel to the canonical time offsets.
    time_sources: Vec<Vec<GridRef>>,
}

impl GridVariable {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Contributing grids, in the order they were added.
    pub fn grid_refs(&self) -> &[GridRef] {
        &self.grids
    }

    pub fn time_id(&self) -> Option<CoordId<TimeCoord>> {
        self.time
    }

    pub fn vert_id(&self) -> Option<CoordId<VertCoord>> {
        self.vert
    }

    pub fn ens_id(&self) -> Option<CoordId<EnsCoord>> {
        self.ens
    }

    /// Grids with data at the `index`-th canonical time offset.
    pub fn time_sources(&self, index: usize) -> &[GridRef] {
        self.time_sources
            .get(index)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}
