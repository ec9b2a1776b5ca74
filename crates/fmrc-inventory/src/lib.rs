//! Forecast Model Run Inventories
//!
//! This crate aggregates the inventories of the files that make up a
//! forecast model run into one deduplicated coordinate model per run:
//!
//! - **Union**: a variable stored across several files gets one canonical
//!   time, vertical and ensemble coordinate, the union of what each file has
//! - **Dedup**: canonical coordinates with equal values are shared by every
//!   variable of the run
//! - **Provenance**: for each canonical time offset, the grids (and so the
//!   files) that hold data there
//!
//! The result can be read as a rectangular `var(time, ens, level)` array per
//! variable. Missing combinations are expected; absent axes are `None`.
//!
//! # Architecture
//!
//! ```text
//! GridDatasetInv (one per file)
//!      │
//!      ▼
//! RunInventoryBuilder::add          (group grids by variable name)
//!      │
//!      ▼
//! RunInventoryBuilder::finalize
//!      │
//!      ├─► per variable, in name order:
//!      │         ├─► ens/vert: first grid is base, others merged in
//!      │         ├─► time: flat union with per-offset provenance
//!      │         └─► CoordPool::find_or_add (dedup within the run)
//!      │
//!      ├─► number time coordinates 0, 1, 2, ...
//!      │
//!      └─► suffix colliding vertical names (level, level1, ...)
//!               │
//!               ▼
//!          RunInventory (immutable, Send + Sync)
//! ```
//!
//! # Example
//!
//! ```
//! use chrono::{TimeZone, Utc};
//! use fmrc_inventory::{Grid, GridDatasetInv, RunInventoryBuilder, TimeCoord, VertCoord};
//!
//! let run = Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap();
//! let mut builder = RunInventoryBuilder::new(run);
//!
//! builder.add(GridDatasetInv::new("gfs_f000.grib2", run).with_grid(
//!     Grid::new("TMP")
//!         .with_time(TimeCoord::new(run, [0.0]))
//!         .with_vert(VertCoord::from_values("isobaric", [500.0, 850.0])),
//! ))?;
//! builder.add(GridDatasetInv::new("gfs_f006.grib2", run).with_grid(
//!     Grid::new("TMP")
//!         .with_time(TimeCoord::new(run, [6.0]))
//!         .with_vert(VertCoord::from_values("isobaric", [500.0, 850.0, 1000.0])),
//! ))?;
//!
//! let inv = builder.finalize()?;
//! let tmp = inv.variable("TMP").unwrap();
//! assert_eq!(tmp.time_coord().unwrap().offsets(), &[0.0, 6.0]);
//! assert_eq!(tmp.vert_coord().unwrap().values(), vec![500.0, 850.0, 1000.0]);
//! # Ok::<(), fmrc_inventory::InventoryError>(())
//! ```

pub mod collection;
pub mod config;
pub mod coord;
pub mod dataset;
pub mod error;
pub mod run;
pub mod summary;
pub mod variable;

// Re-export commonly used types at crate root
pub use collection::{RunCollection, RunCollectionBuilder};
pub use config::InventoryConfig;
pub use coord::{
    CoordId, CoordPool, Coordinate, EnsCoord, TimeCoord, TimeUnion, UnionCoordinate, VertCoord,
    VertLevel,
};
pub use dataset::{FileId, Grid, GridDatasetInv, GridRef};
pub use error::{InventoryError, Result};
pub use run::{RunInventory, RunInventoryBuilder, VariableView};
pub use summary::{CoordSummary, RunSummary, TimeCoordSummary, VariableSummary};
pub use variable::GridVariable;
