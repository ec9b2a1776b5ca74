//! Collections of runs.
//!
//! Dataset inventories arrive in no particular order and for many runs.
//! [`RunCollectionBuilder`] routes each one to the builder of its run;
//! finalizing builds every run independently, in parallel when configured,
//! since distinct runs share no state.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use tracing::info;

use crate::config::InventoryConfig;
use crate::dataset::{FileId, GridDatasetInv};
use crate::error::Result;
use crate::run::{RunInventory, RunInventoryBuilder};
use crate::summary::RunSummary;

/// Groups dataset inventories by run date.
#[derive(Debug, Clone, Default)]
pub struct RunCollectionBuilder {
    config: InventoryConfig,
    runs: BTreeMap<DateTime<Utc>, RunInventoryBuilder>,
}

impl RunCollectionBuilder {
    pub fn new(config: InventoryConfig) -> Self {
        Self {
            config,
            runs: BTreeMap::new(),
        }
    }

    /// Route one dataset inventory to its run.
    ///
    /// A rejected inventory leaves the collection unchanged; in particular
    /// it never opens a run of its own.
    pub fn add(&mut self, inv: GridDatasetInv) -> Result<()> {
        let run_date = inv.run_date;
        if let Some(run) = self.runs.get_mut(&run_date) {
            return run.add(inv);
        }

        let mut run = RunInventoryBuilder::with_config(run_date, self.config.clone());
        run.add(inv)?;
        self.runs.insert(run_date, run);
        Ok(())
    }

    pub fn add_all(&mut self, invs: impl IntoIterator<Item = GridDatasetInv>) -> Result<()> {
        invs.into_iter().try_for_each(|inv| self.add(inv))
    }

    /// Number of distinct runs seen so far.
    pub fn len(&self) -> usize {
        self.runs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    /// Finalize every run.
    ///
    /// Fails with the first error in run-date order.
    pub fn finalize(self) -> Result<RunCollection> {
        self.config.validate()?;

        let builders: Vec<RunInventoryBuilder> = self.runs.into_values().collect();
        let n_runs = builders.len();

        // Both paths keep the BTreeMap's run-date order.
        let runs = if !self.config.parallel_runs {
            builders
                .into_iter()
                .map(RunInventoryBuilder::finalize)
                .collect::<Result<Vec<_>>>()?
        } else if let Some(threads) = self.config.worker_threads {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .thread_name(|i| format!("fmrc-run-{}", i))
                .build()?;
            pool.install(|| finalize_parallel(builders))?
        } else {
            finalize_parallel(builders)?
        };

        info!(
            runs = n_runs,
            parallel = self.config.parallel_runs,
            "Run collection finalized"
        );

        Ok(RunCollection { runs })
    }
}

fn finalize_parallel(builders: Vec<RunInventoryBuilder>) -> Result<Vec<RunInventory>> {
    builders
        .into_par_iter()
        .map(RunInventoryBuilder::finalize)
        .collect()
}

/// Finalized runs, sorted by run date.
#[derive(Debug, Clone, Default)]
pub struct RunCollection {
    runs: Vec<RunInventory>,
}

impl RunCollection {
    pub fn runs(&self) -> &[RunInventory] {
        &self.runs
    }

    pub fn run(&self, run_date: DateTime<Utc>) -> Option<&RunInventory> {
        self.runs
            .binary_search_by_key(&run_date, RunInventory::run_date)
            .ok()
            .map(|i| &self.runs[i])
    }

    pub fn latest(&self) -> Option<&RunInventory> {
        self.runs.last()
    }

    pub fn run_dates(&self) -> Vec<DateTime<Utc>> {
        self.runs.iter().map(RunInventory::run_date).collect()
    }

    /// Distinct source files over all runs.
    pub fn files(&self) -> BTreeSet<&FileId> {
        self.runs.iter().flat_map(RunInventory::files).collect()
    }

    pub fn summaries(&self) -> Vec<RunSummary> {
        self.runs.iter().map(RunInventory::summary).collect()
    }

    pub fn len(&self) -> usize {
        self.runs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }
}

impl IntoIterator for RunCollection {
    type Item = RunInventory;
    type IntoIter = std::vec::IntoIter<RunInventory>;

    fn into_iter(self) -> Self::IntoIter {
        self.runs.into_iter()
    }
}
