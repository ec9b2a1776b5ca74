//! Error types for run inventory construction.
//!
//! Only contract violations are errors here. A grid without a vertical or
//! ensemble axis, or a variable that is missing some time/level/member
//! combinations, is normal data and is represented with `Option` instead.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::dataset::{FileId, GridRef};

/// Errors that can occur while building run inventories.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InventoryError {
    /// A grid in a dataset inventory has an empty variable name.
    #[error("grid #{index} in {location} has no variable name")]
    MissingVariableName { location: FileId, index: usize },

    /// A dataset inventory was offered to a run with a different run date.
    #[error("{location} belongs to run {found}, expected run {expected}")]
    RunDateMismatch {
        location: String,
        expected: DateTime<Utc>,
        found: DateTime<Utc>,
    },

    /// A grid's time coordinate is referenced to a different run date.
    #[error("time coordinate of '{variable}' in {location} is relative to {found}, expected {expected}")]
    TimeReferenceMismatch {
        variable: String,
        location: FileId,
        expected: DateTime<Utc>,
        found: DateTime<Utc>,
    },

    /// Time coordinates offered to one union are referenced to different run dates.
    #[error("time coordinate of grid {grid} is relative to {found}, expected {expected}")]
    TimeUnionMismatch {
        grid: GridRef,
        expected: DateTime<Utc>,
        found: DateTime<Utc>,
    },

    /// A grid's coordinate holds a NaN value.
    #[error("{axis} coordinate of '{variable}' in {location} contains NaN")]
    NanCoordinate {
        variable: String,
        location: FileId,
        axis: &'static str,
    },

    /// A grid reference does not resolve against the run's inventory list.
    #[error("grid reference {0} does not resolve")]
    UnknownGrid(GridRef),

    /// Invalid configuration value.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The dedicated worker pool could not be started.
    #[error("failed to build worker pool: {0}")]
    WorkerPool(String),
}

impl InventoryError {
    /// Create an InvalidConfig error.
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// True for errors caused by the caller feeding inconsistent inventories.
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            Self::MissingVariableName { .. }
                | Self::RunDateMismatch { .. }
                | Self::TimeReferenceMismatch { .. }
                | Self::TimeUnionMismatch { .. }
                | Self::NanCoordinate { .. }
                | Self::UnknownGrid(_)
        )
    }
}

impl From<rayon::ThreadPoolBuildError> for InventoryError {
    fn from(err: rayon::ThreadPoolBuildError) -> Self {
        Self::WorkerPool(err.to_string())
    }
}

/// Result type for inventory operations.
pub type Result<T> = std::result::Result<T, InventoryError>;
