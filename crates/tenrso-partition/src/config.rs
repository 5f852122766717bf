//! Configuration for statistics runs

use std::path::PathBuf;

use crate::stats::{PartitionUnit, StatsKind};

/// Options of one statistics run
///
/// `Default` reads `TENRSO_PARTITION_FILE` for the partition file; everything
/// else starts at the basic analysis over mode 0 with one label per fiber.
#[derive(Debug, Clone, PartialEq)]
pub struct StatsConfig {
    /// Analysis to perform
    pub kind: StatsKind,
    /// Primary mode of the fiber structure
    pub mode: usize,
    /// One label per unit; required by [`StatsKind::HyperParts`]
    pub partition_file: Option<PathBuf>,
    /// Number of partitions, inferred from the labels when absent
    pub nparts: Option<usize>,
    /// What each label refers to
    pub unit: PartitionUnit,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            kind: StatsKind::Basic,
            mode: 0,
            partition_file: std::env::var_os("TENRSO_PARTITION_FILE").map(PathBuf::from),
            nparts: None,
            unit: PartitionUnit::Fiber,
        }
    }
}

impl StatsConfig {
    /// Set the analysis kind
    pub fn with_kind(mut self, kind: StatsKind) -> Self {
        self.kind = kind;
        self
    }

    /// Set the primary mode
    pub fn with_mode(mut self, mode: usize) -> Self {
        self.mode = mode;
        self
    }

    /// Set the partition file
    pub fn with_partition_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.partition_file = Some(path.into());
        self
    }

    /// Fix the number of partitions
    pub fn with_nparts(mut self, nparts: usize) -> Self {
        self.nparts = Some(nparts);
        self
    }

    /// Set the partition unit
    pub fn with_unit(mut self, unit: PartitionUnit) -> Self {
        self.unit = unit;
        self
    }
}
