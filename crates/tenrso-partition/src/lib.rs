//! # tenrso-partition
//!
//! Partition-driven distribution and analysis of sparse tensors.
//!
//! This crate provides:
//! - [`PartitionIndex`]: counting-sort grouping of units by partition label
//! - [`analyze`]: per-partition non-zero balance and per-mode index coverage over
//!   a compressed fiber structure
//! - [`redistribute`]: collective all-to-all movement of coordinate fragments to
//!   their target ranks
//! - [`LocalCluster`]: an in-process [`Communicator`] for running collectives on
//!   threads
//! - `MpiComm` (feature `mpi`): the same collectives across MPI processes
//!
//! # Examples
//!
//! ```
//! use tenrso_partition::{analyze, PartitionIndex, PartitionUnit};
//! use tenrso_sparse::{CooTensor, CsfTensor};
//!
//! let coo = CooTensor::new(
//!     vec![vec![0, 0, 1, 1], vec![0, 1, 0, 1], vec![2, 0, 1, 2]],
//!     vec![1.0, 2.0, 3.0, 4.0],
//!     vec![2, 2, 3],
//! )
//! .unwrap();
//! let csf = CsfTensor::for_mode(&coo, 0).unwrap();
//!
//! // four fibers, split across two partitions
//! let index = PartitionIndex::build(&[0, 1, 0, 1], 2).unwrap();
//! let report = analyze(&csf, &index, PartitionUnit::Fiber).unwrap();
//! assert_eq!(report.lightest, 2);
//! assert_eq!(report.parts[0].unique[0], 2);
//! ```

#![deny(warnings)]

pub mod comm;
pub mod config;
pub mod error;
pub mod index;
pub mod labels;
#[cfg(feature = "mpi")]
pub mod mpi_comm;
pub mod rearrange;
pub mod report;
pub mod stats;
pub mod tracing_support;

// Re-exports
pub use comm::{CommError, CommStats, Communicator, LocalCluster, LocalComm};
pub use config::StatsConfig;
pub use error::{ErrorKind, PartitionError, PartitionResult};
pub use index::PartitionIndex;
pub use labels::{read_labels, read_labels_file, write_labels};
#[cfg(feature = "mpi")]
pub use mpi_comm::MpiComm;
pub use rearrange::{block_distribute, global_nnz, redistribute};
pub use report::format_exp;
pub use stats::{
    analyze, run_stats, tensor_density, FiberStructure, PartitionReport, PartitionStats,
    PartitionUnit, StatsKind, StatsOutput, TensorSummary,
};
