//! # tenrso-sparse
//!
//! Sparse tensor storage for TenRSo's partitioning layer.
//!
//! This crate provides:
//! - COO (Coordinate) format with mode-major index arrays
//! - CSF (Compressed Sparse Fiber) trees with slice/fiber ancestor queries
//! - `.tns` coordinate text I/O

#![deny(warnings)]

pub mod coo;
pub mod csf;
pub mod error;
pub mod io;

// Re-exports
pub use coo::*;
pub use csf::*;
pub use error::*;
