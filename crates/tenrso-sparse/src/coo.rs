//! COO (Coordinate) sparse tensor format
//!
//! The coordinate store keeps one index array per mode plus a value array, all of
//! length `nnz`. Element `i` is the tuple `(ind[0][i], ..., ind[m-1][i])` with
//! value `vals[i]`. Mode-major storage lets each mode be shipped as one contiguous
//! buffer when fragments move between ranks.
//!
//! # Format
//!
//! For an N-mode sparse tensor:
//! - `inds`: `Vec<Vec<usize>>` - `inds[m][i]` is the mode-`m` index of non-zero `i`
//! - `vals`: `Vec<T>` - The non-zero values
//! - `shape`: `Vec<usize>` - The extent of every mode
//!
//! # Examples
//!
//! ```
//! use tenrso_sparse::coo::CooTensor;
//!
//! // A 3x4 matrix with non-zeros at (0,1), (1,2) and (2,0)
//! let inds = vec![vec![0, 1, 2], vec![1, 2, 0]];
//! let vals = vec![2.5, 3.0, 1.5];
//!
//! let coo = CooTensor::new(inds, vals, vec![3, 4]).unwrap();
//! assert_eq!(coo.nnz(), 3);
//! assert_eq!(coo.coord(1), vec![1, 2]);
//! ```

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::error::{SparseError, SparseResult, ValidationError};

/// COO (Coordinate) sparse tensor with mode-major index arrays
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CooTensor<T> {
    /// `inds[m][i]` is the mode-`m` index of non-zero `i`
    inds: Vec<Vec<usize>>,

    /// Values at the corresponding coordinates
    vals: Vec<T>,

    /// Extent of each mode
    shape: Vec<usize>,
}

fn validate_shape(shape: &[usize]) -> SparseResult<()> {
    if shape.is_empty() {
        return Err(ValidationError::EmptyShape.into());
    }
    if shape.contains(&0) {
        return Err(ValidationError::ZeroInShape.into());
    }
    Ok(())
}

impl<T: Clone> CooTensor<T> {
    /// Create a new COO sparse tensor from per-mode index arrays
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The shape is empty or contains zeros
    /// - The number of index arrays differs from the number of modes
    /// - Any index array length differs from the value count
    /// - Any index is out of bounds
    pub fn new(inds: Vec<Vec<usize>>, vals: Vec<T>, shape: Vec<usize>) -> SparseResult<Self> {
        validate_shape(&shape)?;

        if inds.len() != shape.len() {
            return Err(ValidationError::ModeCount {
                expected: shape.len(),
                got: inds.len(),
            }
            .into());
        }

        for (mode, (ind, &extent)) in inds.iter().zip(&shape).enumerate() {
            if ind.len() != vals.len() {
                return Err(ValidationError::LengthMismatch {
                    mode,
                    expected: vals.len(),
                    got: ind.len(),
                }
                .into());
            }
            if let Some(&index) = ind.iter().find(|&&i| i >= extent) {
                return Err(SparseError::index_out_of_bounds(mode, index, extent));
            }
        }

        Ok(Self { inds, vals, shape })
    }

    /// Create an empty COO tensor with given shape
    pub fn zeros(shape: Vec<usize>) -> SparseResult<Self> {
        validate_shape(&shape)?;

        Ok(Self {
            inds: vec![Vec::new(); shape.len()],
            vals: Vec::new(),
            shape,
        })
    }

    /// Create an empty tensor with room for `capacity` non-zeros
    pub fn with_capacity(shape: Vec<usize>, capacity: usize) -> SparseResult<Self> {
        validate_shape(&shape)?;

        Ok(Self {
            inds: (0..shape.len())
                .map(|_| Vec::with_capacity(capacity))
                .collect(),
            vals: Vec::with_capacity(capacity),
            shape,
        })
    }

    /// Append a non-zero
    pub fn push(&mut self, coord: &[usize], value: T) -> SparseResult<()> {
        if coord.len() != self.shape.len() {
            return Err(ValidationError::ModeCount {
                expected: self.shape.len(),
                got: coord.len(),
            }
            .into());
        }
        for (mode, (&index, &extent)) in coord.iter().zip(&self.shape).enumerate() {
            if index >= extent {
                return Err(SparseError::index_out_of_bounds(mode, index, extent));
            }
        }

        for (ind, &index) in self.inds.iter_mut().zip(coord) {
            ind.push(index);
        }
        self.vals.push(value);
        Ok(())
    }

    /// Number of non-zero elements
    #[inline]
    pub fn nnz(&self) -> usize {
        self.vals.len()
    }

    /// Number of modes
    #[inline]
    pub fn nmodes(&self) -> usize {
        self.shape.len()
    }

    /// Extent of every mode
    #[inline]
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Index array of one mode
    ///
    /// # Panics
    ///
    /// Panics if `mode >= nmodes()`.
    #[inline]
    pub fn ind(&self, mode: usize) -> &[usize] {
        &self.inds[mode]
    }

    /// All index arrays, mode-major
    #[inline]
    pub fn inds(&self) -> &[Vec<usize>] {
        &self.inds
    }

    /// Values
    #[inline]
    pub fn vals(&self) -> &[T] {
        &self.vals
    }

    /// Mutable values; coordinates stay fixed
    pub fn vals_mut(&mut self) -> &mut [T] {
        &mut self.vals
    }

    /// Full coordinate tuple of non-zero `i`
    pub fn coord(&self, i: usize) -> Vec<usize> {
        self.inds.iter().map(|ind| ind[i]).collect()
    }

    /// Iterates over `(coordinate, value)` pairs in storage order
    pub fn iter(&self) -> impl Iterator<Item = (Vec<usize>, T)> + '_ {
        (0..self.nnz()).map(move |i| (self.coord(i), self.vals[i].clone()))
    }

    /// Copy out the non-zeros in `range` as a tensor of the same shape
    ///
    /// # Panics
    ///
    /// Panics if `range` exceeds `nnz()`.
    pub fn slice(&self, range: Range<usize>) -> Self {
        Self {
            inds: self
                .inds
                .iter()
                .map(|ind| ind[range.clone()].to_vec())
                .collect(),
            vals: self.vals[range].to_vec(),
            shape: self.shape.clone(),
        }
    }

    /// Decompose into `(inds, vals, shape)`
    pub fn into_parts(self) -> (Vec<Vec<usize>>, Vec<T>, Vec<usize>) {
        (self.inds, self.vals, self.shape)
    }
}
