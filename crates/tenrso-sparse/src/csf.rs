//! CSF (Compressed Sparse Fiber) format for N-dimensional sparse tensors
//!
//! # Overview
//!
//! CSF stores a tensor as a tree of compressed fibers, where each level represents
//! one mode. The non-zeros are sorted by `mode_order`, so every tree node owns a
//! contiguous range of non-zeros.
//!
//! # Structure
//!
//! For an n-mode tensor, CSF has:
//! - `mode_order`: Permutation of modes; `mode_order[0]` is the primary (slice) mode
//! - `fptr[l]` (l = 0..n-2): non-zero offsets of every node at level l, so node `k`
//!   owns non-zeros `fptr[l][k]..fptr[l][k+1]`
//! - `fids[l]` (l = 0..n-1): mode index of every node at level l; the leaf level
//!   has one entry per non-zero
//! - `vals`: Nonzero values in sorted order
//! - `perm`: source coordinate id of every sorted non-zero, with its inverse
//!
//! Level 0 nodes are *slices*, level n-2 nodes are *fibers*.
//!
//! # Example
//!
//! For a 3D tensor with nonzeros at (0,1,2)=5, (0,1,3)=6, (1,2,3)=7 and mode order
//! [0,1,2]:
//! - `fptr[0] = [0, 2, 3]`, `fids[0] = [0, 1]` (two slices)
//! - `fptr[1] = [0, 2, 3]`, `fids[1] = [1, 2]` (two fibers)
//! - `fids[2] = [2, 3, 3]`, `vals = [5.0, 6.0, 7.0]`
//!
//! # Complexity
//!
//! - **Construction from COO**: O(nnz × log(nnz)) for sorting + O(nnz × n) for the tree
//! - **Ancestor lookup**: O(log nodes) per level via binary search on `fptr`
//! - **Memory**: O(nnz) + O(number of nodes at each level)

use std::cmp::Ordering;

use scirs2_core::numeric::Float;

use crate::coo::CooTensor;
use crate::error::{SparseResult, ValidationError};

/// CSF (Compressed Sparse Fiber) tensor
///
/// # Examples
///
/// ```
/// use tenrso_sparse::{CooTensor, CsfTensor};
///
/// let mut coo = CooTensor::zeros(vec![3, 4, 5]).unwrap();
/// coo.push(&[0, 1, 2], 5.0).unwrap();
/// coo.push(&[0, 1, 3], 6.0).unwrap();
/// coo.push(&[1, 2, 3], 7.0).unwrap();
///
/// let csf = CsfTensor::from_coo(&coo, &[0, 1, 2]).unwrap();
/// assert_eq!(csf.nnz(), 3);
/// assert_eq!(csf.nfibs(), 2);
/// assert_eq!(csf.fiber_range(0), 0..2);
/// ```
#[derive(Debug, Clone)]
pub struct CsfTensor<T> {
    shape: Vec<usize>,
    mode_order: Vec<usize>,
    nnz: usize,
    /// Non-leaf levels only
    fptr: Vec<Vec<usize>>,
    fids: Vec<Vec<usize>>,
    vals: Vec<T>,
    /// CSF position -> COO id
    perm: Vec<usize>,
    /// COO id -> CSF position
    iperm: Vec<usize>,
}

impl<T: Float> CsfTensor<T> {
    /// Creates a CSF tensor from COO format with the specified mode ordering.
    ///
    /// # Arguments
    ///
    /// - `coo`: Input tensor in COO format
    /// - `mode_order`: Permutation of modes (e.g., [0,1,2] or [2,1,0])
    pub fn from_coo(coo: &CooTensor<T>, mode_order: &[usize]) -> SparseResult<Self> {
        let ndim = coo.nmodes();

        if mode_order.len() != ndim {
            return Err(ValidationError::InvalidModeOrder {
                reason: format!("mode_order length {} != ndim {}", mode_order.len(), ndim),
            }
            .into());
        }

        let mut sorted_modes = mode_order.to_vec();
        sorted_modes.sort_unstable();
        if sorted_modes != (0..ndim).collect::<Vec<_>>() {
            return Err(ValidationError::InvalidModeOrder {
                reason: format!("mode_order {:?} is not a permutation of 0..{}", mode_order, ndim),
            }
            .into());
        }

        let nnz = coo.nnz();
        let mut perm: Vec<usize> = (0..nnz).collect();
        perm.sort_by(|&a, &b| {
            for &mode in mode_order {
                let ind = coo.ind(mode);
                match ind[a].cmp(&ind[b]) {
                    Ordering::Equal => continue,
                    other => return other,
                }
            }
            Ordering::Equal
        });

        let mut fptr = Vec::with_capacity(ndim.saturating_sub(1));
        let mut fids = Vec::with_capacity(ndim);

        // Parent node boundaries, starting from the whole tensor
        let mut bounds = vec![0, nnz];
        for &mode in &mode_order[..ndim - 1] {
            let ind = coo.ind(mode);
            let mut ptrs = vec![0];
            let mut ids = Vec::new();

            for window in bounds.windows(2) {
                let end = window[1];
                let mut start = window[0];
                while start < end {
                    let idx_val = ind[perm[start]];
                    let mut stop = start + 1;
                    while stop < end && ind[perm[stop]] == idx_val {
                        stop += 1;
                    }
                    ids.push(idx_val);
                    ptrs.push(stop);
                    start = stop;
                }
            }

            bounds = ptrs.clone();
            fptr.push(ptrs);
            fids.push(ids);
        }

        let leaf = coo.ind(mode_order[ndim - 1]);
        fids.push(perm.iter().map(|&i| leaf[i]).collect());
        let vals = perm.iter().map(|&i| coo.vals()[i]).collect();

        let mut iperm = vec![0; nnz];
        for (pos, &id) in perm.iter().enumerate() {
            iperm[id] = pos;
        }

        Ok(Self {
            shape: coo.shape().to_vec(),
            mode_order: mode_order.to_vec(),
            nnz,
            fptr,
            fids,
            vals,
            perm,
            iperm,
        })
    }

    /// Creates a CSF tensor rooted at `mode`; the remaining modes follow in
    /// ascending order.
    ///
    /// ```
    /// use tenrso_sparse::{CooTensor, CsfTensor};
    ///
    /// let coo = CooTensor::<f64>::zeros(vec![2, 3, 4]).unwrap();
    /// let csf = CsfTensor::for_mode(&coo, 1).unwrap();
    /// assert_eq!(csf.mode_order(), &[1, 0, 2]);
    /// ```
    pub fn for_mode(coo: &CooTensor<T>, mode: usize) -> SparseResult<Self> {
        let ndim = coo.nmodes();
        if mode >= ndim {
            return Err(ValidationError::InvalidMode { mode, nmodes: ndim }.into());
        }
        let mut order = Vec::with_capacity(ndim);
        order.push(mode);
        order.extend((0..ndim).filter(|&m| m != mode));
        Self::from_coo(coo, &order)
    }

    /// Iterates over all nonzeros as (indices, value) tuples in CSF order.
    pub fn iter(&self) -> impl Iterator<Item = (Vec<usize>, T)> + '_ {
        (0..self.nnz).map(move |pos| {
            let mut indices = vec![0; self.ndim()];
            for (level, &mode) in self.mode_order.iter().enumerate() {
                indices[mode] = self.node_index(level, pos);
            }
            (indices, self.vals[pos])
        })
    }

    /// Converts CSF back to COO format (in CSF order).
    pub fn to_coo(&self) -> SparseResult<CooTensor<T>> {
        let mut coo = CooTensor::with_capacity(self.shape.clone(), self.nnz)?;
        for (indices, value) in self.iter() {
            coo.push(&indices, value)?;
        }
        Ok(coo)
    }
}

impl<T> CsfTensor<T> {
    /// Returns the shape of the tensor.
    #[inline]
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Returns the number of dimensions.
    #[inline]
    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    /// Returns the number of nonzeros.
    #[inline]
    pub fn nnz(&self) -> usize {
        self.nnz
    }

    /// Returns the mode ordering.
    #[inline]
    pub fn mode_order(&self) -> &[usize] {
        &self.mode_order
    }

    /// Non-zero offsets of the nodes at a non-leaf level.
    ///
    /// # Panics
    ///
    /// Panics if `level >= ndim - 1`.
    #[inline]
    pub fn fptr(&self, level: usize) -> &[usize] {
        &self.fptr[level]
    }

    /// Mode indices of the nodes at a level.
    ///
    /// # Panics
    ///
    /// Panics if `level >= ndim`.
    #[inline]
    pub fn fids(&self, level: usize) -> &[usize] {
        &self.fids[level]
    }

    /// Returns a reference to the values.
    #[inline]
    pub fn vals(&self) -> &[T] {
        &self.vals
    }

    /// Id in the source COO tensor of the non-zero stored at CSF position `pos`.
    #[inline]
    pub fn nnz_id(&self, pos: usize) -> usize {
        self.perm[pos]
    }

    /// CSF position of the non-zero with source COO id `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id >= nnz()`.
    #[inline]
    pub fn nnz_pos(&self, id: usize) -> usize {
        self.iperm[id]
    }

    /// Slice pointers: non-zero ranges of the level-0 nodes.
    pub fn sptr(&self) -> &[usize] {
        self.fptr.first().map(Vec::as_slice).unwrap_or(&[0])
    }

    /// Leaf-level (tertiary) index of every non-zero, in CSF order.
    pub fn leaf_inds(&self) -> &[usize] {
        &self.fids[self.ndim() - 1]
    }

    /// Number of fibers (level `ndim - 2` nodes); zero for 1-mode tensors.
    pub fn nfibs(&self) -> usize {
        match self.ndim() {
            0 | 1 => 0,
            n => self.fids[n - 2].len(),
        }
    }

    /// Non-zero range owned by fiber `f`.
    ///
    /// # Panics
    ///
    /// Panics if `f >= nfibs()`.
    pub fn fiber_range(&self, f: usize) -> std::ops::Range<usize> {
        let ptr = &self.fptr[self.ndim() - 2];
        ptr[f]..ptr[f + 1]
    }

    /// Position of the level-`level` node that owns non-zero `pos`.
    pub fn node_at(&self, level: usize, pos: usize) -> usize {
        if level + 1 == self.ndim() {
            return pos;
        }
        self.fptr[level].partition_point(|&offset| offset <= pos) - 1
    }

    /// Mode index (of mode `mode_order[level]`) of the level-`level` ancestor of
    /// non-zero `pos`.
    pub fn node_index(&self, level: usize, pos: usize) -> usize {
        self.fids[level][self.node_at(level, pos)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CooTensor<f64> {
        let mut coo = CooTensor::zeros(vec![3, 4, 5]).unwrap();
        coo.push(&[1, 2, 3], 7.0).unwrap();
        coo.push(&[0, 1, 3], 6.0).unwrap();
        coo.push(&[0, 1, 2], 5.0).unwrap();
        coo
    }

    #[test]
    fn test_csf_from_coo_basic() {
        let csf = CsfTensor::from_coo(&sample(), &[0, 1, 2]).unwrap();

        assert_eq!(csf.shape(), &[3, 4, 5]);
        assert_eq!(csf.nnz(), 3);
        assert_eq!(csf.mode_order(), &[0, 1, 2]);
        assert_eq!(csf.fptr(0), &[0, 2, 3]);
        assert_eq!(csf.fids(0), &[0, 1]);
        assert_eq!(csf.fptr(1), &[0, 2, 3]);
        assert_eq!(csf.fids(1), &[1, 2]);
        assert_eq!(csf.leaf_inds(), &[2, 3, 3]);
        assert_eq!(csf.vals(), &[5.0, 6.0, 7.0]);
    }

    #[test]
    fn test_csf_invalid_mode_order() {
        let coo = CooTensor::<f64>::zeros(vec![3, 3, 3]).unwrap();

        assert!(CsfTensor::from_coo(&coo, &[0, 1]).is_err());
        assert!(CsfTensor::from_coo(&coo, &[0, 0, 1]).is_err());
        assert!(CsfTensor::from_coo(&coo, &[0, 1, 3]).is_err());
        assert!(CsfTensor::for_mode(&coo, 3).is_err());
    }

    #[test]
    fn test_csf_empty_tensor() {
        let coo = CooTensor::<f64>::zeros(vec![3, 3, 3]).unwrap();
        let csf = CsfTensor::from_coo(&coo, &[0, 1, 2]).unwrap();

        assert_eq!(csf.nnz(), 0);
        assert_eq!(csf.nfibs(), 0);
        assert_eq!(csf.sptr(), &[0]);
    }

    #[test]
    fn test_csf_for_mode_order() {
        let csf = CsfTensor::for_mode(&sample(), 2).unwrap();
        assert_eq!(csf.mode_order(), &[2, 0, 1]);
        // slices of mode 2: index 2 holds one non-zero, index 3 holds two
        assert_eq!(csf.fids(0), &[2, 3]);
        assert_eq!(csf.sptr(), &[0, 1, 3]);
    }

    #[test]
    fn test_csf_fibers_and_ancestors() {
        let csf = CsfTensor::from_coo(&sample(), &[0, 1, 2]).unwrap();

        assert_eq!(csf.nfibs(), 2);
        assert_eq!(csf.fiber_range(0), 0..2);
        assert_eq!(csf.fiber_range(1), 2..3);
        assert_eq!(csf.node_at(0, 1), 0);
        assert_eq!(csf.node_at(0, 2), 1);
        assert_eq!(csf.node_index(0, 2), 1);
        assert_eq!(csf.node_index(1, 1), 1);
        assert_eq!(csf.node_index(2, 1), 3);
    }

    #[test]
    fn test_csf_iteration() {
        let csf = CsfTensor::from_coo(&sample(), &[2, 0, 1]).unwrap();
        let nonzeros: Vec<_> = csf.iter().collect();

        assert_eq!(nonzeros.len(), 3);
        assert!(nonzeros.contains(&(vec![0, 1, 2], 5.0)));
        assert!(nonzeros.contains(&(vec![0, 1, 3], 6.0)));
        assert!(nonzeros.contains(&(vec![1, 2, 3], 7.0)));
    }

    #[test]
    fn test_csf_to_coo_roundtrip() {
        let coo = sample();
        let csf = CsfTensor::from_coo(&coo, &[1, 2, 0]).unwrap();
        let back = csf.to_coo().unwrap();

        let mut orig: Vec<_> = coo.iter().collect();
        let mut round: Vec<_> = back.iter().collect();
        orig.sort_by(|a, b| a.0.cmp(&b.0));
        round.sort_by(|a, b| a.0.cmp(&b.0));
        assert_eq!(orig, round);
    }

    #[test]
    fn test_csf_nnz_ids() {
        // sample() pushes (1,2,3), (0,1,3), (0,1,2); sorting reverses them
        let csf = CsfTensor::from_coo(&sample(), &[0, 1, 2]).unwrap();

        assert_eq!(csf.nnz_id(0), 2);
        assert_eq!(csf.nnz_id(1), 1);
        assert_eq!(csf.nnz_id(2), 0);
        for id in 0..csf.nnz() {
            assert_eq!(csf.nnz_id(csf.nnz_pos(id)), id);
        }
        assert_eq!(csf.vals()[csf.nnz_pos(0)], 7.0);
    }

    #[test]
    fn test_csf_two_modes() {
        let coo = CooTensor::new(
            vec![vec![0, 0, 2], vec![1, 3, 0]],
            vec![1.0, 2.0, 3.0],
            vec![3, 4],
        )
        .unwrap();
        let csf = CsfTensor::from_coo(&coo, &[0, 1]).unwrap();

        // with two modes every slice is a fiber
        assert_eq!(csf.nfibs(), 2);
        assert_eq!(csf.fiber_range(0), 0..2);
        assert_eq!(csf.leaf_inds(), &[1, 3, 0]);
    }

    #[test]
    fn test_csf_high_dimensional() {
        let mut coo = CooTensor::zeros(vec![2, 2, 2, 2, 2]).unwrap();
        coo.push(&[0, 0, 0, 0, 1], 1.0).unwrap();
        coo.push(&[1, 1, 1, 1, 0], 2.0).unwrap();
        coo.push(&[1, 1, 1, 0, 0], 3.0).unwrap();

        let csf = CsfTensor::from_coo(&coo, &[0, 1, 2, 3, 4]).unwrap();
        assert_eq!(csf.nnz(), 3);
        assert_eq!(csf.ndim(), 5);
        assert_eq!(csf.nfibs(), 3);
        assert_eq!(csf.fids(0), &[0, 1]);
    }
}
