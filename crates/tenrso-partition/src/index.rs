//! Bucketed partition index
//!
//! Groups structural units (fibers or non-zeros) by their partition label with a
//! counting sort:
//!
//! 1. Histogram the labels into `pptr[1..=nparts]`
//! 2. Prefix-sum in place, so `pptr[p]` counts the units labelled `< p`
//! 3. Scatter each unit id into `plookup` at a per-partition cursor
//!
//! Afterwards `plookup[pptr[p]..pptr[p + 1]]` lists the units of partition `p`
//! in input order.
//!
//! # Complexity
//!
//! O(nvtxs + nparts) time and space
//!
//! # Examples
//!
//! ```
//! use tenrso_partition::PartitionIndex;
//!
//! let index = PartitionIndex::build(&[2, 0, 2, 1, 0], 3).unwrap();
//! assert_eq!(index.pptr(), &[0, 2, 3, 5]);
//! assert_eq!(index.bucket(0), &[1, 4]);
//! assert_eq!(index.bucket(2), &[0, 2]);
//! ```

use crate::error::{PartitionError, PartitionResult};

/// Partition labels grouped into contiguous buckets
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionIndex {
    /// Bucket offsets, `nparts + 1` entries
    pptr: Vec<usize>,
    /// Unit ids grouped by partition
    plookup: Vec<usize>,
}

impl PartitionIndex {
    /// Build the index for `labels`, every label in `[0, nparts)`.
    ///
    /// # Errors
    ///
    /// [`PartitionError::LabelOutOfRange`] for the first label `>= nparts`;
    /// nothing is allocated for the index in that case.
    ///
    /// [`PartitionError::InvalidInput`] when `nparts + 1` offsets cannot be
    /// allocated.
    pub fn build(labels: &[usize], nparts: usize) -> PartitionResult<Self> {
        if let Some((vertex, &label)) = labels.iter().enumerate().find(|(_, &l)| l >= nparts) {
            return Err(PartitionError::LabelOutOfRange {
                vertex,
                label,
                nparts,
            });
        }

        let len = nparts.checked_add(1).ok_or_else(|| {
            PartitionError::invalid(format!("partition count {} is too large", nparts))
        })?;
        let mut pptr = Vec::new();
        pptr.try_reserve_exact(len).map_err(|_| {
            PartitionError::invalid(format!("cannot allocate offsets for {} partitions", nparts))
        })?;
        pptr.resize(len, 0usize);
        for &label in labels {
            pptr[label + 1] += 1;
        }
        for p in 1..=nparts {
            pptr[p] += pptr[p - 1];
        }

        let mut cursor = pptr[..nparts].to_vec();
        let mut plookup = vec![0usize; labels.len()];
        for (vertex, &label) in labels.iter().enumerate() {
            plookup[cursor[label]] = vertex;
            cursor[label] += 1;
        }

        Ok(Self { pptr, plookup })
    }

    /// Number of partitions implied by `labels`: `max(label) + 1`, or 0 when empty.
    pub fn infer_nparts(labels: &[usize]) -> usize {
        labels.iter().copied().max().map_or(0, |m| m + 1)
    }

    /// Number of partitions
    #[inline]
    pub fn nparts(&self) -> usize {
        self.pptr.len() - 1
    }

    /// Number of indexed units
    #[inline]
    pub fn nvtxs(&self) -> usize {
        self.plookup.len()
    }

    /// Bucket offsets
    #[inline]
    pub fn pptr(&self) -> &[usize] {
        &self.pptr
    }

    /// Unit ids grouped by partition
    #[inline]
    pub fn plookup(&self) -> &[usize] {
        &self.plookup
    }

    /// Unit ids labelled `p`
    ///
    /// # Panics
    ///
    /// Panics if `p >= nparts()`.
    #[inline]
    pub fn bucket(&self, p: usize) -> &[usize] {
        &self.plookup[self.pptr[p]..self.pptr[p + 1]]
    }

    /// Number of units labelled `p`
    #[inline]
    pub fn bucket_len(&self, p: usize) -> usize {
        self.pptr[p + 1] - self.pptr[p]
    }

    /// Size of every bucket, in partition order
    pub fn bucket_sizes(&self) -> Vec<usize> {
        self.pptr.windows(2).map(|w| w[1] - w[0]).collect()
    }

    /// Iterates over `(partition, bucket)` pairs, empty buckets included
    pub fn iter(&self) -> impl Iterator<Item = (usize, &[usize])> + '_ {
        (0..self.nparts()).map(move |p| (p, self.bucket(p)))
    }

    /// Re-derive the label array the index was built from
    pub fn labels(&self) -> Vec<usize> {
        let mut labels = vec![0; self.nvtxs()];
        for (p, bucket) in self.iter() {
            for &vertex in bucket {
                labels[vertex] = p;
            }
        }
        labels
    }
}
