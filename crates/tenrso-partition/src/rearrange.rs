//! Collective redistribution of coordinate tensor fragments.
//!
//! Every rank holds an arbitrary fragment of a sparse tensor plus one target rank
//! per local non-zero. [`redistribute`] moves every non-zero to its target:
//!
//! 1. Bucket the local non-zeros by target with a [`PartitionIndex`] (`nparts = P`)
//! 2. All-to-all the bucket sizes so each rank learns its inbound counts
//! 3. One variable-length all-to-all per mode and one for the values, all using
//!    the same send permutation and counts so tuples stay intact
//! 4. Concatenate the inbound blocks into the new fragment
//!
//! The result is grouped by ascending source rank; within a source block the
//! sender's local order is kept. Callers must not rely on any particular order.
//!
//! All ranks must call [`redistribute`] together. Any failure leaves the whole
//! collective invalid on every rank; there is no retry.

use serde::de::DeserializeOwned;
use serde::Serialize;
use tenrso_sparse::CooTensor;
use tracing::{debug, info};

use crate::comm::Communicator;
use crate::error::{PartitionError, PartitionResult};
use crate::index::PartitionIndex;

/// Move every local non-zero `i` to rank `target[i]`.
///
/// Consumes the local fragment and returns the fragment this rank owns
/// afterwards, sized exactly to the received volume. The shape is unchanged.
///
/// # Errors
///
/// - [`PartitionError::LabelCount`] if `target.len() != fragment.nnz()`
/// - [`PartitionError::TargetOutOfRange`] for a target `>= comm.size()`
/// - [`PartitionError::Communication`] if any exchange fails
///
/// A rank that fails locally stops participating, so its peers observe a
/// communication failure.
///
/// # Examples
///
/// ```
/// use tenrso_partition::{redistribute, LocalCluster};
/// use tenrso_sparse::CooTensor;
///
/// let fragments = LocalCluster::run(2, |comm| {
///     let tensor = CooTensor::new(vec![vec![0, 1, 2, 3]], vec![1.0, 2.0, 3.0, 4.0], vec![4]).unwrap();
///     let target: Vec<usize> = tensor.ind(0).iter().map(|i| i % 2).collect();
///     redistribute(tensor, &target, comm).unwrap()
/// });
///
/// // each rank contributed its copy of the four non-zeros
/// assert_eq!(fragments[0].ind(0), &[0, 2, 0, 2]);
/// assert_eq!(fragments[1].ind(0), &[1, 3, 1, 3]);
/// ```
#[tracing::instrument(skip_all, fields(rank = comm.rank(), size = comm.size(), nnz = fragment.nnz()))]
pub fn redistribute<T, C>(
    fragment: CooTensor<T>,
    target: &[usize],
    comm: &C,
) -> PartitionResult<CooTensor<T>>
where
    T: Clone + Serialize + DeserializeOwned,
    C: Communicator,
{
    if target.len() != fragment.nnz() {
        return Err(PartitionError::LabelCount {
            expected: fragment.nnz(),
            got: target.len(),
        });
    }

    let index = PartitionIndex::build(target, comm.size()).map_err(|err| match err {
        PartitionError::LabelOutOfRange {
            vertex,
            label,
            nparts,
        } => PartitionError::TargetOutOfRange {
            index: vertex,
            target: label,
            size: nparts,
        },
        other => other,
    })?;

    let send_counts = index.bucket_sizes();
    let recv_counts = comm.all_to_all(&send_counts)?;
    let incoming: usize = recv_counts.iter().sum();
    debug!(?send_counts, ?recv_counts, "exchanged bucket sizes");

    let order = index.plookup();
    let (inds, vals, shape) = fragment.into_parts();

    let mut new_inds = Vec::with_capacity(inds.len());
    for (mode, ind) in inds.into_iter().enumerate() {
        let send: Vec<usize> = order.iter().map(|&i| ind[i]).collect();
        drop(ind);
        new_inds.push(comm.all_to_all_v(&send, &send_counts, &recv_counts)?);
        debug!(mode, "exchanged mode indices");
    }

    let send: Vec<T> = order.iter().map(|&i| vals[i].clone()).collect();
    drop(vals);
    let new_vals = comm.all_to_all_v(&send, &send_counts, &recv_counts)?;

    info!(
        sent = order.len(),
        received = incoming,
        "redistribution complete"
    );
    Ok(CooTensor::new(new_inds, new_vals, shape)?)
}

/// Even block distribution of a tensor every rank can see.
///
/// Rank `r` keeps non-zeros `r * nnz / P .. (r + 1) * nnz / P`. No messages are
/// exchanged.
///
/// ```
/// use tenrso_partition::{block_distribute, LocalCluster};
/// use tenrso_sparse::CooTensor;
///
/// let tensor = CooTensor::new(vec![vec![0, 1, 2, 3, 4]], vec![1.0; 5], vec![5]).unwrap();
/// let blocks = LocalCluster::run(2, |comm| block_distribute(&tensor, comm));
/// assert_eq!(blocks[0].ind(0), &[0, 1]);
/// assert_eq!(blocks[1].ind(0), &[2, 3, 4]);
/// ```
pub fn block_distribute<T, C>(tensor: &CooTensor<T>, comm: &C) -> CooTensor<T>
where
    T: Clone,
    C: Communicator,
{
    let nnz = tensor.nnz();
    let (rank, size) = (comm.rank(), comm.size());
    tensor.slice(rank * nnz / size..(rank + 1) * nnz / size)
}

/// Total non-zeros across all ranks' fragments.
pub fn global_nnz<T, C>(fragment: &CooTensor<T>, comm: &C) -> PartitionResult<u64>
where
    T: Clone,
    C: Communicator,
{
    Ok(comm.all_reduce_sum(fragment.nnz() as u64)?)
}
