//! Cross-process [`Communicator`] over MPI.
//!
//! Every rank of an `mpirun` job holds one [`MpiComm`]. An exchange is two
//! collectives: an all-to-all of the byte lengths, then a variable-count
//! all-to-all of the concatenated buffers.
//!
//! ```no_run
//! use tenrso_partition::{global_nnz, Communicator, MpiComm};
//! use tenrso_sparse::CooTensor;
//!
//! let universe = mpi::initialize().unwrap();
//! let comm = MpiComm::world(&universe);
//! let local = CooTensor::<f64>::zeros(vec![4, 4, 4]).unwrap();
//! let total = global_nnz(&local, &comm).unwrap();
//! println!("rank {} of {}: {} non-zeros", comm.rank(), comm.size(), total);
//! ```
//!
//! MPI errors abort the job under the default error handler, so they never
//! surface as [`CommError`].

use mpi::datatype::{Partition, PartitionMut};
use mpi::environment::Universe;
use mpi::topology::Communicator as MpiCommunicator;
use mpi::topology::SimpleCommunicator;
use mpi::traits::CommunicatorCollectives;
use mpi::Count;

use crate::comm::{CommError, CommResult, CommStats, CommStatsInternal, Communicator};

/// One rank of an MPI communicator
pub struct MpiComm {
    comm: SimpleCommunicator,
    rank: usize,
    size: usize,
    stats: CommStatsInternal,
}

impl MpiComm {
    /// Wrap an MPI communicator.
    ///
    /// The [`Universe`] it came from must outlive the returned handle.
    pub fn new(comm: SimpleCommunicator) -> Self {
        let rank = comm.rank() as usize;
        let size = comm.size() as usize;
        Self {
            comm,
            rank,
            size,
            stats: CommStatsInternal::default(),
        }
    }

    /// Handle onto every process of the job
    pub fn world(universe: &Universe) -> Self {
        Self::new(universe.world())
    }

    /// Traffic counters so far
    pub fn stats(&self) -> CommStats {
        self.stats.snapshot()
    }
}

impl std::fmt::Debug for MpiComm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MpiComm")
            .field("rank", &self.rank)
            .field("size", &self.size)
            .finish()
    }
}

/// MPI element counts of `buffers`
fn byte_counts(buffers: &[Vec<u8>]) -> CommResult<Vec<Count>> {
    buffers
        .iter()
        .enumerate()
        .map(|(peer, bytes)| {
            Count::try_from(bytes.len()).map_err(|_| {
                CommError::Layout(format!(
                    "{} bytes for rank {} exceed the MPI count range",
                    bytes.len(),
                    peer
                ))
            })
        })
        .collect()
}

/// Exclusive prefix sums of `counts`
fn displacements(counts: &[Count]) -> CommResult<Vec<Count>> {
    let mut displs = Vec::with_capacity(counts.len());
    let mut offset: Count = 0;
    for &count in counts {
        displs.push(offset);
        offset = offset
            .checked_add(count)
            .ok_or_else(|| CommError::Layout("exchange exceeds the MPI count range".into()))?;
    }
    Ok(displs)
}

/// Cut `buf` into consecutive blocks of `counts[r]` bytes
fn split_blocks(buf: &[u8], counts: &[Count], displs: &[Count]) -> Vec<Vec<u8>> {
    counts
        .iter()
        .zip(displs)
        .map(|(&count, &displ)| {
            let start = displ as usize;
            buf[start..start + count as usize].to_vec()
        })
        .collect()
}

impl Communicator for MpiComm {
    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.size
    }

    fn exchange(&self, outgoing: Vec<Vec<u8>>) -> CommResult<Vec<Vec<u8>>> {
        if outgoing.len() != self.size {
            return Err(CommError::SlotCount {
                expected: self.size,
                got: outgoing.len(),
            });
        }

        let send_counts = byte_counts(&outgoing)?;
        let send_displs = displacements(&send_counts)?;
        let mut recv_counts: Vec<Count> = vec![0; self.size];
        self.comm.all_to_all_into(&send_counts[..], &mut recv_counts[..]);
        let recv_displs = displacements(&recv_counts)?;

        let send_buf = outgoing.concat();
        let total: usize = recv_counts.iter().map(|&c| c as usize).sum();
        let mut recv_buf = vec![0u8; total];
        {
            let send = Partition::new(&send_buf[..], &send_counts[..], &send_displs[..]);
            let mut recv =
                PartitionMut::new(&mut recv_buf[..], &recv_counts[..], &recv_displs[..]);
            self.comm.all_to_all_varcount_into(&send, &mut recv);
        }

        self.stats.record(send_buf.len() as u64, total as u64);
        Ok(split_blocks(&recv_buf, &recv_counts, &recv_displs))
    }
}
