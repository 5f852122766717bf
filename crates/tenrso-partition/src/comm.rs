//! Collective communication between cluster ranks.
//!
//! [`Communicator`] has a single required primitive, [`Communicator::exchange`],
//! which hands one byte buffer to every rank (itself included) and returns the
//! buffer every rank addressed to the caller. The typed collectives are built on
//! top of it and encode payloads with bincode.
//!
//! Every collective must be entered by all ranks of the communicator in the same
//! order; a rank that never arrives blocks the others indefinitely.
//!
//! [`LocalCluster`] wires `P` in-process ranks together with crossbeam channels,
//! one FIFO channel per ordered rank pair, and runs each rank on its own thread.
//! With the `mpi` feature, `MpiComm` runs the same collectives across
//! processes.

use std::sync::atomic::{AtomicU64, Ordering};

use crossbeam::channel::{self, Receiver, Sender};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

/// Errors raised by collective operations
#[derive(Error, Debug)]
pub enum CommError {
    #[error("peer rank {peer} disconnected")]
    Disconnected { peer: usize },

    #[error("expected one outgoing buffer per rank ({expected}), got {got}")]
    SlotCount { expected: usize, got: usize },

    #[error("invalid exchange layout: {0}")]
    Layout(String),

    #[error("failed to encode payload: {0}")]
    Encode(String),

    #[error("failed to decode payload from rank {peer}: {reason}")]
    Decode { peer: usize, reason: String },

    #[error("rank {peer} sent {got} elements, expected {expected}")]
    CountMismatch {
        peer: usize,
        expected: usize,
        got: usize,
    },
}

/// Result type alias for collective operations
pub type CommResult<T> = Result<T, CommError>;

fn encode<T: Serialize + ?Sized>(value: &T) -> CommResult<Vec<u8>> {
    bincode::serde::encode_to_vec(value, bincode::config::standard())
        .map_err(|e| CommError::Encode(e.to_string()))
}

fn decode<T: DeserializeOwned>(bytes: &[u8], peer: usize) -> CommResult<T> {
    bincode::serde::decode_from_slice(bytes, bincode::config::standard())
        .map(|(value, _)| value)
        .map_err(|e| CommError::Decode {
            peer,
            reason: e.to_string(),
        })
}

/// A handle onto a group of cooperating ranks
pub trait Communicator {
    /// Rank of the caller, in `[0, size())`
    fn rank(&self) -> usize;

    /// Number of ranks
    fn size(&self) -> usize;

    /// Personalized exchange of raw buffers.
    ///
    /// `outgoing[r]` is delivered to rank `r`; slot `s` of the result is the
    /// buffer rank `s` addressed to the caller.
    fn exchange(&self, outgoing: Vec<Vec<u8>>) -> CommResult<Vec<Vec<u8>>>;

    /// Sum of `value` over all ranks
    fn all_reduce_sum(&self, value: u64) -> CommResult<u64> {
        let slot = encode(&value)?;
        let incoming = self.exchange(vec![slot; self.size()])?;
        incoming
            .iter()
            .enumerate()
            .try_fold(0u64, |acc, (peer, bytes)| {
                Ok(acc + decode::<u64>(bytes, peer)?)
            })
    }

    /// Send `send[r]` to rank `r`; returns the value every rank sent to the caller
    fn all_to_all(&self, send: &[usize]) -> CommResult<Vec<usize>> {
        if send.len() != self.size() {
            return Err(CommError::SlotCount {
                expected: self.size(),
                got: send.len(),
            });
        }
        let outgoing = send
            .iter()
            .map(|&count| encode(&(count as u64)))
            .collect::<CommResult<Vec<_>>>()?;
        self.exchange(outgoing)?
            .iter()
            .enumerate()
            .map(|(peer, bytes)| decode::<u64>(bytes, peer).map(|v| v as usize))
            .collect()
    }

    /// Variable-length personalized all-to-all.
    ///
    /// `send` is laid out as consecutive blocks, block `r` holding `send_counts[r]`
    /// items destined for rank `r`. The result concatenates the blocks received
    /// from ranks `0..size()` in rank order, block `s` holding `recv_counts[s]`
    /// items.
    fn all_to_all_v<T>(
        &self,
        send: &[T],
        send_counts: &[usize],
        recv_counts: &[usize],
    ) -> CommResult<Vec<T>>
    where
        T: Serialize + DeserializeOwned,
    {
        let size = self.size();
        if send_counts.len() != size || recv_counts.len() != size {
            return Err(CommError::Layout(format!(
                "{} send counts and {} receive counts for {} ranks",
                send_counts.len(),
                recv_counts.len(),
                size
            )));
        }
        let total: usize = send_counts.iter().sum();
        if total != send.len() {
            return Err(CommError::Layout(format!(
                "send counts cover {} items but {} were given",
                total,
                send.len()
            )));
        }

        let mut outgoing = Vec::with_capacity(size);
        let mut offset = 0;
        for &count in send_counts {
            outgoing.push(encode(&send[offset..offset + count])?);
            offset += count;
        }

        let incoming = self.exchange(outgoing)?;
        let mut received = Vec::with_capacity(recv_counts.iter().sum());
        for (peer, bytes) in incoming.iter().enumerate() {
            let block: Vec<T> = decode(bytes, peer)?;
            if block.len() != recv_counts[peer] {
                return Err(CommError::CountMismatch {
                    peer,
                    expected: recv_counts[peer],
                    got: block.len(),
                });
            }
            received.extend(block);
        }
        Ok(received)
    }
}

/// Traffic counters of one rank
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommStats {
    /// Bytes handed to peers (self-addressed buffers included)
    pub bytes_sent: u64,
    /// Bytes received from peers
    pub bytes_received: u64,
    /// Completed exchanges
    pub exchanges: u64,
}

#[derive(Default)]
pub(crate) struct CommStatsInternal {
    bytes_sent: AtomicU64,
    bytes_received: AtomicU64,
    exchanges: AtomicU64,
}

impl CommStatsInternal {
    /// Count one completed exchange
    pub(crate) fn record(&self, sent: u64, received: u64) {
        self.bytes_sent.fetch_add(sent, Ordering::Relaxed);
        self.bytes_received.fetch_add(received, Ordering::Relaxed);
        self.exchanges.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> CommStats {
        CommStats {
            bytes_sent: self.bytes_sent.load(Ordering::Relaxed),
            bytes_received: self.bytes_received.load(Ordering::Relaxed),
            exchanges: self.exchanges.load(Ordering::Relaxed),
        }
    }
}

/// One rank of an in-process cluster
pub struct LocalComm {
    rank: usize,
    size: usize,
    /// `outboxes[dst]` carries buffers from this rank to `dst`
    outboxes: Vec<Sender<Vec<u8>>>,
    /// `inboxes[src]` carries buffers from `src` to this rank
    inboxes: Vec<Receiver<Vec<u8>>>,
    stats: CommStatsInternal,
}

impl LocalComm {
    /// Traffic counters so far
    pub fn stats(&self) -> CommStats {
        self.stats.snapshot()
    }
}

impl std::fmt::Debug for LocalComm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalComm")
            .field("rank", &self.rank)
            .field("size", &self.size)
            .finish()
    }
}

impl Communicator for LocalComm {
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

        let mut sent = 0u64;
        for (peer, (outbox, bytes)) in self.outboxes.iter().zip(outgoing).enumerate() {
            sent += bytes.len() as u64;
            outbox
                .send(bytes)
                .map_err(|_| CommError::Disconnected { peer })?;
        }

        let mut incoming = Vec::with_capacity(self.size);
        for (peer, inbox) in self.inboxes.iter().enumerate() {
            incoming.push(inbox.recv().map_err(|_| CommError::Disconnected { peer })?);
        }

        let received: u64 = incoming.iter().map(|b| b.len() as u64).sum();
        self.stats.record(sent, received);
        Ok(incoming)
    }
}

/// Builder for in-process clusters
pub struct LocalCluster;

impl LocalCluster {
    /// Create `size` connected ranks, returned in rank order.
    pub fn new(size: usize) -> Vec<LocalComm> {
        // channels[src][dst]
        let mut senders: Vec<Vec<Sender<Vec<u8>>>> = Vec::with_capacity(size);
        let mut receivers: Vec<Vec<Option<Receiver<Vec<u8>>>>> =
            (0..size).map(|_| (0..size).map(|_| None).collect()).collect();

        for src in 0..size {
            let mut row = Vec::with_capacity(size);
            for dst_inboxes in receivers.iter_mut() {
                let (tx, rx) = channel::unbounded();
                row.push(tx);
                dst_inboxes[src] = Some(rx);
            }
            senders.push(row);
        }

        senders
            .into_iter()
            .zip(receivers)
            .enumerate()
            .map(|(rank, (outboxes, inboxes))| LocalComm {
                rank,
                size,
                outboxes,
                inboxes: inboxes.into_iter().flatten().collect(),
                stats: CommStatsInternal::default(),
            })
            .collect()
    }

    /// Run `f` once per rank, each on its own thread, and collect the results in
    /// rank order. A panic on any rank is re-raised on the caller.
    pub fn run<F, R>(size: usize, f: F) -> Vec<R>
    where
        F: Fn(&LocalComm) -> R + Sync,
        R: Send,
    {
        let comms = Self::new(size);
        let f = &f;
        std::thread::scope(|scope| {
            let handles: Vec<_> = comms
                .into_iter()
                .map(|comm| scope.spawn(move || f(&comm)))
                .collect();
            handles
                .into_iter()
                .map(|handle| {
                    handle
                        .join()
                        .unwrap_or_else(|panic| std::panic::resume_unwind(panic))
                })
                .collect()
        })
    }
}
