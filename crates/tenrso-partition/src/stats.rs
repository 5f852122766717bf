//! Partition quality statistics over a compressed fiber structure.
//!
//! For every partition the engine counts the non-zeros its units own and, per
//! tree level, how many distinct indices of that level's mode the partition
//! touches. Level 0 counts slices, level 1 fiber ids and the leaf level the
//! tertiary index of every non-zero. One marker buffer per mode, sized to the
//! mode's extent, is cleared at the start of every partition; the O(Σ dims)
//! reset per partition is fine for an offline diagnostic.

use std::ops::Range;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tenrso_sparse::{CooTensor, CsfTensor};
use tracing::{debug, info};

use crate::config::StatsConfig;
use crate::error::{PartitionError, PartitionResult};
use crate::index::PartitionIndex;
use crate::labels::read_labels_file;

/// Read-only query surface of a compressed fiber structure
pub trait FiberStructure {
    /// Number of modes
    fn nmodes(&self) -> usize;

    /// Extent of every mode, in natural mode order
    fn dims(&self) -> &[usize];

    /// Total non-zeros
    fn nnz(&self) -> usize;

    /// Mode stored at every tree level; level 0 is the primary mode
    fn dim_perms(&self) -> &[usize];

    /// Number of fibers
    fn nfibs(&self) -> usize;

    /// Non-zero positions owned by fiber `f`
    fn fiber_range(&self, f: usize) -> Range<usize>;

    /// Index of mode `dim_perms()[level]` for the non-zero at `pos`
    fn node_index(&self, level: usize, pos: usize) -> usize;

    /// Storage position of the non-zero whose id in the source tensor is `id`
    fn nnz_position(&self, id: usize) -> usize;
}

impl<T> FiberStructure for CsfTensor<T> {
    fn nmodes(&self) -> usize {
        self.ndim()
    }

    fn dims(&self) -> &[usize] {
        self.shape()
    }

    fn nnz(&self) -> usize {
        CsfTensor::nnz(self)
    }

    fn dim_perms(&self) -> &[usize] {
        self.mode_order()
    }

    fn nfibs(&self) -> usize {
        CsfTensor::nfibs(self)
    }

    fn fiber_range(&self, f: usize) -> Range<usize> {
        CsfTensor::fiber_range(self, f)
    }

    fn node_index(&self, level: usize, pos: usize) -> usize {
        CsfTensor::node_index(self, level, pos)
    }

    fn nnz_position(&self, id: usize) -> usize {
        self.nnz_pos(id)
    }
}

/// Granularity of the partitioned units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartitionUnit {
    /// One label per fiber
    #[default]
    Fiber,
    /// One label per non-zero
    Nonzero,
}

impl PartitionUnit {
    /// Number of units in `fibers`
    pub fn count<F: FiberStructure + ?Sized>(self, fibers: &F) -> usize {
        match self {
            PartitionUnit::Fiber => fibers.nfibs(),
            PartitionUnit::Nonzero => fibers.nnz(),
        }
    }
}

impl FromStr for PartitionUnit {
    type Err = PartitionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fiber" | "fibers" => Ok(PartitionUnit::Fiber),
            "nonzero" | "nonzeros" | "nnz" => Ok(PartitionUnit::Nonzero),
            other => Err(PartitionError::invalid(format!(
                "unknown partition unit '{}'",
                other
            ))),
        }
    }
}

/// Available analyses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatsKind {
    /// Tensor summary: dimensions, non-zeros, density
    #[default]
    Basic,
    /// Partition balance and coverage of a fiber partitioning
    HyperParts,
}

impl FromStr for StatsKind {
    type Err = PartitionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "basic" => Ok(StatsKind::Basic),
            "hparts" | "hyperparts" => Ok(StatsKind::HyperParts),
            other => Err(PartitionError::Unsupported {
                kind: other.to_string(),
            }),
        }
    }
}

/// Normalized fill ratio: `Π_m (nnz^(1/nmodes) / dims[m])`.
///
/// Equals `nnz / Π dims` up to rounding, without overflowing on large extents.
pub fn tensor_density(nnz: usize, dims: &[usize]) -> f64 {
    if dims.is_empty() {
        return 0.0;
    }
    let root = (nnz as f64).powf(1.0 / dims.len() as f64);
    dims.iter().map(|&d| root / d as f64).product()
}

fn percent(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        100.0 * count as f64 / total as f64
    }
}

/// Basic summary of a coordinate tensor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TensorSummary {
    pub file: Option<String>,
    pub dims: Vec<usize>,
    pub nnz: usize,
    pub density: f64,
}

impl TensorSummary {
    /// Summarize `tensor`
    pub fn of<T: Clone>(tensor: &CooTensor<T>) -> Self {
        Self {
            file: None,
            dims: tensor.shape().to_vec(),
            nnz: tensor.nnz(),
            density: tensor_density(tensor.nnz(), tensor.shape()),
        }
    }

    /// Attach the source file name
    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }
}

/// Statistics of one partition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartitionStats {
    pub id: usize,
    /// Units (fibers or non-zeros) in the partition
    pub fib_count: usize,
    pub nnz: usize,
    /// Distinct indices touched, per tree level
    pub unique: Vec<usize>,
    pub fib_pct: f64,
    pub nnz_pct: f64,
    pub unique_pct: Vec<f64>,
}

/// Balance and coverage report of a partitioning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartitionReport {
    pub file: Option<String>,
    pub unit: PartitionUnit,
    pub nvtxs: usize,
    pub nhedges: usize,
    pub nparts: usize,
    pub nnz: usize,
    pub density: f64,
    pub lightest: usize,
    pub heaviest: usize,
    pub avg: f64,
    pub dims: Vec<usize>,
    pub dim_perms: Vec<usize>,
    pub parts: Vec<PartitionStats>,
}

impl PartitionReport {
    /// Attach the partition file name
    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }
}

/// Compute balance and coverage statistics of `index` over `fibers`.
///
/// `index` must hold exactly one entry per unit (`unit.count(fibers)`).
///
/// # Errors
///
/// - [`PartitionError::LabelCount`] if the index size does not match the units
/// - [`PartitionError::InvalidInput`] for fewer than two modes or zero partitions
#[tracing::instrument(skip_all, fields(nparts = index.nparts(), unit = ?unit))]
pub fn analyze<F>(
    fibers: &F,
    index: &PartitionIndex,
    unit: PartitionUnit,
) -> PartitionResult<PartitionReport>
where
    F: FiberStructure + ?Sized,
{
    let nmodes = fibers.nmodes();
    if nmodes < 2 {
        return Err(PartitionError::invalid(format!(
            "fiber statistics need at least two modes, got {}",
            nmodes
        )));
    }
    let nvtxs = unit.count(fibers);
    if index.nvtxs() != nvtxs {
        return Err(PartitionError::LabelCount {
            expected: nvtxs,
            got: index.nvtxs(),
        });
    }
    let nparts = index.nparts();
    if nparts == 0 {
        return Err(PartitionError::invalid("at least one partition is required"));
    }

    let dims = fibers.dims();
    let dim_perms = fibers.dim_perms();
    let total_nnz = fibers.nnz();
    let level_dims: Vec<usize> = dim_perms.iter().map(|&m| dims[m]).collect();
    let leaf = nmodes - 1;

    let mut markers: Vec<Vec<bool>> = level_dims.iter().map(|&d| vec![false; d]).collect();
    let mut parts = Vec::with_capacity(nparts);

    for (p, bucket) in index.iter() {
        for marker in markers.iter_mut() {
            marker.fill(false);
        }
        let mut unique = vec![0usize; nmodes];
        let mut nnz = 0;

        for &vertex in bucket {
            let range = match unit {
                PartitionUnit::Fiber => fibers.fiber_range(vertex),
                PartitionUnit::Nonzero => {
                    let pos = fibers.nnz_position(vertex);
                    pos..pos + 1
                }
            };
            if range.is_empty() {
                continue;
            }
            nnz += range.len();

            // every non-zero of a unit shares its non-leaf ancestors
            for level in 0..leaf {
                let idx = fibers.node_index(level, range.start);
                if !markers[level][idx] {
                    markers[level][idx] = true;
                    unique[level] += 1;
                }
            }
            for pos in range {
                let idx = fibers.node_index(leaf, pos);
                if !markers[leaf][idx] {
                    markers[leaf][idx] = true;
                    unique[leaf] += 1;
                }
            }
        }

        debug!(partition = p, units = bucket.len(), nnz, ?unique, "partition scanned");
        parts.push(PartitionStats {
            id: p,
            fib_count: bucket.len(),
            nnz,
            fib_pct: percent(bucket.len(), nvtxs),
            nnz_pct: percent(nnz, total_nnz),
            unique_pct: unique
                .iter()
                .zip(&level_dims)
                .map(|(&count, &dim)| percent(count, dim))
                .collect(),
            unique,
        });
    }

    let lightest = parts.iter().map(|s| s.nnz).min().unwrap_or(0);
    let heaviest = parts.iter().map(|s| s.nnz).max().unwrap_or(0);
    let avg = total_nnz as f64 / nparts as f64;
    info!(lightest, heaviest, avg, "partition statistics computed");

    Ok(PartitionReport {
        file: None,
        unit,
        nvtxs,
        nhedges: dims.iter().sum(),
        nparts,
        nnz: total_nnz,
        density: tensor_density(total_nnz, dims),
        lightest,
        heaviest,
        avg,
        dims: dims.to_vec(),
        dim_perms: dim_perms.to_vec(),
        parts,
    })
}

/// Result of one analysis run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum StatsOutput {
    Basic(TensorSummary),
    HyperParts(PartitionReport),
}

/// Run the analysis selected by `config` on `tensor`.
///
/// `name` labels the tensor in the output. A partition analysis without a
/// partition file fails with [`PartitionError::Usage`] before any work is done.
pub fn run_stats<T>(
    config: &StatsConfig,
    tensor: &CooTensor<T>,
    name: Option<&str>,
) -> PartitionResult<StatsOutput>
where
    T: scirs2_core::numeric::Float,
{
    match config.kind {
        StatsKind::Basic => {
            let summary = TensorSummary::of(tensor);
            Ok(StatsOutput::Basic(match name {
                Some(name) => summary.with_file(name),
                None => summary,
            }))
        }
        StatsKind::HyperParts => {
            let pfile = config
                .partition_file
                .as_deref()
                .ok_or_else(|| PartitionError::usage("analysis type requires partition file"))?;
            let report = partition_report(tensor, config, pfile)?;
            Ok(StatsOutput::HyperParts(report))
        }
    }
}

fn partition_report<T>(
    tensor: &CooTensor<T>,
    config: &StatsConfig,
    pfile: &Path,
) -> PartitionResult<PartitionReport>
where
    T: scirs2_core::numeric::Float,
{
    let csf = CsfTensor::for_mode(tensor, config.mode)?;
    let nvtxs = config.unit.count(&csf);
    let labels = read_labels_file(pfile, nvtxs)?;
    let nparts = config
        .nparts
        .unwrap_or_else(|| PartitionIndex::infer_nparts(&labels));
    let index = PartitionIndex::build(&labels, nparts)?;
    Ok(analyze(&csf, &index, config.unit)?.with_file(pfile.display().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CsfTensor<f64> {
        // 3x3x4 tensor, fibers along mode 2
        let coo = CooTensor::new(
            vec![
                vec![0, 0, 0, 1, 2, 2],
                vec![0, 0, 1, 1, 2, 2],
                vec![0, 3, 1, 2, 0, 3],
            ],
            vec![1.0; 6],
            vec![3, 3, 4],
        )
        .unwrap();
        CsfTensor::for_mode(&coo, 0).unwrap()
    }

    #[test]
    fn test_density() {
        assert!((tensor_density(16, &[4, 4, 4]) - 0.25).abs() < 1e-12);
        assert!((tensor_density(2, &[10, 10, 10]) - 0.002).abs() < 1e-12);
        assert_eq!(tensor_density(0, &[3, 3]), 0.0);
    }

    #[test]
    fn test_analyze_fibers() {
        let csf = sample();
        // fibers: (0,0)->{0,3}, (0,1)->{1}, (1,1)->{2}, (2,2)->{0,3}
        assert_eq!(csf.nfibs(), 4);

        let index = PartitionIndex::build(&[0, 1, 1, 0], 2).unwrap();
        let report = analyze(&csf, &index, PartitionUnit::Fiber).unwrap();

        assert_eq!(report.nvtxs, 4);
        assert_eq!(report.nhedges, 10);
        assert_eq!(report.nnz, 6);
        assert_eq!(report.lightest, 2);
        assert_eq!(report.heaviest, 4);
        assert!((report.avg - 3.0).abs() < 1e-12);

        let p0 = &report.parts[0];
        assert_eq!(p0.fib_count, 2);
        assert_eq!(p0.nnz, 4);
        // slices {0, 2}, fiber ids {0, 2}, leaf indices {0, 3}
        assert_eq!(p0.unique, vec![2, 2, 2]);
        assert!((p0.fib_pct - 50.0).abs() < 1e-12);
        assert!((p0.unique_pct[2] - 50.0).abs() < 1e-12);

        let p1 = &report.parts[1];
        assert_eq!(p1.nnz, 2);
        // slices {0, 1}, fiber id {1}, leaf indices {1, 2}
        assert_eq!(p1.unique, vec![2, 1, 2]);
    }

    #[test]
    fn test_analyze_nonzeros() {
        let csf = sample();
        let labels: Vec<usize> = (0..6).map(|i| i % 3).collect();
        let index = PartitionIndex::build(&labels, 3).unwrap();
        let report = analyze(&csf, &index, PartitionUnit::Nonzero).unwrap();

        assert_eq!(report.nvtxs, 6);
        assert_eq!(report.parts.iter().map(|p| p.nnz).sum::<usize>(), 6);
        for part in &report.parts {
            assert_eq!(part.nnz, 2);
            assert_eq!(part.fib_count, 2);
            for (count, dim) in part.unique.iter().zip(&[3, 3, 4]) {
                assert!(*count <= *dim && *count <= part.nnz);
            }
        }
    }

    #[test]
    fn test_analyze_nonzeros_by_source_id() {
        // stored as e0=(1,0,0), e1=(0,0,0), e2=(0,1,0); CSF order is e1, e2, e0
        let coo = CooTensor::new(
            vec![vec![1, 0, 0], vec![0, 0, 1], vec![0, 0, 0]],
            vec![1.0; 3],
            vec![2, 2, 1],
        )
        .unwrap();
        let csf = CsfTensor::for_mode(&coo, 0).unwrap();
        let index = PartitionIndex::build(&[0, 0, 1], 2).unwrap();
        let report = analyze(&csf, &index, PartitionUnit::Nonzero).unwrap();

        // part 0 holds e0 and e1, which sit in slices 1 and 0
        assert_eq!(report.parts[0].nnz, 2);
        assert_eq!(report.parts[0].unique, vec![2, 1, 1]);
        assert_eq!(report.parts[1].nnz, 1);
        assert_eq!(report.parts[1].unique, vec![1, 1, 1]);
    }

    #[test]
    fn test_analyze_empty_partition() {
        let csf = sample();
        let index = PartitionIndex::build(&[0, 0, 0, 0], 3).unwrap();
        let report = analyze(&csf, &index, PartitionUnit::Fiber).unwrap();

        assert_eq!(report.lightest, 0);
        assert_eq!(report.heaviest, 6);
        assert_eq!(report.parts[2].unique, vec![0, 0, 0]);
    }

    #[test]
    fn test_analyze_label_count() {
        let csf = sample();
        let index = PartitionIndex::build(&[0, 0, 0], 1).unwrap();
        let err = analyze(&csf, &index, PartitionUnit::Fiber).unwrap_err();
        assert!(matches!(
            err,
            PartitionError::LabelCount {
                expected: 4,
                got: 3
            }
        ));
    }

    #[test]
    fn test_analyze_needs_two_modes() {
        let coo = CooTensor::new(vec![vec![0, 1]], vec![1.0, 2.0], vec![2]).unwrap();
        let csf = CsfTensor::from_coo(&coo, &[0]).unwrap();
        let index = PartitionIndex::build(&[], 1).unwrap();
        assert!(analyze(&csf, &index, PartitionUnit::Fiber).is_err());
    }

    #[test]
    fn test_kind_parsing() {
        assert_eq!("basic".parse::<StatsKind>().unwrap(), StatsKind::Basic);
        assert_eq!("HPARTS".parse::<StatsKind>().unwrap(), StatsKind::HyperParts);
        let err = "fibers".parse::<StatsKind>().unwrap_err();
        assert!(matches!(err, PartitionError::Unsupported { ref kind } if kind == "fibers"));
    }

    #[test]
    fn test_unit_parsing() {
        assert_eq!("fiber".parse::<PartitionUnit>().unwrap(), PartitionUnit::Fiber);
        assert_eq!("nnz".parse::<PartitionUnit>().unwrap(), PartitionUnit::Nonzero);
        assert!("slice".parse::<PartitionUnit>().is_err());
    }

    #[test]
    fn test_run_stats_requires_partition_file() {
        let coo = CooTensor::new(vec![vec![0], vec![0]], vec![1.0], vec![1, 1]).unwrap();
        let config = StatsConfig {
            kind: StatsKind::HyperParts,
            partition_file: None,
            ..StatsConfig::default()
        };
        let err = run_stats(&config, &coo, None).unwrap_err();
        assert!(matches!(err, PartitionError::Usage { .. }));
    }

    #[test]
    fn test_run_stats_basic() {
        let coo = CooTensor::new(vec![vec![0, 1], vec![1, 0]], vec![1.0, 1.0], vec![2, 2]).unwrap();
        let config = StatsConfig::default();
        match run_stats(&config, &coo, Some("tiny.tns")).unwrap() {
            StatsOutput::Basic(summary) => {
                assert_eq!(summary.file.as_deref(), Some("tiny.tns"));
                assert_eq!(summary.nnz, 2);
                assert!((summary.density - 0.5).abs() < 1e-12);
            }
            other => panic!("unexpected output {:?}", other),
        }
    }
}
