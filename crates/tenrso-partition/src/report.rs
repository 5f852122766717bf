//! Plain-text rendering of statistics
//!
//! ```text
//! Tensor information ---------------------------------------------
//! FILE=nell-2.tns
//! DIMS=12092x9184x28818 NNZ=76879419 DENSITY=2.403251e-05
//! ```

use std::fmt;

use crate::stats::{PartitionReport, StatsOutput, TensorSummary};

const TENSOR_RULE: &str = "Tensor information ---------------------------------------------";
const PARTITION_RULE: &str = "Partition information ------------------------------------------";

/// Format like C's `%e`: six fractional digits and a signed two-digit exponent.
pub fn format_exp(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let formatted = format!("{:.6e}", value);
    match formatted.split_once('e') {
        Some((mantissa, exp)) => match exp.parse::<i32>() {
            Ok(exp) => format!(
                "{}e{}{:02}",
                mantissa,
                if exp < 0 { '-' } else { '+' },
                exp.abs()
            ),
            Err(_) => formatted,
        },
        None => formatted,
    }
}

/// Column labels of the tree levels; three-mode tensors use the classic `I K J`
fn level_labels(nmodes: usize) -> Vec<String> {
    if nmodes == 3 {
        vec!["I".into(), "K".into(), "J".into()]
    } else {
        (0..nmodes).map(|l| format!("M{}", l)).collect()
    }
}

fn join_dims(dims: &[usize]) -> String {
    dims.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("x")
}

impl fmt::Display for TensorSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", TENSOR_RULE)?;
        writeln!(f, "FILE={}", self.file.as_deref().unwrap_or("-"))?;
        writeln!(
            f,
            "DIMS={} NNZ={} DENSITY={}",
            join_dims(&self.dims),
            self.nnz,
            format_exp(self.density)
        )?;
        writeln!(f)
    }
}

impl fmt::Display for PartitionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", PARTITION_RULE)?;
        writeln!(f, "FILE={}", self.file.as_deref().unwrap_or("-"))?;
        writeln!(f, "NVTXS={} NHEDGES={}", self.nvtxs, self.nhedges)?;
        writeln!(
            f,
            "NPARTS={} LIGHTEST={} HEAVIEST={} AVG={:.1}",
            self.nparts, self.lightest, self.heaviest, self.avg
        )?;
        writeln!(f)?;

        let labels = level_labels(self.dim_perms.len());
        for part in &self.parts {
            write!(
                f,
                "{}  fibs: {}({:4.1}%)  nnz: {} ({:4.1}%)",
                part.id, part.fib_count, part.fib_pct, part.nnz, part.nnz_pct
            )?;
            for ((label, count), pct) in labels.iter().zip(&part.unique).zip(&part.unique_pct) {
                write!(f, "  {}: {} ({:4.1}%)", label, count, pct)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl fmt::Display for StatsOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatsOutput::Basic(summary) => fmt::Display::fmt(summary, f),
            StatsOutput::HyperParts(report) => fmt::Display::fmt(report, f),
        }
    }
}
