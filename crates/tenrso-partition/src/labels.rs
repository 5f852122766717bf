//! Partition label files
//!
//! One non-negative integer per line; line `i` (ignoring blank and `#` comment
//! lines) labels unit `i`. This is the output format of common hypergraph
//! partitioners.

use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use tracing::debug;

use crate::error::{PartitionError, PartitionResult};

/// Read exactly `expected` labels from `reader`.
///
/// # Errors
///
/// - [`PartitionError::Parse`] for a line that is not a non-negative integer
/// - [`PartitionError::LabelCount`] if the file holds more or fewer labels
/// - [`PartitionError::Io`] if reading fails
pub fn read_labels<R: BufRead>(reader: R, expected: usize) -> PartitionResult<Vec<usize>> {
    let mut labels = Vec::with_capacity(expected);

    for (lineno, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let label = trimmed
            .parse::<usize>()
            .map_err(|e| PartitionError::Parse {
                line: lineno + 1,
                reason: format!("'{}': {}", trimmed, e),
            })?;
        labels.push(label);
    }

    if labels.len() != expected {
        return Err(PartitionError::LabelCount {
            expected,
            got: labels.len(),
        });
    }
    Ok(labels)
}

/// Read exactly `expected` labels from the file at `path`.
pub fn read_labels_file<P: AsRef<Path>>(path: P, expected: usize) -> PartitionResult<Vec<usize>> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let labels = read_labels(BufReader::new(file), expected)?;
    debug!(path = %path.display(), nvtxs = labels.len(), "read partition labels");
    Ok(labels)
}

/// Write one label per line.
pub fn write_labels<W: Write>(labels: &[usize], mut writer: W) -> PartitionResult<()> {
    for label in labels {
        writeln!(writer, "{}", label)?;
    }
    writer.flush()?;
    Ok(())
}
