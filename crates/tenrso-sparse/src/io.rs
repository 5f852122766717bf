//! Coordinate (`.tns`) text format support
//!
//! Each non-zero occupies one line: `nmodes` whitespace-separated 1-based indices
//! followed by the value. Lines starting with `#` and blank lines are ignored.
//! The mode count is taken from the first data line.
//!
//! ```text
//! # 2x3x2 tensor
//! 1 1 1 1.5
//! 2 3 1 -0.25
//! ```
//!
//! # Examples
//!
//! ```rust
//! use tenrso_sparse::{io, CooTensor};
//! use std::io::Cursor;
//!
//! let coo = CooTensor::new(vec![vec![0, 1], vec![2, 0]], vec![1.0, 2.0], vec![2, 3]).unwrap();
//!
//! let mut output = Vec::new();
//! io::write_tns(&coo, &mut output).unwrap();
//!
//! let back = io::read_tns::<f64, _>(Cursor::new(output), None).unwrap();
//! assert_eq!(back.nnz(), 2);
//! assert_eq!(back.shape(), &[2, 3]);
//! ```

use std::fmt::Display;
use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use std::str::FromStr;

use crate::error::{IndexError, ParseError, SparseError, SparseResult};
use crate::CooTensor;

/// Read a coordinate tensor.
///
/// `shape` fixes the mode extents; when `None` each extent is the largest index
/// seen in that mode.
pub fn read_tns<T, R>(reader: R, shape: Option<&[usize]>) -> SparseResult<CooTensor<T>>
where
    T: Clone + FromStr,
    R: BufRead,
{
    let mut inds: Vec<Vec<usize>> = Vec::new();
    let mut vals = Vec::new();

    for (lineno, line) in reader.lines().enumerate() {
        let line = line?;
        let line_num = lineno + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = trimmed.split_whitespace().collect();
        if inds.is_empty() {
            if fields.len() < 2 {
                return Err(SparseError::malformed(
                    line_num,
                    "expected at least one index and a value",
                ));
            }
            inds = vec![Vec::new(); fields.len() - 1];
        }
        if fields.len() != inds.len() + 1 {
            return Err(ParseError::FieldCount {
                line: line_num,
                expected: inds.len() + 1,
                got: fields.len(),
            }
            .into());
        }

        let (value_field, index_fields) = match fields.split_last() {
            Some(parts) => parts,
            None => continue,
        };
        for (ind, field) in inds.iter_mut().zip(index_fields) {
            let index: usize = field.parse().map_err(|_| {
                SparseError::malformed(line_num, format!("invalid index '{}'", field))
            })?;
            if index == 0 {
                return Err(IndexError::ZeroBased { line: line_num }.into());
            }
            ind.push(index - 1);
        }
        let value = value_field.parse::<T>().map_err(|_| {
            SparseError::malformed(line_num, format!("invalid value '{}'", value_field))
        })?;
        vals.push(value);
    }

    if inds.is_empty() {
        return Err(ParseError::Empty.into());
    }

    let shape = match shape {
        Some(shape) => shape.to_vec(),
        None => inds
            .iter()
            .map(|ind| ind.iter().copied().max().map_or(1, |m| m + 1))
            .collect(),
    };

    CooTensor::new(inds, vals, shape)
}

/// Read a coordinate tensor from a file path.
pub fn read_tns_file<T, P>(path: P, shape: Option<&[usize]>) -> SparseResult<CooTensor<T>>
where
    T: Clone + FromStr,
    P: AsRef<Path>,
{
    let file = File::open(path)?;
    read_tns(BufReader::new(file), shape)
}

/// Write a coordinate tensor, one 1-based line per non-zero.
pub fn write_tns<T, W>(coo: &CooTensor<T>, mut writer: W) -> SparseResult<()>
where
    T: Clone + Display,
    W: Write,
{
    for i in 0..coo.nnz() {
        for ind in coo.inds() {
            write!(writer, "{} ", ind[i] + 1)?;
        }
        writeln!(writer, "{}", coo.vals()[i])?;
    }
    writer.flush()?;
    Ok(())
}
