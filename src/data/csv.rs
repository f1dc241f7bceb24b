//! CSV readers for streaming inference input.
//!
//! Headered, comma-separated files. Missing numeric cells (empty, `na`,
//! `nan`) load as NaN and flow through the missingness gate downstream
//! rather than erroring here.

use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use std::str::FromStr;

use crate::spec::Arm;

/// Error reading or parsing a tabular input file.
#[derive(Debug)]
pub enum DataError {
    /// Underlying I/O failure.
    Io(io::Error),
    /// The file has no header line.
    EmptyFile,
    /// A required column is absent from the header.
    MissingColumn {
        /// The column that was looked up.
        name: String,
        /// Columns the header actually declares.
        available: Vec<String>,
    },
    /// A row failed to parse.
    Parse {
        /// 1-based line number.
        line: usize,
        /// What went wrong.
        message: String,
    },
}

impl fmt::Display for DataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "io error: {e}"),
            Self::EmptyFile => write!(f, "input file has no header line"),
            Self::MissingColumn { name, available } => {
                write!(f, "column {name:?} not found; header has {available:?}")
            }
            Self::Parse { line, message } => write!(f, "line {line}: {message}"),
        }
    }
}

impl std::error::Error for DataError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for DataError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

fn split_row(line: &str) -> Vec<&str> {
    line.split(',').map(str::trim).collect()
}

fn header_index(header: &[&str], column: &str) -> Result<usize, DataError> {
    header
        .iter()
        .position(|c| *c == column)
        .ok_or_else(|| DataError::MissingColumn {
            name: column.to_string(),
            available: header.iter().map(|s| s.to_string()).collect(),
        })
}

fn parse_cell(cell: &str, line: usize) -> Result<f64, DataError> {
    if cell.is_empty() || cell.eq_ignore_ascii_case("na") || cell.eq_ignore_ascii_case("nan") {
        return Ok(f64::NAN);
    }
    cell.parse::<f64>().map_err(|_| DataError::Parse {
        line,
        message: format!("expected a number, got {cell:?}"),
    })
}

/// Read one numeric column from a headered CSV file.
///
/// # Errors
///
/// [`DataError`] on I/O failure, missing header or column, or an
/// unparseable non-missing cell.
pub fn read_value_column(path: &Path, column: &str) -> Result<Vec<f64>, DataError> {
    let reader = BufReader::new(File::open(path)?);
    let mut lines = reader.lines();

    let header_line = lines.next().ok_or(DataError::EmptyFile)??;
    let header = split_row(&header_line);
    let idx = header_index(&header, column)?;

    let mut values = Vec::new();
    for (i, line) in lines.enumerate() {
        let line_no = i + 2;
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let row = split_row(&line);
        let cell = row.get(idx).ok_or_else(|| DataError::Parse {
            line: line_no,
            message: format!("row has {} columns, need at least {}", row.len(), idx + 1),
        })?;
        values.push(parse_cell(cell, line_no)?);
    }
    Ok(values)
}

/// Read `(arm, value)` pairs from a headered CSV file.
///
/// # Errors
///
/// As [`read_value_column`]; additionally an arm cell outside `{A, B}` is
/// a parse error.
pub fn read_arm_value_columns(
    path: &Path,
    arm_column: &str,
    value_column: &str,
) -> Result<Vec<(Arm, f64)>, DataError> {
    let reader = BufReader::new(File::open(path)?);
    let mut lines = reader.lines();

    let header_line = lines.next().ok_or(DataError::EmptyFile)??;
    let header = split_row(&header_line);
    let arm_idx = header_index(&header, arm_column)?;
    let value_idx = header_index(&header, value_column)?;

    let mut rows = Vec::new();
    for (i, line) in lines.enumerate() {
        let line_no = i + 2;
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let row = split_row(&line);
        let needed = arm_idx.max(value_idx) + 1;
        if row.len() < needed {
            return Err(DataError::Parse {
                line: line_no,
                message: format!("row has {} columns, need at least {needed}", row.len()),
            });
        }
        let arm = Arm::from_str(row[arm_idx]).map_err(|e| DataError::Parse {
            line: line_no,
            message: e.to_string(),
        })?;
        let value = parse_cell(row[value_idx], line_no)?;
        rows.push((arm, value));
    }
    Ok(rows)
}
