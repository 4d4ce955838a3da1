//! CSV loading for point sets and weight matrices
//!
//! Supports files where:
//! - Every non-empty line is one row of comma separated numbers
//! - Lines starting with `#` are comments
//! - The first row can be headers (automatically detected)

use crate::core::{KernelError, Result};
use crate::data::BatchedDataset;
use ndarray::Array2;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Load a dense matrix from a CSV file
pub fn read_matrix_file<P: AsRef<Path>>(path: P) -> Result<Array2<f64>> {
    let file = File::open(path).map_err(KernelError::IoError)?;
    read_matrix(BufReader::new(file))
}

/// Load a dense matrix from a reader
///
/// Only the first non-comment line may be a header. All rows must have the
/// same number of columns.
pub fn read_matrix<R: BufRead>(reader: R) -> Result<Array2<f64>> {
    let mut values = Vec::new();
    let mut columns: Option<usize> = None;
    let mut rows = 0;
    let mut first_line = true;

    for (line_number, line) in reader.lines().enumerate() {
        let line = line.map_err(KernelError::IoError)?;
        let line = line.trim();

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if first_line {
            first_line = false;
            if is_header_line(line) {
                continue;
            }
        }

        let row = parse_row(line, line_number + 1)?;
        match columns {
            None => columns = Some(row.len()),
            Some(expected) if expected != row.len() => {
                return Err(KernelError::ParseError(format!(
                    "line {}: expected {} columns, found {}",
                    line_number + 1,
                    expected,
                    row.len()
                )));
            }
            Some(_) => {}
        }
        values.extend(row);
        rows += 1;
    }

    let columns = columns.ok_or(KernelError::EmptyDataset)?;
    Array2::from_shape_vec((rows, columns), values)
        .map_err(|e| KernelError::ParseError(e.to_string()))
}

/// Load a batched point set from a CSV file, one point per row
pub fn load_dataset<P: AsRef<Path>>(path: P, batch_size: usize) -> Result<BatchedDataset> {
    let file = File::open(path).map_err(KernelError::IoError)?;
    load_dataset_from_reader(BufReader::new(file), batch_size)
}

/// Load a batched point set from a reader, one point per row
pub fn load_dataset_from_reader<R: BufRead>(
    reader: R,
    batch_size: usize,
) -> Result<BatchedDataset> {
    let points = read_matrix(reader)?;
    BatchedDataset::from_array(points, batch_size)
}

/// Check if a line appears to be a header: no field parses as a number
fn is_header_line(line: &str) -> bool {
    line.split(',')
        .all(|field| field.trim().parse::<f64>().is_err())
}

fn parse_row(line: &str, line_number: usize) -> Result<Vec<f64>> {
    line.split(',')
        .map(|field| {
            let field = field.trim();
            field.parse::<f64>().map_err(|_| {
                KernelError::ParseError(format!(
                    "line {line_number}: invalid number '{field}'"
                ))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Dataset;
    use ndarray::array;
    use std::io::Cursor;

    #[test]
    fn test_read_matrix_with_header() {
        let data = "x1,x2,x3\n1.0,2.0,3.0\n-1.0,0.5,0.0\n";
        let matrix = read_matrix(Cursor::new(data)).unwrap();
        assert_eq!(matrix, array![[1.0, 2.0, 3.0], [-1.0, 0.5, 0.0]]);
    }

    #[test]
    fn test_read_matrix_without_header() {
        let data = "# weights\n1,2\n\n2, 1\n";
        let matrix = read_matrix(Cursor::new(data)).unwrap();
        assert_eq!(matrix, array![[1.0, 2.0], [2.0, 1.0]]);
    }

    #[test]
    fn test_ragged_rows() {
        let data = "1,2\n3\n";
        match read_matrix(Cursor::new(data)) {
            Err(KernelError::ParseError(msg)) => assert!(msg.contains("line 2")),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_invalid_number_after_first_row() {
        let data = "1,2\n3,abc\n";
        assert!(matches!(
            read_matrix(Cursor::new(data)),
            Err(KernelError::ParseError(_))
        ));
    }

    #[test]
    fn test_invalid_first_row_is_not_a_header() {
        let data = "1.0,2.x\n3.0,4.0\n5.0,6.0\n";
        match read_matrix(Cursor::new(data)) {
            Err(KernelError::ParseError(msg)) => {
                assert!(msg.contains("line 1"), "unexpected message: {msg}")
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_only_one_header_line() {
        let data = "x,y\nfoo,bar\n3.0,4.0\n";
        match read_matrix(Cursor::new(data)) {
            Err(KernelError::ParseError(msg)) => {
                assert!(msg.contains("line 2"), "unexpected message: {msg}")
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_header_after_comment() {
        let data = "# exported points\nx,y\n1.0,2.0\n";
        let matrix = read_matrix(Cursor::new(data)).unwrap();
        assert_eq!(matrix, array![[1.0, 2.0]]);
    }

    #[test]
    fn test_empty_input() {
        assert!(matches!(
            read_matrix(Cursor::new("# nothing here\n")),
            Err(KernelError::EmptyDataset)
        ));
    }

    #[test]
    fn test_load_dataset_from_reader() {
        let data = "a,b\n0.1,0.2\n0.3,0.4\n0.5,0.6\n";
        let dataset = load_dataset_from_reader(Cursor::new(data), 2).unwrap();
        assert_eq!(dataset.len(), 3);
        assert_eq!(dataset.dim(), 2);
        assert_eq!(dataset.number_of_batches(), 2);
        assert_eq!(dataset.point(2), array![0.5, 0.6]);
    }
}
