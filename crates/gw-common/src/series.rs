//! Processed time series: a time vector plus a (time x column) value matrix.

use crate::error::{PostprocError, Result};
use serde::{Deserialize, Serialize};

/// Time-indexed table of values, one column per point or zone.
///
/// Values are stored row-major: `values[row * ncols + col]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesTable {
    times: Vec<f64>,
    ncols: usize,
    values: Vec<f64>,
}

impl TimeSeriesTable {
    /// Create an empty table with `ncols` columns.
    pub fn new(ncols: usize) -> Self {
        Self {
            times: Vec::new(),
            ncols,
            values: Vec::new(),
        }
    }

    /// Build a table from a time vector and row-major values.
    pub fn from_rows(times: Vec<f64>, ncols: usize, values: Vec<f64>) -> Result<Self> {
        if values.len() != times.len() * ncols {
            return Err(PostprocError::validation(format!(
                "expected {} values for {} times x {} columns; found {}",
                times.len() * ncols,
                times.len(),
                ncols,
                values.len()
            )));
        }
        Ok(Self {
            times,
            ncols,
            values,
        })
    }

    /// Append one row.
    pub fn push_row(&mut self, time: f64, row: &[f64]) -> Result<()> {
        if row.len() != self.ncols {
            return Err(PostprocError::validation(format!(
                "expected row of {} values; found {}",
                self.ncols,
                row.len()
            )));
        }
        self.times.push(time);
        self.values.extend_from_slice(row);
        Ok(())
    }

    pub fn times(&self) -> &[f64] {
        &self.times
    }

    pub fn nrows(&self) -> usize {
        self.times.len()
    }

    pub fn ncols(&self) -> usize {
        self.ncols
    }

    /// Matrix shape as (rows, columns).
    pub fn shape(&self) -> (usize, usize) {
        (self.times.len(), self.ncols)
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row >= self.nrows() || col >= self.ncols {
            return None;
        }
        self.values.get(row * self.ncols + col).copied()
    }

    pub fn row(&self, row: usize) -> Option<&[f64]> {
        if row >= self.nrows() {
            return None;
        }
        Some(&self.values[row * self.ncols..(row + 1) * self.ncols])
    }

    /// Copy out one column.
    pub fn column(&self, col: usize) -> Option<Vec<f64>> {
        if col >= self.ncols {
            return None;
        }
        Some(
            (0..self.nrows())
                .map(|row| self.values[row * self.ncols + col])
                .collect(),
        )
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_access() {
        let mut table = TimeSeriesTable::new(2);
        table.push_row(1.0, &[10.0, 20.0]).unwrap();
        table.push_row(2.0, &[11.0, 21.0]).unwrap();

        assert_eq!(table.shape(), (2, 2));
        assert_eq!(table.get(1, 0), Some(11.0));
        assert_eq!(table.row(0), Some(&[10.0, 20.0][..]));
        assert_eq!(table.column(1), Some(vec![20.0, 21.0]));
        assert_eq!(table.get(2, 0), None);
        assert!(table.push_row(3.0, &[1.0]).is_err());
    }

    #[test]
    fn test_from_rows_checks_shape() {
        assert!(TimeSeriesTable::from_rows(vec![1.0, 2.0], 2, vec![0.0; 3]).is_err());
        let table = TimeSeriesTable::from_rows(vec![1.0, 2.0], 2, vec![0.0; 4]).unwrap();
        assert_eq!(table.nrows(), 2);
    }
}
