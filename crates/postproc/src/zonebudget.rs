//! Accumulating cell-by-cell flow terms into zones.

use gw_common::{normalize_label, PostprocError, Precision, Result, Simulator, TimeSeriesTable};
use mf_binary::open_budget;
use serde::Serialize;
use std::path::Path;
use tracing::{debug, info};

/// Flow of one budget term summed per zone, one row per output time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZoneBudget {
    /// Ascending distinct non-zero zone ids of the zone map; the table columns.
    pub zone_numbers: Vec<i32>,
    pub steps: Vec<i32>,
    pub periods: Vec<i32>,
    /// Simulation time per row, or -1 where the file does not record it.
    pub table: TimeSeriesTable,
}

impl ZoneBudget {
    pub fn processed(&self) -> usize {
        self.steps.len()
    }

    /// Zone ids with any non-zero accumulated flow.
    pub fn active_zones(&self) -> Vec<i32> {
        self.zone_numbers
            .iter()
            .enumerate()
            .filter(|&(col, _)| {
                self.table
                    .column(col)
                    .map_or(false, |flows| flows.iter().any(|&q| q != 0.0))
            })
            .map(|(_, &zone)| zone)
            .collect()
    }

    /// Flows of one zone id over time.
    pub fn zone_flows(&self, zone: i32) -> Option<Vec<f64>> {
        let col = self.zone_numbers.binary_search(&zone).ok()?;
        self.table.column(col)
    }
}

/// Distinct non-zero zone ids in ascending order.
fn zone_numbers(zones: &[i32]) -> Result<Vec<i32>> {
    if let Some((cell, &z)) = zones.iter().enumerate().find(|(_, &z)| z < 0) {
        return Err(PostprocError::validation(format!(
            "zone map entry {} is negative ({})",
            cell + 1,
            z
        )));
    }
    let mut ids: Vec<i32> = zones.iter().copied().filter(|&z| z != 0).collect();
    ids.sort_unstable();
    ids.dedup();
    Ok(ids)
}

struct ZoneRow {
    kstp: i32,
    kper: i32,
    totim: f64,
    flows: Vec<f64>,
}

/// Sum the flow term `label` into the zones of `zones` for every output time.
///
/// `zones` holds one id per model cell; `nzone` is an upper bound on the
/// number of distinct non-zero ids.
#[allow(clippy::too_many_arguments)]
pub fn extract_flows_from_cbc_file(
    path: impl AsRef<Path>,
    simulator: Simulator,
    precision: Option<Precision>,
    label: &str,
    zones: &[i32],
    nzone: usize,
    max_times: Option<usize>,
) -> Result<ZoneBudget> {
    let path = path.as_ref();
    if label.trim().is_empty() {
        return Err(PostprocError::validation("flow-term label must not be blank"));
    }
    if zones.is_empty() {
        return Err(PostprocError::validation("zone map must not be empty"));
    }
    if max_times == Some(0) {
        return Err(PostprocError::invalid_parameter("max_times", "must be at least 1"));
    }
    let numbers = zone_numbers(zones)?;
    if numbers.len() > nzone {
        return Err(PostprocError::validation(format!(
            "zone map has {} distinct non-zero zones, more than nzone = {}",
            numbers.len(),
            nzone
        )));
    }
    // Column of each cell, or None for zone 0.
    let columns: Vec<Option<usize>> = zones
        .iter()
        .map(|&z| if z == 0 { None } else { numbers.binary_search(&z).ok() })
        .collect();

    let label = normalize_label(label);
    let reader = open_budget(path, simulator, precision)?;

    let mut rows: Vec<ZoneRow> = Vec::new();
    for record in reader {
        let record = record.map_err(|e| e.at(path))?;
        let h = &record.header;
        if normalize_label(&h.text) != label {
            continue;
        }
        if h.ncells() != zones.len() {
            return Err(PostprocError::validation(format!(
                "zone map has {} entries but '{}' describes {} cells",
                zones.len(),
                path.display(),
                h.ncells()
            )));
        }

        let same_time = rows
            .last()
            .map_or(false, |row| row.kstp == h.kstp && row.kper == h.kper);
        if !same_time {
            if max_times.map_or(false, |cap| rows.len() >= cap) {
                break;
            }
            rows.push(ZoneRow {
                kstp: h.kstp,
                kper: h.kper,
                totim: h.totim,
                flows: vec![0.0; numbers.len()],
            });
        }
        let row = match rows.last_mut() {
            Some(row) => row,
            None => continue,
        };

        let flows = record.flows().map_err(|e| e.at(path))?;
        debug!(
            kstp = h.kstp,
            kper = h.kper,
            method = ?h.method,
            entries = flows.len(),
            "Accumulating budget record"
        );
        for (cell, q) in flows {
            if let Some(col) = columns[cell] {
                row.flows[col] += q;
            }
        }
    }

    if rows.is_empty() {
        return Err(PostprocError::validation(format!(
            "no '{}' records found in '{}'",
            label,
            path.display()
        )));
    }

    let mut table = TimeSeriesTable::new(numbers.len());
    let mut steps = Vec::with_capacity(rows.len());
    let mut periods = Vec::with_capacity(rows.len());
    for row in &rows {
        table.push_row(row.totim, &row.flows)?;
        steps.push(row.kstp);
        periods.push(row.kper);
    }

    info!(
        path = %path.display(),
        label = %label,
        zones = numbers.len(),
        processed = rows.len(),
        "Extracted zone flows"
    );
    Ok(ZoneBudget {
        zone_numbers: numbers,
        steps,
        periods,
        table,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zone_numbers_sorted_distinct() {
        assert_eq!(zone_numbers(&[0, 7, 3, 7, 0, 3, 10]).unwrap(), vec![3, 7, 10]);
        assert!(zone_numbers(&[1, -2]).is_err());
        assert!(zone_numbers(&[0, 0]).unwrap().is_empty());
    }

    #[test]
    fn test_active_zones() {
        let budget = ZoneBudget {
            zone_numbers: vec![1, 2, 5],
            steps: vec![1, 2],
            periods: vec![1, 1],
            table: TimeSeriesTable::from_rows(
                vec![1.0, 2.0],
                3,
                vec![0.0, 1.5, 0.0, 0.0, 0.0, -2.0],
            )
            .unwrap(),
        };
        assert_eq!(budget.active_zones(), vec![2, 5]);
        assert_eq!(budget.zone_flows(5), Some(vec![0.0, -2.0]));
        assert_eq!(budget.zone_flows(3), None);
        assert_eq!(budget.processed(), 2);
    }
}
