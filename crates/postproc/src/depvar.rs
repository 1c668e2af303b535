//! Interpolating dependent-variable arrays to query points.

use grid_registry::{Grid, GridRegistry};
use gw_common::{
    normalize_label, FactorMethod, PostprocConfig, PostprocError, Precision, QueryPoints, Result,
    Simulator, TimeSeriesTable,
};
use interp_factors::{compute_factors, FactorSet, PointFactors};
use mf_binary::{open_depvar, DepvarHeader};
use serde::Serialize;
use std::path::Path;
use tracing::{debug, info, warn};

/// Per-call options for depvar interpolation.
#[derive(Debug, Clone, PartialEq)]
pub struct DepvarOptions {
    /// Variable label to extract, e.g. `HEAD`; compared trimmed and case-insensitively.
    pub label: String,
    /// Values with an absolute value at or above this are dry.
    pub interp_thresh: f64,
    pub no_interp_value: f64,
    pub reapportion: bool,
    /// Stop after this many output times.
    pub max_times: Option<usize>,
}

impl DepvarOptions {
    pub fn new(label: impl Into<String>) -> Self {
        Self::from_config(label, &PostprocConfig::default())
    }

    pub fn from_config(label: impl Into<String>, config: &PostprocConfig) -> Self {
        Self {
            label: label.into(),
            interp_thresh: config.interp_threshold,
            no_interp_value: config.no_interp_value,
            reapportion: config.reapportion,
            max_times: None,
        }
    }

    pub fn with_max_times(mut self, max_times: usize) -> Self {
        self.max_times = Some(max_times);
        self
    }

    pub fn with_reapportion(mut self, reapportion: bool) -> Self {
        self.reapportion = reapportion;
        self
    }

    fn validate(&self) -> Result<()> {
        if self.label.trim().is_empty() {
            return Err(PostprocError::validation("variable label must not be blank"));
        }
        if !(self.interp_thresh > 0.0) {
            return Err(PostprocError::invalid_parameter(
                "interp_thresh",
                format!("must be positive; got {}", self.interp_thresh),
            ));
        }
        if self.max_times == Some(0) {
            return Err(PostprocError::invalid_parameter("max_times", "must be at least 1"));
        }
        Ok(())
    }
}

/// Interpolated values at query points, one row per output time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DepvarSeries {
    /// `processed x npts` values; times are simulation times.
    pub table: TimeSeriesTable,
    pub steps: Vec<i32>,
    pub periods: Vec<i32>,
    pub processed: usize,
}

/// Weighted value at one point, or `None` when it cannot be formed.
pub fn interpolate_point(
    factors: &PointFactors,
    cells: &[f64],
    interp_thresh: f64,
    reapportion: bool,
) -> Option<f64> {
    if !factors.is_success() {
        return None;
    }
    let mut sum = 0.0;
    let mut wsum = 0.0;
    let mut dry = false;
    for d in &factors.donors {
        let v = cells.get(d.cell).copied().unwrap_or(f64::NAN);
        if v.is_nan() || v.abs() >= interp_thresh {
            dry = true;
        } else {
            sum += v * d.weight;
            wsum += d.weight;
        }
    }
    match (dry, wsum > 0.0) {
        (_, false) => None,
        (true, true) if reapportion => Some(sum / wsum),
        (true, true) => None,
        (false, true) => Some(sum),
    }
}

/// Interpolate one full cell buffer to every point of a factor set.
pub fn apply_factors(factors: &FactorSet, cells: &[f64], options: &DepvarOptions) -> Vec<f64> {
    factors
        .points()
        .iter()
        .map(|p| {
            interpolate_point(p, cells, options.interp_thresh, options.reapportion)
                .unwrap_or(options.no_interp_value)
        })
        .collect()
}

struct TimeAccumulator {
    header: DepvarHeader,
    cells: Vec<f64>,
}

struct SeriesBuilder {
    table: TimeSeriesTable,
    steps: Vec<i32>,
    periods: Vec<i32>,
}

impl SeriesBuilder {
    fn push(
        &mut self,
        acc: TimeAccumulator,
        factors: &FactorSet,
        options: &DepvarOptions,
    ) -> Result<()> {
        let row = apply_factors(factors, &acc.cells, options);
        debug!(
            kstp = acc.header.kstp,
            kper = acc.header.kper,
            totim = acc.header.totim,
            "Interpolated output time"
        );
        self.table.push_row(acc.header.totim, &row)?;
        self.steps.push(acc.header.kstp);
        self.periods.push(acc.header.kper);
        Ok(())
    }

    fn len(&self) -> usize {
        self.steps.len()
    }
}

/// Interpolate every output time of `options.label` in a depvar file.
pub fn interp_from_depvar_file(
    path: impl AsRef<Path>,
    simulator: Simulator,
    precision: Option<Precision>,
    factors: &FactorSet,
    options: &DepvarOptions,
) -> Result<DepvarSeries> {
    options.validate()?;
    let path = path.as_ref();
    let label = normalize_label(&options.label);
    let reader = open_depvar(path, simulator, precision)?;
    let ncells = factors.ncells();

    let mut series = SeriesBuilder {
        table: TimeSeriesTable::new(factors.len()),
        steps: Vec::new(),
        periods: Vec::new(),
    };
    let mut current: Option<TimeAccumulator> = None;
    let mut skipped = 0usize;

    for record in reader {
        let record = record.map_err(|e| e.at(path))?;
        if normalize_label(&record.header.text) != label {
            skipped += 1;
            continue;
        }

        let range = record.header.cell_range();
        if range.end > ncells {
            return Err(PostprocError::file_format(
                path,
                format!(
                    "record at byte {} covers cells {}..{} but the grid has {} cells",
                    record.header.offset,
                    range.start + 1,
                    range.end,
                    ncells
                ),
            ));
        }

        let starts_new_time = current
            .as_ref()
            .map_or(true, |acc| !acc.header.same_time(&record.header));
        if starts_new_time {
            if let Some(acc) = current.take() {
                series.push(acc, factors, options)?;
                if options.max_times.map_or(false, |cap| series.len() >= cap) {
                    break;
                }
            }
            current = Some(TimeAccumulator {
                header: record.header.clone(),
                cells: vec![f64::NAN; ncells],
            });
        }
        if let Some(acc) = current.as_mut() {
            acc.cells[range].copy_from_slice(&record.values());
        }
    }
    if let Some(acc) = current.take() {
        series.push(acc, factors, options)?;
    }

    let processed = series.len();
    if processed == 0 {
        return Err(PostprocError::validation(format!(
            "no '{}' records found in '{}'",
            label,
            path.display()
        )));
    }
    if skipped > 0 {
        debug!(skipped, "Skipped records with other labels");
    }
    info!(
        path = %path.display(),
        label = %label,
        processed,
        npts = factors.len(),
        "Interpolated depvar file"
    );

    Ok(DepvarSeries {
        table: series.table,
        steps: series.steps,
        periods: series.periods,
        processed,
    })
}

/// One-shot bilinear interpolation on an installed structured grid.
///
/// Factors are computed in memory and discarded afterwards.
pub fn interp_from_structured_grid(
    registry: &GridRegistry,
    grid_name: &str,
    path: impl AsRef<Path>,
    simulator: Simulator,
    precision: Option<Precision>,
    points: &QueryPoints,
    options: &DepvarOptions,
) -> Result<DepvarSeries> {
    let installed = registry.get(grid_name)?;
    if !matches!(installed.grid(), Grid::Structured(_)) {
        return Err(PostprocError::validation(format!(
            "grid '{}' is not a structured grid",
            installed.name()
        )));
    }
    let factors = compute_factors(installed, points, FactorMethod::Smooth)?;
    if factors.num_success() < factors.len() {
        warn!(
            grid = %installed.name(),
            failed = factors.len() - factors.num_success(),
            "Some points lie outside the active grid"
        );
    }
    interp_from_depvar_file(path, simulator, precision, &factors, options)
}
