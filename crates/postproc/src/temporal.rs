//! Resampling simulated time series to observation times.

use gw_common::{ExtrapolationMethod, PostprocConfig, PostprocError, Result, TimeSeriesTable};
use tracing::debug;

/// Options for [`interp_to_obstime`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResampleOptions {
    /// Values with an absolute value at or above this are missing.
    pub interp_thresh: f64,
    pub extrapolation: ExtrapolationMethod,
    /// Largest distance beyond the first or last valid sample that may be extrapolated.
    pub time_extrap: f64,
    pub no_interp_value: f64,
}

impl Default for ResampleOptions {
    fn default() -> Self {
        Self::from_config(&PostprocConfig::default())
    }
}

impl ResampleOptions {
    pub fn from_config(config: &PostprocConfig) -> Self {
        Self {
            interp_thresh: config.interp_threshold,
            extrapolation: config.extrapolation,
            time_extrap: config.time_extrap,
            no_interp_value: config.no_interp_value,
        }
    }

    fn validate(&self) -> Result<()> {
        if !(self.interp_thresh > 0.0) {
            return Err(PostprocError::invalid_parameter(
                "interp_thresh",
                format!("must be positive; got {}", self.interp_thresh),
            ));
        }
        if !self.time_extrap.is_finite() || self.time_extrap < 0.0 {
            return Err(PostprocError::invalid_parameter(
                "time_extrap",
                format!("must be >= 0; got {}", self.time_extrap),
            ));
        }
        Ok(())
    }
}

/// A valid `(time, value)` sample.
type Sample = (f64, f64);

fn lerp(a: Sample, b: Sample, t: f64) -> f64 {
    a.1 + (b.1 - a.1) * (t - a.0) / (b.0 - a.0)
}

/// Value of a column at time `t`, or `None` when it cannot be formed.
fn sample_at(samples: &[Sample], t: f64, options: &ResampleOptions) -> Option<f64> {
    let (first, last) = match (samples.first(), samples.last()) {
        (Some(&first), Some(&last)) => (first, last),
        _ => return None,
    };

    if t < first.0 {
        if first.0 - t > options.time_extrap {
            return None;
        }
        return match (options.extrapolation, samples.get(1)) {
            (ExtrapolationMethod::Linear, Some(&second)) => Some(lerp(first, second, t)),
            _ => Some(first.1),
        };
    }
    if t > last.0 {
        if t - last.0 > options.time_extrap {
            return None;
        }
        let n = samples.len();
        return match options.extrapolation {
            ExtrapolationMethod::Linear if n >= 2 => Some(lerp(samples[n - 2], last, t)),
            _ => Some(last.1),
        };
    }

    // first.0 <= t <= last.0
    let hi = samples.partition_point(|s| s.0 < t);
    let upper = samples[hi];
    if upper.0 == t {
        return Some(upper.1);
    }
    Some(lerp(samples[hi - 1], upper, t))
}

/// Resample columns of `table` to `(point_index, time)` requests.
///
/// Only the first `nproc` rows are used and their times must increase
/// strictly. A point index of -1 yields the sentinel.
pub fn interp_to_obstime(
    table: &TimeSeriesTable,
    nproc: usize,
    options: &ResampleOptions,
    requests: &[(i32, f64)],
) -> Result<Vec<f64>> {
    options.validate()?;
    if nproc > table.nrows() {
        return Err(PostprocError::validation(format!(
            "nproc {} exceeds the {} rows of the table",
            nproc,
            table.nrows()
        )));
    }
    let times = &table.times()[..nproc];
    if let Some(i) = (1..times.len()).find(|&i| !(times[i] > times[i - 1])) {
        return Err(PostprocError::validation(format!(
            "simulation times must increase; row {} has {} after {}",
            i + 1,
            times[i],
            times[i - 1]
        )));
    }
    let ncols = table.ncols();

    let mut out = Vec::with_capacity(requests.len());
    let mut cached: Option<(usize, Vec<Sample>)> = None;
    for (iobs, &(ipt, t)) in requests.iter().enumerate() {
        if ipt == -1 {
            out.push(options.no_interp_value);
            continue;
        }
        if ipt < 0 || ipt as usize >= ncols {
            return Err(PostprocError::validation(format!(
                "observation {} refers to point {} but only {} points exist",
                iobs + 1,
                ipt,
                ncols
            )));
        }
        if !t.is_finite() {
            return Err(PostprocError::validation(format!(
                "observation {} has a non-finite time",
                iobs + 1
            )));
        }

        let col = ipt as usize;
        if cached.as_ref().map_or(true, |(c, _)| *c != col) {
            let samples: Vec<Sample> = (0..nproc)
                .filter_map(|row| table.get(row, col).map(|v| (times[row], v)))
                .filter(|&(_, v)| !v.is_nan() && v.abs() < options.interp_thresh)
                .collect();
            cached = Some((col, samples));
        }
        let samples = cached.as_ref().map_or(&[][..], |(_, s)| s.as_slice());
        out.push(sample_at(samples, t, options).unwrap_or(options.no_interp_value));
    }

    debug!(
        requests = requests.len(),
        columns = ncols,
        nproc,
        "Resampled to observation times"
    );
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SENTINEL: f64 = -999.0;

    fn options(extrapolation: ExtrapolationMethod, time_extrap: f64) -> ResampleOptions {
        ResampleOptions {
            interp_thresh: 1.0e20,
            extrapolation,
            time_extrap,
            no_interp_value: SENTINEL,
        }
    }

    /// Two columns: a line 10 + t and a column with a dry middle row.
    fn table() -> TimeSeriesTable {
        TimeSeriesTable::from_rows(
            vec![1.0, 2.0, 4.0],
            2,
            vec![11.0, 5.0, 12.0, 1.0e30, 14.0, 9.0],
        )
        .unwrap()
    }

    #[test]
    fn test_exact_and_interior() {
        let t = table();
        for method in [ExtrapolationMethod::Linear, ExtrapolationMethod::Constant] {
            let requests = [(0, 2.0), (0, 3.0), (1, 2.0), (1, 4.0)];
            let out = interp_to_obstime(&t, 3, &options(method, 0.0), &requests).unwrap();
            assert_eq!(out[0], 12.0);
            assert_eq!(out[1], 13.0);
            // The dry sample is skipped: 5 at t=1 and 9 at t=4.
            assert!((out[2] - 19.0 / 3.0).abs() < 1e-12);
            assert_eq!(out[3], 9.0);
        }
    }

    #[test]
    fn test_extrapolation_window() {
        let t = table();
        let linear = options(ExtrapolationMethod::Linear, 1.0);
        let linear = interp_to_obstime(&t, 3, &linear, &[(0, 5.0), (0, 0.5), (0, 5.5)]).unwrap();
        assert_eq!(linear, vec![15.0, 10.5, SENTINEL]);

        let constant = options(ExtrapolationMethod::Constant, 1.0);
        let constant = interp_to_obstime(&t, 3, &constant, &[(0, 5.0), (0, 0.5)]).unwrap();
        assert_eq!(constant, vec![14.0, 11.0]);
    }

    #[test]
    fn test_nproc_limits_rows() {
        let t = table();
        let opts = options(ExtrapolationMethod::Constant, 0.5);
        let out = interp_to_obstime(&t, 2, &opts, &[(0, 2.5), (0, 3.0)]).unwrap();
        assert_eq!(out, vec![12.0, SENTINEL]);
    }

    #[test]
    fn test_single_sample_holds() {
        let t = TimeSeriesTable::from_rows(vec![1.0, 2.0], 1, vec![1.0e30, 7.0]).unwrap();
        let opts = options(ExtrapolationMethod::Linear, 2.0);
        let out = interp_to_obstime(&t, 2, &opts, &[(0, 0.5), (0, 3.0), (0, 4.5)]).unwrap();
        assert_eq!(out, vec![7.0, 7.0, SENTINEL]);
    }

    #[test]
    fn test_no_valid_samples_and_minus_one() {
        let t = TimeSeriesTable::from_rows(vec![1.0], 1, vec![f64::NAN]).unwrap();
        let opts = options(ExtrapolationMethod::Linear, 10.0);
        let out = interp_to_obstime(&t, 1, &opts, &[(0, 1.0), (-1, 1.0)]).unwrap();
        assert_eq!(out, vec![SENTINEL, SENTINEL]);
    }

    #[test]
    fn test_invalid_requests() {
        let t = table();
        let opts = options(ExtrapolationMethod::Linear, 0.0);
        assert!(interp_to_obstime(&t, 3, &opts, &[(2, 1.0)]).is_err());
        assert!(interp_to_obstime(&t, 3, &opts, &[(-2, 1.0)]).is_err());
        assert!(interp_to_obstime(&t, 4, &opts, &[(0, 1.0)]).is_err());
        let negative = options(ExtrapolationMethod::Linear, -1.0);
        assert!(interp_to_obstime(&t, 3, &negative, &[]).is_err());

        let unordered = TimeSeriesTable::from_rows(vec![2.0, 1.0], 1, vec![1.0, 2.0]).unwrap();
        assert!(interp_to_obstime(&unordered, 2, &opts, &[(0, 1.5)]).is_err());
    }
}
