//! Interpolation factors from scattered query points to model grid cells.
//!
//! Factors are computed once against an installed grid, persisted as an
//! ASCII or binary factor file plus a BLN boundary file, and then reused to
//! interpolate any number of model output arrays.

pub mod boundary;
pub mod calculator;
pub mod factor_file;
pub mod types;

pub use boundary::{donor_polygon, write_boundary_file};
pub use calculator::{compute_factors, point_factors};
pub use factor_file::{read_factor_file, write_factor_file};
pub use types::{Donor, FactorSet, PointFactors, WEIGHT_EPS};

use grid_registry::GridRegistry;
use gw_common::{FactorFileFormat, FactorMethod, QueryPoints, Result};
use std::path::Path;
use tracing::info;

/// Compute factors for `points` on the grid `grid_name` and persist them.
///
/// Writes the factor file in `format` to `factor_path` and the donor
/// footprints to `boundary_path`. The returned set also carries the
/// per-point success flags.
pub fn calc_interp_factors(
    registry: &GridRegistry,
    grid_name: &str,
    points: &QueryPoints,
    method: FactorMethod,
    factor_path: impl AsRef<Path>,
    format: FactorFileFormat,
    boundary_path: impl AsRef<Path>,
) -> Result<FactorSet> {
    let installed = registry.get(grid_name)?;
    let set = compute_factors(installed, points, method)?;

    write_factor_file(factor_path.as_ref(), &set, format)?;
    write_boundary_file(boundary_path.as_ref(), installed.grid(), &set)?;

    info!(
        grid = %installed.name(),
        npts = set.len(),
        succeeded = set.num_success(),
        factor_file = %factor_path.as_ref().display(),
        "Interpolation factors ready"
    );
    Ok(set)
}
