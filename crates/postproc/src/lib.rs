//! Post-processing of MODFLOW-family model output.
//!
//! - [`depvar`]: interpolate head/concentration arrays to query points using
//!   precomputed factors
//! - [`zonebudget`]: sum a cell-by-cell flow term over user zones
//! - [`temporal`]: resample the resulting series to observation times
//!
//! [`PostProcessor`] bundles these with a grid registry and configured defaults.

pub mod depvar;
pub mod processor;
pub mod temporal;
pub mod zonebudget;

pub use depvar::{
    apply_factors, interp_from_depvar_file, interp_from_structured_grid, interpolate_point,
    DepvarOptions, DepvarSeries,
};
pub use processor::{Factors, PostProcessor};
pub use temporal::{interp_to_obstime, ResampleOptions};
pub use zonebudget::{extract_flows_from_cbc_file, ZoneBudget};

pub use grid_registry::{GridSummary, StructuredGridSpec, VertexGridSpec};
pub use gw_common::{
    ErrorKind, ExtrapolationMethod, FactorFileFormat, FactorMethod, OriginCorner, OutputKind,
    PostprocConfig, PostprocError, Precision, QueryPoint, QueryPoints, Result, Simulator,
    TimeSeriesTable,
};
pub use interp_factors::FactorSet;
pub use mf_binary::FileSpecs;
