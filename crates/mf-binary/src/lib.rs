//! Decoder for MODFLOW-family binary output files.
//!
//! Two file kinds are supported:
//! - dependent-variable files (heads, drawdown, concentration), one array
//!   record per layer (or node range) per output time;
//! - cell-by-cell flow files, one record per flow term per output time.
//!
//! Files are little-endian streams without Fortran record markers. Readers
//! hold the whole file in a [`bytes::Bytes`] buffer and hand out zero-copy
//! record slices that are decoded to `f64` on demand.

pub mod budget;
pub mod depvar;
pub mod error;
pub mod inquire;
mod reader;

pub use budget::{BudgetHeader, BudgetReader, BudgetRecord, StorageMethod};
pub use depvar::{DepvarHeader, DepvarLayout, DepvarReader, DepvarRecord};
pub use error::{DecodeError, DecodeResult};
pub use inquire::{infer_precision, inquire, load_file, resolve_precision, FileSpecs};
pub use reader::{decode_ints, decode_reals};

use gw_common::{OutputKind, Precision, Result, Simulator};
use std::path::Path;

/// Open a dependent-variable file, inferring precision when not given.
pub fn open_depvar(
    path: impl AsRef<Path>,
    simulator: Simulator,
    precision: Option<Precision>,
) -> Result<DepvarReader> {
    let path = path.as_ref();
    let data = load_file(path)?;
    let precision = resolve_precision(&data, simulator, OutputKind::DependentVariable, precision)
        .map_err(|e| e.at(path))?;
    Ok(DepvarReader::new(data, simulator, precision))
}

/// Open a cell-by-cell flow file, inferring precision when not given.
pub fn open_budget(
    path: impl AsRef<Path>,
    simulator: Simulator,
    precision: Option<Precision>,
) -> Result<BudgetReader> {
    let path = path.as_ref();
    let data = load_file(path)?;
    let precision = resolve_precision(&data, simulator, OutputKind::CellByCellFlow, precision)
        .map_err(|e| e.at(path))?;
    Ok(BudgetReader::new(data, simulator, precision))
}
