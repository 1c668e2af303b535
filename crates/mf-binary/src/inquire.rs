//! File inspection: precision inference, record counts and header tables.

use crate::budget::{BudgetHeader, BudgetReader};
use crate::depvar::{DepvarHeader, DepvarLayout, DepvarReader};
use crate::error::{DecodeError, DecodeResult};
use bytes::Bytes;
use gw_common::{OutputKind, PostprocError, Precision, Result, Simulator};
use serde::Serialize;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::{debug, info};

/// Summary of a binary output file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileSpecs {
    pub simulator: Simulator,
    pub kind: OutputKind,
    pub precision: Precision,
    /// Number of records (arrays or budget terms).
    pub num_arrays: usize,
    /// Number of distinct output times.
    pub num_times: usize,
    /// Distinct variable or flow-term labels in first-seen order.
    pub var_types: Vec<String>,
}

/// Read a whole file into a shared buffer.
pub fn load_file(path: impl AsRef<Path>) -> Result<Bytes> {
    let path = path.as_ref();
    let data = std::fs::read(path).map_err(|e| PostprocError::io(path, e))?;
    Ok(Bytes::from(data))
}

fn scan_depvar(
    data: &Bytes,
    simulator: Simulator,
    precision: Precision,
) -> DecodeResult<Vec<DepvarHeader>> {
    DepvarReader::new(data.clone(), simulator, precision)
        .map(|r| r.map(|rec| rec.header))
        .collect()
}

fn scan_budget(
    data: &Bytes,
    simulator: Simulator,
    precision: Precision,
) -> DecodeResult<Vec<BudgetHeader>> {
    BudgetReader::new(data.clone(), simulator, precision)
        .map(|r| r.map(|rec| rec.header))
        .collect()
}

/// Determine the precision of a file by scanning it completely.
///
/// Single precision is tried first. A precision is accepted only when every
/// header decodes plausibly and the last record ends exactly at end of file.
pub fn infer_precision(
    data: &Bytes,
    simulator: Simulator,
    kind: OutputKind,
) -> DecodeResult<Precision> {
    if data.is_empty() {
        return Err(DecodeError::UnknownPrecision("file contains no records".to_string()));
    }

    let mut reasons = Vec::new();
    for precision in [Precision::Single, Precision::Double] {
        let scanned = match kind {
            OutputKind::DependentVariable => {
                scan_depvar(data, simulator, precision).map(|h| h.len())
            }
            OutputKind::CellByCellFlow => {
                scan_budget(data, simulator, precision).map(|h| h.len())
            }
        };
        match scanned {
            Ok(n) if n > 0 => {
                debug!(%precision, records = n, "Precision inferred");
                return Ok(precision);
            }
            Ok(_) => reasons.push(format!("{}: no records", precision)),
            Err(e) => reasons.push(format!("{}: {}", precision, e)),
        }
    }
    Err(DecodeError::UnknownPrecision(reasons.join("; ")))
}

/// Use the given precision or infer it from the file contents.
pub fn resolve_precision(
    data: &Bytes,
    simulator: Simulator,
    kind: OutputKind,
    precision: Option<Precision>,
) -> DecodeResult<Precision> {
    match precision {
        Some(p) => Ok(p),
        None => infer_precision(data, simulator, kind),
    }
}

fn distinct_labels<'a>(labels: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for label in labels {
        if !seen.iter().any(|s| s == label) {
            seen.push(label.to_string());
        }
    }
    seen
}

fn count_groups<T>(items: &[T], same: impl Fn(&T, &T) -> bool) -> usize {
    if items.is_empty() {
        return 0;
    }
    1 + items.windows(2).filter(|w| !same(&w[0], &w[1])).count()
}

fn write_depvar_table(w: &mut impl Write, headers: &[DepvarHeader]) -> std::io::Result<()> {
    let layout = headers.first().map(|h| h.layout).unwrap_or(DepvarLayout::Layered);
    match layout {
        DepvarLayout::Layered => writeln!(
            w,
            "{:>8} {:>8} {:>8} {:>16} {:>16} {:>16} {:>8} {:>8} {:>6}",
            "record", "kstp", "kper", "pertim", "totim", "text", "ncol", "nrow", "ilay"
        )?,
        DepvarLayout::NodeRange => writeln!(
            w,
            "{:>8} {:>8} {:>8} {:>16} {:>16} {:>16} {:>8} {:>8} {:>6}",
            "record", "kstp", "kper", "pertim", "totim", "text", "nstrt", "nend", "ilay"
        )?,
        DepvarLayout::Mt3d => writeln!(
            w,
            "{:>8} {:>8} {:>8} {:>8} {:>16} {:>16} {:>8} {:>8} {:>6}",
            "record", "ntrans", "kstp", "kper", "time", "text", "ncol", "nrow", "ilay"
        )?,
    }
    for (i, h) in headers.iter().enumerate() {
        match h.layout {
            DepvarLayout::Mt3d => writeln!(
                w,
                "{:>8} {:>8} {:>8} {:>8} {:>16} {:>16} {:>8} {:>8} {:>6}",
                i + 1,
                h.ntrans,
                h.kstp,
                h.kper,
                h.totim,
                h.text,
                h.dim1,
                h.dim2,
                h.ilay
            )?,
            _ => writeln!(
                w,
                "{:>8} {:>8} {:>8} {:>16} {:>16} {:>16} {:>8} {:>8} {:>6}",
                i + 1,
                h.kstp,
                h.kper,
                h.pertim,
                h.totim,
                h.text,
                h.dim1,
                h.dim2,
                h.ilay
            )?,
        }
    }
    Ok(())
}

fn write_budget_table(w: &mut impl Write, headers: &[BudgetHeader]) -> std::io::Result<()> {
    writeln!(
        w,
        "{:>8} {:>8} {:>8} {:>16} {:>8} {:>8} {:>8} {:>6} {:>16} {:>16} {:>16} {:>8}",
        "record", "kstp", "kper", "text", "ndim1", "ndim2", "ndim3", "method", "delt", "pertim",
        "totim", "nlist"
    )?;
    for (i, h) in headers.iter().enumerate() {
        let method = h
            .method_code
            .map_or_else(|| "-".to_string(), |c| c.to_string());
        writeln!(
            w,
            "{:>8} {:>8} {:>8} {:>16} {:>8} {:>8} {:>8} {:>6} {:>16} {:>16} {:>16} {:>8}",
            i + 1,
            h.kstp,
            h.kper,
            h.text,
            h.ndim1,
            h.ndim2,
            h.ndim3,
            method,
            h.delt,
            h.pertim,
            h.totim,
            h.nlist
        )?;
    }
    Ok(())
}

fn write_table(
    path: &Path,
    write: impl FnOnce(&mut BufWriter<std::fs::File>) -> std::io::Result<()>,
) -> Result<()> {
    let file = std::fs::File::create(path).map_err(|e| PostprocError::io(path, e))?;
    let mut w = BufWriter::new(file);
    write(&mut w).map_err(|e| PostprocError::io(path, e))?;
    w.flush().map_err(|e| PostprocError::io(path, e))?;
    Ok(())
}

/// Inspect a depvar or budget file.
///
/// When `table_path` is given, a text table with one line per record header
/// is written there.
pub fn inquire(
    path: impl AsRef<Path>,
    simulator: Simulator,
    kind: OutputKind,
    precision: Option<Precision>,
    table_path: Option<&Path>,
) -> Result<FileSpecs> {
    let path = path.as_ref();
    let data = load_file(path)?;
    let precision = resolve_precision(&data, simulator, kind, precision).map_err(|e| e.at(path))?;

    let specs = match kind {
        OutputKind::DependentVariable => {
            let headers = scan_depvar(&data, simulator, precision).map_err(|e| e.at(path))?;
            if let Some(table) = table_path {
                write_table(table, |w| write_depvar_table(w, &headers))?;
            }
            FileSpecs {
                simulator,
                kind,
                precision,
                num_arrays: headers.len(),
                num_times: count_groups(&headers, |a, b| a.same_time(b)),
                var_types: distinct_labels(headers.iter().map(|h| h.text.as_str())),
            }
        }
        OutputKind::CellByCellFlow => {
            let headers = scan_budget(&data, simulator, precision).map_err(|e| e.at(path))?;
            if let Some(table) = table_path {
                write_table(table, |w| write_budget_table(w, &headers))?;
            }
            FileSpecs {
                simulator,
                kind,
                precision,
                num_arrays: headers.len(),
                num_times: count_groups(&headers, |a, b| a.same_time(b)),
                var_types: distinct_labels(headers.iter().map(|h| h.text.as_str())),
            }
        }
    };

    info!(
        path = %path.display(),
        %precision,
        num_arrays = specs.num_arrays,
        num_times = specs.num_times,
        "Inspected binary file"
    );
    Ok(specs)
}
