//! Cell-by-cell flow (budget) files.
//!
//! Every record starts with `kstp kper text ndim1 ndim2 ndim3`. A positive
//! `ndim3` means a plain full array follows. A negative `ndim3` marks a
//! compact record with a storage method code and timing information whose
//! layout differs between the classic simulators and MODFLOW 6.

use crate::error::{DecodeError, DecodeResult};
use crate::reader::{decode_ints, decode_reals, Cursor};
use bytes::Bytes;
use gw_common::{Precision, Simulator};
use serde::Serialize;

/// Upper bound on values per list entry; larger counts indicate a misread header.
const MAX_LIST_VALUES: i32 = 1000;

/// How the values of a budget record are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StorageMethod {
    /// Non-compact record: a full 3-D array without timing information.
    FullArray,
    /// Compact full 3-D array (classic 0/1, MODFLOW 6 method 1).
    Array,
    /// List of `(cell, values)` entries (classic 2/5).
    List,
    /// Layer-indicator array plus one layer of values (classic 3).
    LayerIndicator,
    /// One layer of values applied to layer 1 (classic 4).
    LayerOne,
    /// List of `(id1, id2, values)` entries (MODFLOW 6 method 6).
    Mf6List,
}

/// Header of one budget record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetHeader {
    /// Byte position of the header in the file.
    pub offset: usize,
    pub kstp: i32,
    pub kper: i32,
    /// Trimmed flow-term label.
    pub text: String,
    pub ndim1: i32,
    pub ndim2: i32,
    pub ndim3: i32,
    pub method: StorageMethod,
    /// Method code as written in the file; `None` for non-compact records.
    pub method_code: Option<i32>,
    pub delt: f64,
    pub pertim: f64,
    /// Simulation time; -1 when the record does not carry it.
    pub totim: f64,
    /// Number of values per list entry (flow first, then auxiliaries).
    pub nval: usize,
    /// Auxiliary variable names of list records.
    pub aux_names: Vec<String>,
    /// MODFLOW 6 model/package identifiers of list records.
    pub ids: Vec<String>,
    /// Number of list entries; 0 for array records.
    pub nlist: usize,
}

impl BudgetHeader {
    pub fn ncpl(&self) -> usize {
        (self.ndim1 as usize) * (self.ndim2 as usize)
    }

    pub fn nlay(&self) -> usize {
        self.ndim3.unsigned_abs() as usize
    }

    /// Number of cells the record describes: `ndim1 * ndim2 * |ndim3|`.
    pub fn ncells(&self) -> usize {
        self.ncpl() * self.nlay()
    }

    /// Whether two headers belong to the same output time.
    pub fn same_time(&self, other: &BudgetHeader) -> bool {
        self.kstp == other.kstp && self.kper == other.kper
    }
}

#[derive(Debug, Clone)]
enum Payload {
    Array(Bytes),
    List { entries: Bytes, id_count: usize },
    Layer { indicator: Option<Bytes>, values: Bytes },
}

/// One budget record; values are decoded on demand.
#[derive(Debug, Clone)]
pub struct BudgetRecord {
    pub header: BudgetHeader,
    payload: Payload,
    precision: Precision,
}

impl BudgetRecord {
    pub fn precision(&self) -> Precision {
        self.precision
    }

    /// Signed flow contributions as `(0-based cell, value)` pairs.
    ///
    /// Array records yield every cell; list records yield the first value of
    /// each entry against its (first) cell id.
    pub fn flows(&self) -> DecodeResult<Vec<(usize, f64)>> {
        let h = &self.header;
        let ncells = h.ncells();
        let out_of_range = |cell: i64| DecodeError::CellOutOfRange {
            offset: h.offset,
            cell,
            ncells,
        };

        match &self.payload {
            Payload::Array(data) => Ok(decode_reals(data, self.precision)
                .into_iter()
                .enumerate()
                .collect()),
            Payload::Layer { indicator, values } => {
                let ncpl = h.ncpl();
                let values = decode_reals(values, self.precision);
                match indicator {
                    None => Ok(values.into_iter().enumerate().collect()),
                    Some(ind) => decode_ints(ind)
                        .into_iter()
                        .zip(values)
                        .enumerate()
                        .map(|(icpl, (layer, q))| {
                            if layer < 1 || layer as usize > h.nlay() {
                                return Err(out_of_range(
                                    (layer as i64 - 1) * ncpl as i64 + icpl as i64 + 1,
                                ));
                            }
                            Ok(((layer as usize - 1) * ncpl + icpl, q))
                        })
                        .collect(),
                }
            }
            Payload::List { entries, id_count } => {
                let real = self.precision.real_size();
                let stride = 4 * id_count + h.nval * real;
                entries
                    .chunks_exact(stride)
                    .map(|entry| {
                        let id = i32::from_le_bytes([entry[0], entry[1], entry[2], entry[3]]);
                        if id < 1 || id as usize > ncells {
                            return Err(out_of_range(id as i64));
                        }
                        let first = 4 * id_count;
                        let q = decode_reals(&entry[first..first + real], self.precision)[0];
                        Ok((id as usize - 1, q))
                    })
                    .collect()
            }
        }
    }

    /// All values of each list entry (`nlist` rows of `nval`); empty for arrays.
    pub fn list_values(&self) -> Vec<Vec<f64>> {
        match &self.payload {
            Payload::List { entries, id_count } => {
                let stride = 4 * id_count + self.header.nval * self.precision.real_size();
                entries
                    .chunks_exact(stride)
                    .map(|entry| decode_reals(&entry[4 * id_count..], self.precision))
                    .collect()
            }
            _ => Vec::new(),
        }
    }
}

fn implausible(offset: usize, reason: impl Into<String>) -> DecodeError {
    DecodeError::ImplausibleHeader {
        offset,
        reason: reason.into(),
    }
}

fn read_names(c: &mut Cursor, count: usize, what: &str) -> DecodeResult<Vec<String>> {
    (0..count).map(|_| c.label(what)).collect()
}

fn read_list_count(c: &mut Cursor, what: &str) -> DecodeResult<usize> {
    let n = c.int(what)?;
    if !(0..=i32::MAX / 2).contains(&n) {
        return Err(implausible(c.record_start(), format!("{} {}", what, n)));
    }
    Ok(n as usize)
}

fn read_nval(c: &mut Cursor, what: &str) -> DecodeResult<usize> {
    let n = c.int(what)?;
    if !(1..=MAX_LIST_VALUES).contains(&n) {
        return Err(implausible(c.record_start(), format!("{} {}", what, n)));
    }
    Ok(n as usize)
}

pub(crate) fn read_record(c: &mut Cursor, mf6: bool) -> DecodeResult<BudgetRecord> {
    let offset = c.begin_record();
    let precision = c.precision();

    let kstp = c.int("kstp")?;
    let kper = c.int("kper")?;
    let text = c.label("text")?;
    let ndim1 = c.int("ndim1")?;
    let ndim2 = c.int("ndim2")?;
    let ndim3 = c.int("ndim3")?;

    if kstp < 1 || kper < 1 {
        return Err(implausible(
            offset,
            format!("time step {} / stress period {}", kstp, kper),
        ));
    }
    if text.is_empty() {
        return Err(implausible(offset, "blank budget label"));
    }
    if ndim1 < 1 || ndim2 < 1 || ndim3 == 0 {
        return Err(implausible(
            offset,
            format!("dimensions {} {} {}", ndim1, ndim2, ndim3),
        ));
    }

    let mut header = BudgetHeader {
        offset,
        kstp,
        kper,
        text,
        ndim1,
        ndim2,
        ndim3,
        method: StorageMethod::FullArray,
        method_code: None,
        delt: -1.0,
        pertim: -1.0,
        totim: -1.0,
        nval: 1,
        aux_names: Vec::new(),
        ids: Vec::new(),
        nlist: 0,
    };
    let ncpl = header.ncpl();
    let ncells = ncpl
        .checked_mul(header.nlay())
        .ok_or_else(|| implausible(offset, "cell count overflows"))?;

    if ndim3 > 0 {
        let data = c.reals(ncells, "full array")?;
        return Ok(BudgetRecord {
            header,
            payload: Payload::Array(data),
            precision,
        });
    }

    let code = c.int("method")?;
    header.method_code = Some(code);
    header.delt = c.real("delt")?;
    header.pertim = c.real("pertim")?;
    header.totim = c.real("totim")?;
    if !header.delt.is_finite() || !header.pertim.is_finite() || !header.totim.is_finite() {
        return Err(implausible(offset, "non-finite timing values"));
    }

    let payload = match (mf6, code) {
        (false, 0) | (false, 1) | (true, 1) => {
            header.method = StorageMethod::Array;
            Payload::Array(c.reals(ncells, "array data")?)
        }
        (false, 2) | (false, 5) => {
            header.method = StorageMethod::List;
            if code == 5 {
                header.nval = read_nval(c, "nval")?;
                header.aux_names = read_names(c, header.nval - 1, "aux name")?;
            }
            header.nlist = read_list_count(c, "nlist")?;
            let stride = 4 + header.nval * precision.real_size();
            let entries = c.take(header.nlist * stride, "list entries")?;
            Payload::List {
                entries,
                id_count: 1,
            }
        }
        (false, 3) => {
            header.method = StorageMethod::LayerIndicator;
            let indicator = c.take(ncpl * 4, "layer indicator")?;
            let values = c.reals(ncpl, "layer values")?;
            Payload::Layer {
                indicator: Some(indicator),
                values,
            }
        }
        (false, 4) => {
            header.method = StorageMethod::LayerOne;
            Payload::Layer {
                indicator: None,
                values: c.reals(ncpl, "layer values")?,
            }
        }
        (true, 6) => {
            header.method = StorageMethod::Mf6List;
            header.ids = read_names(c, 4, "identifier")?;
            header.nval = read_nval(c, "ndat")?;
            header.aux_names = read_names(c, header.nval - 1, "aux name")?;
            header.nlist = read_list_count(c, "nlist")?;
            let stride = 8 + header.nval * precision.real_size();
            let entries = c.take(header.nlist * stride, "list entries")?;
            Payload::List {
                entries,
                id_count: 2,
            }
        }
        (_, code) => return Err(DecodeError::UnknownMethod { offset, code }),
    };

    Ok(BudgetRecord {
        header,
        payload,
        precision,
    })
}

/// Iterator over the records of a budget file, in file order.
///
/// Yields `None` at end of data; after an error it is exhausted.
#[derive(Debug, Clone)]
pub struct BudgetReader {
    cursor: Cursor,
    mf6: bool,
    failed: bool,
}

impl BudgetReader {
    pub fn new(data: Bytes, simulator: Simulator, precision: Precision) -> Self {
        Self {
            cursor: Cursor::new(data, precision),
            mf6: simulator.is_mf6(),
            failed: false,
        }
    }

    pub fn precision(&self) -> Precision {
        self.cursor.precision()
    }
}

impl Iterator for BudgetReader {
    type Item = DecodeResult<BudgetRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.cursor.is_at_end() {
            return None;
        }
        let result = read_record(&mut self.cursor, self.mf6);
        if result.is_err() {
            self.failed = true;
        }
        Some(result)
    }
}

impl std::iter::FusedIterator for BudgetReader {}
