//! Builder for synthetic cell-by-cell flow (budget) files.

use crate::writer::Writer;
use gw_common::Precision;
use std::path::Path;

/// Timing values written in a compact budget header.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BudgetTiming {
    pub delt: f64,
    pub pertim: f64,
    pub totim: f64,
}

impl BudgetTiming {
    pub fn new(delt: f64, pertim: f64, totim: f64) -> Self {
        Self { delt, pertim, totim }
    }
}

/// Grid dimensions written in a budget header: `(ndim1, ndim2, nlay)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BudgetDims {
    pub ncol: i32,
    pub nrow: i32,
    pub nlay: i32,
}

impl BudgetDims {
    pub fn new(ncol: i32, nrow: i32, nlay: i32) -> Self {
        Self { ncol, nrow, nlay }
    }

    pub fn ncells(&self) -> usize {
        (self.ncol * self.nrow * self.nlay) as usize
    }
}

/// Builder that accumulates budget records in memory.
///
/// Classic methods write the MODFLOW-2005/USG layout; `mf6_*` methods write
/// the MODFLOW 6 layout.
#[derive(Debug, Clone)]
pub struct BudgetFileBuilder {
    w: Writer,
}

impl BudgetFileBuilder {
    pub fn new(precision: Precision) -> Self {
        Self {
            w: Writer::new(precision),
        }
    }

    fn header(&mut self, kstp: i32, kper: i32, text: &str, dims: BudgetDims, compact: bool) {
        let ndim3 = if compact { -dims.nlay } else { dims.nlay };
        self.w
            .int(kstp)
            .int(kper)
            .text(text, 16)
            .int(dims.ncol)
            .int(dims.nrow)
            .int(ndim3);
    }

    fn compact(&mut self, code: i32, timing: BudgetTiming) {
        self.w
            .int(code)
            .real(timing.delt)
            .real(timing.pertim)
            .real(timing.totim);
    }

    /// Non-compact full 3-D array (time is not recorded).
    pub fn full_array(
        mut self,
        kstp: i32,
        kper: i32,
        text: &str,
        dims: BudgetDims,
        values: &[f64],
    ) -> Self {
        assert_eq!(values.len(), dims.ncells(), "full array size");
        self.header(kstp, kper, text, dims, false);
        self.w.reals(values);
        self
    }

    /// Compact full 3-D array (`itype` 1).
    pub fn compact_array(
        mut self,
        kstp: i32,
        kper: i32,
        text: &str,
        dims: BudgetDims,
        timing: BudgetTiming,
        values: &[f64],
    ) -> Self {
        assert_eq!(values.len(), dims.ncells(), "compact array size");
        self.header(kstp, kper, text, dims, true);
        self.compact(1, timing);
        self.w.reals(values);
        self
    }

    /// Compact list of `(1-based cell, flow)` entries (`itype` 2).
    pub fn compact_list(
        mut self,
        kstp: i32,
        kper: i32,
        text: &str,
        dims: BudgetDims,
        timing: BudgetTiming,
        entries: &[(i32, f64)],
    ) -> Self {
        self.header(kstp, kper, text, dims, true);
        self.compact(2, timing);
        self.w.int(entries.len() as i32);
        for &(icell, q) in entries {
            self.w.int(icell).real(q);
        }
        self
    }

    /// Compact list with auxiliary values (`itype` 5); each entry is
    /// `(1-based cell, [flow, aux...])`.
    #[allow(clippy::too_many_arguments)]
    pub fn compact_list_aux(
        mut self,
        kstp: i32,
        kper: i32,
        text: &str,
        dims: BudgetDims,
        timing: BudgetTiming,
        aux_names: &[&str],
        entries: &[(i32, Vec<f64>)],
    ) -> Self {
        self.header(kstp, kper, text, dims, true);
        self.compact(5, timing);
        self.w.int(aux_names.len() as i32 + 1);
        for name in aux_names {
            self.w.text_left(name, 16);
        }
        self.w.int(entries.len() as i32);
        for (icell, vals) in entries {
            assert_eq!(vals.len(), aux_names.len() + 1, "entry width");
            self.w.int(*icell).reals(vals);
        }
        self
    }

    /// Layer-indicator array plus one layer of values (`itype` 3).
    pub fn layer_indicator(
        mut self,
        kstp: i32,
        kper: i32,
        text: &str,
        dims: BudgetDims,
        timing: BudgetTiming,
        layers: &[i32],
        values: &[f64],
    ) -> Self {
        let ncpl = (dims.ncol * dims.nrow) as usize;
        assert_eq!(layers.len(), ncpl, "layer indicator size");
        assert_eq!(values.len(), ncpl, "layer value size");
        self.header(kstp, kper, text, dims, true);
        self.compact(3, timing);
        for &l in layers {
            self.w.int(l);
        }
        self.w.reals(values);
        self
    }

    /// One layer of values applied to layer 1 (`itype` 4).
    pub fn layer_one(
        mut self,
        kstp: i32,
        kper: i32,
        text: &str,
        dims: BudgetDims,
        timing: BudgetTiming,
        values: &[f64],
    ) -> Self {
        assert_eq!(values.len(), (dims.ncol * dims.nrow) as usize, "layer value size");
        self.header(kstp, kper, text, dims, true);
        self.compact(4, timing);
        self.w.reals(values);
        self
    }

    /// MODFLOW 6 full array (`imeth` 1).
    pub fn mf6_array(
        mut self,
        kstp: i32,
        kper: i32,
        text: &str,
        dims: BudgetDims,
        timing: BudgetTiming,
        values: &[f64],
    ) -> Self {
        assert_eq!(values.len(), dims.ncells(), "mf6 array size");
        self.header(kstp, kper, text, dims, true);
        self.compact(1, timing);
        self.w.reals(values);
        self
    }

    /// MODFLOW 6 list (`imeth` 6); each entry is `(id1, id2, [flow, aux...])`.
    #[allow(clippy::too_many_arguments)]
    pub fn mf6_list(
        mut self,
        kstp: i32,
        kper: i32,
        text: &str,
        dims: BudgetDims,
        timing: BudgetTiming,
        ids: [&str; 4],
        aux_names: &[&str],
        entries: &[(i32, i32, Vec<f64>)],
    ) -> Self {
        self.header(kstp, kper, text, dims, true);
        self.compact(6, timing);
        for id in ids {
            self.w.text_left(id, 16);
        }
        self.w.int(aux_names.len() as i32 + 1);
        for name in aux_names {
            self.w.text_left(name, 16);
        }
        self.w.int(entries.len() as i32);
        for (id1, id2, vals) in entries {
            assert_eq!(vals.len(), aux_names.len() + 1, "entry width");
            self.w.int(*id1).int(*id2).reals(vals);
        }
        self
    }

    /// Append raw bytes, e.g. an unsupported method code.
    pub fn raw(mut self, bytes: &[u8]) -> Self {
        self.w.raw(bytes);
        self
    }

    pub fn build(&self) -> Vec<u8> {
        self.w.bytes().to_vec()
    }

    pub fn write_to(&self, path: &Path) -> anyhow::Result<()> {
        std::fs::write(path, self.w.bytes())?;
        Ok(())
    }
}
