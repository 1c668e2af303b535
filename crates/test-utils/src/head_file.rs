//! Builder for synthetic dependent-variable files (heads, drawdown, concentration).
//!
//! Records are written exactly as MODFLOW does: a header followed by the
//! array, no Fortran record markers.

use crate::writer::Writer;
use gw_common::Precision;
use std::path::Path;

/// Builder that accumulates depvar records in memory.
///
/// # Example
///
/// ```
/// use gw_common::Precision;
/// use test_utils::HeadFileBuilder;
///
/// let bytes = HeadFileBuilder::new(Precision::Single)
///     .layer(1, 1, 1.0, 1.0, "HEAD", 2, 1, 1, &[10.0, 11.0])
///     .build();
/// // 2 i4 + 2 reals + 16 label + 3 i4 + 2 reals
/// assert_eq!(bytes.len(), 8 + 8 + 16 + 12 + 8);
/// ```
#[derive(Debug, Clone)]
pub struct HeadFileBuilder {
    w: Writer,
}

impl HeadFileBuilder {
    pub fn new(precision: Precision) -> Self {
        Self {
            w: Writer::new(precision),
        }
    }

    /// One layer record in the MODFLOW / USG-structured / MODFLOW 6 layout.
    #[allow(clippy::too_many_arguments)]
    pub fn layer(
        mut self,
        kstp: i32,
        kper: i32,
        pertim: f64,
        totim: f64,
        text: &str,
        ncol: i32,
        nrow: i32,
        ilay: i32,
        values: &[f64],
    ) -> Self {
        assert_eq!(values.len(), (ncol * nrow) as usize, "layer record size");
        self.w
            .int(kstp)
            .int(kper)
            .real(pertim)
            .real(totim)
            .text(text, 16)
            .int(ncol)
            .int(nrow)
            .int(ilay)
            .reals(values);
        self
    }

    /// One record per layer for a full 3-D array (layer-major values).
    #[allow(clippy::too_many_arguments)]
    pub fn time_step(
        mut self,
        kstp: i32,
        kper: i32,
        pertim: f64,
        totim: f64,
        text: &str,
        ncol: i32,
        nrow: i32,
        values: &[f64],
    ) -> Self {
        let ncpl = (ncol * nrow) as usize;
        assert_eq!(values.len() % ncpl, 0, "values must cover whole layers");
        for (ilay, chunk) in values.chunks(ncpl).enumerate() {
            self = self.layer(kstp, kper, pertim, totim, text, ncol, nrow, ilay as i32 + 1, chunk);
        }
        self
    }

    /// One record in the MODFLOW-USG unstructured layout covering nodes `nstrt..=nend`.
    #[allow(clippy::too_many_arguments)]
    pub fn node_range(
        mut self,
        kstp: i32,
        kper: i32,
        pertim: f64,
        totim: f64,
        text: &str,
        nstrt: i32,
        nend: i32,
        ilay: i32,
        values: &[f64],
    ) -> Self {
        assert_eq!(values.len(), (nend - nstrt + 1) as usize, "node range size");
        self.w
            .int(kstp)
            .int(kper)
            .real(pertim)
            .real(totim)
            .text(text, 16)
            .int(nstrt)
            .int(nend)
            .int(ilay)
            .reals(values);
        self
    }

    /// One record in the MT3D layout.
    #[allow(clippy::too_many_arguments)]
    pub fn mt3d_layer(
        mut self,
        ntrans: i32,
        kstp: i32,
        kper: i32,
        time: f64,
        text: &str,
        ncol: i32,
        nrow: i32,
        ilay: i32,
        values: &[f64],
    ) -> Self {
        assert_eq!(values.len(), (ncol * nrow) as usize, "layer record size");
        self.w
            .int(ntrans)
            .int(kstp)
            .int(kper)
            .real(time)
            .text(text, 16)
            .int(ncol)
            .int(nrow)
            .int(ilay)
            .reals(values);
        self
    }

    /// Append raw bytes, e.g. to simulate trailing garbage.
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
