//! Dependent-variable files: heads, drawdown, concentration.

use crate::error::{DecodeError, DecodeResult};
use crate::reader::{decode_reals, Cursor};
use bytes::Bytes;
use gw_common::{Precision, Simulator};
use serde::Serialize;
use std::ops::Range;

/// Header layout of a depvar record, which depends on the simulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DepvarLayout {
    /// `kstp kper pertim totim text ncol nrow ilay`
    Layered,
    /// `kstp kper pertim totim text nstrt nend ilay`
    NodeRange,
    /// `ntrans kstp kper time text ncol nrow ilay`
    Mt3d,
}

impl DepvarLayout {
    pub fn for_simulator(simulator: Simulator) -> Self {
        match simulator {
            Simulator::Mt3d => Self::Mt3d,
            Simulator::UsgUnstructured => Self::NodeRange,
            _ => Self::Layered,
        }
    }
}

/// Header of one depvar record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DepvarHeader {
    /// Byte position of the header in the file.
    pub offset: usize,
    /// MT3D transport step; 0 for flow simulators.
    pub ntrans: i32,
    pub kstp: i32,
    pub kper: i32,
    /// Time within the stress period; -1 when the file does not record it.
    pub pertim: f64,
    pub totim: f64,
    /// Trimmed variable label.
    pub text: String,
    /// `ncol` (or `nstrt` for node-range records).
    pub dim1: i32,
    /// `nrow` (or `nend` for node-range records).
    pub dim2: i32,
    pub ilay: i32,
    pub layout: DepvarLayout,
}

impl DepvarHeader {
    /// Number of values following the header.
    pub fn len(&self) -> usize {
        match self.layout {
            DepvarLayout::NodeRange => (self.dim2 - self.dim1 + 1) as usize,
            _ => (self.dim1 as usize) * (self.dim2 as usize),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 0-based range of grid cells covered by the record.
    pub fn cell_range(&self) -> Range<usize> {
        let start = match self.layout {
            DepvarLayout::NodeRange => (self.dim1 - 1) as usize,
            _ => (self.ilay as usize - 1).saturating_mul(self.len()),
        };
        start..start.saturating_add(self.len())
    }

    /// Whether two headers belong to the same output time.
    pub fn same_time(&self, other: &DepvarHeader) -> bool {
        self.kstp == other.kstp
            && self.kper == other.kper
            && self.ntrans == other.ntrans
            && self.totim == other.totim
    }
}

/// One depvar record; values are decoded on demand.
#[derive(Debug, Clone)]
pub struct DepvarRecord {
    pub header: DepvarHeader,
    data: Bytes,
    precision: Precision,
}

impl DepvarRecord {
    pub fn values(&self) -> Vec<f64> {
        decode_reals(&self.data, self.precision)
    }

    /// Raw little-endian array bytes.
    pub fn raw(&self) -> &Bytes {
        &self.data
    }

    pub fn precision(&self) -> Precision {
        self.precision
    }
}

fn implausible(offset: usize, reason: String) -> DecodeError {
    DecodeError::ImplausibleHeader { offset, reason }
}

pub(crate) fn read_header(c: &mut Cursor, layout: DepvarLayout) -> DecodeResult<DepvarHeader> {
    let offset = c.begin_record();

    let (ntrans, kstp, kper, pertim, totim) = match layout {
        DepvarLayout::Mt3d => {
            let ntrans = c.int("ntrans")?;
            let kstp = c.int("kstp")?;
            let kper = c.int("kper")?;
            let time = c.real("time")?;
            (ntrans, kstp, kper, -1.0, time)
        }
        _ => {
            let kstp = c.int("kstp")?;
            let kper = c.int("kper")?;
            let pertim = c.real("pertim")?;
            let totim = c.real("totim")?;
            (0, kstp, kper, pertim, totim)
        }
    };
    let text = c.label("text")?;
    let dim1 = c.int("dim1")?;
    let dim2 = c.int("dim2")?;
    let ilay = c.int("ilay")?;

    if kstp < 1 || kper < 1 || ntrans < 0 {
        return Err(implausible(
            offset,
            format!("time step {} / stress period {} / transport step {}", kstp, kper, ntrans),
        ));
    }
    if !totim.is_finite() || !pertim.is_finite() {
        return Err(implausible(offset, "non-finite time".to_string()));
    }
    if text.is_empty() {
        return Err(implausible(offset, "blank variable label".to_string()));
    }
    let dims_ok = match layout {
        DepvarLayout::NodeRange => dim1 >= 1 && dim2 >= dim1,
        _ => dim1 >= 1 && dim2 >= 1,
    };
    if !dims_ok || ilay < 1 {
        return Err(implausible(
            offset,
            format!("dimensions {} {} layer {}", dim1, dim2, ilay),
        ));
    }

    Ok(DepvarHeader {
        offset,
        ntrans,
        kstp,
        kper,
        pertim,
        totim,
        text,
        dim1,
        dim2,
        ilay,
        layout,
    })
}

/// Iterator over the records of a depvar file, in file order.
///
/// Yields `None` at end of data; after an error it is exhausted.
#[derive(Debug, Clone)]
pub struct DepvarReader {
    cursor: Cursor,
    layout: DepvarLayout,
    failed: bool,
}

impl DepvarReader {
    pub fn new(data: Bytes, simulator: Simulator, precision: Precision) -> Self {
        Self {
            cursor: Cursor::new(data, precision),
            layout: DepvarLayout::for_simulator(simulator),
            failed: false,
        }
    }

    pub fn precision(&self) -> Precision {
        self.cursor.precision()
    }

    pub fn layout(&self) -> DepvarLayout {
        self.layout
    }

    fn next_record(&mut self) -> DecodeResult<DepvarRecord> {
        let header = read_header(&mut self.cursor, self.layout)?;
        let data = self.cursor.reals(header.len(), "array data")?;
        Ok(DepvarRecord {
            header,
            data,
            precision: self.cursor.precision(),
        })
    }
}

impl Iterator for DepvarReader {
    type Item = DecodeResult<DepvarRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.cursor.is_at_end() {
            return None;
        }
        let result = self.next_record();
        if result.is_err() {
            self.failed = true;
        }
        Some(result)
    }
}

impl std::iter::FusedIterator for DepvarReader {}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::HeadFileBuilder;

    #[test]
    fn test_layered_records() {
        let bytes = HeadFileBuilder::new(Precision::Single)
            .time_step(1, 1, 10.0, 10.0, "HEAD", 2, 2, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0])
            .build();
        let records: Vec<_> =
            DepvarReader::new(Bytes::from(bytes), Simulator::Modflow, Precision::Single)
                .collect::<Result<_, _>>()
                .unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].header.ilay, 2);
        assert_eq!(records[1].header.cell_range(), 4..8);
        assert_eq!(records[1].values(), vec![5.0, 6.0, 7.0, 8.0]);
        assert!(records[0].header.same_time(&records[1].header));
    }

    #[test]
    fn test_node_range_records() {
        let bytes = HeadFileBuilder::new(Precision::Double)
            .node_range(1, 1, 1.0, 1.0, "HEADU", 4, 6, 2, &[1.0, 2.0, 3.0])
            .build();
        let mut reader =
            DepvarReader::new(Bytes::from(bytes), Simulator::UsgUnstructured, Precision::Double);
        let record = reader.next().unwrap().unwrap();
        assert_eq!(record.header.cell_range(), 3..6);
        assert!(reader.next().is_none());
    }

    #[test]
    fn test_mt3d_records() {
        let bytes = HeadFileBuilder::new(Precision::Single)
            .mt3d_layer(3, 1, 2, 36.5, "CONCENTRATION", 2, 1, 1, &[0.1, 0.2])
            .build();
        let record = DepvarReader::new(Bytes::from(bytes), Simulator::Mt3d, Precision::Single)
            .next()
            .unwrap()
            .unwrap();
        assert_eq!(record.header.ntrans, 3);
        assert_eq!(record.header.kper, 2);
        assert_eq!(record.header.totim, 36.5);
        assert_eq!(record.header.pertim, -1.0);
        assert_eq!(record.header.text, "CONCENTRATION");
    }

    #[test]
    fn test_truncated_record_fuses() {
        let bytes = HeadFileBuilder::new(Precision::Single)
            .layer(1, 1, 1.0, 1.0, "HEAD", 2, 1, 1, &[1.0, 2.0])
            .build();
        let cut = Bytes::from(bytes[..bytes.len() - 2].to_vec());
        let mut reader = DepvarReader::new(cut, Simulator::Modflow, Precision::Single);
        assert!(matches!(reader.next(), Some(Err(DecodeError::Truncated { .. }))));
        assert!(reader.next().is_none());
    }
}
