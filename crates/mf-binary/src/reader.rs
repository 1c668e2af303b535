//! Little-endian cursor over a whole-file buffer.

use crate::error::{DecodeError, DecodeResult};
use bytes::{Buf, Bytes};
use gw_common::{Precision, LABEL_LEN};

/// Sequential reader used by the record parsers.
///
/// All reads are bounds-checked; running past the end is reported as a
/// truncated record starting at `record_start`.
#[derive(Debug, Clone)]
pub(crate) struct Cursor {
    buf: Bytes,
    len: usize,
    precision: Precision,
    record_start: usize,
}

impl Cursor {
    pub(crate) fn new(data: Bytes, precision: Precision) -> Self {
        let len = data.len();
        Self {
            buf: data,
            len,
            precision,
            record_start: 0,
        }
    }

    pub(crate) fn position(&self) -> usize {
        self.len - self.buf.remaining()
    }

    pub(crate) fn is_at_end(&self) -> bool {
        !self.buf.has_remaining()
    }

    pub(crate) fn precision(&self) -> Precision {
        self.precision
    }

    /// Mark the start of a new record for error reporting.
    pub(crate) fn begin_record(&mut self) -> usize {
        self.record_start = self.position();
        self.record_start
    }

    pub(crate) fn record_start(&self) -> usize {
        self.record_start
    }

    fn need(&self, n: usize, what: &str) -> DecodeResult<()> {
        if self.buf.remaining() < n {
            return Err(DecodeError::Truncated {
                offset: self.record_start,
                what: format!(
                    "{} needs {} bytes but only {} remain",
                    what,
                    n,
                    self.buf.remaining()
                ),
            });
        }
        Ok(())
    }

    pub(crate) fn int(&mut self, what: &str) -> DecodeResult<i32> {
        self.need(4, what)?;
        Ok(self.buf.get_i32_le())
    }

    pub(crate) fn real(&mut self, what: &str) -> DecodeResult<f64> {
        match self.precision {
            Precision::Single => {
                self.need(4, what)?;
                Ok(self.buf.get_f32_le() as f64)
            }
            Precision::Double => {
                self.need(8, what)?;
                Ok(self.buf.get_f64_le())
            }
        }
    }

    /// A 16-character label, trimmed.
    pub(crate) fn label(&mut self, what: &str) -> DecodeResult<String> {
        let raw = self.take(LABEL_LEN, what)?;
        if let Some(bad) = raw.iter().find(|b| !(0x20..=0x7e).contains(*b)) {
            return Err(DecodeError::ImplausibleHeader {
                offset: self.record_start,
                reason: format!("{} contains non-printable byte 0x{:02x}", what, bad),
            });
        }
        Ok(String::from_utf8_lossy(&raw).trim().to_string())
    }

    /// Zero-copy slice of the next `n` bytes.
    pub(crate) fn take(&mut self, n: usize, what: &str) -> DecodeResult<Bytes> {
        self.need(n, what)?;
        Ok(self.buf.split_to(n))
    }

    /// Zero-copy slice holding `count` reals.
    pub(crate) fn reals(&mut self, count: usize, what: &str) -> DecodeResult<Bytes> {
        let n = count
            .checked_mul(self.precision.real_size())
            .ok_or_else(|| DecodeError::ImplausibleHeader {
                offset: self.record_start,
                reason: format!("{} count {} overflows", what, count),
            })?;
        self.take(n, what)
    }
}

/// Decode a slice of little-endian reals.
pub fn decode_reals(data: &[u8], precision: Precision) -> Vec<f64> {
    match precision {
        Precision::Single => data
            .chunks_exact(4)
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]) as f64)
            .collect(),
        Precision::Double => data
            .chunks_exact(8)
            .map(|c| f64::from_le_bytes([c[0], c[1], c[2], c[3], c[4], c[5], c[6], c[7]]))
            .collect(),
    }
}

/// Decode a slice of little-endian 4-byte integers.
pub fn decode_ints(data: &[u8]) -> Vec<i32> {
    data.chunks_exact(4)
        .map(|c| i32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect()
}
