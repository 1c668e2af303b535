//! Little-endian byte sink shared by the file builders.

use gw_common::Precision;

#[derive(Debug, Clone)]
pub(crate) struct Writer {
    precision: Precision,
    buf: Vec<u8>,
}

impl Writer {
    pub(crate) fn new(precision: Precision) -> Self {
        Self {
            precision,
            buf: Vec::new(),
        }
    }

    pub(crate) fn int(&mut self, v: i32) -> &mut Self {
        self.buf.extend_from_slice(&v.to_le_bytes());
        self
    }

    pub(crate) fn real(&mut self, v: f64) -> &mut Self {
        match self.precision {
            Precision::Single => self.buf.extend_from_slice(&(v as f32).to_le_bytes()),
            Precision::Double => self.buf.extend_from_slice(&v.to_le_bytes()),
        }
        self
    }

    pub(crate) fn reals(&mut self, values: &[f64]) -> &mut Self {
        for &v in values {
            self.real(v);
        }
        self
    }

    pub(crate) fn double(&mut self, v: f64) -> &mut Self {
        self.buf.extend_from_slice(&v.to_le_bytes());
        self
    }

    /// Text right-justified and blank-padded to `len` bytes, as MODFLOW writes labels.
    pub(crate) fn text(&mut self, s: &str, len: usize) -> &mut Self {
        let bytes = s.as_bytes();
        let take = bytes.len().min(len);
        self.buf.extend(std::iter::repeat(b' ').take(len - take));
        self.buf.extend_from_slice(&bytes[..take]);
        self
    }

    /// Text left-justified and blank-padded to `len` bytes.
    pub(crate) fn text_left(&mut self, s: &str, len: usize) -> &mut Self {
        let bytes = s.as_bytes();
        let take = bytes.len().min(len);
        self.buf.extend_from_slice(&bytes[..take]);
        self.buf.extend(std::iter::repeat(b' ').take(len - take));
        self
    }

    pub(crate) fn raw(&mut self, bytes: &[u8]) -> &mut Self {
        self.buf.extend_from_slice(bytes);
        self
    }

    pub(crate) fn bytes(&self) -> &[u8] {
        &self.buf
    }
}
