//! MODFLOW 6 binary grid file (`.grb`) reader.
//!
//! Layout: four 50-byte text lines (`GRID <type>`, `VERSION`, `NTXT`,
//! `LENTXT`), then `NTXT` definition lines of `LENTXT` bytes each
//! (`NAME TYPE NDIM n dim...`), then the arrays in definition order.

use crate::registry::{Grid, GridRegistry, GridSummary};
use crate::structured::{StructuredGrid, StructuredGridSpec};
use crate::vertex::{VertexGrid, VertexGridSpec};
use bytes::{Buf, Bytes};
use gw_common::{OriginCorner, PostprocError, Result};
use nalgebra::{Rotation2, Vector2};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const HEADER_LINE_LEN: usize = 50;

/// Discretization type declared by a grid file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrbGridType {
    Dis,
    Disv,
    Disu,
}

impl GrbGridType {
    fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "DIS" => Some(Self::Dis),
            "DISV" => Some(Self::Disv),
            "DISU" => Some(Self::Disu),
            _ => None,
        }
    }
}

/// One array stored in a grid file.
#[derive(Debug, Clone, PartialEq)]
pub enum GrbArray {
    Integer(Vec<i32>),
    Double(Vec<f64>),
}

/// Decoded contents of a grid file.
#[derive(Debug, Clone)]
pub struct GrbFile {
    path: PathBuf,
    grid_type: GrbGridType,
    version: i32,
    arrays: HashMap<String, GrbArray>,
}

fn header_text(path: &Path, buf: &mut Bytes, len: usize, what: &str) -> Result<String> {
    if buf.remaining() < len {
        return Err(PostprocError::file_format(
            path,
            format!("file ends inside the {} line", what),
        ));
    }
    let raw = buf.split_to(len);
    Ok(String::from_utf8_lossy(&raw)
        .trim_matches(|c: char| c.is_whitespace() || c == '\0')
        .to_string())
}

fn keyword_int(path: &Path, line: &str, keyword: &str) -> Result<i32> {
    let mut tokens = line.split_whitespace();
    match (tokens.next(), tokens.next().and_then(|t| t.parse().ok())) {
        (Some(k), Some(v)) if k.eq_ignore_ascii_case(keyword) => Ok(v),
        _ => Err(PostprocError::file_format(
            path,
            format!("expected '{} <n>' header line; found '{}'", keyword, line),
        )),
    }
}

fn header_int(path: &Path, buf: &mut Bytes, keyword: &str) -> Result<i32> {
    let line = header_text(path, buf, HEADER_LINE_LEN, keyword)?;
    keyword_int(path, &line, keyword)
}

struct Definition {
    name: String,
    is_integer: bool,
    count: usize,
}

fn parse_definition(path: &Path, line: &str) -> Result<Definition> {
    let bad = || PostprocError::file_format(path, format!("malformed definition line '{}'", line));
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() < 4 || !tokens[2].eq_ignore_ascii_case("NDIM") {
        return Err(bad());
    }
    let is_integer = match tokens[1].to_ascii_uppercase().as_str() {
        "INTEGER" => true,
        "DOUBLE" => false,
        other => {
            return Err(PostprocError::file_format(
                path,
                format!("unsupported data type '{}' for '{}'", other, tokens[0]),
            ))
        }
    };
    let ndim: usize = tokens[3].parse().map_err(|_| bad())?;
    if tokens.len() < 4 + ndim {
        return Err(bad());
    }
    let mut count = 1usize;
    for t in &tokens[4..4 + ndim] {
        let dim: usize = t.parse().map_err(|_| bad())?;
        count = count.checked_mul(dim).ok_or_else(bad)?;
    }
    Ok(Definition {
        name: tokens[0].to_ascii_uppercase(),
        is_integer,
        count,
    })
}

impl GrbFile {
    /// Read and decode a grid file.
    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path).map_err(|e| PostprocError::io(path, e))?;
        Self::parse(path, Bytes::from(data))
    }

    /// Decode grid-file bytes; `path` is only used in error messages.
    pub fn parse(path: impl AsRef<Path>, mut buf: Bytes) -> Result<Self> {
        let path = path.as_ref();

        let grid_line = header_text(path, &mut buf, HEADER_LINE_LEN, "GRID")?;
        let mut tokens = grid_line.split_whitespace();
        let grid_type = match (tokens.next(), tokens.next()) {
            (Some(k), Some(t)) if k.eq_ignore_ascii_case("GRID") => GrbGridType::parse(t),
            _ => None,
        }
        .ok_or_else(|| {
            PostprocError::file_format(path, format!("not a binary grid file: '{}'", grid_line))
        })?;

        let version = header_int(path, &mut buf, "VERSION")?;
        let ntxt = header_int(path, &mut buf, "NTXT")?;
        let lentxt = header_int(path, &mut buf, "LENTXT")?;
        if ntxt < 0 || lentxt <= 0 {
            return Err(PostprocError::file_format(
                path,
                format!("invalid NTXT {} / LENTXT {}", ntxt, lentxt),
            ));
        }
        let text_len = (ntxt as usize).checked_mul(lentxt as usize);
        if text_len.map_or(true, |n| n > buf.remaining()) {
            return Err(PostprocError::file_format(
                path,
                format!("file ends inside {} definition lines", ntxt),
            ));
        }

        let mut definitions = Vec::with_capacity(ntxt as usize);
        for _ in 0..ntxt {
            let line = header_text(path, &mut buf, lentxt as usize, "definition")?;
            definitions.push(parse_definition(path, &line)?);
        }

        let mut arrays = HashMap::with_capacity(definitions.len());
        for def in definitions {
            let width = if def.is_integer { 4 } else { 8 };
            let size = def.count.checked_mul(width);
            if size.map_or(true, |n| buf.remaining() < n) {
                return Err(PostprocError::file_format(
                    path,
                    format!("file ends inside array '{}'", def.name),
                ));
            }
            let array = if def.is_integer {
                GrbArray::Integer((0..def.count).map(|_| buf.get_i32_le()).collect())
            } else {
                GrbArray::Double((0..def.count).map(|_| buf.get_f64_le()).collect())
            };
            debug!(name = %def.name, count = def.count, "Read grid array");
            arrays.insert(def.name, array);
        }

        Ok(Self {
            path: path.to_path_buf(),
            grid_type,
            version,
            arrays,
        })
    }

    pub fn grid_type(&self) -> GrbGridType {
        self.grid_type
    }

    pub fn version(&self) -> i32 {
        self.version
    }

    pub fn array(&self, name: &str) -> Option<&GrbArray> {
        self.arrays.get(&name.to_ascii_uppercase())
    }

    fn integers(&self, name: &str) -> Result<&[i32]> {
        match self.array(name) {
            Some(GrbArray::Integer(v)) => Ok(v.as_slice()),
            _ => Err(PostprocError::file_format(
                &self.path,
                format!("missing integer array '{}'", name),
            )),
        }
    }

    fn doubles(&self, name: &str) -> Result<&[f64]> {
        match self.array(name) {
            Some(GrbArray::Double(v)) => Ok(v.as_slice()),
            _ => Err(PostprocError::file_format(
                &self.path,
                format!("missing double array '{}'", name),
            )),
        }
    }

    fn scalar_count(&self, name: &str) -> Result<usize> {
        let v = self.integers(name)?;
        match v.first() {
            Some(&n) if n > 0 => Ok(n as usize),
            _ => Err(PostprocError::file_format(
                &self.path,
                format!("'{}' must be a positive integer", name),
            )),
        }
    }

    fn scalar_double(&self, name: &str) -> Result<f64> {
        self.doubles(name)?.first().copied().ok_or_else(|| {
            PostprocError::file_format(&self.path, format!("'{}' is empty", name))
        })
    }

    fn idomain(&self) -> Option<Vec<i32>> {
        match self.array("IDOMAIN") {
            Some(GrbArray::Integer(v)) => Some(v.clone()),
            _ => None,
        }
    }

    /// Build the grid geometry described by this file.
    pub fn into_grid(self) -> Result<Grid> {
        match self.grid_type {
            GrbGridType::Dis => self.structured().map(Grid::Structured),
            GrbGridType::Disv => self.vertex().map(Grid::Vertex),
            GrbGridType::Disu => Err(PostprocError::validation(format!(
                "'{}' describes a DISU grid; only DIS and DISV grid files can be installed",
                self.path.display()
            ))),
        }
    }

    fn structured(&self) -> Result<StructuredGrid> {
        let spec = StructuredGridSpec {
            ncol: self.scalar_count("NCOL")?,
            nrow: self.scalar_count("NROW")?,
            nlay: self.scalar_count("NLAY")?,
            corner: OriginCorner::BottomLeft,
            e0: self.scalar_double("XORIGIN")?,
            n0: self.scalar_double("YORIGIN")?,
            rotation: self.scalar_double("ANGROT")?,
            delr: self.doubles("DELR")?.to_vec(),
            delc: self.doubles("DELC")?.to_vec(),
            idomain: self.idomain(),
        };
        StructuredGrid::new(spec)
    }

    fn vertex(&self) -> Result<VertexGrid> {
        let ncpl = self.scalar_count("NCPL")?;
        let nlay = self.scalar_count("NLAY")?;
        let xorigin = self.scalar_double("XORIGIN")?;
        let yorigin = self.scalar_double("YORIGIN")?;
        let rotation = Rotation2::new(self.scalar_double("ANGROT")?.to_radians());
        let origin = Vector2::new(xorigin, yorigin);

        let vertices: Vec<(f64, f64)> = self
            .doubles("VERTICES")?
            .chunks_exact(2)
            .map(|xy| {
                let world = origin + rotation * Vector2::new(xy[0], xy[1]);
                (world.x, world.y)
            })
            .collect();

        let iavert = self.integers("IAVERT")?;
        let javert = self.integers("JAVERT")?;
        if iavert.len() < ncpl + 1 {
            return Err(PostprocError::file_format(
                &self.path,
                format!("IAVERT has {} entries; expected {}", iavert.len(), ncpl + 1),
            ));
        }

        let mut cells = Vec::with_capacity(ncpl);
        for icpl in 0..ncpl {
            let start = i64::from(iavert[icpl]) - 1;
            let end = i64::from(iavert[icpl + 1]) - 1;
            if start < 0 || end < start || end as usize > javert.len() {
                return Err(PostprocError::file_format(
                    &self.path,
                    format!("IAVERT entries for cell {} are out of range", icpl + 1),
                ));
            }
            let mut cell: Vec<usize> = Vec::with_capacity((end - start) as usize);
            for &iv in &javert[start as usize..end as usize] {
                if iv < 1 {
                    return Err(PostprocError::file_format(
                        &self.path,
                        format!("JAVERT entry {} for cell {} is not a vertex number", iv, icpl + 1),
                    ));
                }
                cell.push(iv as usize - 1);
            }
            // Closing vertex repeats the first.
            if cell.len() > 1 && cell.first() == cell.last() {
                cell.pop();
            }
            cells.push(cell);
        }

        VertexGrid::new(VertexGridSpec {
            nlay,
            vertices,
            cells,
            idomain: self.idomain(),
        })
    }
}

impl GridRegistry {
    /// Install the grid described by a MODFLOW 6 binary grid file.
    pub fn install_from_grb(&mut self, name: &str, path: impl AsRef<Path>) -> Result<GridSummary> {
        let path = path.as_ref();
        if self.contains(name) {
            return Err(PostprocError::DuplicateGrid(name.trim().to_string()));
        }
        let file = GrbFile::read(path)?;
        info!(
            path = %path.display(),
            grid_type = ?file.grid_type(),
            version = file.version(),
            "Read grid file"
        );
        let grid = file.into_grid()?;
        self.install(name, grid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(text: &str, len: usize) -> Vec<u8> {
        let mut v = text.as_bytes().to_vec();
        v.resize(len, b' ');
        v
    }

    #[test]
    fn test_rejects_non_grid_file() {
        let data = Bytes::from(line("HEAD", 50));
        let err = GrbFile::parse("x.grb", data).unwrap_err();
        assert_eq!(err.kind(), gw_common::ErrorKind::FileFormat);
    }

    #[test]
    fn test_parse_minimal_arrays() {
        let mut raw = Vec::new();
        raw.extend(line("GRID DISU", 50));
        raw.extend(line("VERSION 1", 50));
        raw.extend(line("NTXT 2", 50));
        raw.extend(line("LENTXT 40", 50));
        raw.extend(line("NODES INTEGER NDIM 0 # cells", 40));
        raw.extend(line("TOP DOUBLE NDIM 1 2", 40));
        raw.extend(3i32.to_le_bytes());
        raw.extend(1.5f64.to_le_bytes());
        raw.extend(2.5f64.to_le_bytes());

        let file = GrbFile::parse("u.grb", Bytes::from(raw)).unwrap();
        assert_eq!(file.grid_type(), GrbGridType::Disu);
        assert_eq!(file.array("nodes"), Some(&GrbArray::Integer(vec![3])));
        assert_eq!(file.array("TOP"), Some(&GrbArray::Double(vec![1.5, 2.5])));
        assert_eq!(file.into_grid().unwrap_err().kind(), gw_common::ErrorKind::Validation);
    }

    #[test]
    fn test_truncated_array() {
        let mut raw = Vec::new();
        raw.extend(line("GRID DIS", 50));
        raw.extend(line("VERSION 1", 50));
        raw.extend(line("NTXT 1", 50));
        raw.extend(line("LENTXT 40", 50));
        raw.extend(line("DELR DOUBLE NDIM 1 4", 40));
        raw.extend(1.0f64.to_le_bytes());

        let err = GrbFile::parse("t.grb", Bytes::from(raw)).unwrap_err();
        assert!(err.to_string().contains("DELR"));
    }

    #[test]
    fn test_oversized_array_dimension() {
        let mut raw = Vec::new();
        raw.extend(line("GRID DIS", 50));
        raw.extend(line("VERSION 1", 50));
        raw.extend(line("NTXT 1", 50));
        raw.extend(line("LENTXT 50", 50));
        raw.extend(line("DELR DOUBLE NDIM 1 4611686018427387904", 50));
        raw.extend(1.0f64.to_le_bytes());

        let err = GrbFile::parse("big.grb", Bytes::from(raw)).unwrap_err();
        assert_eq!(err.kind(), gw_common::ErrorKind::FileFormat);
        assert!(err.to_string().contains("DELR"));
    }

    #[test]
    fn test_definition_count_beyond_file() {
        let mut raw = Vec::new();
        raw.extend(line("GRID DIS", 50));
        raw.extend(line("VERSION 1", 50));
        raw.extend(line("NTXT 2000000000", 50));
        raw.extend(line("LENTXT 100", 50));
        raw.extend(line("DELR DOUBLE NDIM 1 1", 100));

        let err = GrbFile::parse("many.grb", Bytes::from(raw)).unwrap_err();
        assert_eq!(err.kind(), gw_common::ErrorKind::FileFormat);
    }

    #[test]
    fn test_malformed_file_leaves_registry_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.grb");
        let mut raw = Vec::new();
        raw.extend(line("GRID DIS", 50));
        raw.extend(line("VERSION 1", 50));
        raw.extend(line("NTXT 1", 50));
        raw.extend(line("LENTXT 50", 50));
        raw.extend(line("DELR DOUBLE NDIM 2 4294967296 4294967296", 50));
        std::fs::write(&path, raw).unwrap();

        let mut registry = GridRegistry::new();
        let err = registry.install_from_grb("model", &path).unwrap_err();
        assert_eq!(err.kind(), gw_common::ErrorKind::FileFormat);
        assert!(!registry.contains("model"));
        assert!(registry.names().is_empty());
    }
}
