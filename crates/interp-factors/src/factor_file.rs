//! Persisted factor artifacts.
//!
//! ASCII layout: a header line `npts ncells maxdonor`, then one line per point
//! `index ndonor node weight node weight ...` with 0-based point index and
//! 1-based node numbers.
//!
//! Binary layout (little-endian): `i32 code (2), i32 npts, i32 ncells,
//! i32 maxdonor`, then per point `i32 index, i32 ndonor` followed by
//! `ndonor` pairs of `i32 node, f64 weight`.

use crate::types::{Donor, FactorSet, PointFactors};
use gw_common::{FactorFileFormat, PostprocError, Result};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
enum ArtifactError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Format(String),
}

impl ArtifactError {
    fn at(self, path: &Path) -> PostprocError {
        match self {
            ArtifactError::Io(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                PostprocError::file_format(path, "unexpected end of file")
            }
            ArtifactError::Io(e) => PostprocError::io(path, e),
            ArtifactError::Format(reason) => PostprocError::file_format(path, reason),
        }
    }
}

fn format_err(msg: impl Into<String>) -> ArtifactError {
    ArtifactError::Format(msg.into())
}

fn to_i32(value: usize, what: &str) -> std::result::Result<i32, ArtifactError> {
    i32::try_from(value).map_err(|_| format_err(format!("{} {} does not fit in i32", what, value)))
}

/// Write a factor set to `path` in the given format.
pub fn write_factor_file(
    path: impl AsRef<Path>,
    set: &FactorSet,
    format: FactorFileFormat,
) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|e| PostprocError::io(path, e))?;
    let mut writer = BufWriter::new(file);
    let written = match format {
        FactorFileFormat::Ascii => write_ascii(&mut writer, set),
        FactorFileFormat::Binary => write_binary(&mut writer, set),
    };
    written
        .and_then(|_| writer.flush().map_err(ArtifactError::from))
        .map_err(|e| e.at(path))?;

    info!(
        path = %path.display(),
        format = ?format,
        npts = set.len(),
        "Wrote factor file"
    );
    Ok(())
}

/// Read a factor set previously written by [`write_factor_file`].
pub fn read_factor_file(path: impl AsRef<Path>, format: FactorFileFormat) -> Result<FactorSet> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| PostprocError::io(path, e))?;
    let mut reader = BufReader::new(file);
    let set = match format {
        FactorFileFormat::Ascii => read_ascii(&mut reader),
        FactorFileFormat::Binary => read_binary(&mut reader),
    }
    .map_err(|e| e.at(path))?;

    info!(
        path = %path.display(),
        format = ?format,
        npts = set.len(),
        "Read factor file"
    );
    Ok(set)
}

fn write_ascii<W: Write>(w: &mut W, set: &FactorSet) -> std::result::Result<(), ArtifactError> {
    writeln!(w, "{} {} {}", set.len(), set.ncells(), set.max_donors())?;
    for (ipt, p) in set.points().iter().enumerate() {
        write!(w, "{} {}", ipt, p.len())?;
        for d in &p.donors {
            write!(w, " {} {}", d.cell + 1, d.weight)?;
        }
        writeln!(w)?;
    }
    Ok(())
}

fn write_binary<W: Write>(w: &mut W, set: &FactorSet) -> std::result::Result<(), ArtifactError> {
    w.write_all(&FactorFileFormat::Binary.code().to_le_bytes())?;
    w.write_all(&to_i32(set.len(), "point count")?.to_le_bytes())?;
    w.write_all(&to_i32(set.ncells(), "cell count")?.to_le_bytes())?;
    w.write_all(&to_i32(set.max_donors(), "donor count")?.to_le_bytes())?;

    for (ipt, p) in set.points().iter().enumerate() {
        w.write_all(&to_i32(ipt, "point index")?.to_le_bytes())?;
        w.write_all(&to_i32(p.len(), "donor count")?.to_le_bytes())?;
        for d in &p.donors {
            w.write_all(&to_i32(d.cell + 1, "node")?.to_le_bytes())?;
            w.write_all(&d.weight.to_le_bytes())?;
        }
    }
    Ok(())
}

/// Check one donor read from an artifact and convert it to a 0-based cell.
fn donor(
    ipt: usize,
    node: i64,
    weight: f64,
    ncells: usize,
) -> std::result::Result<Donor, ArtifactError> {
    if node < 1 || node as u64 > ncells as u64 {
        return Err(format_err(format!(
            "point {}: node {} outside 1..={}",
            ipt, node, ncells
        )));
    }
    if !weight.is_finite() {
        return Err(format_err(format!("point {}: non-finite weight", ipt)));
    }
    Ok(Donor {
        cell: (node - 1) as usize,
        weight,
    })
}

fn parse_count(token: Option<&str>, what: &str) -> std::result::Result<usize, ArtifactError> {
    let token = token.ok_or_else(|| format_err(format!("missing {}", what)))?;
    token
        .parse::<usize>()
        .map_err(|_| format_err(format!("invalid {} '{}'", what, token)))
}

fn read_ascii<R: Read>(r: &mut R) -> std::result::Result<FactorSet, ArtifactError> {
    let mut raw = Vec::new();
    r.read_to_end(&mut raw)?;
    let text = String::from_utf8(raw).map_err(|_| format_err("not a text factor file"))?;
    let mut lines = text.lines().filter(|l| !l.trim().is_empty());

    let header = lines.next().ok_or_else(|| format_err("empty factor file"))?;
    let mut tokens = header.split_whitespace();
    let npts = parse_count(tokens.next(), "point count")?;
    let ncells = parse_count(tokens.next(), "cell count")?;
    let maxdonor = parse_count(tokens.next(), "maximum donor count")?;
    if npts == 0 || ncells == 0 || tokens.next().is_some() {
        return Err(format_err(format!("bad header line '{}'", header.trim())));
    }

    let mut points = Vec::with_capacity(npts.min(1 << 20));
    for ipt in 0..npts {
        let line = lines
            .next()
            .ok_or_else(|| format_err(format!("expected {} points, found {}", npts, ipt)))?;
        let mut tokens = line.split_whitespace();
        let index = parse_count(tokens.next(), "point index")?;
        if index != ipt {
            return Err(format_err(format!("point {} is numbered {}", ipt, index)));
        }
        let ndonor = parse_count(tokens.next(), "donor count")?;
        if ndonor > maxdonor {
            return Err(format_err(format!(
                "point {} has {} donors, more than the declared maximum {}",
                ipt, ndonor, maxdonor
            )));
        }
        let mut donors = Vec::with_capacity(ndonor);
        for _ in 0..ndonor {
            let node = tokens
                .next()
                .and_then(|t| t.parse::<i64>().ok())
                .ok_or_else(|| format_err(format!("point {}: bad node number", ipt)))?;
            let weight = tokens
                .next()
                .and_then(|t| t.parse::<f64>().ok())
                .ok_or_else(|| format_err(format!("point {}: bad weight", ipt)))?;
            donors.push(donor(ipt, node, weight, ncells)?);
        }
        if tokens.next().is_some() {
            return Err(format_err(format!("point {}: trailing values", ipt)));
        }
        points.push(PointFactors { donors });
    }
    if lines.next().is_some() {
        return Err(format_err(format!("more than {} points", npts)));
    }

    FactorSet::new(ncells, points).map_err(|e| format_err(e.to_string()))
}

fn read_i32<R: Read>(r: &mut R) -> std::io::Result<i32> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf)?;
    Ok(i32::from_le_bytes(buf))
}

fn read_f64<R: Read>(r: &mut R) -> std::io::Result<f64> {
    let mut buf = [0u8; 8];
    r.read_exact(&mut buf)?;
    Ok(f64::from_le_bytes(buf))
}

fn read_binary<R: Read>(r: &mut R) -> std::result::Result<FactorSet, ArtifactError> {
    let code = read_i32(r)?;
    if code != FactorFileFormat::Binary.code() {
        return Err(format_err(format!("not a binary factor file (code {})", code)));
    }
    let npts = read_i32(r)?;
    let ncells = read_i32(r)?;
    let maxdonor = read_i32(r)?;
    if npts < 1 || ncells < 1 || maxdonor < 0 {
        return Err(format_err(format!(
            "bad header: npts {} ncells {} maxdonor {}",
            npts, ncells, maxdonor
        )));
    }
    let (npts, ncells) = (npts as usize, ncells as usize);

    let mut points = Vec::with_capacity(npts.min(1 << 20));
    for ipt in 0..npts {
        let index = read_i32(r)?;
        if index as i64 != ipt as i64 {
            return Err(format_err(format!("point {} is numbered {}", ipt, index)));
        }
        let ndonor = read_i32(r)?;
        if ndonor < 0 || ndonor > maxdonor {
            return Err(format_err(format!("point {}: donor count {}", ipt, ndonor)));
        }
        let mut donors = Vec::with_capacity(ndonor as usize);
        for _ in 0..ndonor {
            let node = read_i32(r)?;
            let weight = read_f64(r)?;
            donors.push(donor(ipt, node as i64, weight, ncells)?);
        }
        points.push(PointFactors { donors });
    }

    let mut rest = [0u8; 1];
    if r.read(&mut rest)? != 0 {
        return Err(format_err("trailing data after last point"));
    }

    FactorSet::new(ncells, points).map_err(|e| format_err(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use gw_common::ErrorKind;

    fn sample() -> FactorSet {
        FactorSet::new(
            10,
            vec![
                PointFactors::from_weights([(0, 0.1), (3, 0.2), (9, 0.7)]),
                PointFactors::none(),
                PointFactors::single(4),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_ascii_layout() {
        let mut buf = Vec::new();
        write_ascii(&mut buf, &sample()).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "3 10 3");
        assert!(lines[1].starts_with("0 3 1 "));
        assert_eq!(lines[2], "1 0");
        assert_eq!(lines[3], "2 1 5 1");
    }

    #[test]
    fn test_round_trip_both_formats() {
        let dir = tempfile::tempdir().unwrap();
        let set = sample();
        for format in [FactorFileFormat::Ascii, FactorFileFormat::Binary] {
            let path = dir.path().join(format!("factors.{}", format.code()));
            write_factor_file(&path, &set, format).unwrap();
            let back = read_factor_file(&path, format).unwrap();
            assert_eq!(back.points(), set.points());
            assert_eq!(back.ncells(), 10);
        }
    }

    #[test]
    fn test_wrong_format_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let ascii = dir.path().join("f.txt");
        let binary = dir.path().join("f.bin");
        write_factor_file(&ascii, &sample(), FactorFileFormat::Ascii).unwrap();
        write_factor_file(&binary, &sample(), FactorFileFormat::Binary).unwrap();

        let err = read_factor_file(&ascii, FactorFileFormat::Binary).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FileFormat);
        let err = read_factor_file(&binary, FactorFileFormat::Ascii).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FileFormat);
    }

    #[test]
    fn test_bad_node_and_truncation() {
        let mut r = "1 4 1\n0 1 5 1.0\n".as_bytes();
        assert!(read_ascii(&mut r).is_err());

        let mut buf = Vec::new();
        write_binary(&mut buf, &sample()).unwrap();
        buf.truncate(buf.len() - 3);
        let err = read_binary(&mut buf.as_slice()).unwrap_err();
        assert!(matches!(err, ArtifactError::Io(_)));
        assert_eq!(err.at(Path::new("f.bin")).kind(), ErrorKind::FileFormat);
    }

    #[test]
    fn test_unwritable_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("f.txt");
        let err = write_factor_file(&path, &sample(), FactorFileFormat::Ascii).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
    }
}
