//! Named enumerations for the numeric codes used by the MODFLOW ecosystem.
//!
//! The integer values are part of the file formats and calling conventions
//! that existing artifacts and scripts rely on, so every enum keeps an
//! explicit `code()` / `from_code()` mapping.

use crate::error::{PostprocError, Result};
use serde::{Deserialize, Serialize};

/// Precision used to record real numbers in a binary output file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Precision {
    Single,
    Double,
}

impl Precision {
    pub fn code(&self) -> i32 {
        match self {
            Self::Single => 1,
            Self::Double => 2,
        }
    }

    pub fn from_code(code: i32) -> Result<Self> {
        match code {
            1 => Ok(Self::Single),
            2 => Ok(Self::Double),
            _ => Err(PostprocError::invalid_parameter(
                "iprec",
                format!("expected 1 (single) or 2 (double), got {}", code),
            )),
        }
    }

    /// Size in bytes of one real number.
    pub fn real_size(&self) -> usize {
        match self {
            Self::Single => 4,
            Self::Double => 8,
        }
    }
}

impl std::fmt::Display for Precision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Single => write!(f, "single"),
            Self::Double => write!(f, "double"),
        }
    }
}

/// Simulator that wrote a binary output file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Simulator {
    /// MT3D-USGS / MT3DMS concentration files (`.ucn`).
    Mt3d,
    /// MODFLOW-2000/2005/NWT.
    Modflow,
    /// MODFLOW-USG with a structured grid.
    UsgStructured,
    /// MODFLOW-USG with an unstructured grid.
    UsgUnstructured,
    /// MODFLOW 6 with a DIS grid.
    Mf6Dis,
    /// MODFLOW 6 with a DISV grid.
    Mf6Disv,
    /// MODFLOW 6 with a DISU grid.
    Mf6Disu,
}

impl Simulator {
    pub fn code(&self) -> i32 {
        match self {
            Self::Mt3d => -1,
            Self::Modflow => 1,
            Self::UsgStructured => 21,
            Self::UsgUnstructured => 22,
            Self::Mf6Dis => 31,
            Self::Mf6Disv => 32,
            Self::Mf6Disu => 33,
        }
    }

    pub fn from_code(code: i32) -> Result<Self> {
        match code {
            -1 => Ok(Self::Mt3d),
            1 => Ok(Self::Modflow),
            21 => Ok(Self::UsgStructured),
            22 => Ok(Self::UsgUnstructured),
            31 => Ok(Self::Mf6Dis),
            32 => Ok(Self::Mf6Disv),
            33 => Ok(Self::Mf6Disu),
            _ => Err(PostprocError::invalid_parameter(
                "isim",
                format!(
                    "expected one of -1, 1, 21, 22, 31, 32, 33, got {}",
                    code
                ),
            )),
        }
    }

    pub fn is_mf6(&self) -> bool {
        matches!(self, Self::Mf6Dis | Self::Mf6Disv | Self::Mf6Disu)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mt3d => "mt3d",
            Self::Modflow => "modflow",
            Self::UsgStructured => "mfusg-structured",
            Self::UsgUnstructured => "mfusg-unstructured",
            Self::Mf6Dis => "mf6-dis",
            Self::Mf6Disv => "mf6-disv",
            Self::Mf6Disu => "mf6-disu",
        }
    }
}

impl std::fmt::Display for Simulator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Kind of binary output file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutputKind {
    /// System state / dependent variable (heads, concentrations).
    DependentVariable,
    /// Cell-by-cell flow terms.
    CellByCellFlow,
}

impl OutputKind {
    pub fn code(&self) -> i32 {
        match self {
            Self::DependentVariable => 1,
            Self::CellByCellFlow => 2,
        }
    }

    pub fn from_code(code: i32) -> Result<Self> {
        match code {
            1 => Ok(Self::DependentVariable),
            2 => Ok(Self::CellByCellFlow),
            _ => Err(PostprocError::invalid_parameter(
                "itype",
                format!("expected 1 (depvar) or 2 (cell-by-cell flow), got {}", code),
            )),
        }
    }
}

/// Encoding of a persisted factor artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FactorFileFormat {
    #[default]
    Ascii,
    Binary,
}

impl FactorFileFormat {
    pub fn code(&self) -> i32 {
        match self {
            Self::Ascii => 1,
            Self::Binary => 2,
        }
    }

    pub fn from_code(code: i32) -> Result<Self> {
        match code {
            1 => Ok(Self::Ascii),
            2 => Ok(Self::Binary),
            _ => Err(PostprocError::invalid_parameter(
                "factorfiletype",
                format!("expected 1 (ascii) or 2 (binary), got {}", code),
            )),
        }
    }

    /// Parse from string; accepts anything starting with 'a' or 'b'.
    pub fn from_str(s: &str) -> Result<Self> {
        match s.trim().chars().next().map(|c| c.to_ascii_lowercase()) {
            Some('a') => Ok(Self::Ascii),
            Some('b') => Ok(Self::Binary),
            _ => Err(PostprocError::invalid_parameter(
                "factor_format",
                format!("should be either 'a'scii or 'b'inary, not '{}'", s),
            )),
        }
    }
}

/// How donor cells are chosen for a query point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FactorMethod {
    /// The containing cell only, weight 1.
    Nearest,
    /// Bilinear between cell centres (structured) or barycentric between
    /// cell centroids (vertex grids).
    #[default]
    Smooth,
}

impl FactorMethod {
    pub fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "nearest" | "cell" => Ok(Self::Nearest),
            "smooth" | "bilinear" | "barycentric" => Ok(Self::Smooth),
            _ => Err(PostprocError::invalid_parameter(
                "factor_method",
                format!("expected 'nearest' or 'smooth', got '{}'", s),
            )),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Nearest => "nearest",
            Self::Smooth => "smooth",
        }
    }
}

/// Extrapolation applied outside the span of simulation times.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExtrapolationMethod {
    #[default]
    Linear,
    Constant,
}

impl ExtrapolationMethod {
    /// Parse the single-character code ('L' or 'C', case-insensitive).
    pub fn from_char(c: char) -> Result<Self> {
        match c.to_ascii_uppercase() {
            'L' => Ok(Self::Linear),
            'C' => Ok(Self::Constant),
            _ => Err(PostprocError::invalid_parameter(
                "how_extrap",
                format!("expected 'L' (linear) or 'C' (constant), got '{}'", c),
            )),
        }
    }

    pub fn from_str(s: &str) -> Result<Self> {
        match s.trim().chars().next() {
            Some(c) => Self::from_char(c),
            None => Err(PostprocError::invalid_parameter(
                "how_extrap",
                "empty extrapolation method",
            )),
        }
    }

    pub fn as_char(&self) -> char {
        match self {
            Self::Linear => 'L',
            Self::Constant => 'C',
        }
    }
}

/// Geometry kind of an installed grid (the `idis` code).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GridKind {
    Structured,
    Vertex,
}

impl GridKind {
    pub fn code(&self) -> i32 {
        match self {
            Self::Structured => 1,
            Self::Vertex => 2,
        }
    }
}

/// Which corner of a structured grid the origin coordinate refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OriginCorner {
    TopLeft,
    BottomLeft,
}

impl OriginCorner {
    pub fn code(&self) -> i32 {
        match self {
            Self::TopLeft => 1,
            Self::BottomLeft => 2,
        }
    }

    pub fn from_code(code: i32) -> Result<Self> {
        match code {
            1 => Ok(Self::TopLeft),
            2 => Ok(Self::BottomLeft),
            _ => Err(PostprocError::invalid_parameter(
                "icorner",
                format!("expected 1 (top left) or 2 (bottom left), got {}", code),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simulator_codes_round_trip() {
        for code in [-1, 1, 21, 22, 31, 32, 33] {
            assert_eq!(Simulator::from_code(code).unwrap().code(), code);
        }
        assert!(Simulator::from_code(2).is_err());
    }

    #[test]
    fn test_factor_file_format_codes() {
        assert_eq!(FactorFileFormat::from_code(1).unwrap(), FactorFileFormat::Ascii);
        assert_eq!(FactorFileFormat::from_code(2).unwrap(), FactorFileFormat::Binary);
        assert!(FactorFileFormat::from_code(0).is_err());
        assert_eq!(FactorFileFormat::from_str("ASCII").unwrap(), FactorFileFormat::Ascii);
        assert_eq!(FactorFileFormat::from_str("bin").unwrap(), FactorFileFormat::Binary);
        assert!(FactorFileFormat::from_str("text").is_err());
    }

    #[test]
    fn test_extrapolation_method_from_char() {
        assert_eq!(ExtrapolationMethod::from_char('l').unwrap(), ExtrapolationMethod::Linear);
        assert_eq!(ExtrapolationMethod::from_char('C').unwrap(), ExtrapolationMethod::Constant);
        assert!(ExtrapolationMethod::from_char('x').is_err());
        assert!(ExtrapolationMethod::from_str("").is_err());
    }

    #[test]
    fn test_precision() {
        assert_eq!(Precision::from_code(1).unwrap().real_size(), 4);
        assert_eq!(Precision::from_code(2).unwrap().real_size(), 8);
        assert!(Precision::from_code(3).is_err());
    }

    #[test]
    fn test_origin_corner() {
        assert_eq!(OriginCorner::from_code(1).unwrap(), OriginCorner::TopLeft);
        assert_eq!(OriginCorner::from_code(2).unwrap(), OriginCorner::BottomLeft);
        assert!(OriginCorner::from_code(4).is_err());
    }
}
