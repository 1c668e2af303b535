//! Common types and utilities shared across the post-processing crates.

pub mod bbox;
pub mod codes;
pub mod config;
pub mod error;
pub mod points;
pub mod series;

pub use bbox::BoundingBox;
pub use codes::{
    ExtrapolationMethod, FactorFileFormat, FactorMethod, GridKind, OriginCorner, OutputKind,
    Precision, Simulator,
};
pub use config::PostprocConfig;
pub use error::{ErrorKind, PostprocError, Result};
pub use points::{QueryPoint, QueryPoints};
pub use series::TimeSeriesTable;

/// Label width used by MODFLOW for array and budget-term names.
pub const LABEL_LEN: usize = 16;

/// Normalize a variable or flow-term label for comparison.
///
/// MODFLOW pads labels with blanks and is inconsistent about leading spaces
/// ("            HEAD" vs "HEAD"), so labels compare trimmed and upper-cased.
pub fn normalize_label(label: &str) -> String {
    label.trim().to_ascii_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_label() {
        assert_eq!(normalize_label("            HEAD"), "HEAD");
        assert_eq!(normalize_label("head "), "HEAD");
        assert_eq!(normalize_label("  CONSTANT HEAD  "), "CONSTANT HEAD");
    }
}
