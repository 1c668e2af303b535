//! Query point sets.

use crate::error::{PostprocError, Result};
use serde::{Deserialize, Serialize};

/// A single query location: easting, northing and 1-based model layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QueryPoint {
    pub x: f64,
    pub y: f64,
    pub layer: i32,
}

/// An ordered, non-empty set of query points.
///
/// Points are addressed by position; index 0..n-1 is the canonical order used
/// by factor sets, success arrays and interpolated tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryPoints {
    points: Vec<QueryPoint>,
}

impl QueryPoints {
    /// Build a point set from parallel coordinate and layer slices.
    pub fn from_arrays(ecoord: &[f64], ncoord: &[f64], layer: &[i32]) -> Result<Self> {
        let npts = layer.len();
        if npts == 0 {
            return Err(PostprocError::validation(
                "expected 'layer' with length greater than zero",
            ));
        }
        if ecoord.len() != npts {
            return Err(PostprocError::validation(format!(
                "expected 'ecoord' length to be {}; found {}",
                npts,
                ecoord.len()
            )));
        }
        if ncoord.len() != npts {
            return Err(PostprocError::validation(format!(
                "expected 'ncoord' length to be {}; found {}",
                npts,
                ncoord.len()
            )));
        }

        let points = ecoord
            .iter()
            .zip(ncoord)
            .zip(layer)
            .map(|((&x, &y), &layer)| QueryPoint { x, y, layer })
            .collect();
        Self::new(points)
    }

    /// Build a point set from already-assembled points.
    pub fn new(points: Vec<QueryPoint>) -> Result<Self> {
        if points.is_empty() {
            return Err(PostprocError::validation(
                "a query point set needs at least one point",
            ));
        }
        if let Some((idx, _)) = points
            .iter()
            .enumerate()
            .find(|(_, p)| !p.x.is_finite() || !p.y.is_finite())
        {
            return Err(PostprocError::validation(format!(
                "query point {} has a non-finite coordinate",
                idx
            )));
        }
        Ok(Self { points })
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<&QueryPoint> {
        self.points.get(idx)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, QueryPoint> {
        self.points.iter()
    }

    pub fn as_slice(&self) -> &[QueryPoint] {
        &self.points
    }
}

impl<'a> IntoIterator for &'a QueryPoints {
    type Item = &'a QueryPoint;
    type IntoIter = std::slice::Iter<'a, QueryPoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}
