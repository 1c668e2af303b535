//! In-memory interpolation factor sets.

use grid_registry::InstalledGrid;
use gw_common::{PostprocError, Result};
use serde::{Deserialize, Serialize};

/// Weights below this are treated as zero and dropped.
pub const WEIGHT_EPS: f64 = 1.0e-10;

/// One contributing cell and its weight.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Donor {
    /// 0-based global cell index.
    pub cell: usize,
    pub weight: f64,
}

/// Donors of one query point; empty when interpolation is not possible.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PointFactors {
    pub donors: Vec<Donor>,
}

impl PointFactors {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn single(cell: usize) -> Self {
        Self {
            donors: vec![Donor { cell, weight: 1.0 }],
        }
    }

    /// Build from raw `(cell, weight)` pairs: merge duplicate cells, drop
    /// negligible weights and rescale to sum 1.
    pub fn from_weights(weights: impl IntoIterator<Item = (usize, f64)>) -> Self {
        let mut donors: Vec<Donor> = Vec::new();
        for (cell, weight) in weights {
            match donors.iter_mut().find(|d| d.cell == cell) {
                Some(d) => d.weight += weight,
                None => donors.push(Donor { cell, weight }),
            }
        }
        donors.retain(|d| d.weight > WEIGHT_EPS);
        let mut factors = Self { donors };
        factors.normalize();
        factors
    }

    /// Rescale weights to sum 1; clears the donors when nothing is left.
    pub fn normalize(&mut self) {
        let total: f64 = self.donors.iter().map(|d| d.weight).sum();
        if total <= WEIGHT_EPS || !total.is_finite() {
            self.donors.clear();
            return;
        }
        for d in &mut self.donors {
            d.weight /= total;
        }
    }

    /// Keep only donors accepted by `keep`, then rescale.
    pub fn retain_cells(&mut self, keep: impl Fn(usize) -> bool) {
        self.donors.retain(|d| keep(d.cell));
        self.normalize();
    }

    pub fn is_success(&self) -> bool {
        !self.donors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.donors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.donors.is_empty()
    }
}

/// Interpolation factors for an ordered point set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorSet {
    ncells: usize,
    points: Vec<PointFactors>,
    #[serde(skip)]
    origin: Option<(String, u64)>,
}

impl FactorSet {
    /// Build a factor set, checking every donor against `ncells`.
    pub fn new(ncells: usize, points: Vec<PointFactors>) -> Result<Self> {
        for (ipt, p) in points.iter().enumerate() {
            if let Some(d) = p.donors.iter().find(|d| d.cell >= ncells) {
                return Err(PostprocError::validation(format!(
                    "point {} references cell {} but the grid has {} cells",
                    ipt, d.cell, ncells
                )));
            }
        }
        Ok(Self {
            ncells,
            points,
            origin: None,
        })
    }

    /// Record the grid the factors were computed against.
    pub fn with_origin(mut self, grid_name: impl Into<String>, snapshot: u64) -> Self {
        self.origin = Some((grid_name.into(), snapshot));
        self
    }

    pub fn ncells(&self) -> usize {
        self.ncells
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[PointFactors] {
        &self.points
    }

    pub fn get(&self, idx: usize) -> Option<&PointFactors> {
        self.points.get(idx)
    }

    /// Largest donor count over all points.
    pub fn max_donors(&self) -> usize {
        self.points.iter().map(|p| p.len()).max().unwrap_or(0)
    }

    /// Per-point success flags: 1 when the point has donors, else 0.
    pub fn success(&self) -> Vec<i32> {
        self.points.iter().map(|p| i32::from(p.is_success())).collect()
    }

    pub fn num_success(&self) -> usize {
        self.points.iter().filter(|p| p.is_success()).count()
    }

    /// Name of the grid these factors were computed against, if known.
    pub fn grid_name(&self) -> Option<&str> {
        self.origin.as_ref().map(|(name, _)| name.as_str())
    }

    pub fn snapshot(&self) -> Option<u64> {
        self.origin.as_ref().map(|(_, s)| *s)
    }

    /// Whether the factors were computed against this exact installation.
    pub fn matches_grid(&self, grid: &InstalledGrid) -> bool {
        match &self.origin {
            Some((name, snapshot)) => {
                name.eq_ignore_ascii_case(grid.name()) && *snapshot == grid.snapshot()
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_weights_merges_and_drops() {
        let f = PointFactors::from_weights(vec![(3, 0.25), (4, 0.0), (3, 0.25), (5, 0.5)]);
        assert_eq!(f.len(), 2);
        assert_eq!(f.donors[0], Donor { cell: 3, weight: 0.5 });
        assert_eq!(f.donors[1], Donor { cell: 5, weight: 0.5 });
    }

    #[test]
    fn test_retain_rescales() {
        let mut f = PointFactors::from_weights(vec![(0, 0.5), (1, 0.25), (2, 0.25)]);
        f.retain_cells(|c| c != 0);
        let total: f64 = f.donors.iter().map(|d| d.weight).sum();
        assert!((total - 1.0).abs() < 1e-12);
        assert_eq!(f.donors[0].weight, 0.5);

        f.retain_cells(|_| false);
        assert!(!f.is_success());
    }

    #[test]
    fn test_factor_set_checks_cells() {
        assert!(FactorSet::new(2, vec![PointFactors::single(2)]).is_err());
        let set = FactorSet::new(3, vec![PointFactors::single(2), PointFactors::none()]).unwrap();
        assert_eq!(set.success(), vec![1, 0]);
        assert_eq!(set.max_donors(), 1);
        assert_eq!(set.num_success(), 1);
        assert!(set.grid_name().is_none());
    }
}
