//! Structured (row/column/layer) grid geometry.
//!
//! Local coordinates are measured from the grid's bottom-left corner in the
//! unrotated frame: `u` runs along a row (increasing column), `v` runs up the
//! columns. Row 0 is the top row, so row lookups work on the depth from the
//! top edge, `d = height - v`.

use crate::geometry::point_in_polygon;
use gw_common::{BoundingBox, OriginCorner, PostprocError, Result};
use nalgebra::{Rotation2, Vector2};
use serde::{Deserialize, Serialize};

/// Parameters for installing a structured grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredGridSpec {
    pub ncol: usize,
    pub nrow: usize,
    pub nlay: usize,
    /// Which corner `(e0, n0)` refers to.
    pub corner: OriginCorner,
    pub e0: f64,
    pub n0: f64,
    /// Counter-clockwise rotation of the row direction from east, in degrees.
    pub rotation: f64,
    /// Column widths; a single value means uniform.
    pub delr: Vec<f64>,
    /// Row widths; a single value means uniform.
    pub delc: Vec<f64>,
    /// Per-cell activity flag (`<= 0` is inactive); `None` means all active.
    pub idomain: Option<Vec<i32>>,
}

impl StructuredGridSpec {
    /// Unrotated grid with uniform spacing and its bottom-left corner at the origin.
    pub fn uniform(ncol: usize, nrow: usize, nlay: usize, delr: f64, delc: f64) -> Self {
        Self {
            ncol,
            nrow,
            nlay,
            corner: OriginCorner::BottomLeft,
            e0: 0.0,
            n0: 0.0,
            rotation: 0.0,
            delr: vec![delr],
            delc: vec![delc],
            idomain: None,
        }
    }

    pub fn with_origin(mut self, corner: OriginCorner, e0: f64, n0: f64) -> Self {
        self.corner = corner;
        self.e0 = e0;
        self.n0 = n0;
        self
    }

    pub fn with_rotation(mut self, degrees: f64) -> Self {
        self.rotation = degrees;
        self
    }

    pub fn with_idomain(mut self, idomain: Vec<i32>) -> Self {
        self.idomain = Some(idomain);
        self
    }
}

/// Neighbouring cell centres along one axis and the weight of the upper one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bracket {
    pub lo: usize,
    pub hi: usize,
    /// Weight of `hi`; `lo` gets `1 - t`.
    pub t: f64,
}

/// Position of a point inside a structured grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalPosition {
    pub row: usize,
    pub col: usize,
    /// Distance along the row direction from the left edge.
    pub u: f64,
    /// Distance down from the top edge.
    pub d: f64,
}

/// An installed structured grid.
#[derive(Debug, Clone)]
pub struct StructuredGrid {
    ncol: usize,
    nrow: usize,
    nlay: usize,
    delr: Vec<f64>,
    delc: Vec<f64>,
    col_edges: Vec<f64>,
    row_edges: Vec<f64>,
    col_centers: Vec<f64>,
    row_centers: Vec<f64>,
    origin: Vector2<f64>,
    rotation: Rotation2<f64>,
    rotation_degrees: f64,
    idomain: Option<Vec<i32>>,
}

fn expand_widths(name: &str, widths: &[f64], n: usize) -> Result<Vec<f64>> {
    let expanded = match widths.len() {
        1 => vec![widths[0]; n],
        len if len == n => widths.to_vec(),
        len => {
            return Err(PostprocError::validation(format!(
                "expected '{}' length to be 1 or {}; found {}",
                name, n, len
            )))
        }
    };
    if let Some(idx) = expanded.iter().position(|w| !w.is_finite() || *w <= 0.0) {
        return Err(PostprocError::validation(format!(
            "'{}' entry {} must be positive and finite; found {}",
            name, idx, expanded[idx]
        )));
    }
    Ok(expanded)
}

fn cumulative(widths: &[f64]) -> Vec<f64> {
    let mut edges = Vec::with_capacity(widths.len() + 1);
    let mut acc = 0.0;
    edges.push(acc);
    for w in widths {
        acc += w;
        edges.push(acc);
    }
    edges
}

fn midpoints(edges: &[f64]) -> Vec<f64> {
    edges.windows(2).map(|w| 0.5 * (w[0] + w[1])).collect()
}

/// Index of the interval of `edges` holding `pos`; `pos` must lie in the span.
fn interval(edges: &[f64], pos: f64) -> usize {
    let n = edges.len() - 1;
    edges[1..].partition_point(|&e| e <= pos).min(n - 1)
}

/// Bracket `pos` between cell centres, collapsing onto the edge cells
/// outside the outermost centres.
fn bracket(centers: &[f64], pos: f64) -> Bracket {
    let last = centers.len() - 1;
    if pos <= centers[0] {
        return Bracket { lo: 0, hi: 0, t: 0.0 };
    }
    if pos >= centers[last] {
        return Bracket {
            lo: last,
            hi: last,
            t: 0.0,
        };
    }
    let hi = centers.partition_point(|&c| c <= pos);
    let lo = hi - 1;
    let t = (pos - centers[lo]) / (centers[hi] - centers[lo]);
    Bracket { lo, hi, t }
}

impl StructuredGrid {
    /// Validate a spec and build the grid.
    pub fn new(spec: StructuredGridSpec) -> Result<Self> {
        if spec.ncol == 0 || spec.nrow == 0 || spec.nlay == 0 {
            return Err(PostprocError::validation(format!(
                "ncol, nrow and nlay must all be >= 1; found {}, {}, {}",
                spec.ncol, spec.nrow, spec.nlay
            )));
        }
        if !spec.e0.is_finite() || !spec.n0.is_finite() || !spec.rotation.is_finite() {
            return Err(PostprocError::validation(
                "grid origin and rotation must be finite",
            ));
        }

        let delr = expand_widths("delr", &spec.delr, spec.ncol)?;
        let delc = expand_widths("delc", &spec.delc, spec.nrow)?;

        let ncells = spec.ncol * spec.nrow * spec.nlay;
        if let Some(idomain) = &spec.idomain {
            if idomain.len() != ncells {
                return Err(PostprocError::validation(format!(
                    "expected 'idomain' length to be {}; found {}",
                    ncells,
                    idomain.len()
                )));
            }
        }

        let col_edges = cumulative(&delr);
        let row_edges = cumulative(&delc);
        let height = row_edges[spec.nrow];
        let rotation = Rotation2::new(spec.rotation.to_radians());

        let corner = Vector2::new(spec.e0, spec.n0);
        let origin = match spec.corner {
            OriginCorner::BottomLeft => corner,
            OriginCorner::TopLeft => corner + rotation * Vector2::new(0.0, -height),
        };

        Ok(Self {
            ncol: spec.ncol,
            nrow: spec.nrow,
            nlay: spec.nlay,
            col_centers: midpoints(&col_edges),
            row_centers: midpoints(&row_edges),
            col_edges,
            row_edges,
            delr,
            delc,
            origin,
            rotation,
            rotation_degrees: spec.rotation,
            idomain: spec.idomain,
        })
    }

    pub fn ncol(&self) -> usize {
        self.ncol
    }

    pub fn nrow(&self) -> usize {
        self.nrow
    }

    pub fn nlay(&self) -> usize {
        self.nlay
    }

    /// Cells per layer.
    pub fn ncpl(&self) -> usize {
        self.ncol * self.nrow
    }

    pub fn ncells(&self) -> usize {
        self.ncpl() * self.nlay
    }

    pub fn delr(&self) -> &[f64] {
        &self.delr
    }

    pub fn delc(&self) -> &[f64] {
        &self.delc
    }

    pub fn width(&self) -> f64 {
        self.col_edges[self.ncol]
    }

    pub fn height(&self) -> f64 {
        self.row_edges[self.nrow]
    }

    /// World coordinates of the bottom-left corner.
    pub fn origin_bottom_left(&self) -> (f64, f64) {
        (self.origin.x, self.origin.y)
    }

    pub fn rotation_degrees(&self) -> f64 {
        self.rotation_degrees
    }

    pub fn idomain(&self) -> Option<&[i32]> {
        self.idomain.as_deref()
    }

    /// World to local `(u, v)`.
    pub fn to_local(&self, x: f64, y: f64) -> (f64, f64) {
        let rel = Vector2::new(x, y) - self.origin;
        let local = self.rotation.inverse() * rel;
        (local.x, local.y)
    }

    /// Local `(u, v)` to world.
    pub fn to_world(&self, u: f64, v: f64) -> (f64, f64) {
        let world = self.origin + self.rotation * Vector2::new(u, v);
        (world.x, world.y)
    }

    /// Locate a world point; points on the outer boundary are inside.
    pub fn local_position(&self, x: f64, y: f64) -> Option<LocalPosition> {
        let (u, v) = self.to_local(x, y);
        let tol = 1.0e-9 * (self.width() + self.height());
        if u < -tol || u > self.width() + tol || v < -tol || v > self.height() + tol {
            return None;
        }
        let u = u.clamp(0.0, self.width());
        let d = (self.height() - v).clamp(0.0, self.height());

        Some(LocalPosition {
            row: interval(&self.row_edges, d),
            col: interval(&self.col_edges, u),
            u,
            d,
        })
    }

    /// Row and column of the cell containing a world point.
    pub fn locate(&self, x: f64, y: f64) -> Option<(usize, usize)> {
        self.local_position(x, y).map(|p| (p.row, p.col))
    }

    /// Column centres as distances from the left edge.
    pub fn col_centers(&self) -> &[f64] {
        &self.col_centers
    }

    /// Row centres as distances down from the top edge.
    pub fn row_centers(&self) -> &[f64] {
        &self.row_centers
    }

    pub fn col_bracket(&self, u: f64) -> Bracket {
        bracket(&self.col_centers, u)
    }

    pub fn row_bracket(&self, d: f64) -> Bracket {
        bracket(&self.row_centers, d)
    }

    pub fn cell_center_world(&self, row: usize, col: usize) -> (f64, f64) {
        self.to_world(self.col_centers[col], self.height() - self.row_centers[row])
    }

    /// Cell corners in world coordinates, counter-clockwise from bottom-left.
    pub fn cell_outline_world(&self, row: usize, col: usize) -> Vec<(f64, f64)> {
        let left = self.col_edges[col];
        let right = self.col_edges[col + 1];
        let top = self.height() - self.row_edges[row];
        let bottom = self.height() - self.row_edges[row + 1];
        vec![
            self.to_world(left, bottom),
            self.to_world(right, bottom),
            self.to_world(right, top),
            self.to_world(left, top),
        ]
    }

    /// Whether a world point falls inside a particular cell.
    pub fn cell_contains(&self, row: usize, col: usize, x: f64, y: f64) -> bool {
        point_in_polygon(x, y, &self.cell_outline_world(row, col))
    }

    /// 0-based cell index from a 1-based layer and 0-based row/column.
    pub fn cell_index(&self, layer: usize, row: usize, col: usize) -> usize {
        (layer - 1) * self.ncpl() + row * self.ncol + col
    }

    pub fn is_active(&self, cell: usize) -> bool {
        match &self.idomain {
            Some(idomain) => idomain.get(cell).map_or(false, |&v| v > 0),
            None => cell < self.ncells(),
        }
    }

    pub fn bbox(&self) -> BoundingBox {
        let corners = [
            self.to_world(0.0, 0.0),
            self.to_world(self.width(), 0.0),
            self.to_world(self.width(), self.height()),
            self.to_world(0.0, self.height()),
        ];
        BoundingBox::from_points(corners).unwrap_or_else(|| BoundingBox::new(0.0, 0.0, 0.0, 0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_locate_unrotated() {
        let grid =
            StructuredGrid::new(StructuredGridSpec::uniform(20, 40, 3, 250.0, 250.0)).unwrap();
        assert_eq!(grid.ncells(), 2400);
        // Row 0 is the top row.
        assert_eq!(grid.locate(125.0, 9875.0), Some((0, 0)));
        assert_eq!(grid.locate(4875.0, 125.0), Some((39, 19)));
        assert_eq!(grid.locate(5000.0, 0.0), Some((39, 19)));
        assert_eq!(grid.locate(-1.0, 100.0), None);
        assert_eq!(grid.locate(100.0, 10000.5), None);
    }

    #[test]
    fn test_top_left_origin_matches_bottom_left() {
        let bl = StructuredGrid::new(StructuredGridSpec::uniform(4, 3, 1, 10.0, 10.0)).unwrap();
        let tl = StructuredGrid::new(
            StructuredGridSpec::uniform(4, 3, 1, 10.0, 10.0).with_origin(
                OriginCorner::TopLeft,
                0.0,
                30.0,
            ),
        )
        .unwrap();
        assert_eq!(bl.origin_bottom_left(), tl.origin_bottom_left());
        assert_eq!(bl.locate(15.0, 25.0), tl.locate(15.0, 25.0));
    }

    #[test]
    fn test_rotated_grid_round_trip() {
        let grid = StructuredGrid::new(
            StructuredGridSpec::uniform(2, 2, 1, 100.0, 100.0)
                .with_origin(OriginCorner::BottomLeft, 1000.0, 2000.0)
                .with_rotation(90.0),
        )
        .unwrap();
        // Rotated 90 degrees: rows run north, columns run west.
        let (x, y) = grid.cell_center_world(1, 0);
        assert!(approx(x, 950.0));
        assert!(approx(y, 2050.0));
        assert_eq!(grid.locate(x, y), Some((1, 0)));

        let (u, v) = grid.to_local(x, y);
        let (bx, by) = grid.to_world(u, v);
        assert!(approx(bx, x) && approx(by, y));
    }

    #[test]
    fn test_variable_widths_and_brackets() {
        let spec = StructuredGridSpec {
            delr: vec![10.0, 20.0, 30.0],
            delc: vec![5.0],
            ..StructuredGridSpec::uniform(3, 2, 1, 1.0, 1.0)
        };
        let grid = StructuredGrid::new(spec).unwrap();
        assert_eq!(grid.col_centers(), &[5.0, 20.0, 45.0]);
        assert_eq!(grid.locate(10.0, 1.0), Some((1, 1)));

        let b = grid.col_bracket(12.5);
        assert_eq!((b.lo, b.hi), (0, 1));
        assert!(approx(b.t, 0.5));
        assert_eq!(grid.col_bracket(2.0), Bracket { lo: 0, hi: 0, t: 0.0 });
        assert_eq!(grid.col_bracket(59.0), Bracket { lo: 2, hi: 2, t: 0.0 });
    }

    #[test]
    fn test_validation() {
        assert!(StructuredGrid::new(StructuredGridSpec::uniform(0, 1, 1, 1.0, 1.0)).is_err());
        assert!(StructuredGrid::new(StructuredGridSpec::uniform(2, 1, 1, -1.0, 1.0)).is_err());
        let spec = StructuredGridSpec {
            delr: vec![1.0, 1.0, 1.0],
            ..StructuredGridSpec::uniform(2, 1, 1, 1.0, 1.0)
        };
        assert!(StructuredGrid::new(spec).is_err());
        let spec = StructuredGridSpec::uniform(2, 1, 1, 1.0, 1.0).with_idomain(vec![1]);
        assert!(StructuredGrid::new(spec).is_err());
    }

    #[test]
    fn test_activity_and_outline() {
        let grid = StructuredGrid::new(
            StructuredGridSpec::uniform(2, 1, 1, 1.0, 1.0).with_idomain(vec![1, 0]),
        )
        .unwrap();
        assert!(grid.is_active(0));
        assert!(!grid.is_active(1));
        assert!(!grid.is_active(2));
        assert!(grid.cell_contains(0, 1, 1.5, 0.5));
        assert_eq!(grid.cell_outline_world(0, 0)[2], (1.0, 1.0));
        assert_eq!(grid.cell_index(1, 0, 1), 1);
    }
}
