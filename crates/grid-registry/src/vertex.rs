//! Vertex-based (DISV) grid geometry.
//!
//! Every layer shares the same cell polygons. Global cell numbering is
//! layer-major: `cell = (layer - 1) * ncpl + icpl`.

use crate::geometry::{point_in_polygon, polygon_centroid};
use crate::spatial_index::CellIndex;
use gw_common::{BoundingBox, PostprocError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Parameters for installing a vertex grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VertexGridSpec {
    pub nlay: usize,
    /// Vertex coordinates in world space.
    pub vertices: Vec<(f64, f64)>,
    /// For each in-layer cell, its vertex indices (0-based) in polygon order.
    pub cells: Vec<Vec<usize>>,
    /// Per-cell activity flag (`<= 0` is inactive); `None` means all active.
    pub idomain: Option<Vec<i32>>,
}

/// An installed vertex grid.
#[derive(Debug)]
pub struct VertexGrid {
    nlay: usize,
    vertices: Vec<(f64, f64)>,
    cells: Vec<Vec<usize>>,
    centroids: Vec<(f64, f64)>,
    neighbours: Vec<Vec<usize>>,
    index: CellIndex,
    idomain: Option<Vec<i32>>,
    bbox: BoundingBox,
}

impl VertexGrid {
    /// Validate a spec, compute centroids and neighbours, and build the spatial index.
    pub fn new(spec: VertexGridSpec) -> Result<Self> {
        let ncpl = spec.cells.len();
        if spec.nlay == 0 || ncpl == 0 {
            return Err(PostprocError::validation(format!(
                "nlay and ncpl must both be >= 1; found {}, {}",
                spec.nlay, ncpl
            )));
        }
        if let Some(idx) = spec
            .vertices
            .iter()
            .position(|(x, y)| !x.is_finite() || !y.is_finite())
        {
            return Err(PostprocError::validation(format!(
                "vertex {} has a non-finite coordinate",
                idx
            )));
        }

        let nvert = spec.vertices.len();
        for (icpl, cell) in spec.cells.iter().enumerate() {
            if let Some(&bad) = cell.iter().find(|&&iv| iv >= nvert) {
                return Err(PostprocError::validation(format!(
                    "cell {} references vertex {} but only {} vertices exist",
                    icpl, bad, nvert
                )));
            }
            let mut distinct = cell.clone();
            distinct.sort_unstable();
            distinct.dedup();
            if distinct.len() < 3 {
                return Err(PostprocError::validation(format!(
                    "cell {} needs at least 3 distinct vertices; found {}",
                    icpl,
                    distinct.len()
                )));
            }
        }

        let ncells = ncpl * spec.nlay;
        if let Some(idomain) = &spec.idomain {
            if idomain.len() != ncells {
                return Err(PostprocError::validation(format!(
                    "expected 'idomain' length to be {}; found {}",
                    ncells,
                    idomain.len()
                )));
            }
        }

        let outlines: Vec<Vec<(f64, f64)>> = spec
            .cells
            .iter()
            .map(|cell| cell.iter().map(|&iv| spec.vertices[iv]).collect())
            .collect();
        let centroids: Vec<(f64, f64)> = outlines.iter().map(|o| polygon_centroid(o)).collect();
        let boxes: Vec<BoundingBox> = outlines
            .iter()
            .filter_map(|o| BoundingBox::from_points(o.iter().copied()))
            .collect();
        let bbox = boxes
            .iter()
            .skip(1)
            .fold(boxes[0], |acc, b| acc.union(b));
        let index = CellIndex::build(boxes);
        let neighbours = vertex_neighbours(&spec.cells, nvert, &centroids);

        Ok(Self {
            nlay: spec.nlay,
            vertices: spec.vertices,
            cells: spec.cells,
            centroids,
            neighbours,
            index,
            idomain: spec.idomain,
            bbox,
        })
    }

    pub fn nlay(&self) -> usize {
        self.nlay
    }

    /// Cells per layer.
    pub fn ncpl(&self) -> usize {
        self.cells.len()
    }

    pub fn ncells(&self) -> usize {
        self.ncpl() * self.nlay
    }

    pub fn nvert(&self) -> usize {
        self.vertices.len()
    }

    pub fn vertices(&self) -> &[(f64, f64)] {
        &self.vertices
    }

    pub fn idomain(&self) -> Option<&[i32]> {
        self.idomain.as_deref()
    }

    pub fn bbox(&self) -> BoundingBox {
        self.bbox
    }

    /// In-layer cell containing a world point.
    ///
    /// When the point sits on an edge shared by several cells the lowest
    /// cell number wins.
    pub fn locate(&self, x: f64, y: f64) -> Option<usize> {
        let candidates = self.index.candidates(x, y);
        candidates
            .iter()
            .copied()
            .find(|&icpl| point_in_polygon(x, y, &self.outline_world(icpl)))
            .or_else(|| {
                // Points on the outer boundary fail the even-odd test.
                candidates.iter().copied().find(|&icpl| {
                    on_boundary(x, y, &self.outline_world(icpl))
                })
            })
    }

    pub fn centroid(&self, icpl: usize) -> (f64, f64) {
        self.centroids[icpl]
    }

    pub fn outline_world(&self, icpl: usize) -> Vec<(f64, f64)> {
        self.cells[icpl].iter().map(|&iv| self.vertices[iv]).collect()
    }

    /// In-layer cells sharing at least one vertex, ordered by angle around the centroid.
    pub fn neighbours(&self, icpl: usize) -> &[usize] {
        &self.neighbours[icpl]
    }

    /// 0-based global cell index from a 1-based layer and in-layer cell.
    pub fn cell_index(&self, layer: usize, icpl: usize) -> usize {
        (layer - 1) * self.ncpl() + icpl
    }

    pub fn is_active(&self, cell: usize) -> bool {
        match &self.idomain {
            Some(idomain) => idomain.get(cell).map_or(false, |&v| v > 0),
            None => cell < self.ncells(),
        }
    }
}

fn vertex_neighbours(
    cells: &[Vec<usize>],
    nvert: usize,
    centroids: &[(f64, f64)],
) -> Vec<Vec<usize>> {
    let mut by_vertex: HashMap<usize, Vec<usize>> = HashMap::with_capacity(nvert);
    for (icpl, cell) in cells.iter().enumerate() {
        for &iv in cell {
            let entry = by_vertex.entry(iv).or_default();
            if entry.last() != Some(&icpl) {
                entry.push(icpl);
            }
        }
    }

    cells
        .iter()
        .enumerate()
        .map(|(icpl, cell)| {
            let mut found: Vec<usize> = cell
                .iter()
                .filter_map(|iv| by_vertex.get(iv))
                .flatten()
                .copied()
                .filter(|&other| other != icpl)
                .collect();
            found.sort_unstable();
            found.dedup();

            let (cx, cy) = centroids[icpl];
            found.sort_by(|&a, &b| {
                let ta = (centroids[a].1 - cy).atan2(centroids[a].0 - cx);
                let tb = (centroids[b].1 - cy).atan2(centroids[b].0 - cx);
                ta.total_cmp(&tb)
            });
            found
        })
        .collect()
}

fn on_boundary(x: f64, y: f64, polygon: &[(f64, f64)]) -> bool {
    let n = polygon.len();
    (0..n).any(|i| {
        let (x0, y0) = polygon[i];
        let (x1, y1) = polygon[(i + 1) % n];
        let len = ((x1 - x0).powi(2) + (y1 - y0).powi(2)).sqrt();
        if len == 0.0 {
            return false;
        }
        let cross = (x1 - x0) * (y - y0) - (y1 - y0) * (x - x0);
        let dot = (x - x0) * (x1 - x0) + (y - y0) * (y1 - y0);
        cross.abs() <= 1.0e-9 * len * len && dot >= 0.0 && dot <= len * len
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 3x3 unit squares, vertices on a 4x4 lattice, row-major from the south-west.
    fn lattice(nlay: usize) -> VertexGridSpec {
        let mut vertices = Vec::new();
        for j in 0..4 {
            for i in 0..4 {
                vertices.push((i as f64, j as f64));
            }
        }
        let mut cells = Vec::new();
        for j in 0..3 {
            for i in 0..3 {
                let v0 = j * 4 + i;
                cells.push(vec![v0, v0 + 1, v0 + 5, v0 + 4]);
            }
        }
        VertexGridSpec {
            nlay,
            vertices,
            cells,
            idomain: None,
        }
    }

    #[test]
    fn test_locate_and_centroid() {
        let grid = VertexGrid::new(lattice(2)).unwrap();
        assert_eq!(grid.ncpl(), 9);
        assert_eq!(grid.ncells(), 18);
        assert_eq!(grid.locate(1.5, 1.5), Some(4));
        assert_eq!(grid.locate(2.5, 0.5), Some(2));
        assert_eq!(grid.locate(3.0, 3.0), Some(8));
        assert_eq!(grid.locate(3.5, 0.5), None);
        assert_eq!(grid.centroid(4), (1.5, 1.5));
        assert_eq!(grid.cell_index(2, 4), 13);
    }

    #[test]
    fn test_neighbours_sorted_by_angle() {
        let grid = VertexGrid::new(lattice(1)).unwrap();
        // Centre cell touches all eight others.
        assert_eq!(grid.neighbours(4), &[0, 1, 2, 5, 8, 7, 6, 3]);
        assert_eq!(grid.neighbours(0).len(), 3);
    }

    #[test]
    fn test_invalid_connectivity() {
        let mut spec = lattice(1);
        spec.cells[0] = vec![0, 1, 99];
        assert!(VertexGrid::new(spec).is_err());

        let mut spec = lattice(1);
        spec.cells[0] = vec![0, 1, 1];
        assert!(VertexGrid::new(spec).is_err());

        let mut spec = lattice(1);
        spec.idomain = Some(vec![1; 3]);
        assert!(VertexGrid::new(spec).is_err());
    }
}
