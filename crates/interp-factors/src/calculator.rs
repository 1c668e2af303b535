//! Donor selection and weights for query points.

use crate::types::{FactorSet, PointFactors};
use grid_registry::geometry::{barycentric, inside_triangle};
use grid_registry::{Grid, InstalledGrid, StructuredGrid, VertexGrid};
use gw_common::{FactorMethod, QueryPoint, QueryPoints, Result};
use tracing::{debug, info};

/// Compute factors for every query point against an installed grid.
///
/// Points outside the grid, in an inactive cell or on a layer that does not
/// exist get no donors; this is not an error.
pub fn compute_factors(
    installed: &InstalledGrid,
    points: &QueryPoints,
    method: FactorMethod,
) -> Result<FactorSet> {
    let grid = installed.grid();
    let factors: Vec<PointFactors> = points
        .iter()
        .enumerate()
        .map(|(ipt, p)| {
            let f = point_factors(grid, p, method);
            if !f.is_success() {
                debug!(point = ipt, x = p.x, y = p.y, layer = p.layer, "No donors for point");
            }
            f
        })
        .collect();

    let set = FactorSet::new(grid.ncells(), factors)?
        .with_origin(installed.name(), installed.snapshot());
    info!(
        grid = %installed.name(),
        method = method.as_str(),
        npts = set.len(),
        succeeded = set.num_success(),
        "Computed interpolation factors"
    );
    Ok(set)
}

/// Factors for a single point.
pub fn point_factors(grid: &Grid, p: &QueryPoint, method: FactorMethod) -> PointFactors {
    if p.layer < 1 || p.layer as usize > grid.nlay() {
        return PointFactors::none();
    }
    let layer = p.layer as usize;

    let mut factors = match grid {
        Grid::Structured(g) => structured_factors(g, p.x, p.y, layer, method),
        Grid::Vertex(g) => vertex_factors(g, p.x, p.y, layer, method),
    };
    if factors.is_success() {
        factors.retain_cells(|cell| grid.is_active(cell));
    }
    factors
}

fn structured_factors(
    g: &StructuredGrid,
    x: f64,
    y: f64,
    layer: usize,
    method: FactorMethod,
) -> PointFactors {
    let pos = match g.local_position(x, y) {
        Some(pos) => pos,
        None => return PointFactors::none(),
    };
    let home = g.cell_index(layer, pos.row, pos.col);
    if !g.is_active(home) {
        return PointFactors::none();
    }

    match method {
        FactorMethod::Nearest => PointFactors::single(home),
        FactorMethod::Smooth => {
            let cb = g.col_bracket(pos.u);
            let rb = g.row_bracket(pos.d);
            let corners = [
                (rb.lo, cb.lo, (1.0 - rb.t) * (1.0 - cb.t)),
                (rb.lo, cb.hi, (1.0 - rb.t) * cb.t),
                (rb.hi, cb.lo, rb.t * (1.0 - cb.t)),
                (rb.hi, cb.hi, rb.t * cb.t),
            ];
            let mut f = PointFactors::from_weights(
                corners
                    .iter()
                    .map(|&(row, col, w)| (g.cell_index(layer, row, col), w)),
            );
            // Inactive neighbours are removed by the caller; keep the home
            // cell as a fallback when nothing else survives.
            f.retain_cells(|cell| g.is_active(cell));
            if f.is_success() {
                f
            } else {
                PointFactors::single(home)
            }
        }
    }
}

fn vertex_factors(
    g: &VertexGrid,
    x: f64,
    y: f64,
    layer: usize,
    method: FactorMethod,
) -> PointFactors {
    let icpl = match g.locate(x, y) {
        Some(icpl) => icpl,
        None => return PointFactors::none(),
    };
    let home = g.cell_index(layer, icpl);
    if !g.is_active(home) {
        return PointFactors::none();
    }

    match method {
        FactorMethod::Nearest => PointFactors::single(home),
        FactorMethod::Smooth => {
            let centre = g.centroid(icpl);
            let neighbours = g.neighbours(icpl);
            if neighbours.len() < 2 {
                return PointFactors::single(home);
            }
            let npairs = if neighbours.len() == 2 { 1 } else { neighbours.len() };
            for i in 0..npairs {
                let a = neighbours[i];
                let b = neighbours[(i + 1) % neighbours.len()];
                let w = match barycentric((x, y), centre, g.centroid(a), g.centroid(b)) {
                    Some(w) if inside_triangle(&w) => w,
                    _ => continue,
                };
                let f = PointFactors::from_weights([
                    (home, w[0].max(0.0)),
                    (g.cell_index(layer, a), w[1].max(0.0)),
                    (g.cell_index(layer, b), w[2].max(0.0)),
                ]);
                if f.is_success() {
                    return f;
                }
            }
            PointFactors::single(home)
        }
    }
}
