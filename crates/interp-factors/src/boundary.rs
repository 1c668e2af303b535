//! Surfer BLN files showing the donor footprint of each point.

use crate::types::{FactorSet, PointFactors};
use grid_registry::Grid;
use gw_common::{PostprocError, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::debug;

/// Closed polyline around the donors of one point.
///
/// A single donor gives the outline of that cell; several donors give the
/// polygon through their cell centres, ordered by angle about their mean.
pub fn donor_polygon(grid: &Grid, factors: &PointFactors) -> Vec<(f64, f64)> {
    let mut ring = match factors.donors.as_slice() {
        [] => return Vec::new(),
        [only] => grid.cell_outline(only.cell),
        donors => {
            let mut centres: Vec<(f64, f64)> =
                donors.iter().map(|d| grid.cell_center(d.cell)).collect();
            let n = centres.len() as f64;
            let mx = centres.iter().map(|c| c.0).sum::<f64>() / n;
            let my = centres.iter().map(|c| c.1).sum::<f64>() / n;
            centres.sort_by(|a, b| {
                let ta = (a.1 - my).atan2(a.0 - mx);
                let tb = (b.1 - my).atan2(b.0 - mx);
                ta.total_cmp(&tb)
            });
            centres
        }
    };
    if let Some(&first) = ring.first() {
        ring.push(first);
    }
    ring
}

/// Write one BLN polyline per successful point.
pub fn write_boundary_file(path: impl AsRef<Path>, grid: &Grid, set: &FactorSet) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|e| PostprocError::io(path, e))?;
    let mut w = BufWriter::new(file);

    let mut written = 0usize;
    for p in set.points().iter().filter(|p| p.is_success()) {
        let ring = donor_polygon(grid, p);
        write_polyline(&mut w, &ring).map_err(|e| PostprocError::io(path, e))?;
        written += 1;
    }
    w.flush().map_err(|e| PostprocError::io(path, e))?;

    debug!(path = %path.display(), polylines = written, "Wrote boundary file");
    Ok(())
}

fn write_polyline<W: Write>(w: &mut W, ring: &[(f64, f64)]) -> std::io::Result<()> {
    writeln!(w, "{},1", ring.len())?;
    for (x, y) in ring {
        writeln!(w, "{},{}", x, y)?;
    }
    Ok(())
}
