//! Named collection of installed grids.

use crate::structured::{StructuredGrid, StructuredGridSpec};
use crate::vertex::{VertexGrid, VertexGridSpec};
use gw_common::{GridKind, PostprocError, Result};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use tracing::{debug, info};

/// Geometry of an installed grid.
#[derive(Debug)]
pub enum Grid {
    Structured(StructuredGrid),
    Vertex(VertexGrid),
}

impl Grid {
    pub fn kind(&self) -> GridKind {
        match self {
            Grid::Structured(_) => GridKind::Structured,
            Grid::Vertex(_) => GridKind::Vertex,
        }
    }

    pub fn ncells(&self) -> usize {
        match self {
            Grid::Structured(g) => g.ncells(),
            Grid::Vertex(g) => g.ncells(),
        }
    }

    pub fn nlay(&self) -> usize {
        match self {
            Grid::Structured(g) => g.nlay(),
            Grid::Vertex(g) => g.nlay(),
        }
    }

    /// Cells per layer.
    pub fn ncpl(&self) -> usize {
        match self {
            Grid::Structured(g) => g.ncpl(),
            Grid::Vertex(g) => g.ncpl(),
        }
    }

    pub fn is_active(&self, cell: usize) -> bool {
        match self {
            Grid::Structured(g) => g.is_active(cell),
            Grid::Vertex(g) => g.is_active(cell),
        }
    }

    /// World coordinates of the centre of a (global) cell.
    pub fn cell_center(&self, cell: usize) -> (f64, f64) {
        let icpl = cell % self.ncpl();
        match self {
            Grid::Structured(g) => g.cell_center_world(icpl / g.ncol(), icpl % g.ncol()),
            Grid::Vertex(g) => g.centroid(icpl),
        }
    }

    /// Outline polygon of a (global) cell in world coordinates.
    pub fn cell_outline(&self, cell: usize) -> Vec<(f64, f64)> {
        let icpl = cell % self.ncpl();
        match self {
            Grid::Structured(g) => g.cell_outline_world(icpl / g.ncol(), icpl % g.ncol()),
            Grid::Vertex(g) => g.outline_world(icpl),
        }
    }

    /// Kind-specific dimensions: `(ncol, nrow, nlay)` or `(ncpl, nlay, nvert)`.
    pub fn dims(&self) -> [usize; 3] {
        match self {
            Grid::Structured(g) => [g.ncol(), g.nrow(), g.nlay()],
            Grid::Vertex(g) => [g.ncpl(), g.nlay(), g.nvert()],
        }
    }
}

/// A grid together with its registration details.
#[derive(Debug)]
pub struct InstalledGrid {
    name: String,
    snapshot: u64,
    grid: Grid,
}

impl InstalledGrid {
    /// Name as given at install time.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Installation counter value; changes whenever the name is reinstalled.
    pub fn snapshot(&self) -> u64 {
        self.snapshot
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn summary(&self) -> GridSummary {
        GridSummary {
            name: self.name.clone(),
            kind: self.grid.kind(),
            snapshot: self.snapshot,
            ncells: self.grid.ncells(),
            dims: self.grid.dims(),
        }
    }
}

/// Description of an installed grid returned by the install operations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridSummary {
    pub name: String,
    pub kind: GridKind,
    pub snapshot: u64,
    pub ncells: usize,
    /// `(ncol, nrow, nlay)` for structured grids, `(ncpl, nlay, nvert)` for vertex grids.
    pub dims: [usize; 3],
}

/// Registry of installed grids keyed by case-insensitive name.
#[derive(Debug, Default)]
pub struct GridRegistry {
    grids: HashMap<String, InstalledGrid>,
    retired: HashSet<String>,
    next_snapshot: u64,
}

fn normalize_name(name: &str) -> Result<String> {
    let key = name.trim().to_lowercase();
    if key.is_empty() {
        return Err(PostprocError::validation("grid name must not be blank"));
    }
    Ok(key)
}

impl GridRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn install_structured(
        &mut self,
        name: &str,
        spec: StructuredGridSpec,
    ) -> Result<GridSummary> {
        let key = self.check_free(name)?;
        let grid = StructuredGrid::new(spec)?;
        Ok(self.insert(key, name, Grid::Structured(grid)))
    }

    pub fn install_vertex(&mut self, name: &str, spec: VertexGridSpec) -> Result<GridSummary> {
        let key = self.check_free(name)?;
        let grid = VertexGrid::new(spec)?;
        Ok(self.insert(key, name, Grid::Vertex(grid)))
    }

    /// Install an already-built grid.
    pub fn install(&mut self, name: &str, grid: Grid) -> Result<GridSummary> {
        let key = self.check_free(name)?;
        Ok(self.insert(key, name, grid))
    }

    fn check_free(&self, name: &str) -> Result<String> {
        let key = normalize_name(name)?;
        if self.grids.contains_key(&key) {
            return Err(PostprocError::DuplicateGrid(name.trim().to_string()));
        }
        Ok(key)
    }

    fn insert(&mut self, key: String, name: &str, grid: Grid) -> GridSummary {
        self.next_snapshot += 1;
        self.retired.remove(&key);
        let installed = InstalledGrid {
            name: name.trim().to_string(),
            snapshot: self.next_snapshot,
            grid,
        };
        let summary = installed.summary();
        info!(
            grid = %summary.name,
            kind = ?summary.kind,
            ncells = summary.ncells,
            snapshot = summary.snapshot,
            "Installed grid"
        );
        self.grids.insert(key, installed);
        summary
    }

    /// Look up an installed grid.
    pub fn get(&self, name: &str) -> Result<&InstalledGrid> {
        let key = normalize_name(name)?;
        match self.grids.get(&key) {
            Some(grid) => Ok(grid),
            None if self.retired.contains(&key) => {
                Err(PostprocError::GridUninstalled(name.trim().to_string()))
            }
            None => Err(PostprocError::GridNotInstalled(name.trim().to_string())),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        normalize_name(name).map_or(false, |key| self.grids.contains_key(&key))
    }

    /// Remove a grid and everything derived from it.
    pub fn uninstall(&mut self, name: &str) -> Result<()> {
        let key = normalize_name(name)?;
        match self.grids.remove(&key) {
            Some(grid) => {
                info!(grid = %grid.name, snapshot = grid.snapshot, "Uninstalled grid");
                self.retired.insert(key);
                Ok(())
            }
            None if self.retired.contains(&key) => {
                Err(PostprocError::GridUninstalled(name.trim().to_string()))
            }
            None => Err(PostprocError::GridNotInstalled(name.trim().to_string())),
        }
    }

    /// Uninstall every grid, returning how many were released.
    pub fn release_all(&mut self) -> usize {
        let count = self.grids.len();
        for (key, grid) in self.grids.drain() {
            debug!(grid = %grid.name, "Releasing grid");
            self.retired.insert(key);
        }
        count
    }

    /// Display names of the installed grids, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.grids.values().map(|g| g.name.clone()).collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.grids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grids.is_empty()
    }
}
