//! Grid registry for MODFLOW-family model grids.
//!
//! Grids are installed under a case-insensitive name, either from explicit
//! structured/vertex specifications or from a MODFLOW 6 binary grid file,
//! and expose the geometry queries needed to compute interpolation factors.

pub mod geometry;
pub mod grb;
pub mod registry;
pub mod spatial_index;
pub mod structured;
pub mod vertex;

pub use grb::{GrbArray, GrbFile, GrbGridType};
pub use registry::{Grid, GridRegistry, GridSummary, InstalledGrid};
pub use spatial_index::CellIndex;
pub use structured::{Bracket, LocalPosition, StructuredGrid, StructuredGridSpec};
pub use vertex::{VertexGrid, VertexGridSpec};
