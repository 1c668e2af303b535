//! Factor computation against installed grids, and the persisted artifacts.

use grid_registry::{Grid, GridRegistry, StructuredGridSpec, VertexGridSpec};
use gw_common::{
    ErrorKind, FactorFileFormat, FactorMethod, OriginCorner, PostprocError, QueryPoint,
    QueryPoints,
};
use interp_factors::{calc_interp_factors, compute_factors, read_factor_file, FactorSet};
use test_utils::{assert_approx_eq, init_tracing, plane_at, scattered_points, scratch_dir};

fn interpolate(set: &FactorSet, values: &[f64]) -> Vec<Option<f64>> {
    set.points()
        .iter()
        .map(|p| {
            if p.is_success() {
                Some(p.donors.iter().map(|d| d.weight * values[d.cell]).sum())
            } else {
                None
            }
        })
        .collect()
}

fn cell_centres(grid: &Grid) -> Vec<(f64, f64)> {
    (0..grid.ncells()).map(|c| grid.cell_center(c)).collect()
}

#[test]
fn test_bilinear_reproduces_plane_on_rotated_grid() {
    init_tracing();
    let spec = StructuredGridSpec::uniform(10, 8, 1, 50.0, 50.0)
        .with_origin(OriginCorner::BottomLeft, 1000.0, 2000.0)
        .with_rotation(30.0);
    let mut registry = GridRegistry::new();
    registry.install_structured("rotated", spec).unwrap();
    let installed = registry.get("rotated").unwrap();
    let grid = match installed.grid() {
        Grid::Structured(g) => g,
        Grid::Vertex(_) => unreachable!(),
    };

    let local = scattered_points(25, 25.0, 475.0, 25.0, 375.0, 7);
    let points: Vec<QueryPoint> = local
        .iter()
        .map(|&(u, v)| {
            let (x, y) = grid.to_world(u, v);
            QueryPoint { x, y, layer: 1 }
        })
        .collect();
    let points = QueryPoints::new(points).unwrap();

    let set = compute_factors(installed, &points, FactorMethod::Smooth).unwrap();
    assert_eq!(set.num_success(), 25);
    assert!(set.matches_grid(installed));

    let values = plane_at(&cell_centres(installed.grid()), 10.0, 0.01, -0.02);
    for (p, value) in points.iter().zip(interpolate(&set, &values)) {
        let expected = 10.0 + 0.01 * p.x - 0.02 * p.y;
        assert_approx_eq!(value.unwrap(), expected, 1e-9);
    }
}

#[test]
fn test_barycentric_reproduces_plane_on_vertex_grid() {
    let mut vertices = Vec::new();
    for j in 0..5 {
        for i in 0..5 {
            vertices.push((i as f64 * 10.0, j as f64 * 10.0));
        }
    }
    let mut cells = Vec::new();
    for j in 0..4 {
        for i in 0..4 {
            let v0 = j * 5 + i;
            cells.push(vec![v0, v0 + 1, v0 + 6, v0 + 5]);
        }
    }
    let mut registry = GridRegistry::new();
    registry
        .install_vertex("disv", VertexGridSpec { nlay: 2, vertices, cells, idomain: None })
        .unwrap();
    let installed = registry.get("disv").unwrap();

    // Points within the centroid hull of the interior cells.
    let xy = scattered_points(12, 12.0, 28.0, 12.0, 28.0, 3);
    let points = xy.iter().map(|&(x, y)| QueryPoint { x, y, layer: 2 }).collect();
    let points = QueryPoints::new(points).unwrap();
    let set = compute_factors(installed, &points, FactorMethod::Smooth).unwrap();
    assert_eq!(set.num_success(), 12);
    assert!(set.points().iter().all(|p| p.donors.iter().all(|d| d.cell >= 16)));

    let values = plane_at(&cell_centres(installed.grid()), 1.0, 0.5, 0.25);
    for (p, value) in points.iter().zip(interpolate(&set, &values)) {
        assert_approx_eq!(value.unwrap(), 1.0 + 0.5 * p.x + 0.25 * p.y, 1e-9);
    }
}

#[test]
fn test_calc_writes_artifacts_that_round_trip() {
    let dir = scratch_dir().unwrap();
    let mut registry = GridRegistry::new();
    registry
        .install_structured("model", StructuredGridSpec::uniform(5, 5, 2, 100.0, 100.0))
        .unwrap();

    let points = QueryPoints::from_arrays(
        &[50.0, 260.0, 310.0, 999.0],
        &[450.0, 120.0, 333.0, 50.0],
        &[1, 2, 1, 1],
    )
    .unwrap();

    let boundary = dir.path().join("bounds.bln");
    let mut loaded = Vec::new();
    for format in [FactorFileFormat::Ascii, FactorFileFormat::Binary] {
        let path = dir.path().join(format!("factors.{}", format.code()));
        let set = calc_interp_factors(
            &registry,
            "MODEL",
            &points,
            FactorMethod::Smooth,
            &path,
            format,
            &boundary,
        )
        .unwrap();
        assert_eq!(set.success(), vec![1, 1, 1, 0]);
        // Cell centre of the top-left cell.
        assert_eq!(set.get(0).unwrap().donors.len(), 1);

        let back = read_factor_file(&path, format).unwrap();
        assert_eq!(back.points(), set.points());
        assert_eq!(back.success(), set.success());
        loaded.push(back);
    }
    let values: Vec<f64> = (0..50).map(|c| c as f64 * 1.5).collect();
    assert_eq!(interpolate(&loaded[0], &values), interpolate(&loaded[1], &values));

    let bln = std::fs::read_to_string(&boundary).unwrap();
    assert_eq!(bln.lines().filter(|l| l.ends_with(",1")).count(), 3);
}

#[test]
fn test_unknown_and_uninstalled_grids() {
    let dir = scratch_dir().unwrap();
    let points = QueryPoints::from_arrays(&[1.0], &[1.0], &[1]).unwrap();
    let factor = dir.path().join("f.txt");
    let boundary = dir.path().join("b.bln");

    let mut registry = GridRegistry::new();
    let err = calc_interp_factors(
        &registry,
        "g",
        &points,
        FactorMethod::Nearest,
        &factor,
        FactorFileFormat::Ascii,
        &boundary,
    )
    .unwrap_err();
    assert!(matches!(err, PostprocError::GridNotInstalled(_)));

    registry
        .install_structured("g", StructuredGridSpec::uniform(2, 2, 1, 1.0, 1.0))
        .unwrap();
    registry.uninstall("g").unwrap();
    let err = calc_interp_factors(
        &registry,
        "g",
        &points,
        FactorMethod::Nearest,
        &factor,
        FactorFileFormat::Ascii,
        &boundary,
    )
    .unwrap_err();
    assert!(matches!(err, PostprocError::GridUninstalled(_)));
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(!factor.exists());
}
