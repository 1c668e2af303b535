//! Installing grids from MODFLOW 6 binary grid files.

use grid_registry::{Grid, GridRegistry};
use gw_common::{ErrorKind, GridKind};
use test_utils::{assert_coords_approx_eq, scratch_dir, write_scratch_file, GrbFileBuilder};

#[test]
fn test_install_dis_grb() {
    let dir = scratch_dir().unwrap();
    let bytes =
        GrbFileBuilder::dis(20, 40, 3, &[250.0; 20], &[250.0; 40], 0.0, 0.0, 0.0, None).build();
    let path = write_scratch_file(dir.path(), "freyberg.dis.grb", &bytes).unwrap();

    let mut registry = GridRegistry::new();
    let summary = registry.install_from_grb("freyberg", &path).unwrap();
    assert_eq!(summary.kind, GridKind::Structured);
    assert_eq!(summary.kind.code(), 1);
    assert_eq!(summary.ncells, 2400);
    assert_eq!(summary.dims, [20, 40, 3]);

    let installed = registry.get("FREYBERG").unwrap();
    match installed.grid() {
        Grid::Structured(g) => {
            assert_eq!(g.locate(125.0, 9875.0), Some((0, 0)));
            let (x, y) = g.cell_center_world(39, 19);
            assert_coords_approx_eq!((x, y), (4875.0, 125.0), 1e-9);
        }
        other => panic!("expected structured grid, got {:?}", other.kind()),
    }
}

#[test]
fn test_install_dis_grb_with_offset_and_idomain() {
    let dir = scratch_dir().unwrap();
    let idomain = Some(vec![1, 1, 0, 1]);
    let bytes =
        GrbFileBuilder::dis(2, 2, 1, &[10.0, 10.0], &[10.0, 10.0], 500.0, 1000.0, 0.0, idomain)
            .build();
    let path = write_scratch_file(dir.path(), "small.grb", &bytes).unwrap();

    let mut registry = GridRegistry::new();
    registry.install_from_grb("small", &path).unwrap();
    let grid = registry.get("small").unwrap().grid();
    assert!(!grid.is_active(2));
    assert!(grid.is_active(3));
    match grid {
        Grid::Structured(g) => {
            // Bottom row is row 1.
            assert_eq!(g.locate(505.0, 1005.0), Some((1, 0)));
        }
        _ => panic!("expected structured grid"),
    }
}

#[test]
fn test_install_disv_grb_rotated() {
    let dir = scratch_dir().unwrap();
    let vertices = vec![(0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (0.0, 1.0), (1.0, 1.0), (2.0, 1.0)];
    let cells = vec![vec![0, 1, 4, 3], vec![1, 2, 5, 4]];
    let bytes = GrbFileBuilder::disv(2, &vertices, &cells, 100.0, 200.0, 90.0).build();
    let path = write_scratch_file(dir.path(), "v.disv.grb", &bytes).unwrap();

    let mut registry = GridRegistry::new();
    let summary = registry.install_from_grb("v", &path).unwrap();
    assert_eq!(summary.kind, GridKind::Vertex);
    assert_eq!(summary.ncells, 4);
    assert_eq!(summary.dims, [2, 2, 6]);

    match registry.get("v").unwrap().grid() {
        Grid::Vertex(g) => {
            // Local (1.5, 0.5) rotated 90 degrees lands at (99.5, 201.5).
            assert_eq!(g.locate(99.5, 201.5), Some(1));
            assert_coords_approx_eq!(g.centroid(0), (99.5, 200.5), 1e-9);
            assert_eq!(g.outline_world(0).len(), 4);
        }
        _ => panic!("expected vertex grid"),
    }
}

#[test]
fn test_disu_grb_rejected() {
    let dir = scratch_dir().unwrap();
    let bytes = GrbFileBuilder::dis(2, 1, 1, &[1.0, 1.0], &[1.0], 0.0, 0.0, 0.0, None)
        .with_grid_type("DISU")
        .build();
    let path = write_scratch_file(dir.path(), "u.grb", &bytes).unwrap();

    let mut registry = GridRegistry::new();
    let err = registry.install_from_grb("u", &path).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(err.to_string().contains("DISU"));
    assert!(registry.is_empty());
}

#[test]
fn test_missing_and_truncated_grb() {
    let dir = scratch_dir().unwrap();
    let mut registry = GridRegistry::new();

    let err = registry
        .install_from_grb("missing", dir.path().join("nope.grb"))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);

    let bytes = GrbFileBuilder::dis(2, 1, 1, &[1.0, 1.0], &[1.0], 0.0, 0.0, 0.0, None).build();
    let path = write_scratch_file(dir.path(), "cut.grb", &bytes[..bytes.len() - 10]).unwrap();
    let err = registry.install_from_grb("cut", &path).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::FileFormat);
    assert!(registry.is_empty());
}
