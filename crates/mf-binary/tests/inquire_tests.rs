//! File inspection and precision inference on synthetic files.

use gw_common::{ErrorKind, OutputKind, Precision, Simulator};
use mf_binary::{inquire, open_budget, open_depvar};
use test_utils::{
    create_test_heads, scratch_dir, write_scratch_file, BudgetDims, BudgetFileBuilder,
    BudgetTiming, HeadFileBuilder,
};

fn head_file(precision: Precision, ntimes: usize) -> Vec<u8> {
    let heads = create_test_heads(4, 3, 2);
    let mut builder = HeadFileBuilder::new(precision);
    for t in 0..ntimes {
        let totim = (t + 1) as f64 * 10.0;
        builder = builder
            .time_step(t as i32 + 1, 1, totim, totim, "HEAD", 4, 3, &heads)
            .time_step(t as i32 + 1, 1, totim, totim, "DRAWDOWN", 4, 3, &heads);
    }
    builder.build()
}

#[test]
fn test_infers_single_precision() {
    let dir = scratch_dir().unwrap();
    let bytes = head_file(Precision::Single, 3);
    let path = write_scratch_file(dir.path(), "single.hds", &bytes).unwrap();

    let specs =
        inquire(&path, Simulator::Modflow, OutputKind::DependentVariable, None, None).unwrap();
    assert_eq!(specs.precision, Precision::Single);
    assert_eq!(specs.num_arrays, 12);
    assert_eq!(specs.num_times, 3);
    assert_eq!(specs.var_types, vec!["HEAD".to_string(), "DRAWDOWN".to_string()]);
}

#[test]
fn test_infers_double_precision() {
    let dir = scratch_dir().unwrap();
    let bytes = head_file(Precision::Double, 2);
    let path = write_scratch_file(dir.path(), "double.hds", &bytes).unwrap();

    let specs =
        inquire(&path, Simulator::Mf6Dis, OutputKind::DependentVariable, None, None).unwrap();
    assert_eq!(specs.precision, Precision::Double);
    assert_eq!(specs.num_arrays, 8);
    assert_eq!(specs.num_times, 2);
}

#[test]
fn test_explicit_wrong_precision_is_file_format_error() {
    let dir = scratch_dir().unwrap();
    let bytes = head_file(Precision::Double, 2);
    let path = write_scratch_file(dir.path(), "double.hds", &bytes).unwrap();

    let err = inquire(
        &path,
        Simulator::Modflow,
        OutputKind::DependentVariable,
        Some(Precision::Single),
        None,
    )
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::FileFormat);
}

#[test]
fn test_truncated_file_is_file_format_error() {
    let dir = scratch_dir().unwrap();
    let bytes = head_file(Precision::Single, 2);
    let path = write_scratch_file(dir.path(), "cut.hds", &bytes[..bytes.len() - 6]).unwrap();

    let err =
        inquire(&path, Simulator::Modflow, OutputKind::DependentVariable, None, None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::FileFormat);
    assert!(err.to_string().contains("cut.hds"));

    let err = open_depvar(&path, Simulator::Modflow, None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::FileFormat);
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = scratch_dir().unwrap();
    let err = inquire(
        dir.path().join("absent.hds"),
        Simulator::Modflow,
        OutputKind::DependentVariable,
        None,
        None,
    )
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
}

#[test]
fn test_budget_specs_and_header_table() {
    let dir = scratch_dir().unwrap();
    let dims = BudgetDims::new(3, 2, 1);
    let mut builder = BudgetFileBuilder::new(Precision::Double);
    for step in 1..=4 {
        let t = BudgetTiming::new(1.0, step as f64, step as f64);
        builder = builder
            .compact_array(step, 1, "STORAGE", dims, t, &[0.0; 6])
            .compact_list(step, 1, "WELLS", dims, t, &[(1, -1.0), (6, -2.0)]);
    }
    let path = write_scratch_file(dir.path(), "model.cbc", &builder.build()).unwrap();
    let table = dir.path().join("model.cbc.txt");

    let specs = inquire(
        &path,
        Simulator::Modflow,
        OutputKind::CellByCellFlow,
        None,
        Some(table.as_path()),
    )
    .unwrap();
    assert_eq!(specs.precision, Precision::Double);
    assert_eq!(specs.num_arrays, 8);
    assert_eq!(specs.num_times, 4);
    assert_eq!(specs.var_types, vec!["STORAGE".to_string(), "WELLS".to_string()]);

    let text = std::fs::read_to_string(&table).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 9);
    assert!(lines[0].contains("ndim3"));
    assert!(lines[2].contains("WELLS"));

    let reader = open_budget(&path, Simulator::Modflow, None).unwrap();
    assert_eq!(reader.precision(), Precision::Double);
}

#[test]
fn test_mt3d_concentration_file() {
    let dir = scratch_dir().unwrap();
    let bytes = HeadFileBuilder::new(Precision::Single)
        .mt3d_layer(1, 1, 1, 1.0, "CONCENTRATION", 2, 2, 1, &[0.0, 1.0, 2.0, 3.0])
        .mt3d_layer(2, 1, 1, 2.0, "CONCENTRATION", 2, 2, 1, &[0.0, 1.0, 2.0, 3.0])
        .build();
    let path = write_scratch_file(dir.path(), "MT3D001.UCN", &bytes).unwrap();

    let specs = inquire(&path, Simulator::Mt3d, OutputKind::DependentVariable, None, None).unwrap();
    assert_eq!(specs.precision, Precision::Single);
    assert_eq!(specs.num_times, 2);
}
