use std::fs;

use henon_explorer::core::HenonError;
use henon_explorer::grid::table::{
    append_tables, read_tables, read_tables_from_path, write_tables, TableFormat, TableWriter,
};
use henon_explorer::grid::{Axis, Grid};

fn exponent_grid() -> Grid {
    Grid::from_rows(
        Axis::new("a", 0.5, 1.5, 3),
        Axis::new("b", -0.5, 0.5, 2),
        vec![
            vec![Some(0.0), Some(-1.2039728043259361)],
            vec![None, Some(0.41922)],
            vec![Some(1e-300), Some(-9.9999)],
        ],
    )
    .unwrap()
}

#[test]
fn sentinel_and_ranges_survive_a_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("grids").join("max.txt");
    let grid = exponent_grid();
    let format = TableFormat::default();
    write_tables(&path, std::slice::from_ref(&grid), &format, &["header".into()]).unwrap();

    let back = read_tables_from_path(&path, &TableFormat::default()).unwrap();
    assert_eq!(back, vec![grid.clone()]);
    assert_eq!(back[0].get(1, 0), None);
    // a computed value equal to the sentinel's digits is still a value
    assert_eq!(back[0].get(2, 1), Some(-9.9999));
    assert_eq!(back[0].get(2, 0), Some(1e-300));
    assert_eq!(back[0].rows(), grid.rows());
    assert_eq!(back[0].cols(), grid.cols());
}

#[test]
fn appended_tables_read_back_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("frames.txt");
    let format = TableFormat::default();
    let first = exponent_grid();
    let second = first.map(|v| v + 1.0);

    append_tables(&path, std::slice::from_ref(&first), &format).unwrap();
    append_tables(&path, std::slice::from_ref(&second), &format).unwrap();

    let back = read_tables_from_path(&path, &format).unwrap();
    assert_eq!(back, vec![first, second]);
}

#[test]
fn custom_format_round_trips() {
    let format = TableFormat {
        delimiter: ',',
        comment: ';',
        missing: "-999.0".into(),
        precision: None,
    };
    let grid = exponent_grid();
    let mut w = TableWriter::new(Vec::new(), format.clone()).unwrap();
    w.write_comments(&["custom".into()]).unwrap();
    w.write_grid(&grid).unwrap();
    let text = String::from_utf8(w.finish().unwrap()).unwrap();
    assert!(text.starts_with("; custom\n"));
    assert!(text.contains("-999.0"));
    assert_eq!(read_tables(text.as_bytes(), &format).unwrap(), vec![grid]);
}

#[test]
fn sentinel_with_exponent_is_rejected() {
    let format = TableFormat {
        missing: "9.9e9".into(),
        ..Default::default()
    };
    assert!(TableWriter::new(Vec::new(), format).is_err());
}

#[test]
fn malformed_file_reports_line_and_table() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.txt");
    fs::write(
        &path,
        concat!(
            "# two tables\n",
            "TABLE[1x2]: 0 < a < 1 , 0 < b < 1\n1e0|2e0\n\n",
            "TABLE[1x2]: 1 < a < 2 , 0 < b < 1\n1e0|abc\n",
        ),
    )
    .unwrap();
    match read_tables_from_path(&path, &TableFormat::default()) {
        Err(HenonError::Malformed { line, table, reason }) => {
            assert_eq!(line, 6);
            assert_eq!(table, Some(1));
            assert!(reason.contains("abc"), "{reason}");
        }
        other => panic!("expected malformed error, got {other:?}"),
    }
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = read_tables_from_path(&dir.path().join("absent.txt"), &TableFormat::default())
        .unwrap_err();
    assert!(matches!(err, HenonError::Io(_)));
}
