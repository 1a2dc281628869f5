//! Delimited text tables: one grid per table, several tables per file.
//!
//! ```text
//! # comment lines are ignored
//! TABLE[2x3]: 0.5 < a < 1.5 , -0.5 < b < 0.5
//! 4.2e-1|9.9999|-1.62e0
//! 0e0|1e0|1.25e1
//!
//! ```
//!
//! Values are written in scientific notation, so every computed value carries
//! an exponent; the missing-data token `9.9999` never does and cannot collide.

use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Axis, Grid};
use crate::core::error::{HenonError, HenonResult};
use crate::io::atomic::atomic_write;

pub const TABLE_MARKER: &str = "TABLE";
pub const END_MARKER: &str = "EOF";
pub const MISSING_TOKEN: &str = "9.9999";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableFormat {
    pub delimiter: char,
    pub comment: char,
    /// Token written for, and read as, a cell without data.
    pub missing: String,
    /// Fixed number of mantissa decimals; `None` writes the shortest exact form.
    pub precision: Option<usize>,
}

impl Default for TableFormat {
    fn default() -> Self {
        Self {
            delimiter: '|',
            comment: '#',
            missing: MISSING_TOKEN.to_string(),
            precision: None,
        }
    }
}

impl TableFormat {
    pub fn validate(&self) -> HenonResult<()> {
        if self.delimiter.is_whitespace()
            || self.delimiter == self.comment
            || is_numeric_char(self.delimiter)
        {
            return Err(HenonError::precondition(format!(
                "unusable table delimiter {:?}",
                self.delimiter
            )));
        }
        // a numeric comment marker would swallow data rows such as `-1e0|...`
        if self.comment.is_whitespace() || is_numeric_char(self.comment) {
            return Err(HenonError::precondition(format!(
                "unusable comment marker {:?}",
                self.comment
            )));
        }
        if self.missing.contains(['e', 'E']) || parse_number(&self.missing).is_none() {
            return Err(HenonError::precondition(format!(
                "missing-data token '{}' must be a plain decimal without exponent",
                self.missing
            )));
        }
        Ok(())
    }

    pub fn format_value(&self, value: Option<f64>) -> String {
        match (value, self.precision) {
            (None, _) => self.missing.clone(),
            (Some(v), None) => format!("{v:e}"),
            (Some(v), Some(p)) => format!("{v:.p$e}"),
        }
    }
}

/// Characters that can appear in a numeric literal.
fn is_numeric_char(c: char) -> bool {
    c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E')
}

/// Strict numeric literal: `[+-]?digits[.digits]?([eE][+-]?digits)?`.
///
/// Words such as `inf` or `NaN`, and anything resembling an expression, are
/// rejected, as are literals that overflow to infinity.
pub fn parse_number(token: &str) -> Option<f64> {
    let b = token.as_bytes();
    let n = b.len();
    let mut i = 0;

    if i < n && (b[i] == b'+' || b[i] == b'-') {
        i += 1;
    }
    let int_start = i;
    while i < n && b[i].is_ascii_digit() {
        i += 1;
    }
    let mut digits = i - int_start;
    if i < n && b[i] == b'.' {
        i += 1;
        let frac_start = i;
        while i < n && b[i].is_ascii_digit() {
            i += 1;
        }
        digits += i - frac_start;
    }
    if digits == 0 {
        return None;
    }
    if i < n && (b[i] == b'e' || b[i] == b'E') {
        i += 1;
        if i < n && (b[i] == b'+' || b[i] == b'-') {
            i += 1;
        }
        let exp_start = i;
        while i < n && b[i].is_ascii_digit() {
            i += 1;
        }
        if i == exp_start {
            return None;
        }
    }
    if i != n {
        return None;
    }
    token.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn check_axis_name(axis: &Axis) -> HenonResult<()> {
    let bad = axis.name.is_empty()
        || axis
            .name
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '<' | ',' | ':' | '[' | ']'));
    if bad {
        return Err(HenonError::precondition(format!(
            "axis name '{}' cannot be written to a table header",
            axis.name
        )));
    }
    Ok(())
}

pub fn header_line(grid: &Grid) -> String {
    let (r, c) = (grid.rows(), grid.cols());
    format!(
        "{TABLE_MARKER}[{}x{}]: {} < {} < {} , {} < {} < {}",
        r.len, c.len, r.min, r.name, r.max, c.min, c.name, c.max
    )
}

/// Full text of one table, terminated by a blank line.
pub fn render_table(grid: &Grid, format: &TableFormat) -> HenonResult<String> {
    format.validate()?;
    check_axis_name(grid.rows())?;
    check_axis_name(grid.cols())?;

    let mut out = header_line(grid);
    out.push('\n');
    let delim = format.delimiter.to_string();
    for row in grid.row_iter() {
        let fields: Vec<String> = row.iter().map(|v| format.format_value(*v)).collect();
        out.push_str(&fields.join(&delim));
        out.push('\n');
    }
    out.push('\n');
    Ok(out)
}

/// Comment lines describing a file; ignored when read back.
pub fn preamble(description: &str) -> Vec<String> {
    vec![
        format!(
            "generated by {} {} on {}",
            env!("CARGO_PKG_NAME"),
            env!("CARGO_PKG_VERSION"),
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
        ),
        description.to_string(),
    ]
}

/// Single owner of an output stream. Each table goes out in one `write_all`,
/// and `&mut self` keeps two tables from interleaving.
pub struct TableWriter<W: Write> {
    inner: W,
    format: TableFormat,
    written: usize,
}

impl<W: Write> TableWriter<W> {
    pub fn new(inner: W, format: TableFormat) -> HenonResult<Self> {
        format.validate()?;
        Ok(Self {
            inner,
            format,
            written: 0,
        })
    }

    pub fn write_comments(&mut self, lines: &[String]) -> HenonResult<()> {
        let mut text = String::new();
        for line in lines {
            text.push(self.format.comment);
            text.push(' ');
            text.push_str(line);
            text.push('\n');
        }
        self.inner.write_all(text.as_bytes())?;
        Ok(())
    }

    pub fn write_grid(&mut self, grid: &Grid) -> HenonResult<()> {
        let text = render_table(grid, &self.format)?;
        self.inner.write_all(text.as_bytes())?;
        self.written += 1;
        Ok(())
    }

    pub fn tables_written(&self) -> usize {
        self.written
    }

    pub fn finish(mut self) -> HenonResult<W> {
        self.inner.flush()?;
        Ok(self.inner)
    }
}

/// Appends tables to `path`, creating the file if needed.
pub fn append_tables(path: &Path, grids: &[Grid], format: &TableFormat) -> HenonResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let mut writer = TableWriter::new(file, format.clone())?;
    for grid in grids {
        writer.write_grid(grid)?;
    }
    writer.finish()?;
    debug!(path = %path.display(), tables = grids.len(), "appended tables");
    Ok(())
}

/// Replaces `path` with the given tables in one atomic write.
pub fn write_tables(
    path: &Path,
    grids: &[Grid],
    format: &TableFormat,
    comments: &[String],
) -> HenonResult<()> {
    let mut writer = TableWriter::new(Vec::new(), format.clone())?;
    writer.write_comments(comments)?;
    for grid in grids {
        writer.write_grid(grid)?;
    }
    let bytes = writer.finish()?;
    atomic_write(path, bytes)?;
    debug!(path = %path.display(), tables = grids.len(), "wrote tables");
    Ok(())
}

struct PendingTable {
    index: usize,
    header_line: usize,
    rows: Axis,
    cols: Axis,
    declared: Option<(usize, usize)>,
    data: Vec<Vec<Option<f64>>>,
}

impl PendingTable {
    fn finish(mut self) -> HenonResult<Grid> {
        let at = self.header_line;
        let found_rows = self.data.len();
        if found_rows == 0 {
            return Err(HenonError::malformed(at, Some(self.index), "table has no rows"));
        }
        let found_cols = self.data[0].len();
        if let Some((rows, cols)) = self.declared {
            if rows != found_rows || cols != found_cols {
                return Err(HenonError::malformed(
                    at,
                    Some(self.index),
                    format!("declared {rows}x{cols}, found {found_rows}x{found_cols}"),
                ));
            }
        }
        self.rows.len = found_rows;
        self.cols.len = found_cols;
        Grid::from_rows(self.rows, self.cols, self.data)
            .map_err(|e| HenonError::malformed(at, Some(self.index), e.to_string()))
    }
}

fn parse_range(part: &str, line: usize, table: usize) -> HenonResult<(String, f64, f64)> {
    let tokens: Vec<&str> = part.split_whitespace().collect();
    let bad = || {
        HenonError::malformed(
            line,
            Some(table),
            format!("expected '<min> < <name> < <max>', found '{}'", part.trim()),
        )
    };
    if tokens.len() != 5 || tokens[1] != "<" || tokens[3] != "<" {
        return Err(bad());
    }
    let min = parse_number(tokens[0]).ok_or_else(bad)?;
    let max = parse_number(tokens[4]).ok_or_else(bad)?;
    Ok((tokens[2].to_string(), min, max))
}

fn parse_header(text: &str, line: usize, table: usize) -> HenonResult<PendingTable> {
    let rest = &text[TABLE_MARKER.len()..];
    let (shape_part, body) = rest
        .split_once(':')
        .ok_or_else(|| HenonError::malformed(line, Some(table), "header has no value ranges"))?;

    let shape_part = shape_part.trim();
    let declared = if shape_part.is_empty() {
        None
    } else {
        let inner = shape_part
            .strip_prefix('[')
            .and_then(|s| s.strip_suffix(']'))
            .and_then(|s| s.split_once('x'))
            .and_then(|(r, c)| {
                Some((r.trim().parse::<usize>().ok()?, c.trim().parse::<usize>().ok()?))
            });
        match inner {
            Some(shape) => Some(shape),
            None => {
                return Err(HenonError::malformed(
                    line,
                    Some(table),
                    format!("invalid shape declaration '{shape_part}'"),
                ))
            }
        }
    };

    let parts: Vec<&str> = body.split(',').collect();
    if parts.len() != 2 {
        return Err(HenonError::malformed(
            line,
            Some(table),
            format!("expected two value ranges, found {}", parts.len()),
        ));
    }
    let (rname, rmin, rmax) = parse_range(parts[0], line, table)?;
    let (cname, cmin, cmax) = parse_range(parts[1], line, table)?;

    Ok(PendingTable {
        index: table,
        header_line: line,
        rows: Axis::new(rname, rmin, rmax, 0),
        cols: Axis::new(cname, cmin, cmax, 0),
        declared,
        data: Vec::new(),
    })
}

fn parse_row(
    text: &str,
    format: &TableFormat,
    line: usize,
    table: usize,
) -> HenonResult<Vec<Option<f64>>> {
    let mut fields: Vec<&str> = text.split(format.delimiter).map(str::trim).collect();
    if fields.len() > 1 && fields.last().is_some_and(|f| f.is_empty()) {
        fields.pop();
    }
    fields
        .into_iter()
        .enumerate()
        .map(|(col, field)| {
            if field == format.missing {
                Ok(None)
            } else if field.is_empty() {
                Err(HenonError::malformed(
                    line,
                    Some(table),
                    format!("empty field in column {col}"),
                ))
            } else {
                parse_number(field).map(Some).ok_or_else(|| {
                    HenonError::malformed(
                        line,
                        Some(table),
                        format!("invalid numeric token '{field}'"),
                    )
                })
            }
        })
        .collect()
}

/// Parses every table in `reader`, in file order.
pub fn read_tables<R: BufRead>(reader: R, format: &TableFormat) -> HenonResult<Vec<Grid>> {
    format.validate()?;
    let mut grids = Vec::new();
    let mut current: Option<PendingTable> = None;

    for (idx, raw) in reader.lines().enumerate() {
        let line_no = idx + 1;
        let raw = raw?;
        let text = raw.trim();

        if text.starts_with(format.comment) {
            continue;
        }
        if text.is_empty() {
            // a blank line right after a header is layout, not a terminator
            if current.as_ref().is_some_and(|t| !t.data.is_empty()) {
                if let Some(t) = current.take() {
                    grids.push(t.finish()?);
                }
            }
            continue;
        }
        if text == END_MARKER || text.starts_with(TABLE_MARKER) {
            if let Some(t) = current.take() {
                grids.push(t.finish()?);
            }
            if text != END_MARKER {
                current = Some(parse_header(text, line_no, grids.len())?);
            }
            continue;
        }

        let table = current.as_mut().ok_or_else(|| {
            HenonError::malformed(line_no, None, "data row before any TABLE header")
        })?;
        let row = parse_row(text, format, line_no, table.index)?;
        let expected = table
            .declared
            .map(|(_, c)| c)
            .or_else(|| table.data.first().map(Vec::len));
        if let Some(expected) = expected {
            if row.len() != expected {
                return Err(HenonError::malformed(
                    line_no,
                    Some(table.index),
                    format!("expected {expected} columns, found {}", row.len()),
                ));
            }
        }
        table.data.push(row);
    }

    if let Some(t) = current.take() {
        grids.push(t.finish()?);
    }
    Ok(grids)
}

pub fn read_tables_from_path(path: &Path, format: &TableFormat) -> HenonResult<Vec<Grid>> {
    let file = fs::File::open(path)?;
    let grids = read_tables(BufReader::new(file), format)?;
    debug!(path = %path.display(), tables = grids.len(), "read tables");
    Ok(grids)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Grid {
        Grid::from_rows(
            Axis::new("a", 0.5, 1.5, 2),
            Axis::new("b", -0.5, 0.5, 3),
            vec![
                vec![Some(0.42), None, Some(-1.62)],
                vec![Some(0.0), Some(1.0), Some(12.5)],
            ],
        )
        .unwrap()
    }

    #[test]
    fn strict_numbers() {
        assert_eq!(parse_number("4.2e-1"), Some(0.42));
        assert_eq!(parse_number("-1.62e0"), Some(-1.62));
        assert_eq!(parse_number("+3"), Some(3.0));
        assert_eq!(parse_number(".5"), Some(0.5));
        assert_eq!(parse_number("5."), Some(5.0));
        for bad in ["", "-", ".", "e5", "1e", "inf", "NaN", "1+1", "2*3", "0x10", "1e400", " 1"] {
            assert_eq!(parse_number(bad), None, "{bad:?} should be rejected");
        }
    }

    #[test]
    fn rendered_text() {
        let text = render_table(&sample(), &TableFormat::default()).unwrap();
        insta::assert_snapshot!(text.trim_end(), @r"
TABLE[2x3]: 0.5 < a < 1.5 , -0.5 < b < 0.5
4.2e-1|9.9999|-1.62e0
0e0|1e0|1.25e1
");
    }

    #[test]
    fn numeric_delimiter_or_comment_is_rejected() {
        for c in ['-', '+', '.', 'e', 'E', '0', '7'] {
            let as_comment = TableFormat {
                comment: c,
                ..Default::default()
            };
            assert!(as_comment.validate().is_err(), "comment {c:?}");
            let as_delimiter = TableFormat {
                delimiter: c,
                ..Default::default()
            };
            assert!(as_delimiter.validate().is_err(), "delimiter {c:?}");
        }
        let semicolons = TableFormat {
            delimiter: ';',
            comment: '%',
            ..Default::default()
        };
        assert!(semicolons.validate().is_ok());
    }

    #[test]
    fn negative_rows_are_not_read_as_comments() {
        let format = TableFormat {
            comment: '-',
            ..Default::default()
        };
        let text = "TABLE: 0 < a < 1 , 0 < b < 1\n1e0|2e0\n-1e0|3e0\n";
        let read = read_tables(text.as_bytes(), &format);
        assert!(matches!(read, Err(HenonError::Precondition(_))));
        let rendered = render_table(&sample(), &format);
        assert!(matches!(rendered, Err(HenonError::Precondition(_))));
    }

    #[test]
    fn fixed_precision() {
        let format = TableFormat {
            precision: Some(3),
            ..Default::default()
        };
        assert_eq!(format.format_value(Some(0.42)), "4.200e-1");
        assert_eq!(format.format_value(None), "9.9999");
    }

    #[test]
    fn round_trip_in_memory() {
        let grid = sample();
        let mut writer = TableWriter::new(Vec::new(), TableFormat::default()).unwrap();
        writer.write_comments(&preamble("test table")).unwrap();
        writer.write_grid(&grid).unwrap();
        writer.write_grid(&grid.map(|v| v * 2.0)).unwrap();
        assert_eq!(writer.tables_written(), 2);
        let bytes = writer.finish().unwrap();

        let back = read_tables(bytes.as_slice(), &TableFormat::default()).unwrap();
        assert_eq!(back.len(), 2);
        assert_eq!(back[0], grid);
        assert_eq!(back[1].get(1, 2), Some(25.0));
    }

    #[test]
    fn tolerates_loose_layout() {
        let text = concat!(
            "# produced elsewhere\n\n\n",
            "TABLE: 0 < a < 1 , 0 < b < 1 \n\n",
            " 1.0 | 2.0 |\n 3.0 |9.9999 |\nEOF",
        );
        let grids = read_tables(text.as_bytes(), &TableFormat::default()).unwrap();
        assert_eq!(grids.len(), 1);
        assert_eq!(grids[0].shape(), (2, 2));
        assert_eq!(grids[0].get(1, 1), None);
        assert_eq!(grids[0].get(1, 0), Some(3.0));
    }

    fn malformed_line(text: &str) -> usize {
        match read_tables(text.as_bytes(), &TableFormat::default()) {
            Err(HenonError::Malformed { line, .. }) => line,
            other => panic!("expected malformed error, got {other:?}"),
        }
    }

    #[test]
    fn malformed_inputs_report_lines() {
        assert_eq!(malformed_line("1e0|2e0\n"), 1);
        assert_eq!(malformed_line("TABLE[1x2]: 0 < a < 1 , 0 < b < 1\n1e0|2e0|3e0\n"), 2);
        assert_eq!(malformed_line("TABLE: 0 < a < 1 , 0 < b < 1\n1e0|2e0\n3e0\n"), 3);
        assert_eq!(malformed_line("TABLE: 0 < a < 1 , 0 < b < 1\n1e0|__import__\n"), 2);
        assert_eq!(malformed_line("TABLE: 0 < a < 1\n1e0\n"), 1);
        assert_eq!(malformed_line("TABLE\n1e0\n"), 1);
        assert_eq!(malformed_line("TABLE[3x1]: 0 < a < 1 , 0 < b < 1\n1e0\n2e0\n"), 1);
        assert_eq!(malformed_line("TABLE: 0 < a < 1 , 0 < b < 1\n1e0||2e0\n"), 2);
    }

    #[test]
    fn rejects_unwritable_axis_names() {
        let grid = Grid::filled(Axis::new("x 0", 0.0, 1.0, 1), Axis::new("y", 0.0, 1.0, 1), None);
        assert!(render_table(&grid, &TableFormat::default()).is_err());
    }
}
