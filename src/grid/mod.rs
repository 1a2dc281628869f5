//! Two-dimensional result grids with a declared coordinate mapping.

pub mod mosaic;
pub mod table;

use serde::{Deserialize, Serialize};

use crate::core::error::{HenonError, HenonResult};

/// One grid dimension: a named variable covering `[min, max]` in `len` cells.
///
/// An axis cut from a larger one with [`Axis::slice`] keeps sampling the
/// parent's cell centres, so a frame sweep hits bit-for-bit the coordinates
/// of the unified sweep even when `min`/`max` are rounded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Axis {
    pub name: String,
    pub min: f64,
    pub max: f64,
    pub len: usize,
    #[serde(skip)]
    lattice: Option<Lattice>,
}

/// Parent axis range and the index of this axis's first cell within it.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Lattice {
    min: f64,
    max: f64,
    len: usize,
    offset: usize,
}

/// Equality is over the declared range; where the cells were cut from is
/// not compared.
impl PartialEq for Axis {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.min == other.min
            && self.max == other.max
            && self.len == other.len
    }
}

impl Axis {
    pub fn new(name: impl Into<String>, min: f64, max: f64, len: usize) -> Self {
        Self {
            name: name.into(),
            min,
            max,
            len,
            lattice: None,
        }
    }

    fn lattice(&self) -> Lattice {
        self.lattice.unwrap_or(Lattice {
            min: self.min,
            max: self.max,
            len: self.len,
            offset: 0,
        })
    }

    pub fn validate(&self) -> HenonResult<()> {
        if self.len == 0 {
            return Err(HenonError::precondition(format!("axis '{}' has no cells", self.name)));
        }
        if !self.min.is_finite() || !self.max.is_finite() || self.min > self.max {
            return Err(HenonError::precondition(format!(
                "axis '{}' has an invalid range [{}, {}]",
                self.name, self.min, self.max
            )));
        }
        Ok(())
    }

    pub fn width(&self) -> f64 {
        self.max - self.min
    }

    pub fn cell_width(&self) -> f64 {
        self.width() / self.len as f64
    }

    /// Coordinate sampled by cell `i`: the centre of the cell, evaluated on
    /// the outermost parent axis.
    pub fn value_at(&self, i: usize) -> f64 {
        let l = self.lattice();
        l.min + ((l.offset + i) as f64 + 0.5) * (l.max - l.min) / l.len as f64
    }

    pub fn values(&self) -> Vec<f64> {
        (0..self.len).map(|i| self.value_at(i)).collect()
    }

    /// Uniform half-open bin holding `v`; `max` itself goes to the last bin.
    pub fn bin_of(&self, v: f64) -> Option<usize> {
        if !v.is_finite() || v < self.min || v > self.max || self.len == 0 {
            return None;
        }
        if self.width() == 0.0 {
            return Some(0);
        }
        let idx = ((v - self.min) / self.width() * self.len as f64) as usize;
        Some(idx.min(self.len - 1))
    }

    /// Sub-axis covering cells `start..start + len`. Its header range is
    /// rounded; its sampled coordinates are the parent's.
    pub fn slice(&self, start: usize, len: usize) -> Axis {
        let w = self.cell_width();
        let min = self.min + start as f64 * w;
        let max = if start + len == self.len {
            self.max
        } else {
            self.min + (start + len) as f64 * w
        };
        let parent = self.lattice();
        Axis {
            lattice: Some(Lattice {
                offset: parent.offset + start,
                ..parent
            }),
            ..Axis::new(self.name.clone(), min, max, len)
        }
    }

    /// Splits the axis into `parts` equally sized sub-axes, in order.
    pub fn split(&self, parts: usize) -> HenonResult<Vec<Axis>> {
        if parts == 0 || self.len % parts != 0 {
            return Err(HenonError::precondition(format!(
                "axis '{}' of {} cells cannot be split into {} equal parts",
                self.name, self.len, parts
            )));
        }
        let each = self.len / parts;
        Ok((0..parts).map(|p| self.slice(p * each, each)).collect())
    }
}

/// Row-major grid of optional values. `None` marks a cell without data
/// (diverged, failed, or never computed).
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    rows: Axis,
    cols: Axis,
    cells: Vec<Option<f64>>,
}

impl Grid {
    pub fn filled(rows: Axis, cols: Axis, value: Option<f64>) -> Self {
        let n = rows.len * cols.len;
        Self {
            rows,
            cols,
            cells: vec![value; n],
        }
    }

    /// Builds a grid from row-major cells. Non-finite values become `None`.
    pub fn from_cells(rows: Axis, cols: Axis, cells: Vec<Option<f64>>) -> HenonResult<Self> {
        if cells.len() != rows.len * cols.len {
            return Err(HenonError::precondition(format!(
                "{} cells supplied for a {}x{} grid",
                cells.len(),
                rows.len,
                cols.len
            )));
        }
        let cells = cells
            .into_iter()
            .map(|c| c.filter(|v| v.is_finite()))
            .collect();
        Ok(Self { rows, cols, cells })
    }

    pub fn from_rows(rows: Axis, cols: Axis, data: Vec<Vec<Option<f64>>>) -> HenonResult<Self> {
        if data.len() != rows.len || data.iter().any(|r| r.len() != cols.len) {
            return Err(HenonError::precondition(format!(
                "row data does not form a {}x{} grid",
                rows.len, cols.len
            )));
        }
        Self::from_cells(rows, cols, data.into_iter().flatten().collect())
    }

    pub fn rows(&self) -> &Axis {
        &self.rows
    }

    pub fn cols(&self) -> &Axis {
        &self.cols
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows.len, self.cols.len)
    }

    pub fn cells(&self) -> &[Option<f64>] {
        &self.cells
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row >= self.rows.len || col >= self.cols.len {
            return None;
        }
        self.cells[row * self.cols.len + col]
    }

    /// Stores `value` at (`row`, `col`); non-finite values become `None`.
    pub fn set(&mut self, row: usize, col: usize, value: Option<f64>) -> HenonResult<()> {
        if row >= self.rows.len || col >= self.cols.len {
            return Err(HenonError::precondition(format!(
                "cell ({row}, {col}) is outside a {}x{} grid",
                self.rows.len, self.cols.len
            )));
        }
        self.cells[row * self.cols.len + col] = value.filter(|v| v.is_finite());
        Ok(())
    }

    pub fn row(&self, row: usize) -> &[Option<f64>] {
        let w = self.cols.len;
        &self.cells[row * w..(row + 1) * w]
    }

    pub fn row_iter(&self) -> impl DoubleEndedIterator<Item = &[Option<f64>]> + '_ {
        self.cells.chunks(self.cols.len.max(1))
    }

    pub fn missing_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_none()).count()
    }

    /// (min, max) over present cells.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        self.cells.iter().flatten().fold(None, |acc, &v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
    }

    pub fn map(&self, f: impl Fn(f64) -> f64) -> Grid {
        Grid {
            rows: self.rows.clone(),
            cols: self.cols.clone(),
            cells: self
                .cells
                .iter()
                .map(|c| c.map(&f).filter(|v| v.is_finite()))
                .collect(),
        }
    }

    /// Like [`Grid::map`], with the cell's (row, col) passed along.
    pub fn map_cells(&self, f: impl Fn(usize, usize, f64) -> f64) -> Grid {
        let width = self.cols.len.max(1);
        Grid {
            rows: self.rows.clone(),
            cols: self.cols.clone(),
            cells: self
                .cells
                .iter()
                .enumerate()
                .map(|(idx, c)| c.map(|v| f(idx / width, idx % width, v)).filter(|v| v.is_finite()))
                .collect(),
        }
    }

    /// Reverses the row order; the row axis keeps its range.
    pub fn flip_rows(&self) -> Grid {
        let cells = self.row_iter().rev().flatten().copied().collect();
        Grid {
            rows: self.rows.clone(),
            cols: self.cols.clone(),
            cells,
        }
    }

    /// Copy of the block `rows × cols` starting at (`row0`, `col0`), with
    /// matching sub-axes.
    pub fn sub_grid(
        &self,
        row0: usize,
        col0: usize,
        rows: usize,
        cols: usize,
    ) -> HenonResult<Grid> {
        if row0 + rows > self.rows.len || col0 + cols > self.cols.len {
            return Err(HenonError::precondition(format!(
                "block {rows}x{cols} at ({row0}, {col0}) exceeds a {}x{} grid",
                self.rows.len, self.cols.len
            )));
        }
        let mut cells = Vec::with_capacity(rows * cols);
        for r in row0..row0 + rows {
            cells.extend_from_slice(&self.row(r)[col0..col0 + cols]);
        }
        Ok(Grid {
            rows: self.rows.slice(row0, rows),
            cols: self.cols.slice(col0, cols),
            cells,
        })
    }
}
