//! Parameter and initial-condition sweeps over a two-dimensional grid.
//!
//! Every cell is an independent, pure computation of its coordinates, so cells
//! fan out over rayon and are collected back in row-major order. A diverged or
//! failed cell is recorded in place and never stops the sweep. Randomized
//! samplers draw one seed per cell (or column) from the caller's generator
//! before fanning out, which keeps results identical across thread counts.

use std::fmt;
use std::str::FromStr;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::error::{HenonError, HenonResult};
use super::henon::{iterate, HenonParams, Orbit, Point2D, DEFAULT_DIVERGENCE_THRESHOLD};
use super::lyapunov::{estimate_for, Estimate, LyapunovPair, LyapunovSettings};
use crate::grid::{Axis, Grid};

/// Quantities a sweep axis can vary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Variable {
    A,
    B,
    X0,
    Y0,
}

impl Variable {
    pub fn name(self) -> &'static str {
        match self {
            Variable::A => "a",
            Variable::B => "b",
            Variable::X0 => "x0",
            Variable::Y0 => "y0",
        }
    }

    pub fn of_axis(axis: &Axis) -> HenonResult<Variable> {
        axis.name.parse()
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Variable {
    type Err = HenonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "a" => Ok(Variable::A),
            "b" => Ok(Variable::B),
            "x0" | "x" => Ok(Variable::X0),
            "y0" | "y" => Ok(Variable::Y0),
            other => Err(HenonError::precondition(format!(
                "unknown sweep variable '{other}' (expected a, b, x0 or y0)"
            ))),
        }
    }
}

/// Parameters and starting point of one run; sweeps override single fields.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunPoint {
    pub params: HenonParams,
    pub start: Point2D,
}

impl RunPoint {
    pub fn with(mut self, variable: Variable, value: f64) -> Self {
        match variable {
            Variable::A => self.params.a = value,
            Variable::B => self.params.b = value,
            Variable::X0 => self.start.x = value,
            Variable::Y0 => self.start.y = value,
        }
        self
    }
}

/// Result of one sweep cell.
#[derive(Debug, Clone, PartialEq)]
pub enum CellOutcome<T> {
    Computed(T),
    Diverged { step: usize },
    Failed(String),
}

impl<T> CellOutcome<T> {
    pub fn value(&self) -> Option<&T> {
        match self {
            CellOutcome::Computed(v) => Some(v),
            _ => None,
        }
    }
}

/// Cells that produced no value, by position.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SweepReport {
    pub computed: usize,
    pub diverged: Vec<(usize, usize, usize)>,
    pub failed: Vec<(usize, usize, String)>,
}

impl SweepReport {
    pub fn is_clean(&self) -> bool {
        self.diverged.is_empty() && self.failed.is_empty()
    }

    /// Logs a one-line summary plus the first few failing cells.
    pub fn log(&self, label: &str) {
        if self.is_clean() {
            info!(label, computed = self.computed, "sweep complete");
            return;
        }
        warn!(
            label,
            computed = self.computed,
            diverged = self.diverged.len(),
            failed = self.failed.len(),
            "sweep complete with missing cells"
        );
        for (row, col, step) in self.diverged.iter().take(5) {
            debug!(label, row, col, step, "cell diverged");
        }
        for (row, col, reason) in self.failed.iter().take(5) {
            warn!(label, row, col, %reason, "cell failed");
        }
    }
}

#[derive(Debug, Clone)]
pub struct SweepResult<T> {
    pub rows: Axis,
    pub cols: Axis,
    pub cells: Vec<CellOutcome<T>>,
}

impl<T> SweepResult<T> {
    pub fn get(&self, row: usize, col: usize) -> Option<&CellOutcome<T>> {
        self.cells.get(row * self.cols.len + col)
    }

    pub fn report(&self) -> SweepReport {
        let mut report = SweepReport::default();
        for (idx, cell) in self.cells.iter().enumerate() {
            let (row, col) = (idx / self.cols.len, idx % self.cols.len);
            match cell {
                CellOutcome::Computed(_) => report.computed += 1,
                CellOutcome::Diverged { step } => report.diverged.push((row, col, *step)),
                CellOutcome::Failed(reason) => report.failed.push((row, col, reason.clone())),
            }
        }
        report
    }

    /// Projects computed values into a grid; other cells are missing.
    pub fn to_grid(&self, value: impl Fn(&T) -> f64) -> HenonResult<Grid> {
        let cells = self.cells.iter().map(|c| c.value().map(&value)).collect();
        Grid::from_cells(self.rows.clone(), self.cols.clone(), cells)
    }
}

/// Evaluates `cell(row, col, row_value, col_value)` at every cell centre.
pub fn sweep<T, F>(rows: &Axis, cols: &Axis, parallel: bool, cell: F) -> HenonResult<SweepResult<T>>
where
    T: Send,
    F: Fn(usize, usize, f64, f64) -> CellOutcome<T> + Sync,
{
    rows.validate()?;
    cols.validate()?;
    let row_values = rows.values();
    let col_values = cols.values();
    let width = cols.len;
    let total = rows.len * width;

    info!(rows = rows.len, cols = width, parallel, "sweeping {} x {}", rows.name, cols.name);
    let work = |idx: usize| {
        let (r, c) = (idx / width, idx % width);
        cell(r, c, row_values[r], col_values[c])
    };
    let cells: Vec<CellOutcome<T>> = if parallel {
        (0..total).into_par_iter().map(work).collect()
    } else {
        (0..total).map(work).collect()
    };

    Ok(SweepResult {
        rows: rows.clone(),
        cols: cols.clone(),
        cells,
    })
}

fn lyapunov_cell(point: RunPoint, settings: &LyapunovSettings) -> CellOutcome<LyapunovPair> {
    let params = match HenonParams::new(point.params.a, point.params.b) {
        Ok(p) => p,
        Err(e) => return CellOutcome::Failed(e.to_string()),
    };
    let settings = LyapunovSettings {
        start: point.start,
        ..*settings
    };
    match estimate_for(params, &settings) {
        Ok(Estimate::Defined(pair)) => CellOutcome::Computed(pair),
        Ok(Estimate::Undefined { diverged_at }) => CellOutcome::Diverged { step: diverged_at },
        Err(e) => CellOutcome::Failed(e.to_string()),
    }
}

/// Max- and min-exponent grids of one Lyapunov sweep.
#[derive(Debug, Clone)]
pub struct ExponentGrids {
    pub max: Grid,
    pub min: Grid,
    pub report: SweepReport,
}

/// Lyapunov exponents over two swept variables named by the axes.
///
/// `base` fixes every variable not swept; `settings.start` is ignored in
/// favour of `base.start`.
pub fn lyapunov_sweep(
    rows: &Axis,
    cols: &Axis,
    base: RunPoint,
    settings: &LyapunovSettings,
    parallel: bool,
) -> HenonResult<ExponentGrids> {
    let row_var = Variable::of_axis(rows)?;
    let col_var = Variable::of_axis(cols)?;
    if row_var == col_var {
        return Err(HenonError::precondition(format!("both axes sweep '{row_var}'")));
    }
    if settings.cut >= settings.iterations {
        return Err(HenonError::precondition(format!(
            "cut ({}) must be smaller than iterations ({})",
            settings.cut, settings.iterations
        )));
    }

    let result = sweep(rows, cols, parallel, |_, _, rv, cv| {
        lyapunov_cell(base.with(row_var, rv).with(col_var, cv), settings)
    })?;
    let report = result.report();
    report.log("lyapunov");
    Ok(ExponentGrids {
        max: result.to_grid(LyapunovPair::max)?,
        min: result.to_grid(LyapunovPair::min)?,
        report,
    })
}

/// Lyapunov exponents along one variable, the others fixed by `base`.
pub fn lyapunov_scan(
    axis: &Axis,
    base: RunPoint,
    settings: &LyapunovSettings,
    parallel: bool,
) -> HenonResult<Vec<(f64, CellOutcome<LyapunovPair>)>> {
    axis.validate()?;
    let variable = Variable::of_axis(axis)?;
    let values = axis.values();
    let work = |v: &f64| (*v, lyapunov_cell(base.with(variable, *v), settings));
    let out: Vec<_> = if parallel {
        values.par_iter().map(work).collect()
    } else {
        values.iter().map(work).collect()
    };
    debug!(variable = %variable, points = out.len(), "scan complete");
    Ok(out)
}

/// Extra parameter values drawn around each bifurcation column.
///
/// `samples_per_column` values are spread evenly over `spread` times the
/// column width, centred on the column, so the achieved resolution along the
/// parameter is `columns × samples_per_column` distinct values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Oversample {
    pub samples_per_column: usize,
    pub spread: f64,
}

impl Default for Oversample {
    fn default() -> Self {
        Self {
            samples_per_column: 7,
            spread: 1.0 / 7.0,
        }
    }
}

impl Oversample {
    pub fn offsets(&self, column_width: f64) -> Vec<f64> {
        let n = self.samples_per_column;
        if n <= 1 {
            return vec![0.0; n];
        }
        let half = self.spread * column_width / 2.0;
        (0..n)
            .map(|i| -half + 2.0 * half * i as f64 / (n - 1) as f64)
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BifurcationSettings {
    pub b: f64,
    pub iterations: usize,
    pub cut: usize,
    pub threshold: f64,
    pub oversample: Oversample,
}

impl Default for BifurcationSettings {
    fn default() -> Self {
        Self {
            b: 0.3,
            iterations: 1000,
            cut: 100,
            threshold: 10.0,
            oversample: Oversample::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct BifurcationGrid {
    /// Rows are x bins (row 0 holds the smallest x), columns are values of a.
    pub grid: Grid,
    /// Distinct parameter values actually iterated.
    pub effective_columns: usize,
    /// Columns where every sample diverged; their cells are missing.
    pub empty_columns: Vec<usize>,
}

/// Histogram of post-transient x-values per parameter column.
///
/// Each sample starts from a uniform random point in [-1, 1]²; a diverged
/// sample contributes nothing.
pub fn bifurcation_grid<R: Rng + ?Sized>(
    a_axis: &Axis,
    x_axis: &Axis,
    settings: &BifurcationSettings,
    rng: &mut R,
    parallel: bool,
) -> HenonResult<BifurcationGrid> {
    a_axis.validate()?;
    x_axis.validate()?;
    if settings.cut >= settings.iterations {
        return Err(HenonError::precondition(format!(
            "cut ({}) must be smaller than iterations ({})",
            settings.cut, settings.iterations
        )));
    }
    if settings.oversample.samples_per_column == 0 {
        return Err(HenonError::precondition("at least one sample per column is required"));
    }

    let offsets = settings.oversample.offsets(a_axis.cell_width());
    let seeds: Vec<u64> = (0..a_axis.len).map(|_| rng.gen()).collect();
    info!(
        columns = a_axis.len,
        rows = x_axis.len,
        samples_per_column = offsets.len(),
        "bifurcation sweep"
    );

    let column = |col: usize| -> Option<Vec<f64>> {
        let mut local = StdRng::seed_from_u64(seeds[col]);
        let centre = a_axis.value_at(col);
        let mut counts = vec![0.0; x_axis.len];
        let mut bounded = 0;
        for offset in &offsets {
            let start = Point2D::new(local.gen_range(-1.0..=1.0), local.gen_range(-1.0..=1.0));
            let params = HenonParams {
                a: centre + offset,
                b: settings.b,
            };
            let orbit = iterate(start, params, settings.iterations, Some(settings.threshold));
            if let Orbit::Completed(t) = orbit {
                bounded += 1;
                for p in t.tail(settings.cut) {
                    if let Some(bin) = x_axis.bin_of(p.x) {
                        counts[bin] += 1.0;
                    }
                }
            }
        }
        (bounded > 0).then_some(counts)
    };
    let columns: Vec<Option<Vec<f64>>> = if parallel {
        (0..a_axis.len).into_par_iter().map(column).collect()
    } else {
        (0..a_axis.len).map(column).collect()
    };

    let mut grid = Grid::filled(x_axis.clone(), a_axis.clone(), None);
    let mut empty_columns = Vec::new();
    for (col, counts) in columns.iter().enumerate() {
        match counts {
            Some(counts) => {
                for (row, count) in counts.iter().enumerate() {
                    grid.set(row, col, Some(*count))?;
                }
            }
            None => empty_columns.push(col),
        }
    }
    if !empty_columns.is_empty() {
        warn!(columns = empty_columns.len(), "bifurcation columns with no bounded sample");
    }
    Ok(BifurcationGrid {
        grid,
        effective_columns: a_axis.len * offsets.len(),
        empty_columns,
    })
}

/// Clips counts at `clip`, scales each column by its maximum when that
/// maximum exceeds 1, and flips rows so larger x comes first.
pub fn normalize_bifurcation(grid: &Grid, clip: f64) -> Grid {
    let clipped = grid.map(|v| v.min(clip));
    let (rows, cols) = clipped.shape();
    let scale: Vec<f64> = (0..cols)
        .map(|col| {
            let max = (0..rows)
                .filter_map(|r| clipped.get(r, col))
                .fold(f64::NEG_INFINITY, f64::max);
            if max > 1.0 {
                max
            } else {
                1.0
            }
        })
        .collect();
    clipped.map_cells(|_, col, v| v / scale[col]).flip_rows()
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BasinSettings {
    pub params: HenonParams,
    pub iterations: usize,
    pub threshold: f64,
    /// Starting points per cell; one sits at the centre, more are jittered
    /// uniformly within the cell.
    pub samples: usize,
}

impl Default for BasinSettings {
    fn default() -> Self {
        Self {
            params: HenonParams::default(),
            iterations: 1000,
            threshold: DEFAULT_DIVERGENCE_THRESHOLD,
            samples: 1,
        }
    }
}

/// Counts, per initial-condition cell, the starting points whose orbit stays
/// bounded. Rows sweep y0, columns sweep x0.
pub fn basin_grid<R: Rng + ?Sized>(
    y_axis: &Axis,
    x_axis: &Axis,
    settings: &BasinSettings,
    rng: &mut R,
    parallel: bool,
) -> HenonResult<SweepResult<f64>> {
    if settings.samples == 0 {
        return Err(HenonError::precondition("at least one sample per cell is required"));
    }
    let seeds: Vec<u64> = (0..y_axis.len * x_axis.len).map(|_| rng.gen()).collect();
    let (half_w, half_h) = (x_axis.cell_width() / 2.0, y_axis.cell_width() / 2.0);

    let result = sweep(y_axis, x_axis, parallel, |row, col, y, x| {
        let mut local = StdRng::seed_from_u64(seeds[row * x_axis.len + col]);
        let mut bounded = 0u32;
        for s in 0..settings.samples {
            let start = if s == 0 {
                Point2D::new(x, y)
            } else {
                Point2D::new(
                    x + local.gen_range(-half_w..=half_w),
                    y + local.gen_range(-half_h..=half_h),
                )
            };
            let orbit =
                iterate(start, settings.params, settings.iterations, Some(settings.threshold));
            if !orbit.is_diverged() {
                bounded += 1;
            }
        }
        CellOutcome::Computed(f64::from(bounded))
    })?;
    result.report().log("basin");
    Ok(result)
}
