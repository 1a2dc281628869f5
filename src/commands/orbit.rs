//! `henon orbit`: export one trajectory as a two-column table.

use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;

use super::run_point;
use crate::cli::MapArgs;
use crate::config::Config;
use crate::core::henon::{iterate, Trajectory};
use crate::grid::table::{preamble, write_tables};
use crate::grid::{Axis, Grid};

/// Rows are states in order; columns are x and y. Non-finite states are
/// written as missing cells.
pub fn trajectory_grid(trajectory: &Trajectory) -> Result<Grid> {
    let n = trajectory.len();
    let rows = Axis::new("step", 0.0, n as f64, n);
    let cols = Axis::new("xy", 0.0, 2.0, 2);
    let cells = trajectory
        .points()
        .iter()
        .flat_map(|p| [p.x, p.y].map(|v| v.is_finite().then_some(v)))
        .collect();
    Ok(Grid::from_cells(rows, cols, cells)?)
}

pub fn main(
    cfg: &Config,
    map: &MapArgs,
    iterations: usize,
    threshold: Option<f64>,
    out: &Path,
) -> Result<()> {
    let point = run_point(cfg, map)?;
    let orbit = iterate(point.start, point.params, iterations, threshold);
    let grid = trajectory_grid(orbit.trajectory())?;

    let status = match orbit.diverged_at() {
        Some(step) => format!("diverged at step {step}"),
        None => "completed".to_string(),
    };
    let comments = preamble(&format!(
        "orbit a = {}, b = {}, start ({}, {}), {} iterations, {}",
        point.params.a, point.params.b, point.start.x, point.start.y, iterations, status
    ));
    write_tables(out, std::slice::from_ref(&grid), &cfg.table, &comments)
        .with_context(|| format!("writing {}", out.display()))?;

    match orbit.diverged_at() {
        Some(step) => println!(
            "{} orbit diverged at step {}; {} states -> {}",
            "warn:".yellow().bold(),
            step,
            orbit.trajectory().len(),
            out.display()
        ),
        None => println!(
            "{} {} states -> {}",
            "ok:".green().bold(),
            orbit.trajectory().len(),
            out.display()
        ),
    }
    Ok(())
}
