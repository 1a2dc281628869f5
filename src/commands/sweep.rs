//! `henon sweep`: max/min exponent grids over (a, b), frame by frame.
//!
//! Frames are computed in stitching order and each is written as soon as it
//! is done, so an interrupted sweep keeps its finished frames.

use std::path::PathBuf;

use anyhow::{Context, Result};
use colored::Colorize;
use tracing::info;

use super::{lyapunov_settings, print_report, run_point};
use crate::cli::{EstimateArgs, MapArgs};
use crate::config::Config;
use crate::core::sampler::{lyapunov_sweep, SweepReport};
use crate::grid::mosaic::FrameLayout;
use crate::grid::table::{append_tables, preamble, write_tables};
use crate::grid::Axis;

#[derive(Debug, Clone)]
pub struct SweepJob {
    pub a_range: (f64, f64),
    pub b_range: (f64, f64),
    pub size: usize,
    pub frames: usize,
    pub max_out: PathBuf,
    pub min_out: PathBuf,
    pub append: bool,
    pub parallel: bool,
}

pub fn main(cfg: &Config, job: SweepJob, map: &MapArgs, estimate: &EstimateArgs) -> Result<()> {
    let point = run_point(cfg, map)?;
    let settings = lyapunov_settings(cfg, point.start, estimate);
    let layout = FrameLayout::square(
        Axis::new("a", job.a_range.0, job.a_range.1, job.size),
        Axis::new("b", job.b_range.0, job.b_range.1, job.size),
        job.frames,
    )
    .context("planning sweep frames")?;
    let frames = layout.frames()?;
    let (frame_rows, frame_cols) = layout.frame_shape();
    let per_row = layout.frames_per_row();

    let comments = preamble(&format!(
        "lyapunov sweep {0}x{0} in {1} frames of {2}x{3}, {4} per row; \
         x0 = {5}, y0 = {6}, iterations = {7}, cut = {8}",
        job.size,
        frames.len(),
        frame_rows,
        frame_cols,
        per_row,
        point.start.x,
        point.start.y,
        settings.iterations,
        settings.cut
    ));

    let mut total = SweepReport::default();
    for (i, (rows, cols)) in frames.iter().enumerate() {
        info!(frame = i + 1, of = frames.len(), "computing frame");
        let grids = lyapunov_sweep(rows, cols, point, &settings, job.parallel)
            .with_context(|| format!("sweeping frame {}", i + 1))?;

        let fresh = i == 0 && !job.append;
        for (path, grid) in [(&job.max_out, &grids.max), (&job.min_out, &grids.min)] {
            let written = if fresh {
                write_tables(path, std::slice::from_ref(grid), &cfg.table, &comments)
            } else {
                append_tables(path, std::slice::from_ref(grid), &cfg.table)
            };
            written.with_context(|| format!("writing {}", path.display()))?;
        }

        let (row0, col0) = ((i / per_row) * frame_rows, (i % per_row) * frame_cols);
        total.computed += grids.report.computed;
        total
            .diverged
            .extend(grids.report.diverged.iter().map(|(r, c, s)| (r + row0, c + col0, *s)));
        total
            .failed
            .extend(grids.report.failed.iter().map(|(r, c, m)| (r + row0, c + col0, m.clone())));
    }

    print_report(&total);
    println!(
        "{} {} frame(s) written to {} and {} (stitch with --frames-per-row {})",
        "ok:".green().bold(),
        frames.len(),
        job.max_out.display(),
        job.min_out.display(),
        per_row
    );
    Ok(())
}
