//! `henon basin`: bounded-orbit counts over a grid of starting points.

use std::path::PathBuf;

use anyhow::{Context, Result};
use colored::Colorize;

use super::{print_report, seeded_rng};
use crate::config::Config;
use crate::core::henon::HenonParams;
use crate::core::sampler::{basin_grid, BasinSettings};
use crate::grid::table::{preamble, write_tables};
use crate::grid::Axis;
use crate::render::{write_png, Colormap};

#[derive(Debug, Clone)]
pub struct BasinJob {
    pub x_axis: Axis,
    pub y_axis: Axis,
    pub params: HenonParams,
    pub iterations: usize,
    pub threshold: f64,
    pub samples: usize,
    pub seed: Option<u64>,
    pub out: PathBuf,
    pub png: Option<PathBuf>,
}

pub fn main(cfg: &Config, job: BasinJob) -> Result<()> {
    let settings = BasinSettings {
        params: job.params,
        iterations: job.iterations,
        threshold: job.threshold,
        samples: job.samples,
    };
    let mut rng = seeded_rng(cfg, job.seed);
    let result = basin_grid(&job.y_axis, &job.x_axis, &settings, &mut rng, cfg.sweep.parallel)?;
    let grid = result.to_grid(|n| *n)?;

    let comments = preamble(&format!(
        "basin of attraction, a = {}, b = {}, {} sample(s) per cell, threshold {}",
        settings.params.a, settings.params.b, settings.samples, settings.threshold
    ));
    write_tables(&job.out, std::slice::from_ref(&grid), &cfg.table, &comments)
        .with_context(|| format!("writing {}", job.out.display()))?;
    if let Some(path) = &job.png {
        write_png(path, &grid.flip_rows(), Colormap::Binary, 1)
            .with_context(|| format!("writing {}", path.display()))?;
    }

    print_report(&result.report());
    let bounded = grid.cells().iter().flatten().filter(|n| **n > 0.0).count();
    println!(
        "{} {} of {} cells hold bounded starts -> {}",
        "ok:".green().bold(),
        bounded,
        grid.cells().len(),
        job.out.display()
    );
    Ok(())
}
