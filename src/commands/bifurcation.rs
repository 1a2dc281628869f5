//! `henon bifurcation`: count grid of post-transient x against a.

use std::path::PathBuf;

use anyhow::{Context, Result};
use colored::Colorize;

use super::seeded_rng;
use crate::config::Config;
use crate::core::sampler::{
    bifurcation_grid, normalize_bifurcation, BifurcationSettings, Oversample,
};
use crate::grid::table::{preamble, write_tables};
use crate::grid::Axis;
use crate::render::{write_png, Colormap};

#[derive(Debug, Clone)]
pub struct BifurcationJob {
    pub a_axis: Axis,
    pub x_axis: Axis,
    pub b: f64,
    pub iterations: usize,
    pub cut: usize,
    pub samples_per_column: usize,
    pub clip: f64,
    pub seed: Option<u64>,
    pub out: PathBuf,
    pub png: Option<PathBuf>,
}

pub fn main(cfg: &Config, job: BifurcationJob) -> Result<()> {
    let settings = BifurcationSettings {
        b: job.b,
        iterations: job.iterations,
        cut: job.cut,
        oversample: Oversample {
            samples_per_column: job.samples_per_column,
            ..Oversample::default()
        },
        ..BifurcationSettings::default()
    };
    let mut rng = seeded_rng(cfg, job.seed);
    let result =
        bifurcation_grid(&job.a_axis, &job.x_axis, &settings, &mut rng, cfg.sweep.parallel)?;

    let comments = preamble(&format!(
        "bifurcation counts, b = {}, {} distinct a values over {} columns",
        settings.b, result.effective_columns, job.a_axis.len
    ));
    write_tables(&job.out, std::slice::from_ref(&result.grid), &cfg.table, &comments)
        .with_context(|| format!("writing {}", job.out.display()))?;
    if let Some(path) = &job.png {
        let shaded = normalize_bifurcation(&result.grid, job.clip);
        write_png(path, &shaded, Colormap::Binary, 1)
            .with_context(|| format!("writing {}", path.display()))?;
    }

    println!(
        "{} {} columns x {} rows ({} a values sampled) -> {}",
        "ok:".green().bold(),
        job.a_axis.len,
        job.x_axis.len,
        result.effective_columns,
        job.out.display()
    );
    if !result.empty_columns.is_empty() {
        println!(
            "{} {} column(s) had no bounded orbit",
            "warn:".yellow().bold(),
            result.empty_columns.len()
        );
    }
    Ok(())
}
