//! Subcommand entry points. Each takes parsed arguments plus the loaded
//! configuration and reports through `anyhow`.

pub mod basin;
pub mod bifurcation;
pub mod classify;
pub mod dimension;
pub mod lyapunov;
pub mod orbit;
pub mod render;
pub mod scan;
pub mod sweep;

use anyhow::{bail, Result};
use colored::Colorize;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;

use crate::cli::{Command, EstimateArgs, MapArgs};
use crate::config::Config;
use crate::core::henon::{HenonParams, Point2D};
use crate::core::lyapunov::LyapunovSettings;
use crate::core::sampler::{RunPoint, SweepReport};
use crate::grid::Axis;

pub fn dispatch(cmd: Command, cfg: &Config) -> Result<()> {
    match cmd {
        Command::Lyapunov {
            map,
            estimate,
            checkpoints,
            json,
        } => lyapunov::main(cfg, &map, &estimate, &checkpoints, json),
        Command::Scan {
            vary,
            from,
            to,
            steps,
            map,
            estimate,
            json,
        } => scan::main(cfg, vary.into(), (from, to), steps, &map, &estimate, json),
        Command::Sweep {
            a_range,
            b_range,
            size,
            frames,
            max_out,
            min_out,
            append,
            map,
            estimate,
            serial,
        } => sweep::main(
            cfg,
            sweep::SweepJob {
                a_range: range_of("a-range", &a_range)?,
                b_range: range_of("b-range", &b_range)?,
                size,
                frames,
                max_out,
                min_out,
                append,
                parallel: cfg.sweep.parallel && !serial,
            },
            &map,
            &estimate,
        ),
        Command::Classify {
            max,
            min,
            frames_per_row,
            tolerance,
            out,
            dimension_out,
            png,
        } => classify::main(
            cfg,
            &max,
            &min,
            frames_per_row,
            tolerance.unwrap_or(cfg.classify.tolerance),
            &out,
            dimension_out.as_deref(),
            png.as_deref(),
        ),
        Command::Bifurcation {
            a_range,
            x_range,
            columns,
            rows,
            b,
            iterations,
            cut,
            samples_per_column,
            clip,
            seed,
            out,
            png,
        } => {
            let (a_min, a_max) = range_of("a-range", &a_range)?;
            let (x_min, x_max) = range_of("x-range", &x_range)?;
            bifurcation::main(
                cfg,
                bifurcation::BifurcationJob {
                    a_axis: Axis::new("a", a_min, a_max, columns),
                    x_axis: Axis::new("x", x_min, x_max, rows),
                    b: b.unwrap_or(cfg.map.b),
                    iterations,
                    cut: cut.unwrap_or(iterations / 10),
                    samples_per_column,
                    clip,
                    seed,
                    out,
                    png,
                },
            )
        }
        Command::Basin {
            x_range,
            y_range,
            width,
            height,
            a,
            b,
            iterations,
            threshold,
            samples,
            seed,
            out,
            png,
        } => {
            let (x_min, x_max) = range_of("x-range", &x_range)?;
            let (y_min, y_max) = range_of("y-range", &y_range)?;
            basin::main(
                cfg,
                basin::BasinJob {
                    x_axis: Axis::new("x0", x_min, x_max, width),
                    y_axis: Axis::new("y0", y_min, y_max, height),
                    params: HenonParams::new(a.unwrap_or(cfg.map.a), b.unwrap_or(cfg.map.b))?,
                    iterations,
                    threshold,
                    samples,
                    seed,
                    out,
                    png,
                },
            )
        }
        Command::Dimension {
            map,
            iterations,
            cut,
            min_level,
            max_level,
            json,
        } => dimension::main(cfg, &map, iterations, cut, min_level..=max_level, json),
        Command::Orbit {
            map,
            iterations,
            threshold,
            out,
        } => orbit::main(cfg, &map, iterations, threshold, &out),
        Command::Render {
            input,
            frames_per_row,
            colormap,
            scale,
            flip,
            out,
        } => render::main(cfg, &input, frames_per_row, colormap.into(), scale, flip, &out),
    }
}

pub(crate) fn range_of(flag: &str, values: &[f64]) -> Result<(f64, f64)> {
    match values {
        [lo, hi] if lo.is_finite() && hi.is_finite() && lo <= hi => Ok((*lo, *hi)),
        _ => bail!("--{flag} expects MIN MAX with MIN <= MAX, got {values:?}"),
    }
}

/// Map parameters and start point: flags first, then the config file.
pub(crate) fn run_point(cfg: &Config, map: &MapArgs) -> Result<RunPoint> {
    let params = HenonParams::new(map.a.unwrap_or(cfg.map.a), map.b.unwrap_or(cfg.map.b))?;
    let start = Point2D::new(map.x0.unwrap_or(cfg.map.x0), map.y0.unwrap_or(cfg.map.y0));
    Ok(RunPoint { params, start })
}

pub(crate) fn lyapunov_settings(
    cfg: &Config,
    start: Point2D,
    args: &EstimateArgs,
) -> LyapunovSettings {
    LyapunovSettings {
        start,
        iterations: args.iterations.unwrap_or(cfg.lyapunov.iterations),
        cut: args.cut.unwrap_or(cfg.lyapunov.cut),
        threshold: args.threshold.or(cfg.lyapunov.threshold),
    }
}

/// Seeded generator for randomized samplers; the seed is logged so a run can
/// be repeated with `--seed`.
pub(crate) fn seeded_rng(cfg: &Config, seed: Option<u64>) -> StdRng {
    let seed = seed
        .or(cfg.sweep.seed)
        .unwrap_or_else(|| rand::thread_rng().gen());
    info!(seed, "random starting points");
    StdRng::seed_from_u64(seed)
}

pub(crate) fn print_report(report: &SweepReport) {
    if report.is_clean() {
        println!("{} {} cells computed", "ok:".green().bold(), report.computed);
        return;
    }
    println!(
        "{} {} cells computed, {} diverged, {} failed",
        "warn:".yellow().bold(),
        report.computed,
        report.diverged.len(),
        report.failed.len()
    );
    for (row, col, reason) in &report.failed {
        eprintln!("  cell ({row}, {col}): {reason}");
    }
}
