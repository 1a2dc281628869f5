//! `henon lyapunov`: exponents, class and Kaplan–Yorke dimension for one
//! parameter pair, optionally at several step counts.

use anyhow::{Context, Result};
use colored::Colorize;
use serde_json::json;

use super::{lyapunov_settings, run_point};
use crate::cli::{EstimateArgs, MapArgs};
use crate::config::Config;
use crate::core::classify::{classify_pair, lyapunov_dimension};
use crate::core::lyapunov::{convergence, estimate_for, Estimate};

pub fn main(
    cfg: &Config,
    map: &MapArgs,
    estimate: &EstimateArgs,
    checkpoints: &[usize],
    json: bool,
) -> Result<()> {
    let point = run_point(cfg, map)?;
    let settings = lyapunov_settings(cfg, point.start, estimate);
    let tolerance = cfg.classify.tolerance;

    let runs: Vec<(usize, Estimate)> = if checkpoints.is_empty() {
        let est = estimate_for(point.params, &settings).with_context(|| {
            format!("estimating exponents for a = {}, b = {}", point.params.a, point.params.b)
        })?;
        vec![(settings.steps(), est)]
    } else {
        convergence(point.params, point.start, settings.cut, checkpoints)
            .context("running convergence checkpoints")?
    };

    if json {
        let rows: Vec<_> = runs
            .iter()
            .map(|(steps, est)| {
                let pair = est.pair();
                let class = classify_pair(pair, tolerance);
                json!({
                    "a": point.params.a,
                    "b": point.params.b,
                    "steps": steps,
                    "lambda_max": pair.map(|p| p.max()),
                    "lambda_min": pair.map(|p| p.min()),
                    "class": class.code(),
                    "kaplan_yorke": pair.map(lyapunov_dimension),
                    "diverged_at": match est {
                        Estimate::Undefined { diverged_at } => Some(*diverged_at),
                        Estimate::Defined(_) => None,
                    },
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    println!(
        "{} a = {}, b = {}, start = ({}, {})",
        "henon".cyan().bold(),
        point.params.a,
        point.params.b,
        point.start.x,
        point.start.y
    );
    for (steps, est) in &runs {
        match est {
            Estimate::Defined(pair) => {
                let class = classify_pair(Some(*pair), tolerance);
                println!(
                    "  steps {:>8}  λ1 = {:+.6}  λ2 = {:+.6}  class {}  D_KY = {:.4}",
                    steps,
                    pair.max(),
                    pair.min(),
                    class.to_string().green(),
                    lyapunov_dimension(*pair)
                );
            }
            Estimate::Undefined { diverged_at } => {
                println!(
                    "  steps {:>8}  {} orbit diverged at step {}",
                    steps,
                    "undefined:".yellow().bold(),
                    diverged_at
                );
            }
        }
    }
    Ok(())
}
