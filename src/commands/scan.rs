//! `henon scan`: exponents along one parameter with the other fixed.

use anyhow::Result;
use colored::Colorize;
use serde_json::json;

use super::{lyapunov_settings, range_of, run_point};
use crate::cli::{EstimateArgs, MapArgs};
use crate::config::Config;
use crate::core::classify::classify_pair;
use crate::core::sampler::{lyapunov_scan, CellOutcome, Variable};
use crate::grid::Axis;

pub fn main(
    cfg: &Config,
    vary: Variable,
    (from, to): (f64, f64),
    steps: usize,
    map: &MapArgs,
    estimate: &EstimateArgs,
    json: bool,
) -> Result<()> {
    let (lo, hi) = range_of("from/--to", &[from, to])?;
    let point = run_point(cfg, map)?;
    let settings = lyapunov_settings(cfg, point.start, estimate);
    let axis = Axis::new(vary.name(), lo, hi, steps);
    let results = lyapunov_scan(&axis, point, &settings, cfg.sweep.parallel)?;
    let tolerance = cfg.classify.tolerance;

    if json {
        let rows: Vec<_> = results
            .iter()
            .map(|(v, outcome)| {
                let pair = outcome.value().copied();
                json!({
                    "variable": vary.name(),
                    "value": v,
                    "lambda_max": pair.map(|p| p.max()),
                    "lambda_min": pair.map(|p| p.min()),
                    "class": classify_pair(pair, tolerance).code(),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    println!("{:>12} {:>12} {:>12}  class", vary.name(), "λ1", "λ2");
    for (v, outcome) in &results {
        match outcome {
            CellOutcome::Computed(pair) => println!(
                "{:>12.6} {:>+12.6} {:>+12.6}  {}",
                v,
                pair.max(),
                pair.min(),
                classify_pair(Some(*pair), tolerance).code()
            ),
            CellOutcome::Diverged { step } => {
                println!("{:>12.6} {}", v, format!("diverged at step {step}").yellow())
            }
            CellOutcome::Failed(reason) => println!("{:>12.6} {}", v, reason.red()),
        }
    }
    Ok(())
}
