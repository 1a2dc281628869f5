//! `henon dimension`: fractal dimensions of one attractor.

use std::ops::RangeInclusive;

use anyhow::{bail, Context, Result};
use colored::Colorize;
use serde_json::json;

use super::run_point;
use crate::cli::MapArgs;
use crate::config::Config;
use crate::core::classify::lyapunov_dimension;
use crate::core::dimensions::{box_counting_dimension, information_dimension, Region};
use crate::core::henon::iterate;
use crate::core::lyapunov::{estimate, Estimate};

pub fn main(
    cfg: &Config,
    map: &MapArgs,
    iterations: usize,
    cut: usize,
    levels: RangeInclusive<u32>,
    json: bool,
) -> Result<()> {
    let point = run_point(cfg, map)?;
    let orbit = iterate(point.start, point.params, iterations, None);
    if let Some(step) = orbit.diverged_at() {
        bail!(
            "orbit for a = {}, b = {} diverged at step {step}; no attractor to measure",
            point.params.a,
            point.params.b
        );
    }
    let points = orbit.trajectory().tail(cut);
    let region = Region::enclosing(points, 0.05).context("no points left after the warm-up cut")?;

    let boxes = box_counting_dimension(points, &region, levels.clone()).context("box counting")?;
    let info = information_dimension(points, &region, levels).context("information dimension")?;
    let ky = match estimate(&orbit, cut, point.params)? {
        Estimate::Defined(pair) => Some(lyapunov_dimension(pair)),
        Estimate::Undefined { .. } => None,
    };

    if json {
        let out = json!({
            "a": point.params.a,
            "b": point.params.b,
            "points": points.len(),
            "box_counting": boxes,
            "information": info,
            "kaplan_yorke": ky,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!(
        "{} a = {}, b = {}, {} points",
        "henon".cyan().bold(),
        point.params.a,
        point.params.b,
        points.len()
    );
    println!("  box-counting dimension  {:.4}", boxes.dimension);
    println!("  information dimension   {:.4}", info.dimension);
    match ky {
        Some(d) => println!("  Kaplan-Yorke dimension  {d:.4}"),
        None => println!("  Kaplan-Yorke dimension  {}", "undefined".yellow()),
    }
    Ok(())
}
