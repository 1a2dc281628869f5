//! `henon classify`: stitch exponent frames and classify every cell.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{bail, Context, Result};
use colored::Colorize;

use crate::config::Config;
use crate::core::classify::{classify_grids, dimension_grid, AttractorClass};
use crate::grid::mosaic::stitch;
use crate::grid::table::{preamble, read_tables_from_path, write_tables};
use crate::grid::Grid;
use crate::render::{write_png, Colormap};

pub(crate) fn load_mosaic(cfg: &Config, path: &Path, frames_per_row: usize) -> Result<Grid> {
    let frames = read_tables_from_path(path, &cfg.table)
        .with_context(|| format!("reading {}", path.display()))?;
    if frames.is_empty() {
        bail!("{} holds no tables", path.display());
    }
    stitch(&frames, frames_per_row).with_context(|| format!("stitching {}", path.display()))
}

#[allow(clippy::too_many_arguments)]
pub fn main(
    cfg: &Config,
    max: &Path,
    min: &Path,
    frames_per_row: usize,
    tolerance: f64,
    out: &Path,
    dimension_out: Option<&Path>,
    png: Option<&Path>,
) -> Result<()> {
    let max_grid = load_mosaic(cfg, max, frames_per_row)?;
    let min_grid = load_mosaic(cfg, min, frames_per_row)?;
    let classes = classify_grids(&max_grid, &min_grid, tolerance)?;

    let comments = preamble(&format!("attractor classes, tolerance {tolerance}"));
    write_tables(out, std::slice::from_ref(&classes), &cfg.table, &comments)
        .with_context(|| format!("writing {}", out.display()))?;

    if let Some(path) = dimension_out {
        let dims = dimension_grid(&max_grid, &min_grid)?;
        let comments = preamble("Kaplan-Yorke dimension");
        write_tables(path, std::slice::from_ref(&dims), &cfg.table, &comments)
            .with_context(|| format!("writing {}", path.display()))?;
    }
    if let Some(path) = png {
        write_png(path, &classes.flip_rows(), Colormap::Classes, 1)
            .with_context(|| format!("writing {}", path.display()))?;
    }

    let mut counts: BTreeMap<u8, usize> = BTreeMap::new();
    for code in classes.cells().iter().flatten() {
        *counts.entry(*code as u8).or_default() += 1;
    }
    let (rows, cols) = classes.shape();
    println!("{} classified {}x{} cells -> {}", "ok:".green().bold(), rows, cols, out.display());
    for (code, n) in counts {
        if let Some(class) = AttractorClass::from_code(code) {
            println!("  {:<40} {:>8}", class.to_string(), n);
        }
    }
    Ok(())
}
