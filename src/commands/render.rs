//! `henon render`: stitch a table file and draw it.

use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;

use super::classify::load_mosaic;
use crate::config::Config;
use crate::render::{ticks, write_png, Colormap};

pub fn main(
    cfg: &Config,
    input: &Path,
    frames_per_row: usize,
    colormap: Colormap,
    scale: u32,
    flip: bool,
    out: &Path,
) -> Result<()> {
    let mosaic = load_mosaic(cfg, input, frames_per_row)?;
    let grid = if flip { mosaic.flip_rows() } else { mosaic };
    write_png(out, &grid, colormap, scale).with_context(|| format!("writing {}", out.display()))?;

    let (rows, cols) = grid.shape();
    println!("{} {}x{} cells -> {}", "ok:".green().bold(), rows, cols, out.display());
    for axis in [grid.cols(), grid.rows()] {
        let t = ticks(axis, 5);
        let labels: Vec<String> = t
            .values
            .iter()
            .zip(&t.positions)
            .map(|(v, p)| format!("{v:.3}@{}", (p * f64::from(scale)).round()))
            .collect();
        println!("  {:<4} {}", axis.name, labels.join("  "));
    }
    Ok(())
}
