//! Grid images and the axis data a plotter needs to label them.
//!
//! Image row 0 is grid row 0, so callers flip a grid first when they want its
//! smallest row value at the bottom.

use std::io::Cursor;
use std::path::Path;

use image::{ImageBuffer, ImageFormat, Rgb, RgbImage};
use serde::Serialize;
use tracing::debug;

use crate::core::classify::AttractorClass;
use crate::core::error::{HenonError, HenonResult};
use crate::grid::{Axis, Grid};
use crate::io::atomic::atomic_write;

/// Drawn for cells without data.
pub const MISSING_COLOR: [u8; 3] = [128, 128, 128];

const INFERNO: [(f64, [u8; 3]); 5] = [
    (0.0, [0, 0, 4]),
    (0.25, [87, 16, 110]),
    (0.5, [188, 55, 84]),
    (0.75, [249, 142, 9]),
    (1.0, [252, 255, 164]),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Colormap {
    /// Dark to bright, for exponents and dimensions.
    Inferno,
    /// White at the minimum, black at the maximum; for bifurcation counts.
    Binary,
    /// One fixed colour per attractor class code.
    Classes,
}

impl Colormap {
    pub fn color(self, value: f64, range: (f64, f64)) -> [u8; 3] {
        match self {
            Colormap::Classes => class_color(value),
            Colormap::Binary => {
                let g = (255.0 * (1.0 - unit(value, range))).round() as u8;
                [g, g, g]
            }
            Colormap::Inferno => inferno(unit(value, range)),
        }
    }
}

fn unit(value: f64, (lo, hi): (f64, f64)) -> f64 {
    if hi > lo {
        ((value - lo) / (hi - lo)).clamp(0.0, 1.0)
    } else {
        0.0
    }
}

fn inferno(t: f64) -> [u8; 3] {
    for pair in INFERNO.windows(2) {
        let ((t0, c0), (t1, c1)) = (pair[0], pair[1]);
        if t <= t1 {
            let f = (t - t0) / (t1 - t0);
            let mut out = [0u8; 3];
            for i in 0..3 {
                let (lo, hi) = (f64::from(c0[i]), f64::from(c1[i]));
                out[i] = (lo + f * (hi - lo)).round() as u8;
            }
            return out;
        }
    }
    INFERNO[INFERNO.len() - 1].1
}

fn class_color(code: f64) -> [u8; 3] {
    let class = if code.fract() == 0.0 && (0.0..=255.0).contains(&code) {
        AttractorClass::from_code(code as u8)
    } else {
        None
    };
    match class {
        Some(AttractorClass::PointStrict) => [25, 25, 112],
        Some(AttractorClass::PointDegenerate) => [65, 105, 225],
        Some(AttractorClass::Periodic) => [46, 139, 87],
        Some(AttractorClass::Chaotic) => [255, 140, 0],
        Some(AttractorClass::ChaoticExpanding) => [178, 34, 34],
        Some(AttractorClass::NoAttractor) => [255, 255, 255],
        None => MISSING_COLOR,
    }
}

/// Tick labels and their pixel offsets along one axis, of equal length.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ticks {
    pub values: Vec<f64>,
    pub positions: Vec<f64>,
}

fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => (0..n)
            .map(|i| start + (end - start) * i as f64 / (n - 1) as f64)
            .collect(),
    }
}

pub fn ticks(axis: &Axis, count: usize) -> Ticks {
    Ticks {
        values: linspace(axis.min, axis.max, count),
        positions: linspace(0.0, axis.len as f64, count),
    }
}

/// One `scale × scale` pixel block per cell.
pub fn to_image(grid: &Grid, colormap: Colormap, scale: u32) -> HenonResult<RgbImage> {
    if scale == 0 {
        return Err(HenonError::precondition("image scale must be at least 1"));
    }
    let (rows, cols) = grid.shape();
    let width = u32::try_from(cols)
        .ok()
        .and_then(|c| c.checked_mul(scale))
        .ok_or_else(|| HenonError::precondition("grid too wide for an image"))?;
    let height = u32::try_from(rows)
        .ok()
        .and_then(|r| r.checked_mul(scale))
        .ok_or_else(|| HenonError::precondition("grid too tall for an image"))?;
    let range = grid.value_range().unwrap_or((0.0, 1.0));

    Ok(ImageBuffer::from_fn(width, height, |x, y| {
        let (r, c) = ((y / scale) as usize, (x / scale) as usize);
        let rgb = match grid.get(r, c) {
            Some(v) => colormap.color(v, range),
            None => MISSING_COLOR,
        };
        Rgb(rgb)
    }))
}

pub fn encode_png(grid: &Grid, colormap: Colormap, scale: u32) -> HenonResult<Vec<u8>> {
    let img = to_image(grid, colormap, scale)?;
    let mut bytes = Cursor::new(Vec::new());
    img.write_to(&mut bytes, ImageFormat::Png)?;
    Ok(bytes.into_inner())
}

pub fn write_png(path: &Path, grid: &Grid, colormap: Colormap, scale: u32) -> HenonResult<()> {
    let bytes = encode_png(grid, colormap, scale)?;
    atomic_write(path, &bytes)?;
    debug!(path = %path.display(), bytes = bytes.len(), "wrote image");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticks_have_matching_lengths() {
        let t = ticks(&Axis::new("a", 1.0, 1.4, 100), 5);
        assert_eq!(t.values.len(), t.positions.len());
        assert_eq!(t.positions, vec![0.0, 25.0, 50.0, 75.0, 100.0]);
        assert!((t.values[2] - 1.2).abs() < 1e-12);
        assert_eq!(ticks(&Axis::new("a", 1.0, 1.4, 100), 1).values, vec![1.0]);
    }

    #[test]
    fn colormap_endpoints() {
        assert_eq!(Colormap::Binary.color(0.0, (0.0, 1.0)), [255, 255, 255]);
        assert_eq!(Colormap::Binary.color(1.0, (0.0, 1.0)), [0, 0, 0]);
        assert_eq!(Colormap::Inferno.color(-5.0, (0.0, 1.0)), [0, 0, 4]);
        assert_eq!(Colormap::Inferno.color(1.0, (0.0, 1.0)), [252, 255, 164]);
        assert_eq!(Colormap::Classes.color(5.0, (0.0, 5.0)), [255, 255, 255]);
        assert_eq!(Colormap::Classes.color(2.5, (0.0, 5.0)), MISSING_COLOR);
    }

    #[test]
    fn missing_cells_use_fixed_colour() {
        let grid = Grid::from_rows(
            Axis::new("a", 0.0, 1.0, 1),
            Axis::new("b", 0.0, 1.0, 2),
            vec![vec![Some(3.0), None]],
        )
        .unwrap();
        let img = to_image(&grid, Colormap::Classes, 2).unwrap();
        assert_eq!(img.dimensions(), (4, 2));
        assert_eq!(img.get_pixel(3, 1).0, MISSING_COLOR);
        assert_eq!(img.get_pixel(0, 0).0, [255, 140, 0]);
    }

    #[test]
    fn png_signature() {
        let grid =
            Grid::filled(Axis::new("a", 0.0, 1.0, 3), Axis::new("b", 0.0, 1.0, 3), Some(0.5));
        let bytes = encode_png(&grid, Colormap::Inferno, 1).unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
    }
}
