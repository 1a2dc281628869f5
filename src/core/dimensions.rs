//! Fractal-dimension estimates for sampled attractors.
//!
//! Both box-based estimators cover a fixed region with 2^k × 2^k boxes for a
//! range of levels k and fit a line against k: the slope of log₂ N(k) gives
//! the box-counting dimension, the slope of the Shannon information I(k)
//! (in bits) gives the information dimension.

use std::collections::HashMap;
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::error::{HenonError, HenonResult};
use super::henon::Point2D;
use crate::grid::Axis;

const MAX_LEVEL: u32 = 16;

/// Axis-aligned rectangle the boxes tile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl Region {
    /// Encloses the classic attractor (a = 1.4, b = 0.3).
    pub const CLASSIC: Region = Region {
        x_min: -1.5,
        x_max: 1.5,
        y_min: -0.5,
        y_max: 0.5,
    };

    /// Smallest region holding every finite point, widened by `margin` on each side.
    pub fn enclosing(points: &[Point2D], margin: f64) -> Option<Region> {
        let mut finite = points.iter().filter(|p| p.is_finite());
        let first = finite.next()?;
        let mut r = Region {
            x_min: first.x,
            x_max: first.x,
            y_min: first.y,
            y_max: first.y,
        };
        for p in finite {
            r.x_min = r.x_min.min(p.x);
            r.x_max = r.x_max.max(p.x);
            r.y_min = r.y_min.min(p.y);
            r.y_max = r.y_max.max(p.y);
        }
        r.x_min -= margin;
        r.x_max += margin;
        r.y_min -= margin;
        r.y_max += margin;
        Some(r)
    }

    fn axes(&self, level: u32) -> (Axis, Axis) {
        let n = 1usize << level;
        (
            Axis::new("x", self.x_min, self.x_max, n),
            Axis::new("y", self.y_min, self.y_max, n),
        )
    }
}

fn occupancy(
    points: &[Point2D],
    region: &Region,
    level: u32,
) -> HenonResult<HashMap<(usize, usize), usize>> {
    if level > MAX_LEVEL {
        return Err(HenonError::precondition(format!(
            "box level {level} exceeds the supported maximum of {MAX_LEVEL}"
        )));
    }
    let (xa, ya) = region.axes(level);
    xa.validate()?;
    ya.validate()?;

    let mut boxes = HashMap::new();
    for p in points {
        if let (Some(i), Some(j)) = (xa.bin_of(p.x), ya.bin_of(p.y)) {
            *boxes.entry((i, j)).or_insert(0) += 1;
        }
    }
    Ok(boxes)
}

/// Number of occupied boxes at 2^level boxes per side. Points outside the
/// region are ignored.
pub fn box_count(points: &[Point2D], region: &Region, level: u32) -> HenonResult<usize> {
    Ok(occupancy(points, region, level)?.len())
}

/// Shannon information, in bits, of the box occupancy distribution.
pub fn information(points: &[Point2D], region: &Region, level: u32) -> HenonResult<f64> {
    let boxes = occupancy(points, region, level)?;
    let total: usize = boxes.values().sum();
    if total == 0 {
        return Err(HenonError::precondition("no points fall inside the region"));
    }
    let total = total as f64;
    Ok(boxes
        .values()
        .map(|&n| {
            let p = n as f64 / total;
            -p * p.log2()
        })
        .sum())
}

/// Least-squares line through (x, y) pairs; returns (slope, intercept).
pub fn linear_fit(xs: &[f64], ys: &[f64]) -> HenonResult<(f64, f64)> {
    if xs.len() != ys.len() {
        return Err(HenonError::precondition(format!(
            "{} x-values and {} y-values",
            xs.len(),
            ys.len()
        )));
    }
    if xs.len() < 2 {
        return Err(HenonError::precondition("a line fit needs at least two points"));
    }
    let n = xs.len() as f64;
    let mx = xs.iter().sum::<f64>() / n;
    let my = ys.iter().sum::<f64>() / n;
    let sxx: f64 = xs.iter().map(|x| (x - mx) * (x - mx)).sum();
    let sxy: f64 = xs.iter().zip(ys).map(|(x, y)| (x - mx) * (y - my)).sum();
    if sxx == 0.0 {
        return Err(HenonError::precondition("x-values of a line fit must not all coincide"));
    }
    let slope = sxy / sxx;
    Ok((slope, my - slope * mx))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DimensionEstimate {
    pub dimension: f64,
    pub intercept: f64,
    /// (level, measured value) pairs the line was fitted to.
    pub samples: Vec<(u32, f64)>,
}

fn fit_levels(
    levels: RangeInclusive<u32>,
    measure: impl Fn(u32) -> HenonResult<f64>,
) -> HenonResult<DimensionEstimate> {
    let samples = levels
        .map(|k| Ok((k, measure(k)?)))
        .collect::<HenonResult<Vec<_>>>()?;
    let xs: Vec<f64> = samples.iter().map(|(k, _)| f64::from(*k)).collect();
    let ys: Vec<f64> = samples.iter().map(|(_, v)| *v).collect();
    let (dimension, intercept) = linear_fit(&xs, &ys)?;
    Ok(DimensionEstimate {
        dimension,
        intercept,
        samples,
    })
}

pub fn box_counting_dimension(
    points: &[Point2D],
    region: &Region,
    levels: RangeInclusive<u32>,
) -> HenonResult<DimensionEstimate> {
    let est = fit_levels(levels, |k| {
        let n = box_count(points, region, k)?;
        if n == 0 {
            return Err(HenonError::precondition("no points fall inside the region"));
        }
        Ok((n as f64).log2())
    })?;
    debug!(dimension = est.dimension, "box-counting dimension");
    Ok(est)
}

pub fn information_dimension(
    points: &[Point2D],
    region: &Region,
    levels: RangeInclusive<u32>,
) -> HenonResult<DimensionEstimate> {
    let est = fit_levels(levels, |k| information(points, region, k))?;
    debug!(dimension = est.dimension, "information dimension");
    Ok(est)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, eps: f64) -> bool {
        (a - b).abs() <= eps
    }

    #[test]
    fn exact_line() {
        let (m, c) = linear_fit(&[1.0, 2.0, 3.0], &[3.0, 5.0, 7.0]).unwrap();
        assert!(approx_eq(m, 2.0, 1e-12));
        assert!(approx_eq(c, 1.0, 1e-12));
        assert!(linear_fit(&[1.0], &[1.0]).is_err());
        assert!(linear_fit(&[1.0, 1.0], &[1.0, 2.0]).is_err());
    }

    #[test]
    fn filled_square_has_dimension_two() {
        // one point per finest box
        let n = 64;
        let points: Vec<Point2D> = (0..n * n)
            .map(|i| {
                Point2D::new(((i % n) as f64 + 0.5) / n as f64, ((i / n) as f64 + 0.5) / n as f64)
            })
            .collect();
        let unit = Region {
            x_min: 0.0,
            x_max: 1.0,
            y_min: 0.0,
            y_max: 1.0,
        };
        let boxes = box_counting_dimension(&points, &unit, 1..=6).unwrap();
        assert!(approx_eq(boxes.dimension, 2.0, 1e-9));
        let info = information_dimension(&points, &unit, 1..=6).unwrap();
        assert!(approx_eq(info.dimension, 2.0, 1e-9));
    }

    #[test]
    fn single_point_has_dimension_zero() {
        let points = vec![Point2D::new(0.1, 0.1); 10];
        let est = box_counting_dimension(&points, &Region::CLASSIC, 2..=5).unwrap();
        assert!(approx_eq(est.dimension, 0.0, 1e-12));
        assert!(approx_eq(information(&points, &Region::CLASSIC, 4).unwrap(), 0.0, 1e-12));
    }

    #[test]
    fn enclosing_region_skips_non_finite() {
        let pts = [Point2D::new(1.0, -1.0), Point2D::new(f64::NAN, 0.0), Point2D::new(-2.0, 3.0)];
        let r = Region::enclosing(&pts, 0.5).unwrap();
        assert_eq!((r.x_min, r.x_max, r.y_min, r.y_max), (-2.5, 1.5, -1.5, 3.5));
        assert!(Region::enclosing(&[], 0.0).is_none());
    }

    #[test]
    fn oversized_level_is_rejected() {
        assert!(box_count(&[Point2D::ORIGIN], &Region::CLASSIC, 40).is_err());
    }
}
