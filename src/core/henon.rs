//! Forward iteration of the Hénon map (x, y) -> (y + 1 - a·x², b·x).

use serde::{Deserialize, Serialize};

use super::error::{HenonError, HenonResult};
use super::linear_algebra::Mat2;

/// Escape threshold used by the bifurcation and basin samplers.
pub const DEFAULT_DIVERGENCE_THRESHOLD: f64 = 1e3;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub const ORIGIN: Point2D = Point2D { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    fn exceeds(&self, threshold: f64) -> bool {
        self.x.abs() > threshold || self.y.abs() > threshold
    }
}

/// Coefficients of the map. Classic chaotic values are a = 1.4, b = 0.3.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HenonParams {
    pub a: f64,
    pub b: f64,
}

impl Default for HenonParams {
    fn default() -> Self {
        Self { a: 1.4, b: 0.3 }
    }
}

impl HenonParams {
    pub fn new(a: f64, b: f64) -> HenonResult<Self> {
        if !a.is_finite() {
            return Err(HenonError::precondition("parameter 'a' must be a finite number"));
        }
        if !b.is_finite() {
            return Err(HenonError::precondition("parameter 'b' must be a finite number"));
        }
        Ok(Self { a, b })
    }

    pub fn step(&self, p: Point2D) -> Point2D {
        Point2D {
            x: p.y + 1.0 - self.a * p.x * p.x,
            y: self.b * p.x,
        }
    }

    /// Linearization of the map at a state with first coordinate `x`.
    pub fn jacobian(&self, x: f64) -> Mat2 {
        [[-2.0 * self.a * x, 1.0], [self.b, 0.0]]
    }

    /// det J = -b everywhere, so areas contract by |b| per step.
    pub fn jacobian_determinant(&self) -> f64 {
        -self.b
    }
}

/// Ordered states produced by iterating from an initial point.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Trajectory {
    points: Vec<Point2D>,
}

impl Trajectory {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            points: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, p: Point2D) {
        self.points.push(p);
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[Point2D] {
        &self.points
    }

    pub fn last(&self) -> Option<Point2D> {
        self.points.last().copied()
    }

    /// Points after discarding a warm-up prefix of `cut` states.
    pub fn tail(&self, cut: usize) -> &[Point2D] {
        &self.points[cut.min(self.points.len())..]
    }
}

/// Result of one iteration run: either all requested steps, or the prefix up to
/// and including the state that escaped.
#[derive(Debug, Clone, PartialEq)]
pub enum Orbit {
    Completed(Trajectory),
    Diverged { partial: Trajectory, step: usize },
}

impl Orbit {
    pub fn trajectory(&self) -> &Trajectory {
        match self {
            Orbit::Completed(t) => t,
            Orbit::Diverged { partial, .. } => partial,
        }
    }

    pub fn completed(&self) -> Option<&Trajectory> {
        match self {
            Orbit::Completed(t) => Some(t),
            Orbit::Diverged { .. } => None,
        }
    }

    pub fn is_diverged(&self) -> bool {
        matches!(self, Orbit::Diverged { .. })
    }

    pub fn diverged_at(&self) -> Option<usize> {
        match self {
            Orbit::Diverged { step, .. } => Some(*step),
            Orbit::Completed(_) => None,
        }
    }
}

/// Iterates the map `iterations` times from `start`.
///
/// The returned trajectory holds at most `iterations + 1` points, the initial one
/// included. A state with a non-finite coordinate always ends the run as
/// `Diverged`; with a `threshold`, so does a state with |x| or |y| above it.
pub fn iterate(
    start: Point2D,
    params: HenonParams,
    iterations: usize,
    threshold: Option<f64>,
) -> Orbit {
    let mut trajectory = Trajectory::with_capacity(iterations + 1);
    trajectory.push(start);

    let mut current = start;
    for step in 1..=iterations {
        current = params.step(current);
        trajectory.push(current);

        let escaped = !current.is_finite() || threshold.is_some_and(|t| current.exceeds(t));
        if escaped {
            return Orbit::Diverged {
                partial: trajectory,
                step,
            };
        }
    }

    Orbit::Completed(trajectory)
}

/// Applies the map `n` times to every point of a polyline, keeping each image.
pub fn iterate_points(points: &[Point2D], params: HenonParams, n: usize) -> Vec<Vec<Point2D>> {
    let mut images = Vec::with_capacity(n);
    let mut current = points.to_vec();
    for _ in 0..n {
        current = current.iter().map(|p| params.step(*p)).collect();
        images.push(current.clone());
    }
    images
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_steps_match_the_recurrence() {
        let orbit = iterate(Point2D::ORIGIN, HenonParams::default(), 2, None);
        let t = orbit.completed().expect("bounded");
        assert_eq!(t.len(), 3);
        assert_eq!(t.points()[1], Point2D::new(1.0, 0.0));
        // x2 = 0 + 1 - 1.4 * 1 = -0.4, y2 = 0.3 * 1
        assert!((t.points()[2].x + 0.4).abs() < 1e-15);
        assert!((t.points()[2].y - 0.3).abs() < 1e-15);
    }

    #[test]
    fn zero_iterations_returns_start_only() {
        let orbit = iterate(Point2D::new(0.2, 0.1), HenonParams::default(), 0, Some(1.0));
        assert_eq!(orbit.trajectory().points(), &[Point2D::new(0.2, 0.1)]);
        assert!(!orbit.is_diverged());
    }

    #[test]
    fn threshold_halts_and_flags() {
        let params = HenonParams::new(2.0, 0.3).unwrap();
        let orbit = iterate(Point2D::ORIGIN, params, 100, Some(1e3));
        let step = orbit.diverged_at().expect("a = 2 escapes");
        assert_eq!(orbit.trajectory().len(), step + 1);
        assert!(orbit.trajectory().last().unwrap().x.abs() > 1e3);
    }

    #[test]
    fn overflow_counts_as_divergence_without_threshold() {
        let params = HenonParams::new(2.0, 0.3).unwrap();
        let orbit = iterate(Point2D::ORIGIN, params, 10_000, None);
        assert!(orbit.is_diverged());
        assert!(!orbit.trajectory().last().unwrap().is_finite());
    }

    #[test]
    fn rejects_non_finite_parameters() {
        assert!(HenonParams::new(f64::NAN, 0.3).is_err());
        assert!(HenonParams::new(1.4, f64::INFINITY).is_err());
    }

    #[test]
    fn tail_saturates() {
        let orbit = iterate(Point2D::ORIGIN, HenonParams::default(), 5, None);
        assert_eq!(orbit.trajectory().tail(2).len(), 4);
        assert!(orbit.trajectory().tail(99).is_empty());
    }
}
