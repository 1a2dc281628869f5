//! Lyapunov exponents of the Hénon map by tangent-space propagation.
//!
//! An orthonormal frame is pushed through the Jacobian at every state of the
//! trajectory, re-orthogonalized with Gram-Schmidt, and renormalized. The
//! logarithms of the pre-normalization lengths, averaged over the number of
//! steps, are the exponents. Renormalizing every step keeps the frame from
//! overflowing; it cannot be batched.

use serde::{Deserialize, Serialize};

use super::error::{HenonError, HenonResult};
use super::henon::{iterate, HenonParams, Orbit, Point2D};
use super::linear_algebra::{gram_schmidt, mat_vec, normalize, standard_basis};

/// Exponents in frame-index order: `first` belongs to the vector that was
/// orthogonalized first.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LyapunovPair {
    pub first: f64,
    pub second: f64,
}

impl LyapunovPair {
    /// (larger, smaller), regardless of frame order.
    pub fn sorted(&self) -> (f64, f64) {
        if self.first >= self.second {
            (self.first, self.second)
        } else {
            (self.second, self.first)
        }
    }

    pub fn max(&self) -> f64 {
        self.sorted().0
    }

    pub fn min(&self) -> f64 {
        self.sorted().1
    }

    pub fn sum(&self) -> f64 {
        self.first + self.second
    }
}

/// Outcome of estimating exponents for one orbit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Estimate {
    Defined(LyapunovPair),
    /// The orbit escaped at `diverged_at`; there is nothing to average.
    Undefined { diverged_at: usize },
}

impl Estimate {
    pub fn pair(&self) -> Option<LyapunovPair> {
        match self {
            Estimate::Defined(p) => Some(*p),
            Estimate::Undefined { .. } => None,
        }
    }
}

/// Settings shared by single estimates and sweeps.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LyapunovSettings {
    pub start: Point2D,
    /// Total map iterations, warm-up included.
    pub iterations: usize,
    /// Leading states discarded before averaging.
    pub cut: usize,
    pub threshold: Option<f64>,
}

impl Default for LyapunovSettings {
    fn default() -> Self {
        Self {
            start: Point2D::ORIGIN,
            iterations: 1000,
            cut: 100,
            threshold: None,
        }
    }
}

impl LyapunovSettings {
    pub fn steps(&self) -> usize {
        self.iterations.saturating_sub(self.cut)
    }

    fn validate(&self) -> HenonResult<()> {
        if self.cut >= self.iterations {
            return Err(HenonError::precondition(format!(
                "cut ({}) must be smaller than iterations ({})",
                self.cut, self.iterations
            )));
        }
        Ok(())
    }
}

/// Exponents from the first `steps` x-values of a trajectory.
///
/// The y-coordinates are not needed: the Jacobian only depends on x.
pub fn lyapunov_exponents(
    xs: &[f64],
    steps: usize,
    params: HenonParams,
) -> HenonResult<LyapunovPair> {
    if steps == 0 {
        return Err(HenonError::precondition("at least one step is required"));
    }
    if xs.len() < steps {
        return Err(HenonError::precondition(format!(
            "{} x-values supplied for {} steps",
            xs.len(),
            steps
        )));
    }

    let mut frame = standard_basis();
    let mut sums = [0.0_f64; 2];

    for (n, &x) in xs[..steps].iter().enumerate() {
        if !x.is_finite() {
            return Err(HenonError::precondition(format!(
                "non-finite state x = {x} at step {n}"
            )));
        }
        let j = params.jacobian(x);
        let images = [mat_vec(&j, &frame[0]), mat_vec(&j, &frame[1])];
        let orthogonal = gram_schmidt(&images).map_err(|e| e.at_step(n))?;

        for (i, v) in orthogonal.iter().enumerate() {
            let (unit, length) = normalize(v).map_err(|_| HenonError::degenerate(i).at_step(n))?;
            sums[i] += length.ln();
            frame[i] = unit;
        }
    }

    let n = steps as f64;
    Ok(LyapunovPair {
        first: sums[0] / n,
        second: sums[1] / n,
    })
}

/// Exponents for an orbit after discarding `cut` warm-up states.
///
/// A diverged orbit yields `Estimate::Undefined` without touching its partial data.
pub fn estimate(orbit: &Orbit, cut: usize, params: HenonParams) -> HenonResult<Estimate> {
    let trajectory = match orbit {
        Orbit::Diverged { step, .. } => return Ok(Estimate::Undefined { diverged_at: *step }),
        Orbit::Completed(t) => t,
    };
    // the last state only enters as an image, never as a Jacobian point
    let usable = trajectory.len().saturating_sub(1);
    if cut >= usable {
        return Err(HenonError::precondition(format!(
            "cut ({cut}) leaves no steps in a trajectory of {} states",
            trajectory.len()
        )));
    }
    let xs: Vec<f64> = trajectory.tail(cut).iter().map(|p| p.x).collect();
    lyapunov_exponents(&xs, usable - cut, params).map(Estimate::Defined)
}

/// Iterates from `settings.start` and estimates the exponents in one go.
pub fn estimate_for(params: HenonParams, settings: &LyapunovSettings) -> HenonResult<Estimate> {
    settings.validate()?;
    let orbit = iterate(settings.start, params, settings.iterations, settings.threshold);
    estimate(&orbit, settings.cut, params)
}

/// Exponents at increasing step counts along a single trajectory.
///
/// Each checkpoint is the number of averaged steps after the warm-up; the
/// trajectory is generated once, long enough for the largest checkpoint.
pub fn convergence(
    params: HenonParams,
    start: Point2D,
    cut: usize,
    checkpoints: &[usize],
) -> HenonResult<Vec<(usize, Estimate)>> {
    let longest = checkpoints.iter().copied().max().unwrap_or(0);
    if longest == 0 {
        return Err(HenonError::precondition("checkpoints must contain a positive step count"));
    }
    let orbit = iterate(start, params, cut + longest, None);
    if let Orbit::Diverged { step, .. } = orbit {
        return Ok(checkpoints
            .iter()
            .map(|&c| (c, Estimate::Undefined { diverged_at: step }))
            .collect());
    }

    let xs: Vec<f64> = orbit.trajectory().tail(cut).iter().map(|p| p.x).collect();
    checkpoints
        .iter()
        .map(|&c| Ok((c, Estimate::Defined(lyapunov_exponents(&xs, c, params)?))))
        .collect()
}
