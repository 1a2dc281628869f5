//! Qualitative attractor classes from a pair of Lyapunov exponents
//! (after Garst & Sterk, 2018).

use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::{HenonError, HenonResult};
use super::lyapunov::LyapunovPair;
use crate::grid::Grid;

/// Width of the band around zero in which an exponent counts as zero, and
/// within which two exponents count as equal.
pub const DEFAULT_TOLERANCE: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttractorClass {
    /// 0 > λ₁ > λ₂
    PointStrict,
    /// 0 > λ₁ = λ₂
    PointDegenerate,
    /// λ₁ = 0 > λ₂
    Periodic,
    /// λ₁ > 0 ≥ λ₂
    Chaotic,
    /// λ₁ ≥ λ₂ > 0
    ChaoticExpanding,
    /// Orbit escaped or exponents unavailable.
    NoAttractor,
}

impl AttractorClass {
    pub const ALL: [AttractorClass; 6] = [
        AttractorClass::PointStrict,
        AttractorClass::PointDegenerate,
        AttractorClass::Periodic,
        AttractorClass::Chaotic,
        AttractorClass::ChaoticExpanding,
        AttractorClass::NoAttractor,
    ];

    pub fn code(self) -> u8 {
        match self {
            AttractorClass::PointStrict => 0,
            AttractorClass::PointDegenerate => 1,
            AttractorClass::Periodic => 2,
            AttractorClass::Chaotic => 3,
            AttractorClass::ChaoticExpanding => 4,
            AttractorClass::NoAttractor => 5,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.get(code as usize).copied()
    }

    pub fn label(self) -> &'static str {
        match self {
            AttractorClass::PointStrict => "point attractor",
            AttractorClass::PointDegenerate => "point attractor (degenerate)",
            AttractorClass::Periodic => "periodic orbit / invariant circle",
            AttractorClass::Chaotic => "chaotic attractor",
            AttractorClass::ChaoticExpanding => "chaotic (area expanding)",
            AttractorClass::NoAttractor => "no attractor",
        }
    }

    pub fn is_chaotic(self) -> bool {
        matches!(self, AttractorClass::Chaotic | AttractorClass::ChaoticExpanding)
    }
}

impl fmt::Display for AttractorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.code(), self.label())
    }
}

/// Classifies an exponent pair. The pair is sorted first, so either order works.
///
/// Rules are tried in order and the first match wins:
/// undefined → 5; λ₁ < −ε and λ₁ > λ₂ + ε → 0; λ₁ < −ε → 1; |λ₁| ≤ ε → 2;
/// λ₁ > 0 and λ₂ < ε → 3; λ₁ > 0 → 4; anything else → 5.
pub fn classify(lambda1: Option<f64>, lambda2: Option<f64>, tolerance: f64) -> AttractorClass {
    let (l1, l2) = match (lambda1, lambda2) {
        (Some(a), Some(b)) if !a.is_nan() && !b.is_nan() => {
            if a >= b {
                (a, b)
            } else {
                (b, a)
            }
        }
        _ => return AttractorClass::NoAttractor,
    };
    let eps = tolerance;

    if l1 < -eps {
        if l1 > l2 + eps {
            AttractorClass::PointStrict
        } else {
            AttractorClass::PointDegenerate
        }
    } else if l1 <= eps {
        AttractorClass::Periodic
    } else if l1 > 0.0 {
        if l2 < eps {
            AttractorClass::Chaotic
        } else {
            AttractorClass::ChaoticExpanding
        }
    } else {
        AttractorClass::NoAttractor
    }
}

pub fn classify_pair(pair: Option<LyapunovPair>, tolerance: f64) -> AttractorClass {
    match pair {
        Some(p) => classify(Some(p.first), Some(p.second), tolerance),
        None => AttractorClass::NoAttractor,
    }
}

/// Cell-wise classification of a max-exponent grid and a min-exponent grid.
/// Missing cells in either grid become class 5.
pub fn classify_grids(max: &Grid, min: &Grid, tolerance: f64) -> HenonResult<Grid> {
    if max.shape() != min.shape() {
        return Err(HenonError::precondition(format!(
            "exponent grids differ in shape: {:?} vs {:?}",
            max.shape(),
            min.shape()
        )));
    }
    let cells = max
        .cells()
        .iter()
        .zip(min.cells())
        .map(|(&l1, &l2)| Some(f64::from(classify(l1, l2, tolerance).code())))
        .collect();
    Grid::from_cells(max.rows().clone(), max.cols().clone(), cells)
}

/// Kaplan–Yorke dimension of a two-dimensional exponent spectrum.
pub fn lyapunov_dimension(pair: LyapunovPair) -> f64 {
    let (l1, l2) = pair.sorted();
    if l1 <= 0.0 {
        0.0
    } else if l1 + l2 > 0.0 {
        2.0
    } else {
        1.0 + l1 / l2.abs()
    }
}

/// Cell-wise Kaplan–Yorke dimension; missing cells stay missing.
pub fn dimension_grid(max: &Grid, min: &Grid) -> HenonResult<Grid> {
    if max.shape() != min.shape() {
        return Err(HenonError::precondition(format!(
            "exponent grids differ in shape: {:?} vs {:?}",
            max.shape(),
            min.shape()
        )));
    }
    let cells = max
        .cells()
        .iter()
        .zip(min.cells())
        .map(|(l1, l2)| match (l1, l2) {
            (Some(first), Some(second)) => Some(lyapunov_dimension(LyapunovPair {
                first: *first,
                second: *second,
            })),
            _ => None,
        })
        .collect();
    Grid::from_cells(max.rows().clone(), max.cols().clone(), cells)
}
