//! Numerical core: map iteration, tangent-space estimates, classification
//! and sampling.

pub mod classify;
pub mod dimensions;
pub mod error;
pub mod henon;
pub mod linear_algebra;
pub mod lyapunov;
pub mod sampler;
pub mod trapping;

pub use error::{HenonError, HenonResult};
pub use henon::{iterate, HenonParams, Orbit, Point2D, Trajectory};
pub use lyapunov::{Estimate, LyapunovPair, LyapunovSettings};
