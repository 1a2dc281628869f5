//! Hénon map explorer: iteration, Lyapunov exponents, attractor classes,
//! parameter sweeps, and the table files that carry sweep results between runs.

pub mod cli;
pub mod commands;
pub mod config;
pub mod core;
pub mod grid;
pub mod io;
pub mod render;

pub use crate::core::{HenonError, HenonResult};
