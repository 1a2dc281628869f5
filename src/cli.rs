use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::core::sampler::Variable;
use crate::render::Colormap;

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum ScanVar {
    A,
    B,
}

impl From<ScanVar> for Variable {
    fn from(v: ScanVar) -> Self {
        match v {
            ScanVar::A => Variable::A,
            ScanVar::B => Variable::B,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum ColormapKind {
    Inferno,
    Binary,
    Classes,
}

impl From<ColormapKind> for Colormap {
    fn from(k: ColormapKind) -> Self {
        match k {
            ColormapKind::Inferno => Colormap::Inferno,
            ColormapKind::Binary => Colormap::Binary,
            ColormapKind::Classes => Colormap::Classes,
        }
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "henon",
    about = "Hénon map explorer: orbits, Lyapunov exponents, attractor classes and diagrams",
    version,
    propagate_version = true,
    disable_help_subcommand = true
)]
pub struct HenonCli {
    /// Global: path to config (TOML); default: ~/.henon/config.toml
    #[arg(long = "config", value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Global: debug logging (RUST_LOG takes precedence)
    #[arg(short = 'v', long = "verbose", action = ArgAction::SetTrue, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub cmd: Command,
}

/// Map parameters and starting point; unset values come from the config.
#[derive(Debug, Clone, Default, Args)]
pub struct MapArgs {
    #[arg(long, allow_negative_numbers = true)]
    pub a: Option<f64>,
    #[arg(long, allow_negative_numbers = true)]
    pub b: Option<f64>,
    #[arg(long, allow_negative_numbers = true)]
    pub x0: Option<f64>,
    #[arg(long, allow_negative_numbers = true)]
    pub y0: Option<f64>,
}

#[derive(Debug, Clone, Default, Args)]
pub struct EstimateArgs {
    /// Total map iterations, warm-up included
    #[arg(long, value_name = "N")]
    pub iterations: Option<usize>,
    /// Warm-up states discarded before averaging
    #[arg(long, value_name = "N")]
    pub cut: Option<usize>,
    /// Escape threshold on |x| and |y|
    #[arg(long, value_name = "T")]
    pub threshold: Option<f64>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Lyapunov exponents and attractor class for one parameter pair
    ///
    /// Examples:
    ///   henon lyapunov --a 1.4 --b 0.3 --iterations 100000 --cut 1000
    ///   henon lyapunov --checkpoints 10000,20000,40000
    Lyapunov {
        #[command(flatten)]
        map: MapArgs,
        #[command(flatten)]
        estimate: EstimateArgs,
        /// Report exponents after each of these step counts instead
        #[arg(long, value_delimiter = ',', value_name = "N,N,...")]
        checkpoints: Vec<usize>,
        #[arg(long, action = ArgAction::SetTrue)]
        json: bool,
    },

    /// Lyapunov exponents along one parameter, the other held fixed
    Scan {
        #[arg(long, value_enum)]
        vary: ScanVar,
        #[arg(long, allow_negative_numbers = true)]
        from: f64,
        #[arg(long, allow_negative_numbers = true)]
        to: f64,
        #[arg(long, default_value_t = 50)]
        steps: usize,
        #[command(flatten)]
        map: MapArgs,
        #[command(flatten)]
        estimate: EstimateArgs,
        #[arg(long, action = ArgAction::SetTrue)]
        json: bool,
    },

    /// Max/min exponent grids over (a, b), computed frame by frame
    ///
    /// Examples:
    ///   henon sweep --a-range 1.0 1.5 --b-range 0.0 0.5 --size 200 --frames 4 \
    ///       --max-out max.txt --min-out min.txt
    Sweep {
        #[arg(
            long = "a-range",
            num_args = 2,
            value_names = ["MIN", "MAX"],
            allow_negative_numbers = true,
            required = true,
        )]
        a_range: Vec<f64>,
        #[arg(
            long = "b-range",
            num_args = 2,
            value_names = ["MIN", "MAX"],
            allow_negative_numbers = true,
            required = true,
        )]
        b_range: Vec<f64>,
        /// Cells per side of the full grid
        #[arg(long, value_name = "N")]
        size: usize,
        /// Frames per side; must divide --size
        #[arg(long, default_value_t = 1)]
        frames: usize,
        #[arg(long = "max-out", value_name = "FILE")]
        max_out: PathBuf,
        #[arg(long = "min-out", value_name = "FILE")]
        min_out: PathBuf,
        /// Append to existing files instead of replacing them
        #[arg(long, action = ArgAction::SetTrue)]
        append: bool,
        #[command(flatten)]
        map: MapArgs,
        #[command(flatten)]
        estimate: EstimateArgs,
        /// Compute cells on one thread
        #[arg(long, action = ArgAction::SetTrue)]
        serial: bool,
    },

    /// Stitch max/min exponent frames and classify every cell
    Classify {
        #[arg(long, value_name = "FILE")]
        max: PathBuf,
        #[arg(long, value_name = "FILE")]
        min: PathBuf,
        #[arg(long = "frames-per-row", default_value_t = 1)]
        frames_per_row: usize,
        #[arg(long)]
        tolerance: Option<f64>,
        #[arg(long, value_name = "FILE")]
        out: PathBuf,
        /// Also write the Kaplan–Yorke dimension grid
        #[arg(long = "dimension-out", value_name = "FILE")]
        dimension_out: Option<PathBuf>,
        #[arg(long, value_name = "FILE")]
        png: Option<PathBuf>,
    },

    /// Bifurcation diagram of x against a as a count grid
    Bifurcation {
        #[arg(
            long = "a-range",
            num_args = 2,
            value_names = ["MIN", "MAX"],
            allow_negative_numbers = true,
            default_values_t = vec![1.0, 1.4],
        )]
        a_range: Vec<f64>,
        #[arg(
            long = "x-range",
            num_args = 2,
            value_names = ["MIN", "MAX"],
            allow_negative_numbers = true,
            default_values_t = vec![-1.5, 1.5],
        )]
        x_range: Vec<f64>,
        #[arg(long, default_value_t = 400)]
        columns: usize,
        #[arg(long, default_value_t = 300)]
        rows: usize,
        #[arg(long, allow_negative_numbers = true)]
        b: Option<f64>,
        #[arg(long, default_value_t = 1000)]
        iterations: usize,
        /// Defaults to a tenth of --iterations
        #[arg(long)]
        cut: Option<usize>,
        #[arg(long = "samples-per-column", default_value_t = 7)]
        samples_per_column: usize,
        /// Count at which cells saturate in the image
        #[arg(long, default_value_t = 50.0)]
        clip: f64,
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long, value_name = "FILE")]
        out: PathBuf,
        #[arg(long, value_name = "FILE")]
        png: Option<PathBuf>,
    },

    /// Bounded starting points over an (x0, y0) grid
    Basin {
        #[arg(
            long = "x-range",
            num_args = 2,
            value_names = ["MIN", "MAX"],
            allow_negative_numbers = true,
            default_values_t = vec![-2.0, 2.0],
        )]
        x_range: Vec<f64>,
        #[arg(
            long = "y-range",
            num_args = 2,
            value_names = ["MIN", "MAX"],
            allow_negative_numbers = true,
            default_values_t = vec![-2.0, 2.0],
        )]
        y_range: Vec<f64>,
        #[arg(long, default_value_t = 200)]
        width: usize,
        #[arg(long, default_value_t = 200)]
        height: usize,
        #[arg(long, allow_negative_numbers = true)]
        a: Option<f64>,
        #[arg(long, allow_negative_numbers = true)]
        b: Option<f64>,
        #[arg(long, default_value_t = 1000)]
        iterations: usize,
        #[arg(long, default_value_t = 1e3)]
        threshold: f64,
        /// Starting points per cell
        #[arg(long, default_value_t = 1)]
        samples: usize,
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long, value_name = "FILE")]
        out: PathBuf,
        #[arg(long, value_name = "FILE")]
        png: Option<PathBuf>,
    },

    /// Box-counting, information and Kaplan–Yorke dimensions of an attractor
    Dimension {
        #[command(flatten)]
        map: MapArgs,
        #[arg(long, default_value_t = 100_000)]
        iterations: usize,
        #[arg(long, default_value_t = 1000)]
        cut: usize,
        #[arg(long = "min-level", default_value_t = 3)]
        min_level: u32,
        #[arg(long = "max-level", default_value_t = 8)]
        max_level: u32,
        #[arg(long, action = ArgAction::SetTrue)]
        json: bool,
    },

    /// Write one orbit as a two-column (x, y) table
    Orbit {
        #[command(flatten)]
        map: MapArgs,
        #[arg(long, default_value_t = 1000)]
        iterations: usize,
        #[arg(long)]
        threshold: Option<f64>,
        #[arg(long, value_name = "FILE")]
        out: PathBuf,
    },

    /// Stitch the tables of a file and draw them as a PNG
    Render {
        #[arg(long, value_name = "FILE")]
        input: PathBuf,
        #[arg(long = "frames-per-row", default_value_t = 1)]
        frames_per_row: usize,
        #[arg(long, value_enum, default_value_t = ColormapKind::Inferno)]
        colormap: ColormapKind,
        /// Pixels per cell side
        #[arg(long, default_value_t = 1)]
        scale: u32,
        /// Draw row 0 at the bottom
        #[arg(long, action = ArgAction::SetTrue)]
        flip: bool,
        #[arg(long, value_name = "FILE")]
        out: PathBuf,
    },
}
