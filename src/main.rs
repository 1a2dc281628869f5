//! `henon`: subcommands over the explorer library.

use clap::Parser; // trait import enables HenonCli::parse()
use tracing_subscriber::EnvFilter;

use henon_explorer::cli::HenonCli;
use henon_explorer::commands;
use henon_explorer::config::{resolve_config_path, Config};

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> anyhow::Result<()> {
    let args = HenonCli::parse();
    init_tracing(args.verbose);

    let cfg_path = resolve_config_path(&args.config);
    let cfg = Config::load(cfg_path.as_deref())?;
    tracing::debug!(config = ?cfg_path, "configuration resolved");

    commands::dispatch(args.cmd, &cfg)
}
