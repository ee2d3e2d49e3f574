//! `imdp`: the operator-facing CLI binary (§9.3/§9.4, §10).
//!
//! Parses command-line flags and an optional TOML config, builds a
//! [`imdp_core::Problem`] from a native JSON system/specification pair,
//! calls `imdp_algo::solve`, and prints or exports the result. Structured
//! diagnostics go through `tracing`; this binary is the one place in the
//! workspace that installs a subscriber.

mod cli;
mod config;
mod input;
mod report;

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Command};

fn install_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    install_tracing();
    let cli = Cli::parse();
    let result = match cli.command {
        Command::Solve(args) => cli::run_solve(args),
        Command::ExportPrism(args) => cli::run_export_prism(args),
        Command::Algorithms => cli::run_algorithms(),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
