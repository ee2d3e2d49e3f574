//! Clap argument model and subcommand bodies.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use imdp_core::{BellmanAlgorithm, ControlSynthesisProblem, Problem, RobustValueIteration, Strategy, VerificationProblem};
use tracing::info;

use crate::config::SolveConfig;
use crate::input;
use crate::report;

#[derive(Parser)]
#[command(name = "imdp", version, about = "Robust value iteration over interval MDPs")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Verify or synthesize against a system/specification JSON pair.
    Solve(SolveArgs),
    /// Solve, then export the system/specification to PRISM explicit format.
    ExportPrism(ExportPrismArgs),
    /// List the `BellmanAlgorithm` variants available in this build.
    Algorithms,
}

#[derive(Args)]
pub struct SolveArgs {
    /// Path to a system JSON document (see `imdp_cli::input::SystemDoc`).
    pub system: PathBuf,
    /// Path to a specification JSON document.
    pub spec: PathBuf,
    /// Optional TOML config file layered under these flags (§9.4).
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Which `BellmanAlgorithm` to request.
    #[arg(long)]
    pub algorithm: Option<String>,
    /// Worker thread count for the parallel Bellman step.
    #[arg(long)]
    pub threads: Option<usize>,
    /// Run control synthesis instead of verification.
    #[arg(long)]
    pub synthesize: bool,
}

#[derive(Args)]
pub struct ExportPrismArgs {
    #[command(flatten)]
    pub solve: SolveArgs,
    /// Path prefix for the `.sta`/`.tra`/`.lab`/`.pctl`/`.srew` files.
    pub prefix: PathBuf,
}

fn resolve_config(config: &Option<PathBuf>) -> Result<SolveConfig> {
    match config {
        Some(path) => SolveConfig::load(path),
        None => Ok(SolveConfig::default()),
    }
}

fn build_algorithm(args: &SolveArgs, config: &SolveConfig) -> Result<RobustValueIteration> {
    let name = config.merge_algorithm(args.algorithm.clone());
    let bellman_alg: BellmanAlgorithm = name
        .parse()
        .with_context(|| format!("resolving --algorithm '{name}'"))?;
    Ok(RobustValueIteration::new(bellman_alg))
}

pub fn run_solve(args: SolveArgs) -> Result<()> {
    let config = resolve_config(&args.config)?;
    let system = input::load_system(&args.system)?;
    let spec = input::load_specification(&args.spec)?;
    let alg = build_algorithm(&args, &config)?;
    let threads = config.merge_threads(args.threads);
    let synthesize = config.merge_synthesize(args.synthesize);

    info!(algorithm = %alg.bellman_alg, threads, synthesize, "starting solve");

    let problem = if synthesize {
        Problem::Synthesis(ControlSynthesisProblem::new(system, spec, false)?)
    } else {
        Problem::Verification(VerificationProblem::new(system, spec, Strategy::None, false)?)
    };

    let solution = imdp_algo::solve(&problem, alg, threads)?;
    info!(iterations = solution.iterations, exact = solution.exact, "solve finished");
    report::print_solution(&solution);
    Ok(())
}

pub fn run_export_prism(args: ExportPrismArgs) -> Result<()> {
    let config = resolve_config(&args.solve.config)?;
    let system = input::load_system(&args.solve.system)?;
    let spec = input::load_specification(&args.solve.spec)?;
    let alg = build_algorithm(&args.solve, &config)?;
    let threads = config.merge_threads(args.solve.threads);

    let problem = Problem::Verification(VerificationProblem::new(
        system.clone(),
        spec.clone(),
        Strategy::None,
        false,
    )?);
    let solution = imdp_algo::solve(&problem, alg, threads)?;
    report::print_solution(&solution);

    let (reach, avoid) = input::reach_avoid(&spec);
    let mut labels = imdp_io::prism::LabelSet::default();
    let num_states = system.total_states();
    let mut assignment = vec![Vec::new(); num_states];
    if !reach.is_empty() {
        labels.names.push("reach".to_string());
        let id = labels.names.len() + 1;
        for &s in &reach {
            assignment[s].push(id);
        }
    }
    if !avoid.is_empty() {
        labels.names.push("avoid".to_string());
        let id = labels.names.len() + 1;
        for &s in &avoid {
            assignment[s].push(id);
        }
    }
    labels.assignment = assignment;

    imdp_io::prism::write_explicit(&args.prefix, &system, &spec, &labels)?;
    info!(prefix = %args.prefix.display(), "exported PRISM explicit model");
    Ok(())
}

pub fn run_algorithms() -> Result<()> {
    for name in imdp_algo::registry::available() {
        println!("{name}");
    }
    Ok(())
}
