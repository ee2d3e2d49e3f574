//! # imdp-algo: the robust dynamic-programming engine
//!
//! Runs value iteration over the [`imdp_core::FactoredMdp`] data model:
//! verification of a given (or unconstrained) strategy's worst/best-case
//! value, and synthesis of an optimal strategy against an adversary.
//!
//! ## Architecture
//!
//! - [`kernels`] - the per-column/per-axis O-maximization, LP-McCormick, and
//!   vertex-enumeration kernels, plus [`kernels::factored`]'s combinators for
//!   folding per-axis marginals into a joint value at a factored source state
//! - [`bellman`] - one robust Bellman step, dispatching on non-factored vs.
//!   factored system shape and the selected [`imdp_core::BellmanAlgorithm`]
//! - [`workspace`] - reusable scratch buffers for the Bellman step's inner
//!   loop, sized once per solve and never reallocated per iteration
//! - [`strategy_cache`] - the four action-reduction policies a Bellman step
//!   can run under: no strategy, a given strategy, or stationary/time-varying
//!   synthesis
//! - [`registry`] - which [`imdp_core::BellmanAlgorithm`] variants are
//!   actually available in this build (the LP-McCormick kernel needs an LP
//!   backend compiled in)
//! - [`driver`] - the value-iteration loop itself: property initialization,
//!   the Bellman/post-process/termination loop, and strategy extraction
//!
//! ## Example
//!
//! ```ignore
//! use imdp_algo::driver;
//! use imdp_core::{Problem, RobustValueIteration};
//!
//! let solution = driver::solve(&problem, RobustValueIteration::default(), 1)?;
//! println!("value at state 0: {}", solution.values[0]);
//! ```

pub mod bellman;
pub mod driver;
pub mod kernels;
pub mod registry;
pub mod strategy_cache;
pub mod workspace;

pub use bellman::bellman;
pub use driver::{solve, Solution};
pub use strategy_cache::StrategyCache;
pub use workspace::{construct_workspace, should_parallelize, Workspace};
