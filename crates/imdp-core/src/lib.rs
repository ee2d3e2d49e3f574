//! # imdp-core: Interval Markov Decision Process data model
//!
//! Provides the fundamental data structures for robust sequential decision
//! making under transition-probability ambiguity: interval ambiguity sets,
//! (factored) Markov decision processes built from them, DFA-product
//! processes, strategies, and the properties/specifications a solve is run
//! against.
//!
//! ## Design Philosophy
//!
//! A system is modeled as a **factored robust MDP**: `N` state axes and `M`
//! action axes, with one [`Marginal`] per target axis describing that axis's
//! interval-ambiguous transition kernel as a function of a subset of the
//! other axes. An ordinary (non-factored) IMDP is the `N = M = 1` case. This
//! crate is the data model only: it validates and stores these objects, but
//! does not itself run the robust Bellman recursion over them — that lives
//! in the algorithm crate built on top, which only needs `imdp-core`'s
//! public types to stay decoupled from I/O and solver-backend concerns.
//!
//! ## Quick Start
//!
//! ```rust
//! use imdp_core::*;
//!
//! // A two-state IMDP, one action: state 0 stays; state 1 moves to state 0
//! // or stays, with an interval-ambiguous split.
//! let n_target = 2;
//! let n_source = 2; // 2 states * 1 action
//! let lower = vec![1.0, 0.0, 0.3, 0.0];
//! let gap = vec![0.0, 0.0, 0.2, 0.5];
//! let ambiguity = AmbiguitySet::Dense(
//!     DenseAmbiguitySet::from_lower_gap(n_target, n_source, lower, gap).unwrap(),
//! );
//! let marginal = Marginal::new(ambiguity, vec![0], vec![0], vec![2], vec![1]).unwrap();
//! let system = FactoredMdp::non_factored(2, 1, marginal, InitialStates::All).unwrap();
//! assert!(system.is_non_factored());
//! ```
//!
//! ## Core Data Structures
//!
//! - [`AmbiguitySet`] - Dense or sparse (CSC) interval ambiguity set for one column family
//! - [`Marginal`] - One target axis's ambiguity set plus the axes it is conditioned on
//! - [`FactoredMdp`] - The full orthogonal robust MDP
//! - [`ProductProcess`] / [`Dfa`] - DFA-product composition, flattened to an `N + 1`-axis `FactoredMdp`
//! - [`Strategy`] - A fixed (verification) or synthesized policy
//! - [`Property`] / [`Specification`] - What is being checked or synthesized, and under which bound/objective
//! - [`Problem`] - [`VerificationProblem`] or [`ControlSynthesisProblem`] binding the above together
//!
//! ## Numeric genericity
//!
//! Every data structure here is generic over a [`Scalar`] (`f64`/`f32`),
//! rather than hard-coded to `f64`, so the same types serve both the default
//! double-precision path and a narrower single-precision path on memory- or
//! bandwidth-constrained targets.
//!
//! ## Modules
//!
//! - [`error`] - The crate-wide `ImdpError`/`ImdpResult`
//! - [`scalar`] - The `Scalar` trait genericizing over `f64`/`f32`
//! - [`algorithm`] - The `BellmanAlgorithm` tag selecting a robust-DP kernel
//! - [`ambiguity`] - Dense/sparse interval ambiguity sets
//! - [`marginal`] - Per-axis conditioned transition models
//! - [`system`] - `FactoredMdp` and the implicit-sink convention
//! - [`product`] - DFA-product composition
//! - [`strategy`] - Fixed/synthesized policies
//! - [`value`] - The value-function buffer shared with the algorithm crate
//! - [`property`] - Property/specification model and construction-time validation
//! - [`problem`] - Verification/synthesis problem glue
//!
//! ## Integration with imdp-algo and imdp-io
//!
//! `imdp-algo` runs the robust Bellman recursion over the types defined
//! here. `imdp-io` provides importers/exporters (PRISM explicit, bmdp-tool,
//! netCDF+JSON) that construct and serialize these same types.

pub mod algorithm;
pub mod ambiguity;
pub mod error;
pub mod marginal;
pub mod problem;
pub mod product;
pub mod property;
pub mod scalar;
pub mod strategy;
pub mod system;
pub mod value;

pub use algorithm::BellmanAlgorithm;
pub use ambiguity::{AmbiguitySet, DenseAmbiguitySet, SparseAmbiguitySet};
pub use error::{ImdpError, ImdpResult};
pub use marginal::Marginal;
pub use problem::{ControlSynthesisProblem, Problem, RobustValueIteration, VerificationProblem};
pub use product::{Dfa, ProductProcess};
pub use property::{Property, SatisfactionMode, Specification, StrategyMode, TerminationCriterion};
pub use scalar::Scalar;
pub use strategy::{ActionTuple, Strategy};
pub use system::{FactoredMdp, InitialStates};
pub use value::ValueFunction;
