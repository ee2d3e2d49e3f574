//! The value-iteration driver (§4.5-§4.7): property initialization, the
//! Bellman/post-process loop, termination, and strategy extraction.

use imdp_core::{
    FactoredMdp, ImdpError, ImdpResult, Problem, Property, Scalar, Specification, Strategy,
    TerminationCriterion, ValueFunction,
};
use tracing::trace;

use crate::bellman;
use crate::registry;
use crate::strategy_cache::StrategyCache;
use crate::workspace::{self, Workspace};

/// Everything a completed solve reports (§6.2). `exact` records whether the
/// reported values are guaranteed exact rather than a sound relaxation —
/// `false` whenever `OMaximization` ran on a factored system with more than
/// one marginal (§9's resolution of the factored-exactness open question).
#[derive(Debug, Clone)]
pub struct Solution<R: Scalar> {
    pub values: Vec<R>,
    pub iterations: usize,
    pub residual: Vec<R>,
    pub strategy: Strategy,
    pub exact: bool,
}

fn unravel(mut idx: usize, shape: &[usize]) -> Vec<usize> {
    let mut tuple = vec![0; shape.len()];
    for i in (0..shape.len()).rev() {
        tuple[i] = idx % shape[i];
        idx /= shape[i];
    }
    tuple
}

fn set_flat_indices<R: Scalar>(current: &mut [R], indices: &[usize], value: R) {
    for &i in indices {
        current[i] = value;
    }
}

/// Sets every joint state whose last axis (the DFA location, in a
/// flattened product system) is one of `dfa_values` to `value`.
fn set_dfa_slab<R: Scalar>(current: &mut [R], state_vars: &[usize], dfa_values: &[usize], value: R) {
    let dfa_axis = state_vars.len() - 1;
    for idx in 0..current.len() {
        let tuple = unravel(idx, state_vars);
        if dfa_values.contains(&tuple[dfa_axis]) {
            current[idx] = value;
        }
    }
}

fn initialize<R: Scalar>(vf: &mut ValueFunction<R>, property: &Property<R>) {
    let current = vf.current_mut();
    match property {
        Property::FiniteTimeReachability { reach, .. }
        | Property::InfiniteTimeReachability { reach, .. }
        | Property::ExactTimeReachability { reach, .. } => set_flat_indices(current, reach, R::one()),
        Property::FiniteTimeReachAvoid { reach, .. }
        | Property::InfiniteTimeReachAvoid { reach, .. }
        | Property::ExactTimeReachAvoid { reach, .. } => set_flat_indices(current, reach, R::one()),
        Property::FiniteTimeSafety { avoid, .. } | Property::InfiniteTimeSafety { avoid, .. } => {
            set_flat_indices(current, avoid, -R::one())
        }
        Property::FiniteTimeReward { reward, .. } | Property::InfiniteTimeReward { reward, .. } => {
            current.copy_from_slice(reward)
        }
        Property::ExpectedExitTime { avoid, .. } => {
            current.iter_mut().for_each(|v| *v = R::one());
            set_flat_indices(current, avoid, R::zero());
        }
        Property::FiniteTimeDfaReachability { reach_dfa, .. }
        | Property::InfiniteTimeDfaReachability { reach_dfa, .. } => {
            set_dfa_slab(current, vf.shape(), reach_dfa, R::one())
        }
        Property::FiniteTimeDfaSafety { avoid_dfa, .. } | Property::InfiniteTimeDfaSafety { avoid_dfa, .. } => {
            set_dfa_slab(current, vf.shape(), avoid_dfa, -R::one())
        }
    }
}

fn step_postprocess<R: Scalar>(vf: &mut ValueFunction<R>, property: &Property<R>) {
    let shape = vf.shape().to_vec();
    let current = vf.current_mut();
    match property {
        Property::FiniteTimeReachability { reach, .. } | Property::InfiniteTimeReachability { reach, .. } => {
            set_flat_indices(current, reach, R::one())
        }
        Property::FiniteTimeReachAvoid { reach, avoid, .. }
        | Property::InfiniteTimeReachAvoid { reach, avoid, .. } => {
            set_flat_indices(current, reach, R::one());
            set_flat_indices(current, avoid, R::zero());
        }
        Property::ExactTimeReachAvoid { avoid, .. } => set_flat_indices(current, avoid, R::zero()),
        Property::FiniteTimeSafety { avoid, .. } | Property::InfiniteTimeSafety { avoid, .. } => {
            set_flat_indices(current, avoid, -R::one())
        }
        Property::FiniteTimeReward { reward, discount, .. }
        | Property::InfiniteTimeReward { reward, discount, .. } => {
            for (c, r) in current.iter_mut().zip(reward.iter()) {
                *c = *discount * *c + *r;
            }
        }
        Property::ExpectedExitTime { avoid, .. } => {
            current.iter_mut().for_each(|v| *v = *v + R::one());
            set_flat_indices(current, avoid, R::zero());
        }
        Property::FiniteTimeDfaReachability { reach_dfa, .. }
        | Property::InfiniteTimeDfaReachability { reach_dfa, .. } => {
            set_dfa_slab(current, &shape, reach_dfa, R::one())
        }
        Property::FiniteTimeDfaSafety { avoid_dfa, .. } | Property::InfiniteTimeDfaSafety { avoid_dfa, .. } => {
            set_dfa_slab(current, &shape, avoid_dfa, -R::one())
        }
        Property::ExactTimeReachability { .. } => {}
    }
}

fn final_postprocess<R: Scalar>(vf: &mut ValueFunction<R>, property: &Property<R>) {
    let is_safety = matches!(
        property,
        Property::FiniteTimeSafety { .. }
            | Property::InfiniteTimeSafety { .. }
            | Property::FiniteTimeDfaSafety { .. }
            | Property::InfiniteTimeDfaSafety { .. }
    );
    if is_safety {
        vf.current_mut().iter_mut().for_each(|v| *v = *v + R::one());
    }
}

fn terminate<R: Scalar>(criterion: TerminationCriterion<R>, k: usize, vf: &ValueFunction<R>) -> bool {
    match criterion {
        TerminationCriterion::FixedIterations(n) => k >= n,
        TerminationCriterion::Convergence(tol) => vf.max_abs_residual() < tol,
    }
}

/// §4.5's `time_length - k` slab selection, for a step at 0-indexed position
/// `step` out of `horizon` total steps.
fn time_step_from_end(horizon: usize, step: usize) -> usize {
    horizon - 1 - step
}

fn strategy_cache_for<R: Scalar>(problem: &Problem<R>) -> StrategyCache<R> {
    match problem {
        Problem::Verification(p) => match &p.strategy {
            Strategy::None => StrategyCache::none(),
            given => StrategyCache::given(given.clone()),
        },
        Problem::Synthesis(p) => {
            let num_states = p.system.total_states();
            match p.spec.property.termination() {
                TerminationCriterion::FixedIterations(_) => StrategyCache::optimizing_time_varying(num_states),
                TerminationCriterion::Convergence(_) => StrategyCache::optimizing_stationary(num_states),
            }
        }
    }
}

fn given_strategy_horizon(strategy: &Strategy) -> Option<usize> {
    match strategy {
        Strategy::TimeVarying(slabs) => Some(slabs.len()),
        _ => None,
    }
}

/// Runs value iteration to completion for `problem`, using `alg.bellman_alg`
/// on factored systems (non-factored systems always use the exact
/// O-maximization path) and `threads` as the requested parallelism.
pub fn solve<R: Scalar>(
    problem: &Problem<R>,
    alg: imdp_core::RobustValueIteration,
    threads: usize,
) -> ImdpResult<Solution<R>> {
    let system = problem.system();
    let spec: &Specification<R> = problem.spec();
    let upper_bound = spec.upper_bound();
    let maximize = spec.maximize();

    let non_factored = system.is_non_factored();
    let needs_factored_algorithm = !non_factored;
    if needs_factored_algorithm {
        registry::require_available(alg.bellman_alg)?;
    }
    let exact = non_factored || alg.bellman_alg.exact_on_factored();

    let mut workspace: Workspace<R> = workspace::construct_workspace(system, alg.bellman_alg, threads);
    let mut cache = strategy_cache_for(problem);

    let horizon = match spec.property.termination() {
        TerminationCriterion::FixedIterations(n) => Some(n),
        TerminationCriterion::Convergence(_) => None,
    };
    let given_horizon = match problem {
        Problem::Verification(p) => given_strategy_horizon(&p.strategy),
        Problem::Synthesis(_) => None,
    };

    let mut vf: ValueFunction<R> = ValueFunction::zeros(system.state_vars().to_vec());
    initialize(&mut vf, &spec.property);

    vf.begin_iteration();
    let mut step_index = 0usize;
    run_step(
        system,
        &mut vf,
        &mut workspace,
        &mut cache,
        alg.bellman_alg,
        upper_bound,
        maximize,
        horizon,
        given_horizon,
        step_index,
    )?;
    step_postprocess(&mut vf, &spec.property);
    cache.step_post_process();
    vf.compute_residual();
    trace!(k = 0, residual = ?vf.max_abs_residual(), algorithm = %alg.bellman_alg, "value iteration step");

    let mut k = 1usize;
    while !terminate(spec.property.termination(), k, &vf) {
        vf.begin_iteration();
        step_index = k;
        run_step(
            system,
            &mut vf,
            &mut workspace,
            &mut cache,
            alg.bellman_alg,
            upper_bound,
            maximize,
            horizon,
            given_horizon,
            step_index,
        )?;
        step_postprocess(&mut vf, &spec.property);
        cache.step_post_process();
        vf.compute_residual();
        trace!(k, residual = ?vf.max_abs_residual(), algorithm = %alg.bellman_alg, "value iteration step");
        k += 1;
    }

    final_postprocess(&mut vf, &spec.property);

    let residual = vf.previous().to_vec();
    let values = vf.current().to_vec();
    let strategy = cache.finalize();

    Ok(Solution {
        values,
        iterations: k,
        residual,
        strategy,
        exact,
    })
}

#[allow(clippy::too_many_arguments)]
fn run_step<R: Scalar>(
    system: &FactoredMdp<R>,
    vf: &mut ValueFunction<R>,
    workspace: &mut Workspace<R>,
    cache: &mut StrategyCache<R>,
    alg: imdp_core::BellmanAlgorithm,
    upper_bound: bool,
    maximize: bool,
    horizon: Option<usize>,
    given_horizon: Option<usize>,
    step_index: usize,
) -> ImdpResult<()> {
    let time_step = match (horizon, given_horizon) {
        (_, Some(h)) => Some(time_step_from_end(h, step_index)),
        (Some(h), None) => Some(time_step_from_end(h, step_index)),
        (None, None) => None,
    };
    let next = bellman::bellman(system, vf.previous(), workspace, cache, alg, upper_bound, maximize, time_step)?;
    if next.len() != vf.current().len() {
        return Err(ImdpError::DimensionMismatch {
            context: "bellman step output vs value function shape".to_string(),
            expected: vec![vf.current().len()],
            actual: vec![next.len()],
        });
    }
    vf.current_mut().copy_from_slice(&next);
    Ok(())
}
