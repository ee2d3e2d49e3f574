//! The robust Bellman operator (§4.2, §6.4): one value-iteration step.
//!
//! [`bellman`] dispatches on whether `system` is non-factored (the dense or
//! sparse single-column O-maximization kernel, with a permutation shared
//! across every column in dense mode) or factored (per-axis marginals
//! combined via the requested [`BellmanAlgorithm`]). Either way the reduction
//! over actions at a source state goes through the caller's
//! [`StrategyCache`], and implicit-sink source states (outside
//! `source_dims`) self-loop: `next[s] = previous[s]`.

use imdp_core::{
    ActionTuple, AmbiguitySet, BellmanAlgorithm, FactoredMdp, ImdpError, ImdpResult, Scalar,
};

#[cfg(feature = "desktop")]
use rayon::prelude::*;

use crate::kernels::factored::{self, AxisColumn};
use crate::kernels::omax;
use crate::strategy_cache::StrategyCache;
use crate::workspace::Workspace;

/// Maps `f` over `items`, in parallel when `parallel` is set and the
/// `desktop` feature is compiled in, sequentially otherwise. The heavy
/// per-state kernel evaluation is the only part run concurrently; the
/// strategy cache's action bookkeeping always happens afterward, serially,
/// since it needs `&mut` access (§4.4).
fn map_states<T: Send, F>(items: &[usize], parallel: bool, f: F) -> Vec<T>
where
    F: Fn(usize) -> T + Sync,
{
    #[cfg(feature = "desktop")]
    {
        if parallel {
            return items.par_iter().map(|&i| f(i)).collect();
        }
    }
    let _ = parallel;
    items.iter().map(|&i| f(i)).collect()
}

/// Runs one Bellman step, writing a freshly allocated `next` value array.
/// `upper_bound` selects the O-max direction (`true` = optimistic /
/// best-case, `false` = pessimistic / worst-case); `maximize` selects
/// whether the controller prefers high or low values when reducing over
/// actions. `time_step_from_end` must be `Some(time_horizon - k)` whenever
/// `cache` wraps a time-varying strategy or is itself time-varying.
pub fn bellman<R: Scalar>(
    system: &FactoredMdp<R>,
    previous: &[R],
    workspace: &mut Workspace<R>,
    cache: &mut StrategyCache<R>,
    alg: BellmanAlgorithm,
    upper_bound: bool,
    maximize: bool,
    time_step_from_end: Option<usize>,
) -> ImdpResult<Vec<R>> {
    if previous.len() != system.total_states() {
        return Err(ImdpError::DimensionMismatch {
            context: "bellman: previous value array vs system state count".to_string(),
            expected: vec![system.total_states()],
            actual: vec![previous.len()],
        });
    }

    if system.is_non_factored() {
        bellman_non_factored(system, previous, workspace, cache, upper_bound, maximize, time_step_from_end)
    } else {
        bellman_factored(system, previous, workspace, cache, alg, upper_bound, maximize, time_step_from_end)
    }
}

/// Convenience entry point mirroring [`bellman`] with `time_step_from_end`
/// defaulted to `None` for stationary/infinite-time solves.
#[macro_export]
macro_rules! bellman {
    ($system:expr, $previous:expr, $workspace:expr, $cache:expr, $alg:expr, $upper_bound:expr, $maximize:expr) => {
        $crate::bellman::bellman($system, $previous, $workspace, $cache, $alg, $upper_bound, $maximize, None)
    };
    ($system:expr, $previous:expr, $workspace:expr, $cache:expr, $alg:expr, $upper_bound:expr, $maximize:expr, $time_step:expr) => {
        $crate::bellman::bellman(
            $system,
            $previous,
            $workspace,
            $cache,
            $alg,
            $upper_bound,
            $maximize,
            $time_step,
        )
    };
}

fn unravel(mut idx: usize, shape: &[usize]) -> Vec<usize> {
    let mut tuple = vec![0; shape.len()];
    for i in (0..shape.len()).rev() {
        tuple[i] = idx % shape[i];
        idx /= shape[i];
    }
    tuple
}

fn bellman_non_factored<R: Scalar>(
    system: &FactoredMdp<R>,
    previous: &[R],
    workspace: &mut Workspace<R>,
    cache: &mut StrategyCache<R>,
    upper_bound: bool,
    maximize: bool,
    time_step_from_end: Option<usize>,
) -> ImdpResult<Vec<R>> {
    let num_states = system.state_vars()[0];
    let num_actions = system.action_vars()[0];
    let marginal = &system.marginals()[0];
    let mut next = vec![R::zero(); num_states];

    let real_states: Vec<usize> = (0..num_states)
        .filter(|&s| system.is_real_source(&[s]))
        .collect();

    let per_state_candidates: Vec<ImdpResult<Vec<(ActionTuple, R)>>> = match (workspace, marginal.ambiguity()) {
        (Workspace::Dense(dense_ws), AmbiguitySet::Dense(dense_set)) => {
            dense_ws.permutation = omax::sort_permutation(previous, upper_bound);
            let permutation = &dense_ws.permutation;
            let parallel = dense_ws.action_values.len() > 1;
            map_states(&real_states, parallel, |state_idx| {
                let mut candidates = Vec::with_capacity(num_actions);
                for action_idx in 0..num_actions {
                    let col = marginal.column_index(&[state_idx], &[action_idx])?;
                    let value = omax::o_maximize_dense_with_permutation(
                        dense_set,
                        col,
                        previous,
                        permutation,
                        dense_set.sum_lower()[col],
                    );
                    candidates.push((vec![action_idx], value));
                }
                Ok(candidates)
            })
        }
        (Workspace::Sparse(sparse_ws), ambiguity @ AmbiguitySet::Sparse(_)) => {
            let parallel = sparse_ws.action_values.len() > 1;
            map_states(&real_states, parallel, |state_idx| {
                let mut candidates = Vec::with_capacity(num_actions);
                for action_idx in 0..num_actions {
                    let col = marginal.column_index(&[state_idx], &[action_idx])?;
                    let value = omax::o_maximize(ambiguity, col, previous, upper_bound);
                    candidates.push((vec![action_idx], value));
                }
                Ok(candidates)
            })
        }
        _ => {
            return Err(ImdpError::Incompatibility(
                "workspace representation does not match the system's ambiguity set representation"
                    .to_string(),
            ))
        }
    };

    for (&state_idx, candidates) in real_states.iter().zip(per_state_candidates.into_iter()) {
        next[state_idx] = cache.reduce(state_idx, &candidates?, maximize, time_step_from_end);
    }
    for state_idx in 0..num_states {
        if !system.is_real_source(&[state_idx]) {
            next[state_idx] = previous[state_idx];
        }
    }

    Ok(next)
}

fn bellman_factored<R: Scalar>(
    system: &FactoredMdp<R>,
    previous: &[R],
    workspace: &mut Workspace<R>,
    cache: &mut StrategyCache<R>,
    alg: BellmanAlgorithm,
    upper_bound: bool,
    maximize: bool,
    time_step_from_end: Option<usize>,
) -> ImdpResult<Vec<R>> {
    // Shard count lives per-axis workspace (all axes are built with the same
    // shard count, per `workspace::construct_workspace`); read it off axis 0.
    let parallel = match workspace {
        Workspace::Factored(ws) => ws
            .axes
            .first()
            .map(|axis| match axis {
                Workspace::Dense(d) => d.action_values.len() > 1,
                Workspace::Sparse(s) => s.action_values.len() > 1,
                Workspace::Factored(_) => false,
            })
            .unwrap_or(false),
        _ => {
            return Err(ImdpError::Incompatibility(
                "factored system requires a factored workspace".to_string(),
            ))
        }
    };

    let state_vars = system.state_vars();
    let action_vars = system.action_vars();
    let total_states = system.total_states();
    let total_actions = system.total_actions();
    let mut next = vec![R::zero(); total_states];

    let real_states: Vec<usize> = (0..total_states)
        .filter(|&s| system.is_real_source(&unravel(s, state_vars)))
        .collect();

    let per_state_values: Vec<ImdpResult<Vec<(ActionTuple, R)>>> = map_states(&real_states, parallel, |state_idx| {
        let state_tuple = unravel(state_idx, state_vars);
        let mut candidates: Vec<(ActionTuple, R)> = Vec::with_capacity(total_actions);
        for action_idx in 0..total_actions {
            let action_tuple = unravel(action_idx, action_vars);
            let mut columns = Vec::with_capacity(system.marginals().len());
            for marginal in system.marginals() {
                let state_sub: Vec<usize> =
                    marginal.state_indices().iter().map(|&i| state_tuple[i]).collect();
                let action_sub: Vec<usize> =
                    marginal.action_indices().iter().map(|&i| action_tuple[i]).collect();
                let col = marginal.column_index(&state_sub, &action_sub)?;
                columns.push((marginal.ambiguity(), col));
            }
            let axes: Vec<AxisColumn<R>> = columns
                .iter()
                .map(|&(ambiguity, col)| AxisColumn { ambiguity, col })
                .collect();

            let value = match alg {
                BellmanAlgorithm::OMaximization => {
                    factored::block_coordinate_omax(&axes, state_vars, previous, upper_bound, 4)
                }
                BellmanAlgorithm::VertexEnumeration => {
                    factored::vertex_enumeration_joint(&axes, state_vars, previous, upper_bound, 10_000)?
                }
                BellmanAlgorithm::LpMcCormickRelaxation => {
                    factored::mccormick_joint(&axes, state_vars, previous, upper_bound, 4)?
                }
            };
            candidates.push((action_tuple, value));
        }
        Ok(candidates)
    });

    for (&state_idx, candidates) in real_states.iter().zip(per_state_values.into_iter()) {
        next[state_idx] = cache.reduce(state_idx, &candidates?, maximize, time_step_from_end);
    }
    for state_idx in 0..total_states {
        if !system.is_real_source(&unravel(state_idx, state_vars)) {
            next[state_idx] = previous[state_idx];
        }
    }

    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use imdp_core::{DenseAmbiguitySet, InitialStates, Marginal};

    fn two_state_system() -> FactoredMdp<f64> {
        // State 0 -> action 0 deterministically to state 1; state 0 -> action
        // 1 deterministically to state 0. State 1 is an absorbing target.
        let n_target = 2;
        let n_source = 4; // 2 states * 2 actions
        let mut lower = vec![0.0; n_target * n_source];
        let gap = vec![0.0; n_target * n_source];
        // column order: (state, action) row-major over (source_shape=[2], action_shape=[2])
        lower[0 * n_target + 1] = 1.0; // state 0, action 0 -> state 1
        lower[1 * n_target + 0] = 1.0; // state 0, action 1 -> state 0
        lower[2 * n_target + 1] = 1.0; // state 1, action 0 -> state 1
        lower[3 * n_target + 1] = 1.0; // state 1, action 1 -> state 1
        let ambiguity =
            AmbiguitySet::Dense(DenseAmbiguitySet::from_lower_gap(n_target, n_source, lower, gap).unwrap());
        let marginal = Marginal::new(ambiguity, vec![0], vec![0], vec![2], vec![2]).unwrap();
        FactoredMdp::non_factored(2, 2, marginal, InitialStates::All).unwrap()
    }

    #[test]
    fn dense_non_factored_step_picks_best_action_when_maximizing() {
        let system = two_state_system();
        let previous = vec![0.0, 1.0];
        let mut workspace = crate::workspace::construct_workspace(&system, BellmanAlgorithm::OMaximization, 1);
        let mut cache: StrategyCache<f64> = StrategyCache::optimizing_stationary(2);
        let next = bellman(
            &system,
            &previous,
            &mut workspace,
            &mut cache,
            BellmanAlgorithm::OMaximization,
            true,
            true,
            None,
        )
        .unwrap();
        // State 0 should pick action 0 (reaches state 1, value 1.0).
        assert!((next[0] - 1.0).abs() < 1e-9);
        assert!((next[1] - 1.0).abs() < 1e-9);
        match cache.finalize() {
            imdp_core::Strategy::Stationary(actions) => assert_eq!(actions[0], vec![0]),
            _ => panic!("expected stationary strategy"),
        }
    }

    #[test]
    fn minimizing_strategy_picks_the_self_loop() {
        let system = two_state_system();
        let previous = vec![0.0, 1.0];
        let mut workspace = crate::workspace::construct_workspace(&system, BellmanAlgorithm::OMaximization, 1);
        let mut cache: StrategyCache<f64> = StrategyCache::optimizing_stationary(2);
        let next = bellman(
            &system,
            &previous,
            &mut workspace,
            &mut cache,
            BellmanAlgorithm::OMaximization,
            false,
            false,
            None,
        )
        .unwrap();
        // Minimizing at state 0 should pick action 1 (self-loop, value 0.0).
        assert!((next[0] - 0.0).abs() < 1e-9);
    }
}
