//! Strategy caches (§4.3): the Bellman step's action-reduction policy.
//!
//! Every per-state action reduction in [`crate::bellman`] goes through one of
//! these four tagged variants rather than a trait object, matching this
//! codebase's ad-hoc-polymorphism-as-tagged-union convention (§9 design
//! notes). `reduce` is the hot-path call: given every candidate action's
//! value at one source state, it returns the chosen scalar and, for the
//! optimizing variants, records the winning action tuple.

use imdp_core::{ActionTuple, Scalar, Strategy};

/// The Bellman step's action-reduction policy for one solve.
pub enum StrategyCache<R: Scalar> {
    /// Verification with no fixed strategy: reduce by `max`/`min` over the
    /// candidate values, recording nothing.
    None,
    /// Verification against a fixed strategy: pick the given action's value
    /// without optimizing.
    Given { strategy: Strategy },
    /// Synthesis, stationary: one action slot per source state, with
    /// "policy improvement stability" — once a state has a recorded action,
    /// search starts from that action's current-iteration value instead of
    /// an unconditional `-infinity`/`+infinity` sentinel.
    OptimizingStationary {
        actions: Vec<ActionTuple>,
        initialized: Vec<bool>,
    },
    /// Synthesis, time-varying: a current-step slot per source state, pushed
    /// onto `history` at the end of every step; reversed to chronological
    /// order once the driver finishes.
    OptimizingTimeVarying {
        current: Vec<ActionTuple>,
        history: Vec<Vec<ActionTuple>>,
    },
}

impl<R: Scalar> StrategyCache<R> {
    pub fn none() -> Self {
        StrategyCache::None
    }

    pub fn given(strategy: Strategy) -> Self {
        StrategyCache::Given { strategy }
    }

    pub fn optimizing_stationary(num_states: usize) -> Self {
        StrategyCache::OptimizingStationary {
            actions: vec![ActionTuple::new(); num_states],
            initialized: vec![false; num_states],
        }
    }

    pub fn optimizing_time_varying(num_states: usize) -> Self {
        StrategyCache::OptimizingTimeVarying {
            current: vec![ActionTuple::new(); num_states],
            history: Vec::new(),
        }
    }

    /// Reduces `candidates` (one `(action_tuple, value)` pair per action
    /// available at this source state) to the chosen scalar value,
    /// recording the winning action for the optimizing variants.
    /// `time_step_from_end` is `Some(time_horizon - k)` for a time-varying
    /// given strategy or time-varying synthesis, `None` for stationary and
    /// infinite-time solves.
    pub fn reduce(
        &mut self,
        state_idx: usize,
        candidates: &[(ActionTuple, R)],
        maximize: bool,
        time_step_from_end: Option<usize>,
    ) -> R {
        match self {
            StrategyCache::None => reduce_by_opt(candidates, maximize).1,
            StrategyCache::Given { strategy } => {
                let chosen = match strategy {
                    Strategy::Stationary(slab) => &slab[state_idx],
                    Strategy::TimeVarying(slabs) => {
                        let k = time_step_from_end.expect("time-varying strategy needs a time step");
                        &slabs[k][state_idx]
                    }
                    Strategy::None => unreachable!("Given cache always wraps a concrete strategy"),
                };
                candidates
                    .iter()
                    .find(|(action, _)| action == chosen)
                    .map(|(_, value)| *value)
                    .expect("given strategy's action must be among the evaluated candidates")
            }
            StrategyCache::OptimizingStationary { actions, initialized } => {
                let seed = if initialized[state_idx] {
                    candidates
                        .iter()
                        .find(|(action, _)| action == &actions[state_idx])
                        .map(|(_, value)| *value)
                } else {
                    None
                };
                let (best_action, best_value) = reduce_by_opt_seeded(candidates, maximize, seed);
                actions[state_idx] = best_action;
                initialized[state_idx] = true;
                best_value
            }
            StrategyCache::OptimizingTimeVarying { current, .. } => {
                let (best_action, best_value) = reduce_by_opt(candidates, maximize);
                current[state_idx] = best_action;
                best_value
            }
        }
    }

    /// Called once per completed Bellman step; for the time-varying
    /// optimizing cache this pushes the just-filled slab onto history.
    pub fn step_post_process(&mut self) {
        if let StrategyCache::OptimizingTimeVarying { current, history } = self {
            history.push(current.clone());
        }
    }

    /// Builds the [`Strategy`] this cache has accumulated, reversing
    /// time-varying history into chronological order (§4.3).
    pub fn finalize(self) -> Strategy {
        match self {
            StrategyCache::None => Strategy::None,
            StrategyCache::Given { strategy } => strategy,
            StrategyCache::OptimizingStationary { actions, .. } => Strategy::Stationary(actions),
            StrategyCache::OptimizingTimeVarying { mut history, .. } => {
                history.reverse();
                Strategy::TimeVarying(history)
            }
        }
    }
}

fn reduce_by_opt<R: Scalar>(candidates: &[(ActionTuple, R)], maximize: bool) -> (ActionTuple, R) {
    reduce_by_opt_seeded(candidates, maximize, None)
}

fn reduce_by_opt_seeded<R: Scalar>(
    candidates: &[(ActionTuple, R)],
    maximize: bool,
    seed: Option<R>,
) -> (ActionTuple, R) {
    let mut iter = candidates.iter();
    let (mut best_action, mut best_value) = match seed {
        Some(v) => (candidates[0].0.clone(), v),
        None => {
            let (action, value) = iter.next().expect("at least one action must be evaluated");
            (action.clone(), *value)
        }
    };
    for (action, value) in iter {
        let better = if maximize { *value > best_value } else { *value < best_value };
        if better {
            best_value = *value;
            best_action = action.clone();
        }
    }
    (best_action, best_value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidates() -> Vec<(ActionTuple, f64)> {
        vec![(vec![0], 1.0), (vec![1], 3.0), (vec![2], 2.0)]
    }

    #[test]
    fn none_cache_reduces_by_max_or_min() {
        let mut cache: StrategyCache<f64> = StrategyCache::none();
        assert_eq!(cache.reduce(0, &candidates(), true, None), 3.0);
        assert_eq!(cache.reduce(0, &candidates(), false, None), 1.0);
    }

    #[test]
    fn optimizing_stationary_records_the_winning_action() {
        let mut cache: StrategyCache<f64> = StrategyCache::optimizing_stationary(1);
        let value = cache.reduce(0, &candidates(), true, None);
        assert_eq!(value, 3.0);
        match cache.finalize() {
            Strategy::Stationary(actions) => assert_eq!(actions[0], vec![1]),
            _ => panic!("expected stationary strategy"),
        }
    }

    #[test]
    fn optimizing_stationary_seeds_from_previous_action_on_repeat_calls() {
        let mut cache: StrategyCache<f64> = StrategyCache::optimizing_stationary(1);
        cache.reduce(0, &candidates(), true, None);
        // Second iteration: action 1's value has dropped below action 2's,
        // the seed should still correctly track the new optimum.
        let next = vec![(vec![0], 1.0), (vec![1], 0.5), (vec![2], 2.0)];
        let value = cache.reduce(0, &next, true, None);
        assert_eq!(value, 2.0);
    }

    #[test]
    fn given_strategy_cache_picks_the_commanded_action_without_optimizing() {
        let strategy = Strategy::Stationary(vec![vec![1]]);
        let mut cache: StrategyCache<f64> = StrategyCache::given(strategy);
        let value = cache.reduce(0, &candidates(), true, None);
        assert_eq!(value, 3.0);
    }

    #[test]
    fn time_varying_cache_reverses_history_to_chronological_order() {
        let mut cache: StrategyCache<f64> = StrategyCache::optimizing_time_varying(1);
        cache.reduce(0, &candidates(), true, None);
        cache.step_post_process();
        let later = vec![(vec![0], 5.0), (vec![1], 1.0), (vec![2], 2.0)];
        cache.reduce(0, &later, true, None);
        cache.step_post_process();
        match cache.finalize() {
            Strategy::TimeVarying(slabs) => {
                assert_eq!(slabs.len(), 2);
                // Chronological order: the first step executed is slabs[0].
                assert_eq!(slabs[0][0], vec![1]);
                assert_eq!(slabs[1][0], vec![0]);
            }
            _ => panic!("expected time-varying strategy"),
        }
    }
}
