//! Factored robust MDP (§3.3) and the implicit-sink convention.

use crate::error::{ImdpError, ImdpResult};
use crate::marginal::Marginal;
use crate::scalar::Scalar;

/// Which source-state tuples are considered "initial" for the purposes of
/// reporting or restricting a solve to a subset of states.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitialStates {
    All,
    Some(Vec<Vec<usize>>),
}

/// A factored (orthogonal) robust MDP: `N` state axes, `M` action axes, one
/// marginal per target axis, and a `source_dims` truncation marking which
/// source configurations are real (the rest self-loop as implicit sinks).
///
/// An ordinary, non-factored IMDP is the special case `N = M = 1`.
#[derive(Debug, Clone)]
pub struct FactoredMdp<R: Scalar> {
    state_vars: Vec<usize>,
    action_vars: Vec<usize>,
    source_dims: Vec<usize>,
    marginals: Vec<Marginal<R>>,
    initial_states: InitialStates,
}

impl<R: Scalar> FactoredMdp<R> {
    pub fn new(
        state_vars: Vec<usize>,
        action_vars: Vec<usize>,
        source_dims: Vec<usize>,
        marginals: Vec<Marginal<R>>,
        initial_states: InitialStates,
    ) -> ImdpResult<Self> {
        let n = state_vars.len();
        if marginals.len() != n {
            return Err(ImdpError::DimensionMismatch {
                context: "marginals count vs state_vars rank".to_string(),
                expected: vec![n],
                actual: vec![marginals.len()],
            });
        }
        if source_dims.len() != n {
            return Err(ImdpError::DimensionMismatch {
                context: "source_dims rank vs state_vars rank".to_string(),
                expected: vec![n],
                actual: vec![source_dims.len()],
            });
        }
        for (i, (&sd, &sv)) in source_dims.iter().zip(state_vars.iter()).enumerate() {
            if sd > sv {
                return Err(ImdpError::DimensionMismatch {
                    context: format!("source_dims[{i}] must be <= state_vars[{i}]"),
                    expected: vec![sv],
                    actual: vec![sd],
                });
            }
        }
        if let InitialStates::Some(ref states) = initial_states {
            for tuple in states {
                if tuple.len() != n {
                    return Err(ImdpError::InvalidState {
                        index: tuple.len(),
                        axis_size: n,
                        context: "initial state tuple arity".to_string(),
                    });
                }
                for (&v, &dim) in tuple.iter().zip(state_vars.iter()) {
                    if v >= dim {
                        return Err(ImdpError::InvalidState {
                            index: v,
                            axis_size: dim,
                            context: "initial state index".to_string(),
                        });
                    }
                }
            }
        }
        Ok(Self {
            state_vars,
            action_vars,
            source_dims,
            marginals,
            initial_states,
        })
    }

    /// Convenience constructor for the `N = M = 1` non-factored case.
    pub fn non_factored(
        num_states: usize,
        num_actions: usize,
        marginal: Marginal<R>,
        initial_states: InitialStates,
    ) -> ImdpResult<Self> {
        Self::new(
            vec![num_states],
            vec![num_actions],
            vec![num_states],
            vec![marginal],
            initial_states,
        )
    }

    pub fn state_vars(&self) -> &[usize] {
        &self.state_vars
    }

    pub fn action_vars(&self) -> &[usize] {
        &self.action_vars
    }

    pub fn source_dims(&self) -> &[usize] {
        &self.source_dims
    }

    pub fn marginals(&self) -> &[Marginal<R>] {
        &self.marginals
    }

    pub fn initial_states(&self) -> &InitialStates {
        &self.initial_states
    }

    pub fn num_axes(&self) -> usize {
        self.state_vars.len()
    }

    pub fn total_states(&self) -> usize {
        self.state_vars.iter().product()
    }

    pub fn total_actions(&self) -> usize {
        self.action_vars.iter().product()
    }

    /// Whether `N = M = 1`: the ordinary, non-factored IMDP case, in which
    /// O-maximization is exact rather than a relaxation.
    pub fn is_non_factored(&self) -> bool {
        self.state_vars.len() == 1 && self.action_vars.len() == 1
    }

    /// Whether a source-state tuple lies within `source_dims`, i.e. is a real
    /// source rather than an implicit, deterministically self-looping sink.
    pub fn is_real_source(&self, state_tuple: &[usize]) -> bool {
        state_tuple
            .iter()
            .zip(self.source_dims.iter())
            .all(|(&v, &sd)| v < sd)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ambiguity::{AmbiguitySet, DenseAmbiguitySet};

    fn single_marginal(n_source: usize) -> Marginal<f64> {
        let n_target = 3;
        let mut lower = vec![0.0; n_target * n_source];
        let mut gap = vec![0.0; n_target * n_source];
        for c in 0..n_source {
            lower[c * n_target] = 1.0;
        }
        let set = AmbiguitySet::Dense(
            DenseAmbiguitySet::from_lower_gap(n_target, n_source, lower, gap).unwrap(),
        );
        Marginal::new(set, vec![0], vec![0], vec![3], vec![2]).unwrap()
    }

    #[test]
    fn non_factored_case_is_detected() {
        let sys =
            FactoredMdp::non_factored(3, 2, single_marginal(6), InitialStates::All).unwrap();
        assert!(sys.is_non_factored());
        assert_eq!(sys.total_states(), 3);
    }

    #[test]
    fn source_dims_truncation_detects_sinks() {
        let sys = FactoredMdp::new(
            vec![3],
            vec![2],
            vec![2],
            vec![single_marginal(6)],
            InitialStates::All,
        )
        .unwrap();
        assert!(sys.is_real_source(&[0]));
        assert!(sys.is_real_source(&[1]));
        assert!(!sys.is_real_source(&[2]));
    }

    #[test]
    fn source_dims_exceeding_state_vars_is_rejected() {
        let err = FactoredMdp::new(
            vec![3],
            vec![2],
            vec![4],
            vec![single_marginal(6)],
            InitialStates::All,
        )
        .unwrap_err();
        assert!(matches!(err, ImdpError::DimensionMismatch { .. }));
    }
}
