//! Strategies (§3.5): the adversary-free policy a controller commits to,
//! either for verification (an optional given strategy) or as the result of
//! synthesis.

use crate::error::{ImdpError, ImdpResult};

/// One action-index tuple per source-state tuple (both already linearized
/// to a flat index over the system's state/action axes respectively).
pub type ActionTuple = Vec<usize>;

/// A controller's policy: none (verification explores the adversary's
/// worst/best case over actions too), a single stationary array, or a
/// bounded-length time-varying sequence of arrays indexed backwards from
/// the horizon (index `0` is the slab used on the last step before
/// termination, `k - 1` the slab used on the first step).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Strategy {
    None,
    Stationary(Vec<ActionTuple>),
    TimeVarying(Vec<Vec<ActionTuple>>),
}

impl Strategy {
    /// Validates every chosen tuple lies within `1..action_vars` per axis
    /// (here, `0..action_vars[i]` using 0-based indices) and, for
    /// stationary/time-varying, that every source state has an entry.
    pub fn validate(&self, num_states: usize, action_vars: &[usize]) -> ImdpResult<()> {
        let check_tuple = |tuple: &ActionTuple| -> ImdpResult<()> {
            if tuple.len() != action_vars.len() {
                return Err(ImdpError::Incompatibility(format!(
                    "strategy action tuple arity {} does not match action_vars rank {}",
                    tuple.len(),
                    action_vars.len()
                )));
            }
            for (&v, &dim) in tuple.iter().zip(action_vars.iter()) {
                if v >= dim {
                    return Err(ImdpError::Incompatibility(format!(
                        "strategy action index {v} outside 0..{dim}"
                    )));
                }
            }
            Ok(())
        };

        match self {
            Strategy::None => Ok(()),
            Strategy::Stationary(slab) => {
                if slab.len() != num_states {
                    return Err(ImdpError::DimensionMismatch {
                        context: "stationary strategy slab length vs state count".to_string(),
                        expected: vec![num_states],
                        actual: vec![slab.len()],
                    });
                }
                slab.iter().try_for_each(check_tuple)
            }
            Strategy::TimeVarying(slabs) => {
                for slab in slabs {
                    if slab.len() != num_states {
                        return Err(ImdpError::DimensionMismatch {
                            context: "time-varying strategy slab length vs state count"
                                .to_string(),
                            expected: vec![num_states],
                            actual: vec![slab.len()],
                        });
                    }
                    slab.iter().try_for_each(check_tuple)?;
                }
                Ok(())
            }
        }
    }

    pub fn is_time_varying(&self) -> bool {
        matches!(self, Strategy::TimeVarying(_))
    }

    pub fn horizon(&self) -> Option<usize> {
        match self {
            Strategy::TimeVarying(slabs) => Some(slabs.len()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stationary_strategy_validates_against_action_vars() {
        let strategy = Strategy::Stationary(vec![vec![0], vec![1], vec![0]]);
        assert!(strategy.validate(3, &[2]).is_ok());
    }

    #[test]
    fn out_of_range_action_is_rejected() {
        let strategy = Strategy::Stationary(vec![vec![5]]);
        assert!(strategy.validate(1, &[2]).is_err());
    }

    #[test]
    fn time_varying_strategy_reports_horizon() {
        let strategy = Strategy::TimeVarying(vec![vec![vec![0]]; 10]);
        assert_eq!(strategy.horizon(), Some(10));
        assert!(strategy.is_time_varying());
    }
}
