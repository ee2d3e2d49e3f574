//! Property and specification model (§3.7, §4.6, §4.7).
//!
//! A [`Property`] carries the temporal-logic-flavored goal (reachability,
//! reach-avoid, safety, reward, expected exit time, or a DFA-product
//! variant) together with its own parameters. The three-hook behavior
//! (`initialize`, `step_postprocess`, `final_postprocess`) these drive is
//! implemented against a concrete system shape by the value-iteration
//! driver, since only the driver knows the flattened state layout; this
//! module only holds the data and the construction-time validation (§4.7).

use crate::error::{ImdpError, ImdpResult};
use crate::scalar::Scalar;

/// How value iteration is told to stop for `Infinite*`/`ExpectedExitTime`
/// properties whose horizon is not fixed in advance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TerminationCriterion<R: Scalar> {
    FixedIterations(usize),
    Convergence(R),
}

/// Best-case (`Optimistic`) vs. worst-case (`Pessimistic`) interval bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SatisfactionMode {
    Pessimistic,
    Optimistic,
}

/// Whether the controller maximizes or minimizes the chosen bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyMode {
    Maximize,
    Minimize,
}

/// The property being checked or synthesized for, with its own parameters.
/// `reach`/`avoid`/`reach_dfa`/`avoid_dfa` are logical (pre-linearization)
/// index lists; `reward` is a flat array matching the state shape's element
/// count, checked for shape agreement at validation time against a caller-
/// supplied shape (§4.7).
#[derive(Debug, Clone, PartialEq)]
pub enum Property<R: Scalar> {
    FiniteTimeReachability { reach: Vec<usize>, horizon: usize },
    InfiniteTimeReachability { reach: Vec<usize>, eps: R },
    ExactTimeReachability { reach: Vec<usize>, horizon: usize },
    FiniteTimeReachAvoid { reach: Vec<usize>, avoid: Vec<usize>, horizon: usize },
    InfiniteTimeReachAvoid { reach: Vec<usize>, avoid: Vec<usize>, eps: R },
    ExactTimeReachAvoid { reach: Vec<usize>, avoid: Vec<usize>, horizon: usize },
    FiniteTimeSafety { avoid: Vec<usize>, horizon: usize },
    InfiniteTimeSafety { avoid: Vec<usize>, eps: R },
    FiniteTimeReward { reward: Vec<R>, discount: R, horizon: usize },
    InfiniteTimeReward { reward: Vec<R>, discount: R, eps: R },
    ExpectedExitTime { avoid: Vec<usize>, criterion: TerminationCriterion<R> },
    FiniteTimeDfaReachability { reach_dfa: Vec<usize>, horizon: usize },
    InfiniteTimeDfaReachability { reach_dfa: Vec<usize>, eps: R },
    FiniteTimeDfaSafety { avoid_dfa: Vec<usize>, horizon: usize },
    InfiniteTimeDfaSafety { avoid_dfa: Vec<usize>, eps: R },
}

impl<R: Scalar> Property<R> {
    pub fn is_infinite_time(&self) -> bool {
        matches!(
            self,
            Property::InfiniteTimeReachability { .. }
                | Property::InfiniteTimeReachAvoid { .. }
                | Property::InfiniteTimeSafety { .. }
                | Property::InfiniteTimeReward { .. }
                | Property::InfiniteTimeDfaReachability { .. }
                | Property::InfiniteTimeDfaSafety { .. }
        ) || matches!(
            self,
            Property::ExpectedExitTime {
                criterion: TerminationCriterion::Convergence(_),
                ..
            }
        )
    }

    pub fn is_product_property(&self) -> bool {
        matches!(
            self,
            Property::FiniteTimeDfaReachability { .. }
                | Property::InfiniteTimeDfaReachability { .. }
                | Property::FiniteTimeDfaSafety { .. }
                | Property::InfiniteTimeDfaSafety { .. }
        )
    }

    /// The termination criterion driving the value-iteration loop (§4.5).
    pub fn termination(&self) -> TerminationCriterion<R> {
        match self {
            Property::FiniteTimeReachability { horizon, .. }
            | Property::ExactTimeReachability { horizon, .. }
            | Property::FiniteTimeReachAvoid { horizon, .. }
            | Property::ExactTimeReachAvoid { horizon, .. }
            | Property::FiniteTimeSafety { horizon, .. }
            | Property::FiniteTimeReward { horizon, .. }
            | Property::FiniteTimeDfaReachability { horizon, .. }
            | Property::FiniteTimeDfaSafety { horizon, .. } => {
                TerminationCriterion::FixedIterations(*horizon)
            }
            Property::InfiniteTimeReachability { eps, .. }
            | Property::InfiniteTimeReachAvoid { eps, .. }
            | Property::InfiniteTimeSafety { eps, .. }
            | Property::InfiniteTimeReward { eps, .. }
            | Property::InfiniteTimeDfaReachability { eps, .. }
            | Property::InfiniteTimeDfaSafety { eps, .. } => {
                TerminationCriterion::Convergence(*eps)
            }
            Property::ExpectedExitTime { criterion, .. } => *criterion,
        }
    }

    /// Validates §4.7's rules that do not require knowing the concrete
    /// system shape (those are checked by the driver against the system,
    /// e.g. that indices are in range and reward shape matches).
    pub fn validate_parameters(&self) -> ImdpResult<()> {
        let check_horizon = |h: usize| -> ImdpResult<()> {
            if h < 1 {
                Err(ImdpError::Domain("time_horizon must be >= 1".to_string()))
            } else {
                Ok(())
            }
        };
        let check_eps = |eps: R| -> ImdpResult<()> {
            if eps <= R::zero() {
                Err(ImdpError::Domain(
                    "convergence tolerance must be > 0".to_string(),
                ))
            } else {
                Ok(())
            }
        };
        let check_disjoint = |reach: &[usize], avoid: &[usize]| -> ImdpResult<()> {
            if reach.iter().any(|r| avoid.contains(r)) {
                Err(ImdpError::Domain(
                    "reach and avoid sets must be disjoint".to_string(),
                ))
            } else {
                Ok(())
            }
        };

        match self {
            Property::FiniteTimeReachability { horizon, .. }
            | Property::ExactTimeReachability { horizon, .. }
            | Property::FiniteTimeSafety { horizon, .. }
            | Property::FiniteTimeDfaReachability { horizon, .. }
            | Property::FiniteTimeDfaSafety { horizon, .. } => check_horizon(*horizon),
            Property::FiniteTimeReachAvoid { reach, avoid, horizon }
            | Property::ExactTimeReachAvoid { reach, avoid, horizon } => {
                check_horizon(*horizon)?;
                check_disjoint(reach, avoid)
            }
            Property::InfiniteTimeReachability { eps, .. }
            | Property::InfiniteTimeSafety { eps, .. }
            | Property::InfiniteTimeDfaReachability { eps, .. }
            | Property::InfiniteTimeDfaSafety { eps, .. } => check_eps(*eps),
            Property::InfiniteTimeReachAvoid { reach, avoid, eps } => {
                check_eps(*eps)?;
                check_disjoint(reach, avoid)
            }
            Property::FiniteTimeReward {
                discount, horizon, ..
            } => {
                check_horizon(*horizon)?;
                if *discount <= R::zero() {
                    return Err(ImdpError::Domain("discount must be > 0".to_string()));
                }
                Ok(())
            }
            Property::InfiniteTimeReward { discount, eps, .. } => {
                check_eps(*eps)?;
                if *discount <= R::zero() || *discount >= R::one() {
                    return Err(ImdpError::Domain(
                        "infinite-time reward requires 0 < discount < 1".to_string(),
                    ));
                }
                Ok(())
            }
            Property::ExpectedExitTime { criterion, .. } => match criterion {
                TerminationCriterion::FixedIterations(h) => check_horizon(*h),
                TerminationCriterion::Convergence(eps) => check_eps(*eps),
            },
        }
    }
}

/// Bundles a property with the satisfaction/strategy modes (§3.7).
#[derive(Debug, Clone, PartialEq)]
pub struct Specification<R: Scalar> {
    pub property: Property<R>,
    pub satisfaction_mode: SatisfactionMode,
    pub strategy_mode: StrategyMode,
}

impl<R: Scalar> Specification<R> {
    pub fn new(
        property: Property<R>,
        satisfaction_mode: SatisfactionMode,
        strategy_mode: StrategyMode,
    ) -> ImdpResult<Self> {
        property.validate_parameters()?;
        Ok(Self {
            property,
            satisfaction_mode,
            strategy_mode,
        })
    }

    /// §4.2's `upper_bound` flag: pessimistic means the worst case over the
    /// ambiguity, which for reachability-flavored properties is the lower
    /// interval kernel; optimistic is the upper kernel.
    pub fn upper_bound(&self) -> bool {
        self.satisfaction_mode == SatisfactionMode::Optimistic
    }

    pub fn maximize(&self) -> bool {
        self.strategy_mode == StrategyMode::Maximize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_horizon_is_rejected() {
        let prop = Property::<f64>::FiniteTimeReachability {
            reach: vec![2],
            horizon: 0,
        };
        assert!(prop.validate_parameters().is_err());
    }

    #[test]
    fn overlapping_reach_avoid_is_rejected() {
        let prop = Property::<f64>::FiniteTimeReachAvoid {
            reach: vec![1, 2],
            avoid: vec![2, 3],
            horizon: 10,
        };
        assert!(prop.validate_parameters().is_err());
    }

    #[test]
    fn infinite_time_reward_requires_discount_below_one() {
        let prop = Property::<f64>::InfiniteTimeReward {
            reward: vec![1.0, 0.0],
            discount: 1.0,
            eps: 1e-6,
        };
        assert!(prop.validate_parameters().is_err());
    }

    #[test]
    fn specification_exposes_bound_and_objective_flags() {
        let spec = Specification::new(
            Property::FiniteTimeReachability {
                reach: vec![2],
                horizon: 10,
            },
            SatisfactionMode::Pessimistic,
            StrategyMode::Maximize,
        )
        .unwrap();
        assert!(!spec.upper_bound());
        assert!(spec.maximize());
    }
}
