//! Problem glue (§4.8): binds a system, a specification, and (for
//! verification) an optional strategy, checking the cross-object
//! compatibility rules from §4.7/§7 once at construction time.

use crate::algorithm::BellmanAlgorithm;
use crate::error::{ImdpError, ImdpResult};
use crate::property::TerminationCriterion;
use crate::scalar::Scalar;
use crate::strategy::Strategy;
use crate::system::FactoredMdp;
use crate::property::Specification;

fn check_product_compatibility<R: Scalar>(
    spec: &Specification<R>,
    is_product: bool,
) -> ImdpResult<()> {
    if spec.property.is_product_property() != is_product {
        return Err(ImdpError::Incompatibility(
            "DFA-product properties require a product system and vice versa".to_string(),
        ));
    }
    Ok(())
}

fn check_strategy_compatibility<R: Scalar>(
    spec: &Specification<R>,
    strategy: &Strategy,
    system: &FactoredMdp<R>,
) -> ImdpResult<()> {
    if strategy.is_time_varying() && spec.property.is_infinite_time() {
        return Err(ImdpError::Incompatibility(
            "time-varying strategy is incompatible with an infinite-time property".to_string(),
        ));
    }
    if let (Strategy::TimeVarying(_), TerminationCriterion::FixedIterations(horizon)) =
        (strategy, spec.property.termination())
    {
        if strategy.horizon() != Some(horizon) {
            return Err(ImdpError::Incompatibility(format!(
                "time-varying strategy length {:?} must equal the property's horizon {}",
                strategy.horizon(),
                horizon
            )));
        }
    }
    strategy.validate(system.total_states(), system.action_vars())
}

/// Given a fixed strategy (or none), compute the worst/best-case value.
#[derive(Debug, Clone)]
pub struct VerificationProblem<R: Scalar> {
    pub system: FactoredMdp<R>,
    pub spec: Specification<R>,
    pub strategy: Strategy,
}

impl<R: Scalar> VerificationProblem<R> {
    pub fn new(
        system: FactoredMdp<R>,
        spec: Specification<R>,
        strategy: Strategy,
        is_product: bool,
    ) -> ImdpResult<Self> {
        check_product_compatibility(&spec, is_product)?;
        check_strategy_compatibility(&spec, &strategy, &system)?;
        Ok(Self {
            system,
            spec,
            strategy,
        })
    }
}

/// Compute an optimal strategy with respect to an adversary.
#[derive(Debug, Clone)]
pub struct ControlSynthesisProblem<R: Scalar> {
    pub system: FactoredMdp<R>,
    pub spec: Specification<R>,
}

impl<R: Scalar> ControlSynthesisProblem<R> {
    pub fn new(system: FactoredMdp<R>, spec: Specification<R>, is_product: bool) -> ImdpResult<Self> {
        check_product_compatibility(&spec, is_product)?;
        Ok(Self { system, spec })
    }
}

/// Which robust-dynamic-programming algorithm the solve should run. Carries
/// the `BellmanAlgorithm` choice for factored systems; non-factored systems
/// always use the exact O-maximization path regardless of this value.
#[derive(Debug, Clone, Copy)]
pub struct RobustValueIteration {
    pub bellman_alg: BellmanAlgorithm,
}

impl RobustValueIteration {
    pub fn new(bellman_alg: BellmanAlgorithm) -> Self {
        Self { bellman_alg }
    }
}

impl Default for RobustValueIteration {
    fn default() -> Self {
        Self {
            bellman_alg: BellmanAlgorithm::default_non_factored(),
        }
    }
}

/// Either problem kind, for a uniform `solve` entry point (§6.4).
#[derive(Debug, Clone)]
pub enum Problem<R: Scalar> {
    Verification(VerificationProblem<R>),
    Synthesis(ControlSynthesisProblem<R>),
}

impl<R: Scalar> Problem<R> {
    pub fn system(&self) -> &FactoredMdp<R> {
        match self {
            Problem::Verification(p) => &p.system,
            Problem::Synthesis(p) => &p.system,
        }
    }

    pub fn spec(&self) -> &Specification<R> {
        match self {
            Problem::Verification(p) => &p.spec,
            Problem::Synthesis(p) => &p.spec,
        }
    }
}
