//! Product processes (§3.4): an IMDP composed with a deterministic finite
//! automaton (DFA) over a labelling function, treated uniformly as a
//! factored MDP of dimension `N + 1` whose extra marginal is a degenerate
//! deterministic transition.
//!
//! Compiling an LTLf formula down to a [`Dfa`] table is out of scope here;
//! this module accepts an already-built table.

use crate::ambiguity::{AmbiguitySet, SparseAmbiguitySet};
use crate::error::{ImdpError, ImdpResult};
use crate::marginal::Marginal;
use crate::scalar::Scalar;
use crate::system::FactoredMdp;

/// A deterministic finite automaton over a finite alphabet of label ids.
#[derive(Debug, Clone)]
pub struct Dfa {
    num_states: usize,
    alphabet_size: usize,
    /// Flattened `num_states * alphabet_size`: `transition[state * alphabet_size + symbol]`.
    transition: Vec<usize>,
    accepting: Vec<bool>,
}

impl Dfa {
    pub fn new(
        num_states: usize,
        alphabet_size: usize,
        transition: Vec<usize>,
        accepting: Vec<bool>,
    ) -> ImdpResult<Self> {
        if transition.len() != num_states * alphabet_size {
            return Err(ImdpError::DimensionMismatch {
                context: "DFA transition table length".to_string(),
                expected: vec![num_states * alphabet_size],
                actual: vec![transition.len()],
            });
        }
        if accepting.len() != num_states {
            return Err(ImdpError::DimensionMismatch {
                context: "DFA accepting-state vector length".to_string(),
                expected: vec![num_states],
                actual: vec![accepting.len()],
            });
        }
        if transition.iter().any(|&s| s >= num_states) {
            return Err(ImdpError::InvalidState {
                index: *transition.iter().find(|&&s| s >= num_states).unwrap(),
                axis_size: num_states,
                context: "DFA transition target".to_string(),
            });
        }
        Ok(Self {
            num_states,
            alphabet_size,
            transition,
            accepting,
        })
    }

    pub fn num_states(&self) -> usize {
        self.num_states
    }

    pub fn next_state(&self, state: usize, symbol: usize) -> usize {
        self.transition[state * self.alphabet_size + symbol]
    }

    pub fn is_accepting(&self, state: usize) -> bool {
        self.accepting[state]
    }
}

/// An IMDP (or already-factored MDP) composed with a [`Dfa`] via a
/// labelling function mapping each base-system state tuple (linearized
/// row-major over `base.state_vars()`) to an alphabet symbol id.
#[derive(Debug, Clone)]
pub struct ProductProcess<R: Scalar> {
    base: FactoredMdp<R>,
    dfa: Dfa,
    labelling: Vec<usize>,
}

impl<R: Scalar> ProductProcess<R> {
    pub fn new(base: FactoredMdp<R>, dfa: Dfa, labelling: Vec<usize>) -> ImdpResult<Self> {
        if labelling.len() != base.total_states() {
            return Err(ImdpError::DimensionMismatch {
                context: "labelling function length vs base system state count".to_string(),
                expected: vec![base.total_states()],
                actual: vec![labelling.len()],
            });
        }
        Ok(Self {
            base,
            dfa,
            labelling,
        })
    }

    pub fn base(&self) -> &FactoredMdp<R> {
        &self.base
    }

    pub fn dfa(&self) -> &Dfa {
        &self.dfa
    }

    /// The DFA axis index in the product's combined state space: one past
    /// the base system's last axis.
    pub fn dfa_axis(&self) -> usize {
        self.base.num_axes()
    }

    /// Builds the degenerate deterministic marginal for the DFA axis: for
    /// every `(base state tuple, dfa state)` column, a point mass on the
    /// label-driven successor DFA state.
    fn dfa_marginal(&self) -> ImdpResult<Marginal<R>> {
        let base_states = self.base.total_states();
        let n_target = self.dfa.num_states();
        let n_source = base_states * n_target;
        let mut entries = Vec::with_capacity(n_source);
        for base_idx in 0..base_states {
            let symbol = self.labelling[base_idx];
            for dfa_state in 0..n_target {
                let col = base_idx * n_target + dfa_state;
                let next = self.dfa.next_state(dfa_state, symbol);
                entries.push((next, col, R::one(), R::zero()));
            }
        }
        let ambiguity = AmbiguitySet::Sparse(SparseAmbiguitySet::from_triplets(
            n_target, n_source, &entries,
        )?);
        let mut state_indices: Vec<usize> = (0..self.base.num_axes()).collect();
        state_indices.push(self.dfa_axis());
        let mut source_shape: Vec<usize> = self.base.state_vars().to_vec();
        source_shape.push(self.dfa.num_states());
        Marginal::new(ambiguity, state_indices, Vec::new(), source_shape, Vec::new())
    }

    /// Flattens the product into a single factored MDP of dimension `N + 1`,
    /// matching §3.4's "core treats the product uniformly as a factored MDP".
    pub fn as_factored_mdp(&self) -> ImdpResult<FactoredMdp<R>> {
        let mut state_vars = self.base.state_vars().to_vec();
        state_vars.push(self.dfa.num_states());
        let mut source_dims = self.base.source_dims().to_vec();
        source_dims.push(self.dfa.num_states());
        let mut marginals = self.base.marginals().to_vec();
        marginals.push(self.dfa_marginal()?);
        let initial_states = self.base.initial_states().clone();
        FactoredMdp::new(
            state_vars,
            self.base.action_vars().to_vec(),
            source_dims,
            marginals,
            initial_states,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ambiguity::DenseAmbiguitySet;
    use crate::system::InitialStates;

    fn two_state_imdp() -> FactoredMdp<f64> {
        let n_target = 2;
        let n_source = 2 * 1; // 2 states, 1 action
        let mut lower = vec![0.0; n_target * n_source];
        let gap = vec![0.0; n_target * n_source];
        lower[0] = 1.0; // from state 0: self loop
        lower[3] = 1.0; // from state 1: -> state 1 (col 1, row 1 => idx 1*2+1=3)
        let set = AmbiguitySet::Dense(
            DenseAmbiguitySet::from_lower_gap(n_target, n_source, lower, gap).unwrap(),
        );
        let marginal = Marginal::new(set, vec![0], vec![0], vec![2], vec![1]).unwrap();
        FactoredMdp::non_factored(2, 1, marginal, InitialStates::All).unwrap()
    }

    #[test]
    fn product_adds_one_axis() {
        let base = two_state_imdp();
        let dfa = Dfa::new(2, 1, vec![1, 1], vec![false, true]).unwrap();
        let labelling = vec![0, 0];
        let product = ProductProcess::new(base, dfa, labelling).unwrap();
        let flattened = product.as_factored_mdp().unwrap();
        assert_eq!(flattened.num_axes(), 2);
        assert_eq!(flattened.state_vars(), &[2, 2]);
    }
}
