//! Marginals (§3.2): one ambiguity set plus the state/action axes it
//! depends on.

use crate::ambiguity::AmbiguitySet;
use crate::error::{ImdpError, ImdpResult};
use crate::scalar::Scalar;

/// One target axis's transition model, conditioned on a subset of the
/// system's state and action axes.
#[derive(Debug, Clone)]
pub struct Marginal<R: Scalar> {
    ambiguity: AmbiguitySet<R>,
    state_indices: Vec<usize>,
    action_indices: Vec<usize>,
    source_shape: Vec<usize>,
    action_shape: Vec<usize>,
}

impl<R: Scalar> Marginal<R> {
    pub fn new(
        ambiguity: AmbiguitySet<R>,
        state_indices: Vec<usize>,
        action_indices: Vec<usize>,
        source_shape: Vec<usize>,
        action_shape: Vec<usize>,
    ) -> ImdpResult<Self> {
        if state_indices.len() != source_shape.len() {
            return Err(ImdpError::DimensionMismatch {
                context: "marginal state_indices vs source_shape".to_string(),
                expected: vec![state_indices.len()],
                actual: vec![source_shape.len()],
            });
        }
        if action_indices.len() != action_shape.len() {
            return Err(ImdpError::DimensionMismatch {
                context: "marginal action_indices vs action_shape".to_string(),
                expected: vec![action_indices.len()],
                actual: vec![action_shape.len()],
            });
        }
        let expected_source: usize = source_shape.iter().product::<usize>().max(1)
            * action_shape.iter().product::<usize>().max(1);
        if ambiguity.num_source() != expected_source {
            return Err(ImdpError::DimensionMismatch {
                context: "marginal ambiguity set source count vs state/action shape product"
                    .to_string(),
                expected: vec![expected_source],
                actual: vec![ambiguity.num_source()],
            });
        }
        Ok(Self {
            ambiguity,
            state_indices,
            action_indices,
            source_shape,
            action_shape,
        })
    }

    pub fn ambiguity(&self) -> &AmbiguitySet<R> {
        &self.ambiguity
    }

    pub fn state_indices(&self) -> &[usize] {
        &self.state_indices
    }

    pub fn action_indices(&self) -> &[usize] {
        &self.action_indices
    }

    pub fn source_shape(&self) -> &[usize] {
        &self.source_shape
    }

    pub fn action_shape(&self) -> &[usize] {
        &self.action_shape
    }

    /// Linearizes the conditioning `(state_index_tuple, action_index_tuple)`
    /// into the column index the ambiguity set expects, row-major over
    /// `source_shape` followed by `action_shape`.
    pub fn column_index(&self, state_tuple: &[usize], action_tuple: &[usize]) -> ImdpResult<usize> {
        if state_tuple.len() != self.source_shape.len() {
            return Err(ImdpError::InvalidState {
                index: state_tuple.len(),
                axis_size: self.source_shape.len(),
                context: "marginal state tuple arity".to_string(),
            });
        }
        if action_tuple.len() != self.action_shape.len() {
            return Err(ImdpError::InvalidState {
                index: action_tuple.len(),
                axis_size: self.action_shape.len(),
                context: "marginal action tuple arity".to_string(),
            });
        }
        let mut idx = 0usize;
        for (&v, &dim) in state_tuple.iter().zip(self.source_shape.iter()) {
            if v >= dim {
                return Err(ImdpError::InvalidState {
                    index: v,
                    axis_size: dim,
                    context: "marginal state index".to_string(),
                });
            }
            idx = idx * dim + v;
        }
        for (&v, &dim) in action_tuple.iter().zip(self.action_shape.iter()) {
            if v >= dim {
                return Err(ImdpError::InvalidState {
                    index: v,
                    axis_size: dim,
                    context: "marginal action index".to_string(),
                });
            }
            idx = idx * dim + v;
        }
        Ok(idx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ambiguity::DenseAmbiguitySet;

    fn trivial_ambiguity(n_source: usize) -> AmbiguitySet<f64> {
        let n_target = 2;
        let mut lower = vec![0.0; n_target * n_source];
        let mut gap = vec![0.0; n_target * n_source];
        for c in 0..n_source {
            lower[c * n_target] = 1.0;
            gap[c * n_target + 1] = 1.0;
        }
        AmbiguitySet::Dense(DenseAmbiguitySet::from_lower_gap(n_target, n_source, lower, gap).unwrap())
    }

    #[test]
    fn column_index_is_row_major_over_state_then_action() {
        let marginal = Marginal::new(trivial_ambiguity(6), vec![0], vec![0], vec![2], vec![3]).unwrap();
        assert_eq!(marginal.column_index(&[0], &[0]).unwrap(), 0);
        assert_eq!(marginal.column_index(&[0], &[2]).unwrap(), 2);
        assert_eq!(marginal.column_index(&[1], &[0]).unwrap(), 3);
    }

    #[test]
    fn out_of_range_index_is_rejected() {
        let marginal = Marginal::new(trivial_ambiguity(6), vec![0], vec![0], vec![2], vec![3]).unwrap();
        assert!(marginal.column_index(&[2], &[0]).is_err());
    }
}
