//! Interval ambiguity sets (§3.1): the per-column interval distributions
//! that make up one marginal's transition model.
//!
//! A column `j` (a fixed `(source, action)` pair, already linearized) owns a
//! lower-bound vector `lower[:, j]` and a gap vector `gap[:, j]` with
//! `upper = lower + gap`. Two storage layouts are supported, mirroring the
//! dense/sparse split the Bellman operator's inner loop cares about (§4.2):
//! dense column-major storage for small/dense marginals, and CSC sparse
//! storage — built the same way this codebase's sparse admittance matrix is
//! built, via a triplet accumulator converted once to compressed form — for
//! marginals whose columns have few nonzero targets.

use sprs::{CsMat, TriMat};

use crate::error::{ImdpError, ImdpResult};
use crate::scalar::Scalar;

/// Dense column-major interval ambiguity set.
///
/// `lower` and `gap` are both `n_target * n_source` flat vectors in
/// column-major order: element `(row, col)` lives at `col * n_target + row`.
#[derive(Debug, Clone)]
pub struct DenseAmbiguitySet<R: Scalar> {
    n_target: usize,
    n_source: usize,
    lower: Vec<R>,
    gap: Vec<R>,
    sum_lower: Vec<R>,
}

impl<R: Scalar> DenseAmbiguitySet<R> {
    /// Build from explicit lower and gap matrices, validating §3.1's
    /// invariants column by column.
    pub fn from_lower_gap(
        n_target: usize,
        n_source: usize,
        lower: Vec<R>,
        gap: Vec<R>,
    ) -> ImdpResult<Self> {
        if lower.len() != n_target * n_source || gap.len() != lower.len() {
            return Err(ImdpError::DimensionMismatch {
                context: "dense ambiguity set lower/gap length".to_string(),
                expected: vec![n_target * n_source],
                actual: vec![lower.len(), gap.len()],
            });
        }
        let mut sum_lower = vec![R::zero(); n_source];
        for col in 0..n_source {
            let mut col_sum_lower = R::zero();
            let mut col_sum_gap = R::zero();
            for row in 0..n_target {
                let idx = col * n_target + row;
                let l = lower[idx];
                let g = gap[idx];
                if l < R::zero() {
                    return Err(ImdpError::InvalidInterval {
                        column: col,
                        row,
                        reason: "lower bound is negative".to_string(),
                    });
                }
                if g < R::zero() {
                    return Err(ImdpError::InvalidInterval {
                        column: col,
                        row,
                        reason: "gap is negative".to_string(),
                    });
                }
                if l + g > R::one() {
                    return Err(ImdpError::InvalidInterval {
                        column: col,
                        row,
                        reason: "lower + gap exceeds 1".to_string(),
                    });
                }
                col_sum_lower = col_sum_lower + l;
                col_sum_gap = col_sum_gap + g;
            }
            if col_sum_lower > R::one() {
                return Err(ImdpError::InvalidInterval {
                    column: col,
                    row: 0,
                    reason: "sum of lower bounds exceeds 1".to_string(),
                });
            }
            if col_sum_lower + col_sum_gap < R::one() {
                return Err(ImdpError::InvalidInterval {
                    column: col,
                    row: 0,
                    reason: "interval polytope is empty: sum_lower + sum_gap < 1".to_string(),
                });
            }
            sum_lower[col] = col_sum_lower;
        }
        Ok(Self {
            n_target,
            n_source,
            lower,
            gap,
            sum_lower,
        })
    }

    /// Build from `(lower, upper)`, deriving `gap = upper - lower` while
    /// preserving the shape of `upper`.
    pub fn from_lower_upper(
        n_target: usize,
        n_source: usize,
        lower: Vec<R>,
        upper: Vec<R>,
    ) -> ImdpResult<Self> {
        if upper.len() != lower.len() {
            return Err(ImdpError::DimensionMismatch {
                context: "dense ambiguity set lower/upper length".to_string(),
                expected: vec![lower.len()],
                actual: vec![upper.len()],
            });
        }
        let gap: Vec<R> = lower
            .iter()
            .zip(upper.iter())
            .map(|(&l, &u)| u - l)
            .collect();
        Self::from_lower_gap(n_target, n_source, lower, gap)
    }

    pub fn num_target(&self) -> usize {
        self.n_target
    }

    pub fn num_source(&self) -> usize {
        self.n_source
    }

    pub fn sum_lower(&self) -> &[R] {
        &self.sum_lower
    }

    /// Zero-allocation iterator over a column's `(target_index, lower, gap)`
    /// triples; dense columns are iterated in full (no sparsity to skip).
    pub fn column_iter(&self, col: usize) -> impl Iterator<Item = (usize, R, R)> + '_ {
        let start = col * self.n_target;
        let end = start + self.n_target;
        (start..end).map(move |idx| (idx - start, self.lower[idx], self.gap[idx]))
    }

    /// Allocates `upper = lower + gap`. Not for use in the hot inner loop.
    pub fn upper_column(&self, col: usize) -> Vec<R> {
        self.column_iter(col).map(|(_, l, g)| l + g).collect()
    }

    /// Random-access `(lower, gap)` at a given row within a column, for
    /// kernels walking a precomputed permutation rather than natural order.
    pub fn lower_gap_at(&self, col: usize, row: usize) -> (R, R) {
        let idx = col * self.n_target + row;
        (self.lower[idx], self.gap[idx])
    }
}

/// Sparse (CSC) interval ambiguity set. `lower` and `gap` share the same
/// nonzero pattern; that pattern defines each column's support.
#[derive(Debug, Clone)]
pub struct SparseAmbiguitySet<R: Scalar> {
    n_target: usize,
    n_source: usize,
    lower: CsMat<R>,
    gap: CsMat<R>,
    sum_lower: Vec<R>,
}

impl<R: Scalar> SparseAmbiguitySet<R> {
    /// Build from parallel triplet lists `(target_row, source_col, lower, gap)`.
    /// One entry per nonzero; the shared pattern is implied by supplying both
    /// values for every listed `(row, col)`.
    pub fn from_triplets(
        n_target: usize,
        n_source: usize,
        entries: &[(usize, usize, R, R)],
    ) -> ImdpResult<Self> {
        let mut lower_tri = TriMat::new((n_target, n_source));
        let mut gap_tri = TriMat::new((n_target, n_source));
        let mut col_sum_lower = vec![R::zero(); n_source];
        let mut col_sum_gap = vec![R::zero(); n_source];

        for &(row, col, l, g) in entries {
            if row >= n_target || col >= n_source {
                return Err(ImdpError::DimensionMismatch {
                    context: "sparse ambiguity set triplet index".to_string(),
                    expected: vec![n_target, n_source],
                    actual: vec![row, col],
                });
            }
            if l < R::zero() || g < R::zero() || l + g > R::one() {
                return Err(ImdpError::InvalidInterval {
                    column: col,
                    row,
                    reason: "lower/gap outside [0,1] band".to_string(),
                });
            }
            lower_tri.add_triplet(row, col, l);
            gap_tri.add_triplet(row, col, g);
            col_sum_lower[col] = col_sum_lower[col] + l;
            col_sum_gap[col] = col_sum_gap[col] + g;
        }

        for col in 0..n_source {
            if col_sum_lower[col] > R::one() {
                return Err(ImdpError::InvalidInterval {
                    column: col,
                    row: 0,
                    reason: "sum of lower bounds exceeds 1".to_string(),
                });
            }
            if col_sum_lower[col] + col_sum_gap[col] < R::one() {
                return Err(ImdpError::InvalidInterval {
                    column: col,
                    row: 0,
                    reason: "interval polytope is empty: sum_lower + sum_gap < 1".to_string(),
                });
            }
        }

        Ok(Self {
            n_target,
            n_source,
            lower: lower_tri.to_csc(),
            gap: gap_tri.to_csc(),
            sum_lower: col_sum_lower,
        })
    }

    pub fn num_target(&self) -> usize {
        self.n_target
    }

    pub fn num_source(&self) -> usize {
        self.n_source
    }

    pub fn sum_lower(&self) -> &[R] {
        &self.sum_lower
    }

    /// Zero-allocation iterator over a column's support: `(target_index,
    /// lower, gap)` triples for nonzero entries only.
    pub fn column_iter(&self, col: usize) -> impl Iterator<Item = (usize, R, R)> + '_ {
        let indptr = self.lower.indptr();
        let start = indptr.index(col);
        let end = indptr.index(col + 1);
        let rows = &self.lower.indices()[start..end];
        let lower_vals = &self.lower.data()[start..end];
        let gap_vals = &self.gap.data()[start..end];
        rows.iter()
            .zip(lower_vals.iter())
            .zip(gap_vals.iter())
            .map(|((&row, &l), &g)| (row, l, g))
    }

    pub fn support_len(&self, col: usize) -> usize {
        let indptr = self.lower.indptr();
        indptr.index(col + 1) - indptr.index(col)
    }
}

/// Either storage layout for an interval ambiguity set, selected once at
/// construction; kernels match on this tag rather than performing virtual
/// dispatch per column (§9 design notes).
#[derive(Debug, Clone)]
pub enum AmbiguitySet<R: Scalar> {
    Dense(DenseAmbiguitySet<R>),
    Sparse(SparseAmbiguitySet<R>),
}

impl<R: Scalar> AmbiguitySet<R> {
    pub fn num_target(&self) -> usize {
        match self {
            AmbiguitySet::Dense(d) => d.num_target(),
            AmbiguitySet::Sparse(s) => s.num_target(),
        }
    }

    pub fn num_source(&self) -> usize {
        match self {
            AmbiguitySet::Dense(d) => d.num_source(),
            AmbiguitySet::Sparse(s) => s.num_source(),
        }
    }

    pub fn sum_lower(&self) -> &[R] {
        match self {
            AmbiguitySet::Dense(d) => d.sum_lower(),
            AmbiguitySet::Sparse(s) => s.sum_lower(),
        }
    }

    pub fn is_sparse(&self) -> bool {
        matches!(self, AmbiguitySet::Sparse(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dense_accepts_valid_interval() {
        // Matches §8 scenario 5: V = 1..15, lower [4->0.1, 10->0.2], upper [1->0.5, 4->0.6, 10->0.7].
        let n_target = 15;
        let mut lower = vec![0.0; n_target];
        let mut upper = vec![0.0; n_target];
        lower[3] = 0.1; // target index 4 (1-based) -> 0-based row 3
        lower[9] = 0.2; // target index 10 -> row 9
        upper[0] = 0.5;
        upper[3] = 0.6;
        upper[9] = 0.7;
        let set = DenseAmbiguitySet::from_lower_upper(n_target, 1, lower, upper).unwrap();
        assert_eq!(set.num_target(), 15);
        assert!((set.sum_lower()[0] - 0.3).abs() < 1e-9);
    }

    #[test]
    fn dense_rejects_negative_lower() {
        let lower = vec![-0.1, 0.5];
        let gap = vec![0.1, 0.5];
        let err = DenseAmbiguitySet::from_lower_gap(2, 1, lower, gap).unwrap_err();
        assert!(matches!(err, ImdpError::InvalidInterval { .. }));
    }

    #[test]
    fn dense_rejects_empty_polytope() {
        // sum_lower + sum_gap < 1: infeasible interval band.
        let lower = vec![0.1, 0.1];
        let gap = vec![0.1, 0.1];
        let err = DenseAmbiguitySet::from_lower_gap(2, 1, lower, gap).unwrap_err();
        assert!(matches!(err, ImdpError::InvalidInterval { .. }));
    }

    #[test]
    fn sparse_matches_dense_column_iteration() {
        let entries = vec![(3usize, 0usize, 0.1f64, 0.5f64), (9, 0, 0.2, 0.5)];
        let set = SparseAmbiguitySet::from_triplets(15, 1, &entries).unwrap();
        let mut seen: Vec<_> = set.column_iter(0).collect();
        seen.sort_by_key(|(row, _, _)| *row);
        assert_eq!(seen, vec![(3, 0.1, 0.5), (9, 0.2, 0.5)]);
        assert_eq!(set.support_len(0), 2);
    }
}
