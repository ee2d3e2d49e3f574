//! O-maximization (§4.2): the exact robust-expectation kernel for a single
//! interval-ambiguous column, and the per-axis building block the factored
//! kernels reuse.
//!
//! For a column with lower bounds `l` and gaps `g` (so `upper = l + g`) over
//! a probability simplex, `max_{p in polytope} sum p_i v_i` is attained by
//! starting every coordinate at its lower bound, then handing the leftover
//! probability mass (`1 - sum(l)`) to the highest-valued coordinates first,
//! each capped at its own gap, until the budget is exhausted. Minimization is
//! the mirror image: lowest-valued coordinates first.

use imdp_core::{AmbiguitySet, DenseAmbiguitySet, Scalar};

/// Builds the permutation the dense kernel shares read-only across every
/// column in an iteration (§4.2): target indices sorted by `values`,
/// descending for the upper bound, ascending for the lower bound. Ties keep
/// their original relative order (stable sort), which the kernel contract
/// requires to be invariant to since tied entries contribute equal value.
pub fn sort_permutation<R: Scalar>(values: &[R], upper_bound: bool) -> Vec<usize> {
    let mut perm: Vec<usize> = (0..values.len()).collect();
    if upper_bound {
        perm.sort_by(|&a, &b| values[b].partial_cmp(&values[a]).unwrap_or(std::cmp::Ordering::Equal));
    } else {
        perm.sort_by(|&a, &b| values[a].partial_cmp(&values[b]).unwrap_or(std::cmp::Ordering::Equal));
    }
    perm
}

/// The dense kernel's O-max, walking a permutation precomputed once per
/// iteration (§4.2's "Dense kernel" step 1) instead of re-sorting per column.
/// `upper_bound` must match the direction `permutation` was built with.
pub fn o_maximize_dense_with_permutation<R: Scalar>(
    ambiguity: &DenseAmbiguitySet<R>,
    col: usize,
    values: &[R],
    permutation: &[usize],
    sum_lower: R,
) -> R {
    let mut total = R::zero();
    for row in 0..ambiguity.num_target() {
        let (lower, _) = ambiguity.lower_gap_at(col, row);
        total = total + lower * values[row];
    }
    let mut budget = R::one() - sum_lower;
    for &row in permutation {
        if budget <= R::zero() {
            break;
        }
        let (_, gap) = ambiguity.lower_gap_at(col, row);
        let take = if gap < budget { gap } else { budget };
        if take <= R::zero() {
            continue;
        }
        total = total + take * values[row];
        budget = budget - take;
    }
    total
}

/// The expected value of `values` under the column's worst/best-case
/// distribution — `maximize = true` for the best case, `false` for worst.
pub fn o_maximize<R: Scalar>(ambiguity: &AmbiguitySet<R>, col: usize, values: &[R], maximize: bool) -> R {
    let sum_lower = ambiguity.sum_lower()[col];
    match ambiguity {
        AmbiguitySet::Dense(d) => greedy_fill(d.column_iter(col), sum_lower, values, maximize).0,
        AmbiguitySet::Sparse(s) => greedy_fill(s.column_iter(col), sum_lower, values, maximize).0,
    }
}

/// Like [`o_maximize`] but also returns the witnessing distribution as
/// `(target_index, probability)` pairs over the column's support, for use as
/// a nominal point by the factored block-coordinate kernel.
pub fn o_maximize_assignment<R: Scalar>(
    ambiguity: &AmbiguitySet<R>,
    col: usize,
    values: &[R],
    maximize: bool,
) -> (R, Vec<(usize, R)>) {
    let sum_lower = ambiguity.sum_lower()[col];
    match ambiguity {
        AmbiguitySet::Dense(d) => greedy_fill(d.column_iter(col), sum_lower, values, maximize),
        AmbiguitySet::Sparse(s) => greedy_fill(s.column_iter(col), sum_lower, values, maximize),
    }
}

fn greedy_fill<R: Scalar>(
    column: impl Iterator<Item = (usize, R, R)>,
    sum_lower: R,
    values: &[R],
    maximize: bool,
) -> (R, Vec<(usize, R)>) {
    let mut entries: Vec<(usize, R, R, R)> = column
        .map(|(idx, lower, gap)| (idx, values[idx], lower, gap))
        .collect();

    let mut total = R::zero();
    let mut assignment = Vec::with_capacity(entries.len());
    for &(idx, v, lower, _) in &entries {
        total = total + lower * v;
        if lower > R::zero() {
            assignment.push((idx, lower));
        }
    }

    if maximize {
        entries.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    } else {
        entries.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
    }

    let mut budget = R::one() - sum_lower;
    for (idx, v, lower, gap) in entries {
        if budget <= R::zero() {
            break;
        }
        let take = if gap < budget { gap } else { budget };
        if take <= R::zero() {
            continue;
        }
        total = total + take * v;
        budget = budget - take;
        if let Some(existing) = assignment.iter_mut().find(|(i, _)| *i == idx) {
            existing.1 = existing.1 + take;
        } else {
            assignment.push((idx, lower + take));
        }
    }

    (total, assignment)
}

#[cfg(test)]
mod tests {
    use super::*;
    use imdp_core::DenseAmbiguitySet;

    fn scenario_five() -> AmbiguitySet<f64> {
        // §8 scenario 5: target 4 (0-based 3) has lower 0.1, upper 0.6;
        // target 10 (0-based 9) has lower 0.2, upper 0.7; target 1 (0-based
        // 0) has upper 0.5, lower 0.
        let n_target = 15;
        let mut lower = vec![0.0; n_target];
        let mut upper = vec![0.0; n_target];
        lower[3] = 0.1;
        lower[9] = 0.2;
        upper[0] = 0.5;
        upper[3] = 0.6;
        upper[9] = 0.7;
        AmbiguitySet::Dense(DenseAmbiguitySet::from_lower_upper(n_target, 1, lower, upper).unwrap())
    }

    #[test]
    fn maximize_fills_highest_value_target_first() {
        let ambiguity = scenario_five();
        let mut values = vec![0.0; 15];
        values[0] = 1.0; // target 1 gets the highest value
        values[3] = 0.5;
        values[9] = 0.2;
        // sum_lower = 0.3, remaining budget 0.7, should all go to target 0
        // (up to its gap of 0.5), then the rest to target 3 (gap 0.5).
        let result = o_maximize(&ambiguity, 0, &values, true);
        // 0.1*0.5 + 0.2*0.2 (baseline) + 0.5*1.0 (target 0 filled) + 0.2*0.5 (remaining 0.2 to target 3)
        let expected = 0.1 * 0.5 + 0.2 * 0.2 + 0.5 * 1.0 + 0.2 * 0.5;
        assert!((result - expected).abs() < 1e-9);
    }

    #[test]
    fn minimize_fills_lowest_value_target_first() {
        let ambiguity = scenario_five();
        let mut values = vec![0.0; 15];
        values[0] = 1.0;
        values[3] = 0.5;
        values[9] = 0.2;
        let result = o_maximize(&ambiguity, 0, &values, false);
        // budget 0.7 flows to target 9 first (gap 0.5), then target 3 (gap 0.2 remaining of its 0.5 gap)
        let expected = 0.1 * 0.5 + 0.2 * 0.2 + 0.5 * 0.2 + 0.2 * 0.5;
        assert!((result - expected).abs() < 1e-9);
    }

    #[test]
    fn scenario_five_literal_bounds() {
        // §8 scenario 5, verbatim: V = (1..15) (1-based target value == index),
        // column lower [4->0.1, 10->0.2], upper [1->0.5, 4->0.6, 10->0.7].
        let ambiguity = scenario_five();
        let values: Vec<f64> = (1..=15).map(|v| v as f64).collect();
        let upper = o_maximize(&ambiguity, 0, &values, true);
        assert!((upper - 8.2).abs() < 1e-9);
        let lower = o_maximize(&ambiguity, 0, &values, false);
        assert!((lower - 3.7).abs() < 1e-9);
    }

    #[test]
    fn dense_kernel_with_shared_permutation_matches_per_column_sort() {
        let ambiguity = scenario_five();
        let values: Vec<f64> = (1..=15).map(|v| v as f64).collect();
        let dense = match &ambiguity {
            AmbiguitySet::Dense(d) => d,
            _ => unreachable!(),
        };
        for &upper_bound in &[true, false] {
            let perm = sort_permutation(&values, upper_bound);
            let shared = o_maximize_dense_with_permutation(
                dense,
                0,
                &values,
                &perm,
                ambiguity.sum_lower()[0],
            );
            let direct = o_maximize(&ambiguity, 0, &values, upper_bound);
            assert!((shared - direct).abs() < 1e-9);
        }
    }

    #[test]
    fn assignment_sums_to_one() {
        let ambiguity = scenario_five();
        let mut values = vec![0.0; 15];
        values[0] = 1.0;
        let (_, assignment) = o_maximize_assignment(&ambiguity, 0, &values, true);
        let total: f64 = assignment.iter().map(|(_, p)| *p).sum();
        assert!((total - 1.0).abs() < 1e-9);
    }
}
