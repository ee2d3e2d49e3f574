//! Vertex enumeration (§4.2): an alternative exact kernel for small,
//! single-column ambiguity sets, used to validate or replace O-maximization
//! when the caller wants every extreme point rather than just the optimum
//! (e.g. downstream risk metrics beyond a linear objective).
//!
//! The polytope `{p : l_i <= p_i <= l_i + g_i, sum p_i = 1}` is a box
//! intersected with a hyperplane; every vertex has at most one coordinate
//! strictly between its bounds. Enumeration fixes one "free" index and
//! assigns every other coordinate to its lower or upper bound, keeping the
//! combination only if the free coordinate's forced value lands in its own
//! bounds.

use imdp_core::{ImdpError, ImdpResult, Scalar};

/// All vertices of the column's interval-simplex polytope, as dense
/// `(target_index, probability)` assignments. `max_candidates` bounds the
/// `n * 2^(n-1)` combinatorial search; exceeding it reports a resource error
/// rather than silently truncating.
pub fn vertices<R: Scalar>(
    lower: &[R],
    upper: &[R],
    max_candidates: usize,
) -> ImdpResult<Vec<Vec<(usize, R)>>> {
    let n = lower.len();
    if n == 0 {
        return Ok(Vec::new());
    }
    if n > 63 {
        return Err(ImdpError::Resource(
            "vertex enumeration supports at most 63 targets per column".to_string(),
        ));
    }
    let combos_per_free = 1u64 << (n - 1);
    let total_candidates = n as u128 * combos_per_free as u128;
    if total_candidates as usize > max_candidates {
        return Err(ImdpError::Resource(format!(
            "vertex enumeration would examine {total_candidates} candidates, exceeding the {max_candidates} limit"
        )));
    }

    let mut result = Vec::new();
    for free in 0..n {
        let others: Vec<usize> = (0..n).filter(|&i| i != free).collect();
        for mask in 0u64..combos_per_free {
            let mut point = Vec::with_capacity(n);
            let mut sum_others = R::zero();
            for (bit, &idx) in others.iter().enumerate() {
                let at_upper = (mask >> bit) & 1 == 1;
                let v = if at_upper { upper[idx] } else { lower[idx] };
                if v > R::zero() {
                    point.push((idx, v));
                }
                sum_others = sum_others + v;
            }
            let free_val = R::one() - sum_others;
            if free_val < lower[free] || free_val > upper[free] {
                continue;
            }
            if free_val > R::zero() {
                point.push((free, free_val));
            }
            result.push(point);
        }
    }
    Ok(result)
}

/// Evaluates every vertex against `values` and returns the best (worst/best
/// case per `maximize`) expected value.
pub fn optimize_over_vertices<R: Scalar>(
    lower: &[R],
    upper: &[R],
    values: &[R],
    maximize: bool,
    max_candidates: usize,
) -> ImdpResult<R> {
    let candidates = vertices(lower, upper, max_candidates)?;
    let mut best: Option<R> = None;
    for vertex in candidates {
        let expected = vertex.iter().fold(R::zero(), |acc, &(idx, p)| acc + p * values[idx]);
        best = Some(match best {
            None => expected,
            Some(b) => {
                if maximize {
                    b.max(expected)
                } else {
                    b.min(expected)
                }
            }
        });
    }
    best.ok_or_else(|| ImdpError::Domain("ambiguity set column has no vertices".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_target_interval_has_two_vertices() {
        let lower = vec![0.2, 0.3];
        let upper = vec![0.6, 0.7];
        let verts = vertices(&lower, &upper, 100).unwrap();
        // Of the 4 candidate (free-index, bound-combo) pairs, only one per
        // free choice keeps the forced value within that coordinate's bounds.
        assert_eq!(verts.len(), 2);
    }

    #[test]
    fn optimum_matches_known_bound() {
        let lower = vec![0.1, 0.2];
        let upper = vec![0.6, 0.7];
        let values = vec![10.0, 1.0];
        let best = optimize_over_vertices(&lower, &upper, &values, true, 100).unwrap();
        // Best puts as much mass as possible on target 0, capped by its own
        // upper bound (0.6) since target 1 must retain at least its lower bound.
        assert!((best - (0.6 * 10.0 + 0.4 * 1.0)).abs() < 1e-9);
    }

    #[test]
    fn oversized_column_reports_resource_error() {
        let lower = vec![0.0; 64];
        let upper = vec![1.0; 64];
        let err = vertices(&lower, &upper, 1_000_000).unwrap_err();
        assert!(matches!(err, ImdpError::Resource(_)));
    }
}
