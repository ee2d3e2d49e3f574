//! Combining per-axis marginals into a joint O-max over a factored source
//! state's successor tuple (§4.2, §6.4). All three [`BellmanAlgorithm`]
//! variants end up here once a system has more than one marginal:
//!
//! - [`block_coordinate_omax`] — the O-maximization baseline: a
//!   block-coordinate best-response loop over [`omax::o_maximize_assignment`]
//!   per axis. Exact only when the joint value tensor happens to decompose
//!   additively across axes; in general a sound relaxation (over-approximate
//!   for maximization, under-approximate for minimization), matching this
//!   crate's resolution of the factored-exactness open question.
//! - [`vertex_enumeration_joint`] — exact, by enumerating every axis's
//!   interval-simplex vertices and searching the (bounded) Cartesian product.
//!   Intended for systems with few axes and few targets per axis.
//! - [`mccormick_joint`] — the default for larger factored systems: exact for
//!   exactly two axes (delegates straight to [`mccormick::solve_pairwise`]),
//!   and a block-coordinate fold over adjacent-axis LPs for more than two,
//!   matching `mccormick`'s module doc ("folds pairwise ... sound but no
//!   longer exact").
//!
//! [`BellmanAlgorithm`]: imdp_core::BellmanAlgorithm

use imdp_core::{AmbiguitySet, ImdpResult, Scalar};

use super::{mccormick, omax, vertex};

/// One axis's ambiguity set plus the column already resolved by the caller
/// from that axis's own `(state, action)` conditioning.
pub struct AxisColumn<'a, R: Scalar> {
    pub ambiguity: &'a AmbiguitySet<R>,
    pub col: usize,
}

fn unravel(mut idx: usize, shape: &[usize]) -> Vec<usize> {
    let mut tuple = vec![0; shape.len()];
    for i in (0..shape.len()).rev() {
        tuple[i] = idx % shape[i];
        idx /= shape[i];
    }
    tuple
}

fn dense_bounds<R: Scalar>(ambiguity: &AmbiguitySet<R>, col: usize, n_target: usize) -> (Vec<R>, Vec<R>) {
    let mut lower = vec![R::zero(); n_target];
    let mut upper = vec![R::zero(); n_target];
    match ambiguity {
        AmbiguitySet::Dense(d) => {
            for (row, l, g) in d.column_iter(col) {
                lower[row] = l;
                upper[row] = l + g;
            }
        }
        AmbiguitySet::Sparse(s) => {
            for (row, l, g) in s.column_iter(col) {
                lower[row] = l;
                upper[row] = l + g;
            }
        }
    }
    (lower, upper)
}

/// A feasible interior point of an axis's interval-simplex column: lower
/// bound everywhere, with the leftover mass spread evenly over the support.
fn interior_point<R: Scalar>(axis: &AxisColumn<R>, n_target: usize) -> Vec<R> {
    let mut point = vec![R::zero(); n_target];
    let columns: Vec<(usize, R, R)> = match axis.ambiguity {
        AmbiguitySet::Dense(d) => d.column_iter(axis.col).collect(),
        AmbiguitySet::Sparse(s) => s.column_iter(axis.col).collect(),
    };
    for &(row, lower, _) in &columns {
        point[row] = lower;
    }
    let sum_lower = axis.ambiguity.sum_lower()[axis.col];
    let mut remaining = R::one() - sum_lower;
    let support = columns.iter().filter(|(_, _, g)| *g > R::zero()).count().max(1);
    let share = remaining * R::from_f64(1.0 / support as f64);
    for &(row, _, gap) in &columns {
        if gap > R::zero() && remaining > R::zero() {
            let take = if share < gap { share } else { gap };
            point[row] = point[row] + take;
            remaining = remaining - take;
        }
    }
    point
}

fn joint_expectation<R: Scalar>(q: &[Vec<R>], target_shape: &[usize], joint_values: &[R]) -> R {
    let mut total = R::zero();
    for joint_idx in 0..joint_values.len() {
        let tuple = unravel(joint_idx, target_shape);
        let mut weight = R::one();
        for (axis, &t) in tuple.iter().enumerate() {
            weight = weight * q[axis][t];
        }
        total = total + weight * joint_values[joint_idx];
    }
    total
}

/// Block-coordinate O-maximization over every axis (§4.2's O-maximization
/// baseline). `passes` controls how many full best-response sweeps to run;
/// the caller (driver) picks this once per problem, not per state.
pub fn block_coordinate_omax<R: Scalar>(
    axes: &[AxisColumn<R>],
    target_shape: &[usize],
    joint_values: &[R],
    maximize: bool,
    passes: usize,
) -> R {
    let n = axes.len();
    assert_eq!(n, target_shape.len(), "one axis per target dimension");

    let mut q: Vec<Vec<R>> = axes
        .iter()
        .zip(target_shape)
        .map(|(axis, &n_target)| interior_point(axis, n_target))
        .collect();

    for _ in 0..passes.max(1) {
        for i in 0..n {
            let n_target_i = target_shape[i];
            let mut marginal_values = vec![R::zero(); n_target_i];
            for joint_idx in 0..joint_values.len() {
                let tuple = unravel(joint_idx, target_shape);
                let mut weight = R::one();
                for (j, &t) in tuple.iter().enumerate() {
                    if j != i {
                        weight = weight * q[j][t];
                    }
                }
                marginal_values[tuple[i]] = marginal_values[tuple[i]] + weight * joint_values[joint_idx];
            }
            let (_, assignment) =
                omax::o_maximize_assignment(axes[i].ambiguity, axes[i].col, &marginal_values, maximize);
            let mut point = vec![R::zero(); n_target_i];
            for (idx, p) in assignment {
                point[idx] = p;
            }
            q[i] = point;
        }
    }

    joint_expectation(&q, target_shape, joint_values)
}

/// Exact joint optimum via vertex enumeration (§4.2): every axis's vertex set
/// is enumerated independently, then the (bounded) Cartesian product of
/// vertex choices is searched exhaustively. `max_candidates` bounds both the
/// per-axis vertex count and the joint product size.
pub fn vertex_enumeration_joint<R: Scalar>(
    axes: &[AxisColumn<R>],
    target_shape: &[usize],
    joint_values: &[R],
    maximize: bool,
    max_candidates: usize,
) -> ImdpResult<R> {
    let n = axes.len();
    assert_eq!(n, target_shape.len(), "one axis per target dimension");

    let mut axis_vertices: Vec<Vec<Vec<(usize, R)>>> = Vec::with_capacity(n);
    for (axis, &n_target) in axes.iter().zip(target_shape) {
        let (lower, upper) = dense_bounds(axis.ambiguity, axis.col, n_target);
        axis_vertices.push(vertex::vertices(&lower, &upper, max_candidates)?);
    }

    let counts: Vec<usize> = axis_vertices.iter().map(|v| v.len().max(1)).collect();
    let total_combos: usize = counts.iter().product();
    if total_combos > max_candidates {
        return Err(imdp_core::ImdpError::Resource(format!(
            "joint vertex enumeration would search {total_combos} combinations, exceeding the {max_candidates} cap"
        )));
    }

    let mut best: Option<R> = None;
    for combo in 0..total_combos.max(1) {
        let mut rem = combo;
        let mut idxs = vec![0usize; n];
        for i in (0..n).rev() {
            idxs[i] = rem % counts[i];
            rem /= counts[i];
        }
        let mut q: Vec<Vec<R>> = Vec::with_capacity(n);
        for i in 0..n {
            let mut v = vec![R::zero(); target_shape[i]];
            if let Some(vertex) = axis_vertices[i].get(idxs[i]) {
                for &(idx, p) in vertex {
                    v[idx] = p;
                }
            }
            q.push(v);
        }
        let value = joint_expectation(&q, target_shape, joint_values);
        best = Some(match best {
            None => value,
            Some(b) => {
                if maximize {
                    b.max(value)
                } else {
                    b.min(value)
                }
            }
        });
    }

    best.ok_or_else(|| imdp_core::ImdpError::Domain("no axes supplied to vertex enumeration".to_string()))
}

/// LP-McCormick over the full joint target space. Exact for exactly two
/// axes; for more than two, block-coordinate folds adjacent axis pairs
/// through the exact pairwise LP, holding the rest at their current point —
/// the fold this module's sibling (`mccormick`) documents as sound but no
/// longer exact once three or more axes are genuinely ambiguous together.
pub fn mccormick_joint<R: Scalar>(
    axes: &[AxisColumn<R>],
    target_shape: &[usize],
    joint_values: &[R],
    maximize: bool,
    passes: usize,
) -> ImdpResult<R> {
    let n = axes.len();
    assert_eq!(n, target_shape.len(), "one axis per target dimension");

    if n == 1 {
        return Ok(omax::o_maximize(axes[0].ambiguity, axes[0].col, joint_values, maximize));
    }

    if n == 2 {
        let (l0, u0) = dense_bounds(axes[0].ambiguity, axes[0].col, target_shape[0]);
        let (l1, u1) = dense_bounds(axes[1].ambiguity, axes[1].col, target_shape[1]);
        let axis0 = mccormick::AxisBox { lower: l0, upper: u0 };
        let axis1 = mccormick::AxisBox { lower: l1, upper: u1 };
        let n1 = target_shape[1];
        let values_fn = |i: usize, j: usize| joint_values[i * n1 + j];
        return mccormick::solve_pairwise(&axis0, &axis1, &values_fn, maximize);
    }

    let mut q: Vec<Vec<R>> = axes
        .iter()
        .zip(target_shape)
        .map(|(axis, &n_target)| interior_point(axis, n_target))
        .collect();

    for _ in 0..passes.max(1) {
        for i in 0..n {
            let j = (i + 1) % n;
            if i == j {
                continue;
            }
            let n_target_i = target_shape[i];
            let n_target_j = target_shape[j];
            // Marginalize every axis except the (i, j) pair into a dense 2-D
            // value slice, weighted by the other axes' current point.
            let mut slice = vec![R::zero(); n_target_i * n_target_j];
            for joint_idx in 0..joint_values.len() {
                let tuple = unravel(joint_idx, target_shape);
                let mut weight = R::one();
                for (k, &t) in tuple.iter().enumerate() {
                    if k != i && k != j {
                        weight = weight * q[k][t];
                    }
                }
                slice[tuple[i] * n_target_j + tuple[j]] =
                    slice[tuple[i] * n_target_j + tuple[j]] + weight * joint_values[joint_idx];
            }
            let (li, ui) = dense_bounds(axes[i].ambiguity, axes[i].col, n_target_i);
            let (lj, uj) = dense_bounds(axes[j].ambiguity, axes[j].col, n_target_j);
            let axis_i = mccormick::AxisBox { lower: li, upper: ui };
            let axis_j = mccormick::AxisBox { lower: lj, upper: uj };
            let values_fn = |a: usize, b: usize| slice[a * n_target_j + b];
            let (_, pi, pj) = mccormick::solve_pairwise_assignment(&axis_i, &axis_j, &values_fn, maximize)?;
            q[i] = pi;
            q[j] = pj;
        }
    }

    Ok(joint_expectation(&q, target_shape, joint_values))
}
