//! LP-McCormick relaxation (§4.2, §9.2): the default kernel for factored
//! systems. Two independent axis marginals induce a product distribution
//! over the joint target space; optimizing a linear objective over that
//! product is a bilinear program. McCormick's envelope linearizes each
//! product term `w_ij = p1_i * p2_j` given box bounds on `p1_i` and `p2_j`,
//! turning the bilinear program into an LP the `clarabel`/HiGHS backends
//! (via `good_lp`) solve directly.
//!
//! This module handles exactly two marginals. Systems with more than two
//! factored axes fold pairwise (see `bellman::factored_backup`), which is
//! sound but no longer exact — matching this crate's resolution of the
//! factored-exactness question (`BellmanAlgorithm::exact_on_factored`).

use good_lp::solvers::clarabel::clarabel;
use good_lp::{constraint, variable, variables, Expression, Solution, SolverModel, Variable};
use imdp_core::{ImdpError, ImdpResult, Scalar};

/// One axis's interval box, expanded to dense `(lower, upper)` vectors.
pub struct AxisBox<R: Scalar> {
    pub lower: Vec<R>,
    pub upper: Vec<R>,
}

/// Solves `opt sum_{i,j} p1_i * p2_j * values[i][j]` subject to both axes'
/// interval-simplex constraints, via the McCormick-relaxed LP.
pub fn solve_pairwise<R: Scalar>(
    axis1: &AxisBox<R>,
    axis2: &AxisBox<R>,
    values: &dyn Fn(usize, usize) -> R,
    maximize: bool,
) -> ImdpResult<R> {
    let (value, _, _) = solve_pairwise_assignment(axis1, axis2, values, maximize)?;
    Ok(value)
}

/// Like [`solve_pairwise`] but also returns the witnessing per-axis
/// marginals `(p1, p2)`, so a caller folding more than two axes together
/// (`kernels::factored::mccormick_joint`) can carry the solution forward as
/// the next fold's fixed point for the remaining axes.
pub fn solve_pairwise_assignment<R: Scalar>(
    axis1: &AxisBox<R>,
    axis2: &AxisBox<R>,
    values: &dyn Fn(usize, usize) -> R,
    maximize: bool,
) -> ImdpResult<(R, Vec<R>, Vec<R>)> {
    let n1 = axis1.lower.len();
    let n2 = axis2.lower.len();

    let mut vars = variables!();
    let p1: Vec<Variable> = (0..n1)
        .map(|i| vars.add(variable().min(axis1.lower[i].to_f64()).max(axis1.upper[i].to_f64())))
        .collect();
    let p2: Vec<Variable> = (0..n2)
        .map(|j| vars.add(variable().min(axis2.lower[j].to_f64()).max(axis2.upper[j].to_f64())))
        .collect();
    let w: Vec<Vec<Variable>> = (0..n1)
        .map(|_| (0..n2).map(|_| vars.add(variable().min(0.0).max(1.0))).collect())
        .collect();

    let mut objective = Expression::from(0.0);
    for i in 0..n1 {
        for j in 0..n2 {
            objective += values(i, j).to_f64() * w[i][j];
        }
    }

    let mut model = if maximize {
        vars.maximise(objective).using(good_lp::default_solver)
    } else {
        vars.minimise(objective).using(good_lp::default_solver)
    };

    let sum1: Expression = p1.iter().fold(Expression::from(0.0), |acc, &v| acc + v);
    model = model.with(constraint!(sum1 == 1.0));
    let sum2: Expression = p2.iter().fold(Expression::from(0.0), |acc, &v| acc + v);
    model = model.with(constraint!(sum2 == 1.0));

    for i in 0..n1 {
        let l1 = axis1.lower[i].to_f64();
        let u1 = axis1.upper[i].to_f64();
        for j in 0..n2 {
            let l2 = axis2.lower[j].to_f64();
            let u2 = axis2.upper[j].to_f64();
            // Standard four McCormick envelope inequalities for w = p1_i * p2_j.
            model = model.with(constraint!(w[i][j] >= l1 * p2[j] + l2 * p1[i] - l1 * l2));
            model = model.with(constraint!(w[i][j] >= u1 * p2[j] + u2 * p1[i] - u1 * u2));
            model = model.with(constraint!(w[i][j] <= u1 * p2[j] + l2 * p1[i] - u1 * l2));
            model = model.with(constraint!(w[i][j] <= l1 * p2[j] + u2 * p1[i] - l1 * u2));
        }
    }

    let solution = model
        .solve()
        .map_err(|e| ImdpError::Solver(format!("LP-McCormick relaxation failed: {e:?}")))?;

    let mut total = 0.0f64;
    for i in 0..n1 {
        for j in 0..n2 {
            total += solution.value(w[i][j]) * values(i, j).to_f64();
        }
    }
    let p1_values: Vec<R> = p1.iter().map(|&v| R::from_f64(solution.value(v))).collect();
    let p2_values: Vec<R> = p2.iter().map(|&v| R::from_f64(solution.value(v))).collect();
    Ok((R::from_f64(total), p1_values, p2_values))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degenerate_single_target_axes_reduce_to_product_value() {
        // Each axis has only one possible target: the relaxation is exact
        // since there are no genuine products to over-approximate.
        let axis1 = AxisBox { lower: vec![1.0f64], upper: vec![1.0] };
        let axis2 = AxisBox { lower: vec![1.0f64], upper: vec![1.0] };
        let values = |_: usize, _: usize| 3.0f64;
        let result = solve_pairwise(&axis1, &axis2, &values, true).unwrap();
        assert!((result - 3.0).abs() < 1e-6);
    }

    #[test]
    fn maximization_upper_bounds_the_true_optimum() {
        let axis1 = AxisBox { lower: vec![0.2, 0.3], upper: vec![0.6, 0.7] };
        let axis2 = AxisBox { lower: vec![0.1, 0.4], upper: vec![0.5, 0.8] };
        let values = |i: usize, j: usize| if i == 0 && j == 0 { 10.0 } else { 0.0 };
        let relaxed = solve_pairwise(&axis1, &axis2, &values, true).unwrap();
        // True optimum puts as much joint mass as the marginals allow on (0,0):
        // p1_0 in [0.2,0.6], p2_0 in [0.1,0.5], product maximized at 0.6*0.5=0.3, value 3.0.
        // The McCormick relaxation over-approximates, so it must be >= the true value.
        assert!(relaxed >= 3.0 - 1e-6);
    }
}
