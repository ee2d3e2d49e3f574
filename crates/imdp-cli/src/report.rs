//! Renders a [`imdp_algo::Solution`] as JSON on stdout. `Strategy` isn't
//! `Serialize` (it lives in the dependency-free core crate), so this module
//! does the one-off conversion rather than adding a serde dependency to
//! `imdp-core` just for CLI reporting.

use imdp_algo::Solution;
use imdp_core::Strategy;
use serde_json::{json, Value};

fn strategy_json(strategy: &Strategy) -> Value {
    match strategy {
        Strategy::None => json!({ "kind": "none" }),
        Strategy::Stationary(slab) => json!({ "kind": "stationary", "actions": slab }),
        Strategy::TimeVarying(slabs) => json!({ "kind": "time-varying", "slabs": slabs }),
    }
}

pub fn solution_json(solution: &Solution<f64>) -> Value {
    json!({
        "values": solution.values,
        "iterations": solution.iterations,
        "residual": solution.residual,
        "exact": solution.exact,
        "strategy": strategy_json(&solution.strategy),
    })
}

pub fn print_solution(solution: &Solution<f64>) {
    let value = solution_json(solution);
    println!("{}", serde_json::to_string_pretty(&value).expect("solution JSON is always serializable"));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stationary_strategy_serializes_as_actions() {
        let strategy = Strategy::Stationary(vec![vec![0], vec![1]]);
        let value = strategy_json(&strategy);
        assert_eq!(value["kind"], "stationary");
        assert_eq!(value["actions"][1][0], 1);
    }
}
