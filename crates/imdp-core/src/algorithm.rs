//! `BellmanAlgorithm` selection.
//!
//! The Bellman operator's factored (orthogonal) kernel supports three exact
//! or relaxed strategies (§4.2 of the system design). This is a closed,
//! data-driven enum rather than a trait-object registry: the inner loop
//! selects the kernel once per call and never performs virtual dispatch
//! inside the per-state/per-column loop.

use std::fmt;
use std::str::FromStr;

use crate::error::ImdpError;

/// Which kernel the robust Bellman operator uses on factored (orthogonal)
/// ambiguity sets. Non-factored systems always use the exact O-maximization
/// path regardless of this value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BellmanAlgorithm {
    /// Apply O-maximization independently per marginal axis. Exact for
    /// non-factored systems; a sound over-approximation (maximize) or
    /// under-approximation (minimize) for factored systems with more than
    /// one marginal.
    OMaximization,
    /// Replace each bilinear product between axis distributions with its
    /// McCormick envelope and solve the resulting linear program per source.
    /// Exact. Requires an LP backend to be available.
    LpMcCormickRelaxation,
    /// Enumerate the vertices of each axis's interval polytope and optimize
    /// over all vertex combinations. Exact. Intractable beyond small factor
    /// counts/cardinalities.
    VertexEnumeration,
}

impl BellmanAlgorithm {
    /// All algorithms the data model is aware of, independent of whether an
    /// LP backend is compiled into the solving crate.
    pub const ALL: [BellmanAlgorithm; 3] = [
        BellmanAlgorithm::OMaximization,
        BellmanAlgorithm::LpMcCormickRelaxation,
        BellmanAlgorithm::VertexEnumeration,
    ];

    /// Default algorithm for a non-factored IMDP (`N = M = 1`): the
    /// dense/sparse O-maximization kernel is exact in this case.
    pub fn default_non_factored() -> Self {
        BellmanAlgorithm::OMaximization
    }

    /// Default algorithm for a factored system whose marginals are
    /// general interval (polytopic) ambiguity sets: LP-McCormick, since it
    /// is exact and O-Maximization is only a relaxation here.
    pub fn default_factored() -> Self {
        BellmanAlgorithm::LpMcCormickRelaxation
    }

    /// Whether this algorithm is guaranteed exact on a factored system with
    /// more than one marginal. `OMaximization` is not; the other two are.
    pub fn exact_on_factored(self) -> bool {
        !matches!(self, BellmanAlgorithm::OMaximization)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BellmanAlgorithm::OMaximization => "o-maximization",
            BellmanAlgorithm::LpMcCormickRelaxation => "lp-mccormick",
            BellmanAlgorithm::VertexEnumeration => "vertex-enumeration",
        }
    }
}

impl Default for BellmanAlgorithm {
    fn default() -> Self {
        BellmanAlgorithm::OMaximization
    }
}

impl fmt::Display for BellmanAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BellmanAlgorithm {
    type Err = ImdpError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input.to_ascii_lowercase().replace('_', "-").as_str() {
            "o-maximization" | "omax" | "o-max" => Ok(BellmanAlgorithm::OMaximization),
            "lp-mccormick" | "lp-mccormick-relaxation" | "mccormick" => {
                Ok(BellmanAlgorithm::LpMcCormickRelaxation)
            }
            "vertex-enumeration" | "vertex-enum" => Ok(BellmanAlgorithm::VertexEnumeration),
            other => Err(ImdpError::Solver(format!(
                "unknown Bellman algorithm '{}'; supported values: {}",
                other,
                BellmanAlgorithm::ALL
                    .iter()
                    .map(|a| a.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_known_algorithms() {
        assert_eq!(
            "o-maximization".parse::<BellmanAlgorithm>().unwrap(),
            BellmanAlgorithm::OMaximization
        );
        assert_eq!(
            "lp-mccormick".parse::<BellmanAlgorithm>().unwrap(),
            BellmanAlgorithm::LpMcCormickRelaxation
        );
        assert_eq!(
            "vertex-enumeration".parse::<BellmanAlgorithm>().unwrap(),
            BellmanAlgorithm::VertexEnumeration
        );
    }

    #[test]
    fn parsing_unknown_reports_available() {
        let err = "quantum-annealing".parse::<BellmanAlgorithm>().unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("supported values"));
        assert!(msg.contains("o-maximization"));
    }

    #[test]
    fn omax_is_not_exact_on_factored() {
        assert!(!BellmanAlgorithm::OMaximization.exact_on_factored());
        assert!(BellmanAlgorithm::LpMcCormickRelaxation.exact_on_factored());
        assert!(BellmanAlgorithm::VertexEnumeration.exact_on_factored());
    }

    #[test]
    fn defaults_match_the_documented_rule() {
        assert_eq!(
            BellmanAlgorithm::default_non_factored(),
            BellmanAlgorithm::OMaximization
        );
        assert_eq!(
            BellmanAlgorithm::default_factored(),
            BellmanAlgorithm::LpMcCormickRelaxation
        );
    }

    #[test]
    fn display_round_trips_through_from_str() {
        for alg in BellmanAlgorithm::ALL {
            let s = alg.to_string();
            assert_eq!(s.parse::<BellmanAlgorithm>().unwrap(), alg);
        }
    }
}
