//! Runtime availability registry for [`BellmanAlgorithm`] (§9.2).
//!
//! `imdp-core::BellmanAlgorithm` already knows every algorithm the data
//! model is aware of and how to parse/print its name; what it cannot know is
//! which of those are actually usable in *this* build; `LpMcCormickRelaxation`
//! needs an LP backend (`good_lp/clarabel` or `good_lp/highs`) compiled in,
//! while `OMaximization` and `VertexEnumeration` are pure Rust and always
//! available. This module is that query, kept as a small read-only registry
//! behind a `RwLock`-guarded lazy static, mirroring this codebase's solver
//! registry pattern.

use std::collections::HashMap;
use std::sync::RwLock;

use imdp_core::{BellmanAlgorithm, ImdpError, ImdpResult};
use once_cell::sync::Lazy;

struct AlgorithmEntry {
    available: bool,
}

struct AlgorithmRegistry {
    entries: HashMap<BellmanAlgorithm, AlgorithmEntry>,
}

impl AlgorithmRegistry {
    fn available_names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.available)
            .map(|(alg, _)| alg.as_str())
            .collect();
        names.sort_unstable();
        names
    }
}

fn lp_backend_compiled() -> bool {
    cfg!(any(feature = "solver-clarabel", feature = "solver-highs"))
}

static GLOBAL_ALGORITHM_REGISTRY: Lazy<RwLock<AlgorithmRegistry>> = Lazy::new(|| {
    let mut entries = HashMap::new();
    entries.insert(BellmanAlgorithm::OMaximization, AlgorithmEntry { available: true });
    entries.insert(BellmanAlgorithm::VertexEnumeration, AlgorithmEntry { available: true });
    entries.insert(
        BellmanAlgorithm::LpMcCormickRelaxation,
        AlgorithmEntry { available: lp_backend_compiled() },
    );
    RwLock::new(AlgorithmRegistry { entries })
});

/// Whether `alg` can actually be dispatched in this build.
pub fn is_available(alg: BellmanAlgorithm) -> bool {
    GLOBAL_ALGORITHM_REGISTRY
        .read()
        .expect("algorithm registry lock poisoned")
        .entries
        .get(&alg)
        .map(|entry| entry.available)
        .unwrap_or(false)
}

/// Every algorithm available in this build, names sorted for stable
/// diagnostics and config-file/CLI help text.
pub fn available() -> Vec<&'static str> {
    GLOBAL_ALGORITHM_REGISTRY
        .read()
        .expect("algorithm registry lock poisoned")
        .available_names()
}

/// Resolves `alg`, erroring with the list of currently available algorithms
/// if it is known to the data model but not compiled/enabled in this build.
pub fn require_available(alg: BellmanAlgorithm) -> ImdpResult<BellmanAlgorithm> {
    if is_available(alg) {
        Ok(alg)
    } else {
        Err(ImdpError::Solver(format!(
            "algorithm '{alg}' is not available in this build; available: {}",
            available().join(", ")
        )))
    }
}
