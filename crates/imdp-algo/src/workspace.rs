//! Scratch buffers for the Bellman operator's inner loop (§4.4).
//!
//! Allocated once by [`construct_workspace`] and reused across every
//! iteration of the value-iteration driver; the inner kernels never
//! allocate (§5's allocation discipline). Parallel execution shards each
//! buffer per thread so that threads never contend for scratch space, only
//! for read access to `previous` (shared, immutable for the step) and
//! disjoint write access to `current` and the strategy cache.

use imdp_core::{BellmanAlgorithm, FactoredMdp, Scalar};

/// Below this many outer-loop iterations (source states, or the outer
/// factored index), threading overhead dominates the work; stay
/// single-threaded regardless of how many hardware threads are available.
pub const PARALLEL_THRESHOLD: usize = 10;

/// Whether the Bellman step should partition its outer loop across threads,
/// given the requested thread count and the outer loop's size (§4.4).
pub fn should_parallelize(threads: usize, outer_count: usize) -> bool {
    threads > 1 && outer_count > PARALLEL_THRESHOLD
}

/// Per-thread scratch for the dense kernel: the shared permutation (computed
/// once per iteration, read-only across shards) plus one action-values
/// buffer per shard.
pub struct DenseWorkspace<R: Scalar> {
    pub permutation: Vec<usize>,
    pub action_values: Vec<Vec<R>>,
}

impl<R: Scalar> DenseWorkspace<R> {
    pub fn new(num_target: usize, max_actions: usize, num_shards: usize) -> Self {
        Self {
            permutation: vec![0; num_target],
            action_values: vec![vec![R::zero(); max_actions]; num_shards.max(1)],
        }
    }
}

/// Per-thread scratch for the sparse kernel: one `(value, gap)` pair buffer
/// per shard (sized to the largest column support seen) plus one
/// action-values buffer per shard.
pub struct SparseWorkspace<R: Scalar> {
    pub values_gaps: Vec<Vec<(R, R)>>,
    pub action_values: Vec<Vec<R>>,
}

impl<R: Scalar> SparseWorkspace<R> {
    pub fn new(max_support: usize, max_actions: usize, num_shards: usize) -> Self {
        Self {
            values_gaps: vec![Vec::with_capacity(max_support); num_shards.max(1)],
            action_values: vec![vec![R::zero(); max_actions]; num_shards.max(1)],
        }
    }
}

/// Composite workspace for a factored system: one workspace per marginal
/// axis (dense or sparse, matching that axis's own ambiguity representation)
/// plus a scratch tensor sized to the joint target space, used by the
/// block-coordinate and vertex-enumeration combinators to avoid allocating
/// per source state.
pub struct FactoredWorkspace<R: Scalar> {
    pub axes: Vec<Workspace<R>>,
    pub joint_scratch: Vec<R>,
}

/// The Bellman step's scratch, tagged by the system shape it was built for.
pub enum Workspace<R: Scalar> {
    Dense(DenseWorkspace<R>),
    Sparse(SparseWorkspace<R>),
    Factored(FactoredWorkspace<R>),
}

/// Builds the workspace appropriate for `system` and the selected
/// `BellmanAlgorithm`, sized for `threads`-way parallelism (actual
/// parallelization is decided per call via [`should_parallelize`]).
pub fn construct_workspace<R: Scalar>(
    system: &FactoredMdp<R>,
    _alg: BellmanAlgorithm,
    threads: usize,
) -> Workspace<R> {
    let num_shards = if should_parallelize(threads, system.total_states()) {
        threads
    } else {
        1
    };

    if system.is_non_factored() {
        let marginal = &system.marginals()[0];
        let max_actions = system.total_actions();
        return match marginal.ambiguity() {
            imdp_core::AmbiguitySet::Dense(d) => {
                Workspace::Dense(DenseWorkspace::new(d.num_target(), max_actions, num_shards))
            }
            imdp_core::AmbiguitySet::Sparse(s) => {
                let max_support = (0..s.num_source()).map(|c| s.support_len(c)).max().unwrap_or(0);
                Workspace::Sparse(SparseWorkspace::new(max_support, max_actions, num_shards))
            }
        };
    }

    let max_actions = system.total_actions();
    let axes = system
        .marginals()
        .iter()
        .map(|marginal| match marginal.ambiguity() {
            imdp_core::AmbiguitySet::Dense(d) => {
                Workspace::Dense(DenseWorkspace::new(d.num_target(), max_actions, num_shards))
            }
            imdp_core::AmbiguitySet::Sparse(s) => {
                let max_support = (0..s.num_source()).map(|c| s.support_len(c)).max().unwrap_or(0);
                Workspace::Sparse(SparseWorkspace::new(max_support, max_actions, num_shards))
            }
        })
        .collect();
    let joint_scratch = vec![R::zero(); system.total_states()];
    Workspace::Factored(FactoredWorkspace { axes, joint_scratch })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_keeps_small_instances_single_threaded() {
        assert!(!should_parallelize(8, 5));
        assert!(!should_parallelize(1, 1000));
        assert!(should_parallelize(4, 11));
    }

    #[test]
    fn dense_workspace_is_sized_to_target_and_action_count() {
        let ws: DenseWorkspace<f64> = DenseWorkspace::new(15, 3, 4);
        assert_eq!(ws.permutation.len(), 15);
        assert_eq!(ws.action_values.len(), 4);
        assert_eq!(ws.action_values[0].len(), 3);
    }
}
